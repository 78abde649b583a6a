//! In-memory collaborators for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;

use gridrun_core::{
    LaunchRequest, ProcessFile, Run, Task, TaskId, TaskStatus, Timestamp,
};
use gridrun_task_client::ClientError;

use crate::dispatch::AsyncDispatcher;
use crate::error::{FetchError, StorageError};
use crate::fetch::WhitelistedFetcher;
use crate::gate::LaunchGate;
use crate::lifecycle::TaskLifecycleCoordinator;
use crate::mapper::FileResourceMapper;
use crate::ports::{ComputeRunner, DocumentFetcher, ObjectStorage, StatusPublisher, TaskSource};
use crate::reference::ReferenceDocumentParser;
use crate::service::{LaunchService, ManualLauncher};

/// Where [`FakeStorage`] presigns the reference document of [`ready_task`].
pub const RAO_REQUEST_URL: &str = "http://minio/gridrun/raorequest.xml?expiry=1h";

/// Reference document listing `files` (code, document id) for each interval.
pub fn rao_request_xml(intervals: &[&str], files: &[(&str, &str)]) -> String {
    let files: String = files
        .iter()
        .map(|(code, id)| {
            format!(
                r#"<File type="{code}" code="{code}" url="documentIdentification://{id}"/>"#,
                code = code,
                id = id
            )
        })
        .collect();
    let items: String = intervals
        .iter()
        .map(|interval| {
            format!(
                r#"<RequestItem timeInterval="{}"><Files>{}<File type="CFG" code="CFG_RAO" url="documentIdentification://cfg-id"/></Files></RequestItem>"#,
                interval, files
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><RequestMessage><Payload><RequestItems>{}</RequestItems></Payload></RequestMessage>"#,
        items
    )
}

/// A ready task whose files match the document served by [`Harness`].
pub fn ready_task(timestamp: &str) -> Task {
    Task::new(TaskId::generate(), timestamp.parse().unwrap(), TaskStatus::Ready)
        .with_input(ProcessFile::new("RAOREQUEST", "gridrun/raorequest.xml", "raorequest.xml"))
        .with_input(ProcessFile::new("VIRTUALHUB", "gridrun/virtualhub.xml", "virtualhub.xml"))
        .with_input(ProcessFile::new("CGM", "gridrun/cgm.zip", "cgm.zip").with_document_id("cgm-id"))
        .with_input(
            ProcessFile::new("CBCORA", "gridrun/cbcora.xml", "cbcora.xml").with_document_id("cbcora-id"),
        )
        .with_input(ProcessFile::new("GLSK", "gridrun/glsk.xml", "glsk.xml").with_document_id("glsk-id"))
        .with_input(
            ProcessFile::new("REFPROG", "gridrun/refprog.xml", "refprog.xml").with_document_id("refprog-id"),
        )
}

/// Task manager keeping tasks in memory.
#[derive(Default)]
pub struct FakeTaskSource {
    tasks: Mutex<HashMap<Timestamp, Task>>,
    refuse_run_history: bool,
    refuse_status: bool,
    lose_runs: bool,
    delay: Duration,
    active: AtomicUsize,
    max_active: AtomicUsize,
    run_history_calls: AtomicUsize,
}

impl FakeTaskSource {
    pub fn with_task(self, task: Task) -> Self {
        self.put(task);
        self
    }

    pub fn refusing_run_history(mut self) -> Self {
        self.refuse_run_history = true;
        self
    }

    pub fn refusing_status(mut self) -> Self {
        self.refuse_status = true;
        self
    }

    /// Accept run history updates without storing the run.
    pub fn losing_runs(mut self) -> Self {
        self.lose_runs = true;
        self
    }

    /// Make every call take `ms` milliseconds.
    pub fn with_delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    pub fn put(&self, task: Task) {
        self.tasks.lock().unwrap().insert(task.timestamp, task);
    }

    pub fn task(&self, timestamp: &Timestamp) -> Option<Task> {
        self.tasks.lock().unwrap().get(timestamp).cloned()
    }

    pub fn set_status(&self, timestamp: &Timestamp, status: TaskStatus) {
        if let Some(task) = self.tasks.lock().unwrap().get_mut(timestamp) {
            task.status = status;
        }
    }

    pub fn run_history_calls(&self) -> usize {
        self.run_history_calls.load(Ordering::SeqCst)
    }

    /// Highest number of calls seen in progress at once.
    pub fn max_concurrent_calls(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }

    async fn call<T>(&self, f: impl FnOnce(&mut HashMap<Timestamp, Task>) -> T) -> T {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let result = f(&mut self.tasks.lock().unwrap());
        self.active.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[async_trait]
impl TaskSource for FakeTaskSource {
    async fn get_task(&self, timestamp: &Timestamp) -> Result<Option<Task>, ClientError> {
        Ok(self.call(|tasks| tasks.get(timestamp).cloned()).await)
    }

    async fn update_status(
        &self,
        timestamp: &Timestamp,
        status: TaskStatus,
    ) -> Result<bool, ClientError> {
        let refuse = self.refuse_status;
        Ok(self
            .call(|tasks| match tasks.get_mut(timestamp) {
                Some(task) if !refuse => {
                    task.status = status;
                    true
                }
                _ => false,
            })
            .await)
    }

    async fn append_run_history(
        &self,
        timestamp: &Timestamp,
        inputs: &[ProcessFile],
    ) -> Result<Option<Task>, ClientError> {
        self.run_history_calls.fetch_add(1, Ordering::SeqCst);
        let (refuse, lose) = (self.refuse_run_history, self.lose_runs);
        Ok(self
            .call(|tasks| {
                let task = tasks.get_mut(timestamp).filter(|_| !refuse)?;
                if !lose {
                    task.run_history.push(Run::new(Timestamp::now(), inputs.to_vec()));
                }
                Some(task.clone())
            })
            .await)
    }
}

/// Presigns `path` as `http://minio/{path}?expiry={hours}h`.
pub struct FakeStorage;

#[async_trait]
impl ObjectStorage for FakeStorage {
    async fn presigned_url(&self, path: &str, expiry_hours: u32) -> Result<String, StorageError> {
        Ok(format!("http://minio/{}?expiry={}h", path, expiry_hours))
    }
}

/// Serves documents from memory.
#[derive(Default)]
pub struct FakeFetcher {
    documents: HashMap<String, Bytes>,
}

impl FakeFetcher {
    pub fn with_document(mut self, url: &str, content: &str) -> Self {
        self.documents
            .insert(url.to_string(), Bytes::from(content.to_string()));
        self
    }
}

#[async_trait]
impl DocumentFetcher for FakeFetcher {
    async fn open_stream(&self, url: &str) -> Result<Bytes, FetchError> {
        self.documents.get(url).cloned().ok_or_else(|| FetchError::Transport {
            url: url.to_string(),
            reason: "404 Not Found".to_string(),
        })
    }
}

/// Records launch requests.
pub struct FakeCompute {
    requests: Mutex<Vec<LaunchRequest>>,
    fail: bool,
    tx: mpsc::UnboundedSender<LaunchRequest>,
    rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<LaunchRequest>>,
}

impl Default for FakeCompute {
    fn default() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            requests: Mutex::new(Vec::new()),
            fail: false,
            tx,
            rx: tokio::sync::Mutex::new(rx),
        }
    }
}

impl FakeCompute {
    /// Record requests, then answer with an error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn requests(&self) -> Vec<LaunchRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Wait for the next dispatched request.
    pub async fn next_request(&self) -> LaunchRequest {
        let mut rx = self.rx.lock().await;
        tokio::time::timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no request dispatched")
            .expect("compute channel closed")
    }
}

#[async_trait]
impl ComputeRunner for FakeCompute {
    async fn run(&self, request: &LaunchRequest) -> Result<(), ClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let _ = self.tx.send(request.clone());
        if self.fail {
            return Err(ClientError::Status {
                status: 500,
                url: "http://compute/run".to_string(),
            });
        }
        Ok(())
    }
}

/// Records published statuses.
#[derive(Default)]
pub struct FakeStatusPublisher {
    published: Mutex<Vec<(TaskId, TaskStatus)>>,
}

impl FakeStatusPublisher {
    pub fn published(&self) -> Vec<(TaskId, TaskStatus)> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl StatusPublisher for FakeStatusPublisher {
    async fn publish(&self, task_id: &TaskId, status: TaskStatus) -> Result<(), ClientError> {
        self.published.lock().unwrap().push((task_id.clone(), status));
        Ok(())
    }
}

/// A launch service wired to fakes, serving a reference document that
/// covers 09:00-10:00Z on 2024-06-18 and 2024-09-18.
pub struct Harness {
    pub tasks: Arc<FakeTaskSource>,
    pub publisher: Arc<FakeStatusPublisher>,
    pub compute: Arc<FakeCompute>,
    pub service: LaunchService,
    pub manual: ManualLauncher,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_tasks(FakeTaskSource::default())
    }

    pub fn with_tasks(tasks: FakeTaskSource) -> Self {
        let document = rao_request_xml(
            &[
                "2024-06-18T09:00Z/2024-06-18T10:00Z",
                "2024-09-18T09:00Z/2024-09-18T10:00Z",
            ],
            &[
                ("CGM", "cgm-id"),
                ("CBCORA", "cbcora-id"),
                ("GLSK", "glsk-id"),
                ("REFPROG", "refprog-id"),
            ],
        );
        let fetcher = FakeFetcher::default().with_document(RAO_REQUEST_URL, &document);
        Self::with_fetcher(tasks, Arc::new(fetcher))
    }

    /// Download documents through a real whitelist check on `prefixes`.
    pub fn with_whitelist(prefixes: &[&str]) -> Self {
        let whitelist = prefixes.iter().map(|p| p.to_string()).collect();
        Self::with_fetcher(
            FakeTaskSource::default(),
            Arc::new(WhitelistedFetcher::new(whitelist)),
        )
    }

    fn with_fetcher(tasks: FakeTaskSource, fetcher: Arc<dyn DocumentFetcher>) -> Self {
        let tasks = Arc::new(tasks);
        let publisher = Arc::new(FakeStatusPublisher::default());
        let compute = Arc::new(FakeCompute::default());

        let service = LaunchService::new(
            LaunchGate::new(),
            ReferenceDocumentParser::new(fetcher),
            FileResourceMapper::new(Arc::new(FakeStorage), 1),
            TaskLifecycleCoordinator::new(tasks.clone(), publisher.clone()),
            AsyncDispatcher::new(compute.clone()),
        );
        let manual = ManualLauncher::new(tasks.clone(), service.clone());

        Self {
            tasks,
            publisher,
            compute,
            service,
            manual,
        }
    }
}
