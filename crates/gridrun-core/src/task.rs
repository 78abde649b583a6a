//! Task and Run types.

use serde::{Deserialize, Serialize};

use crate::{FileType, ProcessFile, RunId, TaskId, TaskStatus, Timestamp};

/// A Task gathers every input file received for one timestamp.
///
/// Tasks are owned by the task manager; this crate only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique task identifier.
    pub id: TaskId,

    /// Instant the task computes. Unique key for launch purposes.
    pub timestamp: Timestamp,

    /// Current task status.
    pub status: TaskStatus,

    /// Currently selected input files, one per type.
    #[serde(default)]
    pub inputs: Vec<ProcessFile>,

    /// Every known input file, including older versions.
    #[serde(default)]
    pub available_inputs: Vec<ProcessFile>,

    /// Previous runs, oldest first.
    #[serde(default)]
    pub run_history: Vec<Run>,

    /// Optional run parameters.
    #[serde(default)]
    pub parameters: Option<Vec<TaskParameter>>,
}

impl Task {
    /// Create a new Task with no files.
    pub fn new(id: TaskId, timestamp: Timestamp, status: TaskStatus) -> Self {
        Self {
            id,
            timestamp,
            status,
            inputs: Vec::new(),
            available_inputs: Vec::new(),
            run_history: Vec::new(),
            parameters: None,
        }
    }

    /// Builder method to add a file to both the selected and available inputs.
    pub fn with_input(mut self, file: ProcessFile) -> Self {
        self.available_inputs.push(file.clone());
        self.inputs.push(file);
        self
    }

    /// Builder method to add a file to the available inputs only.
    pub fn with_available_input(mut self, file: ProcessFile) -> Self {
        self.available_inputs.push(file);
        self
    }

    /// Builder method to append a run to the history.
    pub fn with_run(mut self, run: Run) -> Self {
        self.run_history.push(run);
        self
    }

    /// Builder method to set parameters.
    pub fn with_parameters(mut self, parameters: Vec<TaskParameter>) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// First selected input carrying the given type tag.
    pub fn selected_input(&self, file_type: FileType) -> Option<&ProcessFile> {
        self.inputs.iter().find(|f| f.is_type(file_type))
    }

    /// First available input carrying the given type tag.
    pub fn available_input(&self, file_type: FileType) -> Option<&ProcessFile> {
        self.available_inputs.iter().find(|f| f.is_type(file_type))
    }

    /// First available input whose document identifier equals `document_id`.
    pub fn available_input_by_document_id(&self, document_id: &str) -> Option<&ProcessFile> {
        self.available_inputs
            .iter()
            .find(|f| f.document_id.as_deref() == Some(document_id))
    }

    /// The most recent run, by execution date.
    pub fn latest_run(&self) -> Option<&Run> {
        self.run_history.iter().max_by_key(|run| run.execution_date)
    }
}

/// One launch of a task, with the inputs frozen at launch time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Run {
    /// Unique run identifier.
    pub id: RunId,

    /// When the run was recorded.
    pub execution_date: Timestamp,

    /// Input files used by the run.
    #[serde(default)]
    pub inputs: Vec<ProcessFile>,
}

impl Run {
    /// Create a new Run with a fresh identifier.
    pub fn new(execution_date: Timestamp, inputs: Vec<ProcessFile>) -> Self {
        Self {
            id: RunId::generate(),
            execution_date,
            inputs,
        }
    }
}

/// A named run parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskParameter {
    /// Parameter identifier.
    pub id: String,

    /// Value type (e.g. `BOOLEAN`, `INT`, `STRING`).
    #[serde(default)]
    pub parameter_type: String,

    /// Value set for this task.
    #[serde(default)]
    pub value: Option<String>,

    /// Value used when none is set.
    #[serde(default)]
    pub default_value: Option<String>,
}
