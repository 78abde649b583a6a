//! Matching of required documents against a task's files.

use std::sync::Arc;

use tracing::{debug, warn};

use gridrun_core::{FileResource, FileType, ProcessFile, ResolvedFileSet, Task};

use crate::error::LaunchError;
use crate::ports::ObjectStorage;

/// Files resolved for one launch.
#[derive(Debug, Clone, Default)]
pub struct MappedFiles {
    /// Download URLs, one slot per file type.
    pub files: ResolvedFileSet,

    /// The task files that went into `files`, recorded as the run's inputs.
    pub snapshot: Vec<ProcessFile>,
}

impl MappedFiles {
    fn add(&mut self, file_type: FileType, file: &ProcessFile, resource: FileResource) {
        self.files.set(file_type, resource);
        if !self.snapshot.contains(file) {
            self.snapshot.push(file.clone());
        }
    }
}

/// Turns task files into presigned download resources.
#[derive(Clone)]
pub struct FileResourceMapper {
    storage: Arc<dyn ObjectStorage>,
    expiry_hours: u32,
}

impl FileResourceMapper {
    pub fn new(storage: Arc<dyn ObjectStorage>, expiry_hours: u32) -> Self {
        Self {
            storage,
            expiry_hours,
        }
    }

    /// The selected reference request document of the task.
    pub fn find_reference_request<'a>(&self, task: &'a Task) -> Result<&'a ProcessFile, LaunchError> {
        task.selected_input(FileType::RaoRequest).ok_or_else(|| {
            LaunchError::MissingFile(format!("No RAOREQUEST file found in task {}", task.timestamp))
        })
    }

    /// The available file carrying `document_id`.
    pub fn find_by_document_id<'a>(
        &self,
        task: &'a Task,
        document_id: &str,
    ) -> Result<&'a ProcessFile, LaunchError> {
        task.available_input_by_document_id(document_id).ok_or_else(|| {
            LaunchError::MissingFile(format!(
                "No file found in task {} matching DocumentId {}",
                task.timestamp, document_id
            ))
        })
    }

    /// The selected virtual hub file. Required for every run.
    pub fn find_virtual_hub<'a>(&self, task: &'a Task) -> Result<&'a ProcessFile, LaunchError> {
        task.selected_input(FileType::VirtualHub).ok_or_else(|| {
            LaunchError::MissingFile(format!("No VIRTUALHUB file found in task {}", task.timestamp))
        })
    }

    /// The alternate grid model, selected first, then any available version.
    /// Files without a storage path count as absent.
    pub fn find_dc_cgm<'a>(&self, task: &'a Task) -> Option<&'a ProcessFile> {
        let with_path = |f: &&ProcessFile| f.file_path.is_some();
        task.selected_input(FileType::DcCgm)
            .filter(with_path)
            .or_else(|| task.available_input(FileType::DcCgm).filter(with_path))
    }

    /// Presign `file` into a download resource.
    pub async fn to_resource(&self, file: &ProcessFile) -> Result<FileResource, LaunchError> {
        let path = file.file_path.as_deref().ok_or_else(|| {
            LaunchError::MissingFile(format!(
                "File {} of type {} has no storage path",
                file.filename, file.file_type
            ))
        })?;
        let url = self.storage.presigned_url(path, self.expiry_hours).await?;
        Ok(FileResource::new(file.filename.clone(), url))
    }

    /// Add `file` to the set under its type. Unknown types and path-less
    /// alternate grid models are skipped.
    pub async fn add_to_set(
        &self,
        mapped: &mut MappedFiles,
        file: &ProcessFile,
    ) -> Result<(), LaunchError> {
        let Some(file_type) = file.known_type() else {
            warn!(
                file_type = %file.file_type,
                filename = %file.filename,
                "File type not handled, ignoring it"
            );
            return Ok(());
        };

        if file_type == FileType::DcCgm && file.file_path.is_none() {
            debug!(filename = %file.filename, "DCCGM file has no path, ignoring it");
            return Ok(());
        }

        let resource = self.to_resource(file).await?;
        mapped.add(file_type, file, resource);
        Ok(())
    }

    /// Build the file set of a run.
    ///
    /// `reference_request` is the already presigned reference document and
    /// `document_ids` the identifiers its applicable entry requires.
    pub async fn map(
        &self,
        task: &Task,
        reference_request: (&ProcessFile, FileResource),
        document_ids: &[String],
    ) -> Result<MappedFiles, LaunchError> {
        let mut mapped = MappedFiles::default();
        let (request_file, request_resource) = reference_request;
        mapped.add(FileType::RaoRequest, request_file, request_resource);

        for document_id in document_ids {
            let file = self.find_by_document_id(task, document_id)?;
            self.add_to_set(&mut mapped, file).await?;
        }

        let virtual_hub = self.find_virtual_hub(task)?;
        self.add_to_set(&mut mapped, virtual_hub).await?;

        if !mapped.files.contains(FileType::DcCgm) {
            if let Some(dc_cgm) = self.find_dc_cgm(task) {
                self.add_to_set(&mut mapped, dc_cgm).await?;
            }
        }

        Ok(mapped)
    }
}
