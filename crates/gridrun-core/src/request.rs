//! The request handed to the compute engine.

use serde::{Deserialize, Serialize};

use crate::{FileResource, FileType, RunId, TaskId, TaskParameter, Timestamp};

/// One optional slot per [`FileType`].
///
/// Slots are addressed through the enum, so a new file type cannot be added
/// without deciding where it goes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedFileSet {
    pub cgm: Option<FileResource>,
    pub dc_cgm: Option<FileResource>,
    pub cbcora: Option<FileResource>,
    pub glsk: Option<FileResource>,
    pub ref_prog: Option<FileResource>,
    pub rao_request: Option<FileResource>,
    pub virtual_hub: Option<FileResource>,
}

impl ResolvedFileSet {
    fn slot_mut(&mut self, file_type: FileType) -> &mut Option<FileResource> {
        match file_type {
            FileType::Cgm => &mut self.cgm,
            FileType::DcCgm => &mut self.dc_cgm,
            FileType::Cbcora => &mut self.cbcora,
            FileType::Glsk => &mut self.glsk,
            FileType::RefProg => &mut self.ref_prog,
            FileType::RaoRequest => &mut self.rao_request,
            FileType::VirtualHub => &mut self.virtual_hub,
        }
    }

    /// Fill the slot for `file_type`, replacing any previous value.
    pub fn set(&mut self, file_type: FileType, resource: FileResource) {
        *self.slot_mut(file_type) = Some(resource);
    }

    /// Read the slot for `file_type`.
    pub fn get(&self, file_type: FileType) -> Option<&FileResource> {
        match file_type {
            FileType::Cgm => self.cgm.as_ref(),
            FileType::DcCgm => self.dc_cgm.as_ref(),
            FileType::Cbcora => self.cbcora.as_ref(),
            FileType::Glsk => self.glsk.as_ref(),
            FileType::RefProg => self.ref_prog.as_ref(),
            FileType::RaoRequest => self.rao_request.as_ref(),
            FileType::VirtualHub => self.virtual_hub.as_ref(),
        }
    }

    /// Returns true if the slot for `file_type` is filled.
    pub fn contains(&self, file_type: FileType) -> bool {
        self.get(file_type).is_some()
    }
}

/// Everything the compute engine needs to start a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchRequest {
    /// Task being computed.
    pub id: TaskId,

    /// Run recorded for this launch.
    pub run_id: RunId,

    /// Task timestamp.
    pub timestamp: Timestamp,

    /// Resolved input files.
    #[serde(flatten)]
    pub files: ResolvedFileSet,

    /// Whether the launch came from a task update rather than a user.
    pub launched_automatically: bool,

    /// Run parameters, passed through untouched.
    pub task_parameter_list: Option<Vec<TaskParameter>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get_every_slot() {
        let mut files = ResolvedFileSet::default();
        for file_type in FileType::ALL {
            assert!(!files.contains(file_type));
            files.set(file_type, FileResource::new(file_type.as_str(), "url"));
        }
        for file_type in FileType::ALL {
            assert_eq!(files.get(file_type).map(|r| r.filename.as_str()), Some(file_type.as_str()));
        }
    }

    #[test]
    fn test_launch_request_flattens_files() {
        let mut files = ResolvedFileSet::default();
        files.set(FileType::Cgm, FileResource::new("cgm.zip", "http://minio/cgm"));
        let request = LaunchRequest {
            id: TaskId::new("task"),
            run_id: RunId::new("run"),
            timestamp: "2024-06-18T09:30Z".parse().unwrap(),
            files,
            launched_automatically: false,
            task_parameter_list: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["cgm"]["filename"], "cgm.zip");
        assert!(json["dcCgm"].is_null());
        assert_eq!(json["runId"], "run");
        assert_eq!(json["launchedAutomatically"], false);
    }
}
