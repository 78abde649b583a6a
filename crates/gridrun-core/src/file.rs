//! Input files of a task and their known types.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{ProcessFileStatus, Timestamp};

/// The closed set of input file types a run can consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    /// Common grid model.
    Cgm,
    /// Alternate (DC) grid model. Optional.
    DcCgm,
    /// Critical branches and remedial actions (constraint data).
    Cbcora,
    /// Generation and load shift keys.
    Glsk,
    /// Reference program.
    RefProg,
    /// Reference request document describing which files a run needs.
    RaoRequest,
    /// Virtual hub data.
    VirtualHub,
}

impl FileType {
    /// Every known file type.
    pub const ALL: [FileType; 7] = [
        Self::Cgm,
        Self::DcCgm,
        Self::Cbcora,
        Self::Glsk,
        Self::RefProg,
        Self::RaoRequest,
        Self::VirtualHub,
    ];

    /// Tag used by the task manager for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cgm => "CGM",
            Self::DcCgm => "DCCGM",
            Self::Cbcora => "CBCORA",
            Self::Glsk => "GLSK",
            Self::RefProg => "REFPROG",
            Self::RaoRequest => "RAOREQUEST",
            Self::VirtualHub => "VIRTUALHUB",
        }
    }

    /// Map a raw tag to a known type. Unknown tags yield `None`.
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An input file as described by the task manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessFile {
    /// Object storage path. `None` means the file was never provided.
    pub file_path: Option<String>,

    /// Raw file type tag. Kept as received so unknown tags can be reported.
    pub file_type: String,

    /// Validation status.
    #[serde(rename = "processFileStatus", default)]
    pub status: ProcessFileStatus,

    /// Display filename.
    pub filename: String,

    /// Identifier referenced by reference documents. The reference document
    /// itself has none.
    #[serde(default)]
    pub document_id: Option<String>,

    /// Last modification of the file.
    #[serde(rename = "lastModificationDate", default)]
    pub timestamp: Option<Timestamp>,
}

impl ProcessFile {
    /// Create a validated file of the given type.
    pub fn new(
        file_type: impl Into<String>,
        file_path: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            file_path: Some(file_path.into()),
            file_type: file_type.into(),
            status: ProcessFileStatus::Validated,
            filename: filename.into(),
            document_id: None,
            timestamp: None,
        }
    }

    /// Builder method to set the document identifier.
    pub fn with_document_id(mut self, document_id: impl Into<String>) -> Self {
        self.document_id = Some(document_id.into());
        self
    }

    /// The known type of this file, if any.
    pub fn known_type(&self) -> Option<FileType> {
        FileType::from_tag(&self.file_type)
    }

    /// Returns true if this file carries the given type tag.
    pub fn is_type(&self, file_type: FileType) -> bool {
        self.file_type == file_type.as_str()
    }
}

/// A downloadable file handed to the compute engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileResource {
    /// Display filename.
    pub filename: String,

    /// Time-limited download URL.
    pub url: String,
}

impl FileResource {
    /// Create a new FileResource.
    pub fn new(filename: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            url: url.into(),
        }
    }
}
