//! Selection of the manifest entry that applies to a task timestamp.

use gridrun_core::Timestamp;

use crate::error::LaunchError;
use crate::reference::{ManifestEntry, ReferenceDocument};

/// Code of the entry describing the reference document itself.
pub const SELF_DESCRIPTION_CODE: &str = "CFG_RAO";

/// Scheme prefix of document identifier URLs.
pub const DOCUMENT_ID_SCHEME: &str = "documentIdentification://";

/// First entry whose interval contains `timestamp`.
pub fn select_entry<'a>(
    document: &'a ReferenceDocument,
    timestamp: &Timestamp,
) -> Result<&'a ManifestEntry, LaunchError> {
    document
        .entries
        .iter()
        .find(|entry| entry.interval.contains(timestamp))
        .ok_or(LaunchError::NoDataForTimestamp(*timestamp))
}

/// Document identifiers required at `timestamp`.
pub fn resolve_document_ids(
    document: &ReferenceDocument,
    timestamp: &Timestamp,
) -> Result<Vec<String>, LaunchError> {
    let entry = select_entry(document, timestamp)?;

    Ok(entry
        .files
        .iter()
        .filter(|file| file.code.as_deref() != Some(SELF_DESCRIPTION_CODE))
        .map(|file| {
            file.url
                .strip_prefix(DOCUMENT_ID_SCHEME)
                .unwrap_or(&file.url)
                .to_string()
        })
        .collect())
}
