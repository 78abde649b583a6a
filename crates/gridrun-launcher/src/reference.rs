//! Reference (RAO request) document parsing.
//!
//! The document lists, per validity interval, the files a run needs:
//!
//! ```xml
//! <RequestMessage>
//!   <Payload>
//!     <RequestItems>
//!       <RequestItem timeInterval="2024-06-18T09:00Z/2024-06-18T10:00Z">
//!         <Files>
//!           <File type="CGM" code="CGM" url="documentIdentification://cgm-id"/>
//!         </Files>
//!       </RequestItem>
//!     </RequestItems>
//!   </Payload>
//! </RequestMessage>
//! ```
//!
//! Element and attribute names are matched on their local part, so any
//! namespace prefix is accepted.

use std::sync::Arc;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use gridrun_core::Interval;

use crate::error::{ImportError, LaunchError};
use crate::ports::DocumentFetcher;

const ROOT: &[u8] = b"RequestMessage";
const REQUEST_ITEM: &[u8] = b"RequestItem";
const FILE: &[u8] = b"File";

/// A parsed reference document: manifest entries in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceDocument {
    pub entries: Vec<ManifestEntry>,
}

/// Files required for one validity interval.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestEntry {
    pub interval: Interval,
    pub files: Vec<ManifestFile>,
}

/// One file reference inside a manifest entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub url: String,
    pub code: Option<String>,
    pub file_type: Option<String>,
}

/// Downloads and parses reference documents.
#[derive(Clone)]
pub struct ReferenceDocumentParser {
    fetcher: Arc<dyn DocumentFetcher>,
}

impl ReferenceDocumentParser {
    pub fn new(fetcher: Arc<dyn DocumentFetcher>) -> Self {
        Self { fetcher }
    }

    /// Download the document at `url` and parse it.
    pub async fn import(&self, url: &str) -> Result<ReferenceDocument, LaunchError> {
        let bytes = self.fetcher.open_stream(url).await?;
        debug!(bytes = bytes.len(), "Reference document downloaded");
        Ok(Self::parse(&bytes)?)
    }

    /// Parse document bytes.
    pub fn parse(bytes: &[u8]) -> Result<ReferenceDocument, ImportError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut document = ReferenceDocument::default();
        let mut current: Option<ManifestEntry> = None;
        let mut depth = 0usize;
        let mut seen_root = false;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| malformed(format!("at byte {}: {}", reader.buffer_position(), e)))?;

            match event {
                Event::Start(element) => {
                    check_root(&element, depth, &mut seen_root)?;
                    depth += 1;
                    match element.local_name().as_ref() {
                        REQUEST_ITEM => current = Some(start_entry(&element)?),
                        FILE => push_file(&element, current.as_mut())?,
                        _ => {}
                    }
                }
                Event::Empty(element) => {
                    check_root(&element, depth, &mut seen_root)?;
                    match element.local_name().as_ref() {
                        REQUEST_ITEM => document.entries.push(start_entry(&element)?),
                        FILE => push_file(&element, current.as_mut())?,
                        _ => {}
                    }
                }
                Event::End(element) => {
                    depth = depth.saturating_sub(1);
                    if element.local_name().as_ref() == REQUEST_ITEM {
                        document.entries.extend(current.take());
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !seen_root {
            return Err(malformed("no root element"));
        }
        if depth != 0 {
            return Err(malformed("unexpected end of document"));
        }
        Ok(document)
    }
}

fn malformed(reason: impl Into<String>) -> ImportError {
    ImportError::Malformed(reason.into())
}

fn check_root(element: &BytesStart<'_>, depth: usize, seen_root: &mut bool) -> Result<(), ImportError> {
    if depth > 0 {
        return Ok(());
    }
    if *seen_root {
        return Err(malformed("more than one root element"));
    }
    if element.local_name().as_ref() != ROOT {
        return Err(malformed(format!(
            "unexpected root element '{}'",
            String::from_utf8_lossy(element.name().as_ref())
        )));
    }
    *seen_root = true;
    Ok(())
}

/// Value of the attribute with the given local name.
fn attribute(element: &BytesStart<'_>, name: &[u8]) -> Result<Option<String>, ImportError> {
    for attr in element.attributes() {
        let attr = attr.map_err(|e| malformed(e.to_string()))?;
        if attr.key.local_name().as_ref() == name {
            let value = attr.unescape_value().map_err(|e| malformed(e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn start_entry(element: &BytesStart<'_>) -> Result<ManifestEntry, ImportError> {
    let raw = attribute(element, b"timeInterval")?
        .ok_or_else(|| malformed("RequestItem without timeInterval"))?;
    let interval = raw
        .parse::<Interval>()
        .map_err(|e| malformed(format!("RequestItem timeInterval '{}': {}", raw, e)))?;

    Ok(ManifestEntry {
        interval,
        files: Vec::new(),
    })
}

fn push_file(element: &BytesStart<'_>, entry: Option<&mut ManifestEntry>) -> Result<(), ImportError> {
    // Files outside a RequestItem belong to no interval.
    let Some(entry) = entry else {
        return Ok(());
    };

    let url = attribute(element, b"url")?.ok_or_else(|| malformed("File without url"))?;
    entry.files.push(ManifestFile {
        url,
        code: attribute(element, b"code")?,
        file_type: attribute(element, b"type")?,
    });
    Ok(())
}
