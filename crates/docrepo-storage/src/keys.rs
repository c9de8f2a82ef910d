//! Name-to-key layout and record framing
//!
//! Every backend stores records under these keys, so the functions here must
//! stay bit-exact:
//!
//! ```text
//! citations/{name with '/' and '\' replaced by '_'}.json
//! drafts/{tag}/{version}.json
//! documents/{tag}/{version}.json
//! types/{tag}/{version}.json
//! queues/{queue}/{token}.json
//! ```

use std::string::FromUtf8Error;

use crate::{Result, StorageError};

/// Suffix appended to every record key
pub const RECORD_SUFFIX: &str = ".json";

pub const CITATIONS_PREFIX: &str = "citations/";
pub const DRAFTS_PREFIX: &str = "drafts/";
pub const DOCUMENTS_PREFIX: &str = "documents/";
pub const TYPES_PREFIX: &str = "types/";
pub const QUEUES_PREFIX: &str = "queues/";

/// Key for a citation name
pub fn citation_key(name: &str) -> String {
    let flattened = name.replace(['/', '\\'], "_");
    format!("{CITATIONS_PREFIX}{flattened}{RECORD_SUFFIX}")
}

/// Key for a draft
pub fn draft_key(tag: &str, version: &str) -> String {
    versioned_key(DRAFTS_PREFIX, tag, version)
}

/// Key for a committed document
pub fn document_key(tag: &str, version: &str) -> String {
    versioned_key(DOCUMENTS_PREFIX, tag, version)
}

/// Key for a committed type definition
pub fn type_key(tag: &str, version: &str) -> String {
    versioned_key(TYPES_PREFIX, tag, version)
}

/// Prefix under which all messages of a queue are stored
pub fn queue_prefix(queue: &str) -> String {
    format!("{QUEUES_PREFIX}{queue}/")
}

/// Key for one message of a queue
pub fn message_key(queue: &str, token: &str) -> String {
    format!("{}{token}{RECORD_SUFFIX}", queue_prefix(queue))
}

fn versioned_key(prefix: &str, tag: &str, version: &str) -> String {
    format!("{prefix}{tag}/{version}{RECORD_SUFFIX}")
}

/// Reject keys that cannot be mapped safely onto paths or URLs
///
/// A valid key is non-empty, relative, uses `/` as its only separator and has
/// no empty, `.` or `..` segments.
pub fn validate_key(key: &str) -> Result<()> {
    let well_formed = !key.is_empty()
        && !key.contains(['\\', '\0'])
        && key
            .split('/')
            .all(|segment| !segment.is_empty() && segment != "." && segment != "..");

    if well_formed {
        Ok(())
    } else {
        Err(StorageError::invalid_key(key))
    }
}

/// Reject identifier parts that would not occupy exactly one key segment
///
/// Tags, versions and queue names are spliced into keys between `/`
/// separators. A part containing `/` would alias another identifier or nest
/// one queue inside another.
pub fn validate_segment(segment: &str) -> Result<()> {
    if segment.contains('/') {
        return Err(StorageError::invalid_key(segment));
    }
    validate_key(segment)
}

/// Frame a payload as a stored record: UTF-8 text followed by one `\n`
pub fn encode_record(payload: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(payload.len() + 1);
    bytes.extend_from_slice(payload.as_bytes());
    bytes.push(b'\n');
    bytes
}

/// Undo [`encode_record`], stripping exactly one trailing `\n`
pub fn decode_record(mut bytes: Vec<u8>) -> std::result::Result<String, FromUtf8Error> {
    if bytes.last() == Some(&b'\n') {
        bytes.pop();
    }
    String::from_utf8(bytes)
}
