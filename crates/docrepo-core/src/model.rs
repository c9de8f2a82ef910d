//! Identifiers and records stored by the repository

use std::fmt;

use serde::{Deserialize, Serialize};

/// Unique logical name of a citation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitationName(String);

impl CitationName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CitationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CitationName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Compound `(tag, version)` identifier shared by documents, types and drafts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DocumentId {
    pub tag: String,
    pub version: String,
}

impl DocumentId {
    pub fn new(tag: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            version: version.into(),
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tag, self.version)
    }
}

/// Name of an unordered message queue
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueName(String);

impl QueueName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QueueName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Immutable named pointer to one document version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    pub name: CitationName,
    pub tag: String,
    pub version: String,
    /// Integrity hash of the cited document version
    pub hash: String,
}

impl Citation {
    pub fn new(
        name: impl Into<String>,
        tag: impl Into<String>,
        version: impl Into<String>,
        hash: impl Into<String>,
    ) -> Self {
        Self {
            name: CitationName::new(name),
            tag: tag.into(),
            version: version.into(),
            hash: hash.into(),
        }
    }

    /// Identifier of the cited document
    pub fn document_id(&self) -> DocumentId {
        DocumentId::new(self.tag.clone(), self.version.clone())
    }
}
