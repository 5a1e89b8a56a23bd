#![allow(dead_code)]

use bytes::Bytes;

/// One uploaded CV. `name` is the unique key within the registry; `content`
/// is the raw file bytes, opaque on this side of the wire.
#[derive(Debug, Clone)]
pub struct CandidateDocument {
    pub name: String,
    pub content: Bytes,
}

impl CandidateDocument {
    pub fn new(name: impl Into<String>, content: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }
}

/// The job description the CVs are matched against. Singleton — a new upload
/// replaces it wholesale.
#[derive(Debug, Clone)]
pub struct JobDescriptor {
    pub display_name: String,
    pub content: Bytes,
}

/// Deduplicated, order-preserving collection of uploaded CVs.
///
/// Names are unique. A re-upload under an existing name replaces the stored
/// content in place, keeping the first-seen position (last write wins).
#[derive(Debug, Default)]
pub struct FileRegistry {
    documents: Vec<CandidateDocument>,
}

impl FileRegistry {
    pub fn add(&mut self, documents: Vec<CandidateDocument>) {
        for document in documents {
            match self.documents.iter_mut().find(|d| d.name == document.name) {
                Some(existing) => *existing = document,
                None => self.documents.push(document),
            }
        }
    }

    /// Removes one entry if present; no-op otherwise.
    pub fn remove(&mut self, name: &str) {
        self.documents.retain(|d| d.name != name);
    }

    pub fn get(&self, name: &str) -> Option<&CandidateDocument> {
        self.documents.iter().find(|d| d.name == name)
    }

    pub fn list(&self) -> &[CandidateDocument] {
        &self.documents
    }

    /// Name-only projection, in stored order. This is what gets persisted.
    pub fn names(&self) -> Vec<String> {
        self.documents.iter().map(|d| d.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
