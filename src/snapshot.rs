//! Thread snapshot parsing and attachment extraction.

use std::collections::BTreeMap;

use serde::Deserialize;
use thiserror::Error;

/// Attachment file name (`<tim><ext>`) to the size the server declared for it.
pub type AttachmentSet = BTreeMap<String, u64>;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Malformed thread metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed thread metadata: post {post} has an attachment but no extension")]
    MissingExtension { post: u64 },
}

/// The subset of a post we care about. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Post {
    #[serde(default)]
    pub no: u64,
    /// Server-assigned upload timestamp; present only on posts with a file.
    pub tim: Option<u64>,
    pub ext: Option<String>,
    pub fsize: Option<u64>,
    /// Only meaningful on the opening post.
    pub archived: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ThreadDocument {
    posts: Vec<Post>,
}

/// Parsed metadata for one poll cycle.
#[derive(Debug, Clone)]
pub struct ThreadSnapshot {
    posts: Vec<Post>,
}

/// Result of looking at a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Archived,
    Attachments(AttachmentSet),
}

impl ThreadSnapshot {
    pub fn parse(body: &str) -> Result<Self, SnapshotError> {
        let doc: ThreadDocument = serde_json::from_str(body)?;
        if let Some(post) = doc.posts.iter().find(|p| p.tim.is_some() && p.ext.is_none()) {
            return Err(SnapshotError::MissingExtension { post: post.no });
        }
        Ok(Self { posts: doc.posts })
    }

    pub fn is_archived(&self) -> bool {
        self.posts.first().and_then(|p| p.archived) == Some(1)
    }

    /// Every post carrying a file, keyed by the name it is served under.
    pub fn attachments(&self) -> AttachmentSet {
        self.posts
            .iter()
            .filter_map(|p| {
                let tim = p.tim?;
                let ext = p.ext.as_deref()?;
                Some((format!("{tim}{ext}"), p.fsize.unwrap_or(0)))
            })
            .collect()
    }

    /// Archive check (unless bypassed) followed by attachment extraction.
    pub fn extract(&self, bypass_archive_check: bool) -> Extraction {
        if !bypass_archive_check && self.is_archived() {
            return Extraction::Archived;
        }
        Extraction::Attachments(self.attachments())
    }
}
