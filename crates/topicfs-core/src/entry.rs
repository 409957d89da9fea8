//! Outbound directory-entry contract.
//!
//! What a generic storage frontend sees: directories carry a name,
//! timestamp, opaque id and item count (`-1` when unknown); files carry a
//! name, timestamp and the fixed maximum-size ceiling, since per-file size
//! is not tracked by this layer.

use chrono::{DateTime, TimeZone, Utc};

use crate::client::types::{Topic, UserMessage};
use crate::hash;
use crate::path;

/// Maximum object size accepted by the remote, surfaced as every file's
/// size.
pub const MAX_OBJECT_SIZE: i64 = 2 << 30;

/// One listing entry.
#[derive(Debug, Clone)]
pub enum Entry {
    Directory(DirEntry),
    File(FileEntry),
}

/// A directory, as exposed to the storage frontend.
#[derive(Debug, Clone)]
pub struct DirEntry {
    /// Path relative to the mount root.
    pub name: String,
    /// Opaque identifier (the backing topic id).
    pub id: String,
    pub modified: DateTime<Utc>,
    /// Number of objects inside, or -1 when enumeration failed.
    pub items: i64,
    /// Always -1: directory size is not meaningful here.
    pub size: i64,
}

impl DirEntry {
    pub(crate) fn from_topic(topic: &Topic, root: &str, items: i64) -> Self {
        let trailed = path::trail(root);
        let name = topic
            .title
            .strip_prefix(&trailed)
            .unwrap_or(&topic.title)
            .to_string();
        Self {
            name,
            id: topic.id.to_string(),
            modified: timestamp(topic.date),
            items,
            size: -1,
        }
    }
}

/// A file, as exposed to the storage frontend.
#[derive(Debug, Clone)]
pub struct FileEntry {
    /// Path relative to the mount root.
    pub name: String,
    /// Full canonical path (the message body).
    pub absolute: String,
    /// Backing message id.
    pub id: i32,
    pub modified: DateTime<Utc>,
    pub size: i64,
}

impl FileEntry {
    pub(crate) fn from_message(message: &UserMessage, root: &str) -> Self {
        let name = if message.body == root {
            path::base(root).to_string()
        } else {
            let trailed = path::trail(root);
            message
                .body
                .strip_prefix(&trailed)
                .unwrap_or(&message.body)
                .to_string()
        };
        Self {
            name,
            absolute: message.body.clone(),
            id: message.id,
            modified: timestamp(message.date),
            size: MAX_OBJECT_SIZE,
        }
    }

    /// Placeholder content identity for checksum listings.
    pub fn content_id(&self) -> String {
        hash::placeholder_object_id(&self.absolute)
    }
}

fn timestamp(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}
