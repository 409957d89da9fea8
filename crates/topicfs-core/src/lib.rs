//! topicfs-core: a topic-tree filesystem over a chat service
//!
//! The backing service offers one channel holding a flat list of topics and
//! full-text message search — no hierarchy. This crate emulates a directory
//! tree on top of it: a directory is a topic whose title is the directory's
//! full canonical path, a file is a message whose body is the file's full
//! canonical path, and ancestry is recomputed from those strings on every
//! query.
//!
//! [`TopicFs`] is the facade most embedders want: mount it on a channel via
//! a [`client::remote::SessionFactory`] for the concrete transport, then
//! call `list`, `mkdir`, `rmdir` and `find_object`. Remote calls go through
//! a connection gateway that bounds concurrency and retries flood-wait
//! rejections with exponential backoff; channel and topic lookups are
//! memoized for a short TTL window.
//!
//! For lower-level access, use the individual modules directly.

pub mod cache;
pub mod client;
pub mod config;
pub mod entry;
pub mod error;
pub mod fs;
pub mod hash;
pub mod path;

mod resolver;
mod search;

// Re-export the facade
pub use fs::TopicFs;

// Re-export commonly used types
pub use client::Client;
pub use client::remote::{RemoteService, SessionFactory};
pub use config::Options;
pub use entry::{DirEntry, Entry, FileEntry, MAX_OBJECT_SIZE};
pub use error::{FsError, FsResult, RemoteError};
pub use path::{Location, ROOT_PREFIX};
