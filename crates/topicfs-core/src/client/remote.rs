//! Collaborator boundary: the remote chat service.
//!
//! The wire protocol client is out of scope for this crate; it plugs in
//! behind these traits. A `RemoteService` is one authenticated session, a
//! `SessionFactory` knows how to open the two sessions the gateway needs.
//!
//! # Dyn-compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of `impl Future` so that
//! `Arc<dyn RemoteService>` and `Box<dyn SessionFactory>` work. All input
//! references share a single lifetime `'a` so the returned future can
//! borrow from both `&self` and any arguments.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use super::types::{Channel, SearchPage, Topic, UpdateEvent};
use crate::error::RemoteError;

/// Boxed, Send future — the return type for all collaborator methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One live, authenticated session against the remote chat service.
///
/// Every call may fail with the distinguished flood-wait status; the
/// gateway, not the session, decides whether to retry.
pub trait RemoteService: Send + Sync {
    /// Whether the underlying transport is still alive.
    fn is_connected(&self) -> bool;

    /// Re-establish a dropped transport in place.
    fn reconnect<'a>(&'a self) -> BoxFuture<'a, Result<(), RemoteError>>;

    /// Look up the channel record by id. `None` means the channel does not
    /// exist or this session cannot see it.
    fn channel_lookup<'a>(
        &'a self,
        channel_id: i64,
    ) -> BoxFuture<'a, Result<Option<Channel>, RemoteError>>;

    /// List the channel's topics matching a title filter.
    fn topics_list<'a>(
        &'a self,
        channel: &'a Channel,
        filter: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Topic>, RemoteError>>;

    /// Create a topic. Success is only observable through the returned
    /// update stream, which should carry a creation receipt.
    fn topic_create<'a>(
        &'a self,
        channel: &'a Channel,
        title: &'a str,
    ) -> BoxFuture<'a, Result<Vec<UpdateEvent>, RemoteError>>;

    /// Delete a topic and its message history.
    fn topic_delete_history<'a>(
        &'a self,
        channel: &'a Channel,
        topic_id: i32,
    ) -> BoxFuture<'a, Result<(), RemoteError>>;

    /// Search messages by text, scoped to a topic, from a result offset.
    fn message_search<'a>(
        &'a self,
        channel: &'a Channel,
        topic_id: i32,
        query: &'a str,
        offset: i32,
    ) -> BoxFuture<'a, Result<SearchPage, RemoteError>>;
}

/// Opens the gateway's two session handles on demand.
pub trait SessionFactory: Send + Sync {
    /// The primary session, used for all filesystem operations.
    fn open_primary<'a>(&'a self) -> BoxFuture<'a, Result<Arc<dyn RemoteService>, RemoteError>>;

    /// The secondary session, used for elevated-privilege operations by
    /// the upload collaborator. Never opened in test-server mode.
    fn open_elevated<'a>(&'a self) -> BoxFuture<'a, Result<Arc<dyn RemoteService>, RemoteError>>;
}
