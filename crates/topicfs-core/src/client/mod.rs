//! Composed remote client: gateway, lookup caches and mutex domains.
//!
//! `Client` is the single owner of everything that talks to the remote
//! service. The channel record and topic listings are memoized in two
//! independent short-TTL caches; directory mutations and message searches
//! each serialize behind their own coarse lock (see the resolver and
//! search modules for the operations taking them).

pub mod gateway;
pub mod remote;
pub mod types;

use std::time::Duration;

use tokio::sync::Mutex;

use crate::cache::TtlCache;
use crate::config::Options;
use crate::error::{FsError, FsResult};
use gateway::Gateway;
use remote::SessionFactory;
use types::{Channel, Topic};

/// Rate-limited, caching client for one channel.
pub struct Client {
    pub(crate) gateway: Gateway,
    pub(crate) channels: TtlCache<Channel>,
    pub(crate) topics: TtlCache<Vec<Topic>>,
    /// Serializes topic create/delete against each other.
    pub(crate) dir_lock: Mutex<()>,
    /// Serializes message-search calls against each other.
    pub(crate) search_lock: Mutex<()>,
    pub(crate) channel_id: i64,
}

impl Client {
    pub fn new(factory: Box<dyn SessionFactory>, options: &Options) -> Self {
        let ttl = Duration::from_secs(options.cache_ttl_seconds);
        Self {
            gateway: Gateway::new(factory, options),
            channels: TtlCache::new(ttl),
            topics: TtlCache::new(ttl),
            dir_lock: Mutex::new(()),
            search_lock: Mutex::new(()),
            channel_id: options.channel_id,
        }
    }

    /// The gateway, for collaborators needing the raw session handles.
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// The backing channel record, cached for the TTL window.
    pub async fn channel(&self) -> FsResult<Channel> {
        let id = self.channel_id;
        let found = self
            .channels
            .get_with(&id.to_string(), || async move {
                self.gateway
                    .call(|session| async move { session.channel_lookup(id).await })
                    .await
                    .map_err(FsError::from)
            })
            .await?;
        found.ok_or(FsError::InvalidChannel)
    }

    /// Topics whose titles match the filter, cached per filter string.
    pub async fn topics_matching(&self, filter: &str) -> FsResult<Vec<Topic>> {
        let listed = self
            .topics
            .get_with(filter, || async {
                let channel = self.channel().await?;
                let topics = self
                    .gateway
                    .call(|session| {
                        let channel = channel.clone();
                        async move { session.topics_list(&channel, filter).await }
                    })
                    .await?;
                Ok::<_, FsError>(Some(topics))
            })
            .await?;
        Ok(listed.unwrap_or_default())
    }
}
