//! Topic directory resolver.
//!
//! Directories are topics whose title is the directory's full canonical
//! path. Lookup is an exact title match over a filtered topic listing;
//! ancestry is recomputed from the title string, never stored.

use log::{debug, error};

use crate::client::Client;
use crate::client::types::{ROOT_TOPIC_ID, Topic, UpdateEvent};
use crate::error::{FsError, FsResult};
use crate::path;

impl Client {
    /// The unique topic whose title exactly equals the query.
    ///
    /// `DirectoryNotFound` is a normal negative result, not a fault.
    pub async fn find_directory(&self, query: &str) -> FsResult<Topic> {
        let topics = self.topics_matching(query).await?;
        topics
            .into_iter()
            .find(|topic| topic.title == query)
            .ok_or(FsError::DirectoryNotFound)
    }

    /// Direct children only: topics whose title-parent equals this
    /// topic's title. The full subtree is never materialized.
    pub async fn child_directories(&self, topic: &Topic) -> FsResult<Vec<Topic>> {
        let topics = self.topics_matching(&topic.title).await?;
        Ok(topics
            .into_iter()
            .filter(|candidate| path::parent(&candidate.title) == topic.title)
            .collect())
    }

    /// Create the directory topic, idempotently.
    ///
    /// Returns `(topic, false)` when a topic with that exact title already
    /// exists. Otherwise issues the create and scans the returned update
    /// stream for the creation receipt that carries the new topic's
    /// identity; a missing receipt is a protocol fault.
    pub async fn create_directory(&self, title: &str) -> FsResult<(Topic, bool)> {
        let _guard = self.dir_lock.lock().await;

        if let Some(existing) = self
            .topics_matching(title)
            .await?
            .into_iter()
            .find(|topic| topic.title == title)
        {
            return Ok((existing, false));
        }

        debug!("creating directory topic: {title}");
        let channel = self.channel().await?;
        let updates = self
            .gateway
            .call(|session| {
                let channel = channel.clone();
                async move { session.topic_create(&channel, title).await }
            })
            .await
            .map_err(|err| {
                error!("directory create failed: {title}: {err}");
                err
            })?;

        let receipt = updates.into_iter().find_map(|update| match update {
            UpdateEvent::NewServiceMessage(message)
                if message.topic_title.as_deref() == Some(title) =>
            {
                Some(message)
            }
            _ => None,
        });
        let Some(receipt) = receipt else {
            error!("directory create returned no creation receipt: {title}");
            return Err(FsError::MissingConfirmation);
        };

        let topic = Topic {
            id: receipt.id,
            title: title.to_string(),
            date: receipt.date,
            is_root: false,
        };

        // Write the confirmed topic through to its own exact-title cache
        // entry; listings under other keys stay stale until TTL expiry.
        let created = topic.clone();
        self.topics
            .update(title, |listed| {
                if !listed.iter().any(|t| t.id == created.id) {
                    listed.push(created.clone());
                }
            })
            .await;

        Ok((topic, true))
    }

    /// Delete the directory topic. The distinguished root topic is never
    /// deletable; emptiness is the caller's responsibility.
    pub async fn delete_directory(&self, topic: &Topic) -> FsResult<()> {
        if topic.id == ROOT_TOPIC_ID || topic.is_root {
            return Err(FsError::Unsupported);
        }

        let _guard = self.dir_lock.lock().await;
        debug!("deleting directory topic: {} (id {})", topic.title, topic.id);
        let channel = self.channel().await?;
        let topic_id = topic.id;
        self.gateway
            .call(|session| {
                let channel = channel.clone();
                async move { session.topic_delete_history(&channel, topic_id).await }
            })
            .await
            .map_err(|err| {
                error!(
                    "directory delete failed: {} (id {topic_id}): {err}",
                    topic.title
                );
                err
            })?;
        Ok(())
    }
}
