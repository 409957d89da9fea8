//! Paginated message search.
//!
//! The remote answers a search with one of several result shapes; each is
//! reduced to a uniform per-page view (items, amount, incomplete,
//! continuation offset). Enumeration keeps requesting pages until one
//! reports completion, guarding against a non-advancing offset: a page
//! answering with the offset it was asked for is treated as final.
//!
//! Every invocation re-issues the search from offset zero; the produced
//! sequence is finite and not restartable.

use log::{debug, error};

use crate::client::Client;
use crate::client::types::{MessageItem, SearchPage, Topic, UserMessage};
use crate::error::FsResult;
use crate::path;

/// Uniform pagination view over one [`SearchPage`].
pub(crate) struct PageView {
    pub items: Vec<MessageItem>,
    /// Shape-reported item amount for this page.
    pub amount: i64,
    pub incomplete: bool,
    pub next_offset: i32,
}

pub(crate) fn page_view(page: SearchPage, requested_offset: i32) -> PageView {
    match page {
        SearchPage::Complete { items } => PageView {
            amount: items.len() as i64,
            incomplete: false,
            next_offset: requested_offset,
            items,
        },
        SearchPage::Partial { items, next_offset } => PageView {
            amount: items.len() as i64,
            incomplete: true,
            next_offset,
            items,
        },
        SearchPage::Counted {
            items,
            count,
            next_offset,
        } => PageView {
            amount: count,
            incomplete: count > 0,
            next_offset,
            items,
        },
        SearchPage::NotModified { count } => PageView {
            items: Vec::new(),
            amount: count,
            incomplete: true,
            next_offset: requested_offset,
        },
    }
}

impl Client {
    /// One remote search page, serialized behind the search lock.
    pub(crate) async fn search_page(
        &self,
        topic_id: i32,
        query: &str,
        offset: i32,
    ) -> FsResult<PageView> {
        let _guard = self.search_lock.lock().await;
        let channel = self.channel().await?;
        let page = self
            .gateway
            .call(|session| {
                let channel = channel.clone();
                async move {
                    session
                        .message_search(&channel, topic_id, query, offset)
                        .await
                }
            })
            .await
            .map_err(|err| {
                error!("message search failed: query {query}, topic {topic_id}, offset {offset}: {err}");
                err
            })?;
        Ok(page_view(page, offset))
    }

    /// Every object directly inside the topic, with the running item
    /// count. Service and unknown entries are excluded from both.
    pub async fn objects_in(&self, topic: &Topic) -> FsResult<(Vec<UserMessage>, i64)> {
        let mut objects = Vec::new();
        let mut items: i64 = 0;
        let mut offset: i32 = 0;

        loop {
            debug!(
                "searching objects in topic: {}, id: {}, offset: {offset}",
                topic.title, topic.id
            );
            let page = self.search_page(topic.id, &topic.title, offset).await?;

            items += page.amount;
            for entry in page.items {
                match entry {
                    MessageItem::User(message) => {
                        if path::parent(&message.body) == topic.title {
                            debug!(
                                "object found: {}, offset: {offset}, id: {}",
                                message.body, message.id
                            );
                            objects.push(message);
                        }
                    }
                    // Service and unknown entries never count as files.
                    _ => items -= 1,
                }
            }

            if page.incomplete && page.next_offset != offset {
                offset = page.next_offset;
                continue;
            }
            return Ok((objects, items));
        }
    }

    /// The single message whose body exactly equals the query, stopping
    /// at the first hit instead of exhausting the pages.
    pub async fn object_search(&self, topic: &Topic, query: &str) -> FsResult<UserMessage> {
        let mut offset: i32 = 0;

        loop {
            debug!(
                "searching object: {query}, topic: {}, id: {}, offset: {offset}",
                topic.title, topic.id
            );
            let page = self.search_page(topic.id, query, offset).await?;

            for entry in page.items {
                if let MessageItem::User(message) = entry
                    && message.body == query
                {
                    debug!("object found: {query}, offset: {offset}, id: {}", message.id);
                    return Ok(message);
                }
            }

            if page.incomplete && page.next_offset != offset {
                offset = page.next_offset;
                continue;
            }
            debug!("object not found: {query}");
            return Err(crate::error::FsError::ObjectNotFound);
        }
    }
}
