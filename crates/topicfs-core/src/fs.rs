//! Filesystem facade.
//!
//! Composes the resolver, the search iterator and the gateway into the
//! operations a hierarchical store needs. Every operation is a
//! self-contained request/response sequence: resolve the path to a topic,
//! enumerate or mutate, return.

use std::fmt;

use log::{debug, error, info};

use crate::client::Client;
use crate::client::remote::SessionFactory;
use crate::config::Options;
use crate::entry::{DirEntry, Entry, FileEntry};
use crate::error::{FsError, FsResult};
use crate::path::{self, Location};

/// A topic-tree filesystem mounted on one channel.
pub struct TopicFs {
    client: Client,
    name: String,
    root: String,
}

impl TopicFs {
    /// Mount a filesystem with a validated configuration and a session
    /// factory for the remote service.
    pub fn new(
        name: &str,
        root: &str,
        options: Options,
        factory: Box<dyn SessionFactory>,
    ) -> FsResult<Self> {
        options.validate()?;
        let root = path::root_path(root);
        info!("mounting filesystem {name} at {root}");
        Ok(Self {
            client: Client::new(factory, &options),
            name: name.to_string(),
            root,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Absolute mount root, under the fixed virtual prefix.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// The composed client, for collaborators that need raw access.
    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Canonical naming triple for a relative path.
    pub fn locate(&self, relative: &str) -> Location {
        let location = path::locate(&self.root, relative);
        debug!(
            "locate entry -> absolute: {}, relative: {}, query: {}",
            location.absolute, location.relative, location.query
        );
        location
    }

    /// Naming contract for the upload collaborator: where a new object
    /// must be written so later searches find it. The write path itself
    /// lives outside this crate.
    pub fn upload_location(&self, relative: &str) -> Location {
        let location = self.locate(relative);
        info!("upload destination resolved: {}", location.query);
        location
    }

    /// List the directory at `relative`: child directories annotated with
    /// their item counts, then the files directly inside.
    pub async fn list(&self, relative: &str) -> FsResult<Vec<Entry>> {
        let location = self.locate(relative);
        let query = &location.query;

        let topic = match self.client.find_directory(query).await {
            Ok(topic) => topic,
            Err(FsError::DirectoryNotFound) if relative.is_empty() => {
                // The mount root itself may name a file rather than a
                // directory; fall back to an exact object lookup in its
                // parent before giving up.
                let parent = path::parent(query);
                let topic = self
                    .client
                    .find_directory(&parent)
                    .await
                    .map_err(|_| FsError::DirectoryNotFound)?;
                let message = self
                    .client
                    .object_search(&topic, query)
                    .await
                    .map_err(|_| FsError::DirectoryNotFound)?;
                return Ok(vec![Entry::File(FileEntry::from_message(
                    &message, &self.root,
                ))]);
            }
            Err(FsError::DirectoryNotFound) => return Err(FsError::ListAborted),
            Err(err) => return Err(err),
        };

        let children = match self.client.child_directories(&topic).await {
            Ok(children) => children,
            Err(err) => {
                error!("error listing subdirectories of {query}: {err}");
                return Err(FsError::ListAborted);
            }
        };

        let mut entries = Vec::new();
        for child in &children {
            // A failing per-child count must not abort the listing.
            let items = match self.client.objects_in(child).await {
                Ok((_, items)) => items,
                Err(err) => {
                    error!("error counting objects in {}: {err}", child.title);
                    -1
                }
            };
            entries.push(Entry::Directory(DirEntry::from_topic(
                child, &self.root, items,
            )));
        }

        let (objects, _) = match self.client.objects_in(&topic).await {
            Ok(found) => found,
            Err(err) => {
                error!("error listing objects in {query}: {err}");
                return Err(FsError::ListAborted);
            }
        };
        for message in &objects {
            entries.push(Entry::File(FileEntry::from_message(message, &self.root)));
        }

        Ok(entries)
    }

    /// Create the directory. Already existing is success.
    pub async fn mkdir(&self, relative: &str) -> FsResult<()> {
        let location = self.locate(relative);
        match self.client.create_directory(&location.query).await {
            Ok((_, true)) => {
                info!("directory created: {}", location.query);
                Ok(())
            }
            Ok((_, false)) => {
                info!("directory already exists: {}", location.query);
                Ok(())
            }
            Err(err) => {
                error!("error creating directory {}: {err}", location.query);
                Err(err)
            }
        }
    }

    /// Remove the directory if it holds no child directories and no
    /// objects. The mount root is never removable.
    pub async fn rmdir(&self, relative: &str) -> FsResult<()> {
        let location = self.locate(relative);
        let topic = self.client.find_directory(&location.query).await?;

        if topic.is_root || topic.id == crate::client::types::ROOT_TOPIC_ID {
            return Err(FsError::Unsupported);
        }

        let children = self.client.child_directories(&topic).await?;
        if !children.is_empty() {
            error!(
                "not deleting directory {}: it has subdirectories",
                location.query
            );
            return Err(FsError::DirectoryNotEmpty);
        }

        let (_, items) = self.client.objects_in(&topic).await?;
        if items > 0 {
            error!(
                "not deleting directory {}: it still holds objects",
                location.query
            );
            return Err(FsError::DirectoryNotEmpty);
        }

        self.client.delete_directory(&topic).await
    }

    /// Find the object at `relative`. A path naming a directory answers
    /// `IsDirectory`, never a silent directory entry.
    pub async fn find_object(&self, relative: &str) -> FsResult<FileEntry> {
        let location = self.locate(relative);
        let query = &location.query;

        let parent = path::parent(query);
        let topic = self
            .client
            .find_directory(&parent)
            .await
            .map_err(|_| FsError::DirectoryNotFound)?;

        let children = self
            .client
            .child_directories(&topic)
            .await
            .map_err(|_| FsError::DirectoryNotFound)?;
        if children.iter().any(|child| child.title == *query) {
            return Err(FsError::IsDirectory);
        }

        let message = self.client.object_search(&topic, query).await?;
        Ok(FileEntry::from_message(&message, &self.root))
    }

    /// Release the remote sessions. The next operation reconnects.
    pub async fn shutdown(&self) {
        self.client.gateway.disconnect().await;
        info!("filesystem {} unmounted", self.name);
    }
}

impl fmt::Display for TopicFs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "topic filesystem mounted at {}:{}", self.name, self.root)
    }
}
