//! End-to-end tests for the filesystem facade.
//!
//! The remote here is a small stateful fake speaking the collaborator
//! traits: it keeps topics and message bodies, serves searches in
//! fixed-size pages and can be told to throttle the next N calls, so the
//! whole stack (gateway, resolver, search) is exercised through the
//! public API only. The mounts use a zero cache TTL so every lookup
//! observes the live fake state; cache behavior has its own unit tests.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use topicfs_core::client::remote::{BoxFuture, RemoteService, SessionFactory};
use topicfs_core::client::types::{
    Channel, MessageItem, SearchPage, ServiceMessage, Topic, UpdateEvent, UserMessage,
};
use topicfs_core::{Entry, FsError, Options, RemoteError, TopicFs, path};

const CHANNEL_ID: i64 = 100_200_300;
const PAGE_SIZE: usize = 3;

struct FakeRemote {
    channel: Channel,
    topics: Mutex<Vec<Topic>>,
    messages: Mutex<Vec<UserMessage>>,
    next_id: AtomicI32,
    /// Next N calls fail with the flood-wait status.
    throttle_next: AtomicUsize,
    connected: AtomicBool,
    search_calls: AtomicUsize,
}

impl FakeRemote {
    fn new() -> Arc<Self> {
        let remote = Arc::new(Self {
            channel: Channel {
                id: CHANNEL_ID,
                access_hash: 555,
                title: "archive channel".to_string(),
            },
            topics: Mutex::new(Vec::new()),
            messages: Mutex::new(Vec::new()),
            next_id: AtomicI32::new(100),
            throttle_next: AtomicUsize::new(0),
            connected: AtomicBool::new(true),
            search_calls: AtomicUsize::new(0),
        });
        remote.topics.lock().unwrap().push(Topic {
            id: 1,
            title: "/root".to_string(),
            date: 1_700_000_000,
            is_root: true,
        });
        remote
    }

    /// Store a file message in the topic owning its parent directory.
    fn add_file(&self, absolute: &str) {
        let parent = path::parent(absolute);
        let topic_id = self
            .topics
            .lock()
            .unwrap()
            .iter()
            .find(|topic| topic.title == parent)
            .map(|topic| topic.id)
            .unwrap();
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().push(UserMessage {
            id,
            body: absolute.to_string(),
            date: 1_700_000_100,
            topic_id,
        });
    }

    fn topic_titles(&self) -> Vec<String> {
        self.topics
            .lock()
            .unwrap()
            .iter()
            .map(|topic| topic.title.clone())
            .collect()
    }

    fn maybe_throttle(&self) -> Result<(), RemoteError> {
        let remaining = self.throttle_next.load(Ordering::SeqCst);
        if remaining > 0 {
            self.throttle_next.store(remaining - 1, Ordering::SeqCst);
            return Err(RemoteError::throttled("FLOOD_WAIT_1"));
        }
        Ok(())
    }
}

impl RemoteService for FakeRemote {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    fn reconnect<'a>(&'a self) -> BoxFuture<'a, Result<(), RemoteError>> {
        Box::pin(async move {
            self.connected.store(true, Ordering::SeqCst);
            Ok(())
        })
    }

    fn channel_lookup<'a>(
        &'a self,
        channel_id: i64,
    ) -> BoxFuture<'a, Result<Option<Channel>, RemoteError>> {
        Box::pin(async move {
            self.maybe_throttle()?;
            if channel_id == self.channel.id {
                Ok(Some(self.channel.clone()))
            } else {
                Ok(None)
            }
        })
    }

    fn topics_list<'a>(
        &'a self,
        _channel: &'a Channel,
        filter: &'a str,
    ) -> BoxFuture<'a, Result<Vec<Topic>, RemoteError>> {
        Box::pin(async move {
            self.maybe_throttle()?;
            let topics = self.topics.lock().unwrap();
            Ok(topics
                .iter()
                .filter(|topic| topic.title.contains(filter))
                .cloned()
                .collect())
        })
    }

    fn topic_create<'a>(
        &'a self,
        _channel: &'a Channel,
        title: &'a str,
    ) -> BoxFuture<'a, Result<Vec<UpdateEvent>, RemoteError>> {
        Box::pin(async move {
            self.maybe_throttle()?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            self.topics.lock().unwrap().push(Topic {
                id,
                title: title.to_string(),
                date: 1_700_000_200,
                is_root: false,
            });
            Ok(vec![
                UpdateEvent::Other,
                UpdateEvent::NewServiceMessage(ServiceMessage {
                    id,
                    date: 1_700_000_200,
                    topic_title: Some(title.to_string()),
                }),
            ])
        })
    }

    fn topic_delete_history<'a>(
        &'a self,
        _channel: &'a Channel,
        topic_id: i32,
    ) -> BoxFuture<'a, Result<(), RemoteError>> {
        Box::pin(async move {
            self.maybe_throttle()?;
            self.topics.lock().unwrap().retain(|topic| topic.id != topic_id);
            self.messages
                .lock()
                .unwrap()
                .retain(|message| message.topic_id != topic_id);
            Ok(())
        })
    }

    /// Text search with fixed-size pages, the way a real server slices
    /// large result sets.
    fn message_search<'a>(
        &'a self,
        _channel: &'a Channel,
        topic_id: i32,
        query: &'a str,
        offset: i32,
    ) -> BoxFuture<'a, Result<SearchPage, RemoteError>> {
        Box::pin(async move {
            self.maybe_throttle()?;
            self.search_calls.fetch_add(1, Ordering::SeqCst);

            let messages = self.messages.lock().unwrap();
            let matched: Vec<&UserMessage> = messages
                .iter()
                .filter(|message| message.topic_id == topic_id && message.body.contains(query))
                .collect();

            let start = (offset as usize).min(matched.len());
            let end = (start + PAGE_SIZE).min(matched.len());
            let items: Vec<MessageItem> = matched[start..end]
                .iter()
                .map(|message| MessageItem::User((*message).clone()))
                .collect();

            if end < matched.len() {
                Ok(SearchPage::Partial {
                    items,
                    next_offset: end as i32,
                })
            } else {
                Ok(SearchPage::Complete { items })
            }
        })
    }
}

struct FakeFactory(Arc<FakeRemote>);

impl SessionFactory for FakeFactory {
    fn open_primary<'a>(&'a self) -> BoxFuture<'a, Result<Arc<dyn RemoteService>, RemoteError>> {
        Box::pin(async move { Ok(self.0.clone() as Arc<dyn RemoteService>) })
    }

    fn open_elevated<'a>(&'a self) -> BoxFuture<'a, Result<Arc<dyn RemoteService>, RemoteError>> {
        Box::pin(async move { Ok(self.0.clone() as Arc<dyn RemoteService>) })
    }
}

fn mount(remote: &Arc<FakeRemote>, root: &str) -> TopicFs {
    let _ = env_logger::builder().is_test(true).try_init();
    let options = Options {
        channel_id: CHANNEL_ID,
        max_retries: 5,
        retry_base_delay_ms: 1,
        cache_ttl_seconds: 0,
        test_server: true,
        ..Options::default()
    };
    TopicFs::new("remote", root, options, Box::new(FakeFactory(remote.clone()))).unwrap()
}

fn names(entries: &[Entry]) -> Vec<String> {
    entries
        .iter()
        .map(|entry| match entry {
            Entry::Directory(dir) => format!("{}/", dir.name),
            Entry::File(file) => file.name.clone(),
        })
        .collect()
}

#[tokio::test]
async fn test_mkdir_list_rmdir_lifecycle() {
    let remote = FakeRemote::new();
    let fs = mount(&remote, "");

    fs.mkdir("docs").await.unwrap();
    fs.mkdir("docs/old").await.unwrap();
    remote.add_file("/root/docs/a.txt");
    remote.add_file("/root/docs/b.txt");

    let entries = fs.list("docs").await.unwrap();
    assert_eq!(names(&entries), ["docs/old/", "docs/a.txt", "docs/b.txt"]);

    assert!(matches!(
        fs.rmdir("docs").await,
        Err(FsError::DirectoryNotEmpty)
    ));

    fs.rmdir("docs/old").await.unwrap();
    // The files inside still block removal.
    assert!(matches!(
        fs.rmdir("docs").await,
        Err(FsError::DirectoryNotEmpty)
    ));
    remote.messages.lock().unwrap().clear();
    fs.rmdir("docs").await.unwrap();
    assert_eq!(remote.topic_titles(), ["/root"]);
}

#[tokio::test]
async fn test_mkdir_twice_is_one_directory() {
    let remote = FakeRemote::new();
    let fs = mount(&remote, "");

    fs.mkdir("docs").await.unwrap();
    fs.mkdir("docs").await.unwrap();
    assert_eq!(remote.topic_titles(), ["/root", "/root/docs"]);
}

#[tokio::test]
async fn test_listing_walks_every_search_page() {
    let remote = FakeRemote::new();
    let fs = mount(&remote, "");
    fs.mkdir("docs").await.unwrap();
    for n in 0..7 {
        remote.add_file(&format!("/root/docs/f{n}.txt"));
    }

    let entries = fs.list("docs").await.unwrap();
    assert_eq!(entries.len(), 7);
    // 7 results in pages of 3 take three search calls.
    assert_eq!(remote.search_calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_listing_an_unmatched_mount_root_is_directory_not_found() {
    let remote = FakeRemote::new();
    // "/root/ghost" names no topic and no message, so neither the
    // directory nor the single-file reading of the root request holds.
    let fs = mount(&remote, "ghost");
    assert!(matches!(
        fs.list("").await,
        Err(FsError::DirectoryNotFound)
    ));

    // Same outcome when even the root's parent directory is missing.
    let deep = mount(&remote, "ghost/deep");
    assert!(matches!(
        deep.list("").await,
        Err(FsError::DirectoryNotFound)
    ));
}

#[tokio::test]
async fn test_throttling_is_transparent_to_the_caller() {
    let remote = FakeRemote::new();
    let fs = mount(&remote, "");
    fs.mkdir("docs").await.unwrap();
    remote.add_file("/root/docs/a.txt");

    remote.throttle_next.store(2, Ordering::SeqCst);
    let file = fs.find_object("docs/a.txt").await.unwrap();
    assert_eq!(file.name, "docs/a.txt");
}

#[tokio::test]
async fn test_dropped_transport_heals_between_operations() {
    let remote = FakeRemote::new();
    let fs = mount(&remote, "");
    fs.mkdir("docs").await.unwrap();

    remote.connected.store(false, Ordering::SeqCst);
    fs.mkdir("pics").await.unwrap();
    assert!(remote.connected.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_find_object_distinguishes_files_and_directories() {
    let remote = FakeRemote::new();
    let fs = mount(&remote, "");
    fs.mkdir("docs").await.unwrap();
    remote.add_file("/root/docs/a.txt");

    assert!(matches!(
        fs.find_object("docs").await,
        Err(FsError::IsDirectory)
    ));
    assert!(matches!(
        fs.find_object("docs/missing.txt").await,
        Err(FsError::ObjectNotFound)
    ));

    let file = fs.find_object("docs/a.txt").await.unwrap();
    assert_eq!(file.absolute, "/root/docs/a.txt");
    assert_eq!(file.size, topicfs_core::MAX_OBJECT_SIZE);
}

#[tokio::test]
async fn test_root_directory_survives_rmdir() {
    let remote = FakeRemote::new();
    let fs = mount(&remote, "");
    remote.add_file("/root/readme.txt");

    assert!(matches!(fs.rmdir("").await, Err(FsError::Unsupported)));
    assert_eq!(remote.topic_titles(), ["/root"]);
}

#[tokio::test]
async fn test_mount_scoped_to_a_subtree() {
    let remote = FakeRemote::new();
    let wide = mount(&remote, "");
    wide.mkdir("docs").await.unwrap();
    wide.mkdir("docs/old").await.unwrap();
    remote.add_file("/root/docs/a.txt");
    remote.add_file("/root/docs/old/ancient.txt");

    let narrow = mount(&remote, "docs");
    let entries = narrow.list("").await.unwrap();
    assert_eq!(names(&entries), ["old/", "a.txt"]);
    match &entries[0] {
        Entry::Directory(dir) => assert_eq!(dir.items, 1),
        other => panic!("expected the subdirectory first, got {other:?}"),
    }

    let nested = narrow.find_object("old/ancient.txt").await.unwrap();
    assert_eq!(nested.name, "old/ancient.txt");
}
