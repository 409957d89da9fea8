//! Payload types exchanged with the remote chat service.
//!
//! Values here are transient: topics and messages are reconstructed from
//! each search rather than persisted anywhere.

/// Id of the channel's default topic. It backs the mount root and can
/// never be deleted.
pub const ROOT_TOPIC_ID: i32 = 1;

/// The single channel backing a filesystem instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Channel {
    pub id: i64,
    pub access_hash: i64,
    pub title: String,
}

/// A forum topic, emulating one directory. The title is the directory's
/// full canonical path, not a basename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: i32,
    pub title: String,
    /// Creation time, unix seconds.
    pub date: i64,
    /// Whether this is the channel's default topic.
    pub is_root: bool,
}

/// A plain user message, emulating one file. The body is the file's full
/// canonical path, doubling as its content placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserMessage {
    pub id: i32,
    pub body: String,
    /// Creation or last-edit time, unix seconds.
    pub date: i64,
    pub topic_id: i32,
}

/// A service notification injected by the remote into the message stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceMessage {
    pub id: i32,
    pub date: i64,
    /// Title of the topic this notification announces, when it is a
    /// topic-creation receipt.
    pub topic_title: Option<String>,
}

/// One entry of the message stream, tagged by capability.
///
/// Only `User` entries enter file listings and emptiness counts; service
/// and unknown entries are control noise the remote mixes into the same
/// stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageItem {
    User(UserMessage),
    Service(ServiceMessage),
    Other,
}

/// One event of the update stream returned by a topic create call.
///
/// The remote confirms topic creation only through a service-message
/// receipt on this stream; there is no direct success payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateEvent {
    NewServiceMessage(ServiceMessage),
    Other,
}

/// The remote search API answers in one of several shapes; pagination
/// semantics depend on which one arrived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchPage {
    /// The full result set in one page.
    Complete { items: Vec<MessageItem> },
    /// A slice of a larger result set, with the offset to continue from.
    Partial {
        items: Vec<MessageItem>,
        next_offset: i32,
    },
    /// A channel page reporting the remote's total count alongside the
    /// slice; treated as incomplete while that count is positive.
    Counted {
        items: Vec<MessageItem>,
        count: i64,
        next_offset: i32,
    },
    /// Nothing changed since the last identical query; count only.
    NotModified { count: i64 },
}
