//! Chat-room subscriptions with owned teardown.

use std::fmt;
use std::time::SystemTime;

/// A message posted to a group chat room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    /// Document id assigned by the store
    pub id: String,
    /// Author's user id
    pub user_id: String,
    /// Author's display name
    pub username: String,
    /// Message text
    pub text: String,
    /// Server timestamp; messages without one use their arrival time
    pub sent_at: SystemTime,
}

/// Orders messages oldest first. Equal timestamps keep their relative order.
pub fn sort_chronologically(messages: &mut [ChatMessage]) {
    messages.sort_by_key(|m| m.sent_at);
}

/// Callback receiving the full, current message list of a room.
pub type SnapshotHandler = Box<dyn Fn(Vec<ChatMessage>) + Send + Sync>;

/// Source of live room updates (the document store's listen-for-changes API).
pub trait RoomFeed {
    /// Starts delivering snapshots of `room_key` to `on_snapshot`.
    ///
    /// Delivery must stop once the returned [`Subscription`] is dropped.
    fn subscribe(&self, room_key: &str, on_snapshot: SnapshotHandler) -> Subscription;
}

/// Handle to a live room subscription.
///
/// Dropping the handle runs the teardown exactly once, so whoever owns the
/// handle owns the subscription's lifetime.
pub struct Subscription {
    room_key: String,
    teardown: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Creates a handle that runs `teardown` when dropped.
    #[must_use]
    pub fn new(room_key: impl Into<String>, teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            room_key: room_key.into(),
            teardown: Some(Box::new(teardown)),
        }
    }

    /// Returns the room this handle listens to.
    #[must_use]
    pub fn room_key(&self) -> &str {
        &self.room_key
    }

    /// Ends the subscription now.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(teardown) = self.teardown.take() {
            tracing::debug!("Unsubscribing from room {}", self.room_key);
            teardown();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("room_key", &self.room_key)
            .field("active", &self.teardown.is_some())
            .finish()
    }
}
