//! Client session: which screen is shown, who is signed in, quiz progress
//! and the live group chat subscription.

mod room;
mod state;


pub use room::{ChatMessage, RoomFeed, SnapshotHandler, Subscription, sort_chronologically};
pub use state::{QuizKind, QuizProgress, Role, Session, SessionError, UserProfile, View};
