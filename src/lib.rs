//! MindConnect: mental-wellness companion client core
//!
//! Mood assessments, AI-generated peer-group and media recommendations, and a
//! therapist chat bot, all backed by a generative-text endpoint reached
//! through a retrying HTTP client.

pub mod config;
pub mod fetch;
pub mod genai;
pub mod session;
pub mod time;
