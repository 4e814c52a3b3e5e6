//! Generative-text features built on the resilient fetch layer.
//!
//! This module provides:
//! - Assessment scoring ([`AgeGroup`], [`Score`], [`StressLevel`])
//! - `generateContent` wire types ([`GenerateContentRequest`], [`GenerateContentResponse`])
//! - Prompt rendering ([`Prompts`])
//! - The endpoint client ([`GenerativeClient`])
//! - Recommendations with a canned fallback ([`Recommender`], [`Recommendation`])
//! - The therapist chat ([`TherapistBot`])

mod assessment;
mod client;
mod error;
mod prompt;
mod recommend;
mod therapist;
mod wire;

#[cfg(test)]
mod test_support;


pub use assessment::{AgeGroup, Score, StressLevel, UnknownAgeGroup};
pub use client::GenerativeClient;
pub use error::GenAiError;
pub use prompt::Prompts;
pub use recommend::{Recommendation, Recommended, Recommender, response_schema};
pub use therapist::{BotMessage, Speaker, TherapistBot};
pub use wire::{
    Candidate, Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, Part,
};
