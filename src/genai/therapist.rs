//! Scripted therapist chat backed by the generative endpoint.

use serde::Serialize;

use crate::fetch::HttpClient;
use crate::time::{Sleeper, TokioSleeper};

use super::assessment::AgeGroup;
use super::prompt::Prompts;
use super::wire::GenerateContentRequest;
use super::{GenAiError, GenerativeClient};

/// Author of a chat line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person chatting
    User,
    /// The therapist bot
    Bot,
}

/// One line of the therapist chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BotMessage {
    /// Who wrote it
    pub role: Speaker,
    /// What was said
    pub text: String,
}

impl BotMessage {
    fn user(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            text: text.into(),
        }
    }

    fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::Bot,
            text: text.into(),
        }
    }
}

/// A therapist chat session.
///
/// Every user message is sent on its own with a system instruction tailored
/// to the user's age group; earlier turns are kept only for display.
#[derive(Debug)]
pub struct TherapistBot<'a, H, S = TokioSleeper> {
    client: &'a GenerativeClient<H, S>,
    prompts: Prompts,
    age_group: Option<AgeGroup>,
    transcript: Vec<BotMessage>,
}

impl<'a, H, S> TherapistBot<'a, H, S> {
    /// Starts a chat, opening the transcript with a greeting.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Prompt`] if the greeting fails to render.
    pub fn start(
        client: &'a GenerativeClient<H, S>,
        age_group: Option<AgeGroup>,
        username: Option<&str>,
    ) -> Result<Self, GenAiError> {
        let prompts = Prompts::new();
        let greeting = prompts.bot_greeting(username)?;
        Ok(Self {
            client,
            prompts,
            age_group,
            transcript: vec![BotMessage::bot(greeting)],
        })
    }

    /// Returns every line so far, oldest first.
    #[must_use]
    pub fn transcript(&self) -> &[BotMessage] {
        &self.transcript
    }

    /// Returns the greeting that opened the chat.
    #[must_use]
    pub fn greeting(&self) -> &str {
        self.transcript.first().map_or("", |m| m.text.as_str())
    }

    /// Builds the `generateContent` body for one user message.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Prompt`] if a template fails to render.
    pub fn build_request(&self, stressor: &str) -> Result<GenerateContentRequest, GenAiError> {
        let system = self.prompts.therapist_system(self.age_group)?;
        let query = self.prompts.therapist_query(stressor)?;
        Ok(GenerateContentRequest::from_prompt(query).with_system_instruction(system))
    }
}

impl<H: HttpClient, S: Sleeper> TherapistBot<'_, H, S> {
    /// Sends a user message and appends the bot's reply to the transcript.
    ///
    /// Blank messages are ignored and return `Ok(None)`. On failure the user
    /// message stays in the transcript without a reply.
    ///
    /// # Errors
    ///
    /// Returns the [`GenAiError`] of the failed call.
    pub async fn send(&mut self, message: &str) -> Result<Option<&str>, GenAiError> {
        let message = message.trim();
        if message.is_empty() {
            return Ok(None);
        }

        let request = self.build_request(message)?;
        self.transcript.push(BotMessage::user(message));

        let reply = self.client.generate(&request).await?;
        self.transcript.push(BotMessage::bot(reply));

        Ok(self.transcript.last().map(|m| m.text.as_str()))
    }
}
