//! Peer-group and media recommendations.

use serde::{Deserialize, Serialize};

use crate::fetch::HttpClient;
use crate::time::{Sleeper, TokioSleeper};

use super::assessment::{AgeGroup, Score};
use super::prompt::{Prompts, RECOMMENDATION_SYSTEM};
use super::wire::GenerateContentRequest;
use super::{GenAiError, GenerativeClient};

/// A support-group name plus calming movie and song picks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Name of the recommended group chat
    pub group: String,
    /// Movie titles
    #[serde(default)]
    pub movies: Vec<String>,
    /// Song titles
    #[serde(default)]
    pub songs: Vec<String>,
}

impl Recommendation {
    /// Canned recommendation shown when generation fails.
    #[must_use]
    pub fn fallback(age: AgeGroup) -> Self {
        Self {
            group: format!("The {age} Support Circle"),
            movies: vec![
                "A Quiet Place".to_string(),
                "The Pursuit of Happyness".to_string(),
            ],
            songs: vec![
                "Weightless by Marconi Union".to_string(),
                "Clair de Lune by Debussy".to_string(),
            ],
        }
    }

    /// Key of the group's chat room: each whitespace run becomes one `_`,
    /// then anything other than ASCII letters, digits and `_` is dropped.
    #[must_use]
    pub fn room_key(&self) -> String {
        let mut key = String::with_capacity(self.group.len());
        let mut in_whitespace = false;
        for c in self.group.chars() {
            if c.is_whitespace() {
                if !in_whitespace {
                    key.push('_');
                }
                in_whitespace = true;
                continue;
            }
            in_whitespace = false;
            if c.is_ascii_alphanumeric() || c == '_' {
                key.push(c);
            }
        }
        key
    }
}

/// Schema the endpoint must follow for recommendation responses.
#[must_use]
pub fn response_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "group": { "type": "STRING", "description": "Recommended group chat name" },
            "movies": { "type": "ARRAY", "items": { "type": "STRING" } },
            "songs": { "type": "ARRAY", "items": { "type": "STRING" } }
        }
    })
}

/// Result of [`Recommender::recommend_or_fallback`].
#[derive(Debug)]
pub enum Recommended {
    /// The endpoint produced a recommendation.
    Generated(Recommendation),
    /// Generation failed; the canned recommendation is used instead.
    Fallback {
        /// The canned recommendation
        recommendation: Recommendation,
        /// Why generation failed
        reason: GenAiError,
    },
}

impl Recommended {
    /// Returns the recommendation regardless of its origin.
    #[must_use]
    pub const fn recommendation(&self) -> &Recommendation {
        match self {
            Self::Generated(recommendation) | Self::Fallback { recommendation, .. } => {
                recommendation
            }
        }
    }

    /// Returns true if the canned recommendation was substituted.
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Consumes the outcome and returns the recommendation.
    #[must_use]
    pub fn into_recommendation(self) -> Recommendation {
        match self {
            Self::Generated(recommendation) | Self::Fallback { recommendation, .. } => {
                recommendation
            }
        }
    }
}

/// Asks the generative endpoint for recommendations after an assessment.
#[derive(Debug)]
pub struct Recommender<'a, H, S = TokioSleeper> {
    client: &'a GenerativeClient<H, S>,
    prompts: Prompts,
}

impl<'a, H, S> Recommender<'a, H, S> {
    /// Creates a recommender backed by `client`.
    #[must_use]
    pub fn new(client: &'a GenerativeClient<H, S>) -> Self {
        Self {
            client,
            prompts: Prompts::new(),
        }
    }

    /// Builds the `generateContent` body for an assessment result.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Prompt`] if the query fails to render.
    pub fn build_request(
        &self,
        age: AgeGroup,
        score: Score,
    ) -> Result<GenerateContentRequest, GenAiError> {
        let query = self.prompts.recommendation_query(age, score)?;
        Ok(GenerateContentRequest::from_prompt(query)
            .with_system_instruction(RECOMMENDATION_SYSTEM)
            .with_json_response(response_schema()))
    }
}

impl<H: HttpClient, S: Sleeper> Recommender<'_, H, S> {
    /// Requests a recommendation.
    ///
    /// # Errors
    ///
    /// Returns any [`GenAiError`] from the call, [`GenAiError::Decode`] if the
    /// returned text is not a recommendation object, or
    /// [`GenAiError::EmptyResponse`] if the group name is blank.
    pub async fn recommend(
        &self,
        age: AgeGroup,
        score: Score,
    ) -> Result<Recommendation, GenAiError> {
        let request = self.build_request(age, score)?;
        let text = self.client.generate(&request).await?;

        let recommendation: Recommendation =
            serde_json::from_str(&text).map_err(GenAiError::Decode)?;
        if recommendation.group.trim().is_empty() {
            return Err(GenAiError::EmptyResponse);
        }

        tracing::debug!("Recommended group: {}", recommendation.group);
        Ok(recommendation)
    }

    /// Requests a recommendation and substitutes the canned one on failure.
    ///
    /// Authentication failures are not masked: the user must fix credentials
    /// rather than see placeholder content.
    ///
    /// # Errors
    ///
    /// Returns the error only when [`GenAiError::is_authentication`] is true.
    pub async fn recommend_or_fallback(
        &self,
        age: AgeGroup,
        score: Score,
    ) -> Result<Recommended, GenAiError> {
        match self.recommend(age, score).await {
            Ok(recommendation) => Ok(Recommended::Generated(recommendation)),
            Err(e) if e.is_authentication() => Err(e),
            Err(reason) => {
                tracing::warn!("Could not generate recommendations, using defaults: {reason}");
                Ok(Recommended::Fallback {
                    recommendation: Recommendation::fallback(age),
                    reason,
                })
            }
        }
    }
}
