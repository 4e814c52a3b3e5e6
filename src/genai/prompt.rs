//! Prompt templates for the recommendation and therapist calls.
//!
//! Templates use Handlebars syntax and are rendered in strict mode, so a
//! missing variable is an error instead of an empty string. HTML escaping
//! is disabled because the output is plain text.

use handlebars::Handlebars;
use serde::Serialize;

use super::GenAiError;
use super::assessment::{AgeGroup, Score};

/// System instruction for recommendation requests.
pub const RECOMMENDATION_SYSTEM: &str = "You are a professional Mental Wellness Assistant. \
Your task is to provide personalized, grounded recommendations in JSON format based on the \
user's age and self-reported stress level. The movie and song recommendations must be suitable \
for promoting calm and resilience. Ensure the response is ONLY the JSON object.";

const RECOMMENDATION_QUERY: &str = "The user is a {{age_group}} with a current mindset score \
indicating {{stress_level}} (Score: {{score}}/{{max_score}}).
Provide a JSON object with the following:
1. A creative group name (String) for a mental health support chat based on their age and mindset.
2. A list of 3 movie titles (Array of Strings) and 3 song titles (Array of Strings) appropriate \
for mental well-being for this age group.";

const THERAPIST_SYSTEM: &str = "You are MindConnect's Therapist Bot. Your purpose is to provide \
immediate, supportive, and actionable suggestions for coping with stress. The user is a \
{{audience}}. Respond concisely, in 2-3 short paragraphs max. Offer one emotional validation and \
one practical, simple coping technique relevant to their stated stressor. DO NOT offer medical \
advice or suggest complex therapy.";

const THERAPIST_QUERY: &str =
    "I am feeling stressed about: {{stressor}}. What should I do right now?";

const BOT_GREETING: &str = "Hello {{name}}! I'm your Therapist Bot. I can help you understand \
and manage your stress. What would you like to talk about?";

#[derive(Serialize)]
struct RecommendationData {
    age_group: &'static str,
    stress_level: &'static str,
    score: u32,
    max_score: u32,
}

/// Renders the fixed prompt templates.
#[derive(Debug)]
pub struct Prompts {
    registry: Handlebars<'static>,
}

impl Prompts {
    /// Creates a renderer in strict, non-escaping mode.
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry }
    }

    fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String, GenAiError> {
        self.registry
            .render_template(template, data)
            .map_err(|e| GenAiError::Prompt(e.to_string()))
    }

    /// User query asking for a group name plus movie and song picks.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Prompt`] if rendering fails.
    pub fn recommendation_query(&self, age: AgeGroup, score: Score) -> Result<String, GenAiError> {
        self.render(
            RECOMMENDATION_QUERY,
            &RecommendationData {
                age_group: age.id(),
                stress_level: score.stress_level().phrase(),
                score: score.value,
                max_score: score.max,
            },
        )
    }

    /// System instruction for the therapist bot, personalised by age group.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Prompt`] if rendering fails.
    pub fn therapist_system(&self, age: Option<AgeGroup>) -> Result<String, GenAiError> {
        let audience = age.map_or("user", AgeGroup::id);
        self.render(THERAPIST_SYSTEM, &serde_json::json!({ "audience": audience }))
    }

    /// User query describing what the user is stressed about.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Prompt`] if rendering fails.
    pub fn therapist_query(&self, stressor: &str) -> Result<String, GenAiError> {
        self.render(THERAPIST_QUERY, &serde_json::json!({ "stressor": stressor }))
    }

    /// Opening line of a therapist chat. Falls back to "You" without a name.
    ///
    /// # Errors
    ///
    /// Returns [`GenAiError::Prompt`] if rendering fails.
    pub fn bot_greeting(&self, username: Option<&str>) -> Result<String, GenAiError> {
        let name = username.filter(|n| !n.trim().is_empty()).unwrap_or("You");
        self.render(BOT_GREETING, &serde_json::json!({ "name": name }))
    }
}

impl Default for Prompts {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recommendation_query_includes_age_stress_and_score() {
        let prompts = Prompts::new();

        let query = prompts
            .recommendation_query(AgeGroup::Teen, Score::new(18, 25))
            .unwrap();

        assert!(query.starts_with("The user is a teen with a current mindset score"));
        assert!(query.contains("indicating high stress (Score: 18/25)"));
        assert!(query.contains("3 movie titles"));
    }

    #[test]
    fn therapist_system_names_age_group_or_generic_user() {
        let prompts = Prompts::new();

        assert!(
            prompts
                .therapist_system(Some(AgeGroup::Elder))
                .unwrap()
                .contains("The user is a elder.")
        );
        assert!(
            prompts
                .therapist_system(None)
                .unwrap()
                .contains("The user is a user.")
        );
    }

    #[test]
    fn therapist_query_is_not_html_escaped() {
        let prompts = Prompts::new();

        let query = prompts.therapist_query("exams & \"deadlines\"").unwrap();

        assert_eq!(
            query,
            "I am feeling stressed about: exams & \"deadlines\". What should I do right now?"
        );
    }

    #[test]
    fn user_text_is_not_interpreted_as_template() {
        let prompts = Prompts::new();

        let query = prompts.therapist_query("{{audience}}").unwrap();

        assert!(query.contains("{{audience}}"));
    }

    #[test]
    fn greeting_falls_back_to_you() {
        let prompts = Prompts::new();

        assert!(prompts.bot_greeting(Some("Asha")).unwrap().starts_with("Hello Asha!"));
        assert!(prompts.bot_greeting(None).unwrap().starts_with("Hello You!"));
        assert!(prompts.bot_greeting(Some("  ")).unwrap().starts_with("Hello You!"));
    }

    #[test]
    fn strict_mode_rejects_missing_variables() {
        let prompts = Prompts::new();

        let result = prompts.render("{{missing}}", &serde_json::json!({}));

        assert!(matches!(result, Err(GenAiError::Prompt(_))));
    }
}
