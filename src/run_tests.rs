//! Tests for the run module.

use std::sync::Mutex;

use mindconnect::fetch::{HttpRequest, HttpResponse, RetryPolicy};
use mindconnect::time::InstantSleeper;

use super::*;

/// Endpoint that replays scripted outcomes.
#[derive(Default)]
struct Scripted {
    outcomes: Mutex<Vec<Result<HttpResponse, HttpError>>>,
    calls: Mutex<usize>,
}

impl Scripted {
    fn new(outcomes: Vec<Result<HttpResponse, HttpError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes),
            calls: Mutex::new(0),
        }
    }

    fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl HttpClient for Scripted {
    async fn request(&self, _req: HttpRequest) -> Result<HttpResponse, HttpError> {
        *self.calls.lock().unwrap() += 1;
        self.outcomes.lock().unwrap().remove(0)
    }
}

fn reply_with(text: &str) -> Result<HttpResponse, HttpError> {
    let body = serde_json::json!({
        "candidates": [{ "content": { "parts": [{ "text": text }] } }]
    });
    Ok(HttpResponse::new(
        http::StatusCode::OK,
        http::HeaderMap::new(),
        serde_json::to_vec(&body).unwrap(),
    ))
}

fn status(code: u16) -> Result<HttpResponse, HttpError> {
    Ok(HttpResponse::with_status(
        http::StatusCode::from_u16(code).unwrap(),
    ))
}

fn client(endpoint: Scripted) -> GenerativeClient<Scripted, InstantSleeper> {
    let fetcher = ResilientFetcher::new(endpoint)
        .with_sleeper(InstantSleeper)
        .with_retry_policy(RetryPolicy::new().with_max_attempts(2));
    GenerativeClient::new(
        fetcher,
        url::Url::parse("https://example.com/generate").unwrap(),
    )
}

fn profile() -> UserProfile {
    UserProfile {
        user_id: "local".to_string(),
        username: "Ravi".to_string(),
        role: Role::User,
        age_group: Some(AgeGroup::Adult),
    }
}

fn generated() -> String {
    serde_json::json!({
        "group": "Quiet Harbor",
        "movies": ["Soul"],
        "songs": ["Holocene"]
    })
    .to_string()
}

mod run_error {
    use super::*;

    #[test]
    fn session_error_displays_transparently() {
        let error = RunError::from(SessionError::NoAnswerSelected);

        assert_eq!(error.to_string(), "Please select an answer to proceed.");
    }

    #[test]
    fn input_error_displays_source() {
        let error = RunError::Input(std::io::Error::other("closed"));

        assert!(error.to_string().contains("Failed to read input"));
    }

    #[test]
    fn authentication_is_detected_through_genai() {
        let fetch = mindconnect::fetch::FetchError::AuthenticationRejected {
            body: None,
        };
        let error = RunError::from(GenAiError::from(fetch));

        assert!(error.is_authentication());
        assert!(!RunError::from(GenAiError::EmptyResponse).is_authentication());
    }
}

mod local_profile {
    use super::*;
    use mindconnect::config::Cli;

    fn config(args: &[&str]) -> ValidatedConfig {
        let mut full = vec!["mindconnect", "assess", "3"];
        full.extend(args);
        ValidatedConfig::from_raw(&Cli::parse_from_iter(full), None).unwrap()
    }

    #[test]
    fn uses_configured_name_and_age_group() {
        let profile = local_profile(&config(&["--username", "Asha", "--age-group", "teen"])).unwrap();

        assert_eq!(profile.username, "Asha");
        assert_eq!(profile.age_group, Some(AgeGroup::Teen));
        assert_eq!(profile.role, Role::User);
    }

    #[test]
    fn missing_age_group_is_config_error() {
        let result = local_profile(&config(&[]));

        assert!(matches!(result, Err(RunError::Config(_))));
    }
}

mod assess {
    use super::*;

    #[tokio::test]
    async fn full_assessment_scores_and_recommends() {
        let client = client(Scripted::new(vec![reply_with(&generated())]));

        let report = assess(&client, profile(), &[5, 4, 5], QuizKind::Assessment)
            .await
            .unwrap();

        assert_eq!(report.score, Score::new(14, 15));
        assert_eq!(report.username, "Ravi");
        assert_eq!(report.age_group, AgeGroup::Adult);
        let recommended = report.recommended.unwrap();
        assert!(!recommended.is_fallback());
        assert_eq!(recommended.recommendation().group, "Quiet Harbor");
    }

    #[tokio::test]
    async fn failed_generation_uses_fallback() {
        let client = client(Scripted::new(vec![status(503), status(503)]));

        let report = assess(&client, profile(), &[1, 1], QuizKind::Assessment)
            .await
            .unwrap();

        let recommended = report.recommended.unwrap();
        assert!(recommended.is_fallback());
        assert_eq!(
            recommended.recommendation().group,
            "The adult Support Circle"
        );
    }

    #[tokio::test]
    async fn daily_check_in_skips_recommendation() {
        let client = client(Scripted::default());

        let report = assess(&client, profile(), &[2, 3], QuizKind::DailyCheckIn)
            .await
            .unwrap();

        assert!(report.recommended.is_none());
        assert_eq!(report.score, Score::new(5, 10));
        assert_eq!(client.fetcher().client().calls(), 0);
    }

    #[tokio::test]
    async fn out_of_range_answer_is_session_error() {
        let client = client(Scripted::default());

        let result = assess(&client, profile(), &[3, 9], QuizKind::Assessment).await;

        assert!(matches!(
            result,
            Err(RunError::Session(SessionError::AnswerOutOfRange(9)))
        ));
    }

    #[tokio::test]
    async fn authentication_rejection_aborts() {
        let client = client(Scripted::new(vec![status(401)]));

        let result = assess(&client, profile(), &[3], QuizKind::Assessment).await;

        assert!(result.is_err_and(|e| e.is_authentication()));
        assert_eq!(client.fetcher().client().calls(), 1);
    }
}

mod chat {
    use super::*;

    #[tokio::test]
    async fn converse_replies_until_exit() {
        let client = client(Scripted::new(vec![reply_with("Breathe in for four counts.")]));
        let mut bot = TherapistBot::start(&client, Some(AgeGroup::Adult), None).unwrap();
        let input: &[u8] = b"work deadlines\n\nexit\nnever sent\n";

        converse(&mut bot, input, std::future::pending())
            .await
            .unwrap();

        assert_eq!(bot.transcript().len(), 3);
        assert_eq!(bot.transcript()[2].text, "Breathe in for four counts.");
        assert_eq!(client.fetcher().client().calls(), 1);
    }

    #[tokio::test]
    async fn converse_stops_on_shutdown() {
        let client = client(Scripted::default());
        let mut bot = TherapistBot::start(&client, None, None).unwrap();
        let input: &[u8] = b"hello\n";

        converse(&mut bot, input, std::future::ready(()))
            .await
            .unwrap();

        assert_eq!(bot.transcript().len(), 1);
    }

    #[tokio::test]
    async fn failed_reply_keeps_conversation_going() {
        let client = client(Scripted::new(vec![
            status(500),
            status(500),
            reply_with("Try a short walk."),
        ]));
        let mut bot = TherapistBot::start(&client, None, None).unwrap();
        let input: &[u8] = b"first\nsecond\n";

        converse(&mut bot, input, std::future::pending())
            .await
            .unwrap();

        let texts: Vec<_> = bot.transcript().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts[1..], ["first", "second", "Try a short walk."]);
    }

    #[tokio::test]
    async fn authentication_rejection_ends_chat() {
        let client = client(Scripted::new(vec![status(401)]));
        let mut bot = TherapistBot::start(&client, None, None).unwrap();

        let result = reply(&mut bot, "hello").await;

        assert!(result.is_err_and(|e| e.is_authentication()));
    }
}

mod render {
    use super::*;

    #[test]
    fn recommendation_lists_room_and_media() {
        let text = render_recommendation(&Recommendation {
            group: "Quiet Harbor".to_string(),
            movies: vec!["Soul".to_string(), "Up".to_string()],
            songs: vec!["Holocene".to_string()],
        });

        assert!(text.contains("Group Chat: Quiet Harbor (room Quiet_Harbor)"));
        assert!(text.contains("Movies for Calm: Soul, Up"));
        assert!(text.contains("Songs for Resilience: Holocene"));
    }

    #[test]
    fn daily_report_has_score_and_summary_only() {
        let report = AssessmentReport {
            username: "Ravi".to_string(),
            age_group: AgeGroup::Adult,
            kind: QuizKind::DailyCheckIn,
            score: Score::new(4, 25),
            recommended: None,
        };

        let text = render_assessment(&report);

        assert!(text.contains("Daily Check-in Score: 4 / 25"));
        assert!(text.contains("high resilience"));
        assert!(!text.contains("Group Chat"));
    }

    #[test]
    fn fallback_report_mentions_placeholders() {
        let report = AssessmentReport {
            username: "Mei".to_string(),
            age_group: AgeGroup::Teen,
            kind: QuizKind::Assessment,
            score: Score::new(20, 25),
            recommended: Some(Recommended::Fallback {
                recommendation: Recommendation::fallback(AgeGroup::Teen),
                reason: GenAiError::EmptyResponse,
            }),
        };

        let text = render_assessment(&report);

        assert!(text.contains("Mindset Score: 20 / 25"));
        assert!(text.contains("high stress"));
        assert!(text.contains("Using default placeholders"));
        assert!(text.contains("The teen Support Circle"));
    }

    #[test]
    fn report_starts_with_user_and_upper_cased_age_group() {
        let report = AssessmentReport {
            username: "Ravi".to_string(),
            age_group: AgeGroup::Elder,
            kind: QuizKind::Assessment,
            score: Score::new(3, 10),
            recommended: None,
        };

        let text = render_assessment(&report);

        assert!(text.starts_with("User: Ravi\nAge Group: ELDER\nMindset Score: 3 / 10\n"));
        assert!(text.contains("Summary: You have a balanced mindset"));
    }
}
