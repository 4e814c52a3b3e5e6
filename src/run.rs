//! Application execution logic.
//!
//! This module runs the selected subcommand: recommendations for a score,
//! an assessment driven through the session state machine, or a chat with
//! the therapist bot.

use std::future::Future;
use std::io::Write;

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;

use mindconnect::config::{Command, ConfigError, ValidatedConfig};
use mindconnect::fetch::{HttpClient, HttpError, ReqwestClient, ResilientFetcher};
use mindconnect::genai::{
    AgeGroup, GenAiError, GenerativeClient, Recommendation, Recommended, Recommender, Score,
    TherapistBot,
};
use mindconnect::session::{QuizKind, Role, Session, SessionError, UserProfile};
use mindconnect::time::Sleeper;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Reply shown when the bot cannot answer a message.
const BOT_FAILURE: &str = "Failed to generate chatbot response.";

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The configuration lacks something this command needs.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failed to build the HTTP client.
    #[error("Failed to create HTTP client: {0}")]
    HttpClient(#[source] HttpError),

    /// The session refused a transition.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A generative-text call failed.
    #[error(transparent)]
    GenAi(#[from] GenAiError),

    /// Failed to read chat input.
    #[error("Failed to read input: {0}")]
    Input(#[source] std::io::Error),
}

impl RunError {
    /// Returns true if the endpoint rejected the credentials.
    #[must_use]
    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::GenAi(e) if e.is_authentication())
    }
}

/// Result of an assessment run.
#[derive(Debug)]
pub struct AssessmentReport {
    /// Display name of the user who took it
    pub username: String,
    /// Age group whose question set was used
    pub age_group: AgeGroup,
    /// Which quiz was taken
    pub kind: QuizKind,
    /// Final score
    pub score: Score,
    /// Recommendation for a full assessment
    pub recommended: Option<Recommended>,
}

/// Executes the selected subcommand.
///
/// # Errors
///
/// Returns an error if:
/// - The command needs an age group and none is configured
/// - The HTTP client cannot be built
/// - The session refuses an answer
/// - A generative-text call fails in a way that has no fallback
///
/// # Coverage Note
///
/// This function is excluded from coverage because it requires a real
/// endpoint, stdin and signal handling.
#[cfg(not(tarpaulin_include))]
pub async fn execute(config: ValidatedConfig, command: Command) -> Result<(), RunError> {
    let client = create_client(&config)?;

    match command {
        // Handled before the configuration is loaded
        Command::Init { .. } => Ok(()),
        Command::Recommend { score, max_score } => {
            let age_group = config.require_age_group()?;
            let outcome = recommend(&client, age_group, Score::new(score, max_score)).await?;
            print!("{}", render_recommendation(outcome.recommendation()));
            Ok(())
        }
        Command::Assess { answers, daily } => {
            let profile = local_profile(&config)?;
            let kind = if daily {
                QuizKind::DailyCheckIn
            } else {
                QuizKind::Assessment
            };
            let report = assess(&client, profile, &answers, kind).await?;
            print!("{}", render_assessment(&report));
            Ok(())
        }
        Command::Chat { message } => {
            let mut bot = TherapistBot::start(&client, config.age_group, config.username.as_deref())?;
            println!("Bot: {}", bot.greeting());

            if let Some(message) = message {
                return reply(&mut bot, &message).await;
            }

            let stdin = BufReader::new(tokio::io::stdin());
            converse(&mut bot, stdin, shutdown_signal()).await
        }
    }
}

fn create_client(config: &ValidatedConfig) -> Result<GenerativeClient<ReqwestClient>, RunError> {
    let http = ReqwestClient::with_timeout(config.timeout).map_err(RunError::HttpClient)?;
    let fetcher = ResilientFetcher::new(http).with_retry_policy(config.retry_policy);
    let client = GenerativeClient::new(fetcher, config.endpoint.clone());

    Ok(match &config.api_key {
        Some(key) => client.with_api_key(key.clone()),
        None => client,
    })
}

/// Builds the signed-in profile of the local user from the configuration.
fn local_profile(config: &ValidatedConfig) -> Result<UserProfile, RunError> {
    let age_group = config.require_age_group()?;
    Ok(UserProfile {
        user_id: "local".to_string(),
        username: config.username.clone().unwrap_or_else(|| "You".to_string()),
        role: Role::User,
        age_group: Some(age_group),
    })
}

/// Requests a recommendation, falling back to the canned one on failure.
async fn recommend<H: HttpClient, S: Sleeper>(
    client: &GenerativeClient<H, S>,
    age_group: AgeGroup,
    score: Score,
) -> Result<Recommended, RunError> {
    let outcome = Recommender::new(client)
        .recommend_or_fallback(age_group, score)
        .await?;
    Ok(outcome)
}

/// Takes a quiz with the given answers and, for a full assessment, fetches
/// the recommendation for the resulting score.
async fn assess<H: HttpClient, S: Sleeper>(
    client: &GenerativeClient<H, S>,
    profile: UserProfile,
    answers: &[u8],
    kind: QuizKind,
) -> Result<AssessmentReport, RunError> {
    let username = profile.username.clone();
    let mut session = Session::new();
    session.finish_splash()?;
    session.sign_in(profile)?;

    let questions = u32::try_from(answers.len()).unwrap_or(u32::MAX);
    session.start_quiz(kind, questions)?;
    let age_group = session
        .quiz()
        .map(|quiz| quiz.age_group)
        .ok_or(SessionError::MissingAgeGroup)?;

    let mut score = None;
    for &answer in answers {
        score = session.answer(Some(answer))?;
    }
    let score = score.ok_or(SessionError::EmptyQuiz)?;
    tracing::info!("Score {score}: {}", score.stress_level());

    if kind == QuizKind::DailyCheckIn {
        return Ok(AssessmentReport {
            username,
            age_group,
            kind,
            score,
            recommended: None,
        });
    }

    let recommended = recommend(client, age_group, score).await?;
    session.show_recommendation(recommended.recommendation().clone())?;

    Ok(AssessmentReport {
        username,
        age_group,
        kind,
        score,
        recommended: Some(recommended),
    })
}

/// Sends one chat message and prints the reply.
///
/// Failures other than authentication are reported to the user and the
/// conversation continues.
async fn reply<H: HttpClient, S: Sleeper>(
    bot: &mut TherapistBot<'_, H, S>,
    message: &str,
) -> Result<(), RunError> {
    match bot.send(message).await {
        Ok(Some(text)) => println!("Bot: {text}"),
        Ok(None) => {}
        Err(e) if e.is_authentication() => return Err(e.into()),
        Err(e) => {
            tracing::error!("Bot reply failed: {e}");
            println!("Bot: {BOT_FAILURE}");
        }
    }
    Ok(())
}

/// Runs the interactive chat until end of input, `exit`, or shutdown.
async fn converse<H, S, R, F>(
    bot: &mut TherapistBot<'_, H, S>,
    input: R,
    shutdown: F,
) -> Result<(), RunError>
where
    H: HttpClient,
    S: Sleeper,
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = input.lines();
    tokio::pin!(shutdown);

    loop {
        print!("You: ");
        if let Err(e) = std::io::stdout().flush() {
            tracing::debug!("Failed to flush prompt: {e}");
        }

        tokio::select! {
            biased;

            () = &mut shutdown => {
                tracing::info!("Shutdown signal received, stopping...");
                return Ok(());
            }

            line = lines.next_line() => {
                let Some(line) = line.map_err(RunError::Input)? else {
                    return Ok(());
                };
                if matches!(line.trim(), "exit" | "quit") {
                    return Ok(());
                }
                reply(bot, &line).await?;
            }
        }
    }
}

/// Formats a recommendation for the terminal.
fn render_recommendation(recommendation: &Recommendation) -> String {
    format!(
        "Group Chat: {} (room {})\nMovies for Calm: {}\nSongs for Resilience: {}\n",
        recommendation.group,
        recommendation.room_key(),
        recommendation.movies.join(", "),
        recommendation.songs.join(", "),
    )
}

/// Formats an assessment report for the terminal.
fn render_assessment(report: &AssessmentReport) -> String {
    let title = match report.kind {
        QuizKind::Assessment => "Mindset Score",
        QuizKind::DailyCheckIn => "Daily Check-in Score",
    };
    let mut out = format!(
        "User: {}\nAge Group: {}\n{title}: {} / {}\nSummary: {}\n",
        report.username,
        report.age_group.id().to_uppercase(),
        report.score.value,
        report.score.max,
        report.score.summary(),
    );

    if let Some(recommended) = &report.recommended {
        if recommended.is_fallback() {
            out.push_str("Could not generate recommendations. Using default placeholders.\n");
        }
        out.push_str(&render_recommendation(recommended.recommendation()));
    }
    out
}

/// Returns a future that completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
