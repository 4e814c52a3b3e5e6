//! Session state machine.

use std::fmt;

use thiserror::Error;

use crate::genai::{AgeGroup, Recommendation, Score};

use super::room::{ChatMessage, RoomFeed, Subscription, sort_chronologically};

/// Screen the user is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    /// Start-up screen
    Splash,
    /// Sign-in / sign-up
    Login,
    /// Home screen of a regular user
    Home,
    /// Home screen of a doctor
    Dashboard,
    /// A quiz is in progress
    Quiz,
    /// Assessment results and recommendations
    Results,
    /// Peer group chat room
    GroupChat,
    /// Therapist bot chat
    BotChat,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Splash => "splash",
            Self::Login => "login",
            Self::Home => "home",
            Self::Dashboard => "dashboard",
            Self::Quiz => "quiz",
            Self::Results => "results",
            Self::GroupChat => "group chat",
            Self::BotChat => "bot chat",
        };
        f.write_str(name)
    }
}

/// Account role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Takes assessments and chats
    User,
    /// Reviews users from the dashboard
    Doctor,
}

/// The signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    /// Platform user id
    pub user_id: String,
    /// Display name
    pub username: String,
    /// Account role
    pub role: Role,
    /// Age group chosen at sign-up; required for users
    pub age_group: Option<AgeGroup>,
}

/// Which quiz is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizKind {
    /// Full mood assessment; ends on the results screen
    Assessment,
    /// Short daily check-in; ends back home
    DailyCheckIn,
}

/// Progress through the running quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// Quiz being taken
    pub kind: QuizKind,
    /// Age group whose question set is used
    pub age_group: AgeGroup,
    /// Number of questions in the set
    pub questions: u32,
    /// Questions answered so far
    pub answered: u32,
    /// Points collected so far
    pub points: u32,
}

impl QuizProgress {
    /// Zero-based index of the current question.
    #[must_use]
    pub const fn current_question(&self) -> u32 {
        self.answered
    }

    /// Score so far, out of the maximum for the whole quiz.
    #[must_use]
    pub const fn score(&self) -> Score {
        Score::for_questions(self.points, self.questions)
    }
}

/// A transition that is not allowed from the current state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The action is not available on the current screen.
    #[error("Cannot {action} from the {from} screen")]
    InvalidTransition {
        /// Current view
        from: View,
        /// Attempted action
        action: &'static str,
    },

    /// The action requires a signed-in regular user.
    #[error("Sign in as a user to {action}")]
    NotSignedIn {
        /// Attempted action
        action: &'static str,
    },

    /// A user profile has no age group.
    #[error("Profile has no age group; choose one to continue")]
    MissingAgeGroup,

    /// Submit was pressed without choosing an answer.
    #[error("Please select an answer to proceed.")]
    NoAnswerSelected,

    /// The chosen answer is outside 1 to 5.
    #[error("Answer {0} is out of range (1-5)")]
    AnswerOutOfRange(u8),

    /// A quiz needs at least one question.
    #[error("A quiz needs at least one question")]
    EmptyQuiz,

    /// Joining a group chat requires a recommendation.
    #[error("Cannot join chat: No group assignment found.")]
    NoGroupAssignment,
}

/// Process-wide session: current view, signed-in user and quiz progress.
///
/// All changes go through the named transitions below; each checks the
/// current view and leaves the session untouched when it refuses. A group
/// chat subscription is owned by the session and ends on every way out of
/// the chat screen.
#[derive(Debug)]
pub struct Session {
    view: View,
    user: Option<UserProfile>,
    quiz: Option<QuizProgress>,
    recommendation: Option<Recommendation>,
    room: Option<Subscription>,
}

impl Session {
    /// Creates a session on the splash screen.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            view: View::Splash,
            user: None,
            quiz: None,
            recommendation: None,
            room: None,
        }
    }

    /// Current view.
    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    /// Signed-in account, if any.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// Running quiz, if any.
    #[must_use]
    pub const fn quiz(&self) -> Option<&QuizProgress> {
        self.quiz.as_ref()
    }

    /// Latest recommendation (current results or last saved assessment).
    #[must_use]
    pub const fn recommendation(&self) -> Option<&Recommendation> {
        self.recommendation.as_ref()
    }

    /// Room key of the live chat subscription, if any.
    #[must_use]
    pub fn active_room(&self) -> Option<&str> {
        self.room.as_ref().map(Subscription::room_key)
    }

    fn enter(&mut self, next: View) {
        if self.view == View::GroupChat && next != View::GroupChat {
            self.room = None;
        }
        if next != View::Quiz {
            self.quiz = None;
        }
        tracing::debug!("View {} -> {}", self.view, next);
        self.view = next;
    }

    fn require(&self, allowed: &[View], action: &'static str) -> Result<(), SessionError> {
        if allowed.contains(&self.view) {
            return Ok(());
        }
        Err(SessionError::InvalidTransition {
            from: self.view,
            action,
        })
    }

    fn signed_in_user(&self, action: &'static str) -> Result<&UserProfile, SessionError> {
        self.user
            .as_ref()
            .filter(|u| u.role == Role::User)
            .ok_or(SessionError::NotSignedIn { action })
    }

    fn landing_view(&self) -> View {
        match self.user.as_ref().map(|u| u.role) {
            Some(Role::User) => View::Home,
            Some(Role::Doctor) => View::Dashboard,
            None => View::Login,
        }
    }

    /// Leaves the splash screen for the login screen.
    ///
    /// # Errors
    ///
    /// Fails unless the session is on the splash screen.
    pub fn finish_splash(&mut self) -> Result<View, SessionError> {
        self.require(&[View::Splash], "leave the splash screen")?;
        self.enter(View::Login);
        Ok(self.view)
    }

    /// Signs in and routes to the role's landing view.
    ///
    /// # Errors
    ///
    /// Fails outside splash/login, or with [`SessionError::MissingAgeGroup`]
    /// for a user profile without an age group (the session stays on login).
    pub fn sign_in(&mut self, profile: UserProfile) -> Result<View, SessionError> {
        self.require(&[View::Splash, View::Login], "sign in")?;
        if profile.role == Role::User && profile.age_group.is_none() {
            self.enter(View::Login);
            return Err(SessionError::MissingAgeGroup);
        }
        self.user = Some(profile);
        let landing = self.landing_view();
        self.enter(landing);
        Ok(self.view)
    }

    /// Signs out from anywhere and returns to login, clearing all user state.
    pub fn sign_out(&mut self) -> View {
        self.enter(View::Login);
        self.user = None;
        self.recommendation = None;
        self.view
    }

    /// Restores the recommendation of the last saved assessment.
    pub fn restore_last_assessment(&mut self, recommendation: Recommendation) {
        self.recommendation = Some(recommendation);
    }

    /// Starts a quiz with `questions` questions for the user's age group.
    ///
    /// # Errors
    ///
    /// Fails unless a user is signed in on the home or results screen, or if
    /// `questions` is zero.
    pub fn start_quiz(&mut self, kind: QuizKind, questions: u32) -> Result<View, SessionError> {
        const ACTION: &str = "start a quiz";
        self.require(&[View::Home, View::Results], ACTION)?;
        let age_group = self
            .signed_in_user(ACTION)?
            .age_group
            .ok_or(SessionError::MissingAgeGroup)?;
        if questions == 0 {
            return Err(SessionError::EmptyQuiz);
        }

        if kind == QuizKind::Assessment {
            self.recommendation = None;
        }
        self.enter(View::Quiz);
        self.quiz = Some(QuizProgress {
            kind,
            age_group,
            questions,
            answered: 0,
            points: 0,
        });
        Ok(self.view)
    }

    /// Submits the selected answer (1 to 5 points).
    ///
    /// Returns the final [`Score`] after the last question: an assessment
    /// then moves to results and a daily check-in back home.
    ///
    /// # Errors
    ///
    /// Fails outside a quiz, when nothing is selected, or when the answer is
    /// outside 1 to 5. A refused answer does not advance the quiz.
    pub fn answer(&mut self, selected: Option<u8>) -> Result<Option<Score>, SessionError> {
        self.require(&[View::Quiz], "answer a question")?;
        let points = selected.ok_or(SessionError::NoAnswerSelected)?;
        if !(1..=5).contains(&points) {
            return Err(SessionError::AnswerOutOfRange(points));
        }
        let Some(quiz) = self.quiz.as_mut() else {
            return Err(SessionError::InvalidTransition {
                from: self.view,
                action: "answer a question",
            });
        };

        quiz.points += u32::from(points);
        quiz.answered += 1;
        if quiz.answered < quiz.questions {
            return Ok(None);
        }

        let score = quiz.score();
        let next = match quiz.kind {
            QuizKind::Assessment => View::Results,
            QuizKind::DailyCheckIn => View::Home,
        };
        self.enter(next);
        Ok(Some(score))
    }

    /// Records the recommendation shown on the results screen.
    ///
    /// # Errors
    ///
    /// Fails unless the session is on the results screen.
    pub fn show_recommendation(
        &mut self,
        recommendation: Recommendation,
    ) -> Result<(), SessionError> {
        self.require(&[View::Results], "show a recommendation")?;
        self.recommendation = Some(recommendation);
        Ok(())
    }

    /// Opens the recommended group's chat room and subscribes to it.
    ///
    /// Snapshots reach `on_snapshot` ordered oldest first.
    ///
    /// # Errors
    ///
    /// Fails unless a user is on the home or results screen with a
    /// recommendation to join.
    pub fn join_group_chat<F, H>(&mut self, feed: &F, on_snapshot: H) -> Result<&str, SessionError>
    where
        F: RoomFeed + ?Sized,
        H: Fn(Vec<ChatMessage>) + Send + Sync + 'static,
    {
        const ACTION: &str = "join a group chat";
        self.require(&[View::Home, View::Results], ACTION)?;
        self.signed_in_user(ACTION)?;
        let room_key = self
            .recommendation
            .as_ref()
            .ok_or(SessionError::NoGroupAssignment)?
            .room_key();

        let subscription = feed.subscribe(
            &room_key,
            Box::new(move |mut messages| {
                sort_chronologically(&mut messages);
                on_snapshot(messages);
            }),
        );
        self.enter(View::GroupChat);
        let room = self.room.insert(subscription);
        Ok(room.room_key())
    }

    /// Opens the therapist bot chat.
    ///
    /// # Errors
    ///
    /// Fails unless a user is signed in on the home or results screen.
    pub fn open_bot_chat(&mut self) -> Result<View, SessionError> {
        const ACTION: &str = "open the therapist chat";
        self.require(&[View::Home, View::Results], ACTION)?;
        self.signed_in_user(ACTION)?;
        self.enter(View::BotChat);
        Ok(self.view)
    }

    /// Returns to the landing view of the signed-in role, abandoning any
    /// quiz and leaving any chat room.
    ///
    /// # Errors
    ///
    /// Fails on the splash and login screens.
    pub fn go_home(&mut self) -> Result<View, SessionError> {
        if matches!(self.view, View::Splash | View::Login) || self.user.is_none() {
            return Err(SessionError::InvalidTransition {
                from: self.view,
                action: "go home",
            });
        }
        let landing = self.landing_view();
        self.enter(landing);
        Ok(self.view)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
