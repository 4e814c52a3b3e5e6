//! Age groups, assessment scores and the stress level derived from them.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Audience an assessment and its recommendations are tailored to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgeGroup {
    /// 13-17
    Teen,
    /// 18-64
    Adult,
    /// 65+
    Elder,
}

impl AgeGroup {
    /// All groups in display order.
    pub const ALL: [Self; 3] = [Self::Teen, Self::Adult, Self::Elder];

    /// Stable identifier used in prompts, config files and room names.
    #[must_use]
    pub const fn id(self) -> &'static str {
        match self {
            Self::Teen => "teen",
            Self::Adult => "adult",
            Self::Elder => "elder",
        }
    }

    /// Human-readable label including the age range.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Teen => "Teen (13-17)",
            Self::Adult => "Adult (18-64)",
            Self::Elder => "Elder (65+)",
        }
    }
}

impl fmt::Display for AgeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// An age group id that is not one of `teen`, `adult` or `elder`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown age group '{0}': expected teen, adult, or elder")]
pub struct UnknownAgeGroup(pub String);

impl FromStr for AgeGroup {
    type Err = UnknownAgeGroup;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|group| group.id().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownAgeGroup(s.to_string()))
    }
}

/// Self-reported stress bucket derived from a [`Score`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum StressLevel {
    /// Ratio at or below 0.3
    Low,
    /// Ratio above 0.3 and at most 0.6
    Moderate,
    /// Ratio above 0.6
    High,
}

impl StressLevel {
    /// Phrase used when describing the level in a prompt.
    #[must_use]
    pub const fn phrase(self) -> &'static str {
        match self {
            Self::Low => "low stress",
            Self::Moderate => "moderate stress",
            Self::High => "high stress",
        }
    }
}

impl fmt::Display for StressLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.phrase())
    }
}

/// Total points of a completed assessment out of the maximum possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    /// Points scored
    pub value: u32,
    /// Maximum possible points
    pub max: u32,
}

impl Score {
    /// Points awarded for the strongest answer to a question.
    pub const POINTS_PER_QUESTION: u32 = 5;

    /// Creates a score from raw points.
    #[must_use]
    pub const fn new(value: u32, max: u32) -> Self {
        Self { value, max }
    }

    /// Creates a score for a quiz of `questions` questions.
    #[must_use]
    pub const fn for_questions(value: u32, questions: u32) -> Self {
        Self::new(value, questions.saturating_mul(Self::POINTS_PER_QUESTION))
    }

    /// Fraction of the maximum scored; zero when the maximum is zero.
    #[must_use]
    pub fn ratio(self) -> f64 {
        if self.max == 0 {
            return 0.0;
        }
        f64::from(self.value) / f64::from(self.max)
    }

    /// Stress bucket for this score.
    #[must_use]
    pub fn stress_level(self) -> StressLevel {
        let ratio = self.ratio();
        if ratio > 0.6 {
            StressLevel::High
        } else if ratio > 0.3 {
            StressLevel::Moderate
        } else {
            StressLevel::Low
        }
    }

    /// One-line summary shown with assessment results.
    ///
    /// Below 30% of the maximum reads as resilient and up to 60% inclusive as
    /// balanced. These bands are closed at the top, unlike [`StressLevel`].
    #[must_use]
    pub fn summary(self) -> &'static str {
        let value = u64::from(self.value) * 10;
        let max = u64::from(self.max);
        if value < max * 3 {
            "You show high resilience and good coping mechanisms."
        } else if value <= max * 6 {
            "You have a balanced mindset but may benefit from self-care."
        } else {
            "You seem to be experiencing high stress and could benefit from support."
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_group_parses_ids_case_insensitively() {
        assert_eq!("teen".parse::<AgeGroup>(), Ok(AgeGroup::Teen));
        assert_eq!("Adult".parse::<AgeGroup>(), Ok(AgeGroup::Adult));
        assert_eq!(" ELDER ".parse::<AgeGroup>(), Ok(AgeGroup::Elder));
    }

    #[test]
    fn age_group_rejects_unknown_id() {
        let err = "toddler".parse::<AgeGroup>().unwrap_err();
        assert_eq!(err, UnknownAgeGroup("toddler".to_string()));
        assert!(err.to_string().contains("toddler"));
    }

    #[test]
    fn age_group_display_round_trips_through_from_str() {
        for group in AgeGroup::ALL {
            assert_eq!(group.to_string().parse::<AgeGroup>(), Ok(group));
        }
    }

    #[test]
    fn age_group_serializes_as_lowercase_id() {
        assert_eq!(
            serde_json::to_string(&AgeGroup::Elder).unwrap(),
            "\"elder\""
        );
    }

    #[test]
    fn labels_include_age_ranges() {
        assert_eq!(AgeGroup::Teen.label(), "Teen (13-17)");
        assert_eq!(AgeGroup::Adult.label(), "Adult (18-64)");
        assert_eq!(AgeGroup::Elder.label(), "Elder (65+)");
    }

    #[test]
    fn for_questions_uses_five_points_each() {
        assert_eq!(Score::for_questions(12, 4), Score::new(12, 20));
    }

    #[test]
    fn stress_level_thresholds_are_exclusive() {
        assert_eq!(Score::new(3, 10).stress_level(), StressLevel::Low);
        assert_eq!(Score::new(4, 10).stress_level(), StressLevel::Moderate);
        assert_eq!(Score::new(6, 10).stress_level(), StressLevel::Moderate);
        assert_eq!(Score::new(7, 10).stress_level(), StressLevel::High);
    }

    #[test]
    fn summary_bands_differ_from_stress_level_at_the_edges() {
        let resilient = "You show high resilience and good coping mechanisms.";
        let balanced = "You have a balanced mindset but may benefit from self-care.";
        let stressed = "You seem to be experiencing high stress and could benefit from support.";

        assert_eq!(Score::new(2, 10).summary(), resilient);
        assert_eq!(Score::new(3, 10).stress_level(), StressLevel::Low);
        assert_eq!(Score::new(3, 10).summary(), balanced);
        assert_eq!(Score::new(6, 10).summary(), balanced);
        assert_eq!(Score::new(7, 10).summary(), stressed);
    }

    #[test]
    fn summary_thresholds_use_exact_fractions() {
        assert_eq!(
            Score::new(6, 20).summary(),
            "You have a balanced mindset but may benefit from self-care."
        );
        assert_eq!(
            Score::new(5, 20).summary(),
            "You show high resilience and good coping mechanisms."
        );
        assert_eq!(
            Score::new(13, 20).summary(),
            "You seem to be experiencing high stress and could benefit from support."
        );
    }

    #[test]
    fn zero_max_counts_as_low_stress() {
        assert_eq!(Score::new(0, 0).stress_level(), StressLevel::Low);
    }

    #[test]
    fn score_displays_as_fraction() {
        assert_eq!(Score::new(14, 25).to_string(), "14/25");
    }
}
