//! Exam configuration: duration and per-subject distribution policy

use crate::error::{CoreError, Result};
use crate::subject::SubjectCategory;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use tracing::warn;

/// Target fractions of easy/medium/hard questions for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyMix {
    pub easy: f64,
    pub medium: f64,
    pub hard: f64,
}

impl DifficultyMix {
    pub const fn new(easy: f64, medium: f64, hard: f64) -> Self {
        DifficultyMix { easy, medium, hard }
    }
}

impl Default for DifficultyMix {
    fn default() -> Self {
        DifficultyMix::new(0.4, 0.4, 0.2)
    }
}

/// Upper bound for a single subject's question count
pub const MAX_QUOTA_COUNT: usize = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubjectQuota {
    pub subject: SubjectCategory,
    pub count: usize,
    #[serde(default)]
    pub mix: DifficultyMix,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionPolicy {
    pub quotas: Vec<SubjectQuota>,
}

impl DistributionPolicy {
    /// 120 questions: 15 per subject, 20 mathematics, 10 english.
    pub fn reference() -> Self {
        use SubjectCategory::*;
        let standard = DifficultyMix::default();
        let quota = |subject, count, mix| SubjectQuota { subject, count, mix };
        DistributionPolicy {
            quotas: vec![
                quota(Civil, 15, standard),
                quota(Mechanical, 15, standard),
                quota(Electrical, 15, standard),
                quota(Electronics, 15, standard),
                quota(Programming, 15, standard),
                quota(Mathematics, 20, DifficultyMix::new(0.3, 0.4, 0.3)),
                quota(Mechanics, 15, standard),
                quota(English, 10, DifficultyMix::new(0.5, 0.3, 0.2)),
            ],
        }
    }

    /// Saturates instead of overflowing on unvalidated policies.
    pub fn total(&self) -> usize {
        self.quotas.iter().fold(0usize, |sum, q| sum.saturating_add(q.count))
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for quota in &self.quotas {
            if !seen.insert(quota.subject) {
                return Err(CoreError::Config(format!("Subject {} listed twice", quota.subject)));
            }
            if quota.count > MAX_QUOTA_COUNT {
                return Err(CoreError::Config(format!(
                    "Quota for {} asks for {} questions, at most {} allowed",
                    quota.subject, quota.count, MAX_QUOTA_COUNT
                )));
            }
            let DifficultyMix { easy, medium, hard } = quota.mix;
            if [easy, medium, hard].iter().any(|f| !(0.0..=1.0).contains(f)) {
                return Err(CoreError::Config(format!(
                    "Difficulty fractions for {} must lie between 0 and 1",
                    quota.subject
                )));
            }
            if (easy + medium + hard - 1.0).abs() > 1e-6 {
                return Err(CoreError::Config(format!(
                    "Difficulty fractions for {} sum to {}, expected 1.0",
                    quota.subject,
                    easy + medium + hard
                )));
            }
        }
        Ok(())
    }
}

impl Default for DistributionPolicy {
    fn default() -> Self {
        Self::reference()
    }
}

/// Upper bound for the countdown budget (one week)
pub const MAX_DURATION_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamConfig {
    /// Countdown budget for one exam
    pub duration_secs: u64,
    pub policy: DistributionPolicy,
}

impl Default for ExamConfig {
    fn default() -> Self {
        Self {
            duration_secs: 2 * 60 * 60,
            policy: DistributionPolicy::reference(),
        }
    }
}

impl ExamConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: ExamConfig =
            toml::from_str(text).map_err(|e| CoreError::Config(format!("Failed to parse exam config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_secs == 0 || self.duration_secs > MAX_DURATION_SECS {
            return Err(CoreError::Config(format!(
                "Exam duration must be between 1 and {} seconds",
                MAX_DURATION_SECS
            )));
        }
        self.policy.validate()
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| CoreError::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml_str(&text)
    }

    /// Defaults, overridden by `LETSTUDY_POLICY_FILE` and `LETSTUDY_EXAM_DURATION_SECS`.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("LETSTUDY_POLICY_FILE") {
            Ok(path) => Self::from_path(path)?,
            Err(_) => Self::default(),
        };
        if let Ok(value) = std::env::var("LETSTUDY_EXAM_DURATION_SECS") {
            match value.trim().parse() {
                Ok(secs) => config.duration_secs = secs,
                Err(e) => warn!(%value, error = %e, "ignoring invalid LETSTUDY_EXAM_DURATION_SECS"),
            }
        }
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_policy_totals_120() {
        let policy = DistributionPolicy::reference();
        assert_eq!(policy.total(), 120);
        assert_eq!(policy.quotas.len(), 8);
        assert!(policy.validate().is_ok());
        assert_eq!(ExamConfig::default().duration_secs, 7200);
    }

    #[test]
    fn toml_config_parses_with_default_mix() {
        let text = r#"
            duration_secs = 600

            [[policy.quotas]]
            subject = "civil"
            count = 5

            [[policy.quotas]]
            subject = "english"
            count = 3
            mix = { easy = 0.5, medium = 0.5, hard = 0.0 }
        "#;
        let config = ExamConfig::from_toml_str(text).unwrap();
        assert_eq!(config.duration_secs, 600);
        assert_eq!(config.policy.quotas[0].mix, DifficultyMix::default());
        assert_eq!(config.policy.quotas[1].subject, SubjectCategory::English);
    }

    #[test]
    fn bad_mix_is_rejected() {
        let text = r#"
            duration_secs = 600
            [[policy.quotas]]
            subject = "civil"
            count = 5
            mix = { easy = 0.5, medium = 0.5, hard = 0.5 }
        "#;
        assert!(matches!(ExamConfig::from_toml_str(text), Err(CoreError::Config(_))));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let config = ExamConfig { duration_secs: 0, ..ExamConfig::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_quota_is_rejected() {
        let text = r#"
            duration_secs = 600
            [[policy.quotas]]
            subject = "civil"
            count = 9223372036854775807
        "#;
        assert!(matches!(ExamConfig::from_toml_str(text), Err(CoreError::Config(_))));

        let mut policy = DistributionPolicy::reference();
        policy.quotas[0].count = MAX_QUOTA_COUNT;
        assert!(policy.validate().is_ok());
        policy.quotas[0].count = MAX_QUOTA_COUNT + 1;
        assert!(policy.validate().is_err());
    }

    #[test]
    fn unparseable_env_duration_keeps_default() {
        std::env::remove_var("LETSTUDY_POLICY_FILE");
        std::env::set_var("LETSTUDY_EXAM_DURATION_SECS", "two hours");
        let config = ExamConfig::from_env().unwrap();
        assert_eq!(config.duration_secs, 7200);

        std::env::set_var("LETSTUDY_EXAM_DURATION_SECS", " 900 ");
        assert_eq!(ExamConfig::from_env().unwrap().duration_secs, 900);
        std::env::remove_var("LETSTUDY_EXAM_DURATION_SECS");
    }

    #[test]
    fn duplicate_subject_is_rejected() {
        let mut policy = DistributionPolicy::reference();
        policy.quotas.push(policy.quotas[0]);
        assert!(policy.validate().is_err());
    }
}
