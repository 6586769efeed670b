//! Randomized exam generation under subject quotas and difficulty mixes

use crate::bank::QuestionBank;
use crate::config::{DifficultyMix, DistributionPolicy, ExamConfig, MAX_DURATION_SECS};
use crate::error::{CoreError, Result};
use crate::models::{Difficulty, MockTestQuestion};
use crate::session::ExamSession;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

/// How many questions to draw from each difficulty bucket of one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BucketPlan {
    pub easy: usize,
    pub medium: usize,
    pub hard: usize,
}

impl BucketPlan {
    pub fn total(&self) -> usize {
        self.easy + self.medium + self.hard
    }

    fn get(&self, difficulty: Difficulty) -> usize {
        match difficulty {
            Difficulty::Easy => self.easy,
            Difficulty::Medium => self.medium,
            Difficulty::Hard => self.hard,
        }
    }
}

fn share(target: usize, fraction: f64) -> usize {
    // 0.3 * 10 must give 3, not 2
    (target as f64 * fraction + 1e-9).floor() as usize
}

/// Easy and medium take their floored share; hard takes the remainder.
/// Each is capped by supply, and a shortfall is not refilled from other buckets.
pub fn plan_counts(target: usize, mix: &DifficultyMix, available: [usize; 3]) -> BucketPlan {
    let [easy_supply, medium_supply, hard_supply] = available;
    let easy = share(target, mix.easy).min(easy_supply);
    let medium = share(target, mix.medium).min(medium_supply);
    let hard = target.saturating_sub(easy + medium).min(hard_supply);
    BucketPlan { easy, medium, hard }
}

/// Pick questions for every quota in the policy and shuffle them together.
pub fn select_questions<R: Rng + ?Sized>(
    bank: &QuestionBank,
    policy: &DistributionPolicy,
    rng: &mut R,
) -> Vec<MockTestQuestion> {
    let mut selected = Vec::with_capacity(bank.mock_test_count());

    for quota in &policy.quotas {
        let pool = bank.mock_tests(quota.subject);
        if pool.is_empty() {
            continue;
        }

        let buckets: Vec<Vec<&MockTestQuestion>> = Difficulty::ALL
            .iter()
            .map(|d| pool.iter().filter(|q| q.difficulty == *d).collect())
            .collect();
        let plan = plan_counts(quota.count, &quota.mix, [buckets[0].len(), buckets[1].len(), buckets[2].len()]);

        for (difficulty, bucket) in Difficulty::ALL.iter().zip(&buckets) {
            let count = plan.get(*difficulty);
            selected.extend(bucket.choose_multiple(rng, count).map(|q| (*q).clone()));
        }

        debug!(subject = %quota.subject, target = quota.count, ?plan, "selected questions");
        if plan.total() < quota.count {
            warn!(
                subject = %quota.subject,
                target = quota.count,
                selected = plan.total(),
                "not enough questions to fill subject quota"
            );
        }
    }

    selected.shuffle(rng);
    selected
}

/// Build a new exam session from the bank.
pub fn generate<R: Rng + ?Sized>(
    bank: &QuestionBank,
    config: &ExamConfig,
    now: DateTime<Utc>,
    rng: &mut R,
) -> Result<ExamSession> {
    if !bank.has_mock_test_questions() {
        return Err(CoreError::EmptyInput("Please upload mock test questions first".to_string()));
    }
    let questions = select_questions(bank, &config.policy, rng);
    let budget = Duration::seconds(config.duration_secs.min(MAX_DURATION_SECS) as i64);
    Ok(ExamSession::new(questions, now, budget))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SubjectQuota;
    use crate::models::OptionLetter;
    use crate::subject::SubjectCategory;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    fn fill(bank: &mut QuestionBank, subject: SubjectCategory, difficulty: Difficulty, n: usize) {
        for i in 0..n {
            bank.add_mock_test(
                subject,
                format!("{} {} {}", subject, difficulty, i),
                ["a".into(), "b".into(), "c".into(), "d".into()],
                OptionLetter::A,
                difficulty,
            );
        }
    }

    #[test]
    fn plan_follows_mix_and_caps_hard() {
        let standard = DifficultyMix::default();
        assert_eq!(plan_counts(15, &standard, [20, 20, 20]), BucketPlan { easy: 6, medium: 6, hard: 3 });
        assert_eq!(
            plan_counts(20, &DifficultyMix::new(0.3, 0.4, 0.3), [20, 20, 20]),
            BucketPlan { easy: 6, medium: 8, hard: 6 }
        );
        assert_eq!(
            plan_counts(10, &DifficultyMix::new(0.5, 0.3, 0.2), [20, 20, 20]),
            BucketPlan { easy: 5, medium: 3, hard: 2 }
        );
        // easy shortfall flows to hard, hard shortfall is not backfilled
        assert_eq!(plan_counts(15, &standard, [2, 20, 20]), BucketPlan { easy: 2, medium: 6, hard: 7 });
        assert_eq!(plan_counts(15, &standard, [20, 20, 1]), BucketPlan { easy: 6, medium: 6, hard: 1 });
    }

    #[test]
    fn scarce_subject_contributes_what_it_has() {
        let mut bank = QuestionBank::new();
        fill(&mut bank, SubjectCategory::Civil, Difficulty::Medium, 6);
        let mut rng = StdRng::seed_from_u64(1);

        let session = generate(&bank, &ExamConfig::default(), Utc::now(), &mut rng).unwrap();
        assert_eq!(session.len(), 6);
        assert!(session.answers().iter().all(Option::is_none));
        assert_eq!(session.current_index(), 0);
    }

    #[test]
    fn quotas_are_respected_and_questions_unique() {
        let mut bank = QuestionBank::new();
        for subject in SubjectCategory::ALL {
            for difficulty in Difficulty::ALL {
                fill(&mut bank, subject, difficulty, 12);
            }
        }
        let policy = DistributionPolicy::reference();
        let mut rng = StdRng::seed_from_u64(42);
        let questions = select_questions(&bank, &policy, &mut rng);

        assert_eq!(questions.len(), policy.total());
        let ids: HashSet<_> = questions.iter().map(|q| q.id).collect();
        assert_eq!(ids.len(), questions.len());

        let maths = questions.iter().filter(|q| q.subject() == SubjectCategory::Mathematics);
        let hard_maths = maths.filter(|q| q.difficulty == Difficulty::Hard).count();
        assert_eq!(hard_maths, 6);
    }

    #[test]
    fn order_is_shuffled_but_membership_is_not() {
        let mut bank = QuestionBank::new();
        fill(&mut bank, SubjectCategory::English, Difficulty::Easy, 5);
        fill(&mut bank, SubjectCategory::English, Difficulty::Medium, 3);
        fill(&mut bank, SubjectCategory::English, Difficulty::Hard, 2);
        fill(&mut bank, SubjectCategory::Civil, Difficulty::Easy, 6);
        fill(&mut bank, SubjectCategory::Civil, Difficulty::Medium, 6);
        fill(&mut bank, SubjectCategory::Civil, Difficulty::Hard, 3);
        let policy = DistributionPolicy::reference();

        let first = select_questions(&bank, &policy, &mut StdRng::seed_from_u64(3));
        let second = select_questions(&bank, &policy, &mut StdRng::seed_from_u64(4));

        let set = |qs: &[MockTestQuestion]| qs.iter().map(|q| q.id).collect::<HashSet<_>>();
        assert_eq!(first.len(), 25);
        assert_eq!(set(&first), set(&second));
        assert_ne!(
            first.iter().map(|q| q.id).collect::<Vec<_>>(),
            second.iter().map(|q| q.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn subjects_outside_the_policy_are_ignored() {
        let mut bank = QuestionBank::new();
        fill(&mut bank, SubjectCategory::Civil, Difficulty::Easy, 4);
        let policy = DistributionPolicy {
            quotas: vec![SubjectQuota {
                subject: SubjectCategory::English,
                count: 10,
                mix: DifficultyMix::default(),
            }],
        };
        let questions = select_questions(&bank, &policy, &mut StdRng::seed_from_u64(9));
        assert!(questions.is_empty());
    }

    #[test]
    fn empty_bank_is_refused() {
        let bank = QuestionBank::new();
        let result = generate(&bank, &ExamConfig::default(), Utc::now(), &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(CoreError::EmptyInput(_))));
    }

    #[test]
    fn oversized_quota_takes_only_what_exists() {
        let mut bank = QuestionBank::new();
        fill(&mut bank, SubjectCategory::Civil, Difficulty::Easy, 1);
        let config = ExamConfig {
            policy: DistributionPolicy {
                quotas: vec![
                    SubjectQuota {
                        subject: SubjectCategory::Civil,
                        count: usize::MAX,
                        mix: DifficultyMix::default(),
                    },
                    SubjectQuota {
                        subject: SubjectCategory::English,
                        count: usize::MAX,
                        mix: DifficultyMix::default(),
                    },
                ],
            },
            ..ExamConfig::default()
        };
        assert_eq!(config.policy.total(), usize::MAX);

        let session = generate(&bank, &config, Utc::now(), &mut StdRng::seed_from_u64(4)).unwrap();
        assert_eq!(session.len(), 1);
    }
}
