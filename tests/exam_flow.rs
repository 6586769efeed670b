use chrono::{Duration, TimeZone, Utc};
use letstudy_core::import::FileOutcome;
use letstudy_core::validate::RowIssue;
use letstudy_core::{
    CoreError, DifficultyMix, DistributionPolicy, ExamConfig, ImportKind, Mastery, ReviewMark, SqliteStore,
    StudyState, SubjectCategory, SubjectQuota, Tick,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::PathBuf;

const FLASHCARDS_CSV: &str = "\
Subject,Question,Answer,Difficulty
Civil,What is the purpose of a slump test?,To measure concrete workability,Easy
civil,WHAT IS THE PURPOSE OF A SLUMP TEST?,Duplicate,Easy
Astrology,What is a zodiac?,A belt of constellations,Easy
Mathematics,What is the formula for the area of a circle?,πr²,Medium
";

const MOCK_TESTS_CSV: &str = "\
Subject,Question,Option A,Option B,Option C,Option D,Correct Answer,Difficulty
Programming,What does printf() do?,Input,Output,Calculate,Loop,B,Easy
C Programming,Which keyword declares a constant?,const,var,let,static,a,Easy
Software,Which loop checks its condition last?,for,while,do-while,goto,C,Easy
Coding,What does ++ do?,Increment,Decrement,Negate,Shift,A,Easy
Programming,Broken answer,Input,Output,Calculate,Loop,E,Easy
Programming,Same options,Yes,yes, YES ,yes,A,Easy
";

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("letstudy-{}-{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn programming_only_config() -> ExamConfig {
    ExamConfig {
        duration_secs: 90 * 60,
        policy: DistributionPolicy {
            quotas: vec![SubjectQuota {
                subject: SubjectCategory::Programming,
                count: 10,
                mix: DifficultyMix::new(1.0, 0.0, 0.0),
            }],
        },
    }
}

#[test]
fn import_exam_and_persist() {
    let dir = scratch_dir("flow");
    let flashcards = dir.join("flashcards.csv");
    let mock_tests = dir.join("mocktests.csv");
    fs::write(&flashcards, FLASHCARDS_CSV).unwrap();
    fs::write(&mock_tests, MOCK_TESTS_CSV).unwrap();

    let mut state = StudyState::new(programming_only_config());
    let report = state.import_files(Some(&flashcards), Some(&mock_tests)).unwrap();

    let cards = report.flashcards.as_ref().and_then(FileOutcome::imported).unwrap();
    assert_eq!((cards.imported, cards.skipped), (2, 2));
    assert_eq!(cards.rejections[0].issue, RowIssue::Duplicate);
    assert_eq!(cards.rejections[1].issue, RowIssue::UnknownSubject("Astrology".to_string()));

    let mcqs = report.mock_tests.as_ref().and_then(FileOutcome::imported).unwrap();
    assert_eq!((mcqs.imported, mcqs.skipped), (4, 2));
    assert_eq!(mcqs.errors[0].row, 5);
    assert_eq!(mcqs.errors[1].issue, RowIssue::IndistinctOptions);
    assert_eq!(state.bank().mock_tests(SubjectCategory::Programming).len(), 4);

    // quota of 10 against 4 available easy questions
    let t0 = Utc.with_ymd_and_hms(2024, 6, 3, 8, 0, 0).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let session = state.start_exam(t0, &mut rng).unwrap();
    assert_eq!(session.len(), 4);
    let correct: Vec<_> = session.questions().iter().map(|q| q.correct_answer).collect();

    state.answer(0, correct[0]).unwrap();
    state.answer(1, correct[1]).unwrap();
    assert!(matches!(
        state.answer(4, correct[0]),
        Err(CoreError::QuestionOutOfRange { index: 4, len: 4 })
    ));

    assert_eq!(state.countdown_display(t0 + Duration::seconds(1)).as_deref(), Some("01:29:59"));
    assert!(matches!(state.tick(t0 + Duration::minutes(10)), Tick::Running { .. }));

    let mut finished = None;
    for _ in 0..4 {
        if let Some(report) = state.advance(t0 + Duration::minutes(20)).unwrap() {
            finished = Some(report);
            break;
        }
    }
    let report = finished.unwrap();
    assert_eq!((report.correct_count, report.total, report.percentage), (2, 4, 50));
    assert!(state.submit(t0 + Duration::minutes(21)).unwrap().is_none());
    assert_eq!(state.tick(t0 + Duration::hours(3)), Tick::Idle);
    assert_eq!(state.history().entries().len(), 1);

    let db_path = dir.join("state.db");
    let _ = fs::remove_file(&db_path);
    {
        let mut store = SqliteStore::open(&db_path).unwrap();
        state.save(&mut store).unwrap();
    }
    let store = SqliteStore::open(&db_path).unwrap();
    let mut restored = StudyState::load(&store, programming_only_config()).unwrap();
    assert_eq!(restored.bank(), state.bank());
    assert_eq!(restored.history().average_score(), 50);

    restored.select_flashcard_subject(SubjectCategory::Mathematics);
    assert!(restored.mark_flashcard(ReviewMark::Mastered));
    assert_eq!(restored.bank().flashcards(SubjectCategory::Mathematics)[0].mastery, Mastery::Mastered);
    let stats = restored.dashboard();
    assert_eq!((stats.total_flashcards, stats.mastered_flashcards, stats.tests_taken), (2, 1, 1));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn unreadable_file_does_not_block_the_other() {
    let dir = scratch_dir("partial");
    let mock_tests = dir.join("mocktests.csv");
    fs::write(&mock_tests, MOCK_TESTS_CSV).unwrap();

    let mut state = StudyState::default();
    let report = state
        .import_files(Some(&dir.join("missing.xlsx")), Some(&mock_tests))
        .unwrap();

    assert!(matches!(report.flashcards, Some(FileOutcome::Failed { .. })));
    assert_eq!(report.mock_tests.as_ref().and_then(FileOutcome::imported).unwrap().imported, 4);
    assert!(matches!(state.import_files(None, None), Err(CoreError::EmptyInput(_))));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn validation_preview_lists_every_problem() {
    let dir = scratch_dir("preview");
    let mock_tests = dir.join("mocktests.csv");
    fs::write(&mock_tests, MOCK_TESTS_CSV).unwrap();

    let report = letstudy_core::validate_file(&mock_tests, ImportKind::MockTests).unwrap();
    assert!(!report.valid);
    assert_eq!(report.record_count, 6);
    let text: Vec<String> = report.errors.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        text,
        vec![
            "Row 5: Invalid correct answer \"E\" - must be A, B, C, or D".to_string(),
            "Row 6: At least two options must be meaningfully different".to_string(),
        ]
    );

    let _ = fs::remove_dir_all(&dir);
}
