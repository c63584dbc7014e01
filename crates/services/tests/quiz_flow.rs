use std::sync::Arc;
use std::time::Duration;

use quiz_core::model::{BankId, MasteryPolicy, QuestionNumber, QuestionRecord};
use quiz_core::time::fixed_now;
use services::{
    AdvanceOutcome, AnswerOutcome, Clock, ProblemTracker, QuizController, QuizEvent, QuizState,
    SessionError, StartMode,
};
use storage::bank::InMemoryBankLoader;
use storage::repository::Storage;
use tokio::sync::mpsc::UnboundedReceiver;

const BANK: &str = "geo.csv";

fn question(number: u64) -> QuestionRecord {
    QuestionRecord::new(
        QuestionNumber::new(number),
        format!("Question {number}"),
        format!("right {number}"),
        "wrong a",
        "wrong b",
        "wrong c",
    )
    .unwrap()
}

struct Harness {
    controller: QuizController,
    events: UnboundedReceiver<QuizEvent>,
    loader: Arc<InMemoryBankLoader>,
    storage: Storage,
}

async fn harness(len: u64) -> Harness {
    let loader = Arc::new(InMemoryBankLoader::new());
    loader.insert(BANK, (1..=len).map(question).collect());
    let storage = Storage::in_memory();
    let tracker =
        Arc::new(ProblemTracker::load(storage.problem_stats(), MasteryPolicy::default()).await);

    let (controller, events) =
        QuizController::new(loader.clone(), tracker, Clock::fixed(fixed_now()));
    let controller = controller
        .with_advance_delay(Duration::from_millis(10))
        .with_rng_seed(42);
    Harness {
        controller,
        events,
        loader,
        storage,
    }
}

/// Answer the current question and drive the advance straight away.
async fn answer(controller: &mut QuizController, correct: bool) -> AdvanceOutcome {
    let number = controller.view().unwrap().number.value();
    let text = if correct {
        format!("right {number}")
    } else {
        "wrong a".to_owned()
    };
    let AnswerOutcome::Scored { ticket, .. } = controller.answer(&text).await.unwrap() else {
        panic!("expected a scored answer");
    };
    controller.on_advance_due(ticket)
}

#[tokio::test]
async fn three_question_run_reports_score_and_tracks_miss() {
    let mut h = harness(3).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.start(StartMode::All).unwrap();

    assert_eq!(answer(&mut h.controller, true).await, AdvanceOutcome::Next);
    assert_eq!(answer(&mut h.controller, false).await, AdvanceOutcome::Next);
    h.controller.clock_mut().advance(chrono::Duration::seconds(90));
    assert_eq!(answer(&mut h.controller, true).await, AdvanceOutcome::Finished);
    assert_eq!(h.controller.state(), QuizState::Finished);

    let report = h.controller.report().unwrap();
    assert_eq!(report.correct_count(), 2);
    assert_eq!(report.total(), 3);
    assert!((report.percentage().unwrap() - 66.666_666).abs() < 1e-3);
    assert_eq!(report.score().to_string(), "66.67%");
    assert!((report.elapsed_minutes() - 1.5).abs() < f64::EPSILON);

    let missed: Vec<_> = report.missed().iter().map(|m| m.question_number).collect();
    assert_eq!(missed, vec![QuestionNumber::new(2)]);

    let bank = BankId::new(BANK);
    let tracker = h.controller.tracker();
    assert_eq!(
        tracker.snapshot().streak(&bank, QuestionNumber::new(2)),
        Some(0)
    );
    let set = tracker.problem_set_for(&bank, &h.controller.bank().unwrap().questions);
    assert_eq!(set, vec![question(2)]);

    let persisted = h.storage.problem_stats().load().await.unwrap();
    assert_eq!(persisted.count_for(&bank), 1);
}

#[tokio::test]
async fn terminating_after_two_answers_reports_two() {
    let mut h = harness(5).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.start(StartMode::All).unwrap();

    answer(&mut h.controller, true).await;
    answer(&mut h.controller, true).await;
    let session = h.controller.terminate().unwrap();
    assert!(session.is_finished());

    let report = h.controller.report().unwrap();
    assert_eq!(report.total(), 2);
    assert_eq!(report.correct_count(), 2);
    assert!(matches!(
        h.controller.terminate(),
        Err(SessionError::NotRunning)
    ));
}

#[tokio::test]
async fn starting_on_an_empty_bank_is_refused() {
    let mut h = harness(0).await;
    h.controller.load_bank(BANK).await.unwrap();
    assert!(!h.controller.can_start());
    assert!(matches!(
        h.controller.start(StartMode::All),
        Err(SessionError::Empty)
    ));
    assert_eq!(h.controller.state(), QuizState::Idle);
}

#[tokio::test]
async fn start_without_a_bank_is_refused() {
    let mut h = harness(1).await;
    assert!(matches!(
        h.controller.start(StartMode::All),
        Err(SessionError::NoBank)
    ));
}

#[tokio::test]
async fn failed_load_keeps_previous_bank() {
    let mut h = harness(2).await;
    h.controller.load_bank(BANK).await.unwrap();
    let err = h.controller.load_bank("missing.csv").await.unwrap_err();
    assert!(matches!(err, SessionError::Load(_)));
    assert_eq!(h.controller.bank().unwrap().id, BankId::new(BANK));
}

#[tokio::test]
async fn start_from_skips_earlier_questions() {
    let mut h = harness(4).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.settings_mut().start_from = 3;
    h.controller.start(StartMode::All).unwrap();

    let view = h.controller.view().unwrap();
    assert_eq!(view.number, QuestionNumber::new(3));
    assert_eq!((view.position, view.total), (3, 4));
}

#[tokio::test]
async fn problems_only_runs_tracked_questions() {
    let mut h = harness(4).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.start(StartMode::All).unwrap();
    answer(&mut h.controller, true).await;
    answer(&mut h.controller, false).await;
    answer(&mut h.controller, true).await;
    answer(&mut h.controller, false).await;
    assert_eq!(h.controller.problem_count(), 2);

    h.controller.restart().await.unwrap();
    h.controller.start(StartMode::ProblemsOnly).unwrap();
    let numbers: Vec<_> = h
        .controller
        .session()
        .unwrap()
        .questions()
        .iter()
        .map(|q| q.number().value())
        .collect();
    assert_eq!(numbers, vec![2, 4]);

    // The full bank survives a problem-only run.
    assert_eq!(h.controller.bank().unwrap().len(), 4);
}

#[tokio::test]
async fn mastering_a_problem_removes_it() {
    let mut h = harness(1).await;
    h.controller.load_bank(BANK).await.unwrap();

    for correct in [false, true, true] {
        h.controller.start(StartMode::All).unwrap();
        answer(&mut h.controller, correct).await;
        h.controller.restart().await.unwrap();
    }

    assert_eq!(h.controller.problem_count(), 0);
    assert!(matches!(
        h.controller.start(StartMode::ProblemsOnly),
        Err(SessionError::Empty)
    ));
}

#[tokio::test]
async fn restart_reloads_bank_and_keeps_settings() {
    let mut h = harness(3).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.settings_mut().randomize = true;
    h.controller.start(StartMode::All).unwrap();
    answer(&mut h.controller, true).await;

    assert!(matches!(
        h.controller.start(StartMode::All),
        Err(SessionError::InProgress)
    ));

    h.controller.restart().await.unwrap();
    assert_eq!(h.controller.state(), QuizState::Idle);
    assert!(h.controller.session().is_none());
    assert_eq!(h.loader.load_count(BANK), 2);
    assert!(h.controller.settings().randomize);
    assert!(h.controller.can_start());
}

#[tokio::test]
async fn randomized_run_covers_every_question_once() {
    let mut h = harness(6).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.settings_mut().randomize = true;
    h.controller.start(StartMode::All).unwrap();

    let mut numbers: Vec<_> = h
        .controller
        .session()
        .unwrap()
        .questions()
        .iter()
        .map(|q| q.number().value())
        .collect();
    numbers.sort_unstable();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6]);
}

#[tokio::test]
async fn answer_option_picks_by_index() {
    let mut h = harness(1).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.start(StartMode::All).unwrap();

    assert!(matches!(
        h.controller.answer_option(4).await,
        Err(SessionError::UnknownOption)
    ));
    let chosen = h.controller.view().unwrap().options[2].text.clone();
    let AnswerOutcome::Scored { entry, .. } = h.controller.answer_option(2).await.unwrap() else {
        panic!("expected a scored answer");
    };
    assert_eq!(entry.selected_answer, chosen);
    assert_eq!(
        h.controller.answer_option(0).await.unwrap(),
        AnswerOutcome::Ignored
    );
}

#[tokio::test(start_paused = true)]
async fn timer_advances_after_delay() {
    let mut h = harness(2).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.start(StartMode::All).unwrap();

    let started = tokio::time::Instant::now();
    h.controller.answer("right 1").await.unwrap();
    assert_eq!(h.controller.state(), QuizState::Revealing);

    let event = h.events.recv().await.unwrap();
    assert!(started.elapsed() >= Duration::from_millis(10));
    assert_eq!(h.controller.handle_event(event), AdvanceOutcome::Next);
    assert_eq!(h.controller.state(), QuizState::Presenting);
    assert_eq!(h.controller.view().unwrap().number, QuestionNumber::new(2));
}

#[tokio::test(start_paused = true)]
async fn terminate_cancels_pending_advance() {
    let mut h = harness(3).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.start(StartMode::All).unwrap();

    let AnswerOutcome::Scored { ticket, .. } = h.controller.answer("right 1").await.unwrap() else {
        panic!("expected a scored answer");
    };
    h.controller.terminate().unwrap();

    let waited = tokio::time::timeout(Duration::from_secs(5), h.events.recv()).await;
    assert!(waited.is_err(), "cancelled advance must not fire");

    assert_eq!(h.controller.on_advance_due(ticket), AdvanceOutcome::Stale);
    assert_eq!(h.controller.state(), QuizState::Finished);
    assert_eq!(h.controller.report().unwrap().total(), 1);
}

#[tokio::test(start_paused = true)]
async fn advance_queued_before_restart_does_not_skip_next_run() {
    let mut h = harness(3).await;
    h.controller.load_bank(BANK).await.unwrap();
    h.controller.start(StartMode::All).unwrap();
    h.controller.answer("right 1").await.unwrap();

    // Let the timer fire without draining its event.
    tokio::time::sleep(Duration::from_millis(20)).await;
    tokio::task::yield_now().await;

    h.controller.terminate().unwrap();
    h.controller.restart().await.unwrap();
    h.controller.start(StartMode::All).unwrap();
    h.controller.answer("right 1").await.unwrap();

    let queued = h.events.try_recv().unwrap();
    assert_eq!(h.controller.handle_event(queued), AdvanceOutcome::Stale);
    assert_eq!(h.controller.state(), QuizState::Revealing);
    assert_eq!(h.controller.view().unwrap().number, QuestionNumber::new(1));

    let due = h.events.recv().await.unwrap();
    assert_eq!(h.controller.handle_event(due), AdvanceOutcome::Next);
    assert_eq!(h.controller.view().unwrap().number, QuestionNumber::new(2));
}
