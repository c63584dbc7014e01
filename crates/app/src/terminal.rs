//! Line-oriented quiz front-end over stdin/stdout.

use std::fmt::Write as _;
use std::path::Path;

use quiz_core::model::SessionReport;
use services::{
    AdvanceOutcome, AnswerOutcome, OptionHint, QuestionView, QuizController, QuizEvent, QuizState,
    SessionError, StartMode,
};
use storage::bank::{BankCatalog, CatalogError};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;

/// One line of user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// Zero-based option index.
    Answer(usize),
    Terminate,
    Restart,
    ProblemsOnly,
    Exit,
}

impl Key {
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim() {
            "q" => Some(Key::Terminate),
            "r" => Some(Key::Restart),
            "p" => Some(Key::ProblemsOnly),
            "x" => Some(Key::Exit),
            digit => match digit.parse::<usize>() {
                Ok(n @ 1..=4) => Some(Key::Answer(n - 1)),
                _ => None,
            },
        }
    }
}

enum Flow {
    Continue,
    Exit,
}

/// Run the interactive loop until the user exits or stdin closes.
///
/// # Errors
///
/// Returns an error if stdin cannot be read.
pub async fn run(
    controller: &mut QuizController,
    events: &mut UnboundedReceiver<QuizEvent>,
    mode: StartMode,
) -> Result<(), Box<dyn std::error::Error>> {
    start(controller, mode);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match handle_key(controller, &line).await {
                    Flow::Continue => {}
                    Flow::Exit => break,
                }
            }
            Some(event) = events.recv() => {
                match controller.handle_event(event) {
                    AdvanceOutcome::Stale => {}
                    AdvanceOutcome::Next | AdvanceOutcome::Finished => show(controller),
                }
            }
        }
    }
    Ok(())
}

fn start(controller: &mut QuizController, mode: StartMode) {
    match controller.start(mode) {
        Ok(_) => show(controller),
        Err(SessionError::Empty) if mode == StartMode::ProblemsOnly => {
            println!("No problem questions for this bank. Press r to run the full bank.");
        }
        Err(err) => println!("Cannot start: {err}"),
    }
}

async fn handle_key(controller: &mut QuizController, line: &str) -> Flow {
    let Some(key) = Key::parse(line) else {
        println!("{}", help(controller.state(), controller.problem_count()));
        return Flow::Continue;
    };

    match (key, controller.state()) {
        (Key::Exit, _) => return Flow::Exit,
        (Key::Answer(index), QuizState::Presenting) => {
            match controller.answer_option(index).await {
                Ok(AnswerOutcome::Scored { .. }) => show(controller),
                Ok(AnswerOutcome::Ignored) => {}
                Err(err) => println!("{err}"),
            }
        }
        (Key::Terminate, QuizState::Presenting | QuizState::Revealing) => {
            if let Err(err) = controller.terminate() {
                println!("{err}");
            }
            show(controller);
        }
        (Key::Restart | Key::ProblemsOnly, QuizState::Finished | QuizState::Idle) => {
            if let Err(err) = controller.restart().await {
                println!("Reload failed, keeping the previous bank: {err}");
            }
            let mode = if key == Key::ProblemsOnly {
                StartMode::ProblemsOnly
            } else {
                StartMode::All
            };
            start(controller, mode);
        }
        // Answers while revealing are ignored.
        (Key::Answer(_), QuizState::Revealing) => {}
        (_, state) => println!("{}", help(state, controller.problem_count())),
    }
    Flow::Continue
}

fn show(controller: &QuizController) {
    if let Some(view) = controller.view() {
        print!("{}", render_question(&view));
    } else if let Ok(report) = controller.report() {
        let problems = controller.problem_count();
        print!("{}", render_report(&report));
        if problems > 0 {
            println!("Problem questions tracked: {problems}");
        }
        println!("{}", help(QuizState::Finished, problems));
    }
}

/// Key hints for `state`. Problem practice is only offered when there are problems.
fn help(state: QuizState, problem_count: usize) -> &'static str {
    match state {
        QuizState::Presenting => "Answer with 1-4, q to finish early, x to exit.",
        QuizState::Revealing => "Moving on shortly. q to finish early, x to exit.",
        QuizState::Finished | QuizState::Idle if problem_count > 0 => {
            "r to run again, p to practise problem questions, x to exit."
        }
        QuizState::Finished | QuizState::Idle => "r to run again, x to exit.",
    }
}

/// Catalog listing, or the reason it is unavailable.
#[must_use]
pub fn render_catalog(catalog: Result<BankCatalog, CatalogError>, banks_dir: &Path) -> String {
    let mut out = String::new();
    match catalog {
        Ok(catalog) if catalog.is_empty() => {
            let _ = writeln!(out, "No banks listed in {}", banks_dir.display());
        }
        Ok(catalog) => {
            for name in catalog.names() {
                let _ = writeln!(out, "{name}");
            }
        }
        Err(err) => {
            tracing::warn!(error = %err, "bank catalog unavailable");
            let _ = writeln!(out, "Bank catalog unavailable: {err}");
        }
    }
    out
}

#[must_use]
pub fn render_question(view: &QuestionView) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Question {}/{} (#{})",
        view.position, view.total, view.number
    );
    let _ = writeln!(out, "{}", view.text);
    for (index, option) in view.options.iter().enumerate() {
        let marker = match option.hint {
            OptionHint::Correct => "  <- correct",
            OptionHint::Wrong => "  <- your answer",
            OptionHint::Neutral | OptionHint::Disabled => "",
        };
        let _ = writeln!(out, "  {}) {}{marker}", index + 1, option.text);
    }
    out
}

#[must_use]
pub fn render_report(report: &SessionReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "Quiz finished");
    let _ = writeln!(
        out,
        "Correct: {}/{} ({})",
        report.correct_count(),
        report.total(),
        report.score()
    );
    let _ = writeln!(out, "Time: {:.2} min", report.elapsed_minutes());

    if !report.missed().is_empty() {
        let _ = writeln!(out, "Missed:");
        for entry in report.missed() {
            let _ = writeln!(
                out,
                "  #{} {}\n     yours: {}\n     right: {}",
                entry.question_number,
                entry.question_text,
                entry.selected_answer,
                entry.correct_answer
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{AnsweredEntry, QuestionNumber, QuestionRecord};
    use quiz_core::time::fixed_now;
    use services::OptionView;

    #[test]
    fn keys_parse() {
        assert_eq!(Key::parse("1"), Some(Key::Answer(0)));
        assert_eq!(Key::parse(" 4\n"), Some(Key::Answer(3)));
        assert_eq!(Key::parse("5"), None);
        assert_eq!(Key::parse("0"), None);
        assert_eq!(Key::parse("q"), Some(Key::Terminate));
        assert_eq!(Key::parse("p"), Some(Key::ProblemsOnly));
        assert_eq!(Key::parse("hello"), None);
    }

    #[test]
    fn problem_practice_is_offered_only_with_problems() {
        for state in [QuizState::Finished, QuizState::Idle] {
            let without = help(state, 0);
            assert!(!without.contains("p to practise"));
            assert!(without.contains("r to run again"));
            assert!(help(state, 3).contains("p to practise problem questions"));
        }
        assert!(!help(QuizState::Presenting, 3).contains("p to practise"));
    }

    #[test]
    fn catalog_failure_is_reported_not_raised() {
        let err = CatalogError::Read {
            path: "banks/index.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        let text = render_catalog(Err(err), Path::new("banks"));
        assert!(text.starts_with("Bank catalog unavailable: failed to read catalog"));

        let empty = render_catalog(Ok(BankCatalog::default()), Path::new("banks"));
        assert_eq!(empty, "No banks listed in banks\n");
    }

    #[test]
    fn question_marks_revealed_options() {
        let view = QuestionView {
            state: QuizState::Revealing,
            position: 2,
            total: 3,
            number: QuestionNumber::new(7),
            text: "Capital of France?".into(),
            options: vec![
                OptionView {
                    text: "Lyon".into(),
                    hint: OptionHint::Wrong,
                },
                OptionView {
                    text: "Paris".into(),
                    hint: OptionHint::Correct,
                },
            ],
            selection: Some("Lyon".into()),
        };
        let text = render_question(&view);
        assert!(text.contains("Question 2/3 (#7)"));
        assert!(text.contains("1) Lyon  <- your answer"));
        assert!(text.contains("2) Paris  <- correct"));
    }

    #[test]
    fn report_lists_score_and_misses() {
        let q1 = QuestionRecord::new(QuestionNumber::new(1), "One", "a", "b", "c", "d").unwrap();
        let q2 = QuestionRecord::new(QuestionNumber::new(2), "Two", "a", "b", "c", "d").unwrap();
        let q3 = QuestionRecord::new(QuestionNumber::new(3), "Three", "a", "b", "c", "d").unwrap();
        let answers = [
            AnsweredEntry::score(&q1, "a"),
            AnsweredEntry::score(&q2, "c"),
            AnsweredEntry::score(&q3, "a"),
        ];
        let report = SessionReport::from_answers(fixed_now(), fixed_now(), &answers).unwrap();

        let text = render_report(&report);
        assert!(text.contains("Correct: 2/3 (66.67%)"));
        assert!(text.contains("#2 Two"));
        assert!(text.contains("yours: c"));
        assert!(!text.contains("#1 One"));
    }

    #[test]
    fn empty_report_says_no_answers() {
        let report = SessionReport::from_answers(fixed_now(), fixed_now(), &[]).unwrap();
        let text = render_report(&report);
        assert!(text.contains("Correct: 0/0 (no answers recorded)"));
        assert!(!text.contains("Missed:"));
    }
}
