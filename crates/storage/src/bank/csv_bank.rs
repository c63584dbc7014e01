use std::io::Read;

use quiz_core::model::{QuestionNumber, QuestionRecord};

use super::BankLoadError;

/// Accepted header names per column, compared case-insensitively.
struct Column {
    name: &'static str,
    headers: &'static [&'static str],
}

const NUMBER: Column = Column {
    name: "number",
    headers: &["порядковий номер питання", "number", "no", "#"],
};
const TEXT: Column = Column {
    name: "question",
    headers: &["текст питання", "question", "text"],
};
const CORRECT: Column = Column {
    name: "correct",
    headers: &["правильна відповідь", "correct", "answer"],
};
const OPTION2: Column = Column {
    name: "option2",
    headers: &["варіант№2", "option2", "option 2"],
};
const OPTION3: Column = Column {
    name: "option3",
    headers: &["варіант№3", "option3", "option 3"],
};
const OPTION4: Column = Column {
    name: "option4",
    headers: &["варіант№4", "option4", "option 4"],
};

fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}').trim().to_lowercase()
}

fn find_column(headers: &[String], column: &Column) -> Result<usize, BankLoadError> {
    headers
        .iter()
        .position(|h| column.headers.contains(&h.as_str()))
        .ok_or(BankLoadError::MissingColumn {
            column: column.name,
        })
}

/// Spreadsheet exports sometimes write integers as `12.0`.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
fn parse_number(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    let float = raw.parse::<f64>().ok()?;
    (float.fract() == 0.0 && float >= 0.0 && float <= u64::MAX as f64).then(|| float as u64)
}

/// Parse a CSV question bank with a header row into records in source order.
///
/// Blank rows are skipped. Answer cells are kept verbatim.
///
/// # Errors
///
/// Returns `BankLoadError::MissingColumn` if a required header is absent,
/// `BankLoadError::InvalidRow` for rows with a bad question number, and
/// `BankLoadError::Csv` for malformed CSV.
pub fn parse_bank<R: Read>(reader: R) -> Result<Vec<QuestionRecord>, BankLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(normalize_header).collect();
    let number_col = find_column(&headers, &NUMBER)?;
    let text_col = find_column(&headers, &TEXT)?;
    let correct_col = find_column(&headers, &CORRECT)?;
    let option_cols = [
        find_column(&headers, &OPTION2)?,
        find_column(&headers, &OPTION3)?,
        find_column(&headers, &OPTION4)?,
    ];

    let mut questions = Vec::new();
    for (index, result) in reader.records().enumerate() {
        let record = result?;
        // Header is line 1.
        let row = index + 2;

        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let cell = |col: usize| record.get(col).unwrap_or("");
        let raw_number = cell(number_col);
        let number = parse_number(raw_number).ok_or_else(|| BankLoadError::InvalidRow {
            row,
            reason: format!("invalid question number '{raw_number}'"),
        })?;

        let question = QuestionRecord::new(
            QuestionNumber::new(number),
            cell(text_col),
            cell(correct_col),
            cell(option_cols[0]),
            cell(option_cols[1]),
            cell(option_cols[2]),
        )
        .map_err(|err| BankLoadError::InvalidRow {
            row,
            reason: err.to_string(),
        })?;
        questions.push(question);
    }

    Ok(questions)
}
