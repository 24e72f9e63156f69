//! Best-effort parsing of transactions from bank statement PDFs.
//!
//! The text of the PDF is read in two passes. The table pass treats lines
//! whose cells are separated by tabs or runs of spaces as table rows. If that
//! finds nothing, the line pass walks the text keeping track of the last date
//! it saw and reads an amount and description from each line.

use std::{panic, sync::OnceLock};

use regex::Regex;

use crate::{
    import::{
        candidate::{ImportCandidate, ImportResult, parse_amount},
        dates::parse_statement_date,
    },
    transaction::TransactionType,
};

const INCOME_KEYWORDS: [&str; 3] = ["credit", "deposit", "refund"];

/// The minimum number of cells for a line to count as a table row.
const MIN_TABLE_CELLS: usize = 3;

fn cell_separator_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\t+|\s{2,}").expect("cell separator regex"))
}

fn date_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"\b(?:\d{4}[-/.]\d{1,2}[-/.]\d{1,2}|\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}|\d{1,2}\s+[A-Za-z]{3,9}\s+\d{4})\b",
        )
        .expect("date regex")
    })
}

fn amount_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\(?-?\$?\d[\d,]*\.\d{2}\)?").expect("amount regex"))
}

/// Extract the text of a PDF and parse transactions from it.
///
/// Never fails: an unreadable PDF gives an empty result with a diagnostic.
pub fn parse_pdf(bytes: &[u8]) -> ImportResult {
    let extracted = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(bytes));

    match extracted {
        Ok(Ok(text)) => parse_statement_text(&text),
        Ok(Err(error)) => {
            tracing::debug!("could not extract text from PDF: {error}");
            ImportResult::failed(format!("Could not read the PDF: {error}"))
        }
        Err(_) => {
            tracing::error!("the PDF parser panicked while extracting text");
            ImportResult::failed("Could not read the PDF")
        }
    }
}

/// Parse transactions from the text of a statement.
pub fn parse_statement_text(text: &str) -> ImportResult {
    let mut transactions = parse_table_rows(text);

    if transactions.is_empty() {
        tracing::debug!("no table rows found in statement, falling back to line parsing");
        transactions = parse_lines(text);
    }

    if transactions.is_empty() {
        return ImportResult::failed("No transactions were found in the PDF");
    }

    ImportResult {
        transactions,
        ..Default::default()
    }
}

fn looks_like_date(text: &str) -> bool {
    date_regex().is_match(text)
}

fn looks_like_amount(text: &str) -> bool {
    amount_regex().is_match(text)
}

fn parse_table_rows(text: &str) -> Vec<ImportCandidate> {
    text.lines()
        .filter_map(|line| {
            let cells = cell_separator_regex()
                .split(line.trim())
                .map(str::trim)
                .filter(|cell| !cell.is_empty())
                .collect::<Vec<_>>();

            if cells.len() < MIN_TABLE_CELLS {
                return None;
            }

            parse_table_row(&cells)
        })
        .collect()
}

/// The first date-like cell and the first amount-like cell win. The other
/// cells before the amount form the description. Rows without a description
/// or with a zero amount are skipped.
fn parse_table_row(cells: &[&str]) -> Option<ImportCandidate> {
    let mut date_cell = None;
    let mut amount_cell = None;
    let mut description = Vec::new();

    for cell in cells {
        if date_cell.is_none() && looks_like_date(cell) {
            date_cell = Some(*cell);
        } else if amount_cell.is_none() && looks_like_amount(cell) {
            amount_cell = Some(*cell);
        } else if amount_cell.is_none() {
            description.push(*cell);
        }
    }

    let date = parse_statement_date(date_cell?)?;
    let amount = parse_amount(amount_cell?)?;

    if description.is_empty() || amount == 0.0 {
        return None;
    }

    let transaction_type = if amount > 0.0 {
        TransactionType::Expense
    } else {
        TransactionType::Income
    };

    Some(ImportCandidate {
        date,
        description: description.join(" "),
        amount: amount.abs(),
        category_name: None,
        transaction_type,
        account: String::new(),
        notes: String::new(),
    })
}

fn parse_lines(text: &str) -> Vec<ImportCandidate> {
    let mut current_date = None;
    let mut transactions = Vec::new();

    for line in text.lines().map(str::trim).filter(|line| !line.is_empty()) {
        let date_match = date_regex().find(line);

        if let Some(date) = date_match.and_then(|found| parse_statement_date(found.as_str())) {
            current_date = Some(date);
        }

        let Some(date) = current_date else {
            continue;
        };

        let without_date = match date_match {
            Some(found) => line.replacen(found.as_str(), "", 1),
            None => line.to_owned(),
        };

        let Some(amount) = amount_regex()
            .find(&without_date)
            .and_then(|found| parse_amount(found.as_str()))
        else {
            continue;
        };

        let description = amount_regex()
            .replace_all(&without_date, "")
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ");

        if description.is_empty() || amount == 0.0 {
            continue;
        }

        let lowercase_description = description.to_lowercase();
        let transaction_type = if amount < 0.0
            || INCOME_KEYWORDS
                .iter()
                .any(|keyword| lowercase_description.contains(keyword))
        {
            TransactionType::Income
        } else {
            TransactionType::Expense
        };

        transactions.push(ImportCandidate {
            date,
            description,
            amount: amount.abs(),
            category_name: None,
            transaction_type,
            account: String::new(),
            notes: String::new(),
        });
    }

    transactions
}
