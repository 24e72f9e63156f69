//! Parses transactions from CSV files with a header row.
//!
//! The header must name `date`, `description` and `amount` columns. The
//! `category`, `type`, `account` and `notes` columns are optional. Column
//! names are matched case-insensitively and may appear in any order.

use csv::{ReaderBuilder, StringRecord, Trim};

use crate::{
    import::{
        candidate::{ImportCandidate, ImportResult, RejectedRow, parse_amount},
        dates::parse_date,
    },
    transaction::TransactionType,
};

const REQUIRED_COLUMNS: [&str; 3] = ["date", "description", "amount"];

/// Where each known column is in a record.
struct ColumnIndices {
    date: usize,
    description: usize,
    amount: usize,
    category: Option<usize>,
    transaction_type: Option<usize>,
    account: Option<usize>,
    notes: Option<usize>,
}

impl ColumnIndices {
    /// Returns the names of the missing required columns on failure.
    fn from_headers(headers: &StringRecord) -> Result<Self, Vec<&'static str>> {
        let names = headers
            .iter()
            .map(|name| name.trim().to_lowercase())
            .collect::<Vec<_>>();
        let find = |column: &str| names.iter().position(|name| name == column);

        let missing = REQUIRED_COLUMNS
            .into_iter()
            .filter(|column| find(column).is_none())
            .collect::<Vec<_>>();

        match (find("date"), find("description"), find("amount")) {
            (Some(date), Some(description), Some(amount)) => Ok(Self {
                date,
                description,
                amount,
                category: find("category"),
                transaction_type: find("type"),
                account: find("account"),
                notes: find("notes"),
            }),
            _ => Err(missing),
        }
    }
}

/// Decode `bytes` and parse them with [parse_csv].
///
/// Files that are not valid UTF-8 are read as Latin-1, which maps every byte
/// to the character with the same code point, and a diagnostic notes this.
pub fn parse_csv_bytes(bytes: &[u8]) -> ImportResult {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse_csv(text),
        Err(error) => {
            tracing::debug!("CSV is not valid UTF-8, decoding as Latin-1: {error}");
            let text = bytes.iter().copied().map(char::from).collect::<String>();

            let mut result = parse_csv(&text);
            result
                .diagnostics
                .push("The file is not UTF-8 and was read as Latin-1".to_owned());
            result
        }
    }
}

/// Parse `text` as CSV with a header row.
///
/// Rows that cannot be read are returned in [ImportResult::rejected] with
/// their line number, the remaining rows are still parsed. A missing required
/// column rejects the whole file with a diagnostic.
pub fn parse_csv(text: &str) -> ImportResult {
    let mut reader = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());

    let headers = match reader.headers() {
        Ok(headers) => headers.clone(),
        Err(error) => {
            tracing::debug!("could not read CSV header: {error}");
            return ImportResult::failed(format!("Could not read the CSV header: {error}"));
        }
    };

    let columns = match ColumnIndices::from_headers(&headers) {
        Ok(columns) => columns,
        Err(missing) => {
            return ImportResult::failed(format!(
                "Missing required columns: {}",
                missing.join(", ")
            ));
        }
    };

    let mut result = ImportResult::default();

    for record in reader.records() {
        match record {
            Ok(record) => {
                let line = record.position().map_or(0, |position| position.line());

                match parse_record(&record, &columns) {
                    Ok(candidate) => result.transactions.push(candidate),
                    Err(reason) => result.rejected.push(RejectedRow { line, reason }),
                }
            }
            Err(error) => {
                let line = error.position().map_or(0, |position| position.line());
                result.rejected.push(RejectedRow {
                    line,
                    reason: error.to_string(),
                });
            }
        }
    }

    if result.transactions.is_empty() && result.rejected.is_empty() {
        result.diagnostics.push("The CSV file has no rows".to_owned());
    }

    result
}

fn parse_record(record: &StringRecord, columns: &ColumnIndices) -> Result<ImportCandidate, String> {
    let field = |index: usize| record.get(index).unwrap_or_default();
    let optional_field = |index: Option<usize>| index.map(field).unwrap_or_default();

    let date_text = field(columns.date);
    let description = field(columns.description);
    let amount_text = field(columns.amount);

    if date_text.is_empty() {
        return Err("missing date".to_owned());
    }

    if description.is_empty() {
        return Err("missing description".to_owned());
    }

    if amount_text.is_empty() {
        return Err("missing amount".to_owned());
    }

    let date = parse_date(date_text).ok_or_else(|| format!("could not parse date \"{date_text}\""))?;
    let amount =
        parse_amount(amount_text).ok_or_else(|| format!("could not parse amount \"{amount_text}\""))?;

    let type_text = optional_field(columns.transaction_type).to_lowercase();
    let transaction_type = if type_text.is_empty() {
        if amount < 0.0 {
            TransactionType::Income
        } else {
            TransactionType::Expense
        }
    } else if type_text.contains("income") || type_text.contains("credit") {
        TransactionType::Income
    } else {
        TransactionType::Expense
    };

    let category_name = Some(optional_field(columns.category))
        .filter(|name| !name.is_empty())
        .map(str::to_owned);

    Ok(ImportCandidate {
        date,
        description: description.to_owned(),
        amount: amount.abs(),
        category_name,
        transaction_type,
        account: optional_field(columns.account).to_owned(),
        notes: optional_field(columns.notes).to_owned(),
    })
}
