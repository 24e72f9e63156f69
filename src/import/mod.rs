//! Importing transactions from CSV files and PDF bank statements.

mod candidate;
mod csv;
mod dates;
mod page;
mod pdf;
mod preview;
mod upload;

pub use candidate::{ImportCandidate, ImportResult, RejectedRow};
pub use page::get_import_page;
pub use self::csv::{parse_csv, parse_csv_bytes};
pub use pdf::parse_pdf;
pub use preview::preview_import_endpoint;
pub use upload::{ImportSummary, import_candidates, import_transactions_endpoint};
