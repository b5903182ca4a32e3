//! CSV parsing for sheet exports.
//!
//! Rules:
//!
//! - The first record is the header. Header names are trimmed; duplicates are kept.
//! - Quoting must follow RFC 4180. Any quoting error fails the whole body.
//! - Trailing records whose fields are all empty are dropped (exports pad the sheet this way).
//!   Blank records between data rows are kept as rows of [`Cell::Missing`].
//! - Short rows are padded with [`Cell::Missing`]; long rows are truncated and reported as
//!   [`LoadWarning::ExtraFields`].
//! - Each value is typed with [`convert_cell`].

use crate::error::{IngestionError, IngestionResult};
use crate::types::{Cell, LoadWarning, TabularDataset};

const CURRENCY_SYMBOLS: [char; 5] = ['$', '₩', '€', '£', '¥'];

/// Parse a raw response body. `source` names the body in errors (usually the endpoint).
pub fn ingest_csv_from_bytes(source: &str, body: &[u8]) -> IngestionResult<TabularDataset> {
    let text = std::str::from_utf8(body).map_err(|e| {
        let line = 1 + body[..e.valid_up_to()].iter().filter(|&&b| b == b'\n').count() as u64;
        IngestionError::malformed(source, format!("body is not valid UTF-8: {e}"), Some(line))
    })?;
    ingest_csv_from_str(source, text)
}

/// Parse CSV text into a [`TabularDataset`].
///
/// ```
/// use sheet_ingest::ingestion::csv::ingest_csv_from_str;
/// use sheet_ingest::types::Cell;
///
/// let ds = ingest_csv_from_str("inline", "A,B\n1,x\n2,y\n").unwrap();
/// assert_eq!(ds.cell(0, "A"), Some(&Cell::Int(1)));
/// assert_eq!(ds.cell(1, "B"), Some(&Cell::Text("y".into())));
/// ```
pub fn ingest_csv_from_str(source: &str, text: &str) -> IngestionResult<TabularDataset> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    validate_quoting(text).map_err(|(line, message)| IngestionError::malformed(source, message, Some(line)))?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = rdr.records();

    let columns: Vec<String> = match records.next() {
        Some(header) => header
            .map_err(|e| csv_error(source, e))?
            .iter()
            .map(|h| h.trim().to_owned())
            .collect(),
        None => {
            return Err(IngestionError::EmptyResponse {
                input: source.to_owned(),
                columns: Vec::new(),
            });
        }
    };

    let width = columns.len();
    let mut rows: Vec<Vec<Cell>> = Vec::new();
    let mut warnings = Vec::new();
    let mut pending_blank = 0usize;
    for result in records {
        let record = result.map_err(|e| csv_error(source, e))?;
        if record.iter().all(|f| f.trim().is_empty()) {
            pending_blank += 1;
            continue;
        }
        rows.resize(rows.len() + pending_blank, vec![Cell::Missing; width]);
        pending_blank = 0;

        if record.len() > width {
            let warning = LoadWarning::ExtraFields {
                row: rows.len(),
                expected: width,
                found: record.len(),
            };
            tracing::warn!(source, ?warning, "row longer than header; extra fields dropped");
            warnings.push(warning);
        }

        let mut row: Vec<Cell> = record.iter().take(width).map(convert_cell).collect();
        row.resize(width, Cell::Missing);
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(IngestionError::EmptyResponse {
            input: source.to_owned(),
            columns,
        });
    }

    let mut ds = TabularDataset::new(columns, rows);
    ds.warnings = warnings;
    Ok(ds)
}

/// Type one raw CSV field.
///
/// Empty or whitespace-only → [`Cell::Missing`]; a number per [`parse_number`] → numeric;
/// anything else → [`Cell::Text`] (trimmed).
pub fn convert_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Cell::Missing;
    }
    parse_number(trimmed).unwrap_or_else(|| Cell::Text(trimmed.to_owned()))
}

/// Parse a formatted number: optional sign, one optional currency symbol (leading or
/// trailing), optional thousands separators in groups of three, optional decimal part.
///
/// Integers with a leading zero (`007`, account numbers) are not numbers. Neither are
/// exponents, `inf`/`NaN`, percentages, or a bare `.5`. Integers beyond `i64` and decimals
/// beyond `f64` stay text so long identifiers survive verbatim.
pub fn parse_number(s: &str) -> Option<Cell> {
    let s = s.trim();
    let (sign, rest) = strip_sign(s);
    let rest = strip_currency(rest).trim();
    let (negative, rest) = match sign {
        Some(neg) => (neg, rest),
        None => {
            let (after, r) = strip_sign(rest);
            (after == Some(true), r)
        }
    };

    let (int_part, frac_part) = match rest.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (rest, None),
    };

    let digits = integer_digits(int_part)?;
    if digits.len() > 1 && digits.starts_with('0') {
        return None;
    }
    let sign = if negative { "-" } else { "" };

    match frac_part {
        None => {
            format!("{sign}{digits}").parse::<i64>().ok().map(Cell::Int)
        }
        Some(frac) => {
            if frac.is_empty() || !frac.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            format!("{sign}{digits}.{frac}")
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .map(Cell::Float)
        }
    }
}

/// `Some(true)` for `-`, `Some(false)` for `+`, `None` when unsigned.
fn strip_sign(s: &str) -> (Option<bool>, &str) {
    if let Some(r) = s.strip_prefix('-') {
        (Some(true), r)
    } else if let Some(r) = s.strip_prefix('+') {
        (Some(false), r)
    } else {
        (None, s)
    }
}

fn strip_currency(s: &str) -> &str {
    s.strip_prefix(CURRENCY_SYMBOLS)
        .or_else(|| s.strip_suffix(CURRENCY_SYMBOLS))
        .unwrap_or(s)
}

/// Digits of an integer part with its thousands separators removed, if well-formed.
fn integer_digits(int_part: &str) -> Option<String> {
    let mut groups = int_part.split(',');
    let first = groups.next()?;
    let all_digits = |g: &str| !g.is_empty() && g.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(first) {
        return None;
    }

    let mut digits = first.to_owned();
    let mut grouped = false;
    for g in groups {
        if g.len() != 3 || !all_digits(g) {
            return None;
        }
        grouped = true;
        digits.push_str(g);
    }
    if grouped && first.len() > 3 {
        return None;
    }
    Some(digits)
}

/// Strict RFC 4180 quoting check. Returns the 1-based line and a description of the first error.
fn validate_quoting(text: &str) -> Result<(), (u64, String)> {
    #[derive(Clone, Copy)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted { opened_on: u64 },
        QuoteInQuoted { opened_on: u64 },
    }

    let mut line: u64 = 1;
    let mut state = State::FieldStart;
    for b in text.bytes() {
        state = match (state, b) {
            (State::FieldStart, b'"') => State::Quoted { opened_on: line },
            (State::FieldStart | State::Unquoted, b',' | b'\r') => State::FieldStart,
            (State::FieldStart | State::Unquoted, b'\n') => {
                line += 1;
                State::FieldStart
            }
            (State::FieldStart | State::Unquoted, _) if b != b'"' => State::Unquoted,
            (State::FieldStart | State::Unquoted, _) => {
                return Err((line, "quote inside an unquoted field".to_string()));
            }
            (State::Quoted { opened_on }, b'"') => State::QuoteInQuoted { opened_on },
            (State::Quoted { opened_on }, b) => {
                if b == b'\n' {
                    line += 1;
                }
                State::Quoted { opened_on }
            }
            (State::QuoteInQuoted { opened_on }, b'"') => State::Quoted { opened_on },
            (State::QuoteInQuoted { .. }, b',' | b'\r') => State::FieldStart,
            (State::QuoteInQuoted { .. }, b'\n') => {
                line += 1;
                State::FieldStart
            }
            (State::QuoteInQuoted { .. }, _) => {
                return Err((line, "unexpected character after closing quote".to_string()));
            }
        };
    }

    match state {
        State::Quoted { opened_on } => Err((opened_on, "unterminated quoted field".to_string())),
        _ => Ok(()),
    }
}

fn csv_error(source: &str, err: csv::Error) -> IngestionError {
    let line = err.position().map(|p| p.line());
    IngestionError::malformed(source, err.to_string(), line)
}
