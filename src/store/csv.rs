//! Minimal quote- and CRLF-tolerant CSV reading and writing. The store only
//! ever deals with two short text columns, which keeps this deliberately
//! small.

use std::io::{self, Write};
use std::mem::take;

/// Parses CSV text into rows of fields. Handles quoted fields, doubled-quote
/// escapes, and CRLF line endings; blank lines are dropped.
pub fn parse_rows(text: &str) -> Vec<Vec<String>> {
    let mut rows: Vec<Vec<String>> = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => row.push(take(&mut field)),
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                let blank = row.len() == 1 && row[0].is_empty();
                if !blank {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    // Flush a trailing row with no final newline, unterminated quote or not.
    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }

    rows
}

/// Writes one row, quoting fields that contain commas, quotes, or newlines.
pub fn write_row<W: Write>(mut w: W, row: &[&str]) -> io::Result<()> {
    for (idx, field) in row.iter().enumerate() {
        if idx > 0 {
            write!(w, ",")?;
        }
        if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r')
        {
            write!(w, "\"{}\"", field.replace('"', "\"\""))?;
        } else {
            write!(w, "{}", field)?;
        }
    }
    writeln!(w)
}
