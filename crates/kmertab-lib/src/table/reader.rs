//! Tuple file parsing
//!
//! Reads count tuples from tab-separated text with one
//! `entity<TAB>feature<TAB>count` record per line. Blank lines and lines
//! starting with `#` are skipped. The path `-` reads standard input.
//!
//! Only the record shape is checked here; identifier and count rules are
//! enforced by the builder.

use crate::constants::{COMMENT_PREFIX, TUPLE_FILE_SEPARATOR};
use crate::tuple::CountTuple;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// Parse a tuple file and call a function for each record
///
/// # Arguments
/// * `path` - Path to the input file, or `-` for standard input
/// * `callback` - Function called for each parsed tuple
///
/// # Errors
/// Returns error if:
/// - File cannot be opened or read
/// - A line does not have exactly three fields
/// - A count is not an integer
/// - The callback fails
pub fn parse_tuples<P, F>(path: P, callback: F) -> Result<()>
where
    P: AsRef<Path>,
    F: FnMut(CountTuple) -> Result<()>,
{
    let path = path.as_ref();
    let source = path.display().to_string();

    if path == Path::new("-") {
        let stdin = io::stdin();
        return parse_tuples_from(stdin.lock(), &source, callback);
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open tuple file: {}", path.display()))?;
    parse_tuples_from(BufReader::new(file), &source, callback)
}

/// Parse tuples from any buffered reader; `source` names it in errors
pub fn parse_tuples_from<R, F>(reader: R, source: &str, mut callback: F) -> Result<()>
where
    R: BufRead,
    F: FnMut(CountTuple) -> Result<()>,
{
    for (i, line) in reader.lines().enumerate() {
        let line_number = i + 1;
        let line = line.with_context(|| format!("Failed to read line {} of {}", line_number, source))?;
        let tuple = parse_tuple_line(&line)
            .with_context(|| format!("Invalid tuple at line {} of {}", line_number, source))?;
        if let Some(tuple) = tuple {
            callback(tuple)?;
        }
    }
    Ok(())
}

/// Parse one line; `Ok(None)` for blank and comment lines
pub fn parse_tuple_line(line: &str) -> Result<Option<CountTuple>> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() || line.starts_with(COMMENT_PREFIX) {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(TUPLE_FILE_SEPARATOR).collect();
    if fields.len() != 3 {
        return Err(anyhow::anyhow!(
            "expected 3 tab-separated fields (entity, feature, count), found {}",
            fields.len()
        ));
    }

    let count_field = fields[2].trim();
    let count: i64 = count_field
        .parse()
        .with_context(|| format!("count {:?} is not an integer", count_field))?;
    Ok(Some(CountTuple::new(fields[0], fields[1], count)))
}

/// Read every tuple from a buffered reader
pub fn read_tuples<R: BufRead>(reader: R, source: &str) -> Result<Vec<CountTuple>> {
    let mut tuples = Vec::new();
    parse_tuples_from(reader, source, |tuple| {
        tuples.push(tuple);
        Ok(())
    })?;
    Ok(tuples)
}

/// Read every tuple from a file (or `-` for standard input)
pub fn read_tuple_file<P: AsRef<Path>>(path: P) -> Result<Vec<CountTuple>> {
    let mut tuples = Vec::new();
    parse_tuples(path, |tuple| {
        tuples.push(tuple);
        Ok(())
    })?;
    Ok(tuples)
}
