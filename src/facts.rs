//! Delimited fact files.
//!
//! One tuple per line, fields separated by a single delimiter character
//! (tab by default). Numbers are parsed by the relation's column kinds;
//! symbols are taken verbatim, so they cannot contain the delimiter. Blank
//! lines are skipped and a trailing `\r` is dropped.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use bridge_api::{BridgeError, Relation, Value, ValueKind};
use thiserror::Error;
use tracing::{debug, instrument};

pub const DEFAULT_DELIMITER: char = '\t';

#[derive(Debug, Error)]
pub enum FactsError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}:{line}: column {column}: {reason}", path.display())]
    Field {
        path: PathBuf,
        line: usize,
        column: usize,
        reason: String,
    },

    #[error("{}:{line}: expected {expected} fields, found {found}", path.display())]
    Arity {
        path: PathBuf,
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("cannot write facts: {0}")]
    Write(#[from] io::Error),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Why a single line was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LineError {
    #[error("expected {expected} fields, found {found}")]
    Arity { expected: usize, found: usize },

    #[error("column {column}: `{field}` is not a valid {kind}")]
    Field {
        column: usize,
        field: String,
        kind: ValueKind,
    },
}

/// Parse one non-blank line against a column schema.
pub fn parse_line(line: &str, delimiter: char, kinds: &[ValueKind]) -> Result<Vec<Value>, LineError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let fields: Vec<&str> = line.split(delimiter).collect();
    if fields.len() != kinds.len() {
        return Err(LineError::Arity {
            expected: kinds.len(),
            found: fields.len(),
        });
    }
    fields
        .into_iter()
        .zip(kinds)
        .enumerate()
        .map(|(column, (field, &kind))| {
            kind.parse(field).ok_or_else(|| LineError::Field {
                column,
                field: field.to_string(),
                kind,
            })
        })
        .collect()
}

/// Load every line of `path` into `relation`.
///
/// Returns the number of tuples that were new. Stops at the first bad line;
/// tuples before it stay inserted.
#[instrument(level = "debug", skip(relation), fields(relation = relation.name()))]
pub fn load_relation(relation: Relation<'_>, path: &Path, delimiter: char) -> Result<usize, FactsError> {
    let io_error = |source| FactsError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = BufReader::new(File::open(path).map_err(io_error)?);
    let kinds: Vec<ValueKind> = relation.declaration().kinds().collect();

    let mut added = 0;
    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }
        let values =
            parse_line(&line, delimiter, &kinds).map_err(|err| located(path, idx + 1, err))?;

        let mut tuple = relation.create_tuple();
        for value in values {
            tuple.append(value);
        }
        if relation.insert(tuple)? {
            added += 1;
        }
    }
    debug!(added, "facts loaded");
    Ok(added)
}

fn located(path: &Path, line: usize, err: LineError) -> FactsError {
    match err {
        LineError::Arity { expected, found } => FactsError::Arity {
            path: path.to_path_buf(),
            line,
            expected,
            found,
        },
        LineError::Field { column, .. } => FactsError::Field {
            path: path.to_path_buf(),
            line,
            column,
            reason: err.to_string(),
        },
    }
}

/// Write every tuple of `relation`, one line each, in iteration order.
///
/// Returns the number of lines written.
pub fn write_relation<W: Write>(relation: Relation<'_>, writer: &mut W, delimiter: char) -> Result<usize, FactsError> {
    let mut iter = relation.iter();
    let mut written = 0;
    while let Some(tuple) = iter.next_tuple() {
        for (column, value) in tuple.values().iter().enumerate() {
            if column > 0 {
                write!(writer, "{delimiter}")?;
            }
            write!(writer, "{value}")?;
        }
        writeln!(writer)?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}
