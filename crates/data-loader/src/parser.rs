//! Parsers for the comma-separated catalog and ratings files.
//!
//! - catalog: `id,title,<release>,<runtime>,tag,tag,...`
//! - ratings: `userId,itemId,rating[,timestamp...]`
//!
//! Both files start with a header line, which is skipped. Blank lines are
//! ignored. The `read_*` functions work on any `BufRead` so tests can feed
//! in-memory data; the `parse_*` functions open a path.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Column where category tags start in a catalog row
const CATALOG_TAGS_START: usize = 4;

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })?;
    Ok(BufReader::new(file))
}

/// Yields `(line_no, line)` for every non-blank data line after the header
fn data_lines<R: BufRead>(reader: R) -> impl Iterator<Item = (usize, std::io::Result<String>)> {
    reader
        .lines()
        .enumerate()
        .skip(1)
        .map(|(idx, line)| (idx + 1, line))
        .filter(|(_, line)| !matches!(line, Ok(l) if l.trim().is_empty()))
}

fn parse_id(value: &str, field: &str, file: &str, line: usize) -> Result<u32> {
    value.trim().parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid {}: {}", field, e),
    })
}

/// Parse the catalog file at `path`
pub fn parse_catalog(path: &Path) -> Result<Catalog> {
    let reader = open(path)?;
    read_catalog(reader, &path.display().to_string())
}

/// Read a catalog from any buffered reader. `file` is only used in errors.
pub fn read_catalog<R: BufRead>(reader: R, file: &str) -> Result<Catalog> {
    let mut catalog = Catalog::new();

    for (line_no, line) in data_lines(reader) {
        let line = line?;
        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() < 2 {
            return Err(DataLoadError::FieldCountMismatch {
                file: file.to_string(),
                expected: 2,
                found: fields.len(),
                line: line_no,
            });
        }

        let id = parse_id(fields[0], "item id", file, line_no)?;
        let tags = fields
            .iter()
            .skip(CATALOG_TAGS_START)
            .map(|tag| tag.trim())
            .filter(|tag| !tag.is_empty())
            .map(str::to_string)
            .collect();

        catalog.insert(CatalogEntry {
            id,
            name: fields[1].trim().to_string(),
            tags,
        });
    }

    Ok(catalog)
}

/// Parse the ratings file at `path`
pub fn parse_ratings(path: &Path) -> Result<UserRatingTable> {
    let reader = open(path)?;
    read_ratings(reader, &path.display().to_string())
}

/// Read ratings from any buffered reader.
///
/// A later row for the same (user, item) pair overwrites an earlier one.
pub fn read_ratings<R: BufRead>(reader: R, file: &str) -> Result<UserRatingTable> {
    let mut table = UserRatingTable::new();

    for (line_no, line) in data_lines(reader) {
        let line = line?;
        let fields: Vec<&str> = line.trim().split(',').collect();
        if fields.len() < 3 {
            return Err(DataLoadError::FieldCountMismatch {
                file: file.to_string(),
                expected: 3,
                found: fields.len(),
                line: line_no,
            });
        }

        let user_id = parse_id(fields[0], "user id", file, line_no)?;
        let item_id = parse_id(fields[1], "item id", file, line_no)?;
        let rating = parse_rating(fields[2], file, line_no)?;

        table.insert_rating(user_id, item_id, rating);
    }

    Ok(table)
}

fn parse_rating(value: &str, file: &str, line: usize) -> Result<RatingValue> {
    let rating: RatingValue = value.trim().parse().map_err(|e| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Invalid rating: {}", e),
    })?;

    if !rating.is_finite() || rating <= 0.0 {
        return Err(DataLoadError::InvalidValue {
            field: "rating".to_string(),
            value: value.trim().to_string(),
        });
    }
    Ok(rating)
}
