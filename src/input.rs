//! CSV input: one `type,payload` record per line.
//!
//! The type picks the lane (`file` or `console`, any case). Lines with an
//! empty type are skipped. Records with an unknown type are kept as
//! [`Record::Unknown`] so a producer can still count them against its pacing
//! quota; they are never submitted. Only the second field is used as the
//! payload; anything after a second comma is ignored.

use std::path::Path;

use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::model::{LaneKind, QueueItem};

/// One non-empty input record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Item(QueueItem),
    Unknown { line: usize, kind: String },
}

impl Record {
    pub fn into_item(self) -> Option<QueueItem> {
        match self {
            Record::Item(item) => Some(item),
            Record::Unknown { .. } => None,
        }
    }
}

/// Parse one CSV line. `line_no` is 1-based and only used for errors.
///
/// Returns `Ok(None)` for blank lines and lines with an empty type.
pub fn parse_record(line_no: usize, line: &str) -> Result<Option<Record>> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let mut fields = line.split(',');
    let kind = fields.next().unwrap_or_default().trim();
    let Some(payload) = fields.next() else {
        return Err(Error::Input {
            line: line_no,
            reason: "expected `type,payload`".to_string(),
        });
    };

    if kind.is_empty() {
        return Ok(None);
    }

    match kind.parse::<LaneKind>() {
        Ok(lane) => Ok(Some(Record::Item(QueueItem::for_lane(lane, payload)))),
        Err(_) => {
            warn!(line = line_no, kind, "record with unknown type will be skipped");
            Ok(Some(Record::Unknown {
                line: line_no,
                kind: kind.to_string(),
            }))
        }
    }
}

/// Parse one CSV line, keeping only routable items.
pub fn parse_line(line_no: usize, line: &str) -> Result<Option<QueueItem>> {
    Ok(parse_record(line_no, line)?.and_then(Record::into_item))
}

/// Parse every line of `content` into records.
pub fn parse_records(content: &str) -> Result<Vec<Record>> {
    let mut records = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        if let Some(record) = parse_record(idx + 1, line)? {
            records.push(record);
        }
    }
    Ok(records)
}

/// Parse every line of `content`, keeping only routable items.
pub fn parse_items(content: &str) -> Result<Vec<QueueItem>> {
    Ok(parse_records(content)?
        .into_iter()
        .filter_map(Record::into_item)
        .collect())
}

/// Read and parse a CSV file into records.
pub fn read_records(path: &Path) -> Result<Vec<Record>> {
    if !path.exists() {
        return Err(Error::Config(format!(
            "input file {} does not exist",
            path.display()
        )));
    }

    info!(path = %path.display(), "reading input records");
    let content = std::fs::read_to_string(path)?;
    let records = parse_records(&content)?;
    info!(records = records.len(), "input records loaded");
    Ok(records)
}

/// Read and parse a CSV file, keeping only routable items.
pub fn read_items(path: &Path) -> Result<Vec<QueueItem>> {
    Ok(read_records(path)?
        .into_iter()
        .filter_map(Record::into_item)
        .collect())
}
