//! Join two SLF activity recordings of one workout into a single record.
//!
//! The pipeline runs strictly downstream: summary fields are extracted from both
//! inputs, merged field by field, the entry and marker timelines are concatenated
//! in chronological order, and finally the average speed is recomputed from the
//! concatenated interval markers.

mod document;
pub mod fields;
pub mod fixup;
pub mod record;
pub mod summary;
pub mod timeline;

use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

pub use fields::{extract_summary, Aggregation, Summary, SummaryField};
pub use fixup::{apply_average_speed, recompute_average_speed};
pub use record::{ActivityRecord, Entry, Marker, MarkerKind};
pub use summary::{merge_summaries, parse_start_date, MergedSummary};
pub use timeline::{merge_timelines, Timeline};

/// Timestamp pattern used by SLF `startDate` fields, e.g. `Sun Jun 01 08:00:00 GMT+0200 2025`.
pub const DEFAULT_DATE_FORMAT: &str = "%a %b %d %H:%M:%S GMT%z %Y";

#[derive(Error, Debug)]
pub enum JoinError {
    #[error("failed to parse SLF document: {0}")]
    Xml(String),
    #[error("required element <{0}> is missing")]
    MissingElement(&'static str),
    #[error("input {input}: startDate is missing")]
    MissingStartDate { input: usize },
    #[error("input {input}: startDate '{value}' does not match '{format}'")]
    InvalidStartDate {
        input: usize,
        value: String,
        format: String,
    },
    #[error("invalid value '{value}' for summary field {field}")]
    InvalidField { field: &'static str, value: String },
    #[error("invalid {attribute}='{value}' on <{element}>")]
    InvalidAttribute {
        element: String,
        attribute: &'static str,
        value: String,
    },
    #[error("failed to write SLF document: {0}")]
    Write(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a readable document or holds values that do not parse.
    Parse,
    /// A required section of the document is absent.
    Schema,
    Write,
}

impl JoinError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JoinError::Xml(_)
            | JoinError::MissingStartDate { .. }
            | JoinError::InvalidStartDate { .. }
            | JoinError::InvalidField { .. }
            | JoinError::InvalidAttribute { .. } => ErrorKind::Parse,
            JoinError::MissingElement(_) => ErrorKind::Schema,
            JoinError::Write(_) => ErrorKind::Write,
        }
    }
}

#[derive(Clone, Debug)]
pub struct JoinParams {
    pub date_format: String,
    /// Identifier written to the output `GUID`; a fresh v4 UUID when unset.
    pub guid: Option<Uuid>,
}

impl Default for JoinParams {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            guid: None,
        }
    }
}

/// Merge two recordings into one record covering both sessions back to back.
///
/// The inputs may be given in either order; the one with the earlier `startDate`
/// provides the document shell and the unshifted part of the timeline.
pub fn join_records(
    first: &ActivityRecord,
    second: &ActivityRecord,
    params: &JoinParams,
) -> Result<ActivityRecord, JoinError> {
    let merged = merge_summaries(first.summary(), second.summary(), &params.date_format)?;
    let (earlier, later) = if merged.first_start < merged.second_start {
        (first, second)
    } else {
        (second, first)
    };
    debug!(
        first_start = %merged.first_start,
        second_start = %merged.second_start,
        first_is_earlier = merged.first_start < merged.second_start,
        "ordered recordings"
    );

    let Timeline {
        entries,
        mut markers,
    } = merge_timelines(earlier, later, &merged.summary)?;
    let mut summary = merged.summary;
    let speed = apply_average_speed(&mut summary, &mut markers)?;
    debug!(average_speed = speed, "recomputed average speed");

    let guid = params.guid.unwrap_or_else(Uuid::new_v4);
    let name = format!(
        "{} + {} joined",
        earlier.name().unwrap_or_default(),
        later.name().unwrap_or_default()
    );
    Ok(earlier.derive(summary, entries, markers, guid, &name))
}

/// Round the exact decimal expansion of `value` to `decimals` places, ties to even.
pub(crate) fn round_to(value: f64, decimals: usize) -> f64 {
    format!("{:.*}", decimals, value).parse().unwrap_or(value)
}

/// Shortest round-trip rendering that always keeps a fractional digit (`800.0`, `0.278`).
pub(crate) fn format_decimal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e16 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
