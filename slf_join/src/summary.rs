use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset};

use crate::fields::{parse_decimal, parse_integer, Aggregation, Summary, SummaryField};
use crate::{format_decimal, round_to, JoinError};

#[derive(Clone, Debug, PartialEq)]
pub struct MergedSummary {
    pub summary: Summary,
    pub first_start: DateTime<FixedOffset>,
    pub second_start: DateTime<FixedOffset>,
}

/// Read the required `startDate` of the `input`-th record (1-based, for diagnostics).
pub fn parse_start_date(
    summary: &Summary,
    input: usize,
    date_format: &str,
) -> Result<DateTime<FixedOffset>, JoinError> {
    let raw = summary
        .get(SummaryField::StartDate)
        .ok_or(JoinError::MissingStartDate { input })?;
    DateTime::parse_from_str(raw, date_format).map_err(|_| JoinError::InvalidStartDate {
        input,
        value: raw.to_string(),
        format: date_format.to_string(),
    })
}

/// Combine two summaries field by field.
///
/// A field present on one side only is passed through as written; a field absent on
/// both sides stays absent.
pub fn merge_summaries(
    first: &Summary,
    second: &Summary,
    date_format: &str,
) -> Result<MergedSummary, JoinError> {
    let first_start = parse_start_date(first, 1, date_format)?;
    let second_start = parse_start_date(second, 2, date_format)?;

    let mut summary = Summary::default();
    for field in SummaryField::ALL {
        let value = match (first.get(field), second.get(field)) {
            (Some(a), Some(b)) => combine(field, a, b, date_format)?,
            (Some(only), None) | (None, Some(only)) => only.to_string(),
            (None, None) => continue,
        };
        summary.set(field, value);
    }

    Ok(MergedSummary {
        summary,
        first_start,
        second_start,
    })
}

fn combine(field: SummaryField, a: &str, b: &str, date_format: &str) -> Result<String, JoinError> {
    let decimals = || -> Result<(f64, f64), JoinError> {
        Ok((parse_decimal(field, a)?, parse_decimal(field, b)?))
    };
    let integers = || -> Result<(i64, i64), JoinError> {
        Ok((parse_integer(field, a)?, parse_integer(field, b)?))
    };

    let value = match field.aggregation() {
        Aggregation::MeanInt => {
            let (x, y) = decimals()?;
            (((x + y) / 2.0).round_ties_even() as i64).to_string()
        }
        Aggregation::MeanDecimal => {
            let (x, y) = decimals()?;
            format_decimal(round_to((x + y) / 2.0, 3))
        }
        Aggregation::MaxInt => {
            let (x, y) = integers()?;
            x.max(y).to_string()
        }
        Aggregation::MaxDecimal => {
            let (x, y) = decimals()?;
            format_decimal(round_to(x.max(y), 3))
        }
        Aggregation::MinInt => {
            let (x, y) = integers()?;
            x.min(y).to_string()
        }
        Aggregation::SumInt => {
            let (x, y) = integers()?;
            x.checked_add(y)
                .ok_or_else(|| JoinError::InvalidField {
                    field: field.name(),
                    value: format!("{a} + {b}"),
                })?
                .to_string()
        }
        Aggregation::SumDecimal => {
            let (x, y) = decimals()?;
            format_decimal(x + y)
        }
        Aggregation::Earliest => {
            let parse = |raw: &str| {
                DateTime::parse_from_str(raw, date_format).map_err(|_| JoinError::InvalidField {
                    field: field.name(),
                    value: raw.to_string(),
                })
            };
            let earliest = parse(a)?.min(parse(b)?);
            let mut out = String::new();
            write!(out, "{}", earliest.format(date_format)).map_err(|_| {
                JoinError::InvalidField {
                    field: field.name(),
                    value: earliest.to_rfc3339(),
                }
            })?;
            out
        }
    };
    Ok(value)
}
