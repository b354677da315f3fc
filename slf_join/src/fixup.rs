use crate::fields::{Summary, SummaryField};
use crate::record::{overflow, Marker, MarkerKind};
use crate::{format_decimal, round_to, JoinError};

/// Average speed over all interval markers: total distance per second of total
/// time (`time` is in hundredths), rounded to three decimals; `0.0` without time.
pub fn recompute_average_speed(markers: &[Marker]) -> Result<f64, JoinError> {
    let mut total_distance = 0.0;
    let mut total_time: i64 = 0;
    for marker in markers
        .iter()
        .filter(|marker| *marker.kind() == MarkerKind::Interval)
    {
        total_distance += marker.distance()?;
        total_time = total_time
            .checked_add(marker.time()?)
            .ok_or_else(|| overflow(marker.element(), "time"))?;
    }
    if total_time > 0 {
        Ok(round_to(total_distance / (total_time as f64 / 100.0), 3))
    } else {
        Ok(0.0)
    }
}

/// Write the recomputed average speed into the summary and the session marker.
pub fn apply_average_speed(summary: &mut Summary, markers: &mut [Marker]) -> Result<f64, JoinError> {
    let speed = recompute_average_speed(markers)?;
    let text = format_decimal(speed);
    summary.set(SummaryField::AverageSpeed, text.clone());
    if let Some(session) = markers
        .iter_mut()
        .find(|marker| *marker.kind() == MarkerKind::Session)
    {
        session.set_attribute("averageSpeed", text);
    }
    Ok(speed)
}
