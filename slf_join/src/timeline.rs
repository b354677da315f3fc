use tracing::{debug, warn};

use crate::fields::{Summary, SummaryField};
use crate::record::{ActivityRecord, Entry, Marker, MarkerKind};
use crate::JoinError;

/// Session-marker attributes rewritten from the merged summary.
const SESSION_TOTALS: &[(&str, SummaryField)] = &[
    ("altitudeDownhill", SummaryField::AltitudeDifferencesDownhill),
    ("altitudeUphill", SummaryField::AltitudeDifferencesUphill),
    ("averageCadence", SummaryField::AverageCadenceCalc),
    ("averageHeartrate", SummaryField::AverageHeartrate),
    ("averagePower", SummaryField::AveragePowerCalc),
    ("averageSpeed", SummaryField::AverageSpeed),
    ("calories", SummaryField::Calories),
    ("distance", SummaryField::Distance),
    ("distanceAbsolute", SummaryField::Distance),
    ("maximumAltitude", SummaryField::MaximumAltitude),
    ("maximumHeartrate", SummaryField::MaximumHeartrate),
    ("maximumSpeed", SummaryField::MaximumSpeed),
    ("minimumHeartrate", SummaryField::MinimumHeartrate),
    ("time", SummaryField::TrainingTime),
    ("timeAbsolute", SummaryField::TrainingTime),
];

/// Where the joined session ends, taken from the later recording's session marker.
const SESSION_END: &[&str] = &["latitude", "longitude", "endTime"];

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    pub entries: Vec<Entry>,
    pub markers: Vec<Marker>,
}

/// Concatenate the entries and markers of two recordings, `earlier` first.
///
/// Later entries are moved forward by the furthest time and distance reached in the
/// earlier entries. Later markers are moved forward by the earlier record's own
/// summary totals and renumbered after the earlier markers.
pub fn merge_timelines(
    earlier: &ActivityRecord,
    later: &ActivityRecord,
    merged: &Summary,
) -> Result<Timeline, JoinError> {
    Ok(Timeline {
        entries: merge_entries(earlier.entries(), later.entries())?,
        markers: merge_markers(earlier, later, merged)?,
    })
}

/// Furthest `(trainingTimeAbsolute, distanceAbsolute)` reached, `(0, 0.0)` when empty.
pub fn progress(entries: &[Entry]) -> Result<(i64, f64), JoinError> {
    let mut time: Option<i64> = None;
    let mut distance: Option<f64> = None;
    for entry in entries {
        let t = entry.training_time_absolute()?;
        let d = entry.distance_absolute()?;
        time = Some(time.map_or(t, |best| best.max(t)));
        distance = Some(distance.map_or(d, |best| best.max(d)));
    }
    Ok((time.unwrap_or(0), distance.unwrap_or(0.0)))
}

fn merge_entries(earlier: &[Entry], later: &[Entry]) -> Result<Vec<Entry>, JoinError> {
    let (time_offset, distance_offset) = progress(earlier)?;
    debug!(time_offset, distance_offset, "shifting later entries");

    let mut entries = Vec::with_capacity(earlier.len() + later.len());
    entries.extend_from_slice(earlier);
    for entry in later {
        entries.push(entry.shifted(time_offset, distance_offset)?);
    }
    Ok(entries)
}

fn merge_markers(
    earlier: &ActivityRecord,
    later: &ActivityRecord,
    merged: &Summary,
) -> Result<Vec<Marker>, JoinError> {
    let mut markers = earlier.markers().to_vec();

    let mut max_number: Option<i64> = None;
    for marker in &markers {
        let number = marker.number()?;
        max_number = Some(max_number.map_or(number, |best| best.max(number)));
    }
    let max_number = max_number.unwrap_or(0);

    if let Some(session) = markers
        .iter_mut()
        .find(|marker| *marker.kind() == MarkerKind::Session)
    {
        rewrite_session_marker(session, merged, later.session_marker());
    }

    let distance_offset = earlier_total(earlier.summary(), SummaryField::Distance)?;
    let time_offset = earlier_total(earlier.summary(), SummaryField::TrainingTime)?;
    debug!(
        max_number,
        distance_offset, time_offset, "shifting later markers"
    );

    for marker in later.markers() {
        if *marker.kind() == MarkerKind::Session {
            continue;
        }
        markers.push(marker.shifted(max_number, distance_offset, time_offset)?);
    }
    Ok(markers)
}

fn earlier_total(summary: &Summary, field: SummaryField) -> Result<f64, JoinError> {
    match summary.decimal(field)? {
        Some(value) => Ok(value),
        None => {
            warn!(
                "earlier recording has no {}; later markers are not shifted by it",
                field.name()
            );
            Ok(0.0)
        }
    }
}

/// Make the earlier session marker describe the whole joined activity.
fn rewrite_session_marker(session: &mut Marker, merged: &Summary, final_lap: Option<&Marker>) {
    for (attribute, field) in SESSION_TOTALS {
        if let Some(value) = merged.get(*field) {
            session.set_attribute(attribute, value);
        }
    }
    for attribute in SESSION_END {
        let value = final_lap
            .and_then(|lap| lap.attribute(attribute))
            .unwrap_or("0")
            .to_string();
        session.set_attribute(attribute, value);
    }
}
