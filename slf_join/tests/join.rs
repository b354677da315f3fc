use pretty_assertions::assert_eq;
use uuid::Uuid;

use slf_join::{
    join_records, ActivityRecord, ErrorKind, JoinError, JoinParams, MarkerKind, SummaryField,
};

const PART1: &str = include_str!("fixtures/part1.slf");
const PART2: &str = include_str!("fixtures/part2.slf");
const NO_START_DATE: &str = include_str!("fixtures/no_start_date.slf");

fn parse(xml: &str) -> ActivityRecord {
    ActivityRecord::parse(xml.as_bytes()).expect("fixture parses")
}

fn params() -> JoinParams {
    JoinParams {
        guid: Some(Uuid::from_u128(0x5f1d_2a38_0000_4000_8000_0000_0000_00ff)),
        ..JoinParams::default()
    }
}

fn joined() -> ActivityRecord {
    join_records(&parse(PART1), &parse(PART2), &params()).expect("join succeeds")
}

#[test]
fn merged_summary_follows_field_rules() {
    let out = joined();
    let summary = out.summary();
    let expected = [
        (SummaryField::AltitudeDifferencesDownhill, "21000"),
        (SummaryField::AltitudeDifferencesUphill, "19000"),
        (SummaryField::AverageCadenceCalc, "82"),
        (SummaryField::AverageHeartrate, "145"),
        (SummaryField::AverageSpeed, "5.37"),
        (SummaryField::AverageTemperature, "18"),
        (SummaryField::Calories, "800"),
        (SummaryField::Distance, "29000.0"),
        (SummaryField::ExerciseTime, "558000"),
        (SummaryField::ManualTemperature, "20"),
        (SummaryField::MaximumAltitude, "450000"),
        (SummaryField::MaximumHeartrate, "175"),
        (SummaryField::MaximumIncline, "8"),
        (SummaryField::MaximumSpeed, "13.1"),
        (SummaryField::MaximumTemperature, "22"),
        (SummaryField::MinimumAltitude, "115000"),
        (SummaryField::MinimumHeartrate, "95"),
        (SummaryField::MinimumIncline, "-9"),
        (SummaryField::MinimumTemperature, "15"),
        (SummaryField::PauseTime, "18000"),
        (SummaryField::StartDate, "Sun Jun 01 08:00:00 GMT+0200 2025"),
        (SummaryField::TrainingTime, "540000"),
        (SummaryField::AveragePowerCalc, "210"),
    ];
    for (field, value) in expected {
        assert_eq!(summary.get(field), Some(value), "{}", field.name());
    }
    assert_eq!(summary.get(SummaryField::Score), None);
    assert_eq!(summary.get(SummaryField::TimeInIntensityZone1), None);
    assert_eq!(summary.len(), expected.len());
}

#[test]
fn entries_are_concatenated_with_offsets() {
    let first = parse(PART1);
    let second = parse(PART2);
    let out = joined();
    assert_eq!(
        out.entries().len(),
        first.entries().len() + second.entries().len()
    );
    assert_eq!(&out.entries()[..3], first.entries());

    let times: Vec<_> = out
        .entries()
        .iter()
        .map(|e| e.training_time_absolute().unwrap())
        .collect();
    assert_eq!(times, vec![0, 180000, 360000, 360000, 450000, 540000]);
    let distances: Vec<_> = out
        .entries()
        .iter()
        .map(|e| e.attribute("distanceAbsolute").unwrap().to_string())
        .collect();
    assert_eq!(
        distances,
        vec!["0.0", "10000.5", "20000.0", "20000.0", "24500.4", "29000.0"]
    );
    assert_eq!(out.entries()[4].attribute("heartrate"), Some("152"));
}

#[test]
fn markers_are_renumbered_after_earlier_ones() {
    let out = joined();
    let laps: Vec<_> = out
        .markers()
        .iter()
        .filter(|m| *m.kind() != MarkerKind::Session)
        .collect();
    let numbers: Vec<_> = laps.iter().map(|m| m.number().unwrap()).collect();
    assert_eq!(numbers, vec![1, 2, 4, 5]);
    assert_eq!(laps[2].attribute("distanceAbsolute"), Some("24500.4"));
    assert_eq!(laps[2].attribute("timeAbsolute"), Some("450000.0"));
    assert_eq!(laps[3].attribute("distanceAbsolute"), Some("29000.0"));
    assert_eq!(laps[3].attribute("timeAbsolute"), Some("540000.0"));
    assert_eq!(
        out.markers()
            .iter()
            .filter(|m| *m.kind() == MarkerKind::Session)
            .count(),
        1
    );
}

#[test]
fn session_marker_describes_whole_activity() {
    let out = joined();
    let session = out.session_marker().expect("session marker kept");
    assert_eq!(session.attribute("number"), Some("3"));
    assert_eq!(session.attribute("calories"), Some("800"));
    assert_eq!(session.attribute("distance"), Some("29000.0"));
    assert_eq!(session.attribute("timeAbsolute"), Some("540000"));
    assert_eq!(session.attribute("averageSpeed"), Some("5.37"));
    assert_eq!(session.attribute("averagePower"), Some("210"));
    assert_eq!(session.attribute("averageCadence"), Some("82"));
    assert_eq!(session.attribute("latitude"), Some("47.42"));
    assert_eq!(session.attribute("longitude"), Some("8.61"));
    assert_eq!(
        session.attribute("endTime"),
        Some("Sun Jun 01 10:05:00 GMT+0200 2025")
    );
}

#[test]
fn output_gets_new_identity() {
    let out = joined();
    assert_eq!(
        out.guid().as_deref(),
        Some("5f1d2a38-0000-4000-8000-0000000000ff")
    );
    assert_eq!(
        out.name().as_deref(),
        Some("Morning ride + Second part joined")
    );
}

#[test]
fn generated_guid_is_fresh() {
    let out = join_records(&parse(PART1), &parse(PART2), &JoinParams::default()).unwrap();
    let guid = out.guid().unwrap();
    assert!(Uuid::parse_str(&guid).is_ok());
    assert_ne!(guid, parse(PART1).guid().unwrap());
}

#[test]
fn input_order_does_not_matter() {
    let forward = joined();
    let backward = join_records(&parse(PART2), &parse(PART1), &params()).unwrap();
    assert_eq!(backward, forward);
    assert_eq!(backward.to_xml().unwrap(), forward.to_xml().unwrap());
}

#[test]
fn written_document_parses_back() {
    let out = joined();
    let xml = String::from_utf8(out.to_xml().unwrap()).unwrap();
    assert!(xml.starts_with("<?xml"));
    assert!(xml.contains("<![CDATA[Morning ride + Second part joined]]>"));
    assert!(xml.contains("<averageSpeed>5.37</averageSpeed>"));

    let reparsed = ActivityRecord::parse(xml.as_bytes()).unwrap();
    assert_eq!(reparsed.summary(), out.summary());
    assert_eq!(reparsed.entries().len(), 6);
    assert_eq!(reparsed.markers().len(), 5);
}

#[test]
fn missing_start_date_is_a_parse_error() {
    let err = join_records(&parse(PART1), &parse(NO_START_DATE), &params()).unwrap_err();
    assert!(matches!(err, JoinError::MissingStartDate { input: 2 }));
    assert_eq!(err.kind(), ErrorKind::Parse);
}

#[test]
fn equal_start_dates_put_second_input_first() {
    let first = parse(PART1);
    let second = parse(&PART2.replace(
        "<startDate>Sun Jun 01 09:05:00 GMT+0200 2025</startDate>",
        "<startDate>Sun Jun 01 08:00:00 GMT+0200 2025</startDate>",
    ));
    let out = join_records(&first, &second, &params()).unwrap();

    assert_eq!(
        out.name().as_deref(),
        Some("Second part + Morning ride joined")
    );
    assert_eq!(&out.entries()[..3], second.entries());
    assert_eq!(
        out.entries()[3].attribute("trainingTimeAbsolute"),
        Some("180000")
    );
}
