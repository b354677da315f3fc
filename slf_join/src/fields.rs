use std::collections::BTreeMap;

use serde::Serialize;
use xmltree::Element;

use crate::JoinError;

/// How two values of the same summary field are combined.
#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq)]
pub enum Aggregation {
    MeanInt,
    MeanDecimal,
    MaxInt,
    MaxDecimal,
    MinInt,
    Earliest,
    SumInt,
    SumDecimal,
}

#[derive(Clone, Copy, Debug, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum SummaryField {
    AltitudeDifferencesDownhill,
    AltitudeDifferencesUphill,
    AverageHeartrate,
    AverageSpeed,
    AverageTemperature,
    Calories,
    Distance,
    ExerciseTime,
    ManualTemperature,
    MaximumAltitude,
    MaximumHeartrate,
    MaximumIncline,
    MaximumSpeed,
    MaximumTemperature,
    MinimumAltitude,
    MinimumHeartrate,
    MinimumIncline,
    MinimumTemperature,
    PauseTime,
    Score,
    TimeInIntensityZone1,
    TimeInIntensityZone2,
    TimeInIntensityZone3,
    TimeInIntensityZone4,
    TimeUnderIntensityZone,
    TrainingTime,
    ZoneTargetMaxHeartRate,
    AverageCadenceCalc,
    AveragePowerCalc,
    StartDate,
}

impl SummaryField {
    pub const ALL: [SummaryField; 30] = [
        SummaryField::AltitudeDifferencesDownhill,
        SummaryField::AltitudeDifferencesUphill,
        SummaryField::AverageHeartrate,
        SummaryField::AverageSpeed,
        SummaryField::AverageTemperature,
        SummaryField::Calories,
        SummaryField::Distance,
        SummaryField::ExerciseTime,
        SummaryField::ManualTemperature,
        SummaryField::MaximumAltitude,
        SummaryField::MaximumHeartrate,
        SummaryField::MaximumIncline,
        SummaryField::MaximumSpeed,
        SummaryField::MaximumTemperature,
        SummaryField::MinimumAltitude,
        SummaryField::MinimumHeartrate,
        SummaryField::MinimumIncline,
        SummaryField::MinimumTemperature,
        SummaryField::PauseTime,
        SummaryField::Score,
        SummaryField::TimeInIntensityZone1,
        SummaryField::TimeInIntensityZone2,
        SummaryField::TimeInIntensityZone3,
        SummaryField::TimeInIntensityZone4,
        SummaryField::TimeUnderIntensityZone,
        SummaryField::TrainingTime,
        SummaryField::ZoneTargetMaxHeartRate,
        SummaryField::AverageCadenceCalc,
        SummaryField::AveragePowerCalc,
        SummaryField::StartDate,
    ];

    /// Element name inside `GeneralInformation`.
    pub fn name(self) -> &'static str {
        match self {
            SummaryField::AltitudeDifferencesDownhill => "altitudeDifferencesDownhill",
            SummaryField::AltitudeDifferencesUphill => "altitudeDifferencesUphill",
            SummaryField::AverageHeartrate => "averageHeartrate",
            SummaryField::AverageSpeed => "averageSpeed",
            SummaryField::AverageTemperature => "averageTemperature",
            SummaryField::Calories => "calories",
            SummaryField::Distance => "distance",
            SummaryField::ExerciseTime => "exerciseTime",
            SummaryField::ManualTemperature => "manualTemperature",
            SummaryField::MaximumAltitude => "maximumAltitude",
            SummaryField::MaximumHeartrate => "maximumHeartrate",
            SummaryField::MaximumIncline => "maximumIncline",
            SummaryField::MaximumSpeed => "maximumSpeed",
            SummaryField::MaximumTemperature => "maximumTemperature",
            SummaryField::MinimumAltitude => "minimumAltitude",
            SummaryField::MinimumHeartrate => "minimumHeartrate",
            SummaryField::MinimumIncline => "minimumIncline",
            SummaryField::MinimumTemperature => "minimumTemperature",
            SummaryField::PauseTime => "pauseTime",
            SummaryField::Score => "score",
            SummaryField::TimeInIntensityZone1 => "timeInIntensityZone1",
            SummaryField::TimeInIntensityZone2 => "timeInIntensityZone2",
            SummaryField::TimeInIntensityZone3 => "timeInIntensityZone3",
            SummaryField::TimeInIntensityZone4 => "timeInIntensityZone4",
            SummaryField::TimeUnderIntensityZone => "timeUnderIntensityZone",
            SummaryField::TrainingTime => "trainingTime",
            SummaryField::ZoneTargetMaxHeartRate => "zoneTargetMaxHeartRate",
            SummaryField::AverageCadenceCalc => "averageCadenceCalc",
            SummaryField::AveragePowerCalc => "averagePowerCalc",
            SummaryField::StartDate => "startDate",
        }
    }

    pub fn aggregation(self) -> Aggregation {
        use SummaryField::*;
        match self {
            AverageHeartrate | AverageTemperature | AverageCadenceCalc | AveragePowerCalc
            | ManualTemperature | ZoneTargetMaxHeartRate => Aggregation::MeanInt,
            AverageSpeed => Aggregation::MeanDecimal,
            MaximumHeartrate | MaximumTemperature | MaximumAltitude | MaximumIncline => {
                Aggregation::MaxInt
            }
            MaximumSpeed => Aggregation::MaxDecimal,
            MinimumHeartrate | MinimumTemperature | MinimumAltitude | MinimumIncline => {
                Aggregation::MinInt
            }
            StartDate => Aggregation::Earliest,
            AltitudeDifferencesDownhill | AltitudeDifferencesUphill | Calories | ExerciseTime
            | PauseTime | Score | TimeInIntensityZone1 | TimeInIntensityZone2
            | TimeInIntensityZone3 | TimeInIntensityZone4 | TimeUnderIntensityZone
            | TrainingTime => Aggregation::SumInt,
            Distance => Aggregation::SumDecimal,
        }
    }
}

/// Textual summary values keyed by field; a missing key means the field is absent.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct Summary {
    values: BTreeMap<SummaryField, String>,
}

impl Summary {
    pub fn get(&self, field: SummaryField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn set(&mut self, field: SummaryField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Numeric reading of a present field.
    pub fn decimal(&self, field: SummaryField) -> Result<Option<f64>, JoinError> {
        self.get(field).map(|raw| parse_decimal(field, raw)).transpose()
    }
}

impl FromIterator<(SummaryField, String)> for Summary {
    fn from_iter<I: IntoIterator<Item = (SummaryField, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Collect the recognized fields of a `GeneralInformation` element.
pub fn extract_summary(general: &Element) -> Summary {
    SummaryField::ALL
        .into_iter()
        .filter_map(|field| {
            let text = general.get_child(field.name())?.get_text()?;
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| (field, trimmed.to_string()))
        })
        .collect()
}

pub(crate) fn parse_decimal(field: SummaryField, raw: &str) -> Result<f64, JoinError> {
    raw.trim().parse().map_err(|_| JoinError::InvalidField {
        field: field.name(),
        value: raw.to_string(),
    })
}

pub(crate) fn parse_integer(field: SummaryField, raw: &str) -> Result<i64, JoinError> {
    raw.trim().parse().map_err(|_| JoinError::InvalidField {
        field: field.name(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn general(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn test_extract_reads_known_fields_only() {
        let element = general(
            "<GeneralInformation>\
                <calories>500</calories>\
                <distance> 20000.0 </distance>\
                <sport><![CDATA[cycling]]></sport>\
                <averagePowerCalc></averagePowerCalc>\
             </GeneralInformation>",
        );
        let summary = extract_summary(&element);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary.get(SummaryField::Calories), Some("500"));
        assert_eq!(summary.get(SummaryField::Distance), Some("20000.0"));
        assert_eq!(summary.get(SummaryField::AveragePowerCalc), None);
    }

    #[test]
    fn test_extract_is_total_over_empty_section() {
        let summary = extract_summary(&general("<GeneralInformation/>"));
        assert!(summary.is_empty());
    }

    #[test]
    fn test_rule_table() {
        assert_eq!(SummaryField::AverageHeartrate.aggregation(), Aggregation::MeanInt);
        assert_eq!(SummaryField::AverageSpeed.aggregation(), Aggregation::MeanDecimal);
        assert_eq!(SummaryField::MaximumSpeed.aggregation(), Aggregation::MaxDecimal);
        assert_eq!(SummaryField::MinimumIncline.aggregation(), Aggregation::MinInt);
        assert_eq!(SummaryField::StartDate.aggregation(), Aggregation::Earliest);
        assert_eq!(SummaryField::TrainingTime.aggregation(), Aggregation::SumInt);
        assert_eq!(SummaryField::Distance.aggregation(), Aggregation::SumDecimal);
    }

    #[test]
    fn test_serializes_with_element_names() {
        let summary: Summary = [
            (SummaryField::TimeInIntensityZone1, "100".to_string()),
            (SummaryField::AverageCadenceCalc, "80".to_string()),
        ]
        .into_iter()
        .collect();
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"timeInIntensityZone1": "100", "averageCadenceCalc": "80"})
        );
    }
}
