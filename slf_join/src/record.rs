use std::str::FromStr;

use uuid::Uuid;
use xmltree::{Element, XMLNode};

use crate::fields::Summary;
use crate::{format_decimal, round_to, JoinError};

pub(crate) const GENERAL_INFORMATION: &str = "GeneralInformation";
pub(crate) const ENTRIES: &str = "Entries";
pub(crate) const MARKERS: &str = "Markers";

const TRAINING_TIME_ABSOLUTE: &str = "trainingTimeAbsolute";
const DISTANCE_ABSOLUTE: &str = "distanceAbsolute";
const TIME_ABSOLUTE: &str = "timeAbsolute";
const DISTANCE: &str = "distance";
const TIME: &str = "time";
const NUMBER: &str = "number";
const TYPE: &str = "type";

/// One parsed SLF document.
///
/// `shell` is the document root with the `Entries` and `Markers` sections taken
/// out; the summary, entries and markers are kept as typed snapshots and put back
/// together when the record is serialized.
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityRecord {
    pub(crate) shell: Element,
    pub(crate) entries_section: Element,
    pub(crate) markers_section: Element,
    pub(crate) summary: Summary,
    pub(crate) entries: Vec<Entry>,
    pub(crate) markers: Vec<Marker>,
}

impl ActivityRecord {
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// The whole-session (`"l"`) marker, if the record has one.
    pub fn session_marker(&self) -> Option<&Marker> {
        self.markers
            .iter()
            .find(|marker| *marker.kind() == MarkerKind::Session)
    }

    pub fn name(&self) -> Option<String> {
        self.general_text("name")
    }

    pub fn guid(&self) -> Option<String> {
        self.general_text("GUID")
    }

    fn general_text(&self, child: &str) -> Option<String> {
        let text = self
            .shell
            .get_child(GENERAL_INFORMATION)?
            .get_child(child)?
            .get_text()?;
        Some(text.into_owned())
    }

    /// Build a new record on top of this record's document shell.
    pub(crate) fn derive(
        &self,
        summary: Summary,
        entries: Vec<Entry>,
        markers: Vec<Marker>,
        guid: Uuid,
        name: &str,
    ) -> ActivityRecord {
        let mut shell = self.shell.clone();
        if let Some(general) = shell.get_mut_child(GENERAL_INFORMATION) {
            set_child_content(general, "GUID", Some(XMLNode::Text(guid.to_string())));
            set_child_content(general, "name", Some(XMLNode::CData(name.to_string())));
        }
        ActivityRecord {
            shell,
            entries_section: self.entries_section.clone(),
            markers_section: self.markers_section.clone(),
            summary,
            entries,
            markers,
        }
    }
}

/// Replace the content of `parent/name`, appending the child when it is missing.
/// Clearing a missing child is a no-op.
pub(crate) fn set_child_content(parent: &mut Element, name: &str, content: Option<XMLNode>) {
    if let Some(child) = parent.get_mut_child(name) {
        child.children = content.into_iter().collect();
    } else if let Some(node) = content {
        let mut child = Element::new(name);
        child.children.push(node);
        parent.children.push(XMLNode::Element(child));
    }
}

/// A counter that no longer fits once shifted.
pub(crate) fn overflow(element: &Element, attribute: &'static str) -> JoinError {
    JoinError::InvalidAttribute {
        element: element.name.clone(),
        attribute,
        value: element
            .attributes
            .get(attribute)
            .cloned()
            .unwrap_or_default(),
    }
}

fn parse_attribute<T: FromStr>(element: &Element, attribute: &'static str) -> Result<T, JoinError> {
    let raw = element
        .attributes
        .get(attribute)
        .map(String::as_str)
        .unwrap_or("0");
    raw.trim().parse().map_err(|_| JoinError::InvalidAttribute {
        element: element.name.clone(),
        attribute,
        value: raw.to_string(),
    })
}

/// One time-series sample. Attributes other than the two cumulative counters pass
/// through untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    element: Element,
}

impl Entry {
    pub fn new(element: Element) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.element.attributes.get(name).map(String::as_str)
    }

    /// Hundredths of a second since the recording started.
    pub fn training_time_absolute(&self) -> Result<i64, JoinError> {
        parse_attribute(&self.element, TRAINING_TIME_ABSOLUTE)
    }

    pub fn distance_absolute(&self) -> Result<f64, JoinError> {
        parse_attribute(&self.element, DISTANCE_ABSOLUTE)
    }

    /// Copy moved forward by the progress of a preceding session.
    pub(crate) fn shifted(&self, time_offset: i64, distance_offset: f64) -> Result<Entry, JoinError> {
        let time = self
            .training_time_absolute()?
            .checked_add(time_offset)
            .ok_or_else(|| overflow(&self.element, TRAINING_TIME_ABSOLUTE))?;
        let distance = round_to(self.distance_absolute()? + distance_offset, 1);
        let mut element = self.element.clone();
        element
            .attributes
            .insert(DISTANCE_ABSOLUTE.to_string(), format_decimal(distance));
        element
            .attributes
            .insert(TRAINING_TIME_ABSOLUTE.to_string(), time.to_string());
        Ok(Entry { element })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MarkerKind {
    /// `"l"`: the synthetic whole-session lap.
    Session,
    /// `"al"`: interval laps feeding the average speed.
    Interval,
    Other(String),
}

impl MarkerKind {
    pub fn from_type(raw: &str) -> Self {
        match raw {
            "l" => MarkerKind::Session,
            "al" => MarkerKind::Interval,
            other => MarkerKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            MarkerKind::Session => "l",
            MarkerKind::Interval => "al",
            MarkerKind::Other(raw) => raw,
        }
    }
}

/// One lap or annotation element.
#[derive(Clone, Debug, PartialEq)]
pub struct Marker {
    kind: MarkerKind,
    element: Element,
}

impl Marker {
    pub fn new(element: Element) -> Self {
        let kind = MarkerKind::from_type(
            element
                .attributes
                .get(TYPE)
                .map(String::as_str)
                .unwrap_or_default(),
        );
        Self { kind, element }
    }

    pub fn kind(&self) -> &MarkerKind {
        &self.kind
    }

    pub fn element(&self) -> &Element {
        &self.element
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.element.attributes.get(name).map(String::as_str)
    }

    pub(crate) fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.element
            .attributes
            .insert(name.to_string(), value.into());
    }

    pub fn number(&self) -> Result<i64, JoinError> {
        parse_attribute(&self.element, NUMBER)
    }

    pub fn distance_absolute(&self) -> Result<f64, JoinError> {
        parse_attribute(&self.element, DISTANCE_ABSOLUTE)
    }

    pub fn time_absolute(&self) -> Result<f64, JoinError> {
        parse_attribute(&self.element, TIME_ABSOLUTE)
    }

    /// Distance covered within this lap.
    pub fn distance(&self) -> Result<f64, JoinError> {
        parse_attribute(&self.element, DISTANCE)
    }

    /// Duration of this lap in hundredths of a second.
    pub fn time(&self) -> Result<i64, JoinError> {
        parse_attribute(&self.element, TIME)
    }

    /// Copy placed after a preceding session: renumbered past `number_offset` and
    /// moved forward by that session's totals.
    pub(crate) fn shifted(
        &self,
        number_offset: i64,
        distance_offset: f64,
        time_offset: f64,
    ) -> Result<Marker, JoinError> {
        let distance = self.distance_absolute()? + distance_offset;
        let time = self.time_absolute()? + time_offset;
        let number = self
            .number()?
            .checked_add(number_offset)
            .ok_or_else(|| overflow(&self.element, NUMBER))?;
        let mut marker = self.clone();
        marker.set_attribute(DISTANCE_ABSOLUTE, format_decimal(distance));
        marker.set_attribute(TIME_ABSOLUTE, format_decimal(time));
        marker.set_attribute(NUMBER, number.to_string());
        Ok(marker)
    }
}
