// SLF documents on disk: parsing into an ActivityRecord and writing one back out.

use std::io::Write;

use xmltree::{EmitterConfig, Element, XMLNode};

use crate::fields::{extract_summary, SummaryField};
use crate::record::{
    set_child_content, ActivityRecord, Entry, Marker, ENTRIES, GENERAL_INFORMATION, MARKERS,
};
use crate::JoinError;

impl ActivityRecord {
    /// Parse an SLF document. `GeneralInformation`, `Entries` and `Markers` must all be present.
    pub fn parse(input: &[u8]) -> Result<Self, JoinError> {
        let mut shell = Element::parse(input).map_err(|e| JoinError::Xml(e.to_string()))?;
        let summary = extract_summary(
            shell
                .get_child(GENERAL_INFORMATION)
                .ok_or(JoinError::MissingElement(GENERAL_INFORMATION))?,
        );
        let mut entries_section = shell
            .take_child(ENTRIES)
            .ok_or(JoinError::MissingElement(ENTRIES))?;
        let mut markers_section = shell
            .take_child(MARKERS)
            .ok_or(JoinError::MissingElement(MARKERS))?;

        let entries = take_elements(&mut entries_section, "Entry")
            .into_iter()
            .map(Entry::new)
            .collect();
        let markers = take_elements(&mut markers_section, "Marker")
            .into_iter()
            .map(Marker::new)
            .collect();

        Ok(Self {
            shell,
            entries_section,
            markers_section,
            summary,
            entries,
            markers,
        })
    }

    /// Reassemble the full document tree.
    pub fn to_element(&self) -> Element {
        let mut root = self.shell.clone();
        if let Some(general) = root.get_mut_child(GENERAL_INFORMATION) {
            for field in SummaryField::ALL {
                let content = self
                    .summary
                    .get(field)
                    .map(|value| XMLNode::Text(value.to_string()));
                set_child_content(general, field.name(), content);
            }
        }

        let mut entries = self.entries_section.clone();
        entries.children.extend(
            self.entries
                .iter()
                .map(|entry| XMLNode::Element(entry.element().clone())),
        );
        let mut markers = self.markers_section.clone();
        markers.children.extend(
            self.markers
                .iter()
                .map(|marker| XMLNode::Element(marker.element().clone())),
        );

        root.children.push(XMLNode::Element(entries));
        root.children.push(XMLNode::Element(markers));
        root
    }

    /// Pretty-printed document with an XML declaration.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), JoinError> {
        let config = EmitterConfig::new()
            .perform_indent(true)
            .write_document_declaration(true);
        self.to_element()
            .write_with_config(writer, config)
            .map_err(|e| JoinError::Write(e.to_string()))
    }

    pub fn to_xml(&self) -> Result<Vec<u8>, JoinError> {
        let mut out = Vec::new();
        self.write_to(&mut out)?;
        Ok(out)
    }
}

/// Detach the `name` children of a section. Any other content stays in the section
/// and is written back ahead of the detached elements.
fn take_elements(section: &mut Element, name: &str) -> Vec<Element> {
    let mut taken = Vec::new();
    let mut kept = Vec::new();
    for node in std::mem::take(&mut section.children) {
        match node {
            XMLNode::Element(element) if element.name == name => taken.push(element),
            other => kept.push(other),
        }
    }
    section.children = kept;
    taken
}
