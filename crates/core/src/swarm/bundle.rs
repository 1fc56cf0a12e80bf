//! # Report Bundle
//!
//! Ordered, duplicate-free collection of specialist reports for one request,
//! and the final `AnalysisResult` handed to the transport layer.

use serde::ser::{Serialize, SerializeMap, Serializer};

use super::error::PanelConfigError;

/// Fixed key for the synthesized summary in the serialized result
pub const SUMMARY_FIELD: &str = "multidisciplinary_summary";

/// Serialized field name for a specialist's report
pub fn report_field(identity: &str) -> String {
    format!("{}_report", identity)
}

/// Identity → report, in configured evaluator order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportBundle {
    entries: Vec<(String, String)>,
}

impl ReportBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a report. Identities are unique within a bundle.
    pub fn insert(
        &mut self,
        identity: impl Into<String>,
        report: impl Into<String>,
    ) -> Result<(), PanelConfigError> {
        let identity = identity.into();
        if self.contains(&identity) {
            return Err(PanelConfigError::DuplicateSpecialist(identity));
        }
        self.entries.push((identity, report.into()));
        Ok(())
    }

    /// Build from pairs, rejecting duplicates
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, PanelConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut bundle = Self::new();
        for (identity, report) in pairs {
            bundle.insert(identity, report)?;
        }
        Ok(bundle)
    }

    pub fn get(&self, identity: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(id, _)| id == identity)
            .map(|(_, report)| report.as_str())
    }

    pub fn contains(&self, identity: &str) -> bool {
        self.entries.iter().any(|(id, _)| id == identity)
    }

    pub fn identities(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(id, _)| id.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(id, report)| (id.as_str(), report.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the bundle holds exactly `expected`, in that order
    pub fn matches_panel<'a>(&self, expected: impl IntoIterator<Item = &'a str>) -> bool {
        let expected: Vec<&str> = expected.into_iter().collect();
        expected.len() == self.len() && self.identities().zip(expected).all(|(a, b)| a == b)
    }

    /// Render every report under a heading, for a reviewer reading them all at once
    pub fn to_review_text(&self) -> String {
        self.entries
            .iter()
            .map(|(id, report)| format!("## {} report\n{}", title_case(id), report.trim()))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Final output of one analysis. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisResult {
    bundle: ReportBundle,
    summary: String,
}

impl AnalysisResult {
    pub(crate) fn new(bundle: ReportBundle, summary: String) -> Self {
        Self { bundle, summary }
    }

    pub fn bundle(&self) -> &ReportBundle {
        &self.bundle
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Report for a specialist identity
    pub fn report(&self, identity: &str) -> Option<&str> {
        self.bundle.get(identity)
    }
}

impl Serialize for AnalysisResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.bundle.len() + 1))?;
        for (id, report) in self.bundle.iter() {
            map.serialize_entry(&report_field(id), report)?;
        }
        map.serialize_entry(SUMMARY_FIELD, &self.summary)?;
        map.end()
    }
}

fn title_case(identity: &str) -> String {
    let mut chars = identity.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
