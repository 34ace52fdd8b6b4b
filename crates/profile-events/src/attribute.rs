//! Released-attribute snapshots recorded alongside login events.

use serde::{Deserialize, Serialize};

/// A snapshot of one attribute released to a relying party.
///
/// Field names are camelCase on the wire for compatibility with existing
/// stored records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeSnapshot {
    /// Internal attribute identifier.
    pub id: String,

    /// Human-readable attribute name.
    pub name: String,

    /// Human-readable description.
    pub description: String,

    /// Released values. Absent when the values were not recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<String>>,
}

impl AttributeSnapshot {
    /// Creates a snapshot without recorded values.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            values: None,
        }
    }

    /// Sets the released values.
    #[must_use]
    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.values = Some(values);
        self
    }

    /// Returns the display form of this attribute.
    ///
    /// `name[v1,v2]` when values were recorded, otherwise the bare name.
    #[must_use]
    pub fn display_value(&self) -> String {
        match &self.values {
            Some(values) => format!("{}[{}]", self.name, values.join(",")),
            None => self.name.clone(),
        }
    }
}
