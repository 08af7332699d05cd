//! Codec settings.

use serde::{Deserialize, Serialize};

fn names(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Settings for every store codec.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub delimited: DelimitedSettings,
    pub markup: MarkupSettings,
}

/// Settings for the tab-delimited export format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelimitedSettings {
    /// Field whose content carries the card id sentinel.
    pub id_field: String,
    /// Field names of a deck created from scratch.
    pub default_field_names: Vec<String>,
}

impl Default for DelimitedSettings {
    fn default() -> Self {
        Self {
            id_field: "Notes".to_string(),
            default_field_names: names(&["Text 1", "Text 2", "Text 3", "Text 4", "Text 5", "Notes"]),
        }
    }
}

/// Settings for the HTML wiki format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkupSettings {
    pub card_tag: String,
    /// Element new cards are appended to.
    pub marker_tag: String,
    /// Fields written when a card is rendered, in this order.
    pub rendered_fields: Vec<String>,
    /// Never rendered, even when listed in `rendered_fields`.
    pub excluded_field: Option<String>,
}

impl Default for MarkupSettings {
    fn default() -> Self {
        Self {
            card_tag: "card".to_string(),
            marker_tag: "new-cards-here".to_string(),
            rendered_fields: names(&[
                "Text 1",
                "Text 2",
                "Text 3",
                "Text 4",
                "Text 5",
                "Picture 1",
                "Picture 2",
                "Sound 2",
                "Category 1",
                "Statistics 1",
                "Notes",
                "Extra",
            ]),
            excluded_field: Some("Statistics 1".to_string()),
        }
    }
}

impl MarkupSettings {
    /// Field names actually emitted on render.
    pub fn emitted_fields(&self) -> impl Iterator<Item = &str> {
        self.rendered_fields
            .iter()
            .map(String::as_str)
            .filter(move |name| self.excluded_field.as_deref() != Some(*name))
    }
}
