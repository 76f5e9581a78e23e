//! Story records as delivered by the PlotTracker REST API.
//!
//! Field names follow the API's camelCase JSON. Unknown fields are ignored so
//! full event payloads (content, memory references, ...) decode cleanly.

use serde::{Deserialize, Serialize};

use crate::error::Result;

pub type EventId = i64;
pub type TagId = i64;
pub type TagTypeId = i64;

const DEFAULT_TAG_COLOR: &str = "#888888";

fn default_tag_color() -> String {
    DEFAULT_TAG_COLOR.to_string()
}

/// A tag reference attached to an event, with the tag's name and color
/// copied onto it at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagAssociation {
    pub tag_id: TagId,
    pub tag_type_id: TagTypeId,
    pub tag_name: String,
    #[serde(default)]
    pub tag_type_name: Option<String>,
    #[serde(default = "default_tag_color")]
    pub color: String,
}

/// A narrative beat belonging to a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "eventId")]
    pub id: EventId,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tags: Vec<TagAssociation>,
}

impl Event {
    /// The event's date string, treating blank strings as undated.
    pub fn date(&self) -> Option<&str> {
        self.date
            .as_deref()
            .map(str::trim)
            .filter(|date| !date.is_empty())
    }

    pub fn has_tag(&self, tag_id: TagId) -> bool {
        self.tags.iter().any(|tag| tag.tag_id == tag_id)
    }

    /// Associations belonging to the given tag type.
    pub fn tags_of_type(&self, tag_type_id: TagTypeId) -> impl Iterator<Item = &TagAssociation> {
        self.tags
            .iter()
            .filter(move |tag| tag.tag_type_id == tag_type_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagType {
    pub tag_type_id: TagTypeId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub tag_id: TagId,
    pub tag_type_id: TagTypeId,
    pub name: String,
    #[serde(default = "default_tag_color")]
    pub color: String,
}

/// A story document: its date format, tag catalog and ordered events.
///
/// Event order in `events` is story order, which sequential layout keeps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    #[serde(default)]
    pub story_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub date_format: Option<String>,
    #[serde(default)]
    pub tag_types: Vec<TagType>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Story {
    /// Decodes a story document, picking the format from a file extension:
    /// `yaml`/`yml`, `toml`, anything else is JSON.
    pub fn parse(content: &str, extension: Option<&str>) -> Result<Self> {
        let extension = extension.map(str::to_ascii_lowercase);
        match extension.as_deref() {
            Some("yaml" | "yml") => Ok(serde_yaml::from_str(content)?),
            Some("toml") => Ok(toml::from_str(content)?),
            _ => Ok(serde_json::from_str(content)?),
        }
    }

    /// Resolves a tag type by numeric id or by case-insensitive name.
    pub fn resolve_tag_type(&self, key: &str) -> Option<&TagType> {
        let key = key.trim();
        if let Ok(id) = key.parse::<TagTypeId>() {
            if let Some(found) = self.tag_types.iter().find(|tt| tt.tag_type_id == id) {
                return Some(found);
            }
        }
        let key = key.to_lowercase();
        self.tag_types
            .iter()
            .find(|tt| tt.name.to_lowercase() == key)
    }

    /// The story's configured date format, if it has a non-blank one.
    pub fn date_format(&self) -> Option<&str> {
        self.date_format
            .as_deref()
            .map(str::trim)
            .filter(|format| !format.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_rest_payload_and_ignores_unknown_fields() {
        let json = r##"{
            "title": "Saga",
            "dateFormat": "9999.12.31",
            "tagTypes": [{"tagTypeId": 2, "name": "Character"}],
            "events": [{
                "eventId": 7,
                "eventType": "plot",
                "title": "Arrival",
                "date": "1500.01.01",
                "memoryRefId": null,
                "tags": [{"tagId": 9, "tagTypeId": 2, "tagName": "Alice", "color": "#f00"}]
            }]
        }"##;

        let story: Story = serde_json::from_str(json).unwrap();
        assert_eq!(story.date_format(), Some("9999.12.31"));
        assert_eq!(story.events.len(), 1);
        let event = &story.events[0];
        assert_eq!(event.id, 7);
        assert_eq!(event.date(), Some("1500.01.01"));
        assert_eq!(event.tags[0].color, "#f00");
        assert!(event.has_tag(9));
    }

    #[test]
    fn blank_date_counts_as_undated() {
        let event: Event =
            serde_json::from_str(r#"{"eventId": 1, "title": "x", "date": "  "}"#).unwrap();
        assert_eq!(event.date(), None);
        assert!(event.tags.is_empty());
    }

    #[test]
    fn missing_color_falls_back_to_grey() {
        let tag: TagAssociation =
            serde_json::from_str(r#"{"tagId": 1, "tagTypeId": 1, "tagName": "Bob"}"#).unwrap();
        assert_eq!(tag.color, DEFAULT_TAG_COLOR);
    }

    #[test]
    fn parses_yaml_and_toml_documents() {
        let yaml = "dateFormat: '9999.12.31'\nevents:\n  - eventId: 1\n    title: Start\n";
        let story = Story::parse(yaml, Some("YML")).unwrap();
        assert_eq!(story.events[0].title, "Start");

        let toml = "dateFormat = \"9999\"\n[[events]]\neventId = 3\ndate = \"12\"\n";
        let story = Story::parse(toml, Some("toml")).unwrap();
        assert_eq!(story.events[0].date(), Some("12"));

        assert!(Story::parse("{not json", None).is_err());
    }

    #[test]
    fn resolves_tag_type_by_id_or_name() {
        let story = Story {
            tag_types: vec![
                TagType { tag_type_id: 1, name: "Location".to_string() },
                TagType { tag_type_id: 2, name: "Персонаж".to_string() },
            ],
            ..Story::default()
        };

        assert_eq!(story.resolve_tag_type("1").map(|tt| tt.tag_type_id), Some(1));
        assert_eq!(story.resolve_tag_type("location").map(|tt| tt.tag_type_id), Some(1));
        assert_eq!(story.resolve_tag_type("ПЕРСОНАЖ").map(|tt| tt.tag_type_id), Some(2));
        assert!(story.resolve_tag_type("Plot line").is_none());
    }
}
