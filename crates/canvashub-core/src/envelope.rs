//! Envelope, tag and team member entities.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Unique identifier for an envelope.
pub type EnvelopeId = String;

/// Identifier for a tag, unique at creation time.
pub type TagId = u64;

/// System color palette. The first entry is the default envelope color.
pub const PALETTE: [&str; 8] = [
    "#6366f1", // indigo
    "#ef4444", // red
    "#f59e0b", // amber
    "#10b981", // emerald
    "#3b82f6", // blue
    "#8b5cf6", // violet
    "#ec4899", // pink
    "#64748b", // slate
];

/// Image used for freshly created tags.
pub const DEFAULT_TAG_IMAGE: &str = "https://placehold.co/60x60/333/FFF?text=TAG";

/// Name given to envelopes created from the toolbar.
pub const DEFAULT_ENVELOPE_NAME: &str = "New Envelope";

/// Default palette color.
pub fn default_color() -> String {
    PALETTE[0].to_string()
}

/// A link entry that can be selected for batch-opening.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamMember {
    /// Short code shown before the label.
    pub code: String,
    /// Display label.
    pub label: String,
    /// Link target.
    pub url: String,
    /// Selection state for batch-open.
    pub checked: bool,
}

impl TeamMember {
    /// Create an unchecked team member.
    pub fn new(code: impl Into<String>, label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
            url: url.into(),
            checked: false,
        }
    }
}

/// A small draggable annotation owned by exactly one envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub img: String,
}

impl Tag {
    /// Create a tag.
    pub fn new(id: TagId, text: impl Into<String>, img: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
            img: img.into(),
        }
    }
}

/// A positioned, collapsible container of team links and tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Unique identifier.
    pub id: EnvelopeId,
    /// Title shown in the header.
    #[serde(default)]
    pub name: String,
    /// Hex or palette color.
    #[serde(default = "default_color")]
    pub color: String,
    /// World X coordinate.
    pub x: f64,
    /// World Y coordinate.
    pub y: f64,
    /// Whether the envelope is expanded.
    #[serde(default)]
    pub is_open: bool,
    /// Team links, in display order.
    #[serde(default)]
    pub team: Vec<TeamMember>,
    /// Reference material link (empty when unset).
    #[serde(default)]
    pub reference_url: String,
    /// Icon image URL (empty when unset).
    #[serde(default)]
    pub icon: String,
    /// Free-form notes.
    #[serde(default)]
    pub description: String,
    /// Owned tags, in display order.
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Envelope {
    /// Create an open, empty envelope with the default color.
    pub fn new(id: impl Into<EnvelopeId>, name: impl Into<String>, position: Point) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: default_color(),
            x: position.x,
            y: position.y,
            is_open: true,
            team: Vec::new(),
            reference_url: String::new(),
            icon: String::new(),
            description: String::new(),
            tags: Vec::new(),
        }
    }

    /// Generate a fresh envelope id.
    pub fn generate_id() -> EnvelopeId {
        format!("env-{}", uuid::Uuid::new_v4())
    }

    /// World position of the top-left corner.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Set the world position.
    pub fn set_position(&mut self, position: Point) {
        self.x = position.x;
        self.y = position.y;
    }

    /// Reference URL, if set.
    pub fn reference_url(&self) -> Option<&str> {
        Some(self.reference_url.as_str()).filter(|s| !s.is_empty())
    }

    /// Icon URL, if set.
    pub fn icon(&self) -> Option<&str> {
        Some(self.icon.as_str()).filter(|s| !s.is_empty())
    }

    /// Get a tag by ID.
    pub fn tag(&self, id: TagId) -> Option<&Tag> {
        self.tags.iter().find(|t| t.id == id)
    }

    /// Remove a tag by ID, returning it.
    pub fn take_tag(&mut self, id: TagId) -> Option<Tag> {
        let idx = self.tags.iter().position(|t| t.id == id)?;
        Some(self.tags.remove(idx))
    }

    /// Team members currently selected for batch-open.
    pub fn checked_members(&self) -> impl Iterator<Item = &TeamMember> {
        self.team.iter().filter(|m| m.checked)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_envelope_defaults() {
        let env = Envelope::new("env-1", "Hello", Point::new(10.0, 20.0));
        assert!(env.is_open);
        assert_eq!(env.color, PALETTE[0]);
        assert!(env.team.is_empty());
        assert!(env.tags.is_empty());
        assert_eq!(env.position(), Point::new(10.0, 20.0));
        assert_eq!(env.reference_url(), None);
        assert_eq!(env.icon(), None);
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        assert_ne!(Envelope::generate_id(), Envelope::generate_id());
        assert!(Envelope::generate_id().starts_with("env-"));
    }

    #[test]
    fn test_schema_field_names() {
        let mut env = Envelope::new("env-1", "A", Point::new(1.0, 2.0));
        env.reference_url = "https://example.com".to_string();
        let json = serde_json::to_value(&env).unwrap();
        assert_eq!(json["isOpen"], serde_json::json!(true));
        assert_eq!(json["referenceUrl"], serde_json::json!("https://example.com"));
        assert!(json.get("is_open").is_none());
    }

    #[test]
    fn test_member_missing_fields_default() {
        let member: TeamMember = serde_json::from_str(r#"{"label":"Docs","url":"https://d"}"#).unwrap();
        assert_eq!(member.code, "");
        assert!(!member.checked);
    }

    #[test]
    fn test_take_tag() {
        let mut env = Envelope::new("env-1", "A", Point::ZERO);
        env.tags.push(Tag::new(1, "one", DEFAULT_TAG_IMAGE));
        env.tags.push(Tag::new(2, "two", DEFAULT_TAG_IMAGE));

        let tag = env.take_tag(1).unwrap();
        assert_eq!(tag.text, "one");
        assert_eq!(env.tags.len(), 1);
        assert!(env.take_tag(1).is_none());
    }
}
