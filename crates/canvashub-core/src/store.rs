//! Board document: camera plus the ordered collection of envelopes.

use crate::camera::Camera;
use crate::envelope::{DEFAULT_ENVELOPE_NAME, Envelope, EnvelopeId, Tag, TagId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};
#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};

/// Name of the envelope in a fresh board.
pub const WELCOME_NAME: &str = "Start Here";
/// Description of the envelope in a fresh board.
pub const WELCOME_DESCRIPTION: &str = "Welcome to your new Canvas Hub.";

/// Errors raised by board mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("Envelope not found: {0}")]
    EnvelopeNotFound(EnvelopeId),
    #[error("Tag {tag} not found in envelope {envelope}")]
    TagNotFound { envelope: EnvelopeId, tag: TagId },
    #[error("Envelope {envelope} has no team member at index {index}")]
    MemberOutOfRange { envelope: EnvelopeId, index: usize },
    #[error("Envelope {0} is closed and cannot receive tags")]
    TargetClosed(EnvelopeId),
    #[error("Tag {0} is already in the target envelope")]
    SameEnvelope(TagId),
}

/// Result type for board mutations.
pub type BoardResult<T> = Result<T, BoardError>;

/// The persisted board state.
///
/// Mutations that change rendered content outside the reconciler's fingerprint
/// record the envelope id in a dirty set; drain it with [`Board::take_dirty`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "StoredBoard")]
pub struct Board {
    /// View transform.
    #[serde(rename = "cam")]
    pub camera: Camera,
    /// Envelopes in creation order.
    #[serde(default)]
    pub envelopes: Vec<Envelope>,
    /// Envelopes whose content must be regenerated on the next render.
    #[serde(skip)]
    dirty: HashSet<EnvelopeId>,
    /// Last tag id handed out in this session.
    #[serde(skip)]
    last_tag_id: TagId,
}

/// Board as found in stored or loaded data.
#[derive(Deserialize)]
struct StoredBoard {
    #[serde(rename = "cam", default)]
    camera: Camera,
    #[serde(default)]
    envelopes: Vec<Envelope>,
}

impl From<StoredBoard> for Board {
    fn from(stored: StoredBoard) -> Self {
        let mut board = Board::new(stored.camera);
        board.envelopes = stored.envelopes;
        board.assign_unique_ids();
        board
    }
}

impl PartialEq for Board {
    fn eq(&self, other: &Self) -> bool {
        self.camera == other.camera && self.envelopes == other.envelopes
    }
}

impl Board {
    /// Create an empty board with the given camera.
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    /// Create the default single-envelope board.
    pub fn with_welcome(viewport_width: f64) -> Self {
        let mut board = Self::new(Camera::home(viewport_width));
        let mut env = Envelope::new(Envelope::generate_id(), WELCOME_NAME, Point::new(100.0, 100.0));
        env.description = WELCOME_DESCRIPTION.to_string();
        board.envelopes.push(env);
        board
    }

    /// Serialize the board to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize the board to indented JSON.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a board from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Number of envelopes.
    pub fn len(&self) -> usize {
        self.envelopes.len()
    }

    /// Check if the board has no envelopes.
    pub fn is_empty(&self) -> bool {
        self.envelopes.is_empty()
    }

    /// Check whether an envelope id is in use.
    pub fn contains(&self, id: &str) -> bool {
        self.envelope(id).is_some()
    }

    /// Get an envelope by ID.
    pub fn envelope(&self, id: &str) -> Option<&Envelope> {
        self.envelopes.iter().find(|e| e.id == id)
    }

    /// Get a mutable reference to an envelope by ID.
    pub fn envelope_mut(&mut self, id: &str) -> Option<&mut Envelope> {
        self.envelopes.iter_mut().find(|e| e.id == id)
    }

    fn require_mut(&mut self, id: &str) -> BoardResult<&mut Envelope> {
        self.envelope_mut(id)
            .ok_or_else(|| BoardError::EnvelopeNotFound(id.to_string()))
    }

    /// Total number of tags across all envelopes.
    pub fn tag_count(&self) -> usize {
        self.envelopes.iter().map(|e| e.tags.len()).sum()
    }

    /// Find which envelope owns a tag.
    pub fn tag_owner(&self, tag: TagId) -> Option<&Envelope> {
        self.envelopes.iter().find(|e| e.tag(tag).is_some())
    }

    /// Give a fresh id to every envelope whose id is empty or already used
    /// by an earlier envelope. Returns the number of envelopes renamed.
    pub fn assign_unique_ids(&mut self) -> usize {
        let mut seen = HashSet::new();
        let mut renamed = 0;
        for env in &mut self.envelopes {
            if env.id.is_empty() || !seen.insert(env.id.clone()) {
                let fresh = Envelope::generate_id();
                log::warn!("Envelope id {:?} is not unique, using {}", env.id, fresh);
                env.id = fresh.clone();
                seen.insert(fresh);
                renamed += 1;
            }
        }
        renamed
    }

    // --- Dirty tracking ---

    /// Force the envelope's content to be regenerated on the next render.
    pub fn mark_dirty(&mut self, id: &str) {
        self.dirty.insert(id.to_string());
    }

    /// Check whether an envelope is marked for forced regeneration.
    pub fn is_dirty(&self, id: &str) -> bool {
        self.dirty.contains(id)
    }

    /// Drain the set of envelopes marked for forced regeneration.
    pub fn take_dirty(&mut self) -> HashSet<EnvelopeId> {
        std::mem::take(&mut self.dirty)
    }

    // --- Creation / deletion ---

    /// Insert a new open envelope at a world position.
    pub fn create_envelope(&mut self, position: Point) -> &Envelope {
        let env = Envelope::new(Envelope::generate_id(), DEFAULT_ENVELOPE_NAME, position);
        log::debug!("Created envelope {} at ({}, {})", env.id, position.x, position.y);
        self.envelopes.push(env);
        &self.envelopes[self.envelopes.len() - 1]
    }

    /// Append fully-formed envelopes, keeping their order.
    pub fn append(&mut self, envelopes: Vec<Envelope>) {
        self.envelopes.extend(envelopes);
    }

    /// Remove an envelope. Unknown ids are a no-op.
    ///
    /// Irreversible; callers obtain confirmation first.
    pub fn delete_envelope(&mut self, id: &str) -> Option<Envelope> {
        let idx = self.envelopes.iter().position(|e| e.id == id)?;
        self.dirty.remove(id);
        let removed = self.envelopes.remove(idx);
        log::debug!("Deleted envelope {}", removed.id);
        Some(removed)
    }

    // --- Field setters ---

    /// Rename an envelope.
    pub fn set_name(&mut self, id: &str, name: impl Into<String>) -> BoardResult<()> {
        self.require_mut(id)?.name = name.into();
        Ok(())
    }

    /// Change the envelope color.
    pub fn set_color(&mut self, id: &str, color: impl Into<String>) -> BoardResult<()> {
        self.require_mut(id)?.color = color.into();
        self.mark_dirty(id);
        Ok(())
    }

    /// Update the free-form description.
    pub fn set_description(&mut self, id: &str, description: impl Into<String>) -> BoardResult<()> {
        self.require_mut(id)?.description = description.into();
        Ok(())
    }

    /// Expand or collapse an envelope.
    pub fn set_open(&mut self, id: &str, open: bool) -> BoardResult<()> {
        self.require_mut(id)?.is_open = open;
        self.mark_dirty(id);
        Ok(())
    }

    /// Flip the open state, returning the new value.
    pub fn toggle_open(&mut self, id: &str) -> BoardResult<bool> {
        let env = self.require_mut(id)?;
        env.is_open = !env.is_open;
        let open = env.is_open;
        self.mark_dirty(id);
        Ok(open)
    }

    /// Set or clear (empty string) the icon URL.
    pub fn set_icon(&mut self, id: &str, icon: impl Into<String>) -> BoardResult<()> {
        self.require_mut(id)?.icon = icon.into();
        self.mark_dirty(id);
        Ok(())
    }

    /// Set or clear (empty string) the reference material URL.
    pub fn set_reference_url(&mut self, id: &str, url: impl Into<String>) -> BoardResult<()> {
        self.require_mut(id)?.reference_url = url.into();
        self.mark_dirty(id);
        Ok(())
    }

    /// Move an envelope to a world position.
    pub fn set_position(&mut self, id: &str, position: Point) -> BoardResult<()> {
        self.require_mut(id)?.set_position(position);
        Ok(())
    }

    /// Set the batch-open selection of a team member.
    pub fn set_member_checked(&mut self, id: &str, index: usize, checked: bool) -> BoardResult<()> {
        let env = self.require_mut(id)?;
        let member = env
            .team
            .get_mut(index)
            .ok_or_else(|| BoardError::MemberOutOfRange {
                envelope: id.to_string(),
                index,
            })?;
        member.checked = checked;
        Ok(())
    }

    // --- Tags ---

    /// Allocate a tag id unique among everything handed out or loaded so far.
    pub fn next_tag_id(&mut self) -> TagId {
        let existing = self
            .envelopes
            .iter()
            .flat_map(|e| e.tags.iter().map(|t| t.id))
            .max()
            .unwrap_or(0);
        let now_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as TagId)
            .unwrap_or(0);
        let id = now_ms
            .max(existing.saturating_add(1))
            .max(self.last_tag_id.saturating_add(1));
        self.last_tag_id = id;
        id
    }

    /// Append a new tag to an envelope.
    pub fn add_tag(&mut self, id: &str, text: impl Into<String>, img: impl Into<String>) -> BoardResult<TagId> {
        if !self.contains(id) {
            return Err(BoardError::EnvelopeNotFound(id.to_string()));
        }
        let tag_id = self.next_tag_id();
        self.require_mut(id)?.tags.push(Tag::new(tag_id, text, img));
        self.mark_dirty(id);
        Ok(tag_id)
    }

    /// Remove a tag from its envelope.
    pub fn delete_tag(&mut self, id: &str, tag: TagId) -> BoardResult<Tag> {
        let removed = self
            .require_mut(id)?
            .take_tag(tag)
            .ok_or_else(|| BoardError::TagNotFound {
                envelope: id.to_string(),
                tag,
            })?;
        self.mark_dirty(id);
        Ok(removed)
    }

    /// Update a tag's text in place.
    pub fn set_tag_text(&mut self, id: &str, tag: TagId, text: impl Into<String>) -> BoardResult<()> {
        let env = self.require_mut(id)?;
        let t = env
            .tags
            .iter_mut()
            .find(|t| t.id == tag)
            .ok_or_else(|| BoardError::TagNotFound {
                envelope: id.to_string(),
                tag,
            })?;
        t.text = text.into();
        Ok(())
    }

    /// Check whether `target` can receive a tag dragged out of `source`.
    pub fn accepts_tag_from(&self, target: &str, source: &str) -> bool {
        target != source && self.envelope(target).is_some_and(|e| e.is_open)
    }

    /// Move a tag from one envelope to the end of another open envelope.
    ///
    /// The tag keeps its id and content. Both envelopes are marked dirty.
    pub fn transfer_tag(&mut self, tag: TagId, from: &str, to: &str) -> BoardResult<()> {
        if from == to {
            return Err(BoardError::SameEnvelope(tag));
        }
        let target = self
            .envelope(to)
            .ok_or_else(|| BoardError::EnvelopeNotFound(to.to_string()))?;
        if !target.is_open {
            return Err(BoardError::TargetClosed(to.to_string()));
        }

        let moved = self
            .require_mut(from)?
            .take_tag(tag)
            .ok_or_else(|| BoardError::TagNotFound {
                envelope: from.to_string(),
                tag,
            })?;
        self.require_mut(to)?.tags.push(moved);

        self.mark_dirty(from);
        self.mark_dirty(to);
        log::debug!("Moved tag {} from {} to {}", tag, from, to);
        Ok(())
    }

    // --- Camera ---

    /// Reset the camera to its home position.
    pub fn reset_camera(&mut self, viewport_width: f64) {
        self.camera.reset(viewport_width);
    }
}
