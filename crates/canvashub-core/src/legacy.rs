//! Import of the older `groups` export format.
//!
//! The legacy file is a script assigning an array literal, e.g.
//! `window.GROUPS = [{ name: 'Design', items: [...] }];`. The assignment is
//! stripped and the literal parsed with [`crate::literal`]; nothing in the file
//! is ever evaluated.

use crate::envelope::{Envelope, EnvelopeId, PALETTE, Tag, TeamMember};
use crate::literal::{self, LiteralError};
use crate::store::Board;
use kurbo::Point;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use thiserror::Error;

/// World X of the first imported envelope.
pub const IMPORT_START_X: f64 = 100.0;
/// Horizontal spacing between imported envelopes.
pub const IMPORT_STEP_X: f64 = 300.0;
/// World Y of imported envelopes.
pub const IMPORT_Y: f64 = 100.0;
/// Text of the tag synthesized from a group's reference link.
pub const IMPORTED_TAG_TEXT: &str = "Reference material (imported)";
/// Image for that tag when the group has no icon.
pub const IMPORTED_TAG_IMAGE: &str = "https://placehold.co/60x60/4f46e5/FFF?text=REF";

/// Legacy import failures. The board is untouched whenever one is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("Legacy file is not a valid literal: {0}")]
    Syntax(#[from] LiteralError),
    #[error("Legacy file does not contain an array of groups")]
    NotAnArray,
    #[error("Group {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Summary of a successful import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// Ids of the appended envelopes, in order.
    pub created: Vec<EnvelopeId>,
}

impl ImportReport {
    /// Number of envelopes created.
    pub fn count(&self) -> usize {
        self.created.len()
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum LegacyId {
    Text(String),
    Number(serde_json::Number),
}

/// One record of the legacy array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyGroup {
    #[serde(default)]
    id: Option<LegacyId>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    color: Option<String>,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    icon_href: Option<String>,
    #[serde(default)]
    items: Option<Vec<TeamMember>>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Skip whitespace and `//` or `/* */` comments at the start of `text`.
fn skip_leading_comments(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        if let Some(rest) = text.strip_prefix("//") {
            text = rest.find('\n').map_or("", |end| &rest[end + 1..]);
        } else if let Some(rest) = text.strip_prefix("/*") {
            match rest.find("*/") {
                Some(end) => text = &rest[end + 2..],
                // Unterminated; leave it for the literal parser to report.
                None => return text,
            }
        } else {
            return text;
        }
    }
}

/// Remove an optional `target =` assignment and trailing `;` around the literal.
///
/// Comments before the assignment are skipped.
pub fn strip_assignment(text: &str) -> &str {
    let mut body = skip_leading_comments(text).trim_end();
    if let Some(start) = body.find(['[', '{']) {
        let prefix = body[..start].trim_end();
        if let Some(target) = prefix.strip_suffix('=') {
            let target = target.trim();
            let target = ["var ", "let ", "const "]
                .iter()
                .find_map(|kw| target.strip_prefix(kw))
                .unwrap_or(target)
                .trim();
            let is_path = !target.is_empty()
                && target
                    .split('.')
                    .all(|part| !part.is_empty() && part.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '$'));
            if is_path {
                body = &body[start..];
            }
        }
    }
    let body = body.trim_end();
    body.strip_suffix(';').unwrap_or(body).trim_end()
}

/// Parse the legacy payload into validated records without touching a board.
fn parse_groups(text: &str) -> Result<Vec<LegacyGroup>, ImportError> {
    let Value::Array(records) = literal::parse(strip_assignment(text))? else {
        return Err(ImportError::NotAnArray);
    };
    records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            if !record.is_object() {
                return Err(ImportError::InvalidRecord {
                    index,
                    reason: "expected an object".to_string(),
                });
            }
            serde_json::from_value(record).map_err(|e| ImportError::InvalidRecord {
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Import legacy groups, appending one closed envelope per record.
///
/// All records are validated before any envelope is appended.
pub fn import_legacy(board: &mut Board, text: &str) -> Result<ImportReport, ImportError> {
    let groups = parse_groups(text)?;

    let mut taken: HashSet<EnvelopeId> = board.envelopes.iter().map(|e| e.id.clone()).collect();
    let mut envelopes = Vec::with_capacity(groups.len());

    for (i, group) in groups.into_iter().enumerate() {
        let wanted = match group.id {
            Some(LegacyId::Text(s)) => Some(s),
            Some(LegacyId::Number(n)) => Some(n.to_string()),
            None => None,
        };
        let id = match non_empty(wanted) {
            Some(id) if !taken.contains(&id) => id,
            Some(id) => {
                log::warn!("Legacy id {} already in use, assigning a new one", id);
                Envelope::generate_id()
            }
            None => Envelope::generate_id(),
        };
        taken.insert(id.clone());

        let x = IMPORT_START_X + IMPORT_STEP_X * i as f64;
        let mut env = Envelope::new(id, group.name.unwrap_or_default(), Point::new(x, IMPORT_Y));
        env.color = non_empty(group.color).unwrap_or_else(|| PALETTE[0].to_string());
        env.is_open = false;
        env.team = group.items.unwrap_or_default();
        env.icon = group.icon.unwrap_or_default();
        if let Some(href) = non_empty(group.icon_href) {
            let img = env.icon().unwrap_or(IMPORTED_TAG_IMAGE).to_string();
            env.tags.push(Tag::new(board.next_tag_id(), IMPORTED_TAG_TEXT, img));
            env.reference_url = href;
        }
        envelopes.push(env);
    }

    let created = envelopes.iter().map(|e| e.id.clone()).collect::<Vec<_>>();
    board.append(envelopes);
    log::info!("Imported {} legacy groups", created.len());
    Ok(ImportReport { created })
}
