//! Backend-neutral visual node model.

use crate::color::{border_color, parse_hex};
use canvashub_core::{Envelope, EnvelopeId, PALETTE, TagId};
use kurbo::{Point, Rect, Size};
use peniko::Color;

/// World size of an open envelope.
pub const OPEN_SIZE: Size = Size::new(600.0, 420.0);
/// World size of a closed envelope.
pub const CLOSED_SIZE: Size = Size::new(280.0, 150.0);

/// Stacking of an envelope being dragged.
pub const Z_LIFTED: i32 = 200;
/// Stacking of an open envelope.
pub const Z_OPEN: i32 = 100;
/// Stacking of a closed envelope.
pub const Z_CLOSED: i32 = 0;

/// Shown in place of a missing or unusable icon.
pub const NO_ICON_LABEL: &str = "No icon";
/// Shown when an open envelope has no team members.
pub const EMPTY_TEAM_HINT: &str = "No team members.";
/// Shown when an open envelope has no tags.
pub const EMPTY_TAGS_HINT: &str = "Drag tags here or create new ones.";

/// Header toggle control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Collapse,
    Expand,
}

impl Toggle {
    pub fn glyph(self) -> &'static str {
        match self {
            Toggle::Collapse => "✖",
            Toggle::Expand => "⤢",
        }
    }
}

/// Envelope header: swatch, editable title and controls.
#[derive(Debug, Clone, PartialEq)]
pub struct Header {
    pub swatch: Color,
    pub title: String,
    /// Closed envelopes carry their delete control in the header.
    pub delete_control: bool,
    pub toggle: Toggle,
}

/// Content of a collapsed envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedBody {
    pub tags: usize,
    pub members: usize,
}

impl ClosedBody {
    /// Counter line, e.g. `"2 tags • 3 members"`.
    pub fn counter_label(&self) -> String {
        format!("{} tags • {} members", self.tags, self.members)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconView {
    Image(String),
    Placeholder,
}

/// One palette entry in the color picker.
#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub value: &'static str,
    pub color: Color,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberRow {
    /// Index into the envelope's team, used for checkbox callbacks.
    pub index: usize,
    pub code: String,
    pub label: String,
    pub url: String,
    /// Whether `url` is a usable link.
    pub linkable: bool,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRow {
    pub id: TagId,
    pub text: String,
    /// `None` hides the image.
    pub img: Option<String>,
}

/// Content of an expanded envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenBody {
    pub icon: IconView,
    pub palette: Vec<Swatch>,
    /// Reference link; the reference button is enabled only when set.
    pub reference: Option<String>,
    pub description: String,
    pub team: Vec<MemberRow>,
    pub tags: Vec<TagRow>,
}

impl OpenBody {
    pub fn team_hint(&self) -> Option<&'static str> {
        self.team.is_empty().then_some(EMPTY_TEAM_HINT)
    }

    pub fn tags_hint(&self) -> Option<&'static str> {
        self.tags.is_empty().then_some(EMPTY_TAGS_HINT)
    }

    pub fn reference_enabled(&self) -> bool {
        self.reference.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Closed(ClosedBody),
    Open(OpenBody),
}

/// Regenerable part of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub header: Header,
    pub body: Body,
}

/// Accept only absolute http(s) or data URLs for images and links.
fn usable_url(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw.trim()).ok()?;
    matches!(parsed.scheme(), "http" | "https" | "data").then(|| raw.trim().to_string())
}

impl Content {
    /// Build the content for an envelope's current state.
    pub fn build(env: &Envelope) -> Self {
        let header = Header {
            swatch: border_color(&env.color),
            title: env.name.clone(),
            delete_control: !env.is_open,
            toggle: if env.is_open { Toggle::Collapse } else { Toggle::Expand },
        };

        let body = if env.is_open {
            let icon = env
                .icon()
                .and_then(usable_url)
                .map(IconView::Image)
                .unwrap_or(IconView::Placeholder);
            let palette = PALETTE
                .iter()
                .filter_map(|&value| {
                    parse_hex(value).map(|color| Swatch {
                        value,
                        color,
                        selected: env.color == value,
                    })
                })
                .collect();
            let team = env
                .team
                .iter()
                .enumerate()
                .map(|(index, m)| MemberRow {
                    index,
                    code: m.code.clone(),
                    label: m.label.clone(),
                    url: m.url.clone(),
                    linkable: usable_url(&m.url).is_some(),
                    checked: m.checked,
                })
                .collect();
            let tags = env
                .tags
                .iter()
                .map(|t| TagRow {
                    id: t.id,
                    text: t.text.clone(),
                    img: usable_url(&t.img),
                })
                .collect();
            Body::Open(OpenBody {
                icon,
                palette,
                reference: env.reference_url().map(str::to_string),
                description: env.description.clone(),
                team,
                tags,
            })
        } else {
            Body::Closed(ClosedBody {
                tags: env.tags.len(),
                members: env.team.len(),
            })
        };

        Self { header, body }
    }
}

/// Retained visual representation of one envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualNode {
    pub id: EnvelopeId,
    /// World position of the top-left corner.
    pub position: Point,
    pub open: bool,
    /// Border override; `None` uses the host's default closed styling.
    pub border: Option<Color>,
    /// Raised above other nodes while being dragged.
    pub lifted: bool,
    /// Highlighted as a tag drop target.
    pub highlighted: bool,
    pub content: Content,
}

impl VisualNode {
    pub(crate) fn new(env: &Envelope) -> Self {
        let mut node = Self {
            id: env.id.clone(),
            position: env.position(),
            open: env.is_open,
            border: None,
            lifted: false,
            highlighted: false,
            content: Content::build(env),
        };
        node.sync_frame(env);
        node
    }

    /// Update position and open styling, leaving content alone.
    pub(crate) fn sync_frame(&mut self, env: &Envelope) {
        self.position = env.position();
        self.open = env.is_open;
        self.border = env.is_open.then(|| border_color(&env.color));
    }

    pub fn size(&self) -> Size {
        if self.open { OPEN_SIZE } else { CLOSED_SIZE }
    }

    /// World-space bounds.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size())
    }

    pub fn z_index(&self) -> i32 {
        if self.lifted {
            Z_LIFTED
        } else if self.open {
            Z_OPEN
        } else {
            Z_CLOSED
        }
    }
}
