//! Canvas Hub Render Library
//!
//! Keeps a retained tree of backend-neutral visual nodes in sync with the
//! board. Hosts (DOM bridge, immediate-mode GUI, terminal) apply the change
//! list of each [`Frame`] to their own widgets.

pub mod color;
mod node;
mod reconciler;
mod view;

pub use color::{border_color, parse_hex};
pub use node::{
    Body, CLOSED_SIZE, ClosedBody, Content, EMPTY_TAGS_HINT, EMPTY_TEAM_HINT, Header, IconView, MemberRow,
    NO_ICON_LABEL, OPEN_SIZE, OpenBody, Swatch, TagRow, Toggle, VisualNode, Z_CLOSED, Z_LIFTED, Z_OPEN,
};
pub use reconciler::{Frame, NodeChange, Reconciler};
pub use view::{GRID_PARALLAX, ViewTransforms};
