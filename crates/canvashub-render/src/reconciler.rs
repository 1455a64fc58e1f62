//! Diff-aware synchronisation of visual nodes with the board.

use crate::node::{Content, VisualNode};
use canvashub_core::{Board, Envelope, EnvelopeId, HitTest};
use kurbo::Point;
use std::collections::{HashMap, HashSet};

/// Summary of an envelope's content-relevant state.
///
/// Content is regenerated only when this changes or the id is forced.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Fingerprint {
    open: bool,
    members: usize,
    tags: usize,
    name: String,
    color: String,
}

impl Fingerprint {
    fn of(env: &Envelope) -> Self {
        Self {
            open: env.is_open,
            members: env.team.len(),
            tags: env.tags.len(),
            name: env.name.clone(),
            color: env.color.clone(),
        }
    }
}

/// What happened to a node during a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeChange {
    /// A node was created with fresh content.
    Created(EnvelopeId),
    /// An existing node's content was rebuilt.
    Regenerated(EnvelopeId),
    /// The envelope is gone and its node was removed.
    Detached(EnvelopeId),
}

/// Changes produced by one render pass, in application order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    pub changes: Vec<NodeChange>,
}

impl Frame {
    /// True when no node content changed. Positions may still have moved.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    pub fn created(&self) -> usize {
        self.count(|c| matches!(c, NodeChange::Created(_)))
    }

    pub fn regenerated(&self) -> usize {
        self.count(|c| matches!(c, NodeChange::Regenerated(_)))
    }

    pub fn detached(&self) -> usize {
        self.count(|c| matches!(c, NodeChange::Detached(_)))
    }

    fn count(&self, f: impl Fn(&NodeChange) -> bool) -> usize {
        self.changes.iter().filter(|c| f(c)).count()
    }
}

#[derive(Debug, Clone)]
struct Slot {
    node: VisualNode,
    fingerprint: Fingerprint,
}

/// Retained visual tree, one node per envelope id.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    slots: HashMap<EnvelopeId, Slot>,
    /// Creation order; later nodes paint above earlier ones at equal stacking.
    order: Vec<EnvelopeId>,
}

impl Reconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bring every node in line with the board.
    ///
    /// Position and open styling are always refreshed. Content is rebuilt
    /// only for ids whose fingerprint changed or that appear in `forced`.
    pub fn render(&mut self, board: &Board, forced: &HashSet<EnvelopeId>) -> Frame {
        let mut frame = Frame::default();

        let live: HashSet<&str> = board.envelopes.iter().map(|e| e.id.as_str()).collect();
        let slots = &mut self.slots;
        self.order.retain(|id| {
            if live.contains(id.as_str()) {
                return true;
            }
            slots.remove(id);
            frame.changes.push(NodeChange::Detached(id.clone()));
            false
        });

        for env in &board.envelopes {
            let fingerprint = Fingerprint::of(env);
            match self.slots.get_mut(&env.id) {
                Some(slot) => {
                    slot.node.sync_frame(env);
                    if slot.fingerprint != fingerprint || forced.contains(&env.id) {
                        slot.node.content = Content::build(env);
                        slot.fingerprint = fingerprint;
                        frame.changes.push(NodeChange::Regenerated(env.id.clone()));
                    }
                }
                None => {
                    self.slots.insert(
                        env.id.clone(),
                        Slot {
                            node: VisualNode::new(env),
                            fingerprint,
                        },
                    );
                    self.order.push(env.id.clone());
                    frame.changes.push(NodeChange::Created(env.id.clone()));
                }
            }
        }

        if !frame.is_empty() {
            log::debug!(
                "Render pass: {} created, {} regenerated, {} detached",
                frame.created(),
                frame.regenerated(),
                frame.detached()
            );
        }
        frame
    }

    pub fn node(&self, id: &str) -> Option<&VisualNode> {
        self.slots.get(id).map(|s| &s.node)
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &VisualNode> {
        self.order.iter().filter_map(|id| self.node(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Move a node without a render pass. Used while dragging.
    pub fn move_node(&mut self, id: &str, position: Point) -> bool {
        self.with_node(id, |n| n.position = position)
    }

    /// Raise or restore a node's stacking.
    pub fn set_lifted(&mut self, id: &str, lifted: bool) -> bool {
        self.with_node(id, |n| n.lifted = lifted)
    }

    /// Toggle drop-target highlighting.
    pub fn set_highlight(&mut self, id: &str, highlighted: bool) -> bool {
        self.with_node(id, |n| n.highlighted = highlighted)
    }

    /// Remove a node immediately, e.g. right after its envelope was deleted.
    pub fn detach(&mut self, id: &str) -> bool {
        if self.slots.remove(id).is_none() {
            return false;
        }
        self.order.retain(|o| o != id);
        true
    }

    fn with_node(&mut self, id: &str, f: impl FnOnce(&mut VisualNode)) -> bool {
        match self.slots.get_mut(id) {
            Some(slot) => {
                f(&mut slot.node);
                true
            }
            None => false,
        }
    }
}

impl HitTest for Reconciler {
    /// Front-most node whose bounds contain the point: highest stacking,
    /// then latest created.
    fn envelope_at(&self, world_point: Point) -> Option<EnvelopeId> {
        self.order
            .iter()
            .enumerate()
            .filter_map(|(i, id)| self.node(id).map(|n| (i, n)))
            .filter(|(_, n)| n.bounds().contains(world_point))
            .max_by_key(|(i, n)| (n.z_index(), *i))
            .map(|(_, n)| n.id.clone())
    }
}
