//! Pointer drag state machine.
//!
//! One drag is active at a time. The payload decides what the drag does:
//! - [`DragPayload::Reposition`] moves an envelope by the pointer delta scaled
//!   by the zoom captured at drag start.
//! - [`DragPayload::TagTransfer`] carries a tag in a floating [`Ghost`] and
//!   moves it to the open envelope it is released over.
//!
//! ```text
//! Idle --begin_*--> Dragging --pointer_up--> (Repositioned | Transferred | Dropped) --> Idle
//!                      \-------cancel------> Cancelled --> Idle
//! ```

use crate::envelope::{EnvelopeId, TagId};
use crate::store::Board;
use kurbo::{Point, Vec2};

/// Offset of the ghost from the pointer, in screen pixels.
pub const GHOST_OFFSET: Vec2 = Vec2::new(10.0, 10.0);

/// Ghost label for tags without text.
pub const GHOST_FALLBACK_LABEL: &str = "Tag";

/// Resolves which envelope's visual node lies under a world point.
pub trait HitTest {
    /// Front-most envelope containing `world_point`, if any.
    fn envelope_at(&self, world_point: Point) -> Option<EnvelopeId>;
}

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// Moving an envelope across the board.
    Reposition(EnvelopeId),
    /// Moving a tag out of `source` into another envelope.
    TagTransfer { tag: TagId, source: EnvelopeId },
}

/// Floating proxy shown under the pointer while a tag is dragged.
///
/// Never part of the persisted board.
#[derive(Debug, Clone, PartialEq)]
pub struct Ghost {
    /// Screen position of the ghost's top-left corner.
    pub position: Point,
    /// Tag text, or a fallback label.
    pub label: String,
    /// Tag image URL.
    pub img: String,
}

impl Ghost {
    fn follow(&mut self, pointer: Point) {
        self.position = pointer + GHOST_OFFSET;
    }
}

#[derive(Debug, Clone)]
enum Active {
    Reposition {
        envelope: EnvelopeId,
        start_pointer: Point,
        start_position: Point,
        zoom: f64,
    },
    TagTransfer {
        tag: TagId,
        source: EnvelopeId,
        ghost: Ghost,
        candidate: Option<EnvelopeId>,
    },
}

impl Active {
    fn payload(&self) -> DragPayload {
        match self {
            Active::Reposition { envelope, .. } => DragPayload::Reposition(envelope.clone()),
            Active::TagTransfer { tag, source, .. } => DragPayload::TagTransfer {
                tag: *tag,
                source: source.clone(),
            },
        }
    }
}

/// Result of a pointer move while dragging.
#[derive(Debug, Clone, PartialEq)]
pub enum DragUpdate {
    /// No drag in progress.
    Ignored,
    /// The envelope was moved; apply the position to its node directly.
    Moved { envelope: EnvelopeId, position: Point },
    /// The ghost moved. `highlight` is set when the drop candidate changed.
    Ghost {
        position: Point,
        highlight: Option<HighlightChange>,
    },
}

/// Drop-target highlight transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightChange {
    pub previous: Option<EnvelopeId>,
    pub current: Option<EnvelopeId>,
}

/// Result of ending a drag.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOutcome {
    /// Release without an active drag.
    Idle,
    /// An envelope finished moving.
    Repositioned { envelope: EnvelopeId, position: Point },
    /// A tag changed owner.
    Transferred {
        tag: TagId,
        from: EnvelopeId,
        to: EnvelopeId,
        /// Candidate highlight to clear.
        highlight: Option<EnvelopeId>,
    },
    /// A tag was released without a valid target; nothing changed.
    Dropped {
        tag: TagId,
        source: EnvelopeId,
        highlight: Option<EnvelopeId>,
    },
    /// The drag was abandoned; any reposition was reverted.
    Cancelled {
        payload: DragPayload,
        highlight: Option<EnvelopeId>,
    },
}

impl DragOutcome {
    /// Whether the board changed and needs saving.
    pub fn changed_board(&self) -> bool {
        matches!(self, Self::Repositioned { .. } | Self::Transferred { .. })
    }

    /// Envelope whose drop highlight must be removed, if any.
    pub fn highlight(&self) -> Option<&EnvelopeId> {
        match self {
            Self::Transferred { highlight, .. }
            | Self::Dropped { highlight, .. }
            | Self::Cancelled { highlight, .. } => highlight.as_ref(),
            _ => None,
        }
    }
}

/// The drag engine.
#[derive(Debug, Clone, Default)]
pub struct DragEngine {
    active: Option<Active>,
}

impl DragEngine {
    /// Create an idle engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Payload of the current drag.
    pub fn payload(&self) -> Option<DragPayload> {
        self.active.as_ref().map(Active::payload)
    }

    /// The floating tag proxy, while a tag is dragged.
    pub fn ghost(&self) -> Option<&Ghost> {
        match &self.active {
            Some(Active::TagTransfer { ghost, .. }) => Some(ghost),
            _ => None,
        }
    }

    /// Current valid drop candidate, while a tag is dragged.
    pub fn candidate(&self) -> Option<&EnvelopeId> {
        match &self.active {
            Some(Active::TagTransfer { candidate, .. }) => candidate.as_ref(),
            _ => None,
        }
    }

    /// Start moving an envelope. Ignored while another drag is active.
    pub fn begin_reposition(&mut self, board: &Board, envelope: &str, pointer: Point) -> bool {
        if self.active.is_some() {
            log::debug!("Ignoring reposition start during active drag");
            return false;
        }
        let Some(env) = board.envelope(envelope) else {
            return false;
        };
        self.active = Some(Active::Reposition {
            envelope: env.id.clone(),
            start_pointer: pointer,
            start_position: env.position(),
            zoom: board.camera.z,
        });
        true
    }

    /// Start dragging a tag out of `source`. Ignored while another drag is active.
    pub fn begin_tag_transfer(&mut self, board: &Board, source: &str, tag: TagId, pointer: Point) -> bool {
        if self.active.is_some() {
            log::debug!("Ignoring tag drag start during active drag");
            return false;
        }
        let Some(t) = board.envelope(source).and_then(|e| e.tag(tag)) else {
            return false;
        };
        let label = if t.text.is_empty() {
            GHOST_FALLBACK_LABEL.to_string()
        } else {
            t.text.clone()
        };
        let mut ghost = Ghost {
            position: pointer,
            label,
            img: t.img.clone(),
        };
        ghost.follow(pointer);
        self.active = Some(Active::TagTransfer {
            tag,
            source: source.to_string(),
            ghost,
            candidate: None,
        });
        true
    }

    /// Track the pointer.
    pub fn pointer_move(&mut self, board: &mut Board, pointer: Point, hits: &dyn HitTest) -> DragUpdate {
        let world_point = board.camera.screen_to_world(pointer);
        match &mut self.active {
            None => DragUpdate::Ignored,
            Some(Active::Reposition {
                envelope,
                start_pointer,
                start_position,
                zoom,
            }) => {
                let position = *start_position + (pointer - *start_pointer) / *zoom;
                match board.set_position(envelope, position) {
                    Ok(()) => DragUpdate::Moved {
                        envelope: envelope.clone(),
                        position,
                    },
                    Err(e) => {
                        log::warn!("Ending drag: {}", e);
                        self.active = None;
                        DragUpdate::Ignored
                    }
                }
            }
            Some(Active::TagTransfer {
                source,
                ghost,
                candidate,
                ..
            }) => {
                ghost.follow(pointer);
                let next = hits
                    .envelope_at(world_point)
                    .filter(|id| board.accepts_tag_from(id, source));
                let highlight = if next != *candidate {
                    let previous = std::mem::replace(candidate, next.clone());
                    Some(HighlightChange { previous, current: next })
                } else {
                    None
                };
                DragUpdate::Ghost {
                    position: ghost.position,
                    highlight,
                }
            }
        }
    }

    /// Finish the drag, committing its effect on the board.
    pub fn pointer_up(&mut self, board: &mut Board) -> DragOutcome {
        match self.active.take() {
            None => DragOutcome::Idle,
            Some(Active::Reposition { envelope, .. }) => {
                let position = board
                    .envelope(&envelope)
                    .map(|e| e.position())
                    .unwrap_or(Point::ZERO);
                DragOutcome::Repositioned { envelope, position }
            }
            Some(Active::TagTransfer {
                tag,
                source,
                candidate,
                ..
            }) => {
                // The ghost is dropped with the active state.
                let Some(target) = candidate.clone() else {
                    return DragOutcome::Dropped {
                        tag,
                        source,
                        highlight: None,
                    };
                };
                match board.transfer_tag(tag, &source, &target) {
                    Ok(()) => DragOutcome::Transferred {
                        tag,
                        from: source,
                        to: target,
                        highlight: candidate,
                    },
                    Err(e) => {
                        log::warn!("Tag drop rejected: {}", e);
                        DragOutcome::Dropped {
                            tag,
                            source,
                            highlight: candidate,
                        }
                    }
                }
            }
        }
    }

    /// Abandon the drag without committing; a moved envelope returns to its start.
    pub fn cancel(&mut self, board: &mut Board) -> DragOutcome {
        let Some(active) = self.active.take() else {
            return DragOutcome::Idle;
        };
        let payload = active.payload();
        let highlight = match active {
            Active::Reposition {
                envelope,
                start_position,
                ..
            } => {
                let _ = board.set_position(&envelope, start_position);
                None
            }
            Active::TagTransfer { candidate, .. } => candidate,
        };
        DragOutcome::Cancelled { payload, highlight }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::DEFAULT_TAG_IMAGE;
    use kurbo::Rect;

    /// Hit tester over fixed world rectangles, last entry front-most.
    struct Rects(Vec<(EnvelopeId, Rect)>);

    impl HitTest for Rects {
        fn envelope_at(&self, world_point: Point) -> Option<EnvelopeId> {
            self.0
                .iter()
                .rev()
                .find(|(_, r)| r.contains(world_point))
                .map(|(id, _)| id.clone())
        }
    }

    fn setup() -> (Board, EnvelopeId, EnvelopeId, TagId, Rects) {
        let mut board = Board::default();
        let a = board.create_envelope(Point::new(0.0, 0.0)).id.clone();
        let b = board.create_envelope(Point::new(500.0, 0.0)).id.clone();
        let tag = board.add_tag(&a, "note", DEFAULT_TAG_IMAGE).unwrap();
        board.take_dirty();
        let rects = Rects(vec![
            (a.clone(), Rect::new(0.0, 0.0, 400.0, 300.0)),
            (b.clone(), Rect::new(500.0, 0.0, 900.0, 300.0)),
        ]);
        (board, a, b, tag, rects)
    }

    #[test]
    fn test_reposition_scales_by_zoom() {
        let (mut board, a, _, _, rects) = setup();
        board.camera.z = 2.0;
        let mut engine = DragEngine::new();

        assert!(engine.begin_reposition(&board, &a, Point::new(10.0, 10.0)));
        assert_eq!(engine.payload(), Some(DragPayload::Reposition(a.clone())));

        let update = engine.pointer_move(&mut board, Point::new(50.0, 30.0), &rects);
        assert_eq!(
            update,
            DragUpdate::Moved {
                envelope: a.clone(),
                position: Point::new(20.0, 10.0)
            }
        );

        let outcome = engine.pointer_up(&mut board);
        assert_eq!(
            outcome,
            DragOutcome::Repositioned {
                envelope: a.clone(),
                position: Point::new(20.0, 10.0)
            }
        );
        assert!(outcome.changed_board());
        assert!(!engine.is_dragging());
        assert_eq!(board.envelope(&a).unwrap().position(), Point::new(20.0, 10.0));
    }

    #[test]
    fn test_zoom_captured_at_start() {
        let (mut board, a, _, _, rects) = setup();
        let mut engine = DragEngine::new();
        engine.begin_reposition(&board, &a, Point::ZERO);
        board.camera.z = 4.0;
        engine.pointer_move(&mut board, Point::new(10.0, 0.0), &rects);
        assert_eq!(board.envelope(&a).unwrap().position(), Point::new(10.0, 0.0));
    }

    #[test]
    fn test_second_drag_ignored() {
        let (board, a, b, tag, _) = setup();
        let mut engine = DragEngine::new();
        assert!(engine.begin_reposition(&board, &a, Point::ZERO));
        assert!(!engine.begin_reposition(&board, &b, Point::ZERO));
        assert!(!engine.begin_tag_transfer(&board, &a, tag, Point::ZERO));
        assert_eq!(engine.payload(), Some(DragPayload::Reposition(a)));
    }

    #[test]
    fn test_tag_transfer_to_open_envelope() {
        let (mut board, a, b, tag, rects) = setup();
        let mut engine = DragEngine::new();

        assert!(engine.begin_tag_transfer(&board, &a, tag, Point::new(100.0, 100.0)));
        let ghost = engine.ghost().unwrap();
        assert_eq!(ghost.position, Point::new(110.0, 110.0));
        assert_eq!(ghost.label, "note");

        let update = engine.pointer_move(&mut board, Point::new(600.0, 100.0), &rects);
        assert_eq!(
            update,
            DragUpdate::Ghost {
                position: Point::new(610.0, 110.0),
                highlight: Some(HighlightChange {
                    previous: None,
                    current: Some(b.clone())
                }),
            }
        );
        // Same candidate again: no highlight change.
        let update = engine.pointer_move(&mut board, Point::new(650.0, 120.0), &rects);
        assert!(matches!(update, DragUpdate::Ghost { highlight: None, .. }));

        let outcome = engine.pointer_up(&mut board);
        assert_eq!(
            outcome,
            DragOutcome::Transferred {
                tag,
                from: a.clone(),
                to: b.clone(),
                highlight: Some(b.clone())
            }
        );
        assert!(engine.ghost().is_none());
        assert!(board.envelope(&a).unwrap().tag(tag).is_none());
        assert_eq!(board.envelope(&b).unwrap().tag(tag).unwrap().text, "note");
        assert_eq!(board.tag_count(), 1);

        let dirty = board.take_dirty();
        assert!(dirty.contains(&a) && dirty.contains(&b));
    }

    #[test]
    fn test_tag_drop_on_closed_envelope() {
        let (mut board, a, b, tag, rects) = setup();
        board.set_open(&b, false).unwrap();
        board.take_dirty();
        let before = board.envelope(&a).unwrap().tags.clone();
        let mut engine = DragEngine::new();

        engine.begin_tag_transfer(&board, &a, tag, Point::ZERO);
        let update = engine.pointer_move(&mut board, Point::new(600.0, 100.0), &rects);
        assert!(matches!(update, DragUpdate::Ghost { highlight: None, .. }));
        assert!(engine.candidate().is_none());

        let outcome = engine.pointer_up(&mut board);
        assert!(matches!(outcome, DragOutcome::Dropped { .. }));
        assert!(!outcome.changed_board());
        assert_eq!(board.envelope(&a).unwrap().tags, before);
        assert!(board.take_dirty().is_empty());
    }

    #[test]
    fn test_tag_drop_on_canvas_and_source() {
        let (mut board, a, _, tag, rects) = setup();
        let mut engine = DragEngine::new();

        engine.begin_tag_transfer(&board, &a, tag, Point::ZERO);
        // Over its own envelope: not a candidate.
        engine.pointer_move(&mut board, Point::new(50.0, 50.0), &rects);
        assert!(engine.candidate().is_none());
        // Over empty canvas.
        engine.pointer_move(&mut board, Point::new(450.0, 1000.0), &rects);
        let outcome = engine.pointer_up(&mut board);

        assert!(matches!(outcome, DragOutcome::Dropped { highlight: None, .. }));
        assert_eq!(board.envelope(&a).unwrap().tags.len(), 1);
    }

    #[test]
    fn test_candidate_cleared_when_leaving() {
        let (mut board, a, b, tag, rects) = setup();
        let mut engine = DragEngine::new();

        engine.begin_tag_transfer(&board, &a, tag, Point::ZERO);
        engine.pointer_move(&mut board, Point::new(600.0, 100.0), &rects);
        let update = engine.pointer_move(&mut board, Point::new(450.0, 100.0), &rects);
        assert_eq!(
            update,
            DragUpdate::Ghost {
                position: Point::new(460.0, 110.0),
                highlight: Some(HighlightChange {
                    previous: Some(b),
                    current: None
                }),
            }
        );
    }

    #[test]
    fn test_hit_test_uses_world_coordinates() {
        let (mut board, a, b, tag, rects) = setup();
        board.camera = crate::Camera { x: -100.0, y: 0.0, z: 0.5 };
        let mut engine = DragEngine::new();

        engine.begin_tag_transfer(&board, &a, tag, Point::ZERO);
        // Screen (200, 50) -> world (600, 100), inside b.
        engine.pointer_move(&mut board, Point::new(200.0, 50.0), &rects);
        assert_eq!(engine.candidate(), Some(&b));
    }

    #[test]
    fn test_cancel_reverts_reposition() {
        let (mut board, a, _, _, rects) = setup();
        let mut engine = DragEngine::new();

        engine.begin_reposition(&board, &a, Point::ZERO);
        engine.pointer_move(&mut board, Point::new(300.0, 300.0), &rects);
        let outcome = engine.cancel(&mut board);

        assert!(matches!(outcome, DragOutcome::Cancelled { .. }));
        assert_eq!(board.envelope(&a).unwrap().position(), Point::ZERO);
        assert!(!engine.is_dragging());
    }

    #[test]
    fn test_spurious_events_when_idle() {
        let (mut board, _, _, _, rects) = setup();
        let mut engine = DragEngine::new();
        assert_eq!(engine.pointer_move(&mut board, Point::ZERO, &rects), DragUpdate::Ignored);
        assert_eq!(engine.pointer_up(&mut board), DragOutcome::Idle);
        assert_eq!(engine.cancel(&mut board), DragOutcome::Idle);
    }

    #[test]
    fn test_begin_unknown_targets() {
        let (board, a, _, _, _) = setup();
        let mut engine = DragEngine::new();
        assert!(!engine.begin_reposition(&board, "missing", Point::ZERO));
        assert!(!engine.begin_tag_transfer(&board, &a, 999, Point::ZERO));
        assert!(!engine.is_dragging());
    }
}
