//! Routing of pointer input to panning, zooming and drags.

use canvashub_core::drag::HighlightChange;
use canvashub_core::{
    Board, DragEngine, DragOutcome, DragPayload, DragUpdate, Ghost, MouseButton, PanGesture, PointerEvent, PointerTarget,
};
use canvashub_render::Reconciler;
use kurbo::Point;

/// What the application must do after an event was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    /// Nothing happened.
    Ignored,
    /// The view changed (camera, ghost, a node moved directly); repaint only.
    Redraw,
    /// Run a render pass; nothing to persist.
    Render,
    /// A mutation finished: render and save.
    Commit,
    /// The zoom changed: repaint and schedule a debounced save.
    Zoomed,
}

/// Handles pointer events and translates them to board operations.
#[derive(Debug, Default)]
pub struct EventHandler {
    /// Active pan on the empty canvas.
    pan: Option<PanGesture>,
    drag: DragEngine,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a pan or drag is in progress.
    pub fn is_busy(&self) -> bool {
        self.pan.is_some() || self.drag.is_dragging()
    }

    /// The floating proxy of a dragged tag.
    pub fn ghost(&self) -> Option<&Ghost> {
        self.drag.ghost()
    }

    pub fn handle(&mut self, board: &mut Board, nodes: &mut Reconciler, event: PointerEvent) -> Response {
        match event {
            PointerEvent::Down {
                position,
                button: MouseButton::Left,
                target,
            } => self.press(board, nodes, position, target),
            PointerEvent::Down { .. } => Response::Ignored,
            PointerEvent::Move { position } => self.motion(board, nodes, position),
            PointerEvent::Up {
                button: MouseButton::Left,
                ..
            } => self.release(board, nodes),
            PointerEvent::Up { .. } => Response::Ignored,
            PointerEvent::Cancel => self.cancel(board, nodes),
            PointerEvent::Wheel {
                position,
                delta,
                modifiers,
            } => {
                // Without a zoom modifier the wheel belongs to the page.
                if !modifiers.zooms() {
                    return Response::Ignored;
                }
                if board.camera.zoom_wheel(position, delta.y) {
                    Response::Zoomed
                } else {
                    Response::Ignored
                }
            }
        }
    }

    fn press(&mut self, board: &mut Board, nodes: &mut Reconciler, position: Point, target: PointerTarget) -> Response {
        if self.is_busy() {
            return Response::Ignored;
        }
        match target {
            PointerTarget::Canvas => {
                self.pan = Some(PanGesture::begin(&board.camera, position));
                Response::Redraw
            }
            PointerTarget::EnvelopeHeader(id) => {
                if !self.drag.begin_reposition(board, &id, position) {
                    return Response::Ignored;
                }
                nodes.set_lifted(&id, true);
                Response::Redraw
            }
            PointerTarget::TagHandle { envelope, tag } => {
                if self.drag.begin_tag_transfer(board, &envelope, tag, position) {
                    Response::Redraw
                } else {
                    Response::Ignored
                }
            }
            PointerTarget::Control(_) => Response::Ignored,
        }
    }

    fn motion(&mut self, board: &mut Board, nodes: &mut Reconciler, position: Point) -> Response {
        if let Some(pan) = &self.pan {
            pan.update(&mut board.camera, position);
            return Response::Redraw;
        }
        match self.drag.pointer_move(board, position, &*nodes) {
            DragUpdate::Ignored => Response::Ignored,
            DragUpdate::Moved { envelope, position } => {
                nodes.move_node(&envelope, position);
                Response::Redraw
            }
            DragUpdate::Ghost { highlight, .. } => {
                if let Some(HighlightChange { previous, current }) = highlight {
                    if let Some(prev) = previous {
                        nodes.set_highlight(&prev, false);
                    }
                    if let Some(cur) = current {
                        nodes.set_highlight(&cur, true);
                    }
                }
                Response::Redraw
            }
        }
    }

    fn release(&mut self, board: &mut Board, nodes: &mut Reconciler) -> Response {
        if self.pan.take().is_some() {
            return Response::Commit;
        }
        let outcome = self.drag.pointer_up(board);
        if let Some(id) = outcome.highlight() {
            nodes.set_highlight(id, false);
        }
        match outcome {
            DragOutcome::Idle => Response::Ignored,
            DragOutcome::Repositioned { envelope, .. } => {
                nodes.set_lifted(&envelope, false);
                Response::Commit
            }
            DragOutcome::Transferred { .. } => Response::Commit,
            DragOutcome::Dropped { .. } | DragOutcome::Cancelled { .. } => Response::Redraw,
        }
    }

    fn cancel(&mut self, board: &mut Board, nodes: &mut Reconciler) -> Response {
        // A lost capture during a pan keeps the camera where it is.
        if self.pan.take().is_some() {
            return Response::Commit;
        }
        let outcome = self.drag.cancel(board);
        if let Some(id) = outcome.highlight() {
            nodes.set_highlight(id, false);
        }
        match outcome {
            DragOutcome::Cancelled {
                payload: DragPayload::Reposition(id),
                ..
            } => {
                nodes.set_lifted(&id, false);
                Response::Render
            }
            DragOutcome::Idle => Response::Ignored,
            _ => Response::Redraw,
        }
    }
}
