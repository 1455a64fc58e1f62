//! Property-based invariant tests for the camera and the drag engine.
//!
//! 1. Zoom stays within [MIN_ZOOM, MAX_ZOOM] under any wheel sequence.
//! 2. The world point under the cursor is fixed across a zoom step.
//! 3. Tag drags never create or destroy tags.
//! 4. Saved boards load back unchanged.

use canvashub_core::camera::{MAX_ZOOM, MIN_ZOOM};
use canvashub_core::{
    Board, Camera, DragEngine, EnvelopeId, HitTest, MemoryStorage, Persistence, TagId,
};
use kurbo::Point;
use proptest::prelude::*;
use std::sync::Arc;

// ── Helpers ─────────────────────────────────────────────────────────────

struct Fixed(Option<EnvelopeId>);

impl HitTest for Fixed {
    fn envelope_at(&self, _world_point: Point) -> Option<EnvelopeId> {
        self.0.clone()
    }
}

fn screen_point() -> impl Strategy<Value = Point> {
    (-2000.0f64..2000.0, -2000.0f64..2000.0).prop_map(|(x, y)| Point::new(x, y))
}

fn camera() -> impl Strategy<Value = Camera> {
    (-5000.0f64..5000.0, -5000.0f64..5000.0, MIN_ZOOM..=MAX_ZOOM).prop_map(|(x, y, z)| Camera { x, y, z })
}

/// Board with `n` envelopes, each open flag from `open`, each holding `tags` tags.
fn board_with(open: &[bool], tags: usize) -> Board {
    let mut board = Board::default();
    for (i, is_open) in open.iter().enumerate() {
        let id = board.create_envelope(Point::new(i as f64 * 700.0, 0.0)).id.clone();
        board.set_open(&id, *is_open).unwrap();
        for t in 0..tags {
            board.add_tag(&id, format!("tag {t}"), "https://img").unwrap();
        }
    }
    board
}

fn first_tag(board: &Board, envelope: usize) -> Option<TagId> {
    board.envelopes[envelope].tags.first().map(|t| t.id)
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Zoom clamp
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zoom_stays_clamped(
        start in camera(),
        steps in proptest::collection::vec((screen_point(), -3.0f64..3.0), 1..200),
    ) {
        let mut cam = start;
        for (cursor, delta) in steps {
            cam.zoom_wheel(cursor, delta);
            prop_assert!(cam.z >= MIN_ZOOM && cam.z <= MAX_ZOOM, "zoom {} out of range", cam.z);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Cursor anchor
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn zoom_keeps_cursor_anchor(start in camera(), cursor in screen_point(), zoom_in in any::<bool>()) {
        let mut cam = start;
        let before = cam.screen_to_world(cursor);
        cam.zoom_wheel(cursor, if zoom_in { -1.0 } else { 1.0 });
        let after = cam.screen_to_world(cursor);
        prop_assert!((before - after).hypot() < 1e-6, "anchor drifted from {:?} to {:?}", before, after);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Tag conservation
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tag_drag_conserves_tags(
        open in proptest::collection::vec(any::<bool>(), 2..6),
        tags in 1usize..4,
        source in 0usize..6,
        target in proptest::collection::vec(proptest::option::of(0usize..6), 1..5),
    ) {
        let mut board = board_with(&open, tags);
        let source = source % open.len();
        let total = board.tag_count();
        let source_id = board.envelopes[source].id.clone();
        let source_tags = board.envelopes[source].tags.len();
        let Some(tag) = first_tag(&board, source) else { return Ok(()) };

        let mut engine = DragEngine::new();
        prop_assert!(engine.begin_tag_transfer(&board, &source_id, tag, Point::ZERO));

        let mut last = None;
        for hit in &target {
            let hit = hit.map(|i| board.envelopes[i % open.len()].id.clone());
            engine.pointer_move(&mut board, Point::new(10.0, 10.0), &Fixed(hit.clone()));
            last = hit;
        }
        let outcome = engine.pointer_up(&mut board);

        prop_assert_eq!(board.tag_count(), total);
        prop_assert!(!engine.is_dragging());

        let valid = last
            .as_ref()
            .is_some_and(|id| *id != source_id && board.envelope(id).is_some_and(|e| e.is_open));
        let owner = board.tag_owner(tag).map(|e| e.id.clone());
        if valid {
            prop_assert!(outcome.changed_board());
            prop_assert_eq!(owner, last);
            prop_assert_eq!(board.envelope(&source_id).map(|e| e.tags.len()), Some(source_tags - 1));
        } else {
            prop_assert!(!outcome.changed_board());
            prop_assert_eq!(owner, Some(source_id.clone()));
            prop_assert_eq!(board.envelope(&source_id).map(|e| e.tags.len()), Some(source_tags));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Save/load
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn save_load_is_identity(
        open in proptest::collection::vec(any::<bool>(), 0..5),
        tags in 0usize..3,
        cam in camera(),
    ) {
        let mut board = board_with(&open, tags);
        board.camera = cam;
        let mut persistence = Persistence::new(Arc::new(MemoryStorage::new()));
        persistence.save(&board).unwrap();
        prop_assert_eq!(persistence.load(), Some(board));
    }
}
