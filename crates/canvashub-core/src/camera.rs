//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom level.
pub const MIN_ZOOM: f64 = 0.1;
/// Maximum allowed zoom level.
pub const MAX_ZOOM: f64 = 5.0;
/// Zoom factor applied per wheel step when zooming in.
pub const ZOOM_IN_FACTOR: f64 = 1.1;
/// Zoom factor applied per wheel step when zooming out.
pub const ZOOM_OUT_FACTOR: f64 = 1.0 / ZOOM_IN_FACTOR;

/// Camera manages the view transform for the board.
///
/// `(x, y)` is the world-to-screen translation and `z` the scale factor.
/// Serialized as `{x, y, z}`; the zoom is clamped on load.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawCamera")]
pub struct Camera {
    /// Horizontal translation in screen pixels.
    pub x: f64,
    /// Vertical translation in screen pixels.
    pub y: f64,
    /// Zoom level, always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub z: f64,
}

#[derive(Deserialize)]
struct RawCamera {
    x: f64,
    y: f64,
    z: f64,
}

impl From<RawCamera> for Camera {
    fn from(raw: RawCamera) -> Self {
        Self {
            x: raw.x,
            y: raw.y,
            z: raw.z.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 1.0,
        }
    }
}

impl Camera {
    /// Home position for a viewport of the given width.
    pub fn home(viewport_width: f64) -> Self {
        Self {
            x: viewport_width / 2.0 - 400.0,
            y: 100.0,
            z: 1.0,
        }
    }

    /// Current translation offset.
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    /// Set the translation offset.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.x = offset.x;
        self.y = offset.y;
    }

    /// Get the affine transform for rendering.
    ///
    /// This transform converts world coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset()) * Affine::scale(self.z)
    }

    /// Get the inverse transform for input handling.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.z) * Affine::translate(-self.offset())
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.x) / self.z,
            (screen_point.y - self.y) / self.z,
        )
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        Point::new(
            world_point.x * self.z + self.x,
            world_point.y * self.z + self.y,
        )
    }

    /// Pan the camera by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.set_offset(self.offset() + delta);
    }

    /// Zoom the camera, keeping the world point under `screen_point` fixed.
    ///
    /// Returns false when the clamped zoom did not change.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) -> bool {
        let new_zoom = (self.z * factor).clamp(MIN_ZOOM, MAX_ZOOM);
        if (new_zoom - self.z).abs() < f64::EPSILON {
            return false;
        }

        let world_point = self.screen_to_world(screen_point);
        self.z = new_zoom;
        self.x = screen_point.x - world_point.x * new_zoom;
        self.y = screen_point.y - world_point.y * new_zoom;
        true
    }

    /// Apply one wheel step at the cursor.
    ///
    /// Negative `delta_y` (wheel pushed away) zooms in; a zero delta is ignored.
    pub fn zoom_wheel(&mut self, cursor: Point, delta_y: f64) -> bool {
        if delta_y == 0.0 {
            return false;
        }
        let factor = if delta_y < 0.0 {
            ZOOM_IN_FACTOR
        } else {
            ZOOM_OUT_FACTOR
        };
        self.zoom_at(cursor, factor)
    }

    /// Reset camera to its home position for the viewport width.
    pub fn reset(&mut self, viewport_width: f64) {
        *self = Self::home(viewport_width);
    }
}

/// An in-progress pan gesture started on the empty canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanGesture {
    start_pointer: Point,
    start_offset: Vec2,
}

impl PanGesture {
    /// Record the pointer position and camera offset at gesture start.
    pub fn begin(camera: &Camera, pointer: Point) -> Self {
        Self {
            start_pointer: pointer,
            start_offset: camera.offset(),
        }
    }

    /// Move the camera so the offset follows the pointer delta since start.
    pub fn update(&self, camera: &mut Camera, pointer: Point) {
        camera.set_offset(self.start_offset + (pointer - self.start_pointer));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::default();
        assert_eq!(camera.offset(), Vec2::ZERO);
        assert!((camera.z - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_home_position() {
        let camera = Camera::home(1200.0);
        assert!((camera.x - 200.0).abs() < f64::EPSILON);
        assert!((camera.y - 100.0).abs() < f64::EPSILON);
        assert!((camera.z - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_world_with_offset_and_zoom() {
        let camera = Camera { x: 50.0, y: 100.0, z: 2.0 };
        let world = camera.screen_to_world(Point::new(150.0, 300.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_transform_matches_point_mapping() {
        let camera = Camera { x: 30.0, y: -20.0, z: 1.5 };
        let world = Point::new(123.0, 456.0);
        let via_affine = camera.transform() * world;
        let direct = camera.world_to_screen(world);
        assert!((via_affine.x - direct.x).abs() < 1e-10);
        assert!((via_affine.y - direct.y).abs() < 1e-10);

        let back = camera.inverse_transform() * direct;
        assert!((back.x - world.x).abs() < 1e-10);
        assert!((back.y - world.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_keeps_cursor_point_fixed() {
        let mut camera = Camera { x: 40.0, y: 70.0, z: 1.3 };
        let cursor = Point::new(412.0, 233.0);
        let before = camera.screen_to_world(cursor);

        assert!(camera.zoom_wheel(cursor, -120.0));
        let after = camera.screen_to_world(cursor);

        assert!((camera.z - 1.3 * ZOOM_IN_FACTOR).abs() < 1e-12);
        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::default();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.z - MIN_ZOOM).abs() < f64::EPSILON);
        assert!(!camera.zoom_wheel(Point::ZERO, 10.0));

        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.z - MAX_ZOOM).abs() < f64::EPSILON);
        assert!(!camera.zoom_wheel(Point::ZERO, -10.0));
    }

    #[test]
    fn test_zero_wheel_delta_ignored() {
        let mut camera = Camera::default();
        assert!(!camera.zoom_wheel(Point::new(5.0, 5.0), 0.0));
        assert_eq!(camera, Camera::default());
    }

    #[test]
    fn test_pan_gesture() {
        let mut camera = Camera { x: 10.0, y: 20.0, z: 2.0 };
        let gesture = PanGesture::begin(&camera, Point::new(100.0, 100.0));

        gesture.update(&mut camera, Point::new(130.0, 90.0));
        assert!((camera.x - 40.0).abs() < f64::EPSILON);
        assert!((camera.y - 10.0).abs() < f64::EPSILON);

        // Deltas are measured from the gesture start, not accumulated.
        gesture.update(&mut camera, Point::new(100.0, 100.0));
        assert!((camera.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_deserialize_clamps_zoom() {
        let camera: Camera = serde_json::from_str(r#"{"x":1,"y":2,"z":42}"#).unwrap();
        assert!((camera.z - MAX_ZOOM).abs() < f64::EPSILON);
    }
}
