//! Camera-derived transforms for the world layer and the background grid.

use canvashub_core::Camera;
use kurbo::{Affine, Vec2};

/// Fraction of the camera translation applied to the background grid.
pub const GRID_PARALLAX: f64 = 0.2;

/// Transforms a host applies to its world and grid layers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransforms {
    /// World to screen.
    pub world: Affine,
    /// Grid layer: same scale, translation damped by [`GRID_PARALLAX`].
    pub grid: Affine,
}

impl ViewTransforms {
    pub fn from_camera(camera: &Camera) -> Self {
        let offset: Vec2 = camera.offset();
        Self {
            world: camera.transform(),
            grid: Affine::translate(offset * GRID_PARALLAX) * Affine::scale(camera.z),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Point;

    #[test]
    fn test_grid_parallax() {
        let camera = Camera { x: 100.0, y: -50.0, z: 2.0 };
        let view = ViewTransforms::from_camera(&camera);

        assert_eq!(view.world * Point::new(10.0, 10.0), Point::new(120.0, -30.0));
        assert_eq!(view.grid * Point::ZERO, Point::new(20.0, -10.0));
        assert_eq!(view.grid * Point::new(1.0, 0.0), Point::new(22.0, -10.0));
    }
}
