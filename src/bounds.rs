//! Play-field bounds: random placement, out-of-bounds tests and edge wrapping.

use crate::constants::WRAP_EPSILON;
use bevy::prelude::*;
use rand::Rng;

/// Axis-aligned play field centred on `center`.
///
/// Objects that leave one edge reappear just inside the opposite edge.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlayField {
    pub center: Vec2,
    pub size: Vec2,
}

impl PlayField {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            center: Vec2::ZERO,
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.size * 0.5
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.size * 0.5
    }

    /// Uniformly random point inside the field.
    pub fn random_point(&self, rng: &mut impl Rng) -> Vec2 {
        let min = self.min();
        let max = self.max();
        Vec2::new(rng.gen_range(min.x..=max.x), rng.gen_range(min.y..=max.y))
    }

    /// Position in field-normalised coordinates: the field spans [-0.5, 0.5] on each axis.
    fn to_local(&self, world: Vec2) -> Vec2 {
        (world - self.center) / self.size
    }

    fn to_world(&self, local: Vec2) -> Vec2 {
        self.center + local * self.size
    }

    /// `true` when `pos` lies outside the field on either axis.
    pub fn is_out_of_bounds(&self, pos: Vec2) -> bool {
        let local = self.to_local(pos);
        local.x.abs().max(local.y.abs()) > 0.5
    }

    /// Wrap `pos` to just inside the opposite edge on every axis it has left.
    ///
    /// Positions already inside the field are returned unchanged.
    pub fn wrap(&self, pos: Vec2) -> Vec2 {
        let local = self.to_local(pos);
        let wrapped = Vec2::new(
            wrap_axis(local.x, WRAP_EPSILON / self.size.x),
            wrap_axis(local.y, WRAP_EPSILON / self.size.y),
        );
        self.to_world(wrapped)
    }
}

/// Normalised coordinate `n` moved just inside the opposite edge when it has
/// left [-0.5, 0.5].
fn wrap_axis(n: f32, eps: f32) -> f32 {
    if n > 0.5 {
        -0.5 + eps
    } else if n < -0.5 {
        0.5 - eps
    } else {
        n
    }
}

impl Default for PlayField {
    fn default() -> Self {
        Self::new(crate::constants::FIELD_WIDTH, crate::constants::FIELD_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn random_points_stay_inside() {
        let field = PlayField::new(32.0, 18.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..500 {
            let p = field.random_point(&mut rng);
            assert!(!field.is_out_of_bounds(p), "{p:?} escaped the field");
        }
    }

    #[test]
    fn wrap_handles_each_axis_independently() {
        let field = PlayField::new(10.0, 10.0);
        let corner = field.wrap(Vec2::new(-6.0, -5.5));
        assert!((corner.x - (5.0 - WRAP_EPSILON)).abs() < 1e-4, "{corner:?}");
        assert!((corner.y - (5.0 - WRAP_EPSILON)).abs() < 1e-4, "{corner:?}");
        let inside = Vec2::new(0.0, 4.0);
        assert_eq!(field.wrap(inside), inside);
    }

    #[test]
    fn wrap_moves_to_opposite_edge() {
        let field = PlayField::new(10.0, 10.0);
        let wrapped = field.wrap(Vec2::new(5.2, 1.0));
        assert!((wrapped.x - (-5.0 + WRAP_EPSILON)).abs() < 1e-4, "{wrapped:?}");
        assert!((wrapped.y - 1.0).abs() < 1e-5);
        assert!(!field.is_out_of_bounds(wrapped));
    }

    #[test]
    fn wrap_handles_corner_exit() {
        let field = PlayField::new(10.0, 6.0);
        let wrapped = field.wrap(Vec2::new(-5.5, -3.5));
        assert!(wrapped.x > 4.9 && wrapped.y > 2.9, "{wrapped:?}");
    }

    #[test]
    fn wrap_leaves_inside_points_alone() {
        let field = PlayField {
            center: Vec2::new(2.0, 2.0),
            size: Vec2::new(4.0, 4.0),
        };
        let p = Vec2::new(1.0, 3.5);
        assert!((field.wrap(p) - p).length() < 1e-6);
    }
}
