//! World bounds and the normalized distance used by movement checks and contact detection.
use std::fmt::{self, Display};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::define_rng;
use crate::error::EpidemicError;
use crate::random::{ContextRandomExt, RngId, RngStore};

define_rng!(MovementRng);

/// Normalized distance at or below which two people are in contact.
pub const CONTACT_THRESHOLD: f64 = 0.01;

/// A cell on the integer grid people live and move on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Position {
        Position { x, y }
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Inclusive world bounds. Both extents are strictly positive so that distances can be
/// normalized by them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorldBounds")]
pub struct World {
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

#[derive(Deserialize)]
struct WorldBounds {
    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,
}

impl TryFrom<WorldBounds> for World {
    type Error = EpidemicError;

    fn try_from(bounds: WorldBounds) -> Result<Self, Self::Error> {
        World::new(bounds.min_x, bounds.max_x, bounds.min_y, bounds.max_y)
    }
}

impl World {
    /// # Errors
    ///
    /// Returns `EpidemicError::InvalidParameter` if either extent is empty or negative.
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Result<World, EpidemicError> {
        if max_x <= min_x || max_y <= min_y {
            return Err(EpidemicError::InvalidParameter(format!(
                "world bounds x=[{min_x}, {max_x}], y=[{min_y}, {max_y}] have an empty extent"
            )));
        }
        Ok(World {
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    #[must_use]
    pub fn contains(&self, position: Position) -> bool {
        (self.min_x..=self.max_x).contains(&position.x)
            && (self.min_y..=self.max_y).contains(&position.y)
    }

    /// Proposes a uniformly random cell within the bounds.
    pub fn random_position(&self, random: &RngStore) -> Position {
        self.random_position_from(random, MovementRng)
    }

    /// Draws a uniformly random cell from the given stream.
    pub fn random_position_from<R: RngId + 'static>(&self, random: &RngStore, rng_id: R) -> Position
    where
        R::RngType: Rng,
    {
        Position {
            x: random.sample_range(rng_id, self.min_x..=self.max_x),
            y: random.sample_range(rng_id, self.min_y..=self.max_y),
        }
    }

    /// Euclidean distance with each axis normalized by the world's extent along it.
    #[must_use]
    pub fn distance(&self, a: Position, b: Position) -> f64 {
        // Widen before subtracting; extents may not fit in an i32.
        let dx = (f64::from(a.x) - f64::from(b.x)) / (f64::from(self.max_x) - f64::from(self.min_x));
        let dy = (f64::from(a.y) - f64::from(b.y)) / (f64::from(self.max_y) - f64::from(self.min_y));
        dx.hypot(dy)
    }

    #[must_use]
    pub fn is_close(&self, a: Position, b: Position) -> bool {
        self.distance(a, b) <= CONTACT_THRESHOLD
    }
}

impl Default for World {
    fn default() -> Self {
        World {
            min_x: 0,
            max_x: 100,
            min_y: 0,
            max_y: 100,
        }
    }
}

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn empty_extent_is_rejected() {
        assert!(matches!(
            World::new(0, 0, 0, 10),
            Err(EpidemicError::InvalidParameter(_))
        ));
        assert!(World::new(5, 1, 0, 10).is_err());
    }

    #[test]
    fn distance_is_normalized_per_axis() {
        let world = World::new(0, 200, 0, 50).unwrap();
        // Half of each extent in both directions.
        let d = world.distance(Position::new(0, 0), Position::new(100, 25));
        assert_approx_eq!(d, (0.5_f64 * 0.5 + 0.5 * 0.5).sqrt());
        assert_approx_eq!(world.distance(Position::new(3, 4), Position::new(3, 4)), 0.0);
    }

    #[test]
    fn distance_across_a_world_wider_than_i32() {
        let world = World::new(-2_000_000_000, 2_000_000_000, 0, 10).unwrap();
        let d = world.distance(
            Position::new(-2_000_000_000, 0),
            Position::new(2_000_000_000, 0),
        );
        assert_approx_eq!(d, 1.0);
        assert!(world.is_close(Position::new(i32::MIN + 1, 5), Position::new(i32::MIN + 1, 5)));
    }

    #[test]
    fn contact_threshold_scales_with_world() {
        let small = World::new(0, 100, 0, 100).unwrap();
        let large = World::new(0, 1000, 0, 1000).unwrap();
        assert!(small.is_close(Position::new(10, 10), Position::new(11, 10)));
        assert!(!small.is_close(Position::new(10, 10), Position::new(12, 10)));
        assert!(large.is_close(Position::new(10, 10), Position::new(20, 10)));
    }

    #[test]
    fn random_positions_stay_in_bounds() {
        let world = World::new(-5, 5, 10, 12).unwrap();
        let random = RngStore::new(3);
        for _ in 0..200 {
            assert!(world.contains(world.random_position(&random)));
        }
    }

    #[test]
    fn deserialization_validates_bounds() {
        let world: World =
            serde_json::from_str(r#"{"min_x": 0, "max_x": 10, "min_y": 0, "max_y": 20}"#).unwrap();
        assert_eq!(world, World::new(0, 10, 0, 20).unwrap());
        assert!(
            serde_json::from_str::<World>(r#"{"min_x": 0, "max_x": 0, "min_y": 0, "max_y": 20}"#)
                .is_err()
        );
    }
}
