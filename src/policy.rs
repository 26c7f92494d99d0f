//! Public-health policies: pure decision functions answering "may this person move?" and
//! "does this contact transmit?".
//!
//! A policy is replaced wholesale by the health authority and never mutated in place, so the
//! variants are plain values. Every probabilistic check draws from the policy stream and passes
//! when the draw exceeds the policy strength, i.e. with probability `1 - strength`.
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::define_rng;
use crate::error::EpidemicError;
use crate::geometry::{Position, World};
use crate::random::{ContextRandomExt, RngStore};

define_rng!(PolicyRng);

/// Default district radius, in normalized world units.
pub const DEFAULT_DISTRICT_RADIUS: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Policy {
    /// Nothing is restricted.
    #[default]
    Unrestricted,
    /// People who comply stay within `max_dist` of where they are.
    DistrictLockdown {
        strength: f64,
        #[serde(default = "default_district_radius")]
        max_dist: f64,
    },
    /// People who comply do not move at all.
    TotalLockdown { strength: f64 },
    /// People who comply wear protective equipment and do not transmit.
    Ppe { strength: f64 },
    /// All member policies must agree.
    Combined { policies: Vec<Policy> },
}

fn default_district_radius() -> f64 {
    DEFAULT_DISTRICT_RADIUS
}

impl Policy {
    #[must_use]
    pub fn district_lockdown(strength: f64, max_dist: f64) -> Policy {
        Policy::DistrictLockdown { strength, max_dist }
    }

    #[must_use]
    pub fn total_lockdown(strength: f64) -> Policy {
        Policy::TotalLockdown { strength }
    }

    #[must_use]
    pub fn ppe(strength: f64) -> Policy {
        Policy::Ppe { strength }
    }

    #[must_use]
    pub fn combined(policies: Vec<Policy>) -> Policy {
        Policy::Combined { policies }
    }

    /// Checks strengths lie in `[0, 1]` and district radii in `(0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns `EpidemicError::InvalidPolicy` naming the offending value.
    pub fn validate(&self) -> Result<(), EpidemicError> {
        let check_strength = |strength: f64| {
            if (0.0..=1.0).contains(&strength) {
                Ok(())
            } else {
                Err(EpidemicError::InvalidPolicy(format!(
                    "strength {strength} is outside [0, 1] in {self}"
                )))
            }
        };
        match self {
            Policy::Unrestricted => Ok(()),
            Policy::DistrictLockdown { strength, max_dist } => {
                check_strength(*strength)?;
                if *max_dist > 0.0 && *max_dist <= 1.0 {
                    Ok(())
                } else {
                    Err(EpidemicError::InvalidPolicy(format!(
                        "district radius {max_dist} is outside (0, 1]"
                    )))
                }
            }
            Policy::TotalLockdown { strength } | Policy::Ppe { strength } => {
                check_strength(*strength)
            }
            Policy::Combined { policies } => policies.iter().try_for_each(Policy::validate),
        }
    }

    /// Decides whether a move from `from` to `to` is allowed.
    pub fn may_move(&self, world: &World, from: Position, to: Position, random: &RngStore) -> bool {
        match self {
            Policy::Unrestricted | Policy::Ppe { .. } => true,
            Policy::DistrictLockdown { strength, max_dist } => {
                // Some people ignore the restriction; the rest stay in their district.
                random.sample_unit(PolicyRng) > *strength || world.distance(from, to) < *max_dist
            }
            Policy::TotalLockdown { strength } => random.sample_unit(PolicyRng) > *strength,
            // Every member draws, even after one has refused.
            Policy::Combined { policies } => policies
                .iter()
                .fold(true, |allowed, p| p.may_move(world, from, to, random) & allowed),
        }
    }

    /// Decides whether a single contact transmits infection.
    pub fn may_transmit(&self, random: &RngStore) -> bool {
        match self {
            Policy::Unrestricted
            | Policy::DistrictLockdown { .. }
            | Policy::TotalLockdown { .. } => true,
            Policy::Ppe { strength } => random.sample_unit(PolicyRng) > *strength,
            Policy::Combined { policies } => policies
                .iter()
                .fold(true, |allowed, p| p.may_transmit(random) & allowed),
        }
    }
}

impl Display for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Policy::Unrestricted => write!(f, "Unrestricted"),
            Policy::DistrictLockdown { strength, max_dist } => {
                write!(f, "DistrictLockdown(p={strength:.2}, max_dist={max_dist:.2})")
            }
            Policy::TotalLockdown { strength } => write!(f, "TotalLockdown(p={strength:.2})"),
            Policy::Ppe { strength } => write!(f, "PPE(p={strength:.2})"),
            Policy::Combined { policies } => {
                for (i, policy) in policies.iter().enumerate() {
                    if i > 0 {
                        write!(f, " + ")?;
                    }
                    write!(f, "{policy}")?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn world() -> World {
        World::new(0, 100, 0, 100).unwrap()
    }

    fn move_rate(policy: &Policy, from: Position, to: Position) -> f64 {
        let random = RngStore::new(5);
        let world = world();
        let allowed = (0..4000)
            .filter(|_| policy.may_move(&world, from, to, &random))
            .count();
        allowed as f64 / 4000.0
    }

    #[test]
    fn unrestricted_allows_everything() {
        let random = RngStore::new(1);
        let policy = Policy::Unrestricted;
        assert!(policy.may_move(&world(), Position::new(0, 0), Position::new(100, 100), &random));
        assert!(policy.may_transmit(&random));
    }

    #[test]
    fn full_strength_total_lockdown_never_moves() {
        let policy = Policy::total_lockdown(1.0);
        assert_eq!(move_rate(&policy, Position::new(0, 0), Position::new(5, 5)), 0.0);
        // Transmission is not this policy's concern.
        assert!(policy.may_transmit(&RngStore::new(1)));
    }

    #[test]
    fn zero_strength_ppe_always_transmits() {
        let random = RngStore::new(9);
        let policy = Policy::ppe(0.0);
        assert!((0..1000).all(|_| policy.may_transmit(&random)));
        let full = Policy::ppe(1.0);
        assert!((0..1000).all(|_| !full.may_transmit(&random)));
    }

    #[test]
    fn district_lockdown_allows_short_moves() {
        let policy = Policy::district_lockdown(1.0, 0.5);
        assert_eq!(
            move_rate(&policy, Position::new(10, 10), Position::new(20, 20)),
            1.0
        );
        assert_eq!(
            move_rate(&policy, Position::new(0, 0), Position::new(100, 100)),
            0.0
        );
    }

    #[test]
    fn partial_strength_is_probabilistic() {
        let rate = move_rate(
            &Policy::total_lockdown(0.7),
            Position::new(0, 0),
            Position::new(50, 50),
        );
        assert!((rate - 0.3).abs() < 0.05, "rate {rate}");
    }

    #[test]
    fn combined_is_a_conjunction() {
        let random = RngStore::new(4);
        let policy = Policy::combined(vec![Policy::ppe(1.0), Policy::Unrestricted]);
        assert!(!policy.may_transmit(&random));
        assert!(policy.may_move(&world(), Position::new(0, 0), Position::new(9, 9), &random));

        let lockdown = Policy::combined(vec![Policy::ppe(0.0), Policy::total_lockdown(1.0)]);
        assert!(!lockdown.may_move(&world(), Position::new(0, 0), Position::new(9, 9), &random));
        assert!(lockdown.may_transmit(&random));
    }

    #[test]
    fn validation() {
        assert!(Policy::ppe(0.8).validate().is_ok());
        assert!(Policy::ppe(1.2).validate().is_err());
        assert!(Policy::district_lockdown(0.5, 0.0).validate().is_err());
        assert!(Policy::combined(vec![Policy::total_lockdown(-0.1)])
            .validate()
            .is_err());
    }

    #[test]
    fn descriptions() {
        assert_eq!(Policy::ppe(0.8).to_string(), "PPE(p=0.80)");
        assert_eq!(
            Policy::combined(vec![Policy::total_lockdown(0.7), Policy::district_lockdown(0.5, 0.25)])
                .to_string(),
            "TotalLockdown(p=0.70) + DistrictLockdown(p=0.50, max_dist=0.25)"
        );
    }

    #[test]
    fn deserializes_from_tagged_json() {
        let policy: Policy =
            serde_json::from_str(r#"{"kind": "district_lockdown", "strength": 0.4}"#).unwrap();
        assert_eq!(policy, Policy::district_lockdown(0.4, DEFAULT_DISTRICT_RADIUS));
        let combined: Policy = serde_json::from_str(
            r#"{"kind": "combined", "policies": [{"kind": "ppe", "strength": 0.8}, {"kind": "unrestricted"}]}"#,
        )
        .unwrap();
        assert_eq!(
            combined,
            Policy::combined(vec![Policy::ppe(0.8), Policy::Unrestricted])
        );
    }
}
