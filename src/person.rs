//! A simulated person: body, infection, immunity and whereabouts.
//!
//! How a person reacts to each part of the day depends on their [`HealthState`]; the transitions
//! themselves live in [`crate::state`]. This module holds the biology they rely on.
use std::fmt::{self, Display};

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::error::EpidemicError;
use crate::geometry::Position;
use crate::hospital::HospitalId;
use crate::state::HealthState;
use crate::virus::{DiseaseKind, Virus};

pub const NORMAL_TEMPERATURE: f64 = 36.6;
/// Share of body weight that is water in a healthy, hydrated person.
pub const MAX_WATER_RATIO: f64 = 0.6;

pub const LIFE_THREATENING_TEMPERATURE: f64 = 40.0;
pub const LIFE_THREATENING_WATER_RATIO: f64 = 0.5;
pub const MAX_TEMPERATURE_TO_SURVIVE: f64 = 44.0;
pub const LOWEST_WATER_RATIO_TO_SURVIVE: f64 = 0.4;

/// Index of a person in the simulation's population.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct PersonId(pub usize);

impl Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Where a person heads during the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mobility {
    /// Proposes a uniformly random position every day.
    Wanderer,
    /// Always proposes the same shared community location.
    Community(Position),
}

#[derive(Debug, Clone)]
pub struct Person {
    pub(crate) position: Position,
    home: Position,
    mobility: Mobility,
    age: u32,
    weight: f64,
    pub(crate) temperature: f64,
    pub(crate) water: f64,
    pub(crate) virus: Option<Virus>,
    pub(crate) antibodies: FxHashSet<DiseaseKind>,
    pub(crate) state: HealthState,
    pub(crate) hospital: Option<HospitalId>,
}

impl Person {
    /// Creates a healthy, hydrated wanderer at home with normal temperature.
    ///
    /// # Errors
    ///
    /// Returns `EpidemicError::InvalidPerson` if `age` is zero (the immune response divides
    /// by it) or `weight` is not a positive number.
    pub fn new(home: Position, age: u32, weight: f64) -> Result<Person, EpidemicError> {
        if age == 0 {
            return Err(EpidemicError::InvalidPerson("age must be at least 1".to_string()));
        }
        if !(weight.is_finite() && weight > 0.0) {
            return Err(EpidemicError::InvalidPerson(format!(
                "weight must be positive, got {weight}"
            )));
        }
        Ok(Person {
            position: home,
            home,
            mobility: Mobility::Wanderer,
            age,
            weight,
            temperature: NORMAL_TEMPERATURE,
            water: MAX_WATER_RATIO * weight,
            virus: None,
            antibodies: FxHashSet::default(),
            state: HealthState::Healthy,
            hospital: None,
        })
    }

    #[must_use]
    pub fn with_mobility(mut self, mobility: Mobility) -> Person {
        self.mobility = mobility;
        self
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.position
    }

    #[must_use]
    pub fn home(&self) -> Position {
        self.home
    }

    #[must_use]
    pub fn mobility(&self) -> Mobility {
        self.mobility
    }

    #[must_use]
    pub fn age(&self) -> u32 {
        self.age
    }

    #[must_use]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    #[must_use]
    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    #[must_use]
    pub fn water(&self) -> f64 {
        self.water
    }

    #[must_use]
    pub fn virus(&self) -> Option<&Virus> {
        self.virus.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &HealthState {
        &self.state
    }

    #[must_use]
    pub fn hospital(&self) -> Option<HospitalId> {
        self.hospital
    }

    #[must_use]
    pub fn has_antibody(&self, kind: DiseaseKind) -> bool {
        self.antibodies.contains(&kind)
    }

    pub fn antibodies(&self) -> impl Iterator<Item = DiseaseKind> + '_ {
        self.antibodies.iter().copied()
    }

    #[must_use]
    pub fn max_water(&self) -> f64 {
        MAX_WATER_RATIO * self.weight
    }

    #[must_use]
    pub fn water_ratio(&self) -> f64 {
        self.water / self.weight
    }

    #[must_use]
    pub fn is_life_threatening_condition(&self) -> bool {
        self.temperature >= LIFE_THREATENING_TEMPERATURE
            || self.water_ratio() <= LIFE_THREATENING_WATER_RATIO
    }

    #[must_use]
    pub fn is_life_incompatible_condition(&self) -> bool {
        self.temperature >= MAX_TEMPERATURE_TO_SURVIVE
            || self.water_ratio() <= LOWEST_WATER_RATIO_TO_SURVIVE
    }

    pub(crate) fn raise_temperature(&mut self, amount: f64) {
        self.temperature += amount;
    }

    pub(crate) fn set_temperature(&mut self, temperature: f64) {
        self.temperature = temperature;
    }

    pub(crate) fn lose_water(&mut self, amount: f64) {
        self.water = (self.water - amount).max(0.0);
    }

    pub(crate) fn set_water(&mut self, water: f64) {
        self.water = water.clamp(0.0, self.max_water());
    }

    /// Applies the virus's daily symptom effect, if infected.
    pub(crate) fn progress_disease(&mut self) {
        if let Some(kind) = self.virus.as_ref().map(Virus::kind) {
            kind.cause_symptoms(self);
        }
    }

    /// One night of immune response: the virus loses `3 / age` strength, so younger people
    /// recover faster.
    pub(crate) fn fight_virus(&mut self) {
        let decay = 3.0 / f64::from(self.age);
        if let Some(virus) = self.virus.as_mut() {
            virus.weaken(decay);
        }
    }

    pub(crate) fn go_home(&mut self) {
        self.position = self.home;
    }
}

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;

    use super::*;

    #[test]
    fn new_person_is_healthy_and_hydrated() {
        let person = Person::new(Position::new(3, 4), 40, 80.0).unwrap();
        assert_eq!(person.position(), Position::new(3, 4));
        assert_approx_eq!(person.water(), 48.0);
        assert_approx_eq!(person.temperature(), NORMAL_TEMPERATURE);
        assert!(person.virus().is_none());
        assert_eq!(person.state(), &HealthState::Healthy);
        assert!(!person.is_life_threatening_condition());
    }

    #[test]
    fn zero_age_is_rejected() {
        assert!(matches!(
            Person::new(Position::default(), 0, 70.0),
            Err(EpidemicError::InvalidPerson(_))
        ));
        assert!(Person::new(Position::default(), 20, 0.0).is_err());
        assert!(Person::new(Position::default(), 20, f64::NAN).is_err());
    }

    #[test]
    fn severity_thresholds() {
        let mut person = Person::new(Position::default(), 30, 100.0).unwrap();
        person.set_temperature(40.0);
        assert!(person.is_life_threatening_condition());
        assert!(!person.is_life_incompatible_condition());
        person.set_temperature(44.0);
        assert!(person.is_life_incompatible_condition());

        let mut dry = Person::new(Position::default(), 30, 100.0).unwrap();
        dry.set_water(50.0);
        assert!(dry.is_life_threatening_condition());
        assert!(!dry.is_life_incompatible_condition());
        dry.lose_water(10.0);
        assert!(dry.is_life_incompatible_condition());
    }

    #[test]
    fn water_stays_within_bounds() {
        let mut person = Person::new(Position::default(), 30, 50.0).unwrap();
        person.lose_water(100.0);
        assert_approx_eq!(person.water(), 0.0);
        person.set_water(1000.0);
        assert_approx_eq!(person.water(), 30.0);
    }

    #[test]
    fn immune_response_depends_on_age() {
        let mut young = Person::new(Position::default(), 3, 70.0).unwrap();
        young.virus = Some(Virus::new(DiseaseKind::SarsCov2, 2.0, 1.0));
        young.fight_virus();
        assert_approx_eq!(young.virus().unwrap().strength(), 1.0);

        let mut old = Person::new(Position::default(), 60, 70.0).unwrap();
        old.virus = Some(Virus::new(DiseaseKind::SarsCov2, 2.0, 1.0));
        old.fight_virus();
        assert_approx_eq!(old.virus().unwrap().strength(), 1.95);
    }
}
