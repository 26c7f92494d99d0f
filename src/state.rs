//! The per-person disease state machine.
//!
//! ```text
//! Healthy --get_infected--> Asymptomatic --5th night--> Symptomatic --cured--> Healthy
//!                                |                           |
//!                                +------ life-incompatible --+--> Dead
//! ```
//!
//! Each transition is local to the state it leaves. Observable side effects are appended to an
//! [`EventLog`] as part of entering the new state; nothing is delivered to listeners until the
//! current phase of the day has finished.
use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};

use crate::events::{EventLog, SimulationEvent};
use crate::geometry::World;
use crate::hospital::HealthAuthority;
use crate::log::debug;
use crate::person::{Mobility, Person, PersonId};
use crate::policy::Policy;
use crate::random::RngStore;
use crate::virus::{DiseaseKind, Virus};

/// Nights an asymptomatic person spends before the symptoms show. The check happens before the
/// counter is incremented, so symptoms start on the night after the counter reaches this value.
pub const DAYS_SICK_TO_FEEL_BAD: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthState {
    Healthy,
    /// Infected and contagious, but unaware of it.
    Asymptomatic {
        days_sick: u32,
    },
    /// Suffering the disease's symptoms and fighting the virus. No longer transmits.
    Symptomatic,
    Dead,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Display, EnumIter, IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StateKind {
    Healthy,
    Asymptomatic,
    Symptomatic,
    Dead,
}

impl HealthState {
    #[must_use]
    pub fn kind(&self) -> StateKind {
        match self {
            HealthState::Healthy => StateKind::Healthy,
            HealthState::Asymptomatic { .. } => StateKind::Asymptomatic,
            HealthState::Symptomatic => StateKind::Symptomatic,
            HealthState::Dead => StateKind::Dead,
        }
    }

    #[must_use]
    pub fn is_alive(&self) -> bool {
        !matches!(self, HealthState::Dead)
    }
}

/// Read-only view of the shared simulation state that people consult during a day.
#[derive(Clone, Copy)]
pub struct Environment<'a> {
    pub world: &'a World,
    pub policy: &'a Policy,
    pub random: &'a RngStore,
}

impl Person {
    pub fn day_actions(
        &mut self,
        id: PersonId,
        env: &Environment,
        authority: &mut HealthAuthority,
        events: &mut EventLog,
    ) {
        match self.state {
            HealthState::Healthy => self.attempt_move(env),
            HealthState::Asymptomatic { .. } => {
                self.attempt_move(env);
                if self.is_life_incompatible_condition() {
                    self.enter_dead(id, authority, events);
                }
            }
            HealthState::Symptomatic => {
                self.progress_disease();
                if self.is_life_threatening_condition() && self.hospital.is_none() {
                    self.hospital = authority.hospitalize(id, events);
                }
                if self.is_life_incompatible_condition() {
                    self.enter_dead(id, authority, events);
                }
            }
            HealthState::Dead => {}
        }
    }

    pub fn night_actions(
        &mut self,
        id: PersonId,
        authority: &mut HealthAuthority,
        events: &mut EventLog,
    ) {
        match self.state {
            HealthState::Healthy => self.go_home(),
            HealthState::Asymptomatic { days_sick } => {
                self.go_home();
                if days_sick == DAYS_SICK_TO_FEEL_BAD {
                    self.enter_symptomatic(id, events);
                } else {
                    self.state = HealthState::Asymptomatic {
                        days_sick: days_sick + 1,
                    };
                }
            }
            HealthState::Symptomatic => {
                self.fight_virus();
                if self.virus.as_ref().is_some_and(Virus::is_cured) {
                    self.cure(id, authority, events);
                }
            }
            HealthState::Dead => {}
        }
    }

    /// A contact with someone close by. Returns the disease kind to pass on when this person
    /// is contagious and the active policy lets the contact transmit.
    #[must_use]
    pub fn interact(&self, env: &Environment) -> Option<DiseaseKind> {
        match (&self.state, &self.virus) {
            (HealthState::Asymptomatic { .. }, Some(virus)) if env.policy.may_transmit(env.random) => {
                Some(virus.kind())
            }
            _ => None,
        }
    }

    /// Exposure to a disease. Only a healthy person without antibodies against `kind` catches
    /// it, with a freshly drawn virus. Returns whether the person got infected.
    pub fn get_infected(&mut self, id: PersonId, kind: DiseaseKind, random: &RngStore) -> bool {
        if self.state != HealthState::Healthy || self.has_antibody(kind) {
            return false;
        }
        self.virus = Some(Virus::infect(kind, random));
        self.state = HealthState::Asymptomatic { days_sick: 0 };
        debug!("person {id} infected by {kind}");
        true
    }

    fn attempt_move(&mut self, env: &Environment) {
        let target = match self.mobility() {
            Mobility::Wanderer => env.world.random_position(env.random),
            Mobility::Community(destination) => destination,
        };
        if env.policy.may_move(env.world, self.position, target, env.random) {
            self.position = target;
        }
    }

    fn enter_symptomatic(&mut self, id: PersonId, events: &mut EventLog) {
        self.state = HealthState::Symptomatic;
        debug!("person {id} became symptomatic");
        if let Some(kind) = self.virus.as_ref().map(Virus::kind) {
            events.emit(SimulationEvent::InfectionConfirmed { person: id, kind });
        }
    }

    /// Death keeps the virus as the recorded cause and frees any hospital bed.
    fn enter_dead(&mut self, id: PersonId, authority: &mut HealthAuthority, events: &mut EventLog) {
        self.state = HealthState::Dead;
        debug!("person {id} died");
        if let Some(kind) = self.virus.as_ref().map(Virus::kind) {
            events.emit(SimulationEvent::Death { person: id, kind });
        }
        self.leave_hospital(id, authority, events);
    }

    fn cure(&mut self, id: PersonId, authority: &mut HealthAuthority, events: &mut EventLog) {
        let Some(virus) = self.virus.take() else {
            return;
        };
        let kind = virus.kind();
        self.state = HealthState::Healthy;
        self.antibodies.insert(kind);
        debug!("person {id} recovered from {kind}");
        events.emit(SimulationEvent::Recovery { person: id, kind });
        events.emit(SimulationEvent::AntibodyGained { person: id, kind });
        self.leave_hospital(id, authority, events);
    }

    fn leave_hospital(&mut self, id: PersonId, authority: &mut HealthAuthority, events: &mut EventLog) {
        if let Some(hospital) = self.hospital.take() {
            authority.release(hospital, id, events);
        }
    }
}
