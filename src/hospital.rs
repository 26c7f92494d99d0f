//! Hospitals and the health authority that runs them.
//!
//! The authority admits patients first-fit into capacity-bounded hospitals, lets each hospital
//! treat its patients once a day, and re-evaluates the active policy from the previous day's
//! statistics.
use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

use crate::define_rng;
use crate::drugs::DrugCatalog;
use crate::events::{EventLog, SimulationEvent};
use crate::log::{debug, info, trace, warn};
use crate::person::{Person, PersonId};
use crate::policy::Policy;
use crate::prescription::prescribe;
use crate::random::{ContextRandomExt, RngStore};
use crate::statistics::DailyTally;

define_rng!(TreatmentRng);

/// Index of a hospital in the authority's ordered hospital list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct HospitalId(pub usize);

impl Display for HospitalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub struct Hospital {
    capacity: usize,
    catalog: Box<dyn DrugCatalog>,
    patients: Vec<PersonId>,
}

impl fmt::Debug for Hospital {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Hospital(cap={}, n_patients={}, catalog={:?})",
            self.capacity,
            self.patients.len(),
            self.catalog
        )
    }
}

impl Hospital {
    #[must_use]
    pub fn new(capacity: usize, catalog: Box<dyn DrugCatalog>) -> Hospital {
        Hospital {
            capacity,
            catalog,
            patients: Vec::new(),
        }
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn patients(&self) -> &[PersonId] {
        &self.patients
    }

    #[must_use]
    pub fn has_free_bed(&self) -> bool {
        self.patients.len() < self.capacity
    }

    /// Adds the patient if a bed is free. Returns whether the patient was admitted.
    fn admit(&mut self, person: PersonId) -> bool {
        if self.has_free_bed() {
            self.patients.push(person);
            true
        } else {
            false
        }
    }

    /// Removes the patient from the roster. Releasing someone who is not admitted is a no-op.
    pub fn release_patient(&mut self, person: PersonId) -> bool {
        match self.patients.iter().position(|p| *p == person) {
            Some(index) => {
                self.patients.remove(index);
                true
            }
            None => false,
        }
    }

    /// Prescribes and applies two drugs to every patient with an active infection. Doses are
    /// drawn independently for each patient. Roster entries that name no known person are
    /// skipped.
    pub fn treat_patients(&self, people: &mut [Person], random: &RngStore) {
        for &patient_id in &self.patients {
            let Some(patient) = people.get_mut(patient_id.0) else {
                warn!("hospital roster names unknown person {patient_id}");
                continue;
            };
            let Some(kind) = patient.virus().map(|v| v.kind()) else {
                continue;
            };
            let dose1 = random.sample_unit(TreatmentRng);
            let dose2 = random.sample_unit(TreatmentRng);
            let drugs = prescribe(kind, self.catalog.as_ref(), dose1, dose2);
            trace!("treating patient {patient_id} infected by {kind} with {drugs:?}");
            for drug in &drugs {
                drug.apply(patient);
            }
        }
    }
}

/// The thresholds the authority compares the previous day's counts against, and the policies
/// it adopts when they are exceeded. Fractions are of the whole population.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyGuidelines {
    pub infection_fraction: f64,
    pub infection_policy: Policy,
    pub recovery_policy: Policy,
    pub death_fraction: f64,
    pub death_policy: Policy,
}

impl Default for PolicyGuidelines {
    fn default() -> Self {
        PolicyGuidelines {
            infection_fraction: 0.05,
            infection_policy: Policy::ppe(0.8),
            recovery_policy: Policy::Unrestricted,
            death_fraction: 0.01,
            death_policy: Policy::total_lockdown(0.7),
        }
    }
}

#[derive(Debug, Default)]
pub struct HealthAuthority {
    hospitals: Vec<Hospital>,
    guidelines: PolicyGuidelines,
}

impl HealthAuthority {
    #[must_use]
    pub fn new(hospitals: Vec<Hospital>, guidelines: PolicyGuidelines) -> HealthAuthority {
        HealthAuthority {
            hospitals,
            guidelines,
        }
    }

    pub fn add_hospital(&mut self, hospital: Hospital) -> HospitalId {
        self.hospitals.push(hospital);
        HospitalId(self.hospitals.len() - 1)
    }

    #[must_use]
    pub fn hospitals(&self) -> &[Hospital] {
        &self.hospitals
    }

    /// Admits the person into the first hospital with a free bed. Returns `None` when every
    /// hospital is full; that is an ordinary outcome, not an error.
    pub fn hospitalize(&mut self, person: PersonId, events: &mut EventLog) -> Option<HospitalId> {
        let Some((index, hospital)) = self
            .hospitals
            .iter_mut()
            .enumerate()
            .find(|(_, hospital)| hospital.has_free_bed())
        else {
            debug!("no free hospital bed for person {person}");
            return None;
        };
        hospital.admit(person);
        let hospital = HospitalId(index);
        events.emit(SimulationEvent::HospitalAdmitted { person, hospital });
        Some(hospital)
    }

    /// Releases the person from the given hospital, emitting a discharge event if they were
    /// actually admitted there.
    pub fn release(&mut self, hospital: HospitalId, person: PersonId, events: &mut EventLog) {
        let released = self
            .hospitals
            .get_mut(hospital.0)
            .is_some_and(|h| h.release_patient(person));
        if released {
            events.emit(SimulationEvent::HospitalDischarged { person, hospital });
        }
    }

    /// Every hospital treats its current patients.
    pub fn treat_patients(&self, people: &mut [Person], random: &RngStore) {
        for hospital in &self.hospitals {
            hospital.treat_patients(people, random);
        }
    }

    /// Replaces the active policy with the one the guidelines call for, announcing the change.
    pub fn make_policy(
        &self,
        policy: &mut Policy,
        last_day: Option<&DailyTally>,
        population: usize,
        events: &mut EventLog,
    ) {
        let decision = self.review_policy(policy, last_day, population);
        if decision != *policy {
            info!("policy changed from {policy} to {decision}");
            events.emit(SimulationEvent::PolicyChanged {
                policy: decision.clone(),
            });
            *policy = decision;
        }
    }

    /// Decides the policy for the coming day from the previous day's counts. The rules are
    /// checked in order and a later match overrides an earlier one, so deaths can override a
    /// relaxation driven by recoveries. With no completed day yet the current policy stands.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn review_policy(
        &self,
        current: &Policy,
        last_day: Option<&DailyTally>,
        population: usize,
    ) -> Policy {
        let Some(tally) = last_day else {
            return current.clone();
        };
        let population = population as f64;
        let new_infections = tally.new_infections();
        let guidelines = &self.guidelines;

        let mut decision = current;
        if new_infections as f64 > guidelines.infection_fraction * population {
            decision = &guidelines.infection_policy;
        }
        if tally.new_recoveries() > new_infections {
            decision = &guidelines.recovery_policy;
        }
        if tally.new_deaths() as f64 > guidelines.death_fraction * population {
            decision = &guidelines.death_policy;
        }
        decision.clone()
    }
}
