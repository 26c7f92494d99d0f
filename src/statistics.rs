//! Rolling per-day tallies built from simulation events.
//!
//! The current day's tally accumulates until `DayEnded`, when it is pushed onto the history.
//! The health authority bases its decisions on the most recent completed day.
use std::collections::BTreeMap;

use crate::events::SimulationEvent;
use crate::virus::DiseaseKind;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTally {
    pub infections: BTreeMap<DiseaseKind, usize>,
    pub recoveries: BTreeMap<DiseaseKind, usize>,
    pub antibodies: BTreeMap<DiseaseKind, usize>,
    pub deaths: BTreeMap<DiseaseKind, usize>,
    pub admissions: usize,
    pub discharges: usize,
}

fn total(counts: &BTreeMap<DiseaseKind, usize>) -> usize {
    counts.values().sum()
}

impl DailyTally {
    #[must_use]
    pub fn new_infections(&self) -> usize {
        total(&self.infections)
    }

    #[must_use]
    pub fn new_recoveries(&self) -> usize {
        total(&self.recoveries)
    }

    #[must_use]
    pub fn new_antibodies(&self) -> usize {
        total(&self.antibodies)
    }

    #[must_use]
    pub fn new_deaths(&self) -> usize {
        total(&self.deaths)
    }
}

#[derive(Debug, Default)]
pub struct Statistics {
    current: DailyTally,
    history: Vec<DailyTally>,
    policies: Vec<(u32, String)>,
    hospitalized: usize,
}

impl Statistics {
    #[must_use]
    pub fn new() -> Statistics {
        Statistics::default()
    }

    pub fn record(&mut self, day: u32, event: &SimulationEvent) {
        let current = &mut self.current;
        match event {
            SimulationEvent::InfectionConfirmed { kind, .. } => {
                *current.infections.entry(*kind).or_default() += 1;
            }
            SimulationEvent::Death { kind, .. } => {
                *current.deaths.entry(*kind).or_default() += 1;
            }
            SimulationEvent::Recovery { kind, .. } => {
                *current.recoveries.entry(*kind).or_default() += 1;
            }
            SimulationEvent::AntibodyGained { kind, .. } => {
                *current.antibodies.entry(*kind).or_default() += 1;
            }
            SimulationEvent::HospitalAdmitted { .. } => {
                current.admissions += 1;
                self.hospitalized += 1;
            }
            SimulationEvent::HospitalDischarged { .. } => {
                current.discharges += 1;
                self.hospitalized = self.hospitalized.saturating_sub(1);
            }
            SimulationEvent::PolicyChanged { policy } => {
                self.policies.push((day, policy.to_string()));
            }
            SimulationEvent::DayEnded { .. } => {
                self.history.push(std::mem::take(&mut self.current));
            }
        }
    }

    /// The tally of the most recently completed day, if any.
    #[must_use]
    pub fn last_day(&self) -> Option<&DailyTally> {
        self.history.last()
    }

    #[must_use]
    pub fn current_day(&self) -> &DailyTally {
        &self.current
    }

    #[must_use]
    pub fn history(&self) -> &[DailyTally] {
        &self.history
    }

    /// `(day, description)` for every policy change so far.
    #[must_use]
    pub fn policies(&self) -> &[(u32, String)] {
        &self.policies
    }

    /// Patients currently in a hospital bed.
    #[must_use]
    pub fn hospitalized(&self) -> usize {
        self.hospitalized
    }

    #[must_use]
    pub fn total_infections(&self) -> usize {
        self.history.iter().map(DailyTally::new_infections).sum()
    }

    #[must_use]
    pub fn total_deaths(&self) -> usize {
        self.history.iter().map(DailyTally::new_deaths).sum()
    }

    #[must_use]
    pub fn total_recoveries(&self) -> usize {
        self.history.iter().map(DailyTally::new_recoveries).sum()
    }
}
