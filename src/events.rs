//! Events emitted by state transitions, hospitals and the health authority.
//!
//! Transitions append events to an [`EventLog`] instead of calling listeners directly. The
//! context drains the log after every phase of the day and hands the events to the statistics
//! and to subscribed handlers.
use crate::hospital::HospitalId;
use crate::log::trace;
use crate::person::PersonId;
use crate::policy::Policy;
use crate::virus::DiseaseKind;

#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// A person became symptomatic, which is when an infection gets noticed.
    InfectionConfirmed { person: PersonId, kind: DiseaseKind },
    Death { person: PersonId, kind: DiseaseKind },
    Recovery { person: PersonId, kind: DiseaseKind },
    AntibodyGained { person: PersonId, kind: DiseaseKind },
    HospitalAdmitted { person: PersonId, hospital: HospitalId },
    HospitalDischarged { person: PersonId, hospital: HospitalId },
    PolicyChanged { policy: Policy },
    DayEnded { day: u32 },
}

#[derive(Debug, Default)]
pub struct EventLog {
    events: Vec<SimulationEvent>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> EventLog {
        EventLog::default()
    }

    pub fn emit(&mut self, event: SimulationEvent) {
        trace!("emitting {event:?}");
        self.events.push(event);
    }

    pub fn drain(&mut self) -> Vec<SimulationEvent> {
        std::mem::take(&mut self.events)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
