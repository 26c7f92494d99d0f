pub use crate::context::Context;
pub use crate::error::EpidemicError;
pub use crate::events::SimulationEvent;
pub use crate::geometry::{Position, World};
pub use crate::hospital::{HealthAuthority, Hospital, HospitalId, PolicyGuidelines};
pub use crate::log::{debug, error, info, trace, warn};
pub use crate::person::{Mobility, Person, PersonId};
pub use crate::policy::Policy;
pub use crate::random::ContextRandomExt;
pub use crate::report::ContextReportExt;
pub use crate::state::{HealthState, StateKind};
pub use crate::virus::DiseaseKind;
pub use crate::{define_report, define_rng};
