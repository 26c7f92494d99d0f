//! Drugs and the catalogs hospitals stock them from.
//!
//! The two catalogs expose the same interface and differ only in what they hand out: the cheap
//! one dispenses weak symptom relief and placebos, the expensive one full-strength drugs and
//! real antivirals.
use std::fmt::Debug;

use crate::person::{Person, NORMAL_TEMPERATURE};
use crate::virus::DiseaseKind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Drug {
    /// Cheap antifever: lowers temperature by half the dose, never below normal.
    Aspirin { dose: f64 },
    /// Restores normal temperature.
    Ibuprofen { dose: f64 },
    /// Cheap rehydration: restores a tenth of the dose, up to full hydration.
    Glucose { dose: f64 },
    /// Restores full hydration.
    Rehydron { dose: f64 },
    Placebo { dose: f64 },
    /// Also cross-reacts against SARS-CoV-2 at a tenth of its efficiency.
    SeasonalFluAntivirus { dose: f64 },
    SarsAntivirus { dose: f64 },
    CholeraAntivirus { dose: f64 },
}

impl Drug {
    pub fn apply(&self, person: &mut Person) {
        match *self {
            Drug::Aspirin { dose } => {
                let lowered = person.temperature() - dose * 0.5;
                person.set_temperature(lowered.max(NORMAL_TEMPERATURE));
            }
            Drug::Ibuprofen { .. } => person.set_temperature(NORMAL_TEMPERATURE),
            Drug::Glucose { dose } => person.set_water(person.water() + dose * 0.1),
            Drug::Rehydron { .. } => person.set_water(person.max_water()),
            Drug::Placebo { .. } => {}
            Drug::SeasonalFluAntivirus { dose } => {
                weaken_if(person, DiseaseKind::SeasonalFlu, dose);
                weaken_if(person, DiseaseKind::SarsCov2, dose / 10.0);
            }
            Drug::SarsAntivirus { dose } => weaken_if(person, DiseaseKind::SarsCov2, dose * 0.1),
            Drug::CholeraAntivirus { dose } => weaken_if(person, DiseaseKind::Cholera, dose * 0.1),
        }
    }
}

fn weaken_if(person: &mut Person, target: DiseaseKind, amount: f64) {
    if let Some(virus) = person.virus.as_mut().filter(|v| v.kind() == target) {
        virus.weaken(amount);
    }
}

pub trait DrugCatalog: Debug {
    fn get_antifever(&self, dose: f64) -> Drug;
    fn get_rehydration(&self, dose: f64) -> Drug;
    fn get_seasonal_antivirus(&self, dose: f64) -> Drug;
    fn get_sars_antivirus(&self, dose: f64) -> Drug;
    fn get_cholera_antivirus(&self, dose: f64) -> Drug;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct CheapDrugCatalog;

impl DrugCatalog for CheapDrugCatalog {
    fn get_antifever(&self, dose: f64) -> Drug {
        Drug::Aspirin { dose }
    }

    fn get_rehydration(&self, dose: f64) -> Drug {
        Drug::Glucose { dose }
    }

    fn get_seasonal_antivirus(&self, dose: f64) -> Drug {
        Drug::Placebo { dose }
    }

    fn get_sars_antivirus(&self, dose: f64) -> Drug {
        Drug::Placebo { dose }
    }

    fn get_cholera_antivirus(&self, dose: f64) -> Drug {
        Drug::Placebo { dose }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ExpensiveDrugCatalog;

impl DrugCatalog for ExpensiveDrugCatalog {
    fn get_antifever(&self, dose: f64) -> Drug {
        Drug::Ibuprofen { dose }
    }

    fn get_rehydration(&self, dose: f64) -> Drug {
        Drug::Rehydron { dose }
    }

    fn get_seasonal_antivirus(&self, dose: f64) -> Drug {
        Drug::SeasonalFluAntivirus { dose }
    }

    fn get_sars_antivirus(&self, dose: f64) -> Drug {
        Drug::SarsAntivirus { dose }
    }

    fn get_cholera_antivirus(&self, dose: f64) -> Drug {
        Drug::CholeraAntivirus { dose }
    }
}
