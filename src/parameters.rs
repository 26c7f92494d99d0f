//! Run configuration, loaded from a JSON file.
//!
//! Every field has a default, so a configuration file only needs to name what it changes:
//!
//! ```json
//! {
//!   "seed": 7,
//!   "days": 60,
//!   "population": [
//!     {"variant": "wanderer", "count": 300},
//!     {"variant": "community", "count": 100, "destination": {"x": 20, "y": 80}}
//!   ],
//!   "initial_infections": {"sars_cov2": 5},
//!   "initial_policy": {"kind": "district_lockdown", "strength": 0.5}
//! }
//! ```
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EpidemicError;
use crate::geometry::{Position, World};
use crate::hospital::PolicyGuidelines;
use crate::log::trace;
use crate::policy::Policy;
use crate::population::{PersonFactory, PersonVariant};
use crate::virus::DiseaseKind;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PopulationGroup {
    pub variant: String,
    pub count: usize,
    #[serde(default)]
    pub destination: Option<Position>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HospitalParameters {
    pub count: usize,
    pub capacity: usize,
    /// Probability that a hospital stocks the expensive drug catalog.
    pub expensive_probability: f64,
}

impl Default for HospitalParameters {
    fn default() -> Self {
        HospitalParameters {
            count: 5,
            capacity: 100,
            expensive_probability: 0.3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    pub seed: u64,
    pub days: u32,
    pub world: World,
    pub population: Vec<PopulationGroup>,
    pub hospitals: HospitalParameters,
    /// Number of people infected before the first day, by disease name.
    pub initial_infections: BTreeMap<String, usize>,
    pub initial_policy: Policy,
    pub guidelines: PolicyGuidelines,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            seed: 0,
            days: 30,
            world: World::default(),
            population: vec![
                PopulationGroup {
                    variant: PersonVariant::Wanderer.to_string(),
                    count: 750,
                    destination: None,
                },
                PopulationGroup {
                    variant: PersonVariant::Community.to_string(),
                    count: 250,
                    destination: Some(Position::new(50, 50)),
                },
            ],
            hospitals: HospitalParameters::default(),
            initial_infections: BTreeMap::from([
                (DiseaseKind::SeasonalFlu.to_string(), 10),
                (DiseaseKind::SarsCov2.to_string(), 5),
                (DiseaseKind::Cholera.to_string(), 5),
            ]),
            initial_policy: Policy::Unrestricted,
            guidelines: PolicyGuidelines::default(),
        }
    }
}

fn check_fraction(name: &str, value: f64) -> Result<(), EpidemicError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(EpidemicError::InvalidParameter(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

impl Parameters {
    /// Reads and validates parameters from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an `EpidemicError` if the file cannot be read or parsed, or the parameters
    /// fail [`Parameters::validate`].
    pub fn load(path: &Path) -> Result<Parameters, EpidemicError> {
        trace!("loading parameters from {}", path.display());
        let reader = BufReader::new(File::open(path)?);
        let parameters: Parameters = serde_json::from_reader(reader)?;
        parameters.validate()?;
        Ok(parameters)
    }

    /// # Errors
    ///
    /// Returns the first configuration error found: an unknown disease or person variant, a
    /// community without a destination in the world, an invalid policy, a probability or
    /// threshold outside `[0, 1]`, or more initial infections than people.
    pub fn validate(&self) -> Result<(), EpidemicError> {
        for group in &self.population {
            let variant = PersonVariant::parse(&group.variant)?;
            PersonFactory::for_variant(variant, self.world, group.destination)?;
        }
        let population = self.population_size();

        let mut infections = 0;
        for (name, count) in &self.initial_infections {
            DiseaseKind::parse(name)?;
            infections += count;
        }
        if infections > population {
            return Err(EpidemicError::InvalidParameter(format!(
                "{infections} initial infections exceed the population of {population}"
            )));
        }

        check_fraction(
            "hospitals.expensive_probability",
            self.hospitals.expensive_probability,
        )?;
        check_fraction(
            "guidelines.infection_fraction",
            self.guidelines.infection_fraction,
        )?;
        check_fraction("guidelines.death_fraction", self.guidelines.death_fraction)?;

        self.initial_policy.validate()?;
        self.guidelines.infection_policy.validate()?;
        self.guidelines.recovery_policy.validate()?;
        self.guidelines.death_policy.validate()?;
        Ok(())
    }

    #[must_use]
    pub fn population_size(&self) -> usize {
        self.population.iter().map(|g| g.count).sum()
    }
}
