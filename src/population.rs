//! Building the population and the hospitals a run starts with.
use std::collections::BTreeMap;

use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::context::Context;
use crate::define_rng;
use crate::drugs::{CheapDrugCatalog, DrugCatalog, ExpensiveDrugCatalog};
use crate::error::EpidemicError;
use crate::geometry::{Position, World};
use crate::hospital::Hospital;
use crate::log::{debug, info};
use crate::parameters::PopulationGroup;
use crate::person::{Mobility, Person, PersonId};
use crate::random::{ContextRandomExt, RngStore};
use crate::virus::DiseaseKind;

define_rng!(PopulationRng);
define_rng!(HospitalRng);

pub const MIN_AGE: u32 = 1;
pub const MAX_AGE: u32 = 90;
pub const MIN_WEIGHT: u32 = 30;
pub const MAX_WEIGHT: u32 = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum PersonVariant {
    /// Heads somewhere random every day.
    Wanderer,
    /// Heads to a shared destination every day.
    Community,
}

impl PersonVariant {
    /// # Errors
    ///
    /// Returns `EpidemicError::UnknownPersonVariant` for names that are not a `PersonVariant`.
    pub fn parse(name: &str) -> Result<PersonVariant, EpidemicError> {
        name.parse()
            .map_err(|_| EpidemicError::UnknownPersonVariant(name.to_string()))
    }
}

/// Produces people of one variant with a random home, age and weight.
#[derive(Debug, Clone, Copy)]
pub struct PersonFactory {
    world: World,
    mobility: Mobility,
}

impl PersonFactory {
    #[must_use]
    pub fn wanderer(world: World) -> PersonFactory {
        PersonFactory {
            world,
            mobility: Mobility::Wanderer,
        }
    }

    #[must_use]
    pub fn community(world: World, destination: Position) -> PersonFactory {
        PersonFactory {
            world,
            mobility: Mobility::Community(destination),
        }
    }

    /// # Errors
    ///
    /// Returns `EpidemicError::InvalidParameter` for a community without a destination inside
    /// the world.
    pub fn for_variant(
        variant: PersonVariant,
        world: World,
        destination: Option<Position>,
    ) -> Result<PersonFactory, EpidemicError> {
        match (variant, destination) {
            (PersonVariant::Wanderer, _) => Ok(PersonFactory::wanderer(world)),
            (PersonVariant::Community, Some(destination)) if world.contains(destination) => {
                Ok(PersonFactory::community(world, destination))
            }
            (PersonVariant::Community, Some(destination)) => {
                Err(EpidemicError::InvalidParameter(format!(
                    "community destination {destination} lies outside the world"
                )))
            }
            (PersonVariant::Community, None) => Err(EpidemicError::InvalidParameter(
                "community members need a destination".to_string(),
            )),
        }
    }

    /// # Errors
    ///
    /// Propagates the construction error of [`Person::new`]; the drawn attributes always
    /// satisfy it.
    pub fn create_person(&self, random: &RngStore) -> Result<Person, EpidemicError> {
        let home = self.world.random_position_from(random, PopulationRng);
        let age = random.sample_range(PopulationRng, MIN_AGE..=MAX_AGE);
        let weight: u32 = random.sample_range(PopulationRng, MIN_WEIGHT..=MAX_WEIGHT);
        Ok(Person::new(home, age, f64::from(weight))?.with_mobility(self.mobility))
    }
}

/// Adds every configured group of people to the context, in order.
///
/// # Errors
///
/// Returns an `EpidemicError` for an unknown variant or a community without a destination.
pub fn create_population(
    context: &mut Context,
    groups: &[PopulationGroup],
) -> Result<(), EpidemicError> {
    let world = *context.world();
    for group in groups {
        let variant = PersonVariant::parse(&group.variant)?;
        let factory = PersonFactory::for_variant(variant, world, group.destination)?;
        for _ in 0..group.count {
            let person = factory.create_person(context.rng_store())?;
            context.add_person(person)?;
        }
        debug!("created {} {variant} people", group.count);
    }
    info!("population of {} people created", context.people().len());
    Ok(())
}

/// Creates `count` hospitals, each stocking the expensive catalog with probability
/// `expensive_probability` and the cheap one otherwise.
#[must_use]
pub fn create_hospitals(
    count: usize,
    capacity: usize,
    expensive_probability: f64,
    random: &RngStore,
) -> Vec<Hospital> {
    (0..count)
        .map(|_| {
            let catalog: Box<dyn DrugCatalog> =
                if random.sample_bool(HospitalRng, expensive_probability) {
                    Box::new(ExpensiveDrugCatalog)
                } else {
                    Box::new(CheapDrugCatalog)
                };
            Hospital::new(capacity, catalog)
        })
        .collect()
}

/// Infects, for each configured disease, the first people who can still catch it.
///
/// # Errors
///
/// Returns `EpidemicError::UnknownDisease` for an unknown disease name, and
/// `EpidemicError::InvalidParameter` if there are not enough susceptible people.
pub fn seed_infections(
    context: &mut Context,
    infections: &BTreeMap<String, usize>,
) -> Result<(), EpidemicError> {
    for (name, &count) in infections {
        let kind = DiseaseKind::parse(name)?;
        let mut infected = 0;
        let mut index = 0;
        while infected < count && index < context.people().len() {
            if context.infect(PersonId(index), kind)? {
                infected += 1;
            }
            index += 1;
        }
        if infected < count {
            return Err(EpidemicError::InvalidParameter(format!(
                "only {infected} of {count} {kind} infections could be seeded"
            )));
        }
        debug!("seeded {count} {kind} infections");
    }
    Ok(())
}
