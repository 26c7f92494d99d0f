//! Disease kinds and the active infections people carry.
use rand_distr::Exp;
use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use crate::define_rng;
use crate::error::EpidemicError;
use crate::log::trace;
use crate::person::Person;
use crate::random::{ContextRandomExt, RngStore};

define_rng!(VirusRng);

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DiseaseKind {
    SeasonalFlu,
    /// Severe respiratory virus (SARS-CoV-2).
    SarsCov2,
    Cholera,
}

impl DiseaseKind {
    /// Parses a configured disease name.
    ///
    /// # Errors
    ///
    /// Returns `EpidemicError::UnknownDisease` for names that are not a `DiseaseKind`.
    pub fn parse(name: &str) -> Result<DiseaseKind, EpidemicError> {
        name.parse()
            .map_err(|_| EpidemicError::UnknownDisease(name.to_string()))
    }

    /// Rate of the exponential distribution that a fresh infection's strength and
    /// contagiousness are drawn from. Lower rates mean stronger, longer infections.
    #[must_use]
    pub fn rate(self) -> f64 {
        match self {
            DiseaseKind::SeasonalFlu => 10.0,
            DiseaseKind::SarsCov2 => 0.42,
            DiseaseKind::Cholera => 2.0,
        }
    }

    /// Applies one day of symptoms to the host.
    pub fn cause_symptoms(self, person: &mut Person) {
        match self {
            DiseaseKind::SeasonalFlu => person.raise_temperature(0.25),
            DiseaseKind::SarsCov2 => person.raise_temperature(0.5),
            DiseaseKind::Cholera => person.lose_water(1.0),
        }
    }
}

/// An active infection, owned by the infected person.
#[derive(Debug, Clone, PartialEq)]
pub struct Virus {
    kind: DiseaseKind,
    pub(crate) strength: f64,
    contagiousness: f64,
}

impl Virus {
    #[must_use]
    pub fn new(kind: DiseaseKind, strength: f64, contagiousness: f64) -> Virus {
        Virus {
            kind,
            strength,
            contagiousness,
        }
    }

    /// Instantiates a fresh infection for a newly infected host, drawing strength and
    /// contagiousness independently from the kind's exponential distribution.
    pub fn infect(kind: DiseaseKind, random: &RngStore) -> Virus {
        let distribution = Exp::new(kind.rate()).expect("disease rates are positive and finite");
        let strength = random.sample_distr(VirusRng, distribution);
        let contagiousness = random.sample_distr(VirusRng, distribution);
        trace!("new {kind} virus with strength={strength:.2}");
        Virus::new(kind, strength, contagiousness)
    }

    #[must_use]
    pub fn kind(&self) -> DiseaseKind {
        self.kind
    }

    #[must_use]
    pub fn strength(&self) -> f64 {
        self.strength
    }

    /// Reserved for transmission models that weigh contacts; the current transmission
    /// check does not consult it.
    #[must_use]
    pub fn contagiousness(&self) -> f64 {
        self.contagiousness
    }

    /// Strength only ever decreases through treatment and the immune response.
    pub(crate) fn weaken(&mut self, amount: f64) {
        self.strength -= amount.max(0.0);
    }

    #[must_use]
    pub fn is_cured(&self) -> bool {
        self.strength <= 0.0
    }
}

#[cfg(test)]
mod test {
    use assert_approx_eq::assert_approx_eq;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::geometry::Position;

    #[test]
    fn disease_names_round_trip() {
        for kind in DiseaseKind::iter() {
            assert_eq!(DiseaseKind::parse(&kind.to_string()).unwrap(), kind);
        }
        assert_eq!(
            DiseaseKind::parse("sars_cov2").unwrap(),
            DiseaseKind::SarsCov2
        );
    }

    #[test]
    fn unknown_disease_is_a_configuration_error() {
        match DiseaseKind::parse("measles") {
            Err(EpidemicError::UnknownDisease(name)) => assert_eq!(name, "measles"),
            other => panic!("expected UnknownDisease, got {other:?}"),
        }
    }

    #[test]
    fn symptoms_per_kind() {
        let mut person = Person::new(Position::new(0, 0), 30, 70.0).unwrap();
        DiseaseKind::SeasonalFlu.cause_symptoms(&mut person);
        assert_approx_eq!(person.temperature(), 36.85);
        DiseaseKind::SarsCov2.cause_symptoms(&mut person);
        assert_approx_eq!(person.temperature(), 37.35);
        DiseaseKind::Cholera.cause_symptoms(&mut person);
        assert_approx_eq!(person.water(), 41.0);
    }

    #[test]
    fn severe_respiratory_infections_are_stronger_on_average() {
        let random = RngStore::new(11);
        let mean = |kind| {
            (0..2000)
                .map(|_| Virus::infect(kind, &random).strength())
                .sum::<f64>()
                / 2000.0
        };
        let flu = mean(DiseaseKind::SeasonalFlu);
        let sars = mean(DiseaseKind::SarsCov2);
        // Means of Exp(10) and Exp(0.42) are 0.1 and ~2.38.
        assert!(flu < 0.2, "flu mean {flu}");
        assert!(sars > 1.5, "sars mean {sars}");
    }

    #[test]
    fn weaken_never_strengthens() {
        let mut virus = Virus::new(DiseaseKind::Cholera, 1.0, 0.5);
        virus.weaken(-3.0);
        assert_approx_eq!(virus.strength(), 1.0);
        virus.weaken(1.0);
        assert!(virus.is_cured());
    }
}
