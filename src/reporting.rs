//! CSV reports of a run: per-disease daily counts, a daily census and the policy history.
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::context::Context;
use crate::define_report;
use crate::error::EpidemicError;
use crate::events::SimulationEvent;
use crate::log::error;
use crate::report::ContextReportExt;
use crate::virus::DiseaseKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct DailyReport {
    pub day: u32,
    pub disease: String,
    pub infections: usize,
    pub recoveries: usize,
    pub antibodies: usize,
    pub deaths: usize,
}

define_report!(DailyReport);

#[derive(Debug, Serialize, Deserialize)]
pub struct CensusReport {
    pub day: u32,
    pub admissions: usize,
    pub discharges: usize,
    pub hospitalized: usize,
    pub alive: usize,
    pub dead: usize,
    pub policy: String,
}

define_report!(CensusReport);

#[derive(Debug, Serialize, Deserialize)]
pub struct PolicyReport {
    pub day: u32,
    pub policy: String,
}

define_report!(PolicyReport);

fn send_day_reports(context: &Context, day: u32) -> Result<(), EpidemicError> {
    let Some(tally) = context.statistics().last_day() else {
        return Ok(());
    };
    for kind in DiseaseKind::iter() {
        let count = |counts: &std::collections::BTreeMap<DiseaseKind, usize>| {
            counts.get(&kind).copied().unwrap_or_default()
        };
        context.send_report(DailyReport {
            day,
            disease: kind.to_string(),
            infections: count(&tally.infections),
            recoveries: count(&tally.recoveries),
            antibodies: count(&tally.antibodies),
            deaths: count(&tally.deaths),
        })?;
    }
    context.send_report(CensusReport {
        day,
        admissions: tally.admissions,
        discharges: tally.discharges,
        hospitalized: context.statistics().hospitalized(),
        alive: context.alive_count(),
        dead: context.dead_count(),
        policy: context.policy().to_string(),
    })
}

/// Opens the `daily`, `census` and `policy` reports and writes their rows as the run goes.
///
/// # Errors
///
/// Returns an `EpidemicError` if any of the report files cannot be created.
pub fn init(context: &mut Context) -> Result<(), EpidemicError> {
    context.add_report::<DailyReport>("daily")?;
    context.add_report::<CensusReport>("census")?;
    context.add_report::<PolicyReport>("policy")?;

    context.subscribe_to_events(|context, event| {
        let result = match event {
            SimulationEvent::DayEnded { day } => send_day_reports(context, *day),
            SimulationEvent::PolicyChanged { policy } => context.send_report(PolicyReport {
                day: context.current_day(),
                policy: policy.to_string(),
            }),
            _ => Ok(()),
        };
        if let Err(e) = result {
            error!("failed to write report row: {e}");
        }
    });
    Ok(())
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use tempfile::tempdir;

    use super::*;
    use crate::geometry::{Position, World};
    use crate::person::Person;
    use crate::policy::Policy;
    use crate::state::HealthState;

    fn read_rows<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
        csv::Reader::from_path(path)
            .unwrap()
            .deserialize()
            .map(Result::unwrap)
            .collect()
    }

    #[test]
    fn one_row_per_day_and_disease() {
        let temp_dir = tempdir().unwrap();
        let mut context = Context::new(World::default());
        context.init_random(2);
        context
            .report_options()
            .directory(temp_dir.path().to_path_buf())
            .file_prefix("test_".to_string());
        init(&mut context).unwrap();

        let mut carrier = Person::new(Position::new(5, 5), 40, 70.0).unwrap();
        carrier.virus = Some(crate::virus::Virus::new(DiseaseKind::Cholera, 5.0, 1.0));
        carrier.state = HealthState::Asymptomatic { days_sick: 4 };
        context.add_person(carrier).unwrap();
        context
            .add_person(Person::new(Position::new(90, 90), 40, 70.0).unwrap())
            .unwrap();
        context.execute(3);

        let daily: Vec<DailyReport> = read_rows(&temp_dir.path().join("test_daily.csv"));
        assert_eq!(daily.len(), 9);
        let cholera_day0 = daily
            .iter()
            .find(|row| row.day == 0 && row.disease == "cholera")
            .unwrap();
        assert_eq!(cholera_day0.infections, 1);

        let census: Vec<CensusReport> = read_rows(&temp_dir.path().join("test_census.csv"));
        assert_eq!(
            census.iter().map(|row| row.day).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert!(census.iter().all(|row| row.alive + row.dead == 2));

        // One infection in a population of two exceeds the 5% threshold.
        let policies: Vec<PolicyReport> = read_rows(&temp_dir.path().join("test_policy.csv"));
        assert_eq!(policies[0].day, 1);
        assert_eq!(policies[0].policy, Policy::ppe(0.8).to_string());
    }
}
