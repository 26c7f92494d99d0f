//! The simulation context and the day loop that drives it.
//!
//! A `Context` owns everything a run needs: the world, the population, the health authority,
//! the active policy, the random streams, the statistics and the report writers. One call to
//! [`Context::simulate_day`] runs the six phases of a day in a fixed order:
//!
//! 1. the health authority reviews the active policy,
//! 2. every hospital treats its patients,
//! 3. every person acts during the day,
//! 4. every close ordered pair of people interacts,
//! 5. every person acts during the night,
//! 6. the day ends.
//!
//! Events produced during a phase are delivered once the phase is over, first to the
//! statistics and then to the handlers registered with [`Context::subscribe_to_events`].
use std::rc::Rc;

use crate::error::EpidemicError;
use crate::events::{EventLog, SimulationEvent};
use crate::geometry::World;
use crate::hospital::{HealthAuthority, Hospital, HospitalId};
use crate::log::{debug, info};
use crate::person::{Person, PersonId};
use crate::policy::Policy;
use crate::random::{ContextRandomExt, RngStore};
use crate::report::ReportStore;
use crate::state::{Environment, HealthState, StateKind};
use crate::statistics::Statistics;
use crate::virus::DiseaseKind;

type EventHandler = dyn Fn(&mut Context, &SimulationEvent);

pub struct Context {
    world: World,
    people: Vec<Person>,
    health_authority: HealthAuthority,
    policy: Policy,
    random: RngStore,
    statistics: Statistics,
    pub(crate) reports: ReportStore,
    events: EventLog,
    event_handlers: Vec<Rc<EventHandler>>,
    current_day: u32,
}

impl Context {
    /// Create a new empty `Context` with no people, no hospitals and no restrictions.
    #[must_use]
    pub fn new(world: World) -> Context {
        Context {
            world,
            people: Vec::new(),
            health_authority: HealthAuthority::default(),
            policy: Policy::Unrestricted,
            random: RngStore::default(),
            statistics: Statistics::new(),
            reports: ReportStore::default(),
            events: EventLog::new(),
            event_handlers: Vec::new(),
            current_day: 0,
        }
    }

    /// Adds a person to the population.
    ///
    /// # Errors
    ///
    /// Returns `EpidemicError::InvalidPerson` if their home lies outside the world.
    pub fn add_person(&mut self, person: Person) -> Result<PersonId, EpidemicError> {
        if !self.world.contains(person.home()) {
            return Err(EpidemicError::InvalidPerson(format!(
                "home {} lies outside the world",
                person.home()
            )));
        }
        self.people.push(person);
        Ok(PersonId(self.people.len() - 1))
    }

    pub fn add_hospital(&mut self, hospital: Hospital) -> HospitalId {
        self.health_authority.add_hospital(hospital)
    }

    pub fn set_health_authority(&mut self, health_authority: HealthAuthority) {
        self.health_authority = health_authority;
    }

    /// Sets the active policy directly, outside of the daily review.
    ///
    /// # Errors
    ///
    /// Returns `EpidemicError::InvalidPolicy` if the policy fails validation.
    pub fn set_policy(&mut self, policy: Policy) -> Result<(), EpidemicError> {
        policy.validate()?;
        self.policy = policy;
        Ok(())
    }

    /// Initializes all random streams from `base_seed`.
    pub fn init_random(&mut self, base_seed: u64) {
        self.random.reseed(base_seed);
    }

    /// Exposes `person` to `kind` the same way a contact would.
    ///
    /// # Errors
    ///
    /// Returns `EpidemicError::InvalidPerson` if there is no such person.
    pub fn infect(&mut self, person: PersonId, kind: DiseaseKind) -> Result<bool, EpidemicError> {
        let target = self
            .people
            .get_mut(person.0)
            .ok_or_else(|| EpidemicError::InvalidPerson(format!("no person with id {person}")))?;
        Ok(target.get_infected(person, kind, &self.random))
    }

    /// Registers a handler called with every event once the phase that produced it has
    /// finished. Handlers run in registration order.
    pub fn subscribe_to_events(&mut self, handler: impl Fn(&mut Context, &SimulationEvent) + 'static) {
        self.event_handlers.push(Rc::new(handler));
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    #[must_use]
    pub fn people(&self) -> &[Person] {
        &self.people
    }

    #[must_use]
    pub fn person(&self, id: PersonId) -> Option<&Person> {
        self.people.get(id.0)
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    #[must_use]
    pub fn health_authority(&self) -> &HealthAuthority {
        &self.health_authority
    }

    #[must_use]
    pub fn statistics(&self) -> &Statistics {
        &self.statistics
    }

    /// Number of days simulated so far; also the index of the next day.
    #[must_use]
    pub fn current_day(&self) -> u32 {
        self.current_day
    }

    /// People who have not died.
    #[must_use]
    pub fn alive_count(&self) -> usize {
        self.people.iter().filter(|p| p.state().is_alive()).count()
    }

    #[must_use]
    pub fn dead_count(&self) -> usize {
        self.people.len() - self.alive_count()
    }

    #[must_use]
    pub fn count_in_state(&self, state: StateKind) -> usize {
        self.people
            .iter()
            .filter(|p| p.state().kind() == state)
            .count()
    }

    /// Runs `days` consecutive days.
    pub fn execute(&mut self, days: u32) {
        for _ in 0..days {
            self.simulate_day();
        }
    }

    pub fn simulate_day(&mut self) {
        debug!("day {} begins", self.current_day);

        self.health_authority.make_policy(
            &mut self.policy,
            self.statistics.last_day(),
            self.people.len(),
            &mut self.events,
        );
        self.flush_events();

        self.health_authority
            .treat_patients(&mut self.people, &self.random);
        self.flush_events();

        self.day_actions();
        self.flush_events();

        self.interactions();
        self.flush_events();

        self.night_actions();
        self.flush_events();

        self.events.emit(SimulationEvent::DayEnded {
            day: self.current_day,
        });
        self.flush_events();
        self.current_day += 1;
    }

    fn day_actions(&mut self) {
        let env = Environment {
            world: &self.world,
            policy: &self.policy,
            random: &self.random,
        };
        for (index, person) in self.people.iter_mut().enumerate() {
            person.day_actions(
                PersonId(index),
                &env,
                &mut self.health_authority,
                &mut self.events,
            );
        }
    }

    // Every ordered pair is visited, so two contagious neighbours each get an attempt. Someone
    // infected earlier in the pass can already infect the people visited after them.
    fn interactions(&mut self) {
        let env = Environment {
            world: &self.world,
            policy: &self.policy,
            random: &self.random,
        };
        let n = self.people.len();
        for i in 0..n {
            for j in 0..n {
                if i == j
                    || !env
                        .world
                        .is_close(self.people[i].position(), self.people[j].position())
                {
                    continue;
                }
                if let Some(kind) = self.people[i].interact(&env) {
                    self.people[j].get_infected(PersonId(j), kind, env.random);
                }
            }
        }
    }

    fn night_actions(&mut self) {
        for (index, person) in self.people.iter_mut().enumerate() {
            person.night_actions(PersonId(index), &mut self.health_authority, &mut self.events);
        }
    }

    fn flush_events(&mut self) {
        if self.events.is_empty() {
            return;
        }
        let events = self.events.drain();
        for event in &events {
            self.statistics.record(self.current_day, event);
        }
        if self.event_handlers.is_empty() {
            return;
        }
        let handlers = self.event_handlers.clone();
        for event in &events {
            for handler in &handlers {
                (handler)(self, event);
            }
        }
    }

    /// Counts people per state, for logging and summaries.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut healthy = 0;
        let mut asymptomatic = 0;
        let mut symptomatic = 0;
        let mut dead = 0;
        for person in &self.people {
            match person.state() {
                HealthState::Healthy => healthy += 1,
                HealthState::Asymptomatic { .. } => asymptomatic += 1,
                HealthState::Symptomatic => symptomatic += 1,
                HealthState::Dead => dead += 1,
            }
        }
        format!(
            "day {}: healthy={healthy} asymptomatic={asymptomatic} symptomatic={symptomatic} \
             dead={dead} hospitalized={} policy={}",
            self.current_day,
            self.statistics.hospitalized(),
            self.policy
        )
    }

    pub(crate) fn log_summary(&self) {
        info!("{}", self.summary());
    }
}

impl ContextRandomExt for Context {
    fn rng_store(&self) -> &RngStore {
        &self.random
    }
}

#[cfg(test)]
mod test {
    use std::cell::RefCell;

    use super::*;
    use crate::drugs::ExpensiveDrugCatalog;
    use crate::geometry::Position;
    use crate::virus::Virus;

    fn person_at(x: i32, y: i32) -> Person {
        Person::new(Position::new(x, y), 30, 70.0).unwrap()
    }

    fn carrier_at(x: i32, y: i32, kind: DiseaseKind) -> Person {
        let mut person = person_at(x, y);
        person.virus = Some(Virus::new(kind, 1.0, 1.0));
        person.state = HealthState::Asymptomatic { days_sick: 0 };
        person
    }

    #[test]
    fn people_must_live_inside_the_world() {
        let mut context = Context::new(World::default());
        assert_eq!(context.add_person(person_at(5, 5)).unwrap(), PersonId(0));
        assert!(matches!(
            context.add_person(person_at(500, 5)),
            Err(EpidemicError::InvalidPerson(_))
        ));
    }

    #[test]
    fn invalid_policy_is_rejected() {
        let mut context = Context::new(World::default());
        assert!(context.set_policy(Policy::ppe(2.0)).is_err());
        assert_eq!(context.policy(), &Policy::Unrestricted);
    }

    #[test]
    fn contact_at_identical_coordinates_transmits() {
        let mut context = Context::new(World::default());
        context
            .add_person(carrier_at(40, 40, DiseaseKind::Cholera))
            .unwrap();
        context.add_person(person_at(40, 40)).unwrap();

        context.interactions();

        let other = context.person(PersonId(1)).unwrap();
        assert_eq!(other.state(), &HealthState::Asymptomatic { days_sick: 0 });
        assert_eq!(other.virus().unwrap().kind(), DiseaseKind::Cholera);
    }

    #[test]
    fn distant_people_do_not_interact() {
        let mut context = Context::new(World::default());
        context
            .add_person(carrier_at(40, 40, DiseaseKind::Cholera))
            .unwrap();
        context.add_person(person_at(45, 40)).unwrap();
        context.interactions();
        assert_eq!(
            context.person(PersonId(1)).unwrap().state(),
            &HealthState::Healthy
        );
    }

    #[test]
    fn newly_infected_transmit_within_the_same_pass() {
        // 1 is close to both 0 and 2, but 0 and 2 are not close to each other.
        let world = World::new(0, 1000, 0, 1000).unwrap();
        let mut context = Context::new(world);
        context
            .add_person(carrier_at(100, 100, DiseaseKind::SeasonalFlu))
            .unwrap();
        context.add_person(person_at(105, 100)).unwrap();
        context.add_person(person_at(112, 100)).unwrap();
        context.interactions();
        assert_eq!(context.count_in_state(StateKind::Asymptomatic), 3);

        // With the carrier visited last, the chain stops after one link.
        let mut context = Context::new(world);
        context.add_person(person_at(112, 100)).unwrap();
        context.add_person(person_at(105, 100)).unwrap();
        context
            .add_person(carrier_at(100, 100, DiseaseKind::SeasonalFlu))
            .unwrap();
        context.interactions();
        assert_eq!(context.count_in_state(StateKind::Asymptomatic), 2);
        assert_eq!(
            context.person(PersonId(0)).unwrap().state(),
            &HealthState::Healthy
        );
    }

    #[test]
    fn carriers_do_not_reinfect_each_other() {
        let mut context = Context::new(World::default());
        context
            .add_person(carrier_at(1, 1, DiseaseKind::Cholera))
            .unwrap();
        context
            .add_person(carrier_at(1, 1, DiseaseKind::SarsCov2))
            .unwrap();
        context.interactions();
        assert_eq!(
            context.person(PersonId(0)).unwrap().virus().unwrap().kind(),
            DiseaseKind::Cholera
        );
        assert_eq!(
            context.person(PersonId(1)).unwrap().virus().unwrap().kind(),
            DiseaseKind::SarsCov2
        );
    }

    #[test]
    fn handlers_see_events_after_statistics() {
        let mut context = Context::new(World::default());
        context
            .add_person(carrier_at(10, 10, DiseaseKind::SeasonalFlu))
            .unwrap();
        let seen: Rc<RefCell<Vec<(SimulationEvent, usize)>>> = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        context.subscribe_to_events(move |context, event| {
            sink.borrow_mut()
                .push((event.clone(), context.statistics().history().len()));
        });

        context.execute(5);

        let seen = seen.borrow();
        let days: Vec<u32> = seen
            .iter()
            .filter_map(|(event, _)| match event {
                SimulationEvent::DayEnded { day } => Some(*day),
                _ => None,
            })
            .collect();
        assert_eq!(days, vec![0, 1, 2, 3, 4]);
        // The day-end handler runs after the tally has been rolled into history.
        assert_eq!(seen.last().unwrap().1, 5);
        assert!(seen.iter().any(|(event, _)| matches!(
            event,
            SimulationEvent::InfectionConfirmed {
                kind: DiseaseKind::SeasonalFlu,
                ..
            }
        )));
        assert_eq!(context.current_day(), 5);
        assert_eq!(context.statistics().history()[4].new_infections(), 1);
    }

    #[test]
    fn policy_reacts_to_the_previous_day() {
        let mut context = Context::new(World::default());
        context.set_policy(Policy::total_lockdown(1.0)).unwrap();
        for _ in 0..10 {
            let mut person = carrier_at(10, 10, DiseaseKind::SeasonalFlu);
            person.state = HealthState::Asymptomatic {
                days_sick: crate::state::DAYS_SICK_TO_FEEL_BAD,
            };
            context.add_person(person).unwrap();
        }
        for _ in 0..10 {
            context.add_person(person_at(90, 90)).unwrap();
        }

        // Day 0: all carriers become symptomatic, which is half the population.
        context.simulate_day();
        assert_eq!(context.policy(), &Policy::total_lockdown(1.0));
        // Day 1: the authority sees the infections and mandates PPE.
        context.simulate_day();
        assert_eq!(context.policy(), &Policy::ppe(0.8));
        assert_eq!(
            context.statistics().policies(),
            &[(1, "PPE(p=0.80)".to_string())]
        );
    }

    #[test]
    fn hospitals_treat_before_people_act() {
        let mut context = Context::new(World::default());
        context.add_hospital(Hospital::new(10, Box::new(ExpensiveDrugCatalog)));
        let mut patient = carrier_at(10, 10, DiseaseKind::SarsCov2);
        patient.state = HealthState::Symptomatic;
        patient.set_temperature(39.9);
        context.add_person(patient).unwrap();

        context.simulate_day();
        let patient = context.person(PersonId(0)).unwrap();
        assert_eq!(patient.hospital(), Some(HospitalId(0)));
        assert_eq!(context.statistics().hospitalized(), 1);

        // Next morning ibuprofen brings the fever down before the day's symptoms.
        context.simulate_day();
        let patient = context.person(PersonId(0)).unwrap();
        assert!(patient.temperature() < 37.2);
    }

    #[test]
    fn same_seed_same_run() {
        let run = |seed| {
            let mut context = Context::new(World::default());
            context.init_random(seed);
            for i in 0..30 {
                context.add_person(person_at(i, i)).unwrap();
            }
            context.add_person(carrier_at(0, 0, DiseaseKind::SarsCov2)).unwrap();
            context.execute(10);
            context
                .people()
                .iter()
                .map(|p| (p.position(), p.state().kind()))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(17), run(17));
    }
}
