//! An agent-based epidemic simulator.
//!
//! A population of people lives on a two-dimensional grid. Each day they move about, meet the
//! people close to them and may pass on one of three diseases: seasonal flu, a severe
//! respiratory virus and cholera. Infections progress through a small state machine
//! (healthy, asymptomatic, symptomatic, dead) driven by body temperature, hydration and the
//! strength of the virus, which the immune system and hospital treatment wear down.
//!
//! The central object of a simulation is the [`Context`], which owns:
//! * the world bounds and the population,
//! * the health authority, with its capacity-bounded hospitals and drug catalogs,
//! * the active public-health [`Policy`], which gates movement and transmission,
//! * named, independently seeded random streams,
//! * rolling statistics and the CSV reports built from them.
//!
//! A run is usually started through [`runner::run_with_args`], which reads a JSON
//! [`parameters::Parameters`] file, builds the population and simulates the requested number
//! of days:
//!
//! ```no_run
//! use ixa_contagion::runner::run_with_args;
//!
//! let context = run_with_args().unwrap();
//! println!("{}", context.summary());
//! ```
pub mod context;
pub mod drugs;
pub mod error;
pub mod events;
pub mod geometry;
pub mod hospital;
pub mod log;
pub mod parameters;
pub mod person;
pub mod policy;
pub mod population;
pub mod prescription;
pub mod random;
pub mod report;
pub mod reporting;
pub mod runner;
pub mod state;
pub mod statistics;
pub mod virus;

pub mod prelude;

pub use context::Context;
pub use error::EpidemicError;
pub use policy::Policy;

// Re-exports for the exported macros
pub use csv;
pub use paste;
pub use rand;
