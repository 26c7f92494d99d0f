//! Named, independently seeded random streams.
//!
//! Each stream is declared with [`define_rng!`] and lives in an [`RngStore`]. Keeping movement,
//! policy, virus and treatment draws on separate streams means that, for example, changing how
//! many doses a hospital draws does not perturb where people walk.
mod context_ext;
mod macros;

use std::any::{Any, TypeId};
use std::cell::{RefCell, RefMut};

use log::trace;
use rand::SeedableRng;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_64;

pub use context_ext::ContextRandomExt;
pub use macros::define_rng;

pub trait RngId: Copy + Clone {
    type RngType: SeedableRng;
    fn get_name() -> &'static str;
}

// Allows for different generator types per stream (anything that implements SeedableRng).
struct RngHolder {
    rng: Box<dyn Any>,
}

/// Stores the base seed and the lazily created generators, keyed by their `RngId`. The map is
/// in a `RefCell` so a generator can be borrowed mutably through a shared reference to the store.
pub struct RngStore {
    base_seed: u64,
    rng_holders: RefCell<FxHashMap<TypeId, RngHolder>>,
}

impl RngStore {
    #[must_use]
    pub fn new(base_seed: u64) -> RngStore {
        RngStore {
            base_seed,
            rng_holders: RefCell::new(FxHashMap::default()),
        }
    }

    /// Sets a new base seed and drops every existing generator so they are re-seeded on next use.
    pub fn reseed(&mut self, base_seed: u64) {
        trace!("reseeding random streams with {base_seed}");
        self.base_seed = base_seed;
        self.rng_holders.get_mut().clear();
    }

    /// Gets a mutable reference to the generator for `R`, creating it from the base seed
    /// and the stream name if it has not been used yet.
    ///
    /// # Panics
    ///
    /// Panics if a generator from this store is already borrowed.
    pub(crate) fn get_rng<R: RngId + 'static>(&self) -> RefMut<'_, R::RngType> {
        let rng_holders = self.rng_holders.borrow_mut();
        RefMut::map(rng_holders, |holders| {
            holders
                .entry(TypeId::of::<R>())
                .or_insert_with(|| {
                    trace!(
                        "creating new RNG {} (seed={})",
                        R::get_name(),
                        self.base_seed
                    );
                    let seed_offset = xxh3_64(R::get_name().as_bytes());
                    RngHolder {
                        rng: Box::new(R::RngType::seed_from_u64(
                            self.base_seed.wrapping_add(seed_offset),
                        )),
                    }
                })
                .rng
                .downcast_mut::<R::RngType>()
                .unwrap()
        })
    }
}

impl Default for RngStore {
    fn default() -> Self {
        RngStore::new(0)
    }
}
