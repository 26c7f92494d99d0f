use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::distr::Distribution;
use rand::Rng;

use crate::random::{RngId, RngStore};

// A trait extension for anything that can hand out random streams: the simulation
// `Context` and the bare `RngStore` that per-phase views borrow.
pub trait ContextRandomExt {
    fn rng_store(&self) -> &RngStore;

    /// Gets a random sample from the generator associated with the given [`RngId`] by
    /// applying the specified sampler function.
    fn sample<R: RngId + 'static, T>(
        &self,
        _rng_type: R,
        sampler: impl FnOnce(&mut R::RngType) -> T,
    ) -> T {
        let mut rng = self.rng_store().get_rng::<R>();
        sampler(&mut rng)
    }

    /// Gets a random sample from the specified distribution using the generator
    /// associated with the given [`RngId`].
    fn sample_distr<R: RngId + 'static, T>(
        &self,
        _rng_type: R,
        distribution: impl Distribution<T>,
    ) -> T
    where
        R::RngType: Rng,
    {
        let mut rng = self.rng_store().get_rng::<R>();
        distribution.sample::<R::RngType>(&mut rng)
    }

    /// Gets a random sample within `range` using the generator associated with the
    /// given [`RngId`].
    fn sample_range<R: RngId + 'static, S, T>(&self, rng_id: R, range: S) -> T
    where
        R::RngType: Rng,
        S: SampleRange<T>,
        T: SampleUniform,
    {
        self.sample(rng_id, |rng| rng.random_range(range))
    }

    /// Gets a random boolean value which is true with probability `p`.
    fn sample_bool<R: RngId + 'static>(&self, rng_id: R, p: f64) -> bool
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| rng.random_bool(p))
    }

    /// Draws a uniform `f64` in `[0, 1)`.
    fn sample_unit<R: RngId + 'static>(&self, rng_id: R) -> f64
    where
        R::RngType: Rng,
    {
        self.sample(rng_id, |rng| rng.random::<f64>())
    }
}

impl ContextRandomExt for RngStore {
    fn rng_store(&self) -> &RngStore {
        self
    }
}
