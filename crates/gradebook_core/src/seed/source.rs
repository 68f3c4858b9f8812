//! Generators for synthetic seed data.
//!
//! # Responsibility
//! - Define the `SeedSource` seam the seeder draws every random choice from.
//! - Provide a `rand`-backed implementation, seedable for reproducible runs.

use chrono::{Days, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Andrew", "Beatrice", "Boris", "Carla", "Daniel", "Elena", "Felix", "Grace",
    "Hector", "Irene", "Jonas", "Katarina", "Leo", "Maya", "Nikolai", "Olga", "Pavel",
    "Quinn", "Rosa", "Samuel", "Tamara", "Victor", "Wendy", "Yuri", "Zoe",
];

const LAST_NAMES: &[&str] = &[
    "Anderson", "Bondarenko", "Carter", "Dubois", "Evans", "Fischer", "Garcia", "Hughes",
    "Ivanenko", "Jensen", "Kowalski", "Lopez", "Moreau", "Novak", "Olsen", "Petrenko",
    "Quirke", "Rossi", "Schmidt", "Tkachenko", "Underwood", "Vasquez", "Walker", "Young",
];

/// Source of every random decision made while seeding.
///
/// Implementations must return in-bounds values; the seeder treats anything
/// else as an invalid source.
pub trait SeedSource {
    fn first_name(&mut self) -> String;
    fn last_name(&mut self) -> String;
    /// Index into a collection of `len` items. Only called with `len > 0`.
    fn pick_index(&mut self, len: usize) -> usize;
    /// Grade value inside `range`.
    fn grade_value(&mut self, range: RangeInclusive<i64>) -> i64;
    /// Date between `reference - max_days_back` and `reference`, inclusive.
    fn date_within(&mut self, reference: NaiveDate, max_days_back: u32) -> NaiveDate;
}

/// `SeedSource` backed by any `rand` generator.
#[derive(Debug, Clone)]
pub struct RandomSeedSource<R: Rng> {
    rng: R,
}

impl<R: Rng> RandomSeedSource<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl RandomSeedSource<StdRng> {
    /// Deterministic source: equal seeds produce equal data.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Source seeded from OS entropy, used for real runs.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> SeedSource for RandomSeedSource<R> {
    fn first_name(&mut self) -> String {
        FIRST_NAMES[self.rng.gen_range(0..FIRST_NAMES.len())].to_string()
    }

    fn last_name(&mut self) -> String {
        LAST_NAMES[self.rng.gen_range(0..LAST_NAMES.len())].to_string()
    }

    fn pick_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn grade_value(&mut self, range: RangeInclusive<i64>) -> i64 {
        self.rng.gen_range(range)
    }

    fn date_within(&mut self, reference: NaiveDate, max_days_back: u32) -> NaiveDate {
        let days_back = self.rng.gen_range(0..=max_days_back);
        reference
            .checked_sub_days(Days::new(u64::from(days_back)))
            .unwrap_or(reference)
    }
}
