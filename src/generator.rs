use rand::Rng;

use crate::{
    demographics::DemographicTables,
    population::PersonDraft,
    rng::{weighted_choice, RngExt},
};

/// Spread of the sampled lifetime around the decade's life expectancy.
const LIFESPAN_SPREAD_YEARS: f64 = 10.0;

/// Samples individual people from the demographic tables.
///
/// Holds no state of its own; every draw comes from the caller's rng.
#[derive(Clone, Copy)]
pub struct PersonGenerator<'t> {
    tables: &'t DemographicTables,
}

impl<'t> PersonGenerator<'t> {
    pub fn new(tables: &'t DemographicTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &'t DemographicTables {
        self.tables
    }

    pub fn create_person<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        birth_year: i32,
        last_name: Option<&str>,
        is_descendant: bool,
    ) -> PersonDraft {
        let first_name = self.first_name(rng, birth_year);
        let last_name = match last_name {
            Some(inherited) => Some(inherited.to_string()),
            None => self.last_name(rng, birth_year),
        };
        PersonDraft {
            birth_year,
            death_year: self.death_year(rng, birth_year),
            first_name,
            last_name,
            is_descendant,
        }
    }

    pub fn first_name<R: Rng + ?Sized>(&self, rng: &mut R, birth_year: i32) -> Option<String> {
        let bucket = self.tables.first_names(birth_year)?;
        weighted_choice(rng, &bucket.names, &bucket.weights).cloned()
    }

    /// Surnames are weighted by the probability of their rank, not the rank itself.
    pub fn last_name<R: Rng + ?Sized>(&self, rng: &mut R, birth_year: i32) -> Option<String> {
        let bucket = self.tables.last_names(birth_year)?;
        weighted_choice(rng, &bucket.names, &bucket.weights).cloned()
    }

    /// `None` when the decade has no expectancy or the sampled year leaves the `i32` range.
    pub fn death_year<R: Rng + ?Sized>(&self, rng: &mut R, birth_year: i32) -> Option<i32> {
        let expectancy = self.tables.life_expectancy(birth_year)?;
        let min_age = ((expectancy - LIFESPAN_SPREAD_YEARS) as i32).max(0);
        let max_age = ((expectancy + LIFESPAN_SPREAD_YEARS) as i32).max(min_age);
        birth_year.checked_add(rng.uniform_i32(min_age, max_age))
    }
}
