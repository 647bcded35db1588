//! Year-indexed demographic statistics that drive person generation.

mod loader;

use std::collections::HashMap;

pub use loader::{TableError, TableFiles};

/// Start year of the decade containing `year` (1953 -> 1950, -5 -> -10).
pub fn decade_start(year: i32) -> i32 {
    year.div_euclid(10) * 10
}

/// Decade key used by the name and rate tables (1953 -> "1950s").
pub fn decade_label(year: i32) -> String {
    format!("{}s", decade_start(year))
}

/// Parallel candidate/weight lists for one decade.
#[derive(Debug, Clone, Default)]
pub struct WeightedNames {
    pub names: Vec<String>,
    pub weights: Vec<f64>,
}

impl WeightedNames {
    fn push(&mut self, name: String, weight: f64) {
        self.names.push(name);
        self.weights.push(weight);
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct DecadeRates {
    pub birth_rate: f64,
    pub marriage_rate: f64,
}

/// Immutable lookup tables, populated once at startup.
///
/// Name and rate tables are keyed by decade label ("1950s"); life expectancy
/// is keyed by decade start year. A `None` life expectancy marks a row whose
/// value could not be read.
#[derive(Debug, Clone, Default)]
pub struct DemographicTables {
    rank_probabilities: Vec<f64>,
    rates: HashMap<String, DecadeRates>,
    life_expectancy: HashMap<i32, Option<f64>>,
    first_names: HashMap<String, WeightedNames>,
    last_names: HashMap<String, WeightedNames>,
}

impl DemographicTables {
    pub fn builder() -> DemographicTablesBuilder {
        DemographicTablesBuilder::default()
    }

    pub fn first_names(&self, year: i32) -> Option<&WeightedNames> {
        self.first_names
            .get(&decade_label(year))
            .filter(|bucket| !bucket.is_empty())
    }

    /// Surnames for the decade with each rank already resolved to its weight.
    pub fn last_names(&self, year: i32) -> Option<WeightedNames> {
        let bucket = self
            .last_names
            .get(&decade_label(year))
            .filter(|bucket| !bucket.is_empty())?;
        let weights = bucket
            .weights
            .iter()
            .map(|rank| self.rank_weight(*rank))
            .collect();
        Some(WeightedNames {
            names: bucket.names.clone(),
            weights,
        })
    }

    /// Weight for a surname rank; the rank indexes the probability list directly.
    pub fn rank_weight(&self, rank: f64) -> f64 {
        if !rank.is_finite() || rank < 0.0 || rank.fract() != 0.0 {
            return 0.0;
        }
        self.rank_probabilities
            .get(rank as usize)
            .copied()
            .unwrap_or(0.0)
    }

    pub fn birth_rate(&self, year: i32) -> Option<f64> {
        self.rates.get(&decade_label(year)).map(|r| r.birth_rate)
    }

    pub fn marriage_rate(&self, year: i32) -> Option<f64> {
        self.rates.get(&decade_label(year)).map(|r| r.marriage_rate)
    }

    pub fn life_expectancy(&self, year: i32) -> Option<f64> {
        self.life_expectancy
            .get(&decade_start(year))
            .copied()
            .flatten()
    }

    pub fn decades_with_first_names(&self) -> usize {
        self.first_names.len()
    }

    pub fn decades_with_last_names(&self) -> usize {
        self.last_names.len()
    }

    pub fn rank_count(&self) -> usize {
        self.rank_probabilities.len()
    }
}

/// Assembles tables row by row; used by the CSV loader and by tests.
#[derive(Debug, Default)]
pub struct DemographicTablesBuilder {
    tables: DemographicTables,
}

impl DemographicTablesBuilder {
    pub fn rank_probabilities(mut self, probabilities: Vec<f64>) -> Self {
        self.tables.rank_probabilities = probabilities;
        self
    }

    pub fn rates(mut self, decade: impl Into<String>, birth_rate: f64, marriage_rate: f64) -> Self {
        self.tables.rates.insert(
            decade.into(),
            DecadeRates {
                birth_rate,
                marriage_rate,
            },
        );
        self
    }

    pub fn life_expectancy(mut self, decade_start: i32, years: Option<f64>) -> Self {
        self.tables.life_expectancy.insert(decade_start, years);
        self
    }

    pub fn first_name(
        mut self,
        decade: impl Into<String>,
        name: impl Into<String>,
        frequency: f64,
    ) -> Self {
        self.tables
            .first_names
            .entry(decade.into())
            .or_default()
            .push(name.into(), frequency);
        self
    }

    pub fn last_name(mut self, decade: impl Into<String>, name: impl Into<String>, rank: f64) -> Self {
        self.tables
            .last_names
            .entry(decade.into())
            .or_default()
            .push(name.into(), rank);
        self
    }

    pub fn build(self) -> DemographicTables {
        self.tables
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decade_helpers_truncate_down() {
        assert_eq!(decade_start(1953), 1950);
        assert_eq!(decade_start(1950), 1950);
        assert_eq!(decade_start(1959), 1950);
        assert_eq!(decade_start(-5), -10);
        assert_eq!(decade_label(2017), "2010s");
    }

    #[test]
    fn last_names_resolve_rank_through_probability_table() {
        let tables = DemographicTables::builder()
            .rank_probabilities(vec![0.0, 0.5, 0.3, 0.2])
            .last_name("1950s", "Smith", 1.0)
            .last_name("1950s", "Jones", 3.0)
            .last_name("1950s", "Nobody", 9.0)
            .build();

        let bucket = tables.last_names(1955).expect("1950s surnames");
        assert_eq!(bucket.names, vec!["Smith", "Jones", "Nobody"]);
        assert_eq!(bucket.weights, vec![0.5, 0.2, 0.0]);
        assert!(tables.last_names(1965).is_none());
    }

    #[test]
    fn fractional_or_negative_ranks_weigh_nothing() {
        let tables = DemographicTables::builder()
            .rank_probabilities(vec![0.4, 0.6])
            .build();
        assert_eq!(tables.rank_weight(1.5), 0.0);
        assert_eq!(tables.rank_weight(-1.0), 0.0);
        assert_eq!(tables.rank_weight(f64::NAN), 0.0);
        assert_eq!(tables.rank_weight(1.0), 0.6);
    }

    #[test]
    fn lookups_by_year_use_containing_decade() {
        let tables = DemographicTables::builder()
            .rates("1980s", 2.1, 0.6)
            .life_expectancy(1980, Some(74.0))
            .life_expectancy(1990, None)
            .first_name("1980s", "Jennifer", 3.0)
            .build();

        assert_eq!(tables.birth_rate(1987), Some(2.1));
        assert_eq!(tables.marriage_rate(1980), Some(0.6));
        assert_eq!(tables.life_expectancy(1989), Some(74.0));
        assert_eq!(tables.life_expectancy(1991), None);
        assert_eq!(tables.birth_rate(1990), None);
        assert!(tables.first_names(1981).is_some());
        assert!(tables.first_names(1991).is_none());
    }
}
