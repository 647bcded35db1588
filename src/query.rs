//! Read-only aggregates over a finished population.

use std::collections::HashMap;

use crate::demographics::decade_start;
use crate::population::{Origin, Person, Population};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecadeCount {
    /// First year of the decade, e.g. 1950 for the 1950s.
    pub decade: i32,
    pub count: usize,
}

impl DecadeCount {
    pub fn label(&self) -> String {
        format!("{}s", self.decade)
    }
}

pub struct QueryEngine<'p> {
    population: &'p Population,
}

impl<'p> QueryEngine<'p> {
    pub fn new(population: &'p Population) -> Self {
        Self { population }
    }

    pub fn total_count(&self) -> usize {
        self.population.len()
    }

    /// Births per decade for every decade start from `start_year` through
    /// `end_year`, stepping by ten.
    pub fn count_by_decade(&self, start_year: i32, end_year: i32) -> Vec<DecadeCount> {
        let mut births: HashMap<i32, usize> = HashMap::new();
        for person in self.population.iter() {
            *births.entry(decade_start(person.birth_year())).or_default() += 1;
        }
        (start_year..=end_year)
            .step_by(10)
            .map(|decade| DecadeCount {
                decade,
                count: births.get(&decade_start(decade)).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Full names shared by more than one person, in order of first appearance.
    pub fn duplicate_full_names(&self) -> Vec<(String, usize)> {
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for person in self.population.iter() {
            let name = person.full_name();
            let count = counts.entry(name.clone()).or_insert(0);
            if *count == 0 {
                order.push(name);
            }
            *count += 1;
        }
        order
            .into_iter()
            .filter_map(|name| {
                let count = counts.get(&name).copied().unwrap_or(0);
                (count > 1).then_some((name, count))
            })
            .collect()
    }

    pub fn descendant_count(&self) -> usize {
        self.population.iter().filter(|p| p.is_descendant()).count()
    }

    pub fn founders(&self) -> Vec<&'p Person> {
        self.population
            .iter()
            .filter(|p| p.origin() == Origin::Founder)
            .collect()
    }

    pub fn living_in(&self, year: i32) -> usize {
        self.population.iter().filter(|p| p.is_alive_in(year)).count()
    }
}
