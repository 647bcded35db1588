//! Spouse and children synthesis for people already in the tree.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    generator::PersonGenerator,
    population::{Origin, PersonId, Population},
    rng::RngExt,
};

pub const SPOUSE_AGE_GAP_YEARS: i32 = 10;
pub const MIN_PARENT_AGE: i32 = 25;
pub const MAX_PARENT_AGE: i32 = 45;
/// Child counts are drawn from this far either side of the decade's birth rate.
const CHILD_COUNT_SPREAD: f64 = 1.5;
/// Upper bound on children drawn for one couple, whatever the birth rate.
pub const MAX_CHILDREN_PER_COUPLE: usize = 20;

fn default_enqueue_spouses() -> bool {
    true
}

/// Switches that trade fidelity to the reference generation flow for a more
/// consistent tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationPolicy {
    /// Queue synthesized spouses for their own expansion step.
    #[serde(default = "default_enqueue_spouses")]
    pub enqueue_spouses: bool,
    /// Skip children whose sampled birth year falls after the end year.
    #[serde(default)]
    pub bound_children_by_end_year: bool,
    /// Only marry with the decade's marriage-rate probability.
    #[serde(default)]
    pub marriage_gating: bool,
}

impl Default for GenerationPolicy {
    fn default() -> Self {
        Self {
            enqueue_spouses: default_enqueue_spouses(),
            bound_children_by_end_year: false,
            marriage_gating: false,
        }
    }
}

/// Surnames of the root couple; the sole test for descendant lineage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FoundingSurnames {
    pair: [Option<String>; 2],
}

impl FoundingSurnames {
    pub fn new(first: Option<String>, second: Option<String>) -> Self {
        Self {
            pair: [first, second],
        }
    }

    pub fn names(&self) -> [Option<&str>; 2] {
        [self.pair[0].as_deref(), self.pair[1].as_deref()]
    }

    /// An absent surname never matches, even against an absent founder name.
    pub fn matches(&self, last_name: Option<&str>) -> bool {
        match last_name {
            Some(name) => self.pair.iter().flatten().any(|founder| founder == name),
            None => false,
        }
    }
}

/// A parent resolved against their spouse before any children are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoupleRoles {
    /// The non-older member of the couple; passes on their surname.
    pub lineage: PersonId,
    /// Earlier-born of the couple; drives child count and birth years.
    pub elder: PersonId,
    /// The other member of the couple, if there is one.
    pub partner: Option<PersonId>,
}

impl CoupleRoles {
    /// Resolves the couple around `parent`. On equal birth years `parent` keeps both roles.
    pub fn resolve(population: &Population, parent: PersonId) -> Option<Self> {
        let person = population.get(parent)?;
        let Some(spouse) = person.spouse().and_then(|id| population.get(id)) else {
            return Some(Self {
                lineage: parent,
                elder: parent,
                partner: None,
            });
        };
        let roles = if person.birth_year() < spouse.birth_year() {
            Self {
                lineage: spouse.id(),
                elder: parent,
                partner: Some(parent),
            }
        } else {
            Self {
                lineage: parent,
                elder: if spouse.birth_year() < person.birth_year() {
                    spouse.id()
                } else {
                    parent
                },
                partner: Some(spouse.id()),
            }
        };
        Some(roles)
    }

    fn members(&self) -> impl Iterator<Item = PersonId> {
        std::iter::once(self.lineage).chain(self.partner)
    }
}

pub struct RelationshipSynthesizer<'t> {
    generator: PersonGenerator<'t>,
    policy: GenerationPolicy,
    end_year: i32,
}

impl<'t> RelationshipSynthesizer<'t> {
    pub fn new(generator: PersonGenerator<'t>, policy: GenerationPolicy, end_year: i32) -> Self {
        Self {
            generator,
            policy,
            end_year,
        }
    }

    pub fn generator(&self) -> PersonGenerator<'t> {
        self.generator
    }

    /// Creates and marries a spouse unless `person` already has one.
    pub fn attach_spouse_if_absent<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        rng: &mut R,
        person: PersonId,
    ) -> Option<PersonId> {
        let current = population.get(person)?;
        if current.spouse().is_some() {
            return None;
        }
        let birth_year = current.birth_year();
        if self.policy.marriage_gating {
            let rate = self.generator.tables().marriage_rate(birth_year).unwrap_or(0.0);
            if !rng.chance(rate) {
                debug!(%person, rate, "stays unmarried");
                return None;
            }
        }

        let gap = rng.uniform_i32(-SPOUSE_AGE_GAP_YEARS, SPOUSE_AGE_GAP_YEARS);
        let spouse_year = birth_year.saturating_add(gap);
        let draft = self.generator.create_person(rng, spouse_year, None, false);
        let spouse = population.register(draft, Origin::Spouse);
        population.marry(person, spouse);
        debug!(%person, %spouse, spouse_year, "spouse attached");
        Some(spouse)
    }

    /// Draws the children of `parent` and their spouse, at most once per couple.
    pub fn attach_children<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        rng: &mut R,
        parent: PersonId,
        founders: &FoundingSurnames,
    ) -> Vec<PersonId> {
        let Some(roles) = CoupleRoles::resolve(population, parent) else {
            return Vec::new();
        };
        let already_attempted = population
            .get(parent)
            .map_or(true, |p| p.has_attempted_children());
        if already_attempted {
            return Vec::new();
        }

        let children = self.draw_children(population, rng, &roles, founders);
        for member in roles.members() {
            if let Some(person) = population.get_mut(member) {
                person.mark_children_attempted();
            }
        }
        children
    }

    pub fn child_count<R: Rng + ?Sized>(&self, rng: &mut R, elder_birth_year: i32) -> usize {
        let rate = match self.generator.tables().birth_rate(elder_birth_year) {
            Some(rate) if rate > 0.0 => rate,
            _ => return 0,
        };
        let low = ((rate - CHILD_COUNT_SPREAD).floor() as i32).max(0);
        let high = ((rate + CHILD_COUNT_SPREAD).ceil() as i32).max(low);
        (rng.uniform_i32(low, high) as usize).min(MAX_CHILDREN_PER_COUPLE)
    }

    fn draw_children<R: Rng + ?Sized>(
        &self,
        population: &mut Population,
        rng: &mut R,
        roles: &CoupleRoles,
        founders: &FoundingSurnames,
    ) -> Vec<PersonId> {
        let (Some(elder), Some(lineage)) = (population.get(roles.elder), population.get(roles.lineage))
        else {
            return Vec::new();
        };
        let elder_year = elder.birth_year();
        let surname = lineage.last_name().map(str::to_string);

        let count = self.child_count(rng, elder_year);
        let mut children = Vec::with_capacity(count);
        for _ in 0..count {
            let age = rng.uniform_i32(MIN_PARENT_AGE, MAX_PARENT_AGE);
            let Some(birth_year) = elder_year.checked_add(age) else {
                continue;
            };
            if self.policy.bound_children_by_end_year && birth_year > self.end_year {
                continue;
            }
            let draft = self
                .generator
                .create_person(rng, birth_year, surname.as_deref(), false);
            let descends = founders.matches(draft.last_name.as_deref());
            let child = population.register(draft, Origin::Child);
            for member in roles.members() {
                population.add_child(member, child);
            }
            if descends {
                if let Some(person) = population.get_mut(child) {
                    person.mark_descendant();
                }
            }
            children.push(child);
        }
        debug!(
            lineage = %roles.lineage,
            elder_year,
            drawn = count,
            created = children.len(),
            "children attached"
        );
        children
    }
}
