use std::collections::VecDeque;

use tracing::{debug, info};

use crate::{
    demographics::DemographicTables,
    generator::PersonGenerator,
    population::{Origin, PersonId, Population},
    query::QueryEngine,
    rng::RngManager,
    synthesizer::{FoundingSurnames, GenerationPolicy, RelationshipSynthesizer},
};

const FOUNDERS_STREAM: &str = "founders";
const SPOUSES_STREAM: &str = "spouses";
const CHILDREN_STREAM: &str = "children";

#[derive(Debug, Clone)]
pub struct EngineSettings {
    /// Fixed seed for a reproducible tree; `None` draws one from OS entropy.
    pub seed: Option<u64>,
    pub start_year: i32,
    pub end_year: i32,
    pub policy: GenerationPolicy,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            seed: None,
            start_year: 1950,
            end_year: 2120,
            policy: GenerationPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildPhase {
    Init,
    RootCreated,
    Expanding,
    Done,
}

/// What happened while processing one dequeued person.
#[derive(Debug, Clone)]
pub struct ExpansionStep {
    pub person: PersonId,
    pub birth_year: i32,
    pub spouse_added: Option<PersonId>,
    pub children_added: Vec<PersonId>,
    pub queue_len: usize,
}

pub struct EngineBuilder<'t> {
    settings: EngineSettings,
    tables: &'t DemographicTables,
}

impl<'t> EngineBuilder<'t> {
    pub fn new(settings: EngineSettings, tables: &'t DemographicTables) -> Self {
        Self { settings, tables }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.settings.seed = Some(seed);
        self
    }

    pub fn with_policy(mut self, policy: GenerationPolicy) -> Self {
        self.settings.policy = policy;
        self
    }

    pub fn build(self) -> Engine<'t> {
        let rng = match self.settings.seed {
            Some(seed) => RngManager::new(seed),
            None => RngManager::from_entropy(),
        };
        Engine {
            rng,
            synthesizer: RelationshipSynthesizer::new(
                PersonGenerator::new(self.tables),
                self.settings.policy,
                self.settings.end_year,
            ),
            settings: self.settings,
            phase: BuildPhase::Init,
        }
    }
}

/// Grows a family tree breadth-first from a single founding couple.
pub struct Engine<'t> {
    rng: RngManager,
    synthesizer: RelationshipSynthesizer<'t>,
    settings: EngineSettings,
    phase: BuildPhase,
}

impl<'t> Engine<'t> {
    pub fn phase(&self) -> BuildPhase {
        self.phase
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    pub fn run(&mut self) -> FamilyTree {
        self.run_with_hook(|_| {})
    }

    pub fn run_with_hook<F>(&mut self, mut hook: F) -> FamilyTree
    where
        F: FnMut(&ExpansionStep),
    {
        self.phase = BuildPhase::Init;
        let mut population = Population::new();
        info!(
            seed = self.rng.seed(),
            start_year = self.settings.start_year,
            end_year = self.settings.end_year,
            "Generating family tree"
        );

        let (founders, surnames) = self.create_founders(&mut population);
        self.phase = BuildPhase::RootCreated;

        let mut queue: VecDeque<PersonId> = VecDeque::from(founders.to_vec());
        self.phase = BuildPhase::Expanding;
        while let Some(current) = queue.pop_front() {
            let Some(birth_year) = population.get(current).map(|p| p.birth_year()) else {
                continue;
            };

            let spouse_added = self.synthesizer.attach_spouse_if_absent(
                &mut population,
                &mut self.rng.stream(SPOUSES_STREAM),
                current,
            );
            if let Some(spouse) = spouse_added {
                if self.settings.policy.enqueue_spouses {
                    queue.push_back(spouse);
                }
            }

            let children_added = self.synthesizer.attach_children(
                &mut population,
                &mut self.rng.stream(CHILDREN_STREAM),
                current,
                &surnames,
            );
            queue.extend(children_added.iter().copied());

            hook(&ExpansionStep {
                person: current,
                birth_year,
                spouse_added,
                children_added,
                queue_len: queue.len(),
            });

            if birth_year > self.settings.end_year {
                debug!(%current, birth_year, "passed end year; stopping expansion");
                break;
            }
        }

        self.phase = BuildPhase::Done;
        info!(
            people = population.len(),
            pending = queue.len(),
            "Family tree generated"
        );
        FamilyTree {
            population,
            founders,
            surnames,
            seed: self.rng.seed(),
        }
    }

    /// Two people born in the start year, married to each other.
    fn create_founders(&mut self, population: &mut Population) -> ([PersonId; 2], FoundingSurnames) {
        let generator = self.synthesizer.generator();
        let mut rng = self.rng.stream(FOUNDERS_STREAM);
        let first = generator.create_person(&mut rng, self.settings.start_year, None, false);
        let second = generator.create_person(&mut rng, self.settings.start_year, None, false);
        let surnames = FoundingSurnames::new(first.last_name.clone(), second.last_name.clone());

        let a = population.register(first, Origin::Founder);
        let b = population.register(second, Origin::Founder);
        population.marry(a, b);
        debug!(?surnames, "founding couple created");
        ([a, b], surnames)
    }
}

/// Builds a tree with default policy and an entropy seed.
pub fn build_tree(tables: &DemographicTables, start_year: i32, end_year: i32) -> FamilyTree {
    let settings = EngineSettings {
        start_year,
        end_year,
        ..EngineSettings::default()
    };
    EngineBuilder::new(settings, tables).build().run()
}

/// The finished, read-only result of one generation run.
#[derive(Debug, Clone)]
pub struct FamilyTree {
    population: Population,
    founders: [PersonId; 2],
    surnames: FoundingSurnames,
    seed: u64,
}

impl FamilyTree {
    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn founders(&self) -> [PersonId; 2] {
        self.founders
    }

    pub fn founding_surnames(&self) -> &FoundingSurnames {
        &self.surnames
    }

    /// Seed that reproduces this tree given the same tables and settings.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn query(&self) -> QueryEngine<'_> {
        QueryEngine::new(&self.population)
    }
}
