use std::path::PathBuf;

use lineage::{
    demographics::DemographicTables,
    engine::{EngineBuilder, EngineSettings, FamilyTree},
    population::{Origin, Person},
    scenario::{Scenario, ScenarioLoader},
    synthesizer::{GenerationPolicy, MAX_PARENT_AGE, MIN_PARENT_AGE},
};

fn scenario_loader() -> ScenarioLoader {
    ScenarioLoader::new(env!("CARGO_MANIFEST_DIR"))
}

fn scenario_path() -> PathBuf {
    PathBuf::from("scenarios/default.yaml")
}

fn load() -> (Scenario, DemographicTables) {
    let scenario = scenario_loader().load(scenario_path()).expect("scenario parses");
    let tables = scenario
        .load_tables(&scenario.data_dir)
        .expect("fixture tables load");
    (scenario, tables)
}

fn build(tables: &DemographicTables, seed: u64, policy: GenerationPolicy) -> FamilyTree {
    let settings = EngineSettings {
        seed: Some(seed),
        start_year: 1950,
        end_year: 2120,
        policy,
    };
    EngineBuilder::new(settings, tables).build().run()
}

fn people(tree: &FamilyTree) -> Vec<&Person> {
    tree.population().iter().collect()
}

#[test]
fn death_never_precedes_birth() {
    let (_, tables) = load();
    for seed in 0..5 {
        let tree = build(&tables, seed, GenerationPolicy::default());
        for person in people(&tree) {
            if let Some(died) = person.death_year() {
                assert!(died >= person.birth_year(), "{person} died in {died}");
            }
        }
    }
}

#[test]
fn spouse_relation_is_symmetric() {
    let (_, tables) = load();
    let tree = build(&tables, 7, GenerationPolicy::default());
    let population = tree.population();
    for person in population.iter() {
        if let Some(spouse) = person.spouse() {
            let other = population.get(spouse).expect("spouse is registered");
            assert_eq!(other.spouse(), Some(person.id()));
        }
    }
}

#[test]
fn founding_pair_is_the_only_parentless_couple() {
    let (_, tables) = load();
    let tree = build(&tables, 8, GenerationPolicy::default());
    let population = tree.population();

    let roots: Vec<&Person> = population
        .iter()
        .filter(|p| p.parents().is_empty() && p.origin() != Origin::Spouse)
        .collect();
    assert_eq!(roots.len(), 2);
    assert_eq!(roots[0].spouse(), Some(roots[1].id()));
    assert_eq!(roots[1].spouse(), Some(roots[0].id()));
    assert_eq!(
        tree.founding_surnames().names(),
        [roots[0].last_name(), roots[1].last_name()]
    );
    assert_eq!(tree.query().founders().len(), 2);
}

#[test]
fn descendant_flag_tracks_founding_surnames() {
    let (_, tables) = load();
    let tree = build(&tables, 9, GenerationPolicy::default());
    let surnames = tree.founding_surnames();
    for person in people(&tree) {
        if person.origin() == Origin::Child {
            assert_eq!(
                person.is_descendant(),
                surnames.matches(person.last_name()),
                "{person}"
            );
        }
    }
    assert!(tree.query().descendant_count() > 0);
}

#[test]
fn children_are_born_25_to_45_years_after_elder_parent() {
    let (_, tables) = load();
    let tree = build(&tables, 10, GenerationPolicy::default());
    let population = tree.population();
    for child in population.iter().filter(|p| !p.parents().is_empty()) {
        let elder_year = child
            .parents()
            .iter()
            .filter_map(|id| population.get(*id))
            .map(|parent| parent.birth_year())
            .min()
            .expect("child has a parent");
        let gap = child.birth_year() - elder_year;
        assert!(
            (MIN_PARENT_AGE..=MAX_PARENT_AGE).contains(&gap),
            "{child} is {gap} years younger than elder parent"
        );
    }
}

#[test]
fn parents_share_child_lists() {
    let (_, tables) = load();
    let tree = build(&tables, 12, GenerationPolicy::default());
    let population = tree.population();
    for person in population.iter() {
        if let Some(spouse) = person.spouse().and_then(|id| population.get(id)) {
            if person.has_attempted_children() {
                assert_eq!(person.children(), spouse.children());
            }
        }
    }
}

#[test]
fn same_seed_same_tree() {
    let (_, tables) = load();
    let first = build(&tables, 1950, GenerationPolicy::default());
    let second = build(&tables, 1950, GenerationPolicy::default());
    let render = |tree: &FamilyTree| {
        tree.population()
            .iter()
            .map(|p| (p.full_name(), p.birth_year(), p.death_year(), p.spouse()))
            .collect::<Vec<_>>()
    };
    assert_eq!(render(&first), render(&second));
}

#[test]
fn seeded_end_to_end_run() {
    let (scenario, tables) = load();
    let tree = build(&tables, 42, GenerationPolicy::default());
    let query = tree.query();

    assert!(query.total_count() >= 2);
    assert_eq!(query.total_count(), tree.population().len());
    for founder in tree.founders() {
        let person = tree.population().get(founder).unwrap();
        assert!(!person.is_descendant(), "founders are not tagged");
        assert_eq!(person.birth_year(), 1950);
    }

    let histogram =
        query.count_by_decade(scenario.report.histogram_start, scenario.report.histogram_end);
    assert_eq!(histogram[0].decade, 1950);
    assert!(histogram[0].count >= 2);

    for (name, count) in query.duplicate_full_names() {
        assert!(count > 1, "{name} reported with count {count}");
    }
}

#[test]
fn reference_flow_keeps_spouses_out_of_queue() {
    let (_, tables) = load();
    let settings = EngineSettings {
        seed: Some(3),
        start_year: 1950,
        end_year: 2120,
        policy: GenerationPolicy {
            enqueue_spouses: false,
            ..GenerationPolicy::default()
        },
    };
    let mut engine = EngineBuilder::new(settings, &tables).build();
    let mut processed = Vec::new();
    let tree = engine.run_with_hook(|step| processed.push(step.person));

    for id in processed {
        let person = tree.population().get(id).unwrap();
        assert_ne!(person.origin(), Origin::Spouse, "{person} was queued");
    }
}

#[test]
fn bounded_children_stay_within_end_year() {
    let (_, tables) = load();
    let policy = GenerationPolicy {
        bound_children_by_end_year: true,
        ..GenerationPolicy::default()
    };
    let settings = EngineSettings {
        seed: Some(5),
        start_year: 1950,
        end_year: 2000,
        policy,
    };
    let tree = EngineBuilder::new(settings, &tables).build().run();
    for child in tree.population().iter().filter(|p| p.origin() == Origin::Child) {
        assert!(child.birth_year() <= 2000, "{child}");
    }
}

#[test]
fn empty_decade_yields_no_death_year_and_no_children() {
    let tables = DemographicTables::builder()
        .rank_probabilities(vec![0.0, 1.0])
        .first_name("1950s", "Ruth", 1.0)
        .last_name("1950s", "Okafor", 1.0)
        .build();
    let settings = EngineSettings {
        seed: Some(1),
        start_year: 1950,
        end_year: 2120,
        policy: GenerationPolicy::default(),
    };
    let tree = EngineBuilder::new(settings, &tables).build().run();
    let population = tree.population();

    assert_eq!(population.len(), 2);
    for person in population.iter() {
        assert_eq!(person.death_year(), None);
        assert!(person.children().is_empty());
        assert!(person.has_attempted_children());
    }
}
