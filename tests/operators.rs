use evoforge::engines::generation::{
    EvolutionaryOperator, MutatePerturb, MutateShuffle, OperationList, OperatorContext,
    SelectionOperator, Splice, SpliceNoRepeat, TournamentSelection, TruncationSelection,
};
use evoforge::genome::{
    ArrayGenome, DoubleArrayGenome, DoubleArrayGenomeFactory, Genome, GenomeFactory,
    IntegerArrayGenome, IntegerArrayGenomeFactory,
};
use evoforge::population::Species;
use evoforge::{GeneticError, ObjectiveSense, PopulationId, SpeciesId};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::collections::HashSet;
use std::sync::Arc;

fn context<G: Genome>(factory: Arc<dyn GenomeFactory<G>>) -> OperatorContext<G> {
    OperatorContext {
        population: PopulationId::next(),
        factory,
        sense: ObjectiveSense::Maximize,
    }
}

fn integer_context(length: usize) -> OperatorContext<IntegerArrayGenome> {
    context(Arc::new(IntegerArrayGenomeFactory::new(length)))
}

fn species_of(size: usize) -> Species<IntegerArrayGenome> {
    let members = (0..size)
        .map(|i| IntegerArrayGenome::from_alleles(vec![i as i64]))
        .collect();
    Species::with_members(SpeciesId(0), members)
}

#[test]
fn test_truncation_selects_from_top_fraction() {
    let selection = TruncationSelection::new(0.3).unwrap();
    let species = species_of(10);
    let mut rng = StdRng::seed_from_u64(17);

    let mut seen = HashSet::new();
    for _ in 0..500 {
        let index = selection.perform_selection(&mut rng, &species).unwrap();
        assert!(index < 3);
        seen.insert(index);

        let anti = selection.perform_anti_selection(&mut rng, &species).unwrap();
        assert!(anti >= 7);
    }
    assert_eq!(seen.len(), 3);
}

#[test]
fn test_truncation_on_single_member_species() {
    let selection = TruncationSelection::new(0.1).unwrap();
    let species = species_of(1);
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(selection.perform_selection(&mut rng, &species).unwrap(), 0);
    assert_eq!(selection.perform_anti_selection(&mut rng, &species).unwrap(), 0);
}

#[test]
fn test_selection_rejects_bad_parameters() {
    assert!(TruncationSelection::new(0.0).is_err());
    assert!(TruncationSelection::new(1.5).is_err());
    assert!(TournamentSelection::new(0).is_err());
}

#[test]
fn test_tournament_favours_fitter_members() {
    let selection = TournamentSelection::new(4).unwrap();
    let species = species_of(20);
    let mut rng = StdRng::seed_from_u64(3);

    let picks: Vec<usize> = (0..1000)
        .map(|_| selection.perform_selection(&mut rng, &species).unwrap())
        .collect();
    let anti: Vec<usize> = (0..1000)
        .map(|_| selection.perform_anti_selection(&mut rng, &species).unwrap())
        .collect();

    let mean = |v: &[usize]| v.iter().sum::<usize>() as f64 / v.len() as f64;
    assert!(mean(&picks) < 6.0);
    assert!(mean(&anti) > 13.0);
}

#[test]
fn test_splice_offspring_are_complementary() {
    let mother = IntegerArrayGenome::from_alleles(vec![1, 2, 3, 4, 5, 6, 7, 8]);
    let father = IntegerArrayGenome::from_alleles(vec![10, 20, 30, 40, 50, 60, 70, 80]);
    let mut splice: Splice<IntegerArrayGenome> = Splice::new(3);
    splice.init(&integer_context(8)).unwrap();

    for seed in 0..50 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut offspring = Vec::new();
        splice
            .perform_operation(&mut rng, &[mother.clone(), father.clone()], 0, &mut offspring)
            .unwrap();
        assert_eq!(offspring.len(), 2);

        let (first, second) = (&offspring[0], &offspring[1]);
        let mut from_father = 0;
        for i in 0..8 {
            let pair = (first.get(i), second.get(i));
            assert!(pair == (mother.get(i), father.get(i)) || pair == (father.get(i), mother.get(i)));
            if first.get(i) == father.get(i) {
                from_father += 1;
            }
        }
        // The cut region is contiguous and inclusive of both ends
        assert_eq!(from_father, 4);
        assert!(!first.meta().is_scored());
    }
}

#[test]
fn test_splice_leaves_parents_untouched() {
    let parents = vec![
        IntegerArrayGenome::from_alleles(vec![0; 6]),
        IntegerArrayGenome::from_alleles(vec![1; 6]),
    ];
    let snapshot: Vec<Vec<i64>> = parents.iter().map(|p| p.alleles().to_vec()).collect();
    let mut splice: Splice<IntegerArrayGenome> = Splice::new(2);
    splice.init(&integer_context(6)).unwrap();

    let mut offspring = Vec::new();
    splice
        .perform_operation(&mut StdRng::seed_from_u64(0), &parents, 0, &mut offspring)
        .unwrap();
    let after: Vec<Vec<i64>> = parents.iter().map(|p| p.alleles().to_vec()).collect();
    assert_eq!(snapshot, after);
}

#[test]
fn test_splice_cut_must_fit_genome() {
    let mut splice: Splice<IntegerArrayGenome> = Splice::new(4);
    splice.init(&integer_context(4)).unwrap();
    let parents = vec![IntegerArrayGenome::new(4), IntegerArrayGenome::new(4)];
    let result = splice.perform_operation(&mut StdRng::seed_from_u64(0), &parents, 0, &mut Vec::new());
    assert!(matches!(result, Err(GeneticError::Configuration(_))));
}

#[test]
fn test_splice_no_repeat_keeps_permutations() {
    let mut rng = StdRng::seed_from_u64(23);
    let mut operator = SpliceNoRepeat::new(3);
    operator.init(&integer_context(10)).unwrap();

    for _ in 0..100 {
        let mut mother: Vec<i64> = (0..10).collect();
        let mut father: Vec<i64> = (0..10).collect();
        mother.shuffle(&mut rng);
        father.shuffle(&mut rng);
        let parents = vec![
            IntegerArrayGenome::from_alleles(mother),
            IntegerArrayGenome::from_alleles(father),
        ];

        let mut offspring = Vec::new();
        operator.perform_operation(&mut rng, &parents, 0, &mut offspring).unwrap();
        for child in &offspring {
            let mut values = child.alleles().to_vec();
            values.sort_unstable();
            assert_eq!(values, (0..10).collect::<Vec<i64>>());
        }
    }
}

#[test]
fn test_perturb_stays_within_band() {
    let amount = 0.1;
    let mut operator = MutatePerturb::new(amount);
    operator
        .init(&context::<DoubleArrayGenome>(Arc::new(DoubleArrayGenomeFactory::new(200))))
        .unwrap();

    let parent = DoubleArrayGenome::from_alleles(vec![5.0; 200]);
    let mut offspring = Vec::new();
    operator
        .perform_operation(&mut StdRng::seed_from_u64(8), &[parent], 0, &mut offspring)
        .unwrap();

    let child = &offspring[0];
    assert!(child.iter().all(|&v| (4.5..=5.5).contains(&v)));
    let mean = child.iter().sum::<f64>() / 200.0;
    assert!((mean - 5.0).abs() < 0.1);
    assert!(child.iter().any(|&v| v != 5.0));
}

#[test]
fn test_shuffle_preserves_multiset() {
    let mut operator: MutateShuffle<IntegerArrayGenome> = MutateShuffle::new();
    operator.init(&integer_context(5)).unwrap();
    let parent = IntegerArrayGenome::from_alleles(vec![1, 2, 3, 4, 5]);

    let mut offspring = Vec::new();
    operator
        .perform_operation(&mut StdRng::seed_from_u64(2), &[parent.clone()], 0, &mut offspring)
        .unwrap();

    let child = &offspring[0];
    let moved = (0..5).filter(|&i| child.get(i) != parent.get(i)).count();
    assert_eq!(moved, 2);
    let mut values = child.alleles().to_vec();
    values.sort_unstable();
    assert_eq!(values, vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_operation_list_chains_crossover_into_mutation() {
    let mut operations: OperationList<IntegerArrayGenome> = OperationList::new()
        .with(1.0, Splice::new(2))
        .unwrap()
        .with(1.0, MutateShuffle::new())
        .unwrap();
    operations.init(&integer_context(6)).unwrap();

    assert_eq!(operations.names(), vec!["splice", "shuffle"]);
    assert_eq!(operations.parents_needed(), 2);

    let parents = vec![
        IntegerArrayGenome::from_alleles(vec![0, 0, 0, 1, 1, 1]),
        IntegerArrayGenome::from_alleles(vec![1, 1, 1, 0, 0, 0]),
    ];
    let offspring = operations
        .perform(&mut StdRng::seed_from_u64(4), &parents)
        .unwrap();
    assert_eq!(offspring.len(), operations.expected_offspring());
    assert!(offspring.iter().all(|g| g.size() == 6));
}

#[test]
fn test_operation_list_rejects_bad_probability() {
    let mut operations: OperationList<IntegerArrayGenome> = OperationList::new();
    assert!(operations.add(1.2, MutateShuffle::new()).is_err());
    assert!(operations.add(-0.1, MutateShuffle::new()).is_err());
    assert!(operations.is_empty());
}
