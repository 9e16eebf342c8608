//! Randomized checks of the layout invariants
//!
//! Registries are generated from fixed seeds so failures are reproducible.

use crate::test_helpers::{random_registry, seeded_rng};
use approx::assert_relative_eq;
use rand::Rng;
use varstruct_rs::structure::{Mirror, Resolved};

const SEEDS: u64 = 25;

#[test]
fn test_reverse_lookup_identifies_flat_elements() {
    for seed in 0..SEEDS {
        let registry = random_registry(seed);
        let flat = registry.flatten_nonzero().unwrap();
        assert_eq!(flat.len(), registry.total_nnz().unwrap());

        for (k, &expected) in flat.iter().enumerate() {
            let path = registry.reverse_lookup(k).unwrap();
            let found = registry.lookup(&path).unwrap();
            assert_eq!(
                found.as_element(),
                Some(expected),
                "seed {}, index {}, path {}",
                seed,
                k,
                path
            );
        }
        assert!(registry.reverse_lookup(flat.len()).is_err());
    }
}

#[test]
fn test_flattening_lengths_and_offsets() {
    for seed in 0..SEEDS {
        let registry = random_registry(seed);
        let layout = registry.layout().unwrap();

        let dense = registry.flatten_dense().unwrap();
        assert_eq!(dense.len(), layout.total_numel());
        assert!(layout.total_nnz() <= layout.total_numel());
        assert_eq!(
            dense.iter().filter(|entry| entry.present().is_some()).count(),
            layout.total_nnz()
        );

        let mut numel = 0;
        let mut nnz = 0;
        for slot in layout.leaves() {
            assert_eq!(slot.numel_offset, numel);
            assert_eq!(slot.nnz_offset, nnz);
            assert_eq!(slot.shape.cells().len(), slot.shape.nnz());
            assert!(slot
                .shape
                .cells()
                .iter()
                .all(|&(r, c)| slot.shape.contains(r, c)));
            assert!(matches!(
                registry.lookup(&slot.path).unwrap(),
                Resolved::Leaf(_)
            ));
            numel += slot.shape.numel();
            nnz += slot.shape.nnz();
        }
    }
}

#[test]
fn test_mirror_agrees_with_layout() {
    let mut rng = seeded_rng(7);

    for seed in 0..SEEDS {
        let registry = random_registry(seed);
        let total = registry.total_nnz().unwrap();
        let solution: Vec<f64> = (0..total).map(|_| rng.gen_range(-10.0..10.0)).collect();

        let mut values = Mirror::bind(&registry).unwrap();
        values.load_nonzero(&solution).unwrap();

        let dense = values.flatten_dense();
        for (k, &v) in solution.iter().enumerate() {
            let path = registry.reverse_lookup(k).unwrap();
            assert_relative_eq!(values.get(&path).unwrap()[[0, 0]], v);

            let (numel_offset, nnz_offset) = registry.offset_of(&path).unwrap();
            assert_eq!(nnz_offset, k);
            assert_relative_eq!(dense[numel_offset], v);
        }

        let json = values.to_json().unwrap();
        let mut restored = Mirror::bind(&registry).unwrap();
        restored.load_json(&json).unwrap();
        for (a, b) in restored.flatten_nonzero().iter().zip(values.flatten_nonzero().iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-12);
        }
    }
}
