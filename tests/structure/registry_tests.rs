//! Integration tests for building, freezing and querying registries

use crate::test_helpers::{diagonal_registry, names, scalars};
use ndarray::array;
use std::fs;
use varstruct_rs::structure::{
    DenseEntry, Layout, Leaf, Path, Registry, RegistryState, Resolved, Shape, StructureError,
    Symbol,
};
use varstruct_rs::VarStructError;

fn path(text: &str) -> Path {
    text.parse().unwrap()
}

#[test]
fn test_registry_lifecycle() {
    let mut registry: Registry<Symbol> = Registry::new();
    assert_eq!(registry.state(), RegistryState::Building);

    registry.attach("a", Leaf::scalar("a")).unwrap();
    registry
        .attach("b", Leaf::symbolic("b", Shape::diagonal(2).unwrap()))
        .unwrap();
    registry.rename("a", "alpha").unwrap();

    // Lookup works before freezing, layout queries do not
    assert!(matches!(
        registry.lookup(&path("alpha")).unwrap(),
        Resolved::Leaf(_)
    ));
    assert_eq!(
        registry.flatten_nonzero().unwrap_err(),
        StructureError::RegistryNotFrozen
    );
    assert_eq!(
        registry.offset_of(&path("b")).unwrap_err(),
        StructureError::RegistryNotFrozen
    );

    let layout = registry.freeze().unwrap();
    assert_eq!(layout.total_numel(), 5);
    assert_eq!(layout.total_nnz(), 3);
    assert_eq!(registry.state(), RegistryState::Frozen);

    assert_eq!(registry.freeze().unwrap_err(), StructureError::AlreadyFrozen);
    assert!(matches!(
        registry.attach("c", Leaf::scalar("c")),
        Err(StructureError::ImmutableRegistry { .. })
    ));
    assert_eq!(registry.root().names(), vec!["alpha".to_string(), "b".to_string()]);
}

#[test]
fn test_diagonal_flattening() {
    let registry = diagonal_registry();

    let nonzero = registry.flatten_nonzero().unwrap();
    assert_eq!(names(&nonzero), vec!["a", "b_0", "b_3"]);

    let dense = registry.flatten_dense().unwrap();
    assert_eq!(dense.len(), 5);
    assert_eq!(dense[0], DenseEntry::Present(&Symbol::new("a")));
    assert_eq!(dense[2], DenseEntry::StructuralZero);
    assert_eq!(dense[3], DenseEntry::StructuralZero);
    assert_eq!(dense[4].present(), Some(&Symbol::new("b_3")));

    assert_eq!(registry.reverse_lookup(0).unwrap(), path("a"));
    assert_eq!(registry.reverse_lookup(1).unwrap(), path("b(0,0)"));
    assert_eq!(registry.reverse_lookup(2).unwrap(), path("b(1,1)"));
}

#[test]
fn test_dense_matrix_is_column_major() {
    let mut registry: Registry<Symbol> = Registry::new();
    registry
        .attach("m", Leaf::symbolic("m", Shape::dense(2, 4).unwrap()))
        .unwrap();
    registry.freeze().unwrap();

    let expected: Vec<String> = (0..8).map(|k| format!("m_{}", k)).collect();
    assert_eq!(names(&registry.flatten_nonzero().unwrap()), expected);

    assert_eq!(
        registry.lookup(&path("m(1,2)")).unwrap().as_element(),
        Some(&Symbol::new("m_5"))
    );
    assert_eq!(
        registry.index_matrix(&path("m")).unwrap(),
        array![
            [Some(0), Some(2), Some(4), Some(6)],
            [Some(1), Some(3), Some(5), Some(7)]
        ]
    );
}

#[test]
fn test_lookup_errors() {
    let registry = diagonal_registry();

    for text in ["missing", "a.x", "b[0]", "b(2,2)", "b(4)", "b(0,0)(0,0)"] {
        assert!(
            matches!(
                registry.lookup(&path(text)),
                Err(StructureError::PathNotFound { .. })
            ),
            "expected '{}' to be rejected",
            text
        );
    }
}

#[test]
fn test_lists_and_groups() {
    let mut registry: Registry<Symbol> = Registry::new();
    registry.attach("w", scalars("w", 3)).unwrap();
    registry
        .attach("q", Leaf::symbolic("q", Shape::lower_triangular(2).unwrap()))
        .unwrap();
    registry.freeze().unwrap();

    match registry.lookup(&path("w")).unwrap() {
        Resolved::List(items) => assert_eq!(items.len(), 3),
        other => panic!("expected a list, got {:?}", other),
    }
    match registry.lookup(&Path::new()).unwrap() {
        Resolved::Group(group) => assert_eq!(group.len(), 2),
        other => panic!("expected the root group, got {:?}", other),
    }

    assert_eq!(registry.total_numel().unwrap(), 7);
    assert_eq!(registry.total_nnz().unwrap(), 6);
    assert_eq!(registry.nonzero_indices(&path("w")).unwrap(), vec![0, 1, 2]);
    assert_eq!(registry.nonzero_indices(&path("q")).unwrap(), vec![3, 4, 5]);
    assert_eq!(registry.offset_of(&path("w[2]")).unwrap(), (2, 2));
    assert_eq!(registry.offset_of(&path("q(0,1)")).unwrap(), (5, 5));
    assert_eq!(registry.reverse_lookup(5).unwrap(), path("q(1,1)"));
}

#[test]
fn test_layout_file_round_trip() {
    let registry = diagonal_registry();
    let file = std::env::temp_dir().join("varstruct_layout_round_trip.json");

    registry.save_layout_json(&file).unwrap();
    let loaded = Layout::load_json(&file).unwrap();
    fs::remove_file(&file).ok();

    assert_eq!(&loaded, registry.layout().unwrap());
    assert_eq!(loaded.index_of(&path("b")), Some(1));
    assert_eq!(loaded.slot(&path("b")).unwrap().nnz_offset, 1);
}

#[test]
fn test_save_layout_requires_frozen() {
    let registry: Registry<Symbol> = Registry::new();
    let file = std::env::temp_dir().join("varstruct_unfrozen_layout.json");

    match registry.save_layout_json(&file) {
        Err(VarStructError::Structure(StructureError::RegistryNotFrozen)) => {}
        other => panic!("expected RegistryNotFrozen, got {:?}", other),
    }
}

#[test]
fn test_generic_elements() {
    let mut registry: Registry<f64> = Registry::new();
    registry
        .attach(
            "k",
            Leaf::new("k", Shape::diagonal(2).unwrap(), vec![1.5, 2.5]).unwrap(),
        )
        .unwrap();
    registry
        .attach("c", Leaf::from_fn("c", Shape::column(2).unwrap(), |r, _| r as f64))
        .unwrap();
    registry.freeze().unwrap();

    let flat: Vec<f64> = registry.flatten_nonzero().unwrap().into_iter().copied().collect();
    assert_eq!(flat, vec![1.5, 2.5, 0.0, 1.0]);

    assert!(matches!(
        Leaf::new("bad", Shape::diagonal(2).unwrap(), vec![1.0]),
        Err(StructureError::ShapeMismatch { .. })
    ));
}
