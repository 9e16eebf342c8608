//! Integration tests for traversal orders and interleaving

use crate::test_helpers::{names, scalars};
use varstruct_rs::config::{InterleavePolicy, OrderPolicy};
use varstruct_rs::structure::{
    Leaf, OrderItem, OrderSpec, Path, Registry, Shape, StructureError, Symbol,
};
use varstruct_rs::RegistryConfig;

/// x: one scalar, y: three 2-vectors, z: `z_len` scalars
fn xyz(z_len: usize, config: RegistryConfig) -> Registry<Symbol> {
    let mut registry = Registry::with_config(config);
    registry.attach("x", scalars("x", 1)).unwrap();
    registry
        .attach(
            "y",
            (0..3)
                .map(|i| Leaf::symbolic(&format!("y{}", i), Shape::column(2).unwrap()))
                .collect::<Vec<_>>(),
        )
        .unwrap();
    registry.attach("z", scalars("z", z_len)).unwrap();
    registry
}

#[test]
fn test_interleave_with_one_short_tail() {
    let mut registry = xyz(2, RegistryConfig::default());
    registry
        .set_order(OrderSpec::new().then("x").interleave(["y", "z"]))
        .unwrap();
    registry.freeze().unwrap();

    assert_eq!(
        names(&registry.flatten_nonzero().unwrap()),
        vec!["x0", "y0_0", "y0_1", "z0", "y1_0", "y1_1", "z1", "y2_0", "y2_1"]
    );
    assert_eq!(
        registry.reverse_lookup(3).unwrap(),
        Path::parse("z[0]").unwrap()
    );
    assert_eq!(
        registry.offset_of(&Path::parse("y[1]").unwrap()).unwrap(),
        (4, 4)
    );
    // A subtree starts at its first leaf in visitation order
    assert_eq!(
        registry.offset_of(&Path::parse("z").unwrap()).unwrap(),
        (3, 3)
    );
    assert_eq!(
        registry
            .nonzero_indices(&Path::parse("z").unwrap())
            .unwrap(),
        vec![3, 6]
    );
}

#[test]
fn test_interleave_rejects_longer_tail() {
    let mut registry = xyz(4, RegistryConfig::default());
    registry
        .set_order(OrderSpec::new().then("x").interleave(["y", "z"]))
        .unwrap();

    let err = registry.freeze().unwrap_err();
    assert_eq!(
        err,
        StructureError::IncompatibleInterleave {
            names: vec!["y".to_string(), "z".to_string()],
            counts: vec![3, 4],
        }
    );
    assert!(!registry.is_frozen());
}

#[test]
fn test_require_equal_interleave() {
    let config = RegistryConfig {
        interleave_policy: InterleavePolicy::RequireEqual,
        ..RegistryConfig::default()
    };

    let mut ragged = xyz(2, config);
    ragged
        .set_order(OrderSpec::new().then("x").interleave(["y", "z"]))
        .unwrap();
    assert!(matches!(
        ragged.freeze(),
        Err(StructureError::IncompatibleInterleave { .. })
    ));

    let mut equal = xyz(3, config);
    equal
        .set_order(OrderSpec::new().then("x").interleave(["y", "z"]))
        .unwrap();
    assert_eq!(equal.freeze().unwrap().total_nnz(), 10);
}

#[test]
fn test_omitted_names_are_appended() {
    let mut registry = xyz(2, RegistryConfig::default());
    registry.set_order(OrderSpec::new().then("z")).unwrap();
    registry.freeze().unwrap();

    assert_eq!(
        names(&registry.flatten_nonzero().unwrap()),
        vec!["z0", "z1", "x0", "y0_0", "y0_1", "y1_0", "y1_1", "y2_0", "y2_1"]
    );
}

#[test]
fn test_require_complete_order() {
    let config = RegistryConfig {
        order_policy: OrderPolicy::RequireComplete,
        ..RegistryConfig::default()
    };
    let mut registry = xyz(2, config);
    registry.set_order(OrderSpec::new().then("z")).unwrap();

    assert_eq!(
        registry.freeze().unwrap_err(),
        StructureError::IncompleteOrder {
            missing: vec!["x".to_string(), "y".to_string()]
        }
    );
}

#[test]
fn test_order_set_once_and_renames_follow() {
    let mut registry = xyz(2, RegistryConfig::default());
    registry
        .set_order(vec![OrderItem::from("z"), OrderItem::from("y")])
        .unwrap();
    assert_eq!(
        registry.set_order(OrderSpec::new().then("x")),
        Err(StructureError::OrderAlreadySet)
    );

    registry.rename("z", "zeta").unwrap();
    assert_eq!(registry.root().order().unwrap().to_string(), "[zeta, y]");
    registry.freeze().unwrap();
    assert_eq!(
        registry.reverse_lookup(0).unwrap(),
        Path::parse("zeta[0]").unwrap()
    );
}

#[test]
fn test_order_with_unknown_name() {
    let mut registry = xyz(2, RegistryConfig::default());
    registry
        .set_order(OrderSpec::new().then("x").then("w"))
        .unwrap();
    assert!(matches!(
        registry.freeze(),
        Err(StructureError::PathNotFound { .. })
    ));
}

#[test]
fn test_leaf_counts_as_one_slot() {
    let mut registry: Registry<Symbol> = Registry::new();
    registry
        .attach("m", Leaf::symbolic("m", Shape::dense(2, 1).unwrap()))
        .unwrap();
    registry.attach("s", scalars("s", 1)).unwrap();
    registry.set_order(OrderSpec::new().interleave(["m", "s"])).unwrap();
    registry.freeze().unwrap();

    assert_eq!(
        names(&registry.flatten_nonzero().unwrap()),
        vec!["m_0", "m_1", "s0"]
    );
}
