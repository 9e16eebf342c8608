//! Integration tests for the path text form

use crate::test_helpers::random_registry;
use varstruct_rs::structure::{is_identifier, Path, PathToken, StructureError};

#[test]
fn test_parse_and_build_agree() {
    let cases = [
        ("x", Path::new().name("x")),
        ("xother.b(1,1)", Path::new().name("xother").name("b").cell(1, 1)),
        ("b[2][0](1)", Path::new().name("b").index(2).index(0).element(1)),
        ("g.d.a", Path::from_names(["g", "d", "a"]).unwrap()),
        ("", Path::new()),
    ];

    for (text, built) in cases {
        assert_eq!(Path::parse(text).unwrap(), built, "parsing '{}'", text);
        assert_eq!(built.to_string(), text);
    }
}

#[test]
fn test_whitespace_inside_brackets() {
    let path: Path = " y( 2 , 1 ) ".parse().unwrap();
    assert_eq!(path.tokens(), &[PathToken::Name("y".to_string()), PathToken::Cell(2, 1)]);
    assert_eq!(path.to_string(), "y(2,1)");
}

#[test]
fn test_rejected_paths() {
    for text in ["x.", ".x", "x[a]", "x(1,)", "x[-1]", "x.(0)", "x)"] {
        match Path::parse(text) {
            Err(StructureError::InvalidPath { input, .. }) => assert_eq!(input, text),
            other => panic!("expected '{}' to be rejected, got {:?}", text, other),
        }
    }
}

#[test]
fn test_from_names_keeps_text_form_parseable() {
    let path = Path::from_names(vec!["outer".to_string(), "inner_2".to_string()]).unwrap();
    assert_eq!(Path::parse(&path.to_string()).unwrap(), path);

    for bad in ["a.b", "2x", "", "x(0)"] {
        match Path::from_names(["ok", bad]) {
            Err(StructureError::InvalidPath { input, .. }) => assert_eq!(input, bad),
            other => panic!("expected '{}' to be rejected, got {:?}", bad, other),
        }
    }
}

#[test]
fn test_identifiers() {
    for name in ["a", "xother", "_tmp", "z2"] {
        assert!(is_identifier(name));
    }
    for name in ["", "2z", "a.b", "a[0]", "a-b"] {
        assert!(!is_identifier(name));
    }
}

#[test]
fn test_layout_paths_round_trip_through_text() {
    for seed in 0..10 {
        let registry = random_registry(seed);
        for slot in registry.layout().unwrap().leaves() {
            let text = slot.path.to_string();
            assert_eq!(Path::parse(&text).unwrap(), slot.path);
        }
    }
}
