//! Integration tests for the structure module
//!
//! These tests drive registries through their whole lifecycle using only the public API.

// Building, freezing and querying registries
mod registry_tests;

// Traversal orders and interleaving
mod order_tests;

// Path text form
mod path_tests;


// Randomized reverse-lookup and flattening properties
mod roundtrip_tests;
