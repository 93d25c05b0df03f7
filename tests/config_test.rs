//! Integration tests for TreeConfig loading.
//!
//! These run without touching RBINDEX_* variables; env overrides live in
//! config_env_test.rs so they get their own process.

use std::fs;

use tempfile::TempDir;

use rbindex::config::{local_config_path, MAX_INITIAL_CAPACITY};
use rbindex::{RbTree, TreeConfig, TreeError};

#[test]
fn given_no_local_file_when_load_then_returns_defaults() {
    let dir = TempDir::new().unwrap();
    let config = TreeConfig::load(Some(dir.path())).expect("load config");
    assert_eq!(config, TreeConfig::default());
}

#[test]
fn given_local_file_when_load_then_overrides_only_listed_fields() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "max_nodes = 128\ncheck_invariants = true\n",
    )
    .unwrap();

    let config = TreeConfig::load(Some(dir.path())).expect("load config");

    assert_eq!(config.max_nodes, Some(128));
    assert!(config.check_invariants);
    assert_eq!(config.initial_capacity, TreeConfig::default().initial_capacity);
}

#[test]
fn given_malformed_local_file_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "max_nodes = \"lots\"\n").unwrap();

    let result = TreeConfig::load(Some(dir.path()));

    match result {
        Err(TreeError::Config { message }) => assert!(message.contains("parse")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn given_config_when_serialized_then_parses_back() {
    let config = TreeConfig {
        initial_capacity: 4,
        max_nodes: Some(10),
        check_invariants: true,
    };
    let text = config.to_toml().unwrap();
    assert!(text.contains("max_nodes = 10"));
    assert_eq!(TreeConfig::from_toml_str(&text).unwrap(), config);
}

#[test]
fn given_loaded_limit_when_building_tree_then_limit_applies() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "max_nodes = 1\n").unwrap();
    let config = TreeConfig::load(Some(dir.path())).unwrap();

    let mut tree = RbTree::with_config(config);
    tree.insert("a").unwrap();
    assert!(matches!(
        tree.insert("b"),
        Err(TreeError::CapacityExhausted { limit: 1 })
    ));
}

#[test]
fn given_huge_initial_capacity_when_building_tree_then_reservation_is_capped() {
    let config = TreeConfig {
        initial_capacity: usize::MAX,
        ..Default::default()
    };
    let mut tree = RbTree::with_config(config);
    tree.insert(1u8).unwrap();
    assert_eq!(tree.to_array(4), vec![1]);

    let bounded = TreeConfig {
        initial_capacity: usize::MAX,
        max_nodes: Some(2),
        ..Default::default()
    };
    assert_eq!(bounded.reserved_slots(), 2);
    let _tree: RbTree<u8> = RbTree::with_config(bounded);
}

#[test]
fn given_out_of_range_capacity_in_local_file_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    let too_big = MAX_INITIAL_CAPACITY + 1;
    fs::write(
        local_config_path(dir.path()),
        format!("initial_capacity = {too_big}\n"),
    )
    .unwrap();

    match TreeConfig::load(Some(dir.path())) {
        Err(TreeError::Config { message }) => assert!(message.contains("initial_capacity")),
        other => panic!("expected config error, got {:?}", other),
    }
}

#[test]
fn given_out_of_range_capacity_in_toml_when_parsing_then_config_error() {
    let text = format!("initial_capacity = {}\n", MAX_INITIAL_CAPACITY + 1);
    assert!(matches!(
        TreeConfig::from_toml_str(&text),
        Err(TreeError::Config { .. })
    ));
    assert!(TreeConfig::from_toml_str(&format!("initial_capacity = {MAX_INITIAL_CAPACITY}\n")).is_ok());
}
