//! Integration tests for cart persistence across restarts.
//!
//! Each test opens a store over a temporary directory, changes it, and opens
//! a second store over the same directory the way a page reload would.
//!
//! Run with: cargo test -p fittipaldi-integration-tests --test cart_persistence

#![allow(clippy::unwrap_used)]

use std::fs;

use fittipaldi_cart::{
    CartPersistence, CartStore, KeyValueStorage, MemoryStorage, RestoreError,
};
use fittipaldi_core::ProductId;
use fittipaldi_integration_tests::{FileCart, Product, catalog, random_action};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};

// ============================================================================
// Restore
// ============================================================================

#[test]
fn test_cart_survives_restart() {
    let cart = FileCart::new();
    let products = catalog();
    {
        let mut store = cart.open();
        store.add_item(products[0].clone(), 2).unwrap();
        store.add_item(products[2].clone(), 3).unwrap();
        assert!(store.is_persistent());
    }

    let store = cart.open();
    assert_eq!(store.state().line_count(), 2);
    assert_eq!(store.state().total(), dec!(258059.97));

    let first = &store.state().items()[0];
    assert_eq!(first.id.as_str(), "elite-pro");
    assert_eq!(first.description, "Latex aleman 4mm");
    assert_eq!(first.image.as_deref(), Some("/assets/gloves/elite-pro.webp"));
}

#[test]
fn test_every_operation_reaches_disk() {
    let cart = FileCart::new();
    let mut store = cart.open();
    let elite = ProductId::new("elite-pro");

    store.add_item(catalog()[0].clone(), 1).unwrap();
    assert_eq!(cart.open().state().total(), dec!(129000));

    store.update_quantity(&elite, 3).unwrap();
    assert_eq!(cart.open().state().total(), dec!(387000));

    store.update_quantity(&elite, 0).unwrap();
    assert!(cart.open().state().is_empty());

    store.add_item(catalog()[1].clone(), 1).unwrap();
    store.clear();
    assert!(cart.open().state().is_empty());
}

#[test]
fn test_random_sequences_round_trip_through_disk() {
    let products = catalog();

    for seed in 0..16 {
        let cart = FileCart::new();
        let persistence = CartPersistence::new(Box::new(cart.storage()));
        let mut rng = StdRng::seed_from_u64(seed);
        let mut store = cart.open();

        for step in 0..60 {
            store.dispatch(random_action(&mut rng, &products)).unwrap();
            let state = store.snapshot();

            // What the store wrote on its own.
            let restored = persistence.restore().unwrap().unwrap_or_default();
            assert_eq!(restored, state, "seed {seed} step {step}");

            // An explicit save of the same state reads back identically.
            persistence.save(&state).unwrap();
            assert_eq!(persistence.load(), state, "seed {seed} step {step}");
        }

        assert_eq!(cart.open().snapshot(), store.snapshot());
    }
}

#[test]
fn test_document_on_disk() {
    let cart = FileCart::new();
    let mut store = cart.open();
    store.add_item(Product::new("A", "Guante", dec!(12.50)), 2).unwrap();

    let raw = fs::read_to_string(cart.slot_path()).unwrap();
    let doc: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(doc["version"], 1);
    assert_eq!(doc["total"], "25.00");
    assert_eq!(doc["items"][0]["price"], "12.50");
    assert_eq!(doc["items"][0]["quantity"], 2);
    assert!(doc["saved_at"].is_string());

    // No temp file is left behind after the atomic replace.
    let leftovers: Vec<_> = fs::read_dir(cart.storage().dir())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .filter(|name| name.to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn test_hand_written_document_is_restored() {
    let cart = FileCart::new();
    let doc = json!({
        "version": 1,
        "items": [
            { "id": "A", "name": "Guante", "price": "10", "quantity": 2 },
            { "id": "B", "name": "Cinta", "price": "0.5", "quantity": 4 }
        ],
        "total": "22"
    });
    fs::write(cart.slot_path(), doc.to_string()).unwrap();

    let store = cart.open();
    assert_eq!(store.state().line_count(), 2);
    assert_eq!(store.state().total(), dec!(22));
}

// ============================================================================
// Bad slots
// ============================================================================

#[test]
fn test_bad_documents_start_empty_and_are_removed() {
    let bad = [
        "not json at all".to_string(),
        json!({ "version": 2, "items": [], "total": "0" }).to_string(),
        json!({ "version": 1, "items": "nope", "total": "0" }).to_string(),
        json!({
            "version": 1,
            "items": [{ "id": "A", "name": "G", "price": "10", "quantity": 0 }],
            "total": "0"
        })
        .to_string(),
        json!({
            "version": 1,
            "items": [{ "id": "A", "name": "G", "price": "10", "quantity": 1 }],
            "total": "999"
        })
        .to_string(),
        json!({
            "version": 1,
            "items": [
                { "id": "A", "name": "G", "price": "10", "quantity": 1 },
                { "id": "A", "name": "G", "price": "10", "quantity": 1 }
            ],
            "total": "20"
        })
        .to_string(),
        json!({
            "version": 1,
            "items": [{ "id": "A", "name": "G", "price": Decimal::MAX.to_string(), "quantity": 2 }],
            "total": "0"
        })
        .to_string(),
    ];

    for raw in bad {
        let cart = FileCart::new();
        fs::write(cart.slot_path(), &raw).unwrap();

        let store = cart.open();
        assert!(store.state().is_empty(), "accepted: {raw}");
        assert!(!cart.slot_path().exists(), "not discarded: {raw}");
    }
}

#[test]
fn test_restore_reports_why() {
    let storage = MemoryStorage::new();
    let persistence = CartPersistence::new(Box::new(storage.clone()));
    assert!(persistence.restore().unwrap().is_none());

    storage
        .set(persistence.key(), &json!({ "version": 7 }).to_string())
        .unwrap();
    assert!(matches!(
        persistence.restore(),
        Err(RestoreError::UnsupportedVersion { found: 7, expected: 1 })
    ));

    storage.set(persistence.key(), "{").unwrap();
    assert!(matches!(persistence.restore(), Err(RestoreError::Malformed(_))));
}

#[test]
fn test_unreadable_slot_is_left_alone() {
    let cart = FileCart::new();
    // A directory where the slot file should be: reads and renames both fail.
    fs::create_dir(cart.slot_path()).unwrap();
    fs::write(cart.slot_path().join("keep"), "x").unwrap();

    let mut store = cart.open();
    assert!(store.state().is_empty());
    assert!(cart.slot_path().join("keep").exists());

    store.add_item(catalog()[1].clone(), 1).unwrap();
    assert_eq!(store.state().total(), dec!(45500));
    assert!(!store.is_persistent());
}

// ============================================================================
// Degraded storage
// ============================================================================

#[test]
fn test_storage_outage_and_recovery() {
    let storage = MemoryStorage::new();
    let open = || CartStore::open(CartPersistence::new(Box::new(storage.clone())));

    let mut store = open();
    store.add_item(Product::new("A", "Guante", dec!(10)), 1).unwrap();

    storage.set_enabled(false);
    store.add_item(Product::new("A", "Guante", dec!(10)), 1).unwrap();
    assert!(!store.is_persistent());
    assert_eq!(store.state().total(), dec!(20));

    storage.set_enabled(true);
    assert_eq!(open().state().total(), dec!(10), "outage write must not land");

    store.update_quantity(&ProductId::new("A"), 5).unwrap();
    assert!(store.is_persistent());
    assert_eq!(open().state().total(), dec!(50));
}

#[test]
fn test_quota_keeps_last_saved_document() {
    let storage = MemoryStorage::with_quota(400);
    let open = || CartStore::open(CartPersistence::new(Box::new(storage.clone())));

    let mut store = open();
    store.add_item(Product::new("A", "Guante", dec!(10)), 1).unwrap();
    assert!(store.is_persistent());

    store
        .add_item(Product::new("B", "Bolso", dec!(5)).with_description("x".repeat(1000)), 1)
        .unwrap();
    assert!(!store.is_persistent());
    assert_eq!(store.state().line_count(), 2);

    let reloaded = open();
    assert_eq!(reloaded.state().line_count(), 1);
    assert_eq!(reloaded.state().total(), dec!(10));

    store.remove_item(&ProductId::new("B"));
    assert!(store.is_persistent());
    assert_eq!(open().state().total(), Decimal::from(10));
}
