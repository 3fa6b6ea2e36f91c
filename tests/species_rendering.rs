//! End-to-end tests for species validation, rendering and storage snapshots.

use ltpschema::config::ValidationConfig;
use ltpschema::prelude::*;
use ltpschema::species::{validate_species_with_config, SpeciesFamily};
use serde_json::{json, Value};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Validate, serialize and validate again; the two results must agree.
fn round_trip(payload: &Value) -> Species {
    let species = validate_species(payload).unwrap();
    let serialized = serde_json::to_value(&species).unwrap();
    assert_eq!(&serialized, payload, "serialization changed the payload");
    let reparsed = validate_species(&serialized).unwrap();
    assert_eq!(reparsed, species);
    species
}

#[test]
fn test_helium_ion_end_to_end() {
    init_logging();

    let payload = json!({
        "type": "AtomLS",
        "composition": [["He", 1]],
        "charge": 1,
        "electronic": { "config": [], "term": { "L": 0, "S": 0.5, "P": 1, "J": 0.5 } }
    });

    let species = round_trip(&payload);
    assert_eq!(species.species_type().family(), SpeciesFamily::Atom);
    assert_eq!(species.charge(), 1);
    assert_eq!(render(&species).summary, "He^+{^2S_1/2}");
    assert_eq!(species.to_string(), "He^+{^2S_1/2}");
}

#[test]
fn test_molecule_end_to_end() {
    init_logging();

    let payload = json!({
        "type": "HomonuclearDiatom",
        "composition": [["N", 2]],
        "charge": 0,
        "electronic": {
            "energyId": "X",
            "Lambda": 0,
            "S": 0,
            "parity": "g",
            "reflection": "+",
            "vibrational": { "v": 1, "rotational": { "J": 4 } }
        }
    });

    let species = round_trip(&payload);
    let state = render(&species);
    assert_eq!(state.summary, "N2{X^1S_g^+{1{4}}}");
    assert_eq!(state.composition.summary, "N2");
    assert_eq!(render(&species), state);
}

#[test]
fn test_all_errors_in_one_pass() {
    init_logging();

    let errors = validate_species(&json!({
        "type": "HeteronuclearDiatom",
        "composition": [["O", 1], ["O", 1]],
        "charge": "neutral",
        "electronic": { "energyId": "X", "Lambda": -1, "S": 0 }
    }))
    .unwrap_err();

    assert!(errors.contains_kind(ErrorKind::Composition));
    assert!(errors.contains_kind(ErrorKind::Structural));
    let paths: Vec<String> = errors.iter().map(|e| e.path.to_string()).collect();
    assert!(paths.contains(&"composition".to_string()));
    assert!(paths.contains(&"charge".to_string()));
    assert!(paths.iter().any(|p| p.starts_with("electronic")));
}

#[test]
fn test_physics_checks_follow_config() {
    init_logging();

    // J = 2 cannot couple L = 0 and S = 1/2
    let payload = json!({
        "type": "AtomLS",
        "composition": [["He", 1]],
        "charge": 1,
        "electronic": { "config": [], "term": { "L": 0, "S": 0.5, "P": 1, "J": 2 } }
    });

    let errors = validate_species(&payload).unwrap_err();
    assert!(errors.iter().all(|e| e.kind == ErrorKind::QuantumNumber));

    let config = ValidationConfig::from_toml_str("[validation]\ncheck_coupling = false\n").unwrap();
    assert!(validate_species_with_config(&payload, &config).is_ok());
}

#[test]
fn test_composition_depth_bound() {
    init_logging();

    let payload = json!({
        "type": "Unspecified",
        "composition": [["Si", 1], [[["C", 1], ["H", 3]], 4]],
        "charge": 0
    });
    let species = validate_species(&payload).unwrap();
    assert_eq!(species.composition_summary().summary, "Si(CH3)4");

    let shallow = ValidationConfig {
        max_composition_depth: 1,
        ..ValidationConfig::default()
    };
    let errors = validate_species_with_config(&payload, &shallow).unwrap_err();
    assert!(errors.contains_kind(ErrorKind::Composition));
}

#[test]
fn test_serialized_species_snapshot() {
    init_logging();

    let species = validate_species(&json!({ "type": "Electron", "composition": "e", "charge": -1 })).unwrap();
    let stored = SerializedSpecies::new(species.clone());
    assert_eq!(stored.summary(), "e^-");
    assert!(stored.is_current());

    let value = serde_json::to_value(&stored).unwrap();
    assert_eq!(value["detailed"]["type"], json!("Electron"));
    assert_eq!(value["serialized"]["summary"], json!("e^-"));
    assert_eq!(stored.detailed(), &species);
}
