//! # ltpschema - Data Model for Low-Temperature Plasma Datasets
//!
//! `ltpschema` is the typed core of a database of electron and heavy-particle
//! collision data for low-temperature plasma modelling: cross sections and
//! rate coefficients of processes between atomic and molecular states, grouped
//! into versioned, citable datasets.
//!
//! ## Key Features
//!
//! - **Species Taxonomy**: Electrons, atoms in LS, LS1, J1L2 and two-term
//!   coupling, and diatomic and triatomic molecules with nested electronic,
//!   vibrational and rotational states, each with canonical plain-text and
//!   LaTeX renderings.
//!
//! - **Exhaustive Validation**: Loosely-typed JSON payloads are checked in one
//!   pass; every problem is reported with the path of the offending field.
//!
//! - **Process Schema**: Reactions with typed data records (tabulated cross
//!   sections, constant, tabulated, symbolic or extended Arrhenius rate
//!   coefficients).
//!
//! - **Versioned Documents**: A pure draft/published/archived/retracted state
//!   machine with durable entity keys.
//!
//! - **Relation Model**: Referential integrity and state hierarchy checks over
//!   a typed graph of processes, sets, states and references.
//!
//! ## Quick Start
//!
//! ```rust
//! use ltpschema::prelude::*;
//! use serde_json::json;
//!
//! let argon = validate_species(&json!({
//!     "type": "AtomJ1L2",
//!     "composition": [["Ar", 1]],
//!     "charge": 0,
//!     "electronic": {
//!         "config": {
//!             "core": {
//!                 "config": [{ "n": 3, "l": 1, "occupance": 5 }],
//!                 "term": { "S": 0.5, "L": 1, "P": -1, "J": 1.5 }
//!             },
//!             "excited": {
//!                 "config": [{ "n": 4, "l": 0, "occupance": 1 }],
//!                 "term": { "S": 0.5, "L": 0, "P": 1 }
//!             }
//!         },
//!         "term": { "S": 0.5, "K": 1.5, "P": -1, "J": 2 }
//!     }
//! }))?;
//!
//! let state = render(&argon);
//! assert_eq!(state.summary, "Ar{3p^{5}{^2P^o_3/2}4s{^2S}2[3/2]^o_2}");
//! # Ok::<(), ValidationErrors>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into the following modules:
//!
//! - [`species`]: Species taxonomy, validation and rendering
//! - [`process`]: Reactions, process infos and their data variants
//! - [`document`]: Keyed and versioned documents and their lifecycle
//! - [`relation`]: Relation graph and referential integrity checks
//! - [`validation`]: Field paths and the validation error taxonomy
//! - [`config`]: Validation settings
//!
//! ## Wire Format
//!
//! Every entity is exchanged as JSON. Variants are tagged by a `type` field,
//! member names are camelCase, stored entities carry a `_key` and stored
//! versions a `versionInfo`:
//!
//! | Entity | Tag | Notes |
//! |--------|-----|-------|
//! | Species | `type` | e.g. `AtomLS`, `HomonuclearDiatom` |
//! | Process info | `type` | `CrossSection`, `RateCoefficient`, `EnergyRateCoefficient` |
//! | Data | `type` (optional) | `Constant`, `LUT`, `Expression`, `ExtendedArrhenius` |
//! | Version info | none | `version`, `createdOn` (RFC 3339), `status` |

// Documentation lints - enforce complete documentation for publication
#![deny(missing_docs)]
#![deny(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod document;
pub mod process;
pub mod relation;
pub mod species;
pub mod validation;

/// Re-export commonly used types for convenience
pub mod prelude {
    pub use crate::config::ValidationConfig;
    pub use crate::document::{
        create, derive_draft, publish, retract, transition, validate_document, validate_edited_document,
        validate_mixture, validate_new_document, Action, KeySource, LifecycleError, LtpDocument, LtpMixture,
        NewLtpDocument, Status, UuidKeySource, VersionedDocument,
    };
    pub use crate::process::{
        validate_process, validate_process_info, DataVariant, ExtendedArrhenius, Process, ProcessInfo, Reaction,
    };
    pub use crate::relation::{validate_relations, RelationGraph, RelationReport};
    pub use crate::species::{render, validate_species, SerializedSpecies, Species, StateSummary};
    pub use crate::validation::{ErrorKind, FieldPath, ValidationError, ValidationErrors};
}
