//! # Process schema
//!
//! A [`Process`] is a [`Reaction`] between states together with one or more
//! [`ProcessInfo`] records carrying the measured data: a cross section
//! tabulated against energy, or a (energy) rate coefficient given as a
//! constant, a table, an expression or extended Arrhenius coefficients.
//!
//! Reactions refer to their participants through keys into the enclosing
//! document's `states` map and to their sources through keys into its
//! `references` map. This module only checks the shape of each record; that
//! the keys resolve is checked by the [`relation`](crate::relation) model.
//!
//! ```rust
//! use ltpschema::process::{validate_process_info, DataVariant, ExtendedArrhenius};
//! use serde_json::json;
//!
//! let info = validate_process_info(&json!({
//!     "type": "RateCoefficient",
//!     "threshold": { "unit": "eV", "value": 0.0 },
//!     "references": ["phelps"],
//!     "data": { "a": 2.0e-16, "b": 0.5, "c": -1200.0 }
//! }))
//! .unwrap();
//!
//! let DataVariant::ExtendedArrhenius(rate) = info.data() else { unreachable!() };
//! assert!(rate.evaluate(&[0.0]).is_err());
//! ```

use serde_json::Value;

mod data;
mod error;
mod info;
mod reaction;
mod reference;


pub use data::{Constant, DataVariant, Expression, ExtendedArrhenius, Lut};
pub use error::NumericDomainError;
pub use info::{
    CrossSectionInfo, CrossSectionParameters, Process, ProcessInfo, ProcessInfoType, RateCoefficientInfo, UnitValue,
};
pub use reaction::{Reaction, ReactionEntry, ReactionTypeTag, Role};
pub use reference::{ReferenceKey, ReferenceRef};

use crate::config::ValidationConfig;
use crate::validation::{decode, ValidationErrors};

/// A process as authored in a document: state keys and reference citations.
pub type DocumentProcess = Process<String, ProcessInfo<ReferenceRef>>;

/// Validate a process info payload with the default [`ValidationConfig`].
pub fn validate_process_info(value: &Value) -> Result<ProcessInfo<ReferenceRef>, ValidationErrors> {
    validate_process_info_with_config(value, &ValidationConfig::default())
}

/// Validate a process info payload, returning every violated constraint on failure.
pub fn validate_process_info_with_config(
    value: &Value,
    config: &ValidationConfig,
) -> Result<ProcessInfo<ReferenceRef>, ValidationErrors> {
    decode("process info", value, config)
}

/// Validate a process payload with the default [`ValidationConfig`].
pub fn validate_process(value: &Value) -> Result<DocumentProcess, ValidationErrors> {
    validate_process_with_config(value, &ValidationConfig::default())
}

/// Validate a process payload, returning every violated constraint on failure.
///
/// State keys are only checked to be non-empty; whether they resolve is a
/// property of the enclosing document.
pub fn validate_process_with_config(value: &Value, config: &ValidationConfig) -> Result<DocumentProcess, ValidationErrors> {
    decode("process", value, config)
}
