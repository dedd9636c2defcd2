//! Document converters
//!
//! `gp5` is the bit-exact binary codec; `interchange` is the lossy
//! JSON/YAML tree view of the same model.

pub mod gp5;
pub mod interchange;
