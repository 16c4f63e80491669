//! Report generation.
//!
//! This module renders monthly and weekly contributor counts as text or JSON.

pub mod generator;

pub use generator::*;
