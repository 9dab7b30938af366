//! # Scoring Module
//!
//! Pillar formulas, labels and alert rules over a metric snapshot.

mod alerts;
mod pillar;
mod scorer;

pub use alerts::*;
pub use pillar::*;
pub use scorer::*;
