//! Fradrag: income deducted from the sats before payment

pub mod strategy;
pub mod types;

pub use strategy::{FradragStrategy, FradragStrategyName};
pub use types::{Fradrag, FradragFactory, FradragTilhorer, Fradragstype, UtenlandskInntekt};
