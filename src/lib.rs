//! Supplerende stønad - calculation core for monthly benefit amounts
//!
//! This library provides:
//! - Effective-dated rate tables (grunnbeløp, sats factors, garantipensjon)
//! - Deduction handling by household composition
//! - Month-by-month calculation with minimum-amount merknader
//! - Grouping of equivalent months into beregningsperioder
//! - Recalculation against a vedtatt beregning during revurdering
//! - Parallel batch calculation

pub mod belop;
pub mod beregning;
pub mod error;
pub mod fradrag;
pub mod gruppering;
pub mod merknad;
pub mod periode;
pub mod revurdering;
pub mod runner;
pub mod sats;

// Re-export commonly used types
pub use beregning::{
    Beregning, BeregningFactory, BeregningStrategy, Beregningsgrunnlag, Maanedsberegning, PersistertBeregning,
};
pub use error::{BeregningError, UgyldigBeregningsgrunnlag};
pub use fradrag::{Fradrag, FradragFactory, FradragStrategy, FradragTilhorer, Fradragstype};
pub use gruppering::{EkvivalenteMaanedsberegninger, Grupperer};
pub use merknad::{Merknad, Merknader};
pub use periode::Periode;
pub use revurdering::{RevurderingFeil, RevurdertBeregning};
pub use runner::{BeregningForesporsel, BeregningRunner};
pub use sats::{Sats, Satstabell};
