//! Benefit calculation: from a beregningsgrunnlag to one amount per month

mod grunnlag;
mod maanedsberegning;
mod resultat;
mod snapshot;
mod strategy;

pub use grunnlag::{Beregningsgrunnlag, ForventetInntekt};
pub use maanedsberegning::{Maanedsberegning, MaanedsberegningFactory};
pub use resultat::{etter_opprettet, Beregning, BeregningFactory};
pub use snapshot::PersistertBeregning;
pub use strategy::BeregningStrategy;
