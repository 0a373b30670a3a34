//! Flat, serialization-stable form of a [`Beregning`]

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::maanedsberegning::Maanedsberegning;
use super::resultat::{Beregning, BeregningFactory};
use crate::fradrag::{Fradrag, FradragStrategyName};
use crate::periode::Periode;
use crate::sats::Sats;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistertBeregning {
    pub id: Uuid,
    pub opprettet: DateTime<Utc>,
    pub periode: Periode,
    pub sats: Sats,
    pub fradrag: Vec<Fradrag>,
    pub maanedsberegninger: Vec<Maanedsberegning>,
    pub fradrag_strategy_name: FradragStrategyName,
}

impl Beregning {
    pub fn to_snapshot(&self) -> PersistertBeregning {
        PersistertBeregning {
            id: self.id(),
            opprettet: self.opprettet(),
            periode: *self.periode(),
            sats: self.sats(),
            fradrag: self.fradrag().to_vec(),
            maanedsberegninger: self.maanedsberegninger().to_vec(),
            fradrag_strategy_name: self.fradrag_strategy_name(),
        }
    }
}

impl PersistertBeregning {
    /// Restore the beregning as stored, without recalculating
    pub fn to_beregning(self) -> Beregning {
        BeregningFactory::med_maanedsberegninger(
            self.id,
            self.opprettet,
            self.periode,
            self.sats,
            self.fradrag,
            self.maanedsberegninger,
            self.fradrag_strategy_name,
        )
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
