//! Household situation to sats and deduction handling

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::grunnlag::Beregningsgrunnlag;
use super::resultat::{Beregning, BeregningFactory};
use crate::error::BeregningResult;
use crate::fradrag::FradragStrategy;
use crate::sats::{Sats, Satstabell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BeregningStrategy {
    BorAlene,
    BorMedVoksne,
    EpsUnder67Ar,
    EpsUnder67ArOgUforFlyktning,
    Eps67EllerEldre,
}

impl BeregningStrategy {
    pub fn sats(&self) -> Sats {
        match self {
            BeregningStrategy::BorAlene => Sats::Hoy,
            _ => Sats::Ordinaer,
        }
    }

    pub fn fradrag_strategy(&self) -> FradragStrategy {
        match self {
            BeregningStrategy::BorAlene | BeregningStrategy::BorMedVoksne => FradragStrategy::Enslig,
            BeregningStrategy::EpsUnder67Ar => FradragStrategy::EpsUnder67Ar,
            BeregningStrategy::EpsUnder67ArOgUforFlyktning => FradragStrategy::EpsUnder67ArOgUforFlyktning,
            BeregningStrategy::Eps67EllerEldre => FradragStrategy::EpsOver67Ar,
        }
    }

    /// Calculate `grunnlag` with this household's sats and deduction handling
    pub fn beregn(&self, grunnlag: &Beregningsgrunnlag, satstabell: &Satstabell) -> BeregningResult<Beregning> {
        self.beregn_med_opprettet(grunnlag, satstabell, None)
    }

    pub fn beregn_med_opprettet(
        &self,
        grunnlag: &Beregningsgrunnlag,
        satstabell: &Satstabell,
        opprettet: Option<DateTime<Utc>>,
    ) -> BeregningResult<Beregning> {
        BeregningFactory::new(satstabell).ny(
            grunnlag.periode().fra_og_med(),
            grunnlag.periode().til_og_med(),
            self.sats(),
            grunnlag.fradrag(),
            self.fradrag_strategy(),
            opprettet,
        )
    }
}
