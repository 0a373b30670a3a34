//! Merknader: classification tags attached to a calculated month
//!
//! Tags come in two mutually exclusive groups. A month may carry at most one
//! tag describing how the amount changed against a vedtatt beregning, and at
//! most one tag describing why the amount is at or below the minimum.
//! [`Merknad::EndringGrunnbelop`] belongs to neither group.

use serde::{Deserialize, Serialize};

use crate::beregning::Maanedsberegning;
use crate::error::{BeregningError, BeregningResult};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Merknad {
    EndringGrunnbelop,
    OktYtelse,
    NyYtelse,
    RedusertYtelse,
    EndringUnderTiProsent,
    BelopErNull,
    BelopMellomNullOgToProsentAvHoySats,
    SosialstonadOgAvkortingForerTilBelopLavereEnnToProsentAvHoySats,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Gruppe {
    Endring,
    Belop,
}

impl Merknad {
    fn gruppe(&self) -> Option<Gruppe> {
        match self {
            Merknad::EndringGrunnbelop => None,
            Merknad::OktYtelse
            | Merknad::NyYtelse
            | Merknad::RedusertYtelse
            | Merknad::EndringUnderTiProsent => Some(Gruppe::Endring),
            Merknad::BelopErNull
            | Merknad::BelopMellomNullOgToProsentAvHoySats
            | Merknad::SosialstonadOgAvkortingForerTilBelopLavereEnnToProsentAvHoySats => Some(Gruppe::Belop),
        }
    }

    /// Tags that make a month ineligible for payment
    pub fn er_avslag(&self) -> bool {
        matches!(self, Merknad::BelopErNull | Merknad::BelopMellomNullOgToProsentAvHoySats)
    }
}

/// Insertion-ordered, conflict-checked set of [`Merknad`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Merknad>", into = "Vec<Merknad>")]
pub struct Merknader(Vec<Merknad>);

impl Merknader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tag, failing when another tag of the same group is already present
    pub fn legg_til(&mut self, merknad: Merknad) -> BeregningResult<()> {
        match merknad.gruppe() {
            None => {
                if !self.0.contains(&merknad) {
                    self.0.push(merknad);
                }
                Ok(())
            }
            Some(gruppe) => {
                if let Some(eksisterende) = self.0.iter().find(|m| m.gruppe() == Some(gruppe)) {
                    return Err(BeregningError::MotstridendeMerknader {
                        ny: merknad,
                        eksisterende: *eksisterende,
                    });
                }
                self.0.push(merknad);
                Ok(())
            }
        }
    }

    pub fn inneholder(&self, merknad: Merknad) -> bool {
        self.0.contains(&merknad)
    }

    /// The first tag that leads to avslag, if any
    pub fn avslag(&self) -> Option<Merknad> {
        self.0.iter().copied().find(Merknad::er_avslag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Merknad> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[Merknad] {
        &self.0
    }
}

impl TryFrom<Vec<Merknad>> for Merknader {
    type Error = BeregningError;

    fn try_from(merknader: Vec<Merknad>) -> Result<Self, Self::Error> {
        let mut resultat = Merknader::new();
        for merknad in merknader {
            resultat.legg_til(merknad)?;
        }
        Ok(resultat)
    }
}

impl From<Merknader> for Vec<Merknad> {
    fn from(merknader: Merknader) -> Self {
        merknader.0
    }
}

/// Relative change below which a month counts as unchanged
const TI_PROSENT: Decimal = dec!(0.10);

/// Classify how a recalculated month changed against the vedtatt month
pub fn klassifiser_endring(vedtatt: &Maanedsberegning, ny: &Maanedsberegning) -> BeregningResult<Merknader> {
    let mut merknader = Merknader::new();

    let fra = vedtatt.belop();
    let til = ny.belop();
    let endring = if fra == 0 {
        if til > 0 {
            Merknad::NyYtelse
        } else {
            Merknad::EndringUnderTiProsent
        }
    } else {
        let relativ = (Decimal::from(til) - Decimal::from(fra)).abs() / Decimal::from(fra);
        if relativ < TI_PROSENT {
            Merknad::EndringUnderTiProsent
        } else if til > fra {
            Merknad::OktYtelse
        } else {
            Merknad::RedusertYtelse
        }
    };
    merknader.legg_til(endring)?;

    if vedtatt.grunnbelop() != ny.grunnbelop() {
        merknader.legg_til(Merknad::EndringGrunnbelop)?;
    }

    Ok(merknader)
}
