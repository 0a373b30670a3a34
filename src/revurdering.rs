//! Recalculation of a vedtatt beregning during revurdering
//!
//! A reduction in stønad may be deferred to the month after the virkningstidspunkt
//! so the bruker is not cut retroactively. The deferred month keeps its vedtatt
//! amount and only the remaining months are recalculated.

use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::beregning::{Beregning, BeregningStrategy, Beregningsgrunnlag, Maanedsberegning};
use crate::error::{BeregningError, UgyldigBeregningsgrunnlag};
use crate::fradrag::{Fradrag, FradragStrategyName};
use crate::merknad::{klassifiser_endring, Merknader};
use crate::periode::Periode;
use crate::sats::{Sats, Satstabell};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RevurderingFeil {
    #[error("kan ikke velge siste måned av stønadsperioden ved nedgang i stønaden")]
    KanIkkeVelgeSisteMaanedVedNedgangIStonaden,

    #[error(transparent)]
    Beregning(#[from] BeregningError),

    #[error(transparent)]
    UgyldigBeregningsgrunnlag(#[from] UgyldigBeregningsgrunnlag),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RevurdertBeregning {
    vedtatte_maaneder: Vec<Maanedsberegning>,
    beregning: Beregning,
    virkning_utsatt: bool,
    endringsmerknader: BTreeMap<Periode, Merknader>,
}

impl RevurdertBeregning {
    /// Recalculate against the built-in rate table
    pub fn fra_soknadsbehandling(
        vedtatt: &Beregning,
        grunnlag: &Beregningsgrunnlag,
        strategi: BeregningStrategy,
        beregn_med_virkning_neste_maaned_dersom_stonaden_gar_ned: bool,
    ) -> Result<Self, RevurderingFeil> {
        Self::fra_soknadsbehandling_med_satstabell(
            vedtatt,
            grunnlag,
            strategi,
            beregn_med_virkning_neste_maaned_dersom_stonaden_gar_ned,
            Satstabell::standard(),
        )
    }

    /// Recalculate `grunnlag` and compare it with `vedtatt`
    ///
    /// The stønad goes down when the first month of the revurdering pays less
    /// than the same month in `vedtatt`. With the deferral flag set, that
    /// month keeps its vedtatt values and the rest of the period is
    /// recalculated. Deferral needs a following month to move to.
    pub fn fra_soknadsbehandling_med_satstabell(
        vedtatt: &Beregning,
        grunnlag: &Beregningsgrunnlag,
        strategi: BeregningStrategy,
        beregn_med_virkning_neste_maaned_dersom_stonaden_gar_ned: bool,
        satstabell: &Satstabell,
    ) -> Result<Self, RevurderingFeil> {
        let beregning = strategi.beregn(grunnlag, satstabell)?;

        let forste_ny = beregning.maanedsberegninger().first();
        let forste_vedtatt = forste_ny.and_then(|ny| vedtatt.finn_maanedsberegning(ny.periode()));
        let gar_ned = match (forste_ny, forste_vedtatt) {
            (Some(ny), Some(vedtatt)) => ny.sum_ytelse() < vedtatt.sum_ytelse(),
            _ => false,
        };

        let (vedtatte_maaneder, beregning, virkning_utsatt) =
            match (gar_ned && beregn_med_virkning_neste_maaned_dersom_stonaden_gar_ned, forste_vedtatt) {
                (true, Some(forste_vedtatt)) => {
                    let resten = grunnlag
                        .periode()
                        .uten_forste_maaned()
                        .ok_or(RevurderingFeil::KanIkkeVelgeSisteMaanedVedNedgangIStonaden)?;
                    warn!(
                        "Nedgang i stønaden fra {}, virkning utsettes til {}",
                        forste_vedtatt.periode().fra_og_med(),
                        resten.fra_og_med()
                    );
                    let begrenset = grunnlag.begrens_til(&resten)?;
                    (
                        vec![forste_vedtatt.clone()],
                        strategi.beregn(&begrenset, satstabell)?,
                        true,
                    )
                }
                _ => (Vec::new(), beregning, false),
            };

        let endringsmerknader = beregning
            .maanedsberegninger()
            .iter()
            .filter_map(|ny| {
                vedtatt
                    .finn_maanedsberegning(ny.periode())
                    .map(|gammel| klassifiser_endring(gammel, ny).map(|merknader| (*ny.periode(), merknader)))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        debug!(
            "Revurdert beregning {} for {}: sum ytelse {}, virkning utsatt: {}",
            beregning.id(),
            grunnlag.periode(),
            beregning.sum_ytelse(),
            virkning_utsatt
        );

        Ok(Self {
            vedtatte_maaneder,
            beregning,
            virkning_utsatt,
            endringsmerknader,
        })
    }

    /// The recalculated beregning
    pub fn beregning(&self) -> &Beregning {
        &self.beregning
    }

    pub fn sats(&self) -> Sats {
        self.beregning.sats()
    }

    pub fn fradrag(&self) -> &[Fradrag] {
        self.beregning.fradrag()
    }

    /// The recalculated months only
    pub fn maanedsberegninger(&self) -> &[Maanedsberegning] {
        self.beregning.maanedsberegninger()
    }

    /// Vedtatt months kept by deferral, followed by the recalculated months
    pub fn effektive_maanedsberegninger(&self) -> Vec<Maanedsberegning> {
        self.vedtatte_maaneder
            .iter()
            .chain(self.beregning.maanedsberegninger())
            .cloned()
            .collect()
    }

    pub fn sum_ytelse(&self) -> i64 {
        self.beregning.sum_ytelse()
    }

    pub fn sum_fradrag(&self) -> Decimal {
        self.beregning.sum_fradrag()
    }

    pub fn fradrag_strategy_name(&self) -> FradragStrategyName {
        self.beregning.fradrag_strategy_name()
    }

    /// True when a reduction was moved to the following month
    pub fn virkning_utsatt(&self) -> bool {
        self.virkning_utsatt
    }

    /// How each recalculated month changed against the vedtatt month
    pub fn endringsmerknader(&self) -> &BTreeMap<Periode, Merknader> {
        &self.endringsmerknader
    }
}
