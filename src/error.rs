//! Error types for the calculation core
//!
//! `BeregningError` signals a broken invariant in the calling code (misaligned
//! periods, negative amounts, conflicting merknader). `UgyldigBeregningsgrunnlag`
//! rejects calculation input. Expected business outcomes from revurdering live in
//! [`crate::revurdering::RevurderingFeil`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

use crate::merknad::Merknad;
use crate::periode::Periode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BeregningError {
    #[error("fraOgMed {0} må være den første dagen i måneden")]
    FraOgMedIkkeForsteIMaaned(NaiveDate),

    #[error("tilOgMed {0} må være den siste dagen i måneden")]
    TilOgMedIkkeSisteIMaaned(NaiveDate),

    #[error("fraOgMed {fra_og_med} må være før eller lik tilOgMed {til_og_med}")]
    FraOgMedEtterTilOgMed {
        fra_og_med: NaiveDate,
        til_og_med: NaiveDate,
    },

    #[error("ugyldig måned {aar}-{maaned}")]
    UgyldigMaaned { aar: i32, maaned: u32 },

    #[error("perioden {fra_og_med}..{til_og_med} er ikke én kalendermåned")]
    IkkeEnMaaned {
        fra_og_med: NaiveDate,
        til_og_med: NaiveDate,
    },

    #[error("fradrag kan ikke være negativt, var {0}")]
    NegativtFradrag(Decimal),

    #[error("ingen sats tilgjengelig for {0}")]
    SatsIkkeTilgjengelig(NaiveDate),

    #[error("måneden {0} må inneholde nøyaktig ett fradrag for brukers forventede inntekt")]
    ManglerForventetInntekt(NaiveDate),

    #[error("merknad {ny:?} kan ikke kombineres med {eksisterende:?}")]
    MotstridendeMerknader {
        ny: Merknad,
        eksisterende: Merknad,
    },

    #[error("måneden {0} er beregnet mer enn én gang")]
    FlereBeregningerForSammeMaaned(Periode),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UgyldigBeregningsgrunnlag {
    #[error("fradrag kan ikke ligge utenfor beregningsperioden")]
    IkkeLovMedFradragUtenforPerioden,

    #[error("perioder med forventet inntekt kan ikke overlappe")]
    OverlappendePerioderMedForventetInntekt,

    #[error("forventet inntekt mangler for enkelte måneder i beregningsperioden")]
    ManglerForventetInntektForEnkelteMaaneder,

    #[error("fradragstypen {0} kan ikke legges inn av saksbehandler")]
    UgyldigFradragstype(String),

    #[error("forventet inntekt kan ikke være negativ")]
    NegativForventetInntekt,

    #[error(transparent)]
    Beregning(#[from] BeregningError),
}

pub type BeregningResult<T> = std::result::Result<T, BeregningError>;
