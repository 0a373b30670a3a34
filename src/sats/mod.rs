//! Sats: the full supplerende stønad amount before deductions
//!
//! The amount is a multiple of the grunnbeløp (G). Høy sats applies to a
//! person living alone, ordinær sats to everyone else.

pub mod loader;
pub mod tabell;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub use loader::DEFAULT_SATSER_PATH;
pub use tabell::{Faktorendring, Garantipensjonsendring, Grunnbelopsendring, Satstabell};

use crate::error::BeregningResult;
use crate::periode::Periode;

static STANDARD: Lazy<Satstabell> = Lazy::new(Satstabell::default);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sats {
    Hoy,
    Ordinaer,
}

/// Convenience lookups against [`Satstabell::standard`]
impl Sats {
    pub fn grunnbelop(&self, dato: NaiveDate) -> BeregningResult<i64> {
        Satstabell::standard().grunnbelop(dato)
    }

    pub fn arsbelop(&self, dato: NaiveDate) -> BeregningResult<Decimal> {
        Satstabell::standard().arsbelop(*self, dato)
    }

    pub fn maanedsbelop(&self, dato: NaiveDate) -> BeregningResult<Decimal> {
        Satstabell::standard().maanedsbelop(*self, dato)
    }

    pub fn periodiser(&self, periode: &Periode) -> BeregningResult<BTreeMap<Periode, Decimal>> {
        Satstabell::standard().periodiser(*self, periode)
    }

    /// Independent of which sats is chosen
    pub fn to_prosent_av_hoy_sats(&self, periode: &Periode) -> BeregningResult<i64> {
        Satstabell::standard().to_prosent_av_hoy_sats(periode)
    }
}

impl fmt::Display for Sats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sats::Hoy => write!(f, "HØY"),
            Sats::Ordinaer => write!(f, "ORDINÆR"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dato(aar: i32, maaned: u32, dag: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(aar, maaned, dag).unwrap()
    }

    #[test]
    fn test_hoy_sats_januar_2020() {
        let januar = dato(2020, 1, 1);
        assert_eq!(Sats::Hoy.grunnbelop(januar).unwrap(), 99858);
        assert_eq!(Sats::Hoy.arsbelop(januar).unwrap(), dec!(247647.84));
        assert_eq!(Sats::Hoy.maanedsbelop(januar).unwrap(), dec!(20637.32));
    }

    #[test]
    fn test_ordinaer_sats_mars_2018() {
        let mars = dato(2018, 3, 1);
        assert_eq!(Sats::Ordinaer.grunnbelop(mars).unwrap(), 93634);
        assert_eq!(Sats::Ordinaer.arsbelop(mars).unwrap(), dec!(213485.52));
        assert_eq!(Sats::Ordinaer.maanedsbelop(mars).unwrap(), dec!(17790.46));
    }

    #[test]
    fn test_periodiser_one_entry_per_month() {
        let periode = Periode::new(dato(2020, 4, 1), dato(2020, 6, 30)).unwrap();
        let periodisert = Sats::Hoy.periodiser(&periode).unwrap();

        assert_eq!(periodisert.len(), 3);
        assert_eq!(periodisert[&Periode::maaned(2020, 4).unwrap()], dec!(20637.32));
        // G 101351 from May 2020: 101351 * 2.48 / 12 = 20945.873..
        assert_eq!(periodisert[&Periode::maaned(2020, 5).unwrap()], dec!(20945.87));
        assert_eq!(periodisert[&Periode::maaned(2020, 6).unwrap()], dec!(20945.87));
    }

    #[test]
    fn test_to_prosent_av_hoy_sats() {
        let forste_kvartal = Periode::new(dato(2020, 1, 1), dato(2020, 3, 31)).unwrap();
        assert_eq!(Sats::Hoy.to_prosent_av_hoy_sats(&forste_kvartal).unwrap(), 1238);
        assert_eq!(Sats::Ordinaer.to_prosent_av_hoy_sats(&forste_kvartal).unwrap(), 1238);

        let aar = Periode::aar(2020).unwrap();
        assert_eq!(Sats::Hoy.to_prosent_av_hoy_sats(&aar).unwrap(), 5002);
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Sats::Ordinaer).unwrap(), "\"ORDINAER\"");
        assert_eq!(serde_json::from_str::<Sats>("\"HOY\"").unwrap(), Sats::Hoy);
    }
}
