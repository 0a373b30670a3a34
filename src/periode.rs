//! Month-aligned calendar periods
//!
//! A `Periode` always starts on the first day of a month and ends on the last
//! day of a month. Every calculation in the crate is expressed in whole months.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BeregningError, BeregningResult};

/// Inclusive interval `[fra_og_med, til_og_med]` of whole calendar months
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "UvalidertPeriode")]
pub struct Periode {
    fra_og_med: NaiveDate,
    til_og_med: NaiveDate,
}

#[derive(Deserialize)]
struct UvalidertPeriode {
    fra_og_med: NaiveDate,
    til_og_med: NaiveDate,
}

impl TryFrom<UvalidertPeriode> for Periode {
    type Error = BeregningError;

    fn try_from(value: UvalidertPeriode) -> Result<Self, Self::Error> {
        Periode::new(value.fra_og_med, value.til_og_med)
    }
}

impl Periode {
    /// Create a period, validating month alignment and ordering
    pub fn new(fra_og_med: NaiveDate, til_og_med: NaiveDate) -> BeregningResult<Self> {
        if fra_og_med.day() != 1 {
            return Err(BeregningError::FraOgMedIkkeForsteIMaaned(fra_og_med));
        }
        if Some(til_og_med) != siste_dag(til_og_med.year(), til_og_med.month()) {
            return Err(BeregningError::TilOgMedIkkeSisteIMaaned(til_og_med));
        }
        if fra_og_med > til_og_med {
            return Err(BeregningError::FraOgMedEtterTilOgMed { fra_og_med, til_og_med });
        }
        Ok(Self { fra_og_med, til_og_med })
    }

    /// The calendar month `aar-maaned`
    pub fn maaned(aar: i32, maaned: u32) -> BeregningResult<Self> {
        let fra_og_med = NaiveDate::from_ymd_opt(aar, maaned, 1)
            .ok_or(BeregningError::UgyldigMaaned { aar, maaned })?;
        let til_og_med = siste_dag(aar, maaned).ok_or(BeregningError::UgyldigMaaned { aar, maaned })?;
        Ok(Self { fra_og_med, til_og_med })
    }

    /// The calendar month containing `dato`
    pub fn maaned_for(dato: NaiveDate) -> BeregningResult<Self> {
        Self::maaned(dato.year(), dato.month())
    }

    /// January through December of `aar`
    pub fn aar(aar: i32) -> BeregningResult<Self> {
        let fra_og_med = Self::maaned(aar, 1)?.fra_og_med;
        let til_og_med = Self::maaned(aar, 12)?.til_og_med;
        Ok(Self { fra_og_med, til_og_med })
    }

    pub fn fra_og_med(&self) -> NaiveDate {
        self.fra_og_med
    }

    pub fn til_og_med(&self) -> NaiveDate {
        self.til_og_med
    }

    /// Every calendar month in the period, in ascending order
    pub fn maaneder(&self) -> Vec<Periode> {
        let mut maaneder = Vec::with_capacity(self.antall_maaneder());
        let mut fra_og_med = self.fra_og_med;
        while fra_og_med <= self.til_og_med {
            let Some(til_og_med) = siste_dag(fra_og_med.year(), fra_og_med.month()) else {
                break;
            };
            maaneder.push(Periode { fra_og_med, til_og_med });
            match til_og_med.succ_opt() {
                Some(neste) => fra_og_med = neste,
                None => break,
            }
        }
        maaneder
    }

    pub fn antall_maaneder(&self) -> usize {
        let fra = self.fra_og_med.year() * 12 + self.fra_og_med.month0() as i32;
        let til = self.til_og_med.year() * 12 + self.til_og_med.month0() as i32;
        (til - fra + 1) as usize
    }

    pub fn er_enkeltmaaned(&self) -> bool {
        self.antall_maaneder() == 1
    }

    pub fn inneholder_dato(&self, dato: NaiveDate) -> bool {
        self.fra_og_med <= dato && dato <= self.til_og_med
    }

    /// True when `other` lies completely inside `self`
    pub fn inneholder(&self, other: &Periode) -> bool {
        self.fra_og_med <= other.fra_og_med && other.til_og_med <= self.til_og_med
    }

    pub fn overlapper(&self, other: &Periode) -> bool {
        self.fra_og_med <= other.til_og_med && other.fra_og_med <= self.til_og_med
    }

    /// True when one period ends the day before the other begins
    pub fn tilstoter(&self, other: &Periode) -> bool {
        self.til_og_med.succ_opt() == Some(other.fra_og_med)
            || other.til_og_med.succ_opt() == Some(self.fra_og_med)
    }

    /// Intersection of two periods, `None` when disjoint
    pub fn snitt(&self, other: &Periode) -> Option<Periode> {
        if !self.overlapper(other) {
            return None;
        }
        Some(Periode {
            fra_og_med: self.fra_og_med.max(other.fra_og_med),
            til_og_med: self.til_og_med.min(other.til_og_med),
        })
    }

    /// Union of two overlapping or adjacent periods
    pub fn slaa_sammen(&self, other: &Periode) -> Option<Periode> {
        if !self.overlapper(other) && !self.tilstoter(other) {
            return None;
        }
        Some(Periode {
            fra_og_med: self.fra_og_med.min(other.fra_og_med),
            til_og_med: self.til_og_med.max(other.til_og_med),
        })
    }

    /// The period starting one month later, `None` if nothing remains
    pub fn uten_forste_maaned(&self) -> Option<Periode> {
        let neste = self.maaneder().into_iter().nth(1)?;
        Some(Periode {
            fra_og_med: neste.fra_og_med,
            til_og_med: self.til_og_med,
        })
    }
}

impl fmt::Display for Periode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.fra_og_med, self.til_og_med)
    }
}

fn siste_dag(aar: i32, maaned: u32) -> Option<NaiveDate> {
    let (neste_aar, neste_maaned) = if maaned == 12 { (aar + 1, 1) } else { (aar, maaned + 1) };
    NaiveDate::from_ymd_opt(neste_aar, neste_maaned, 1)?.pred_opt()
}
