//! Grouping of equivalent adjacent months into beregningsperioder
//!
//! Letters and overviews present a calculation as a few periods rather than
//! month by month. A period is a maximal run of calendar-adjacent months whose
//! calculations are equal apart from their dates.

use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet};

use crate::beregning::{Beregning, Maanedsberegning};
use crate::error::{BeregningError, BeregningResult};
use crate::fradrag::Fradrag;
use crate::merknad::Merknader;
use crate::periode::Periode;
use crate::sats::Sats;

/// A run of equivalent, calendar-adjacent months
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EkvivalenteMaanedsberegninger {
    periode: Periode,
    maanedsberegninger: Vec<Maanedsberegning>,
}

impl EkvivalenteMaanedsberegninger {
    /// From the first month's fra og med to the last month's til og med
    pub fn periode(&self) -> &Periode {
        &self.periode
    }

    pub fn maanedsberegninger(&self) -> &[Maanedsberegning] {
        &self.maanedsberegninger
    }

    fn forste(&self) -> &Maanedsberegning {
        // Groups are never empty
        &self.maanedsberegninger[0]
    }

    pub fn sats(&self) -> Sats {
        self.forste().sats()
    }

    pub fn grunnbelop(&self) -> i64 {
        self.forste().grunnbelop()
    }

    pub fn satsbelop(&self) -> Decimal {
        self.forste().satsbelop()
    }

    /// Amount paid per month in the period
    pub fn belop(&self) -> i64 {
        self.forste().belop()
    }

    pub fn sum_ytelse(&self) -> i64 {
        self.maanedsberegninger.iter().map(Maanedsberegning::sum_ytelse).sum()
    }

    pub fn fribelop_for_eps(&self) -> Decimal {
        self.forste().fribelop_for_eps()
    }

    /// The deductions of one month, valid for every month in the period
    pub fn fradrag(&self) -> &[Fradrag] {
        self.forste().fradrag()
    }

    pub fn merknader(&self) -> &Merknader {
        self.forste().merknader()
    }
}

/// Equal in everything but dates
///
/// Deductions are compared as multisets ignoring their period, so the order in
/// which they were entered does not matter.
pub fn likhet_uten_dato(a: &Maanedsberegning, b: &Maanedsberegning) -> bool {
    a.sats() == b.sats()
        && a.satsbelop() == b.satsbelop()
        && a.grunnbelop() == b.grunnbelop()
        && a.belop() == b.belop()
        && a.fribelop_for_eps() == b.fribelop_for_eps()
        && a.merknader() == b.merknader()
        && fradrag_like_uten_dato(a.fradrag(), b.fradrag())
}

fn fradrag_like_uten_dato(a: &[Fradrag], b: &[Fradrag]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut brukt = vec![false; b.len()];
    a.iter().all(|fradrag| {
        let treff = b
            .iter()
            .enumerate()
            .position(|(i, kandidat)| !brukt[i] && fradrag.lik_uten_periode(kandidat));
        match treff {
            Some(i) => {
                brukt[i] = true;
                true
            }
            None => false,
        }
    })
}

pub trait Grupperer {
    /// Ordered runs of equivalent adjacent months
    ///
    /// A month calculated more than once never merges with itself, so each
    /// copy ends up in a run of its own.
    fn grupper(&self) -> Vec<EkvivalenteMaanedsberegninger>;

    /// The same runs keyed by their period
    ///
    /// Fails when a month occurs more than once, since the runs would overlap.
    fn grupper_per_periode(&self) -> BeregningResult<BTreeMap<Periode, Vec<Maanedsberegning>>> {
        let grupper = self.grupper();

        let mut sett = BTreeSet::new();
        for maaned in grupper.iter().flat_map(|gruppe| &gruppe.maanedsberegninger) {
            if !sett.insert(*maaned.periode()) {
                return Err(BeregningError::FlereBeregningerForSammeMaaned(*maaned.periode()));
            }
        }

        Ok(grupper
            .into_iter()
            .map(|gruppe| (gruppe.periode, gruppe.maanedsberegninger))
            .collect())
    }
}

impl Grupperer for [Maanedsberegning] {
    fn grupper(&self) -> Vec<EkvivalenteMaanedsberegninger> {
        let mut sortert: Vec<&Maanedsberegning> = self.iter().collect();
        sortert.sort_by_key(|m| *m.periode());

        let mut grupper: Vec<EkvivalenteMaanedsberegninger> = Vec::new();
        for maaned in sortert {
            match grupper.last_mut() {
                Some(gruppe)
                    if gruppe.periode.tilstoter(maaned.periode())
                        && gruppe
                            .maanedsberegninger
                            .last()
                            .is_some_and(|forrige| likhet_uten_dato(forrige, maaned)) =>
                {
                    gruppe.periode = Periode::new(gruppe.periode.fra_og_med(), maaned.periode().til_og_med())
                        .unwrap_or(gruppe.periode);
                    gruppe.maanedsberegninger.push(maaned.clone());
                }
                _ => grupper.push(EkvivalenteMaanedsberegninger {
                    periode: *maaned.periode(),
                    maanedsberegninger: vec![maaned.clone()],
                }),
            }
        }
        grupper
    }
}

impl Grupperer for Beregning {
    fn grupper(&self) -> Vec<EkvivalenteMaanedsberegninger> {
        self.maanedsberegninger().grupper()
    }
}
