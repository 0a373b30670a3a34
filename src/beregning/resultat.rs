//! The `Beregning` aggregate and its factory

use chrono::{DateTime, NaiveDate, Utc};
use log::debug;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use uuid::Uuid;

use super::maanedsberegning::{Maanedsberegning, MaanedsberegningFactory};
use crate::belop::summer;
use crate::error::BeregningResult;
use crate::fradrag::{Fradrag, FradragStrategy, FradragStrategyName};
use crate::gruppering::{EkvivalenteMaanedsberegninger, Grupperer};
use crate::merknad::{Merknad, Merknader};
use crate::periode::Periode;
use crate::sats::{Sats, Satstabell};

/// A calculated benefit over a period, one [`Maanedsberegning`] per month
#[derive(Debug, Clone, PartialEq)]
pub struct Beregning {
    id: Uuid,
    opprettet: DateTime<Utc>,
    periode: Periode,
    sats: Sats,
    fradrag: Vec<Fradrag>,
    maanedsberegninger: Vec<Maanedsberegning>,
    fradrag_strategy_name: FradragStrategyName,
}

impl Beregning {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn opprettet(&self) -> DateTime<Utc> {
        self.opprettet
    }

    pub fn periode(&self) -> &Periode {
        &self.periode
    }

    pub fn sats(&self) -> Sats {
        self.sats
    }

    /// The deductions the calculation was made from, before household handling
    pub fn fradrag(&self) -> &[Fradrag] {
        &self.fradrag
    }

    pub fn maanedsberegninger(&self) -> &[Maanedsberegning] {
        &self.maanedsberegninger
    }

    pub fn fradrag_strategy_name(&self) -> FradragStrategyName {
        self.fradrag_strategy_name
    }

    pub fn sum_ytelse(&self) -> i64 {
        self.maanedsberegninger.iter().map(Maanedsberegning::sum_ytelse).sum()
    }

    /// Deductions actually applied, summed over all months
    pub fn sum_fradrag(&self) -> Decimal {
        summer(self.maanedsberegninger.iter().map(Maanedsberegning::sum_fradrag))
    }

    /// Contiguous runs of equivalent months
    pub fn beregningsperioder(&self) -> Vec<EkvivalenteMaanedsberegninger> {
        self.grupper()
    }

    pub fn finn_maanedsberegning(&self, maaned: &Periode) -> Option<&Maanedsberegning> {
        self.maanedsberegninger.iter().find(|m| m.periode() == maaned)
    }

    pub fn finn_merknader_for_periode(&self, maaned: &Periode) -> Option<&Merknader> {
        self.finn_maanedsberegning(maaned).map(Maanedsberegning::merknader)
    }

    pub fn finn_maaneder_med_merknad(&self) -> Vec<&Maanedsberegning> {
        self.maanedsberegninger
            .iter()
            .filter(|m| !m.merknader().is_empty())
            .collect()
    }

    /// The earliest month tagged with a merknad that leads to avslag
    pub fn finn_forste_maaned_med_merknad_for_avslag(&self) -> Option<(&Maanedsberegning, Merknad)> {
        self.maanedsberegninger
            .iter()
            .find_map(|m| m.merknader().avslag().map(|merknad| (m, merknad)))
    }

    pub fn har_alle_maaneder_merknad_for_avslag(&self) -> bool {
        self.maanedsberegninger
            .iter()
            .all(|m| m.merknader().avslag().is_some())
    }

    /// Equal in everything except id and creation time
    pub fn ekvivalent_med(&self, other: &Beregning) -> bool {
        self.periode == other.periode
            && self.sats == other.sats
            && self.fradrag == other.fradrag
            && self.maanedsberegninger == other.maanedsberegninger
            && self.fradrag_strategy_name == other.fradrag_strategy_name
    }
}

/// Orders beregninger by creation time, earliest first
pub fn etter_opprettet(a: &Beregning, b: &Beregning) -> Ordering {
    a.opprettet.cmp(&b.opprettet)
}

pub struct BeregningFactory<'a> {
    satstabell: &'a Satstabell,
}

impl Default for BeregningFactory<'static> {
    fn default() -> Self {
        Self::new(Satstabell::standard())
    }
}

impl<'a> BeregningFactory<'a> {
    pub fn new(satstabell: &'a Satstabell) -> Self {
        Self { satstabell }
    }

    /// Calculate every month from `fra_og_med` through `til_og_med`
    ///
    /// Fails unless the bounds are month aligned and ordered, and unless every
    /// month carries exactly one forventet inntekt for the bruker.
    pub fn ny(
        &self,
        fra_og_med: NaiveDate,
        til_og_med: NaiveDate,
        sats: Sats,
        fradrag: Vec<Fradrag>,
        fradrag_strategy: FradragStrategy,
        opprettet: Option<DateTime<Utc>>,
    ) -> BeregningResult<Beregning> {
        let periode = Periode::new(fra_og_med, til_og_med)?;

        let per_maaned = fradrag_strategy.beregn(&fradrag, &periode, self.satstabell)?;
        let maanedsberegninger = per_maaned
            .into_iter()
            .map(|(maaned, fradrag_for_maaned)| {
                let fribelop = fradrag_strategy.eps_fribelop(&maaned, self.satstabell)?;
                MaanedsberegningFactory::ny_med_satstabell(maaned, sats, fradrag_for_maaned, fribelop, self.satstabell)
            })
            .collect::<BeregningResult<Vec<_>>>()?;

        let beregning = Beregning {
            id: Uuid::new_v4(),
            opprettet: opprettet.unwrap_or_else(Utc::now),
            periode,
            sats,
            fradrag,
            maanedsberegninger,
            fradrag_strategy_name: fradrag_strategy.name(),
        };
        debug!(
            "Beregning {} for {} ({}, {}): sum ytelse {}",
            beregning.id,
            beregning.periode,
            beregning.sats,
            beregning.fradrag_strategy_name,
            beregning.sum_ytelse()
        );
        Ok(beregning)
    }

    /// Rebuild a beregning from stored parts without recalculating the months
    pub fn med_maanedsberegninger(
        id: Uuid,
        opprettet: DateTime<Utc>,
        periode: Periode,
        sats: Sats,
        fradrag: Vec<Fradrag>,
        maanedsberegninger: Vec<Maanedsberegning>,
        fradrag_strategy_name: FradragStrategyName,
    ) -> Beregning {
        Beregning {
            id,
            opprettet,
            periode,
            sats,
            fradrag,
            maanedsberegninger,
            fradrag_strategy_name,
        }
    }
}
