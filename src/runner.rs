//! Batch runner for many independent calculations
//!
//! Loads the rate tables once, then calculates any number of requests against
//! them. Batches are spread over all cores with rayon.

use chrono::NaiveDate;
use log::info;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::error::Error;
use std::path::Path;
use std::time::Instant;

use crate::beregning::{Beregning, BeregningStrategy, Beregningsgrunnlag};
use crate::error::BeregningResult;
use crate::revurdering::{RevurderingFeil, RevurdertBeregning};
use crate::sats::Satstabell;

/// One calculation to run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeregningForesporsel {
    pub grunnlag: Beregningsgrunnlag,
    pub strategi: BeregningStrategy,
    /// Only rate changes decided on or before this date are used
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knekkpunkt: Option<NaiveDate>,
}

/// Totals over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOppsummering {
    pub antall: usize,
    pub antall_feilet: usize,
    pub sum_ytelse: i64,
}

impl BatchOppsummering {
    pub fn fra(resultater: &[BeregningResult<Beregning>]) -> Self {
        resultater.iter().fold(Self::default(), |mut sum, resultat| {
            sum.antall += 1;
            match resultat {
                Ok(beregning) => sum.sum_ytelse += beregning.sum_ytelse(),
                Err(_) => sum.antall_feilet += 1,
            }
            sum
        })
    }
}

/// Pre-loaded runner for batch calculations
///
/// # Example
/// ```ignore
/// let runner = BeregningRunner::from_csv()?;
/// let resultater = runner.beregn_batch(&foresporsler);
/// ```
#[derive(Debug, Clone)]
pub struct BeregningRunner {
    satstabell: Satstabell,
}

impl BeregningRunner {
    /// Create runner with the built-in rate tables
    pub fn new() -> Self {
        Self {
            satstabell: Satstabell::default(),
        }
    }

    /// Create runner by loading rate tables from the default CSV directory
    pub fn from_csv() -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            satstabell: Satstabell::load_default()?,
        })
    }

    /// Create runner from a specific rate table directory
    pub fn from_csv_path(path: &Path) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Self {
            satstabell: Satstabell::from_csv_path(path)?,
        })
    }

    pub fn with_satstabell(satstabell: Satstabell) -> Self {
        Self { satstabell }
    }

    pub fn satstabell(&self) -> &Satstabell {
        &self.satstabell
    }

    fn satstabell_for(&self, knekkpunkt: Option<NaiveDate>) -> Cow<'_, Satstabell> {
        match knekkpunkt {
            Some(dato) => Cow::Owned(self.satstabell.paa_knekkpunkt(dato)),
            None => Cow::Borrowed(&self.satstabell),
        }
    }

    /// Run a single calculation
    pub fn run(&self, foresporsel: &BeregningForesporsel) -> BeregningResult<Beregning> {
        let satstabell = self.satstabell_for(foresporsel.knekkpunkt);
        foresporsel.strategi.beregn(&foresporsel.grunnlag, &satstabell)
    }

    /// Run many calculations in parallel, results in input order
    pub fn beregn_batch(&self, foresporsler: &[BeregningForesporsel]) -> Vec<BeregningResult<Beregning>> {
        let start = Instant::now();
        let resultater: Vec<BeregningResult<Beregning>> =
            foresporsler.par_iter().map(|foresporsel| self.run(foresporsel)).collect();

        let oppsummering = BatchOppsummering::fra(&resultater);
        info!(
            "Beregnet {} forespørsler ({} feilet) på {:?}, sum ytelse {}",
            oppsummering.antall,
            oppsummering.antall_feilet,
            start.elapsed(),
            oppsummering.sum_ytelse
        );
        resultater
    }

    /// Recalculate a request against a vedtatt beregning
    pub fn revurder(
        &self,
        vedtatt: &Beregning,
        foresporsel: &BeregningForesporsel,
        beregn_med_virkning_neste_maaned_dersom_stonaden_gar_ned: bool,
    ) -> Result<RevurdertBeregning, RevurderingFeil> {
        let satstabell = self.satstabell_for(foresporsel.knekkpunkt);
        RevurdertBeregning::fra_soknadsbehandling_med_satstabell(
            vedtatt,
            &foresporsel.grunnlag,
            foresporsel.strategi,
            beregn_med_virkning_neste_maaned_dersom_stonaden_gar_ned,
            &satstabell,
        )
    }
}

impl Default for BeregningRunner {
    fn default() -> Self {
        Self::new()
    }
}
