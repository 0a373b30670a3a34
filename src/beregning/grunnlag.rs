//! Beregningsgrunnlag: validated input to a calculation

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::UgyldigBeregningsgrunnlag;
use crate::fradrag::{Fradrag, FradragFactory, FradragTilhorer, Fradragstype};
use crate::periode::Periode;

/// Expected annual income for the bruker over a period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForventetInntekt {
    pub periode: Periode,
    pub forventet_inntekt_per_ar: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UvalidertGrunnlag")]
pub struct Beregningsgrunnlag {
    periode: Periode,
    forventet_inntekt: Vec<ForventetInntekt>,
    fradrag_fra_saksbehandler: Vec<Fradrag>,
    /// The forventet inntekt as monthly deductions, derived at construction
    #[serde(skip_serializing)]
    forventet_inntekt_fradrag: Vec<Fradrag>,
}

#[derive(Deserialize)]
struct UvalidertGrunnlag {
    periode: Periode,
    forventet_inntekt: Vec<ForventetInntekt>,
    #[serde(default)]
    fradrag_fra_saksbehandler: Vec<Fradrag>,
}

impl TryFrom<UvalidertGrunnlag> for Beregningsgrunnlag {
    type Error = UgyldigBeregningsgrunnlag;

    fn try_from(value: UvalidertGrunnlag) -> Result<Self, Self::Error> {
        Beregningsgrunnlag::med_forventet_inntekt(value.periode, value.forventet_inntekt, value.fradrag_fra_saksbehandler)
    }
}

impl Beregningsgrunnlag {
    /// Input with one expected annual income for the whole period
    pub fn new(
        periode: Periode,
        forventet_inntekt_per_ar: Decimal,
        fradrag_fra_saksbehandler: Vec<Fradrag>,
    ) -> Result<Self, UgyldigBeregningsgrunnlag> {
        Self::med_forventet_inntekt(
            periode,
            vec![ForventetInntekt {
                periode,
                forventet_inntekt_per_ar,
            }],
            fradrag_fra_saksbehandler,
        )
    }

    /// Input where the expected income changes within the period
    ///
    /// The forventet inntekt periods must cover every month exactly once.
    pub fn med_forventet_inntekt(
        periode: Periode,
        mut forventet_inntekt: Vec<ForventetInntekt>,
        fradrag_fra_saksbehandler: Vec<Fradrag>,
    ) -> Result<Self, UgyldigBeregningsgrunnlag> {
        if let Some(ugyldig) = fradrag_fra_saksbehandler
            .iter()
            .find(|f| f.fradragstype().er_systemgenerert())
        {
            return Err(UgyldigBeregningsgrunnlag::UgyldigFradragstype(format!(
                "{:?}",
                ugyldig.fradragstype()
            )));
        }
        if fradrag_fra_saksbehandler
            .iter()
            .any(|f| !periode.inneholder(f.periode()))
        {
            return Err(UgyldigBeregningsgrunnlag::IkkeLovMedFradragUtenforPerioden);
        }

        if forventet_inntekt
            .iter()
            .any(|f| f.forventet_inntekt_per_ar.is_sign_negative() && !f.forventet_inntekt_per_ar.is_zero())
        {
            return Err(UgyldigBeregningsgrunnlag::NegativForventetInntekt);
        }
        if forventet_inntekt.iter().any(|f| !periode.inneholder(&f.periode)) {
            return Err(UgyldigBeregningsgrunnlag::IkkeLovMedFradragUtenforPerioden);
        }
        forventet_inntekt.sort_by_key(|f| f.periode);
        if forventet_inntekt
            .windows(2)
            .any(|par| par[0].periode.overlapper(&par[1].periode))
        {
            return Err(UgyldigBeregningsgrunnlag::OverlappendePerioderMedForventetInntekt);
        }
        let dekkede_maaneder: usize = forventet_inntekt.iter().map(|f| f.periode.antall_maaneder()).sum();
        if dekkede_maaneder != periode.antall_maaneder() {
            return Err(UgyldigBeregningsgrunnlag::ManglerForventetInntektForEnkelteMaaneder);
        }

        let forventet_inntekt_fradrag = forventet_inntekt
            .iter()
            .map(|f| {
                FradragFactory::ny(
                    Fradragstype::ForventetInntekt,
                    f.forventet_inntekt_per_ar / Decimal::from(12),
                    f.periode,
                    FradragTilhorer::Bruker,
                    None,
                )
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            periode,
            forventet_inntekt,
            fradrag_fra_saksbehandler,
            forventet_inntekt_fradrag,
        })
    }

    pub fn periode(&self) -> &Periode {
        &self.periode
    }

    pub fn forventet_inntekt(&self) -> &[ForventetInntekt] {
        &self.forventet_inntekt
    }

    pub fn fradrag_fra_saksbehandler(&self) -> &[Fradrag] {
        &self.fradrag_fra_saksbehandler
    }

    /// Saksbehandler deductions followed by the expected income as deductions
    pub fn fradrag(&self) -> Vec<Fradrag> {
        self.fradrag_fra_saksbehandler
            .iter()
            .chain(&self.forventet_inntekt_fradrag)
            .cloned()
            .collect()
    }

    /// All deductions split into one line item per month
    pub fn periodiserte_fradrag(&self) -> Vec<Fradrag> {
        self.fradrag().iter().flat_map(FradragFactory::periodiser).collect()
    }

    /// The same input restricted to a sub-period
    pub fn begrens_til(&self, periode: &Periode) -> Result<Self, UgyldigBeregningsgrunnlag> {
        if !self.periode.inneholder(periode) {
            return Err(UgyldigBeregningsgrunnlag::IkkeLovMedFradragUtenforPerioden);
        }
        let forventet_inntekt = self
            .forventet_inntekt
            .iter()
            .filter_map(|f| {
                Some(ForventetInntekt {
                    periode: f.periode.snitt(periode)?,
                    forventet_inntekt_per_ar: f.forventet_inntekt_per_ar,
                })
            })
            .collect();
        let fradrag = self
            .fradrag_fra_saksbehandler
            .iter()
            .filter_map(|f| f.snitt(periode))
            .collect();
        Self::med_forventet_inntekt(*periode, forventet_inntekt, fradrag)
    }
}
