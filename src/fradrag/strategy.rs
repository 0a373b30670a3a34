//! Household-dependent handling of deductions
//!
//! A `FradragStrategy` turns the deductions of a calculation into the
//! deductions that actually apply to each month, depending on whether the
//! bruker lives with an EPS (spouse or partner) and how old the EPS is.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::types::{Fradrag, FradragFactory, FradragTilhorer, Fradragstype};
use crate::belop::summer;
use crate::error::{BeregningError, BeregningResult};
use crate::periode::Periode;
use crate::sats::{Sats, Satstabell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FradragStrategy {
    /// No EPS in the household, EPS income is ignored
    Enslig,
    /// EPS income above the ordinær garantipensjon is deducted
    EpsOver67Ar,
    /// EPS income above the ordinær sats is deducted
    EpsUnder67ArOgUforFlyktning,
    /// All EPS income is deducted
    EpsUnder67Ar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FradragStrategyName {
    Enslig,
    EpsOver67,
    EpsUnder67ArOgUforFlyktning,
    EpsUnder67,
}

impl fmt::Display for FradragStrategyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let navn = match self {
            FradragStrategyName::Enslig => "Enslig",
            FradragStrategyName::EpsOver67 => "EpsOver67",
            FradragStrategyName::EpsUnder67ArOgUforFlyktning => "EpsUnder67ArOgUforFlyktning",
            FradragStrategyName::EpsUnder67 => "EpsUnder67",
        };
        f.write_str(navn)
    }
}

impl FradragStrategy {
    pub fn name(&self) -> FradragStrategyName {
        match self {
            FradragStrategy::Enslig => FradragStrategyName::Enslig,
            FradragStrategy::EpsOver67Ar => FradragStrategyName::EpsOver67,
            FradragStrategy::EpsUnder67ArOgUforFlyktning => FradragStrategyName::EpsUnder67ArOgUforFlyktning,
            FradragStrategy::EpsUnder67Ar => FradragStrategyName::EpsUnder67,
        }
    }

    /// Monthly EPS income that is not deducted
    pub fn eps_fribelop(&self, maaned: &Periode, satstabell: &Satstabell) -> BeregningResult<Decimal> {
        match self {
            FradragStrategy::Enslig | FradragStrategy::EpsUnder67Ar => Ok(Decimal::ZERO),
            FradragStrategy::EpsOver67Ar => satstabell.garantipensjon_ordinaer_maanedsbelop(maaned.fra_og_med()),
            FradragStrategy::EpsUnder67ArOgUforFlyktning => {
                satstabell.maanedsbelop(Sats::Ordinaer, maaned.fra_og_med())
            }
        }
    }

    /// Deductions that apply to each month of `periode`
    ///
    /// Every month must contain exactly one forventet inntekt for the bruker.
    pub fn beregn(
        &self,
        fradrag: &[Fradrag],
        periode: &Periode,
        satstabell: &Satstabell,
    ) -> BeregningResult<BTreeMap<Periode, Vec<Fradrag>>> {
        let mut per_maaned: BTreeMap<Periode, Vec<Fradrag>> =
            periode.maaneder().into_iter().map(|maaned| (maaned, Vec::new())).collect();

        for periodisert in fradrag.iter().flat_map(FradragFactory::periodiser) {
            if let Some(maaned) = per_maaned.get_mut(periodisert.periode()) {
                maaned.push(periodisert);
            }
        }

        per_maaned
            .into_iter()
            .map(|(maaned, fradrag)| {
                valider_forventet_inntekt(&maaned, &fradrag)?;
                let fradrag = behold_hoyeste_av_arbeidsinntekt_og_forventet_inntekt(fradrag);
                let fradrag = self.beregn_eps_fradrag(&maaned, fradrag, satstabell)?;
                Ok((maaned, fradrag))
            })
            .collect()
    }

    fn beregn_eps_fradrag(
        &self,
        maaned: &Periode,
        fradrag: Vec<Fradrag>,
        satstabell: &Satstabell,
    ) -> BeregningResult<Vec<Fradrag>> {
        let (eps, mut bruker): (Vec<Fradrag>, Vec<Fradrag>) = fradrag.into_iter().partition(Fradrag::tilhorer_eps);

        // None when the EPS fradrag do not lead to a deduction
        let beregnet = match self {
            FradragStrategy::Enslig => None,
            FradragStrategy::EpsUnder67Ar if eps.is_empty() => None,
            FradragStrategy::EpsUnder67Ar => Some(summer(eps.iter().map(Fradrag::maanedsbelop))),
            FradragStrategy::EpsOver67Ar | FradragStrategy::EpsUnder67ArOgUforFlyktning => {
                let fribelop = self.eps_fribelop(maaned, satstabell)?;
                let (sosialstonad, ovrige): (Vec<&Fradrag>, Vec<&Fradrag>) = eps
                    .iter()
                    .partition(|f| f.fradragstype() == Fradragstype::Sosialstonad);
                let sum_sosialstonad = summer(sosialstonad.iter().map(|f| f.maanedsbelop()));
                let sum_ovrige = summer(ovrige.iter().map(|f| f.maanedsbelop()));
                let beregnet = summer([(sum_ovrige - fribelop).max(Decimal::ZERO), sum_sosialstonad]);
                Some(beregnet).filter(|belop| !belop.is_zero())
            }
        };

        if let Some(beregnet) = beregnet {
            bruker.push(FradragFactory::ny(
                Fradragstype::BeregnetFradragEPS,
                beregnet,
                *maaned,
                FradragTilhorer::Eps,
                None,
            )?);
        }
        Ok(bruker)
    }
}

fn valider_forventet_inntekt(maaned: &Periode, fradrag: &[Fradrag]) -> BeregningResult<()> {
    let antall = fradrag
        .iter()
        .filter(|f| f.tilhorer_bruker() && f.fradragstype() == Fradragstype::ForventetInntekt)
        .count();
    if antall != 1 {
        return Err(BeregningError::ManglerForventetInntekt(maaned.fra_og_med()));
    }
    Ok(())
}

fn behold_hoyeste_av_arbeidsinntekt_og_forventet_inntekt(fradrag: Vec<Fradrag>) -> Vec<Fradrag> {
    let er_brukers = |f: &Fradrag, fradragstype: Fradragstype| f.tilhorer_bruker() && f.fradragstype() == fradragstype;

    let arbeidsinntekt = summer(
        fradrag
            .iter()
            .filter(|f| er_brukers(*f, Fradragstype::Arbeidsinntekt))
            .map(Fradrag::maanedsbelop),
    );
    let forventet_inntekt = summer(
        fradrag
            .iter()
            .filter(|f| er_brukers(*f, Fradragstype::ForventetInntekt))
            .map(Fradrag::maanedsbelop),
    );

    let fjernes = if arbeidsinntekt > forventet_inntekt {
        Fradragstype::ForventetInntekt
    } else {
        Fradragstype::Arbeidsinntekt
    };
    fradrag.into_iter().filter(|f| !er_brukers(f, fjernes)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn periode() -> Periode {
        Periode::new(
            chrono::NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            chrono::NaiveDate::from_ymd_opt(2021, 2, 28).unwrap(),
        )
        .unwrap()
    }

    fn fradrag(fradragstype: Fradragstype, belop: Decimal, tilhorer: FradragTilhorer) -> Fradrag {
        FradragFactory::ny(fradragstype, belop, periode(), tilhorer, None).unwrap()
    }

    fn forventet(belop: Decimal) -> Fradrag {
        fradrag(Fradragstype::ForventetInntekt, belop, FradragTilhorer::Bruker)
    }

    #[test]
    fn test_requires_forventet_inntekt_each_month() {
        let kun_arbeid = vec![fradrag(Fradragstype::Arbeidsinntekt, dec!(100), FradragTilhorer::Bruker)];
        let resultat = FradragStrategy::Enslig.beregn(&kun_arbeid, &periode(), Satstabell::standard());
        assert_eq!(
            resultat,
            Err(BeregningError::ManglerForventetInntekt(periode().fra_og_med()))
        );

        let dobbel = vec![forventet(dec!(1)), forventet(dec!(2))];
        assert!(FradragStrategy::Enslig.beregn(&dobbel, &periode(), Satstabell::standard()).is_err());
    }

    #[test]
    fn test_keeps_highest_of_arbeidsinntekt_and_forventet() {
        let lav_arbeid = vec![
            forventet(dec!(1000)),
            fradrag(Fradragstype::Arbeidsinntekt, dec!(500), FradragTilhorer::Bruker),
        ];
        let resultat = FradragStrategy::Enslig
            .beregn(&lav_arbeid, &periode(), Satstabell::standard())
            .unwrap();
        assert_eq!(resultat.len(), 2);
        for fradrag in resultat.values() {
            assert_eq!(fradrag.len(), 1);
            assert_eq!(fradrag[0].fradragstype(), Fradragstype::ForventetInntekt);
        }

        let hoy_arbeid = vec![
            forventet(dec!(1000)),
            fradrag(Fradragstype::Arbeidsinntekt, dec!(1500), FradragTilhorer::Bruker),
        ];
        let resultat = FradragStrategy::Enslig
            .beregn(&hoy_arbeid, &periode(), Satstabell::standard())
            .unwrap();
        for fradrag in resultat.values() {
            assert_eq!(fradrag.len(), 1);
            assert_eq!(fradrag[0].fradragstype(), Fradragstype::Arbeidsinntekt);
        }
    }

    #[test]
    fn test_enslig_ignores_eps() {
        let input = vec![
            forventet(dec!(0)),
            fradrag(Fradragstype::Arbeidsinntekt, dec!(5000), FradragTilhorer::Eps),
        ];
        let resultat = FradragStrategy::Enslig.beregn(&input, &periode(), Satstabell::standard()).unwrap();
        assert!(resultat.values().all(|f| f.iter().all(Fradrag::tilhorer_bruker)));
    }

    #[test]
    fn test_eps_under_67_merges_eps() {
        let input = vec![
            forventet(dec!(0)),
            fradrag(Fradragstype::Arbeidsinntekt, dec!(5000), FradragTilhorer::Eps),
            fradrag(Fradragstype::Kapitalinntekt, dec!(250), FradragTilhorer::Eps),
        ];
        let resultat = FradragStrategy::EpsUnder67Ar
            .beregn(&input, &periode(), Satstabell::standard())
            .unwrap();

        let januar = &resultat[&Periode::maaned(2021, 1).unwrap()];
        let eps: Vec<&Fradrag> = januar.iter().filter(|f| f.tilhorer_eps()).collect();
        assert_eq!(eps.len(), 1);
        assert_eq!(eps[0].fradragstype(), Fradragstype::BeregnetFradragEPS);
        assert_eq!(eps[0].maanedsbelop(), dec!(5250));
    }

    #[test]
    fn test_eps_under_67_keeps_zero_eps_fradrag() {
        let input = vec![
            forventet(dec!(0)),
            fradrag(Fradragstype::Kapitalinntekt, dec!(0), FradragTilhorer::Eps),
        ];
        let resultat = FradragStrategy::EpsUnder67Ar
            .beregn(&input, &periode(), Satstabell::standard())
            .unwrap();

        for fradrag in resultat.values() {
            let eps: Vec<&Fradrag> = fradrag.iter().filter(|f| f.tilhorer_eps()).collect();
            assert_eq!(eps.len(), 1);
            assert_eq!(eps[0].fradragstype(), Fradragstype::BeregnetFradragEPS);
            assert_eq!(eps[0].maanedsbelop(), Decimal::ZERO);
        }

        let uten_eps = FradragStrategy::EpsUnder67Ar
            .beregn(&[forventet(dec!(0))], &periode(), Satstabell::standard())
            .unwrap();
        assert!(uten_eps.values().all(|f| f.iter().all(Fradrag::tilhorer_bruker)));
    }

    #[test]
    fn test_eps_fribelop() {
        let januar = Periode::maaned(2021, 1).unwrap();
        let tabell = Satstabell::standard();

        // Ordinær sats January 2021: 101351 * 2.28 / 12 = 19256.69
        let fribelop = FradragStrategy::EpsUnder67ArOgUforFlyktning
            .eps_fribelop(&januar, tabell)
            .unwrap();
        assert_eq!(fribelop, dec!(19256.69));

        let input = vec![
            forventet(dec!(0)),
            fradrag(Fradragstype::Uforetrygd, dec!(20000), FradragTilhorer::Eps),
            fradrag(Fradragstype::Sosialstonad, dec!(100), FradragTilhorer::Eps),
        ];
        let resultat = FradragStrategy::EpsUnder67ArOgUforFlyktning
            .beregn(&input, &periode(), tabell)
            .unwrap();
        let eps = resultat[&januar].iter().find(|f| f.tilhorer_eps()).unwrap();
        assert_eq!(eps.maanedsbelop(), dec!(20000) - dec!(19256.69) + dec!(100));
    }

    #[test]
    fn test_eps_over_67_below_fribelop_gives_no_deduction() {
        let input = vec![
            forventet(dec!(0)),
            fradrag(Fradragstype::Alderspensjon, dec!(10000), FradragTilhorer::Eps),
        ];
        let resultat = FradragStrategy::EpsOver67Ar
            .beregn(&input, &periode(), Satstabell::standard())
            .unwrap();
        assert!(resultat.values().all(|f| f.iter().all(Fradrag::tilhorer_bruker)));
    }
}
