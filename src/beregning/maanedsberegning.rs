//! Calculation of a single calendar month

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::belop::{avrund_til_heltall, summer};
use crate::error::{BeregningError, BeregningResult};
use crate::fradrag::{Fradrag, FradragFactory, Fradragstype};
use crate::merknad::{Merknad, Merknader};
use crate::periode::Periode;
use crate::sats::{Sats, Satstabell};

/// The benefit for one calendar month
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maanedsberegning {
    periode: Periode,
    sats: Sats,
    grunnbelop: i64,
    satsbelop: Decimal,
    fradrag: Vec<Fradrag>,
    fribelop_for_eps: Decimal,
    belop: i64,
    merknader: Merknader,
}

impl Maanedsberegning {
    pub fn periode(&self) -> &Periode {
        &self.periode
    }

    pub fn sats(&self) -> Sats {
        self.sats
    }

    pub fn grunnbelop(&self) -> i64 {
        self.grunnbelop
    }

    /// Monthly sats amount before deductions, two decimals
    pub fn satsbelop(&self) -> Decimal {
        self.satsbelop
    }

    /// Deductions for this month only
    pub fn fradrag(&self) -> &[Fradrag] {
        &self.fradrag
    }

    pub fn fribelop_for_eps(&self) -> Decimal {
        self.fribelop_for_eps
    }

    /// Amount paid out for the month, never negative
    pub fn belop(&self) -> i64 {
        self.belop
    }

    pub fn sum_ytelse(&self) -> i64 {
        self.belop
    }

    pub fn sum_fradrag(&self) -> Decimal {
        summer(self.fradrag.iter().map(Fradrag::maanedsbelop))
    }

    pub fn merknader(&self) -> &Merknader {
        &self.merknader
    }
}

pub struct MaanedsberegningFactory;

impl MaanedsberegningFactory {
    /// Calculate one month against the built-in rate table
    pub fn ny(periode: Periode, sats: Sats, fradrag: Vec<Fradrag>) -> BeregningResult<Maanedsberegning> {
        Self::ny_med_satstabell(periode, sats, fradrag, Decimal::ZERO, Satstabell::standard())
    }

    /// Calculate one month
    ///
    /// `periode` must be exactly one calendar month. Deductions are
    /// periodised and only the part falling in this month is kept.
    pub fn ny_med_satstabell(
        periode: Periode,
        sats: Sats,
        fradrag: Vec<Fradrag>,
        fribelop_for_eps: Decimal,
        satstabell: &Satstabell,
    ) -> BeregningResult<Maanedsberegning> {
        if !periode.er_enkeltmaaned() {
            return Err(BeregningError::IkkeEnMaaned {
                fra_og_med: periode.fra_og_med(),
                til_og_med: periode.til_og_med(),
            });
        }

        let dato = periode.fra_og_med();
        let grunnbelop = satstabell.grunnbelop(dato)?;
        let satsbelop = satstabell.maanedsbelop(sats, dato)?;

        let fradrag: Vec<Fradrag> = fradrag
            .iter()
            .flat_map(FradragFactory::periodiser)
            .filter(|f| f.periode() == &periode)
            .collect();
        let sum_fradrag = summer(fradrag.iter().map(Fradrag::maanedsbelop));
        let belop = avrund_til_heltall((satsbelop - sum_fradrag).max(Decimal::ZERO));

        let merknader = belop_merknader(belop, satsbelop, &fradrag, satstabell.to_prosent_av_hoy_sats_for_maaned(dato)?)?;

        Ok(Maanedsberegning {
            periode,
            sats,
            grunnbelop,
            satsbelop,
            fradrag,
            fribelop_for_eps,
            belop,
            merknader,
        })
    }
}

fn er_sosialstonad_eller_avkorting(fradrag: &Fradrag) -> bool {
    matches!(
        fradrag.fradragstype(),
        Fradragstype::Sosialstonad | Fradragstype::AvkortingUtenlandsopphold
    )
}

/// Tags for a month paying out less than 2% of the høy sats
///
/// Sosialstønad and avkorting do not make a month ineligible. When the
/// amount would have been above the minimum without them, the month is
/// tagged with the non-avslag variant instead.
fn belop_merknader(
    belop: i64,
    satsbelop: Decimal,
    fradrag: &[Fradrag],
    minstegrense: Decimal,
) -> BeregningResult<Merknader> {
    let mut merknader = Merknader::new();
    if Decimal::from(belop) >= minstegrense && belop > 0 {
        return Ok(merknader);
    }

    let uten_sosialstonad_og_avkorting = summer(
        fradrag
            .iter()
            .filter(|f| !er_sosialstonad_eller_avkorting(f))
            .map(Fradrag::maanedsbelop),
    );
    let belop_uten = avrund_til_heltall((satsbelop - uten_sosialstonad_og_avkorting).max(Decimal::ZERO));
    let har_sosialstonad_eller_avkorting = fradrag.iter().any(er_sosialstonad_eller_avkorting);

    let merknad = if har_sosialstonad_eller_avkorting && Decimal::from(belop_uten) >= minstegrense {
        Merknad::SosialstonadOgAvkortingForerTilBelopLavereEnnToProsentAvHoySats
    } else if belop == 0 {
        Merknad::BelopErNull
    } else {
        Merknad::BelopMellomNullOgToProsentAvHoySats
    };
    merknader.legg_til(merknad)?;
    Ok(merknader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fradrag::FradragTilhorer;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn fradrag(fradragstype: Fradragstype, belop: Decimal, periode: Periode) -> Fradrag {
        FradragFactory::ny(fradragstype, belop, periode, FradragTilhorer::Bruker, None).unwrap()
    }

    #[test]
    fn test_hoy_sats_januar_2020() {
        let januar = Periode::maaned(2020, 1).unwrap();
        let maaned = MaanedsberegningFactory::ny(januar, Sats::Hoy, vec![]).unwrap();

        assert_eq!(maaned.grunnbelop(), 99858);
        assert_eq!(maaned.satsbelop(), dec!(20637.32));
        assert_eq!(maaned.belop(), 20637);
        assert!(maaned.merknader().is_empty());
    }

    #[test]
    fn test_ordinaer_sats_mars_2018() {
        let mars = Periode::maaned(2018, 3).unwrap();
        let uten_fradrag = MaanedsberegningFactory::ny(mars, Sats::Ordinaer, vec![]).unwrap();
        assert_eq!(uten_fradrag.grunnbelop(), 93634);
        assert_eq!(uten_fradrag.belop(), 17790);

        let med_fradrag =
            MaanedsberegningFactory::ny(mars, Sats::Ordinaer, vec![fradrag(Fradragstype::Arbeidsinntekt, dec!(100), mars)])
                .unwrap();
        assert_eq!(med_fradrag.belop(), 17690);
        assert_eq!(med_fradrag.sum_fradrag(), dec!(100));
    }

    #[test]
    fn test_belop_never_negative() {
        let mars = Periode::maaned(2018, 3).unwrap();
        let maaned = MaanedsberegningFactory::ny(
            mars,
            Sats::Ordinaer,
            vec![fradrag(Fradragstype::Arbeidsinntekt, Decimal::from(i64::MAX), mars)],
        )
        .unwrap();

        assert_eq!(maaned.belop(), 0);
        assert_eq!(maaned.merknader().as_slice(), &[Merknad::BelopErNull]);
    }

    #[test]
    fn test_huge_fradrag_give_zero_instead_of_overflow() {
        let mars = Periode::maaned(2018, 3).unwrap();
        let maaned = MaanedsberegningFactory::ny(
            mars,
            Sats::Ordinaer,
            vec![
                fradrag(Fradragstype::Arbeidsinntekt, Decimal::MAX, mars),
                fradrag(Fradragstype::Kapitalinntekt, Decimal::MAX, mars),
            ],
        )
        .unwrap();

        assert_eq!(maaned.belop(), 0);
        assert_eq!(maaned.sum_fradrag(), Decimal::MAX);
        assert_eq!(maaned.merknader().as_slice(), &[Merknad::BelopErNull]);
    }

    #[test]
    fn test_requires_single_month() {
        let to_maaneder = Periode::new(
            NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2020, 2, 29).unwrap(),
        )
        .unwrap();
        assert!(matches!(
            MaanedsberegningFactory::ny(to_maaneder, Sats::Hoy, vec![]),
            Err(BeregningError::IkkeEnMaaned { .. })
        ));
    }

    #[test]
    fn test_only_fradrag_for_this_month_is_kept() {
        let aar = Periode::aar(2020).unwrap();
        let januar = Periode::maaned(2020, 1).unwrap();
        let annet_aar = Periode::aar(2021).unwrap();

        let maaned = MaanedsberegningFactory::ny(
            januar,
            Sats::Hoy,
            vec![
                fradrag(Fradragstype::Kapitalinntekt, dec!(20), aar),
                fradrag(Fradragstype::Kapitalinntekt, dec!(5000), annet_aar),
            ],
        )
        .unwrap();

        assert_eq!(maaned.fradrag().len(), 1);
        assert_eq!(maaned.fradrag()[0].periode(), &januar);
        assert_eq!(maaned.belop(), 20617);
    }

    #[test]
    fn test_below_minimum_merknader() {
        let januar = Periode::maaned(2020, 1).unwrap();

        // 2% of 20637.32 is 412.75
        let under_minste = MaanedsberegningFactory::ny(
            januar,
            Sats::Hoy,
            vec![fradrag(Fradragstype::Arbeidsinntekt, dec!(20300), januar)],
        )
        .unwrap();
        assert_eq!(under_minste.belop(), 337);
        assert_eq!(
            under_minste.merknader().as_slice(),
            &[Merknad::BelopMellomNullOgToProsentAvHoySats]
        );

        let pga_sosialstonad = MaanedsberegningFactory::ny(
            januar,
            Sats::Hoy,
            vec![
                fradrag(Fradragstype::Arbeidsinntekt, dec!(10000), januar),
                fradrag(Fradragstype::Sosialstonad, dec!(10300), januar),
            ],
        )
        .unwrap();
        assert_eq!(pga_sosialstonad.belop(), 337);
        assert_eq!(
            pga_sosialstonad.merknader().as_slice(),
            &[Merknad::SosialstonadOgAvkortingForerTilBelopLavereEnnToProsentAvHoySats]
        );
        assert!(pga_sosialstonad.merknader().avslag().is_none());

        let over_minste = MaanedsberegningFactory::ny(
            januar,
            Sats::Hoy,
            vec![fradrag(Fradragstype::Arbeidsinntekt, dec!(20000), januar)],
        )
        .unwrap();
        assert!(over_minste.merknader().is_empty());
    }
}
