//! Deduction types and the `Fradrag` line item

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::belop::multipliser;
use crate::error::{BeregningError, BeregningResult};
use crate::periode::Periode;

/// Category of a deduction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Fradragstype {
    Alderspensjon,
    Annet,
    Arbeidsavklaringspenger,
    Arbeidsinntekt,
    AvtalefestetPensjon,
    AvtalefestetPensjonPrivat,
    Barnetillegg,
    BidragEtterEkteskapsloven,
    Dagpenger,
    Fosterhjemsgodtgjorelse,
    Gjenlevendepensjon,
    Introduksjonsstonad,
    Kapitalinntekt,
    Kontantstotte,
    Kvalifiseringsstonad,
    NAVytelserTilLivsopphold,
    OffentligPensjon,
    PrivatPensjon,
    Sosialstonad,
    StatensLaanekasse,
    SupplerendeStonad,
    Sykepenger,
    Tiltakspenger,
    Ventestonad,
    Uforetrygd,
    ForventetInntekt,
    AvkortingUtenlandsopphold,
    UnderMinstenivaa,
    BeregnetFradragEPS,
}

impl Fradragstype {
    /// Types derived by the calculation itself, never entered by a saksbehandler
    pub fn er_systemgenerert(&self) -> bool {
        matches!(
            self,
            Fradragstype::ForventetInntekt | Fradragstype::BeregnetFradragEPS | Fradragstype::UnderMinstenivaa
        )
    }
}

/// Whose income a deduction comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FradragTilhorer {
    Bruker,
    Eps,
}

/// Income received in a foreign currency
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtenlandskInntekt {
    pub belop_i_utenlandsk_valuta: i64,
    pub valuta: String,
    pub kurs: Decimal,
}

/// A monthly deduction applying over a period
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "UvalidertFradrag")]
pub struct Fradrag {
    fradragstype: Fradragstype,
    maanedsbelop: Decimal,
    periode: Periode,
    tilhorer: FradragTilhorer,
    #[serde(skip_serializing_if = "Option::is_none")]
    utenlandsk_inntekt: Option<UtenlandskInntekt>,
}

#[derive(Deserialize)]
struct UvalidertFradrag {
    fradragstype: Fradragstype,
    maanedsbelop: Decimal,
    periode: Periode,
    tilhorer: FradragTilhorer,
    #[serde(default)]
    utenlandsk_inntekt: Option<UtenlandskInntekt>,
}

impl TryFrom<UvalidertFradrag> for Fradrag {
    type Error = BeregningError;

    fn try_from(value: UvalidertFradrag) -> Result<Self, Self::Error> {
        FradragFactory::ny(
            value.fradragstype,
            value.maanedsbelop,
            value.periode,
            value.tilhorer,
            value.utenlandsk_inntekt,
        )
    }
}

impl Fradrag {
    pub fn fradragstype(&self) -> Fradragstype {
        self.fradragstype
    }

    pub fn maanedsbelop(&self) -> Decimal {
        self.maanedsbelop
    }

    pub fn periode(&self) -> &Periode {
        &self.periode
    }

    pub fn tilhorer(&self) -> FradragTilhorer {
        self.tilhorer
    }

    pub fn utenlandsk_inntekt(&self) -> Option<&UtenlandskInntekt> {
        self.utenlandsk_inntekt.as_ref()
    }

    pub fn tilhorer_bruker(&self) -> bool {
        self.tilhorer == FradragTilhorer::Bruker
    }

    pub fn tilhorer_eps(&self) -> bool {
        self.tilhorer == FradragTilhorer::Eps
    }

    /// Total over every month of the period
    pub fn totalbelop(&self) -> Decimal {
        multipliser(self.maanedsbelop, self.periode.antall_maaneder())
    }

    /// The same deduction restricted to `periode`, `None` when disjoint
    pub fn snitt(&self, periode: &Periode) -> Option<Fradrag> {
        let snitt = self.periode.snitt(periode)?;
        Some(self.med_periode(snitt))
    }

    /// Equality on everything except the period
    pub fn lik_uten_periode(&self, other: &Fradrag) -> bool {
        self.fradragstype == other.fradragstype
            && self.maanedsbelop == other.maanedsbelop
            && self.tilhorer == other.tilhorer
            && self.utenlandsk_inntekt == other.utenlandsk_inntekt
    }

    fn med_periode(&self, periode: Periode) -> Fradrag {
        Fradrag {
            periode,
            ..self.clone()
        }
    }
}

pub struct FradragFactory;

impl FradragFactory {
    /// Create a deduction, rejecting negative amounts
    pub fn ny(
        fradragstype: Fradragstype,
        maanedsbelop: Decimal,
        periode: Periode,
        tilhorer: FradragTilhorer,
        utenlandsk_inntekt: Option<UtenlandskInntekt>,
    ) -> BeregningResult<Fradrag> {
        if maanedsbelop.is_sign_negative() && !maanedsbelop.is_zero() {
            return Err(BeregningError::NegativtFradrag(maanedsbelop));
        }
        Ok(Fradrag {
            fradragstype,
            maanedsbelop,
            periode,
            tilhorer,
            utenlandsk_inntekt,
        })
    }

    /// One deduction per calendar month, each with the same monthly amount
    pub fn periodiser(fradrag: &Fradrag) -> Vec<Fradrag> {
        fradrag
            .periode
            .maaneder()
            .into_iter()
            .map(|maaned| fradrag.med_periode(maaned))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn aar_2021() -> Periode {
        Periode::aar(2021).unwrap()
    }

    #[test]
    fn test_negative_amount_rejected() {
        let resultat = FradragFactory::ny(
            Fradragstype::Arbeidsinntekt,
            dec!(-5),
            aar_2021(),
            FradragTilhorer::Bruker,
            None,
        );
        assert_eq!(resultat, Err(BeregningError::NegativtFradrag(dec!(-5))));

        assert!(FradragFactory::ny(Fradragstype::Arbeidsinntekt, dec!(0), aar_2021(), FradragTilhorer::Bruker, None).is_ok());
    }

    #[test]
    fn test_periodiser() {
        let fradrag = FradragFactory::ny(
            Fradragstype::Kapitalinntekt,
            dec!(1200),
            aar_2021(),
            FradragTilhorer::Eps,
            None,
        )
        .unwrap();

        let periodisert = FradragFactory::periodiser(&fradrag);
        assert_eq!(periodisert.len(), 12);
        assert!(periodisert.iter().all(|f| f.maanedsbelop() == dec!(1200)));
        assert!(periodisert.iter().all(|f| f.periode().er_enkeltmaaned()));
        assert!(periodisert.iter().all(|f| f.lik_uten_periode(&fradrag)));
        assert_eq!(periodisert[11].periode(), &Periode::maaned(2021, 12).unwrap());
        assert_eq!(fradrag.totalbelop(), dec!(14400));
    }

    #[test]
    fn test_totalbelop_saturates() {
        let fradrag =
            FradragFactory::ny(Fradragstype::Kapitalinntekt, Decimal::MAX, aar_2021(), FradragTilhorer::Bruker, None)
                .unwrap();
        assert_eq!(fradrag.totalbelop(), Decimal::MAX);
    }

    #[test]
    fn test_snitt() {
        let fradrag =
            FradragFactory::ny(Fradragstype::Dagpenger, dec!(10), aar_2021(), FradragTilhorer::Bruker, None).unwrap();

        let mars = Periode::maaned(2021, 3).unwrap();
        assert_eq!(fradrag.snitt(&mars).unwrap().periode(), &mars);
        assert!(fradrag.snitt(&Periode::maaned(2022, 1).unwrap()).is_none());
    }

    #[test]
    fn test_systemgenerert() {
        assert!(Fradragstype::ForventetInntekt.er_systemgenerert());
        assert!(Fradragstype::BeregnetFradragEPS.er_systemgenerert());
        assert!(!Fradragstype::Sosialstonad.er_systemgenerert());
    }

    #[test]
    fn test_deserialize_rejects_negative() {
        let json = r#"{
            "fradragstype": "Arbeidsinntekt",
            "maanedsbelop": "-1",
            "periode": {"fra_og_med": "2021-01-01", "til_og_med": "2021-01-31"},
            "tilhorer": "BRUKER"
        }"#;
        assert!(serde_json::from_str::<Fradrag>(json).is_err());
    }
}
