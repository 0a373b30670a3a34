//! Effective-dated rate tables: grunnbeløp, sats factors and garantipensjon
//!
//! Every entry has a `virkningstidspunkt` (the date it applies from) and an
//! `ikrafttredelse` (the date it was decided). Narrowing a table to a
//! knekkpunkt hides entries that were not yet decided on that date.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::Sats;
use crate::belop::{avrund_til_heltall, avrund_til_ore};
use crate::error::{BeregningError, BeregningResult};
use crate::periode::Periode;

/// A change to the grunnbeløp (G)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grunnbelopsendring {
    pub virkningstidspunkt: NaiveDate,
    pub ikrafttredelse: NaiveDate,
    pub grunnbelop: i64,
}

/// A change to the multipliers of G for høy and ordinær sats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faktorendring {
    pub virkningstidspunkt: NaiveDate,
    pub ikrafttredelse: NaiveDate,
    pub hoy: Decimal,
    pub ordinaer: Decimal,
}

/// A change to the ordinær garantipensjon (annual amount)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Garantipensjonsendring {
    pub virkningstidspunkt: NaiveDate,
    pub ikrafttredelse: NaiveDate,
    pub arsbelop: i64,
}

/// All rate tables needed to calculate supplerende stønad
#[derive(Debug, Clone, PartialEq)]
pub struct Satstabell {
    grunnbelop: Vec<Grunnbelopsendring>,
    faktorer: Vec<Faktorendring>,
    garantipensjon_ordinaer: Vec<Garantipensjonsendring>,
}

fn d(aar: i32, maaned: u32, dag: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(aar, maaned, dag).expect("built-in rate table contains an invalid date")
}

impl Default for Satstabell {
    fn default() -> Self {
        let g = |virkning: NaiveDate, ikraft: NaiveDate, grunnbelop: i64| Grunnbelopsendring {
            virkningstidspunkt: virkning,
            ikrafttredelse: ikraft,
            grunnbelop,
        };
        let gp = |virkning: NaiveDate, ikraft: NaiveDate, arsbelop: i64| Garantipensjonsendring {
            virkningstidspunkt: virkning,
            ikrafttredelse: ikraft,
            arsbelop,
        };

        Self {
            // https://www.nav.no/grunnbelopet
            grunnbelop: vec![
                g(d(2005, 5, 1), d(2005, 5, 1), 60699),
                g(d(2006, 5, 1), d(2006, 5, 1), 62892),
                g(d(2007, 5, 1), d(2007, 5, 1), 66812),
                g(d(2008, 5, 1), d(2008, 5, 1), 70256),
                g(d(2009, 5, 1), d(2009, 5, 1), 72881),
                g(d(2010, 5, 1), d(2010, 5, 1), 75641),
                g(d(2011, 5, 1), d(2011, 5, 1), 79216),
                g(d(2012, 5, 1), d(2012, 5, 1), 82122),
                g(d(2013, 5, 1), d(2013, 5, 1), 85245),
                g(d(2014, 5, 1), d(2014, 5, 1), 88370),
                g(d(2015, 5, 1), d(2015, 5, 1), 90068),
                g(d(2016, 5, 1), d(2016, 5, 1), 92576),
                g(d(2017, 5, 1), d(2017, 5, 1), 93634),
                g(d(2018, 5, 1), d(2018, 5, 1), 96883),
                g(d(2019, 5, 1), d(2019, 5, 1), 99858),
                g(d(2020, 5, 1), d(2020, 9, 4), 101351),
                g(d(2021, 5, 1), d(2021, 5, 21), 106399),
                g(d(2022, 5, 1), d(2022, 5, 20), 111477),
                g(d(2023, 5, 1), d(2023, 5, 26), 118620),
                g(d(2024, 5, 1), d(2024, 5, 24), 124028),
            ],
            faktorer: vec![
                Faktorendring {
                    virkningstidspunkt: d(2015, 1, 1),
                    ikrafttredelse: d(2015, 1, 1),
                    hoy: dec!(2.48),
                    ordinaer: dec!(2.28),
                },
                Faktorendring {
                    virkningstidspunkt: d(2024, 7, 1),
                    ikrafttredelse: d(2024, 7, 1),
                    hoy: dec!(2.529),
                    ordinaer: dec!(2.329),
                },
            ],
            garantipensjon_ordinaer: vec![
                gp(d(2016, 1, 1), d(2016, 1, 1), 162566),
                gp(d(2016, 5, 1), d(2016, 5, 1), 166274),
                gp(d(2017, 5, 1), d(2017, 5, 1), 167196),
                gp(d(2018, 5, 1), d(2018, 5, 1), 172002),
                gp(d(2019, 5, 1), d(2019, 5, 1), 176099),
                gp(d(2020, 5, 1), d(2020, 9, 4), 177724),
                gp(d(2021, 5, 1), d(2021, 5, 21), 187252),
                gp(d(2022, 5, 1), d(2022, 5, 20), 193862),
                gp(d(2023, 5, 1), d(2023, 5, 26), 210418),
            ],
        }
    }
}

impl Satstabell {
    /// Build a table from explicit entries. Entries are sorted by virkningstidspunkt.
    pub fn new(
        mut grunnbelop: Vec<Grunnbelopsendring>,
        mut faktorer: Vec<Faktorendring>,
        mut garantipensjon_ordinaer: Vec<Garantipensjonsendring>,
    ) -> Self {
        grunnbelop.sort_by_key(|e| e.virkningstidspunkt);
        faktorer.sort_by_key(|e| e.virkningstidspunkt);
        garantipensjon_ordinaer.sort_by_key(|e| e.virkningstidspunkt);
        Self {
            grunnbelop,
            faktorer,
            garantipensjon_ordinaer,
        }
    }

    /// The process-wide built-in table
    pub fn standard() -> &'static Satstabell {
        &super::STANDARD
    }

    /// The table as it was known on `knekkpunkt`
    ///
    /// Changes decided after the knekkpunkt are dropped, so the previous
    /// entry stays in force.
    pub fn paa_knekkpunkt(&self, knekkpunkt: NaiveDate) -> Satstabell {
        Satstabell {
            grunnbelop: self
                .grunnbelop
                .iter()
                .filter(|e| e.ikrafttredelse <= knekkpunkt)
                .copied()
                .collect(),
            faktorer: self
                .faktorer
                .iter()
                .filter(|e| e.ikrafttredelse <= knekkpunkt)
                .copied()
                .collect(),
            garantipensjon_ordinaer: self
                .garantipensjon_ordinaer
                .iter()
                .filter(|e| e.ikrafttredelse <= knekkpunkt)
                .copied()
                .collect(),
        }
    }

    pub fn grunnbelopsendringer(&self) -> &[Grunnbelopsendring] {
        &self.grunnbelop
    }

    pub fn faktorendringer(&self) -> &[Faktorendring] {
        &self.faktorer
    }

    pub fn garantipensjonsendringer(&self) -> &[Garantipensjonsendring] {
        &self.garantipensjon_ordinaer
    }

    /// Grunnbeløp in force on `dato`
    pub fn grunnbelop(&self, dato: NaiveDate) -> BeregningResult<i64> {
        self.grunnbelop
            .iter()
            .rev()
            .find(|e| e.virkningstidspunkt <= dato)
            .map(|e| e.grunnbelop)
            .ok_or(BeregningError::SatsIkkeTilgjengelig(dato))
    }

    /// Multiplier of G for `sats` on `dato`
    pub fn faktor(&self, sats: Sats, dato: NaiveDate) -> BeregningResult<Decimal> {
        self.faktorer
            .iter()
            .rev()
            .find(|e| e.virkningstidspunkt <= dato)
            .map(|e| match sats {
                Sats::Hoy => e.hoy,
                Sats::Ordinaer => e.ordinaer,
            })
            .ok_or(BeregningError::SatsIkkeTilgjengelig(dato))
    }

    /// Annual amount: G × factor, exact to two decimals
    pub fn arsbelop(&self, sats: Sats, dato: NaiveDate) -> BeregningResult<Decimal> {
        let grunnbelop = Decimal::from(self.grunnbelop(dato)?);
        Ok(grunnbelop * self.faktor(sats, dato)?)
    }

    /// Monthly amount: annual amount / 12, rounded half-up to two decimals
    pub fn maanedsbelop(&self, sats: Sats, dato: NaiveDate) -> BeregningResult<Decimal> {
        let arsbelop = self.arsbelop(sats, dato)?;
        Ok(avrund_til_ore(arsbelop / Decimal::from(12)))
    }

    /// One monthly amount per calendar month in `periode`
    pub fn periodiser(&self, sats: Sats, periode: &Periode) -> BeregningResult<BTreeMap<Periode, Decimal>> {
        periode
            .maaneder()
            .into_iter()
            .map(|maaned| Ok((maaned, self.maanedsbelop(sats, maaned.fra_og_med())?)))
            .collect()
    }

    /// 2% of the høy monthly amount for a single month
    pub fn to_prosent_av_hoy_sats_for_maaned(&self, dato: NaiveDate) -> BeregningResult<Decimal> {
        Ok(self.maanedsbelop(Sats::Hoy, dato)? * dec!(0.02))
    }

    /// 2% of the høy sats summed over every month in `periode`, rounded half-up
    pub fn to_prosent_av_hoy_sats(&self, periode: &Periode) -> BeregningResult<i64> {
        let sum = periode
            .maaneder()
            .iter()
            .map(|maaned| self.to_prosent_av_hoy_sats_for_maaned(maaned.fra_og_med()))
            .sum::<BeregningResult<Decimal>>()?;
        Ok(avrund_til_heltall(sum))
    }

    /// Monthly ordinær garantipensjon, used as fribeløp for EPS aged 67 or older
    pub fn garantipensjon_ordinaer_maanedsbelop(&self, dato: NaiveDate) -> BeregningResult<Decimal> {
        self.garantipensjon_ordinaer
            .iter()
            .rev()
            .find(|e| e.virkningstidspunkt <= dato)
            .map(|e| {
                avrund_til_ore(Decimal::from(e.arsbelop) / Decimal::from(12))
            })
            .ok_or(BeregningError::SatsIkkeTilgjengelig(dato))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn dato(aar: i32, maaned: u32, dag: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(aar, maaned, dag).unwrap()
    }

    #[test]
    fn test_default_tables_are_well_formed() {
        let tabell = Satstabell::default();
        let datoer: Vec<(NaiveDate, NaiveDate)> = tabell
            .grunnbelopsendringer()
            .iter()
            .map(|e| (e.virkningstidspunkt, e.ikrafttredelse))
            .chain(tabell.faktorendringer().iter().map(|e| (e.virkningstidspunkt, e.ikrafttredelse)))
            .chain(
                tabell
                    .garantipensjonsendringer()
                    .iter()
                    .map(|e| (e.virkningstidspunkt, e.ikrafttredelse)),
            )
            .collect();

        for (virkning, ikraft) in datoer {
            assert_eq!(virkning.day(), 1, "{} is not the first of a month", virkning);
            assert!(virkning.year() >= 2005);
            assert!(ikraft >= virkning);
        }
        assert!(tabell
            .grunnbelopsendringer()
            .windows(2)
            .all(|par| par[0].virkningstidspunkt < par[1].virkningstidspunkt));
    }

    #[test]
    fn test_grunnbelop_lookup() {
        let tabell = Satstabell::default();
        assert_eq!(tabell.grunnbelop(dato(2018, 3, 1)).unwrap(), 93634);
        assert_eq!(tabell.grunnbelop(dato(2018, 5, 1)).unwrap(), 96883);
        assert_eq!(tabell.grunnbelop(dato(2020, 1, 1)).unwrap(), 99858);
        assert_eq!(tabell.grunnbelop(dato(2020, 4, 30)).unwrap(), 99858);
        assert_eq!(tabell.grunnbelop(dato(2020, 5, 1)).unwrap(), 101351);
        assert_eq!(
            tabell.grunnbelop(dato(2005, 4, 30)),
            Err(BeregningError::SatsIkkeTilgjengelig(dato(2005, 4, 30)))
        );
    }

    #[test]
    fn test_faktor_change_2024() {
        let tabell = Satstabell::default();
        assert_eq!(tabell.faktor(Sats::Hoy, dato(2024, 6, 1)).unwrap(), dec!(2.48));
        assert_eq!(tabell.faktor(Sats::Hoy, dato(2024, 7, 1)).unwrap(), dec!(2.529));
        assert_eq!(tabell.faktor(Sats::Ordinaer, dato(2024, 7, 1)).unwrap(), dec!(2.329));
    }

    #[test]
    fn test_knekkpunkt_hides_undecided_grunnbelop() {
        let tabell = Satstabell::default();

        // G for May 2020 was only decided in September 2020
        let juni_2020 = tabell.paa_knekkpunkt(dato(2020, 6, 1));
        assert_eq!(juni_2020.grunnbelop(dato(2020, 5, 1)).unwrap(), 99858);

        let oktober_2020 = tabell.paa_knekkpunkt(dato(2020, 10, 1));
        assert_eq!(oktober_2020.grunnbelop(dato(2020, 5, 1)).unwrap(), 101351);
    }

    #[test]
    fn test_garantipensjon() {
        let tabell = Satstabell::default();
        // 177724 / 12 = 14810.333..
        assert_eq!(
            tabell.garantipensjon_ordinaer_maanedsbelop(dato(2021, 1, 1)).unwrap(),
            dec!(14810.33)
        );
        assert!(tabell.garantipensjon_ordinaer_maanedsbelop(dato(2015, 12, 1)).is_err());
    }

    #[test]
    fn test_new_sorts_entries() {
        let standard = Satstabell::default();
        let mut grunnbelop = standard.grunnbelopsendringer().to_vec();
        grunnbelop.reverse();
        let tabell = Satstabell::new(
            grunnbelop,
            standard.faktorendringer().to_vec(),
            standard.garantipensjonsendringer().to_vec(),
        );
        assert_eq!(tabell, standard);
    }
}
