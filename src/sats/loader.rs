//! CSV-based rate table loader
//!
//! Loads grunnbeløp, garantipensjon and sats factors from CSV files in data/satser/

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::error::Error;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use super::tabell::{Faktorendring, Garantipensjonsendring, Grunnbelopsendring, Satstabell};

/// Default path to the rate table directory
pub const DEFAULT_SATSER_PATH: &str = "data/satser";

type LoadResult<T> = Result<T, Box<dyn Error + Send + Sync>>;

/// Load grunnbeløp changes from CSV
/// Columns: virkningstidspunkt, ikrafttredelse, grunnbelop
pub fn load_grunnbelop(path: &Path) -> LoadResult<Vec<Grunnbelopsendring>> {
    let file = File::open(path.join("grunnbelop.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut endringer = Vec::new();

    for result in reader.records() {
        let record = result?;
        endringer.push(Grunnbelopsendring {
            virkningstidspunkt: NaiveDate::from_str(record[0].trim())?,
            ikrafttredelse: NaiveDate::from_str(record[1].trim())?,
            grunnbelop: record[2].trim().parse()?,
        });
    }

    Ok(endringer)
}

/// Load ordinær garantipensjon changes from CSV
/// Columns: virkningstidspunkt, ikrafttredelse, arsbelop
pub fn load_garantipensjon_ordinaer(path: &Path) -> LoadResult<Vec<Garantipensjonsendring>> {
    let file = File::open(path.join("garantipensjon_ordinaer.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut endringer = Vec::new();

    for result in reader.records() {
        let record = result?;
        endringer.push(Garantipensjonsendring {
            virkningstidspunkt: NaiveDate::from_str(record[0].trim())?,
            ikrafttredelse: NaiveDate::from_str(record[1].trim())?,
            arsbelop: record[2].trim().parse()?,
        });
    }

    Ok(endringer)
}

/// Load sats factors from CSV
/// Columns: virkningstidspunkt, ikrafttredelse, hoy, ordinaer
pub fn load_faktorer(path: &Path) -> LoadResult<Vec<Faktorendring>> {
    let file = File::open(path.join("faktorer.csv"))?;
    let mut reader = csv::Reader::from_reader(file);

    let mut endringer = Vec::new();

    for result in reader.records() {
        let record = result?;
        endringer.push(Faktorendring {
            virkningstidspunkt: NaiveDate::from_str(record[0].trim())?,
            ikrafttredelse: NaiveDate::from_str(record[1].trim())?,
            hoy: Decimal::from_str(record[2].trim())?,
            ordinaer: Decimal::from_str(record[3].trim())?,
        });
    }

    Ok(endringer)
}

impl Satstabell {
    /// Load all rate tables from the default path
    pub fn load_default() -> LoadResult<Self> {
        Self::from_csv_path(Path::new(DEFAULT_SATSER_PATH))
    }

    /// Load all rate tables from a specific directory
    pub fn from_csv_path(path: &Path) -> LoadResult<Self> {
        Ok(Satstabell::new(
            load_grunnbelop(path)?,
            load_faktorer(path)?,
            load_garantipensjon_ordinaer(path)?,
        ))
    }
}
