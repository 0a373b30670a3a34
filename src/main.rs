//! Supplerende stønad CLI
//!
//! Command-line interface for running beregninger from JSON requests

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

use supplerende_stonad::belop::summer;
use supplerende_stonad::runner::BatchOppsummering;
use supplerende_stonad::{Beregning, BeregningForesporsel, BeregningRunner, Grupperer};

#[derive(Parser)]
#[command(name = "supplerende_stonad", version, about = "Beregning av supplerende stønad")]
struct Cli {
    /// Directory with grunnbelop.csv, faktorer.csv and garantipensjon_ordinaer.csv.
    /// Uses the built-in tables when omitted.
    #[arg(long, global = true)]
    satser: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Calculate one request and print its beregningsperioder
    Beregn {
        /// JSON file with a single request
        input: PathBuf,

        /// Write one row per month to this CSV file
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Print the stored form of the beregning as JSON
        #[arg(long)]
        snapshot: bool,
    },
    /// Calculate a JSON array of requests in parallel
    Batch {
        /// JSON file with an array of requests
        input: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let runner = match &cli.satser {
        Some(path) => BeregningRunner::from_csv_path(path)
            .map_err(|e| anyhow!(e))
            .with_context(|| format!("Failed to load satser from {}", path.display()))?,
        None => BeregningRunner::new(),
    };

    match cli.command {
        Command::Beregn { input, csv, snapshot } => {
            let foresporsel: BeregningForesporsel = read_json(&input)?;
            let beregning = runner.run(&foresporsel)?;

            print_beregning(&beregning);
            if let Some(path) = csv {
                write_csv(&beregning, &path)?;
                println!("\nMonthly rows written to {}", path.display());
            }
            if snapshot {
                println!("\n{}", beregning.to_snapshot().to_json()?);
            }
        }
        Command::Batch { input } => {
            let foresporsler: Vec<BeregningForesporsel> = read_json(&input)?;
            let resultater = runner.beregn_batch(&foresporsler);

            for (i, resultat) in resultater.iter().enumerate() {
                match resultat {
                    Ok(beregning) => println!(
                        "{:>4} {} {:>8} {:>10}",
                        i,
                        beregning.periode(),
                        beregning.sats(),
                        beregning.sum_ytelse()
                    ),
                    Err(e) => println!("{:>4} FEIL: {}", i, e),
                }
            }

            let oppsummering = BatchOppsummering::fra(&resultater);
            println!(
                "\n{} beregninger, {} feilet, sum ytelse {}",
                oppsummering.antall, oppsummering.antall_feilet, oppsummering.sum_ytelse
            );
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let innhold = fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&innhold).with_context(|| format!("Invalid request in {}", path.display()))
}

fn print_beregning(beregning: &Beregning) {
    println!("Beregning {}", beregning.id());
    println!("  Periode: {}", beregning.periode());
    println!("  Sats: {}", beregning.sats());
    println!("  Fradragsstrategi: {}", beregning.fradrag_strategy_name());
    println!("  Sum ytelse: {}", beregning.sum_ytelse());
    println!("  Sum fradrag: {}", beregning.sum_fradrag());
    println!();

    println!(
        "{:>23} {:>8} {:>12} {:>12} {:>8}  Merknader",
        "Periode", "G", "Satsbeløp", "Fradrag", "Beløp"
    );
    println!("{}", "-".repeat(80));
    for periode in beregning.grupper() {
        let sum_fradrag = summer(periode.fradrag().iter().map(|f| f.maanedsbelop()));
        let merknader: Vec<String> = periode.merknader().iter().map(|m| format!("{:?}", m)).collect();
        println!(
            "{:>23} {:>8} {:>12} {:>12} {:>8}  {}",
            periode.periode().to_string(),
            periode.grunnbelop(),
            periode.satsbelop(),
            sum_fradrag,
            periode.belop(),
            merknader.join(", ")
        );
    }
}

fn write_csv(beregning: &Beregning, path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(["fra_og_med", "til_og_med", "sats", "grunnbelop", "satsbelop", "fradrag", "belop", "merknader"])?;

    for maaned in beregning.maanedsberegninger() {
        let merknader: Vec<String> = maaned.merknader().iter().map(|m| format!("{:?}", m)).collect();
        writer.write_record([
            maaned.periode().fra_og_med().to_string(),
            maaned.periode().til_og_med().to_string(),
            maaned.sats().to_string(),
            maaned.grunnbelop().to_string(),
            maaned.satsbelop().to_string(),
            maaned.sum_fradrag().to_string(),
            maaned.belop().to_string(),
            merknader.join(";"),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
