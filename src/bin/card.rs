//! # Member Card CLI
//!
//! Encode, issue, decode and inspect member card images from the command line.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin card -- encode --image template.png --record record.json -o card.png
//! cargo run --bin card -- issue --image template.png --profile profile.json
//! cargo run --bin card -- decode card.png
//! cargo run --bin card -- capacity template.png --record record.json
//! cargo run --bin card -- zodiac 2000-03-25
//! ```

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::fs;
use std::path::{Path, PathBuf};

use member_card::card::{card_filename, issue_record, zodiac_label, CardProfile, DEFAULT_CARD_FILENAME};
use member_card::logging::init_logger;
use member_card::processing::{bits, steganography};
use member_card::{CodecError, EmbeddedRecord};

/// Command-line arguments for the card binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Hide a complete record (JSON file) in a carrier image
    Encode {
        /// Carrier image (PNG, JPEG, ...)
        #[arg(short, long)]
        image: PathBuf,
        /// Record to embed, as JSON
        #[arg(short, long)]
        record: PathBuf,
        /// Output PNG path (defaults to "<Name>_member_card.png")
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Build a new record from a profile (JSON file) and hide it in a carrier image
    Issue {
        #[arg(short, long)]
        image: PathBuf,
        /// Profile with name, email, pin, phone, city and dob
        #[arg(short, long)]
        profile: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the record hidden in a card
    Decode {
        image: PathBuf,
        /// Print the PIN instead of masking it
        #[arg(long)]
        show_pin: bool,
    },
    /// Show how many bits an image can hold
    Capacity {
        image: PathBuf,
        /// Also report the bits this record needs
        #[arg(short, long)]
        record: Option<PathBuf>,
    },
    /// Print the zodiac sign for a YYYY-MM-DD date of birth
    Zodiac { dob: String },
}

fn main() -> Result<()> {
    init_logger();

    let args = Args::parse();

    match args.command {
        Command::Encode { image, record, output } => {
            let record = read_record(&record)?;
            write_card(&image, &record, output)
        }
        Command::Issue { image, profile, output } => {
            let content = fs::read_to_string(&profile)
                .with_context(|| format!("reading profile {}", profile.display()))?;
            let profile: CardProfile = serde_json::from_str(&content).context("parsing profile")?;
            let record = issue_record(&profile);
            if record.zodiac_sign.is_empty() {
                warn!("Date of birth '{}' is not YYYY-MM-DD; zodiac sign left empty", profile.dob);
            }
            info!("Issued account {}", record.account_id);
            write_card(&image, &record, output)
        }
        Command::Decode { image, show_pin } => run_decode(&image, show_pin),
        Command::Capacity { image, record } => run_capacity(&image, record),
        Command::Zodiac { dob } => {
            let label = zodiac_label(&dob).ok_or_else(|| anyhow!("'{}' is not a YYYY-MM-DD date", dob))?;
            println!("{}", label);
            Ok(())
        }
    }
}

fn read_record(path: &Path) -> Result<EmbeddedRecord> {
    let content =
        fs::read_to_string(path).with_context(|| format!("reading record {}", path.display()))?;
    serde_json::from_str(&content).context("parsing record")
}

fn write_card(image: &Path, record: &EmbeddedRecord, output: Option<PathBuf>) -> Result<()> {
    let carrier = fs::read(image).with_context(|| format!("reading image {}", image.display()))?;
    let png = steganography::encode_png(&carrier, record)?;

    let output = output.unwrap_or_else(|| PathBuf::from(card_filename(&record.name, DEFAULT_CARD_FILENAME)));
    fs::write(&output, png).with_context(|| format!("writing {}", output.display()))?;

    info!("Wrote member card for {} to {}", record.email, output.display());
    Ok(())
}

fn run_decode(image: &Path, show_pin: bool) -> Result<()> {
    let bytes = fs::read(image).with_context(|| format!("reading image {}", image.display()))?;
    match steganography::decode_record_png(&bytes) {
        Ok(record) => {
            let record = if show_pin { record } else { record.masked() };
            println!("{}", serde_json::to_string_pretty(&record)?);
            Ok(())
        }
        Err(e) if e.is_not_a_card() => Err(anyhow!("Invalid or corrupted member card")),
        Err(e) => Err(e.into()),
    }
}

fn run_capacity(image: &Path, record: Option<PathBuf>) -> Result<()> {
    let bytes = fs::read(image).with_context(|| format!("reading image {}", image.display()))?;
    let carrier = steganography::load_rgba(&bytes)?;
    let capacity = steganography::capacity_bits(&carrier);
    println!(
        "{}x{}: {} bits ({} payload bytes)",
        carrier.width(),
        carrier.height(),
        capacity,
        capacity.saturating_sub(bits::END_MARKER_LEN) / 8
    );

    if let Some(path) = record {
        let needed = steganography::required_bits(&read_record(&path)?)?;
        println!("record needs {} bits", needed);
        if needed > capacity {
            return Err(CodecError::CapacityExceeded { needed, capacity }.into());
        }
    }
    Ok(())
}
