//! Baby profile commands.

use std::io::Write;

use anyhow::{Result, bail};
use bs_core::{BabyId, BabyProfile, Gender, validate_baby_name};
use bs_db::Database;
use chrono::{DateTime, NaiveDate, TimeZone};
use clap::Args;
use serde::Serialize;

#[derive(Debug, Args)]
pub struct AddBabyArgs {
    /// Display name.
    pub name: String,
    /// Date of birth (YYYY-MM-DD).
    #[arg(long)]
    pub born: NaiveDate,
    /// male, female or other.
    #[arg(long)]
    pub gender: Option<Gender>,
    /// Explicit profile ID; a random UUID by default.
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Debug, Args)]
pub struct ListBabiesArgs {
    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct JsonBaby<'a> {
    #[serde(flatten)]
    profile: &'a BabyProfile,
    age_months: u32,
}

/// Adds a profile and returns it.
pub fn add<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &mut Database,
    args: &AddBabyArgs,
    now: &DateTime<Tz>,
) -> Result<BabyProfile> {
    let name = validate_baby_name(&args.name)?;
    if args.born > now.date_naive() {
        bail!("date of birth {} is in the future", args.born);
    }

    let id = match &args.id {
        Some(id) => BabyId::new(id.trim())?,
        None => BabyId::new(uuid::Uuid::new_v4().to_string())?,
    };
    let mut baby = BabyProfile::new(id, name, args.born);
    baby.gender = args.gender;

    if !db.insert_baby(&baby)? {
        bail!("baby already exists: {}", baby.id);
    }
    tracing::debug!(baby = %baby.id, "added baby");

    writeln!(writer, "Added {} ({})", baby.name, baby.id)?;
    Ok(baby)
}

/// Lists profiles with their current age.
pub fn list<W: Write, Tz: TimeZone>(
    writer: &mut W,
    db: &Database,
    args: &ListBabiesArgs,
    now: &DateTime<Tz>,
) -> Result<()> {
    let babies = db.list_babies()?;

    if args.json {
        let entries: Vec<_> = babies
            .iter()
            .map(|profile| JsonBaby {
                profile,
                age_months: profile.age_in_months(now),
            })
            .collect();
        writeln!(writer, "{}", serde_json::to_string_pretty(&entries)?)?;
        return Ok(());
    }

    if babies.is_empty() {
        writeln!(writer, "No babies yet.")?;
        return Ok(());
    }

    for baby in &babies {
        writeln!(
            writer,
            "{}  {:<20} born {}  ({} months)",
            baby.id,
            baby.name,
            baby.date_of_birth,
            baby.age_in_months(now)
        )?;
    }
    Ok(())
}
