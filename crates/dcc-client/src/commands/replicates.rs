//! Replicate commands: `dcc replicate-numbers` and `dcc fastq-replicates`

use crate::commands::connect;
use crate::connection::Connection;
use crate::error::Result;
use colored::Colorize;
use dcc_common::DccMode;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Append replicate numbers to each line of `infile`, writing `outfile`
pub async fn replicate_numbers(mode: Option<DccMode>, infile: &Path, outfile: &Path) -> Result<()> {
    let conn = connect(mode).await?;
    let reader = BufReader::new(File::open(infile)?);
    let mut writer = BufWriter::new(File::create(outfile)?);

    let count = annotate_replicate_lines(&conn, reader, &mut writer).await?;
    writer.flush()?;

    info!(count, outfile = %outfile.display(), "Wrote replicate numbers");
    Ok(())
}

/// Copy `reader` to `writer`, appending `biological_replicate_number` and
/// `technical_replicate_number` columns for the replicate in column one
///
/// Blank lines and `#` lines are copied unchanged. Returns the number of
/// replicates looked up.
pub async fn annotate_replicate_lines<R: BufRead, W: Write>(
    conn: &Connection,
    reader: R,
    writer: &mut W,
) -> Result<usize> {
    let mut count = 0;
    for line in reader.lines() {
        let line = line?;
        let replicate_id = line.split('\t').next().unwrap_or_default().trim();
        if replicate_id.is_empty() || replicate_id.starts_with('#') {
            writeln!(writer, "{line}")?;
            continue;
        }

        let replicate = conn.get_record(replicate_id).await?;
        let bio = column_value(replicate.get("biological_replicate_number"));
        let tech = column_value(replicate.get("technical_replicate_number"));
        writeln!(writer, "{line}\t{bio}\t{tech}")?;
        count += 1;
    }
    Ok(count)
}

fn column_value(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    }
}

/// Print the FASTQ files of an experiment grouped by replicate and read
pub async fn fastq_replicates(
    mode: Option<DccMode>,
    experiment: &str,
    bio_rep: Option<u64>,
    tech_rep: Option<u64>,
) -> Result<()> {
    let conn = connect(mode).await?;
    let map = conn.get_fastq_replicate_map(experiment).await?;

    for (bio, techs) in &map {
        if bio_rep.is_some_and(|wanted| wanted != *bio) {
            continue;
        }
        for (tech, reads) in techs {
            if tech_rep.is_some_and(|wanted| wanted != *tech) {
                continue;
            }
            println!("{}", format!("Replicate {bio}_{tech}").cyan().bold());
            for (read, files) in reads {
                let read = if read.is_empty() { "-" } else { read.as_str() };
                for file in files {
                    let id = file
                        .get("accession")
                        .or_else(|| file.get("uuid"))
                        .and_then(Value::as_str)
                        .unwrap_or("?");
                    println!("  R{read}\t{id}");
                }
            }
        }
    }

    let platforms = conn.get_platforms_on_experiment(experiment).await?;
    if platforms.len() > 1 {
        println!(
            "{} FASTQ files come from {} platforms: {}",
            "Warning:".yellow(),
            platforms.len(),
            platforms.join(", ")
        );
    }
    Ok(())
}
