//! Fetch one engineering mnemonic over a time range and export it as a
//! whitespace-separated table of MJD and value.

use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{bail, Context, Result};
use jwst_rust::auth::MastApiToken;
use jwst_rust::config::ClientConfig;
use jwst_rust::edb::{EdbValue, EngineeringDatabase};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 {
        bail!(
            "syntax: {} mnemonic start end [outfile.dat]\n  e.g.: {} SA_ZFGGSPOSX 2022-05-02T06:00:00 2022-05-02T13:30:00 centroids.dat",
            args[0],
            args[0]
        );
    }
    let mnemonic = &args[1];
    let start = &args[2];
    let end = &args[3];

    let config = ClientConfig::from_default_location().unwrap_or_default();
    let token = MastApiToken::resolve(None, true).context("failed to resolve MAST API token")?;
    let edb = EngineeringDatabase::with_config(token, &config)?;

    let series = edb
        .timeseries(mnemonic, start, end)
        .with_context(|| format!("failed to fetch {mnemonic}"))?;
    println!("{mnemonic}: {} samples", series.len());

    if let Some(stats) = series.cadence_stats() {
        println!(
            "sample cadence: min={:.3} s, median={:.3} s, mean={:.3} s, max={:.3} s, std={:.3} s",
            stats.min, stats.median, stats.mean, stats.max, stats.std_dev
        );
        for gap in series.gaps(3.0) {
            println!(
                "gap of {:.3} s between {} and {}",
                gap.seconds,
                gap.start.format("%Y-%m-%dT%H:%M:%S%.3f"),
                gap.end.format("%Y-%m-%dT%H:%M:%S%.3f")
            );
        }
    }

    if let Some(outfile) = args.get(4) {
        println!("writing {outfile}");
        let mut writer = BufWriter::new(
            File::create(outfile).with_context(|| format!("failed to create {outfile}"))?,
        );
        writeln!(writer, "# MJD (UTC) \t {mnemonic}")?;
        for sample in series.samples() {
            match &sample.value {
                EdbValue::Real(v) => {
                    writeln!(writer, "{:.10} \t {:.7}", sample.mjd.value(), v)?
                }
                EdbValue::Text(text) => {
                    writeln!(writer, "{:.10} \t {}", sample.mjd.value(), text)?
                }
            }
        }
    }

    Ok(())
}
