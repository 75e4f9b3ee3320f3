//! Reproduce the per-integration time table from end-of-group packets.
//!
//! Input files are JSON segments for a single exposure and detector,
//! carrying the primary-header exposure configuration and the GROUP
//! table rows. The reported end-of-group times are fitted with a linear
//! frame-time model, and the model predicts start, middle, and end times
//! for every integration in the exposure.

use std::path::Path;

use anyhow::{bail, Context, Result};
use jwst_rust::io::loaders::{
    write_group_diagnostics_csv, write_integration_times_csv, ExposureLoader,
};
use jwst_rust::timing::reconcile::{fit_timing_model, predict_integration_times};

fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        bail!(
            "syntax: {} segment1.json [segment2.json...]\n  e.g.: {} jw01118005001_04*seg*nrs1_groups.json",
            args[0],
            args[0]
        );
    }

    let data = ExposureLoader::load_segments(&args[1..])
        .context("failed to load exposure segments")?;

    for file in &data.files {
        let name = Path::new(&file.path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.path.display().to_string());
        match &file.segment {
            Some(info) => println!(
                "{name}, seg {}/{}, ints {}-{}",
                info.number, info.total, info.int_start, info.int_end
            ),
            None => println!("{name}, NINTS={}, unsegmented", data.config.n_integrations),
        }
    }

    let fit = fit_timing_model(&data.packets, &data.config)
        .context("failed to fit timing model")?;
    println!(
        "measured frame cadence={:.8} s, nominal TFRAME={} s",
        fit.model.cadence, data.config.frame_time
    );

    // Residual histogram for each group number in all integrations.
    for stats in &fit.group_stats {
        println!(
            "g={:2}, min={:+.4}, avg={:+.4}, uavg={:+.4}, std={:+.4}, max={:+.4}",
            stats.group, stats.min, stats.mean, stats.mean_err, stats.std_dev, stats.max
        );
    }

    let group_csv = Path::new("group_exten.csv");
    println!("writing {}", group_csv.display());
    write_group_diagnostics_csv(group_csv, &fit)
        .with_context(|| format!("failed to write {}", group_csv.display()))?;

    let timings = predict_integration_times(&fit, &data.config)
        .context("failed to predict integration times")?;

    let int_csv = Path::new("int_times_exten.csv");
    println!("writing {}", int_csv.display());
    write_integration_times_csv(int_csv, &timings)
        .with_context(|| format!("failed to write {}", int_csv.display()))?;

    Ok(())
}
