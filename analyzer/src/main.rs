use adrcore::LogVariant;
use anyhow::Context;
use clap::{Parser, ValueEnum};
use generator::profile::{build_scenario, GeneratorConfig};
use std::path::PathBuf;
use workflow::config::WorkflowConfig;
use workflow::report::AnalysisReport;
use workflow::runner::Runner;

mod generator;
mod workflow;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VariantArg {
    Quick,
    Full,
}

impl From<VariantArg> for LogVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Quick => LogVariant::Quick,
            VariantArg::Full => LogVariant::Full,
        }
    }
}

#[derive(Parser)]
#[command(author, version, about = "ADR tracker log analysis and notch-maneuver report")]
struct Args {
    /// Track/scan event log (TRK and SCAN_END lines)
    #[arg(long)]
    tracks: Option<PathBuf>,
    /// Detection log (range doppler magnitude rows)
    #[arg(long)]
    detections: Option<PathBuf>,
    /// Load a workflow config from YAML
    #[arg(long)]
    workflow: Option<PathBuf>,
    /// Grid variant; inferred from the log file names when omitted
    #[arg(long, value_enum)]
    variant: Option<VariantArg>,
    #[arg(long)]
    notch_time: Option<f64>,
    #[arg(long)]
    notch_duration: Option<f64>,
    #[arg(long)]
    scan_rate: Option<f64>,
    /// Number of strongest map cells to list
    #[arg(long)]
    peaks: Option<usize>,
    /// Write the analysis report as JSON
    #[arg(long)]
    report: Option<PathBuf>,
    /// Generate a seeded synthetic scenario into this directory and analyse it
    #[arg(long)]
    synthetic: Option<PathBuf>,
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

impl Args {
    fn workflow_config(&self) -> anyhow::Result<WorkflowConfig> {
        let mut config = match &self.workflow {
            Some(path) => WorkflowConfig::load(path)?,
            None => WorkflowConfig::from_args(None, None, None),
        };
        if self.tracks.is_some() {
            config.tracks = self.tracks.clone();
        }
        if self.detections.is_some() {
            config.detections = self.detections.clone();
        }
        if let Some(variant) = self.variant {
            config.variant = Some(variant.into());
        }
        if let Some(time) = self.notch_time {
            config.notch.notch_time_s = time;
        }
        if let Some(duration) = self.notch_duration {
            config.notch.notch_duration_s = duration;
        }
        if let Some(rate) = self.scan_rate {
            config.notch.scan_rate_hz = rate;
        }
        if let Some(peaks) = self.peaks {
            config.peaks = peaks;
        }
        if self.report.is_some() {
            config.report = self.report.clone();
        }
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut config = args.workflow_config()?;

    if let Some(dir) = &args.synthetic {
        let generator = GeneratorConfig {
            variant: config.variant.unwrap_or_default(),
            notch_time_s: config.notch.notch_time_s,
            notch_duration_s: config.notch.notch_duration_s,
            scan_rate_hz: config.notch.scan_rate_hz,
            seed: args.seed,
            ..Default::default()
        };
        let (tracks, detections) = build_scenario(&generator)
            .context("generating synthetic scenario")?
            .write_to(dir)?;
        println!(
            "Synthetic scenario written: {}, {}",
            tracks.display(),
            detections.display()
        );
        config.tracks = Some(tracks);
        config.detections = Some(detections);
    }

    let result = Runner::new(config.clone()).execute()?;
    if result.output.is_empty() {
        println!("No data found. Run the ADR testbench simulation first.");
        println!("Expected files: ADR_quick_trk.txt / ADR_quick_det.txt");
        println!("            or: ADR_tracks.txt / ADR_detections.txt");
        return Ok(());
    }

    let report = AnalysisReport::build(&result, config.peaks);
    print!("{}", report.render_text());

    if let Some(path) = &config.report {
        report.write_json(path)?;
        println!("Saved: {}", path.display());
    }

    Ok(())
}
