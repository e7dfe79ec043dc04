mod core;
mod error;
mod shared;
mod utils;

use anyhow::Result;
use clap::{error::ErrorKind, CommandFactory, Parser};
use std::ffi::OsString;
use std::path::PathBuf;

use crate::core::config::{FileConfig, JobConfig};
use crate::core::pipeline::Pipeline;
use crate::core::report::RunReport;
use crate::shared::constants;

#[derive(Parser, Debug)]
#[command(
    name = "gopromax-frames",
    version,
    about = "Generates geotagged, metadata-tagged equirectangular frames from a GoPro MAX .360 video"
)]
struct Cli {
    /// Input .360 video file (-vf)
    #[arg(long = "video-file")]
    video_file: PathBuf,

    /// Output folder (-of)
    #[arg(long = "output-folder", default_value = constants::DEFAULT_OUTPUT_FOLDER)]
    output_folder: PathBuf,

    /// Frames extracted per second of video (-fps)
    #[arg(
        long = "frame-rate",
        default_value_t = constants::DEFAULT_FRAME_RATE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    frame_rate: u32,

    /// Frame extraction quality (ffmpeg -q:v)
    #[arg(short, long, default_value_t = constants::DEFAULT_QUALITY)]
    quality: u32,

    /// Directory that contains the MAX2spherebatch executable
    #[arg(short, long = "bin-dir", default_value = constants::DEFAULT_BIN_DIR)]
    bin_dir: PathBuf,

    /// exiftool print format used to write the GPX track
    #[arg(long = "gpx-format", default_value = constants::DEFAULT_GPX_FORMAT)]
    gpx_format: PathBuf,

    /// JSON file overriding tool programs and the camera profile
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wipe the output folder before running
    #[arg(long, default_value_t = false)]
    scratch: bool,

    /// Stream external tool output instead of discarding it
    #[arg(long = "show-progress", default_value_t = false)]
    show_progress: bool,

    /// Stop with a failure status as soon as a stage's command fails
    #[arg(long, default_value_t = false)]
    strict: bool,

    /// Write the run report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Cli {
    fn into_job(self) -> Result<(JobConfig, Option<PathBuf>)> {
        let file_config = match &self.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };

        let mut job = JobConfig::new(self.video_file, self.output_folder).with_file_config(file_config);
        job.frame_rate = self.frame_rate;
        job.quality = self.quality;
        job.bin_dir = self.bin_dir;
        job.gpx_format = self.gpx_format;
        job.scratch = self.scratch;
        job.show_progress = self.show_progress;
        job.strict = self.strict;

        Ok((job, self.report))
    }
}

/// Rewrites the single-dash multi-letter flags (`-vf`, `-of`, `-fps`) into
/// their long forms so clap can parse them.
fn normalize_args<I: IntoIterator<Item = OsString>>(args: I) -> Vec<OsString> {
    const LEGACY: &[(&str, &str)] = &[
        ("-vf", "--video-file"),
        ("-of", "--output-folder"),
        ("-fps", "--frame-rate"),
    ];

    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str() else {
                return arg;
            };
            for (short, long) in LEGACY {
                if text == *short {
                    return OsString::from(*long);
                }
                if let Some(value) = text.strip_prefix(&format!("{}=", short)) {
                    return OsString::from(format!("{}={}", long, value));
                }
            }
            arg
        })
        .collect()
}

fn parse_cli() -> Cli {
    match Cli::try_parse_from(normalize_args(std::env::args_os())) {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            std::process::exit(0);
        }
        Err(e) => {
            let _ = e.print();
            let _ = Cli::command().print_help();
            std::process::exit(1);
        }
    }
}

fn main() -> Result<()> {
    let cli = parse_cli();
    let (job, report_path) = cli.into_job()?;
    let pipeline = Pipeline::new(job);

    // 1. Inputs first; nothing is created on failure
    pipeline.preflight()?;

    // 2. Output root, then the run logs inside it
    pipeline.prepare_output()?;
    crate::utils::logger::init(&pipeline.job().output_folder);
    crate::utils::logger::install_panic_hook();

    // 3. Stages; the report is written even when a stage aborts the run
    let mut report = RunReport::new(pipeline.job());
    let result = pipeline.run_stages(&mut report);
    if let Some(path) = &report_path {
        report.write_json(path)?;
    }
    result?;

    let failed: Vec<_> = report.failed_commands().collect();
    if !report.succeeded() {
        for (stage, outcome) in &failed {
            eprintln!("warning: [{}] command failed: {}", stage, outcome.command);
        }
    }
    println!(
        "\n{} frames extracted, {} equirectangular frames in {}",
        report.extracted_frames,
        report.stitched_frames,
        pipeline.job().frames_dir().display()
    );
    crate::utils::logger::info(&format!(
        "run finished: {} failed command(s)",
        failed.len()
    ));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> std::result::Result<Cli, clap::Error> {
        Cli::try_parse_from(normalize_args(args.iter().map(OsString::from)))
    }

    #[test]
    fn test_legacy_short_flags_are_accepted() {
        let cli = parse(&[
            "gopromax-frames",
            "-vf",
            "/videos/GS010001.360",
            "-of=/data/out",
            "-fps",
            "4",
            "-q",
            "3",
            "-b",
            "/opt/bin",
        ])
        .unwrap();

        assert_eq!(cli.video_file, PathBuf::from("/videos/GS010001.360"));
        assert_eq!(cli.output_folder, PathBuf::from("/data/out"));
        assert_eq!(cli.frame_rate, 4);
        assert_eq!(cli.quality, 3);
        assert_eq!(cli.bin_dir, PathBuf::from("/opt/bin"));
    }

    #[test]
    fn test_defaults() {
        let cli = parse(&["gopromax-frames", "--video-file", "in.360"]).unwrap();
        assert_eq!(cli.output_folder, PathBuf::from("/tmp/gopromax"));
        assert_eq!(cli.frame_rate, 1);
        assert_eq!(cli.quality, 2);
        assert!(!cli.strict);
        assert!(!cli.scratch);

        let (job, report) = cli.into_job().unwrap();
        assert_eq!(job.frame_delta(), 1.0);
        assert_eq!(job.device.pano_width, 4096);
        assert!(report.is_none());
    }

    #[test]
    fn test_rejects_zero_rate_and_unknown_args() {
        assert!(parse(&["gopromax-frames", "-vf", "in.360", "-fps", "0"]).is_err());
        assert!(parse(&["gopromax-frames", "-vf", "in.360", "--bogus"]).is_err());
        assert!(parse(&["gopromax-frames"]).is_err());
    }
}
