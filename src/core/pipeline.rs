use anyhow::Result;
use serde::Serialize;

use super::config::JobConfig;
use super::report::{CommandOutcome, RunReport, StageReport};
use super::{extractor, metadata, stitcher};
use crate::error::PipelineError;
use crate::shared::constants;
use crate::utils::file_utils;
use crate::utils::time_utils::Timer;

/// Strictly linear run states; there is no branch back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Init,
    Extract,
    Stitch,
    MetadataExtract,
    MetadataWrite,
    Done,
}

impl Stage {
    pub fn next(self) -> Stage {
        match self {
            Stage::Init => Stage::Extract,
            Stage::Extract => Stage::Stitch,
            Stage::Stitch => Stage::MetadataExtract,
            Stage::MetadataExtract => Stage::MetadataWrite,
            Stage::MetadataWrite | Stage::Done => Stage::Done,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Stage::Init => "Prepare Output",
            Stage::Extract => "Extract Frames",
            Stage::Stitch => "Compute Equirectangular Frames",
            Stage::MetadataExtract => "Extract Metadata",
            Stage::MetadataWrite => "Add Metadata to the Frames",
            Stage::Done => "Done",
        }
    }

    pub fn progress(self) -> &'static str {
        match self {
            Stage::Init => "0/4",
            Stage::Extract => "1/4",
            Stage::Stitch => "2/4",
            Stage::MetadataExtract => "3/4",
            Stage::MetadataWrite => "4/4",
            Stage::Done => "4/4",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

pub struct Pipeline {
    job: JobConfig,
}

impl Pipeline {
    pub fn new(job: JobConfig) -> Self {
        Self { job }
    }

    pub fn job(&self) -> &JobConfig {
        &self.job
    }

    /// Input checks. Nothing under the output folder is touched before
    /// these pass.
    pub fn preflight(&self) -> Result<()> {
        file_utils::assert_file_exists(&self.job.video_file, "video file")?;
        file_utils::assert_folder_exists(&self.job.bin_dir, "bin dir")?;
        Ok(())
    }

    pub fn prepare_output(&self) -> Result<()> {
        file_utils::make_directory(&self.job.output_folder, "", self.job.scratch)?;
        Ok(())
    }

    /// Runs every stage, filling `report` as it goes. On failure the report
    /// keeps the stages that finished plus the failing one.
    pub fn run_stages(&self, report: &mut RunReport) -> Result<()> {
        let job = &self.job;

        println!("frame_delta: {}", report.frame_delta);
        crate::utils::logger::info(&format!(
            "run: video={} output={} fps={} quality={} strict={}",
            job.video_file.display(),
            job.output_folder.display(),
            job.frame_rate,
            job.quality,
            job.strict
        ));

        let mut stage = Stage::Init;
        loop {
            stage = stage.next();
            if stage == Stage::Done {
                break;
            }

            println!("\n#\n# [{}] {}\n#", stage.progress(), stage.title());
            crate::utils::logger::info(&format!("stage {} started", stage.title()));
            let timer = Timer::new();

            let commands = match self.run_stage(stage, report) {
                Ok(commands) => commands,
                Err(e) => {
                    report.failed_stage = Some(stage);
                    report.error = Some(format!("{:#}", e));
                    return Err(e);
                }
            };

            let stage_report = StageReport {
                stage,
                commands,
                elapsed_ms: timer.elapsed_ms(),
            };
            crate::utils::logger::info(&format!(
                "stage {} finished in {} ms (ok={})",
                stage.title(),
                stage_report.elapsed_ms,
                stage_report.succeeded()
            ));

            let strict_failure = match stage_report.first_failure() {
                Some(failed) if job.strict => Some(PipelineError::StageFailed {
                    stage: stage.title().to_string(),
                    command: failed.command.clone(),
                }),
                _ => None,
            };
            report.stages.push(stage_report);

            if let Some(e) = strict_failure {
                report.failed_stage = Some(stage);
                report.error = Some(e.to_string());
                return Err(e.into());
            }
        }

        report.completed = true;
        Ok(())
    }

    fn run_stage(&self, stage: Stage, report: &mut RunReport) -> Result<Vec<CommandOutcome>> {
        let job = &self.job;
        let commands = match stage {
            Stage::Extract => vec![extractor::extract_frames(job)?],
            Stage::Stitch => {
                let outcome = stitcher::stitch_frames(job)?;
                report.extracted_frames = outcome.frame_count;
                report.stitched_frames = outcome.moved;
                vec![outcome.command]
            }
            Stage::MetadataExtract => metadata::extract_metadata(job)?,
            Stage::MetadataWrite => {
                report.gps_start_time = self.gps_start_time()?;
                println!("GPSDateTime: {}", report.gps_start_time);
                metadata::write_metadata(job, &report.gps_start_time)
            }
            Stage::Init | Stage::Done => Vec::new(),
        };
        Ok(commands)
    }

    fn gps_start_time(&self) -> Result<String> {
        let xml = self.job.metadata_dir().join(constants::METADATA_XML_FILE);
        let time = metadata::get_gps_date_time(&xml)?;
        if time.trim().is_empty() {
            crate::utils::logger::error(&format!("no GPSDateTime in {}", xml.display()));
            return Err(PipelineError::EmptyGpsStartTime {
                tag: constants::GPS_DATE_TIME_TAG.to_string(),
                path: xml,
            }
            .into());
        }
        Ok(time)
    }
}
