use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::config::JobConfig;
use super::pipeline::Stage;
use crate::utils::process;

/// One external invocation and whether it exited with status zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandOutcome {
    pub command: String,
    pub success: bool,
}

impl CommandOutcome {
    /// Echoes, logs and runs `command` with the job's output and env settings.
    pub fn run(job: &JobConfig, command: String) -> Self {
        println!("cmd: {}", command);
        crate::utils::logger::info(&format!("cmd: {}", command));

        let success = process::run_command(&command, job.show_progress, job.tool_env());
        if !success {
            crate::utils::logger::error(&format!("external command failed: {}", command));
        }
        Self { command, success }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: Stage,
    pub commands: Vec<CommandOutcome>,
    pub elapsed_ms: u64,
}

impl StageReport {
    pub fn succeeded(&self) -> bool {
        self.commands.iter().all(|c| c.success)
    }

    pub fn first_failure(&self) -> Option<&CommandOutcome> {
        self.commands.iter().find(|c| !c.success)
    }
}

/// Outcome of a whole run. External failures never abort a lenient run, so
/// this is the only place they surface.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub video_file: PathBuf,
    pub output_folder: PathBuf,
    pub frame_delta: f64,
    pub extracted_frames: usize,
    pub stitched_frames: usize,
    pub gps_start_time: String,
    pub stages: Vec<StageReport>,
    pub completed: bool,
    /// Stage the run stopped in, if it stopped early.
    pub failed_stage: Option<Stage>,
    pub error: Option<String>,
}

impl RunReport {
    pub fn new(job: &JobConfig) -> Self {
        Self {
            video_file: job.video_file.clone(),
            output_folder: job.output_folder.clone(),
            frame_delta: job.frame_delta(),
            extracted_frames: 0,
            stitched_frames: 0,
            gps_start_time: String::new(),
            stages: Vec::new(),
            completed: false,
            failed_stage: None,
            error: None,
        }
    }

    pub fn succeeded(&self) -> bool {
        self.completed && self.stages.iter().all(StageReport::succeeded)
    }

    pub fn failed_commands(&self) -> impl Iterator<Item = (Stage, &CommandOutcome)> {
        self.stages
            .iter()
            .flat_map(|s| s.commands.iter().filter(|c| !c.success).map(move |c| (s.stage, c)))
    }

    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize run report")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write run report: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stage(stage: Stage, results: &[bool]) -> StageReport {
        StageReport {
            stage,
            commands: results
                .iter()
                .enumerate()
                .map(|(i, ok)| CommandOutcome {
                    command: format!("cmd{}", i),
                    success: *ok,
                })
                .collect(),
            elapsed_ms: 0,
        }
    }

    #[test]
    fn test_failed_commands_are_listed_per_stage() {
        let job = JobConfig::new("/videos/in.360", "/tmp/out");
        let mut report = RunReport::new(&job);
        report.stages.push(stage(Stage::Extract, &[true]));
        report.stages.push(stage(Stage::MetadataExtract, &[true, false, true]));
        report.completed = true;

        let failed: Vec<_> = report.failed_commands().collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].0, Stage::MetadataExtract);
        assert_eq!(failed[0].1.command, "cmd1");
        assert!(!report.succeeded());
        assert_eq!(
            report.stages[1].first_failure().map(|c| c.command.as_str()),
            Some("cmd1")
        );
    }

    #[test]
    fn test_report_serializes_stage_names() {
        let job = JobConfig::new("/videos/in.360", "/tmp/out");
        let mut report = RunReport::new(&job);
        report.stages.push(stage(Stage::Stitch, &[true]));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["stages"][0]["stage"], "stitch");
        assert_eq!(json["frame_delta"], 1.0);
        assert_eq!(json["completed"], false);
    }
}
