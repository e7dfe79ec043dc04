use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::PipelineError;
use crate::shared::constants;

/// Programs used for the external stages. Values are inserted into the shell
/// command line as-is, so `"sh /path/to/wrapper"` works too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolConfig {
    pub ffmpeg: String,
    pub exiftool: String,
    /// Extra environment for every external invocation.
    pub env: HashMap<String, String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            ffmpeg: constants::FFMPEG_PROGRAM.to_string(),
            exiftool: constants::EXIFTOOL_PROGRAM.to_string(),
            env: HashMap::new(),
        }
    }
}

/// Camera-specific layout: which streams hold the fisheye halves and what
/// the stitched panorama looks like.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceProfile {
    pub front_stream: u32,
    pub back_stream: u32,
    pub stitcher_exe: String,
    pub stitch_width: u32,
    pub first_frame: u32,
    pub stitched_glob: String,
    pub pano_width: u32,
    pub pano_height: u32,
    pub crop_left: u32,
    pub crop_top: u32,
    pub make: String,
    pub model: String,
}

impl Default for DeviceProfile {
    fn default() -> Self {
        Self {
            front_stream: constants::FRONT_STREAM_INDEX,
            back_stream: constants::BACK_STREAM_INDEX,
            stitcher_exe: constants::STITCHER_EXE.to_string(),
            stitch_width: constants::STITCH_WIDTH,
            first_frame: constants::STITCH_FIRST_FRAME,
            stitched_glob: constants::STITCHED_FRAME_GLOB.to_string(),
            pano_width: constants::PANO_WIDTH_PIXELS,
            pano_height: constants::PANO_HEIGHT_PIXELS,
            crop_left: 0,
            crop_top: 0,
            make: constants::CAMERA_MAKE.to_string(),
            model: constants::CAMERA_MODEL.to_string(),
        }
    }
}

/// Optional JSON file given with `--config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub tools: ToolConfig,
    pub device: DeviceProfile,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: FileConfig = serde_json::from_str(&text).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(config)
    }
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct JobConfig {
    pub video_file: PathBuf,
    pub output_folder: PathBuf,
    pub frame_rate: u32,
    pub quality: u32,
    pub bin_dir: PathBuf,
    pub gpx_format: PathBuf,
    /// Wipe the output root before the run.
    pub scratch: bool,
    pub show_progress: bool,
    /// Abort on the first stage with a failed command.
    pub strict: bool,
    pub tools: ToolConfig,
    pub device: DeviceProfile,
}

impl JobConfig {
    pub fn new(video_file: impl Into<PathBuf>, output_folder: impl Into<PathBuf>) -> Self {
        Self {
            video_file: video_file.into(),
            output_folder: output_folder.into(),
            frame_rate: constants::DEFAULT_FRAME_RATE,
            quality: constants::DEFAULT_QUALITY,
            bin_dir: PathBuf::from(constants::DEFAULT_BIN_DIR),
            gpx_format: PathBuf::from(constants::DEFAULT_GPX_FORMAT),
            scratch: false,
            show_progress: false,
            strict: false,
            tools: ToolConfig::default(),
            device: DeviceProfile::default(),
        }
    }

    pub fn with_file_config(mut self, file: FileConfig) -> Self {
        self.tools = file.tools;
        self.device = file.device;
        self
    }

    pub fn frame_delta(&self) -> f64 {
        crate::utils::time_utils::frame_delta(self.frame_rate)
    }

    /// Folder the front fisheye frames land in. Fixed by the stitcher's
    /// naming, independent of `device.front_stream`.
    pub fn front_track_dir(&self) -> PathBuf {
        self.output_folder.join(constants::FRONT_TRACK_DIR)
    }

    pub fn back_track_dir(&self) -> PathBuf {
        self.output_folder.join(constants::BACK_TRACK_DIR)
    }

    pub fn frames_dir(&self) -> PathBuf {
        self.output_folder.join(constants::FRAMES_DIR)
    }

    pub fn metadata_dir(&self) -> PathBuf {
        self.output_folder.join(constants::METADATA_DIR)
    }

    pub fn stitcher_path(&self) -> PathBuf {
        self.bin_dir.join(&self.device.stitcher_exe)
    }

    pub fn tool_env(&self) -> Option<&HashMap<String, String>> {
        if self.tools.env.is_empty() {
            None
        } else {
            Some(&self.tools.env)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_partial_config_falls_back_to_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(
            &path,
            r#"{ "tools": { "exiftool": "/usr/local/bin/exiftool" }, "device": { "back_stream": 4 } }"#,
        )
        .unwrap();

        let config = FileConfig::load(&path).unwrap();
        assert_eq!(config.tools.exiftool, "/usr/local/bin/exiftool");
        assert_eq!(config.tools.ffmpeg, "ffmpeg");
        assert_eq!(config.device.back_stream, 4);
        assert_eq!(config.device.front_stream, 0);
        assert_eq!(config.device.pano_height, 1344);
        assert_eq!(config.device.stitched_glob, "*_sphere.jpg");
    }

    #[test]
    fn test_bad_config_is_reported() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();

        let err = FileConfig::load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::Config { .. })
        ));
        assert!(FileConfig::load(&tmp.path().join("missing.json")).is_err());
    }

    #[test]
    fn test_output_layout_is_fixed() {
        let job = JobConfig::new("/videos/GS010001.360", "/tmp/gopromax");
        assert_eq!(job.front_track_dir(), PathBuf::from("/tmp/gopromax/track0"));
        assert_eq!(job.back_track_dir(), PathBuf::from("/tmp/gopromax/track5"));
        assert_eq!(job.frames_dir(), PathBuf::from("/tmp/gopromax/frames"));
        assert_eq!(job.metadata_dir(), PathBuf::from("/tmp/gopromax/metadata"));
        assert_eq!(
            job.stitcher_path(),
            PathBuf::from(constants::DEFAULT_BIN_DIR).join("MAX2spherebatch")
        );
        assert!(job.tool_env().is_none());
    }

    #[test]
    fn test_track_folders_ignore_stream_remap() {
        let mut job = JobConfig::new("/videos/GS010001.360", "/tmp/gopromax");
        job.device.front_stream = 1;
        job.device.back_stream = 4;
        assert_eq!(job.front_track_dir(), PathBuf::from("/tmp/gopromax/track0"));
        assert_eq!(job.back_track_dir(), PathBuf::from("/tmp/gopromax/track5"));
    }
}
