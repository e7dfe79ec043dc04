use anyhow::Result;

use super::config::JobConfig;
use super::report::CommandOutcome;
use crate::shared::constants;
use crate::utils::file_utils;
use crate::utils::process::{quote, quote_path};

/// Single ffmpeg call demuxing both fisheye streams into numbered JPEGs,
/// one folder per stream.
pub fn extract_command(job: &JobConfig) -> String {
    let front = job.front_track_dir().join(constants::FRAME_NAME_PATTERN);
    let back = job.back_track_dir().join(constants::FRAME_NAME_PATTERN);

    format!(
        "{ffmpeg} -i {video} -map 0:{a} -r {fps} -q:v {q} {front} -map 0:{b} -r {fps} -q:v {q} {back}",
        ffmpeg = job.tools.ffmpeg,
        video = quote_path(&job.video_file),
        a = job.device.front_stream,
        b = job.device.back_stream,
        fps = job.frame_rate,
        q = job.quality,
        front = quote(&front.to_string_lossy()),
        back = quote(&back.to_string_lossy()),
    )
}

/// Creates fresh track folders and runs the extraction. A stream missing from
/// the container just leaves its folder empty.
pub fn extract_frames(job: &JobConfig) -> Result<CommandOutcome> {
    file_utils::make_directory(&job.front_track_dir(), "", true)?;
    file_utils::make_directory(&job.back_track_dir(), "", true)?;

    Ok(CommandOutcome::run(job, extract_command(job)))
}
