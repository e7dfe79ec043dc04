use anyhow::Result;

use super::config::JobConfig;
use super::report::CommandOutcome;
use crate::shared::constants;
use crate::utils::file_utils;
use crate::utils::process::{quote, quote_path};

pub struct StitchOutcome {
    pub frame_count: usize,
    pub moved: usize,
    pub command: CommandOutcome,
}

/// The stitcher expands `%d` to the stream index and `%04d` to the frame
/// number, reading both fisheye halves and writing `*_sphere.jpg` next to
/// the front frames.
pub fn stitch_command(job: &JobConfig, frame_count: usize) -> String {
    let template = job
        .output_folder
        .join(format!("{}%d", constants::TRACK_DIR_PREFIX))
        .join(constants::FRAME_NAME_PATTERN);

    format!(
        "{exe} -w {width} -n {first} -m {count} {template}",
        exe = quote_path(&job.stitcher_path()),
        width = job.device.stitch_width,
        first = job.device.first_frame,
        count = frame_count,
        template = quote(&template.to_string_lossy()),
    )
}

/// Stitches the extracted pairs, gathers the panoramas into `frames/` and
/// drops both track folders, whether or not anything was produced.
pub fn stitch_frames(job: &JobConfig) -> Result<StitchOutcome> {
    let front = job.front_track_dir();
    let back = job.back_track_dir();

    let frame_count = file_utils::number_of_files(&front)?;
    println!("number of frames extracted: {}", frame_count);
    crate::utils::logger::info(&format!("number of frames extracted: {}", frame_count));

    let command = CommandOutcome::run(job, stitch_command(job, frame_count));

    let frames = file_utils::make_directory(&job.frames_dir(), "", true)?;
    let moved = if front.is_dir() {
        file_utils::move_all_files(&front, &frames, &job.device.stitched_glob)?
    } else {
        0
    };
    if moved == 0 {
        crate::utils::logger::error(&format!(
            "no {} files produced in {}",
            job.device.stitched_glob,
            front.display()
        ));
    }

    file_utils::delete_directory(&front);
    file_utils::delete_directory(&back);

    Ok(StitchOutcome {
        frame_count,
        moved,
        command,
    })
}
