use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use super::config::JobConfig;
use super::report::CommandOutcome;
use crate::error::PipelineError;
use crate::shared::constants;
use crate::utils::file_utils;
use crate::utils::process::{quote, quote_path};

/// Text of the first `{Track4}GPSDateTime` element in document order, or an
/// empty string when the dump has none.
pub fn get_gps_date_time(xml_path: &Path) -> Result<String> {
    let text = fs::read_to_string(xml_path)
        .with_context(|| format!("Failed to read metadata dump: {}", xml_path.display()))?;
    gps_date_time_from_str(&text).map_err(|source| {
        PipelineError::Xml {
            path: xml_path.to_path_buf(),
            source,
        }
        .into()
    })
}

fn gps_date_time_from_str(xml: &str) -> std::result::Result<String, roxmltree::Error> {
    let mut options = roxmltree::ParsingOptions::default();
    options.allow_dtd = true;
    let doc = roxmltree::Document::parse_with_options(xml, options)?;

    let found = doc.descendants().find(|node| {
        node.is_element()
            && node.tag_name().name() == constants::GPS_DATE_TIME_TAG
            && node.tag_name().namespace() == Some(constants::GPS_NAMESPACE)
    });

    Ok(found
        .and_then(|node| node.text())
        .map(str::to_string)
        .unwrap_or_default())
}

/// The three read-only exiftool calls, in run order: GPX track, full XML
/// dump, grouped text listing.
pub fn extract_commands(job: &JobConfig) -> Vec<String> {
    let exiftool = &job.tools.exiftool;
    let video = quote_path(&job.video_file);
    let metadata = job.metadata_dir();

    vec![
        format!(
            "{} -ee -p {} {} > {}",
            exiftool,
            quote_path(&job.gpx_format),
            video,
            quote_path(&metadata.join(constants::GPS_TRACK_FILE))
        ),
        format!(
            "{} -ee -G3 -api LargeFileSupport=1 -X {} > {}",
            exiftool,
            video,
            quote_path(&metadata.join(constants::METADATA_XML_FILE))
        ),
        format!(
            "{} -G -a {} > {}",
            exiftool,
            video,
            quote_path(&metadata.join(constants::METADATA_TEXT_FILE))
        ),
    ]
}

pub fn extract_metadata(job: &JobConfig) -> Result<Vec<CommandOutcome>> {
    file_utils::make_directory(&job.metadata_dir(), "", true)?;

    if !job.gpx_format.is_file() {
        crate::utils::logger::error(&format!(
            "GPX format template not found: {}",
            job.gpx_format.display()
        ));
    }

    Ok(extract_commands(job)
        .into_iter()
        .map(|cmd| CommandOutcome::run(job, cmd))
        .collect())
}

/// The four tag-writing exiftool calls. Order matters: the per-frame offset
/// builds on the start time, and geotagging reads the adjusted time.
pub fn write_commands(job: &JobConfig, gps_start_time: &str) -> Vec<String> {
    let exiftool = &job.tools.exiftool;
    let frames = quote_path(&job.frames_dir());
    let gps_track = quote_path(&job.metadata_dir().join(constants::GPS_TRACK_FILE));
    let device = &job.device;

    let set_start = quote(&format!("-datetimeoriginal={}", gps_start_time));
    let shift = quote(&format!(
        "-datetimeoriginal+<0:0:${{filesequence;$_*={:.6}}}",
        job.frame_delta()
    ));
    let geotime = quote("-geotime<${DateTimeOriginal}+00:00");

    vec![
        format!("{} {} {}", exiftool, set_start, frames),
        format!("{} -fileorder FileName -ext jpg {} {}", exiftool, shift, frames),
        format!("{} -ext jpg -geotag {} {} {}", exiftool, gps_track, geotime, frames),
        format!(
            "{exiftool} -make={make} -model={model} -ProjectionType=equirectangular \
             -UsePanoramaViewer=True \
             -CroppedAreaImageWidthPixels={w} -CroppedAreaImageHeightPixels={h} \
             -FullPanoWidthPixels={w} -FullPanoHeightPixels={h} \
             -CroppedAreaLeftPixels={left} -CroppedAreaTopPixels={top} {frames}",
            exiftool = exiftool,
            make = quote(&device.make),
            model = quote(&device.model),
            w = device.pano_width,
            h = device.pano_height,
            left = device.crop_left,
            top = device.crop_top,
            frames = frames,
        ),
    ]
}

pub fn write_metadata(job: &JobConfig, gps_start_time: &str) -> Vec<CommandOutcome> {
    write_commands(job, gps_start_time)
        .into_iter()
        .map(|cmd| CommandOutcome::run(job, cmd))
        .collect()
}
