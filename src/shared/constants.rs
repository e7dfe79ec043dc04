pub const APP_NAME: &str = "gopromax-frames";

pub const ERROR_LOG_FILE: &str = "error.log";
pub const DEBUG_LOG_FILE: &str = "debug.log";

pub const DEFAULT_OUTPUT_FOLDER: &str = "/tmp/gopromax";
pub const DEFAULT_BIN_DIR: &str = "/opt/max2sphere-batch";
pub const DEFAULT_GPX_FORMAT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/resources/gpx.fmt");
pub const DEFAULT_FRAME_RATE: u32 = 1;
pub const DEFAULT_QUALITY: u32 = 2;

pub const FFMPEG_PROGRAM: &str = "ffmpeg";
pub const EXIFTOOL_PROGRAM: &str = "exiftool";

// GoPro MAX: stream 0 and stream 5 carry the two fisheye halves.
pub const FRONT_STREAM_INDEX: u32 = 0;
pub const BACK_STREAM_INDEX: u32 = 5;

pub const STITCHER_EXE: &str = "MAX2spherebatch";
pub const STITCH_WIDTH: u32 = 4096;
pub const STITCH_FIRST_FRAME: u32 = 1;
pub const STITCHED_FRAME_GLOB: &str = "*_sphere.jpg";

pub const PANO_WIDTH_PIXELS: u32 = 4096;
pub const PANO_HEIGHT_PIXELS: u32 = 1344;
pub const CAMERA_MAKE: &str = "GoPro";
pub const CAMERA_MODEL: &str = "Max";

pub const FRAME_NAME_PATTERN: &str = "img%04d.jpg";
pub const TRACK_DIR_PREFIX: &str = "track";
// MAX2spherebatch fills `track%d` with 0 and 5 itself, whatever streams were demuxed.
pub const FRONT_TRACK_DIR: &str = "track0";
pub const BACK_TRACK_DIR: &str = "track5";
pub const FRAMES_DIR: &str = "frames";
pub const METADATA_DIR: &str = "metadata";

pub const GPS_TRACK_FILE: &str = "gps_track.gpx";
pub const METADATA_XML_FILE: &str = "metadata_all.xml";
pub const METADATA_TEXT_FILE: &str = "metadata.txt";

pub const GPS_NAMESPACE: &str = "http://ns.exiftool.ca/QuickTime/Track4/1.0/";
pub const GPS_DATE_TIME_TAG: &str = "GPSDateTime";
