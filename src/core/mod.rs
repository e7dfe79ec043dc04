pub mod config;
pub mod extractor;
pub mod metadata;
pub mod pipeline;
pub mod report;
pub mod stitcher;
