use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("file [{tag}] [{}] does not exist", path.display())]
    MissingFile { tag: String, path: PathBuf },

    #[error("folder [{tag}] [{}] does not exist", path.display())]
    MissingFolder { tag: String, path: PathBuf },

    #[error("no {tag} found in [{}]", path.display())]
    EmptyGpsStartTime { tag: String, path: PathBuf },

    #[error("stage '{stage}' failed: {command}")]
    StageFailed { stage: String, command: String },

    #[error("invalid file pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("malformed XML in [{}]: {source}", path.display())]
    Xml {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("invalid config [{}]: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
