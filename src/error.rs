use crate::pose::KeypointKind;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unknown keypoint name: {0}")]
    UnknownKeypointName(String),

    #[error("failed to convert keypoint variant to usize: {0:?}")]
    KeypointVariantToUSize(KeypointKind),

    #[error("failed to open input: {1:?}")]
    OpenInput(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to read detection batch")]
    ReadBatch(#[source] std::io::Error),

    #[error("failed to parse detection batch on line {1}")]
    ParseBatch(#[source] serde_json::Error, usize),

    #[error("failed to write detection batch")]
    WriteBatch(#[source] serde_json::Error),

    #[error("failed to create state record output: {1:?}")]
    CreateRecords(#[source] std::io::Error, std::path::PathBuf),

    #[error("failed to write state record")]
    WriteRecord(#[source] serde_json::Error),
}
