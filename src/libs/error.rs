/// Result type used across the library
pub type Result<T> = std::result::Result<T, MafError>;

/// Errors raised by the block engine.
///
/// Merge refusals are not errors; see [`crate::libs::merge::MergeOutcome`].
#[derive(thiserror::Error, Debug)]
pub enum MafError {
    /// Two blocks were compared out of genomic order
    #[error("Block starting at {second} was compared after block starting at {first}")]
    OrderingViolation { first: u64, second: u64 },

    /// A row lookup failed for a species that should be present
    #[error("Species not found in block: {0}")]
    SpeciesNotFound(String),

    /// Invalid column range handed to the splitter
    #[error("Invalid split range {start}..{end} for alignment of width {width}")]
    SplitRange {
        start: usize,
        end: usize,
        width: usize,
    },

    /// Operation needs a target row but the block has none
    #[error("Alignment block has no sequence rows")]
    EmptyBlock,

    /// Requested block number lies past the end of the input
    #[error("Requested block index ({0}) is beyond the last block ({1} blocks read)")]
    IndexOutOfRange(usize, usize),

    #[error("Missing configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
