use std::path::PathBuf;

use arcstr::ArcStr;
use gds21::GdsError;
use thiserror::Error;

/// A result type returning reticle composition errors.
pub type Result<T> = std::result::Result<T, Error>;

/// An error arising while composing a reticle.
#[derive(Debug, Error)]
pub enum Error {
    /// A layout file could not be read, written, or parsed.
    #[error("failed to process layout file `{path:?}`: {source}")]
    FileFormat {
        /// The path of the offending file.
        path: PathBuf,
        /// The underlying GDSII error.
        #[source]
        source: GdsError,
    },
    /// An unrecognized response to an interactive question.
    #[error("invalid input: {0}")]
    Input(String),
    /// Every layer number is already taken.
    #[error("no unused layer number remains for design layer {0}")]
    LayerSpaceExhausted(i16),
    /// A required cell does not exist.
    #[error("cell not found: `{0}`")]
    MissingCell(ArcStr),
    /// The design has no top-level cell.
    #[error("no top-level cell found in design")]
    NoTopCell,
    /// The design has several top-level cells and none was chosen.
    #[error("multiple top-level cells found: {}", .0.join(", "))]
    AmbiguousTopCell(Vec<ArcStr>),
    /// A cell instantiates itself, directly or indirectly.
    #[error("cell hierarchy contains a cycle through `{0}`")]
    CellCycle(ArcStr),
    /// The barcode label is empty or too long.
    #[error("barcode must be between 1 and 12 characters long, got {0}")]
    InvalidBarcodeLength(usize),
    /// The barcode label contains a character Code 39 cannot encode.
    #[error("invalid character in barcode: '{0}'")]
    InvalidBarcodeCharacter(char),
    /// A transformed coordinate does not fit in a GDSII coordinate.
    #[error("coordinate {0} is out of range for GDSII")]
    CoordinateOverflow(f64),
    /// The facility configuration could not be parsed.
    #[error("invalid facility configuration: {0}")]
    Config(#[from] toml::de::Error),
    /// The facility configuration file could not be read.
    #[error("failed to read facility configuration at `{path:?}`: {err}")]
    ConfigRead {
        /// The path we attempted to read.
        path: PathBuf,
        /// The underlying error.
        #[source]
        err: std::io::Error,
    },
}
