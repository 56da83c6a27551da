use std::fmt;
use std::path::PathBuf;

/// Failures surfaced by [`crate::scene::world::World`].
#[derive(Debug, Clone, PartialEq)]
pub enum WorldError {
    /// The world could not be built. Fatal at startup.
    Initialization(String),
    /// A user-requested model reload failed; the previous scene is still active.
    Load { path: PathBuf, reason: String },
}

impl fmt::Display for WorldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorldError::Initialization(reason) => {
                write!(f, "failed to initialize the scene: {}", reason)
            }
            WorldError::Load { path, reason } => {
                write!(f, "failed to load '{}': {}", path.display(), reason)
            }
        }
    }
}

impl std::error::Error for WorldError {}
