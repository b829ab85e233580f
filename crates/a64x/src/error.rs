use a64x_isa::DecodeError;
use thiserror::Error;

/// Activation errors.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("decoding engine unavailable: {0}")]
    EngineUnavailable(#[from] DecodeError),
    #[error("base architecture '{0}' is not registered")]
    BaseArchitectureMissing(String),
}

pub type Result<T> = std::result::Result<T, PluginError>;
