use thiserror::Error;

use crate::protocol::{ControllerId, ResultCode};

#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Service call {call} failed: {code}")]
    Service { call: &'static str, code: ResultCode },

    #[error("Could not connect to tracking service at {address}:{port}")]
    ConnectionFailed { address: String, port: String },

    #[error("Failed to allocate listener for controller {0}")]
    ListenerAllocation(ControllerId),

    #[error("Failed to start data stream for controller {controller}: {code}")]
    StreamStart {
        controller: ControllerId,
        code: ResultCode,
    },

    #[error("Controller {0} not found")]
    ControllerNotFound(ControllerId),

    #[error("Invalid frame rate: {0}")]
    InvalidFrameRate(u32),

    #[error("Capture worker panicked")]
    WorkerPanicked,

    #[error("Unsupported by this backend: {0}")]
    Unsupported(&'static str),
}

impl Error {
    /// Wraps a non-success client result code for the named call.
    pub fn service(call: &'static str, code: ResultCode) -> Self {
        Error::Service { call, code }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
