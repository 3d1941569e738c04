// error.rs — crate-wide error type.
//
// Every failure is fatal for the run that hit it. Nothing here is retried or
// recovered locally: there is no partial estimate, and there is no silent
// fallback to a CPU path. Callers match on the variant if they want to decide
// what to do next (e.g. a harness that falls back to `reduce::reference_estimate`).

/// Errors from point generation, device setup, dispatch and readback.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// No usable compute adapter, or the device request was refused.
    #[error("no compute device available: {reason}")]
    ResourceUnavailable {
        reason: String,
        #[source]
        source: Option<wgpu::RequestDeviceError>,
    },

    /// N is zero or too large for the `f32` count header to hold exactly.
    ///
    /// Also the resource error for an oversized N: the count header is the
    /// first limit a large N runs into, so such a request fails here before
    /// any host or device allocation is attempted, never as
    /// `AllocationFailure`.
    #[error("invalid point count {requested} (must be in 1..={max})")]
    InvalidPointCount { requested: usize, max: usize },

    /// A host or device allocation could not be satisfied.
    #[error("allocation of {bytes} bytes failed: {reason}")]
    AllocationFailure { bytes: u64, reason: String },

    /// Pipeline creation, dispatch or queue submission failed.
    #[error("submission failed: {0}")]
    SubmissionFailure(String),

    /// The staging buffer could not be mapped for readback.
    #[error("staging buffer mapping failed: {0}")]
    MappingFailure(String),

    /// A classification buffer does not line up with its point count.
    #[error("classification buffer holds {actual} values, expected {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    /// Rejected configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        Error::ResourceUnavailable {
            reason: reason.into(),
            source: None,
        }
    }
}
