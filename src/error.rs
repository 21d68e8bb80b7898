// SPDX-License-Identifier: GPL-3.0-or-later
use tokio::task::JoinError;

use std::error::Error as StdError;
use std::fmt;

/// Errors from reading either of the cameras.
///
/// These are transient as far as a client stream is concerned; the capture is retried.
#[derive(Debug)]
pub(crate) enum AcquisitionError {
    /// The thermal sensor failed to produce a sample.
    Thermal(anyhow::Error),
    /// The visible-light camera failed to produce a frame.
    Visible(anyhow::Error),
    /// The blocking capture task was cancelled before it finished.
    Worker(JoinError),
}

impl fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Thermal(e) => write!(f, "Thermal sensor capture failed: {:#}", e),
            Self::Visible(e) => write!(f, "Visible camera capture failed: {:#}", e),
            Self::Worker(e) => write!(f, "Capture task did not complete: {}", e),
        }
    }
}

impl StdError for AcquisitionError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Thermal(e) => Some(e.as_ref()),
            Self::Visible(e) => Some(e.as_ref()),
            Self::Worker(e) => Some(e),
        }
    }
}

impl From<JoinError> for AcquisitionError {
    fn from(e: JoinError) -> Self {
        Self::Worker(e)
    }
}

/// Errors from turning an acquired sample and frame into encoded image data.
///
/// These end the stream for the client that hit them.
#[derive(Debug)]
pub(crate) enum PipelineError {
    /// The thermal sample had no pixels in it.
    EmptySample,
    /// The fused frame could not be encoded.
    Encode(anyhow::Error),
    /// The blocking render task was cancelled before it finished.
    Worker(JoinError),
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::EmptySample => f.write_str("Thermal sample is empty"),
            Self::Encode(e) => write!(f, "Unable to encode frame: {:#}", e),
            Self::Worker(e) => write!(f, "Render task did not complete: {}", e),
        }
    }
}

impl StdError for PipelineError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::EmptySample => None,
            Self::Encode(e) => Some(e.as_ref()),
            Self::Worker(e) => Some(e),
        }
    }
}

impl From<JoinError> for PipelineError {
    fn from(e: JoinError) -> Self {
        Self::Worker(e)
    }
}

#[cfg(test)]
mod test {
    use anyhow::anyhow;

    use std::error::Error as _;

    use super::{AcquisitionError, PipelineError};

    #[test]
    fn acquisition_display_includes_context() {
        let inner = anyhow!("bus timeout").context("reading frame");
        let err = AcquisitionError::Thermal(inner);
        assert_eq!(
            err.to_string(),
            "Thermal sensor capture failed: reading frame: bus timeout"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn empty_sample_has_no_source() {
        assert!(PipelineError::EmptySample.source().is_none());
    }
}
