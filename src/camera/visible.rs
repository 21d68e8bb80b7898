// SPDX-License-Identifier: GPL-3.0-or-later
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

use anyhow::{anyhow, Context as _};
use image::Bgr;
use tracing::trace;

use crate::image_buffer::VisibleImage;

/// A visible-light camera.
///
/// Captures block until a frame is available (or the camera fails).
pub(crate) trait VisibleCamera {
    /// Capture one frame.
    fn capture(&mut self) -> anyhow::Result<VisibleImage>;
}

/// Capture frames by running an external still-capture program.
///
/// The program is expected to write a single encoded image (JPEG, PNG) to stdout and exit
/// successfully. `libcamera-still -n -t 1 -e jpg -o -` on a Raspberry Pi is one example.
#[derive(Clone, Debug)]
pub(crate) struct CommandCamera {
    program: OsString,
    args: Vec<OsString>,
}

impl CommandCamera {
    pub(crate) fn new<P, I, A>(program: P, args: I) -> Self
    where
        P: Into<OsString>,
        I: IntoIterator<Item = A>,
        A: Into<OsString>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl VisibleCamera for CommandCamera {
    fn capture(&mut self) -> anyhow::Result<VisibleImage> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .output()
            .with_context(|| format!("Unable to run capture program {:?}", self.program))?;
        if !output.status.success() {
            return Err(anyhow!(
                "Capture program {:?} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        trace!(bytes = output.stdout.len(), "decoding captured frame");
        let frame = image::load_from_memory(&output.stdout)
            .context("Unable to decode the captured frame")?;
        Ok(frame.to_bgr8())
    }
}

/// Read a frame from an image file on every capture.
///
/// Useful when another process keeps a file updated with the latest frame, or with a fixed
/// background image for testing.
#[derive(Clone, Debug)]
pub(crate) struct FileCamera(PathBuf);

impl FileCamera {
    pub(crate) fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self(path.into())
    }
}

impl VisibleCamera for FileCamera {
    fn capture(&mut self) -> anyhow::Result<VisibleImage> {
        let frame = image::open(&self.0)
            .with_context(|| format!("Unable to read frame from {}", self.0.display()))?;
        Ok(frame.to_bgr8())
    }
}

/// A "camera" that only ever sees a single color.
#[derive(Clone, Debug)]
pub(crate) struct SolidCamera {
    width: u32,
    height: u32,
    /// Blue, green, red.
    color: [u8; 3],
}

impl SolidCamera {
    pub(crate) fn new(width: u32, height: u32, color: [u8; 3]) -> Self {
        Self {
            width,
            height,
            color,
        }
    }
}

impl VisibleCamera for SolidCamera {
    fn capture(&mut self) -> anyhow::Result<VisibleImage> {
        Ok(VisibleImage::from_pixel(
            self.width,
            self.height,
            Bgr(self.color),
        ))
    }
}
