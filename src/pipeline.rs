// SPDX-License-Identifier: GPL-3.0-or-later
use chrono::{DateTime, TimeZone};
use image::{Bgr, Rgb};
use tracing::trace;

use std::fmt;

use crate::camera::Acquisition;
use crate::error::PipelineError;
use crate::image_buffer::{FrameImage, RawThermalSample, VisibleImage};
use crate::render::{self, Annotator, Placement, RenderSettings};

/// Turns one acquired thermal sample and visible frame into an annotated RGB frame.
///
/// The stages are run in a fixed order: normalize, colorize, blend onto the visible frame, swap
/// to RGB order, then annotate. Nothing is kept between frames.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct FramePipeline {
    overlay_alpha: u8,
    placement: Placement,
    annotator: Annotator,
}

impl FramePipeline {
    pub(crate) fn new(settings: &RenderSettings) -> Self {
        Self {
            overlay_alpha: settings.overlay_alpha,
            placement: settings.placement(),
            annotator: Annotator::from(settings),
        }
    }

    /// Blend the false color rendition of `display` onto `visible`.
    pub(crate) fn composite(
        &self,
        display: &RawThermalSample,
        mut visible: VisibleImage,
    ) -> Result<VisibleImage, PipelineError> {
        let normalized = render::normalize(display)?;
        let colors = render::colorize(&normalized);
        let overlay = render::with_alpha(&colors, self.overlay_alpha);
        render::blend_onto(&mut visible, &overlay, &self.placement);
        Ok(visible)
    }

    /// Run every stage for one acquisition, stamping the frame with `now`.
    pub(crate) fn render<Tz>(
        &self,
        acquisition: Acquisition,
        now: &DateTime<Tz>,
    ) -> Result<FrameImage, PipelineError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        let hotspot = acquisition.hotspot();
        let Acquisition {
            raw,
            display,
            visible,
            ..
        } = acquisition;
        let composite = self.composite(&display, visible)?;
        let mut frame = bgr_to_rgb(&composite);
        self.annotator
            .annotate(&mut frame, now, hotspot.value, hotspot.location, &raw)?;
        trace!(
            width = frame.width(),
            height = frame.height(),
            "rendered frame"
        );
        Ok(frame)
    }
}

fn bgr_to_rgb(image: &VisibleImage) -> FrameImage {
    FrameImage::from_fn(image.width(), image.height(), |x, y| {
        let Bgr([blue, green, red]) = *image.get_pixel(x, y);
        Rgb([red, green, blue])
    })
}
