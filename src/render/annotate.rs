// SPDX-License-Identifier: GPL-3.0-or-later
use chrono::{DateTime, TimeZone};
use image::Rgb;
use imageproc::drawing::draw_line_segment_mut;
use tracing::trace;

use std::fmt;

use crate::camera::PixelLocation;
use crate::error::PipelineError;
use crate::image_buffer::{FrameImage, RawThermalSample};
use crate::temperature::Centikelvin;

use super::font;
use super::settings::RenderSettings;

/// Baseline anchors for the three lines of text, top to bottom.
const TIMESTAMP_ANCHOR: (i32, i32) = (10, 25);
const HOTSPOT_ANCHOR: (i32, i32) = (10, 50);
const AVERAGE_ANCHOR: (i32, i32) = (10, 75);

pub(crate) fn timestamp_text<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    now.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(crate) fn hotspot_text(value: u16) -> String {
    Centikelvin::from(value).to_string()
}

pub(crate) fn average_text(average: Centikelvin) -> String {
    format!("Avg: {}", average)
}

/// The mean of each row's mean, or `None` for an empty sample.
pub(crate) fn mean_of_row_means(sample: &RawThermalSample) -> Option<Centikelvin> {
    let (width, height) = sample.dimensions();
    if width == 0 || height == 0 {
        return None;
    }
    let row_means_total: f64 = sample
        .rows()
        .map(|row| row.map(|p| f64::from(p[0])).sum::<f64>() / f64::from(width))
        .sum();
    Some(Centikelvin(row_means_total / f64::from(height)))
}

/// Draws the heads-up display: timestamp, hotspot readout with crosshair, and the average.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Annotator {
    color: Rgb<u8>,
    text_scale: u32,
    crosshair_half_length: u32,
    line_thickness: u32,
}

impl Annotator {
    /// Create an annotator drawing in `color`, given as blue, green, red.
    pub(crate) fn new(
        color: [u8; 3],
        text_scale: u32,
        crosshair_half_length: u32,
        line_thickness: u32,
    ) -> Self {
        let [blue, green, red] = color;
        Self {
            color: Rgb([red, green, blue]),
            text_scale,
            crosshair_half_length,
            line_thickness,
        }
    }

    fn draw_text(&self, frame: &mut FrameImage, anchor: (i32, i32), text: &str) {
        let (x, y) = anchor;
        font::draw_text(frame, self.color, x, y, self.text_scale, text);
    }

    /// Two perpendicular strokes centered on `center`, `line_thickness` pixels wide.
    fn draw_crosshair(&self, frame: &mut FrameImage, center: PixelLocation) {
        let x = center.x as f32;
        let y = center.y as f32;
        let half = self.crosshair_half_length as f32;
        let thickness = self.line_thickness.max(1) as i32;
        for stroke in 0..thickness {
            let shift = (stroke - thickness / 2) as f32;
            draw_line_segment_mut(frame, (x - half, y + shift), (x + half, y + shift), self.color);
            draw_line_segment_mut(frame, (x + shift, y - half), (x + shift, y + half), self.color);
        }
    }

    /// Draw all annotations onto `frame`.
    ///
    /// `hotspot_location` is in `frame` coordinates, the average is taken over `raw`.
    pub(crate) fn annotate<Tz>(
        &self,
        frame: &mut FrameImage,
        now: &DateTime<Tz>,
        hotspot_value: u16,
        hotspot_location: PixelLocation,
        raw: &RawThermalSample,
    ) -> Result<(), PipelineError>
    where
        Tz: TimeZone,
        Tz::Offset: fmt::Display,
    {
        self.draw_text(frame, TIMESTAMP_ANCHOR, &timestamp_text(now));
        self.draw_text(frame, HOTSPOT_ANCHOR, &hotspot_text(hotspot_value));
        self.draw_crosshair(frame, hotspot_location);
        let average = mean_of_row_means(raw).ok_or(PipelineError::EmptySample)?;
        let average_text = average_text(average);
        trace!(%average_text, "annotated frame");
        self.draw_text(frame, AVERAGE_ANCHOR, &average_text);
        Ok(())
    }
}

impl<'a> From<&'a RenderSettings> for Annotator {
    fn from(settings: &'a RenderSettings) -> Self {
        Self::new(
            settings.hud_color,
            settings.text_scale,
            settings.crosshair_half_length,
            settings.line_thickness,
        )
    }
}
