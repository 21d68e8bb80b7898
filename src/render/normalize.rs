// SPDX-License-Identifier: GPL-3.0-or-later
use image::Luma;

use crate::error::PipelineError;
use crate::image_buffer::{NormalizedImage, RawThermalSample};

/// Stretch a sample's observed range to 16 bits, then keep the high byte of each value.
///
/// Stretching before dropping the low byte keeps the full contrast of the scene regardless of the
/// ambient temperature. A flat sample has no range to stretch and comes out all zero.
pub(crate) fn normalize(sample: &RawThermalSample) -> Result<NormalizedImage, PipelineError> {
    let (min, max) = sample
        .pixels()
        .map(|p| p[0])
        .fold(None, |acc, value| match acc {
            None => Some((value, value)),
            Some((min, max)) => Some((min.min(value), max.max(value))),
        })
        .ok_or(PipelineError::EmptySample)?;
    let range = u32::from(max - min);
    let normalized = NormalizedImage::from_fn(sample.width(), sample.height(), |x, y| {
        if range == 0 {
            return Luma([0]);
        }
        let offset = u32::from(sample.get_pixel(x, y)[0] - min);
        let stretched = (offset * u32::from(u16::MAX) + range / 2) / range;
        Luma([(stretched >> 8) as u8])
    });
    Ok(normalized)
}
