// SPDX-License-Identifier: GPL-3.0-or-later
use image::{Bgr, Bgra};
use lazy_static::lazy_static;

use crate::image_buffer::{FalseColorImage, NormalizedImage, OverlayImage};

lazy_static! {
    /// A black-red-yellow-white heat palette, indexed by intensity.
    ///
    /// Red ramps up over the bottom three eighths, then green over the next three eighths, then
    /// blue over the last quarter.
    static ref HOT: [Bgr<u8>; 256] = {
        let ramp = |intensity: usize, start: usize, span: usize| -> u8 {
            if intensity < start {
                0
            } else {
                ((intensity - start) * 255 / span).min(255) as u8
            }
        };
        let mut palette = [Bgr([0, 0, 0]); 256];
        for (intensity, color) in palette.iter_mut().enumerate() {
            let red = ramp(intensity, 0, 95);
            let green = ramp(intensity, 96, 95);
            let blue = ramp(intensity, 192, 63);
            *color = Bgr([blue, green, red]);
        }
        palette
    };
}

/// The palette color for a single intensity.
pub(crate) fn hot(intensity: u8) -> Bgr<u8> {
    HOT[intensity as usize]
}

/// Map every intensity of a normalized image through the heat palette.
pub(crate) fn colorize(normalized: &NormalizedImage) -> FalseColorImage {
    FalseColorImage::from_fn(normalized.width(), normalized.height(), |x, y| {
        hot(normalized.get_pixel(x, y)[0])
    })
}

/// Attach a uniform opacity to a false color image.
pub(crate) fn with_alpha(colors: &FalseColorImage, alpha: u8) -> OverlayImage {
    OverlayImage::from_fn(colors.width(), colors.height(), |x, y| {
        let Bgr([blue, green, red]) = *colors.get_pixel(x, y);
        Bgra([blue, green, red, alpha])
    })
}
