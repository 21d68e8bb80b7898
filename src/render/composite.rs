// SPDX-License-Identifier: GPL-3.0-or-later
use std::borrow::Cow;

use image::{Bgr, Bgra};

use crate::image_buffer::{OverlayImage, VisibleImage};

use super::resize::{self, Method};

/// Where and how large an overlay is placed on a background.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Placement {
    /// Destination of the overlay's top left pixel as (column, row). May be negative.
    pub(crate) offset: (i32, i32),
    /// Uniform scale applied to the overlay before blending.
    pub(crate) scale: f32,
    pub(crate) method: Method,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            offset: (0, 0),
            scale: 1.0,
            method: Method::default(),
        }
    }
}

fn blend_channel(overlay: u8, background: u8, alpha: f32) -> u8 {
    let blended = alpha * f32::from(overlay) + (1.0 - alpha) * f32::from(background);
    blended.round().max(0.0).min(255.0) as u8
}

/// Alpha blend `overlay` onto `background` in place.
///
/// Overlay pixels that land outside of the background are skipped.
pub(crate) fn blend_onto(
    background: &mut VisibleImage,
    overlay: &OverlayImage,
    placement: &Placement,
) {
    #[allow(clippy::float_cmp)]
    let overlay = if placement.scale == 1.0 {
        Cow::Borrowed(overlay)
    } else {
        Cow::Owned(resize::scale(overlay, placement.scale, placement.method))
    };
    let (column, row) = placement.offset;
    let (width, height) = background.dimensions();
    for (i, j, pixel) in overlay.enumerate_pixels() {
        let x = i64::from(column) + i64::from(i);
        let y = i64::from(row) + i64::from(j);
        if x < 0 || y < 0 || x >= i64::from(width) || y >= i64::from(height) {
            continue;
        }
        let Bgra([blue, green, red, alpha]) = *pixel;
        let alpha = f32::from(alpha) / 255.0;
        let destination = background.get_pixel_mut(x as u32, y as u32);
        let Bgr([base_blue, base_green, base_red]) = *destination;
        *destination = Bgr([
            blend_channel(blue, base_blue, alpha),
            blend_channel(green, base_green, alpha),
            blend_channel(red, base_red, alpha),
        ]);
    }
}
