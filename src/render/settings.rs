// SPDX-License-Identifier: GPL-3.0-or-later
use serde::{Deserialize, Deserializer};

use std::num::NonZeroU32;

use super::composite::Placement;
use super::resize::Method;

/// Display dimensions can't be zero, every sample would be empty after resizing.
fn deserialize_dimension<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    NonZeroU32::deserialize(deserializer).map(NonZeroU32::get)
}

fn default_width() -> u32 {
    800
}

fn default_height() -> u32 {
    480
}

fn default_overlay_alpha() -> u8 {
    128
}

fn default_scale() -> f32 {
    1.0
}

fn default_hud_color() -> [u8; 3] {
    [0, 255, 0]
}

fn default_text_scale() -> u32 {
    2
}

fn default_crosshair_half_length() -> u32 {
    40
}

fn default_line_thickness() -> u32 {
    2
}

fn default_jpeg_quality() -> u8 {
    75
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct RenderSettings {
    /// The width thermal samples are resized to before rendering.
    #[serde(default = "default_width", deserialize_with = "deserialize_dimension")]
    pub(crate) width: u32,

    /// The height thermal samples are resized to before rendering.
    #[serde(default = "default_height", deserialize_with = "deserialize_dimension")]
    pub(crate) height: u32,

    /// Opacity of the thermal overlay, 0 being fully transparent.
    #[serde(default = "default_overlay_alpha")]
    pub(crate) overlay_alpha: u8,

    /// Where the top left of the overlay lands on the visible frame, as `[column, row]`.
    #[serde(default)]
    pub(crate) offset: [i32; 2],

    #[serde(default = "default_scale")]
    pub(crate) scale: f32,

    #[serde(default)]
    pub(crate) resize_method: Method,

    /// Color of the text and crosshair, as `[blue, green, red]`.
    #[serde(default = "default_hud_color")]
    pub(crate) hud_color: [u8; 3],

    #[serde(default = "default_text_scale")]
    pub(crate) text_scale: u32,

    #[serde(default = "default_crosshair_half_length")]
    pub(crate) crosshair_half_length: u32,

    #[serde(default = "default_line_thickness")]
    pub(crate) line_thickness: u32,

    #[serde(default = "default_jpeg_quality")]
    pub(crate) jpeg_quality: u8,
}

impl RenderSettings {
    pub(crate) fn display_size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub(crate) fn placement(&self) -> Placement {
        let [column, row] = self.offset;
        Placement {
            offset: (column, row),
            scale: self.scale,
            method: self.resize_method,
        }
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            overlay_alpha: default_overlay_alpha(),
            offset: [0, 0],
            scale: default_scale(),
            resize_method: Method::default(),
            hud_color: default_hud_color(),
            text_scale: default_text_scale(),
            crosshair_half_length: default_crosshair_half_length(),
            line_thickness: default_line_thickness(),
            jpeg_quality: default_jpeg_quality(),
        }
    }
}
