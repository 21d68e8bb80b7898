// SPDX-License-Identifier: GPL-3.0-or-later
use image::{Bgr, Bgra, GrayImage, ImageBuffer, Luma, RgbImage};

/// Images where each point is an absolute temperature in centikelvin, straight from a thermal
/// sensor.
pub(crate) type RawThermalSample = ImageBuffer<Luma<u16>, Vec<u16>>;

/// An 8-bit rendition of a [`RawThermalSample`], stretched to use the full 0-255 range.
pub(crate) type NormalizedImage = GrayImage;

/// A heat-palette rendition of a [`NormalizedImage`].
pub(crate) type FalseColorImage = ImageBuffer<Bgr<u8>, Vec<u8>>;

/// A [`FalseColorImage`] with an opacity channel, ready to be blended onto a visible frame.
pub(crate) type OverlayImage = ImageBuffer<Bgra<u8>, Vec<u8>>;

/// Frames from the visible-light camera. Channels are stored blue first, the way most camera
/// stacks hand them out.
pub(crate) type VisibleImage = ImageBuffer<Bgr<u8>, Vec<u8>>;

/// A fused and annotated frame in RGB order, ready to be encoded.
pub(crate) type FrameImage = RgbImage;
