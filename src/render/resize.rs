// SPDX-License-Identifier: GPL-3.0-or-later
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel};
use serde::Deserialize;

/// Different resizing methods
#[derive(Copy, Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Method {
    /// Nearest neighbor sampling.
    Nearest,

    /// Triangle (aka linear) sampling.
    #[serde(alias = "linear", alias = "bilinear")]
    Triangle,

    /// Catmull-Rom (aka bicubic) sampling.
    #[serde(alias = "bicubic")]
    CatmullRom,

    /// Lanczos sampling with a window size of 3.
    #[serde(alias = "lanczos")]
    Lanczos3,
}

impl Default for Method {
    fn default() -> Self {
        Self::Triangle
    }
}

impl From<Method> for FilterType {
    fn from(method: Method) -> Self {
        match method {
            Method::Nearest => FilterType::Nearest,
            Method::Triangle => FilterType::Triangle,
            Method::CatmullRom => FilterType::CatmullRom,
            Method::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Resize an image to exactly `width` by `height`.
///
/// Images already at the requested size are copied instead of resampled, so that no filter
/// smears them.
pub(crate) fn resize<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    width: u32,
    height: u32,
    method: Method,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    if image.dimensions() == (width, height) {
        image.clone()
    } else {
        imageops::resize(image, width, height, method.into())
    }
}

/// Uniformly scale an image by `factor`, keeping at least one pixel in each dimension of a
/// non-empty image.
pub(crate) fn scale<P>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    factor: f32,
    method: Method,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel + 'static,
    P::Subpixel: 'static,
{
    let scaled = |length: u32| {
        if length == 0 {
            0
        } else {
            ((length as f32 * factor).round() as u32).max(1)
        }
    };
    resize(image, scaled(image.width()), scaled(image.height()), method)
}

#[cfg(test)]
mod test {
    use image::{Bgra, GrayImage, Luma};

    use super::{resize, scale, Method};
    use crate::image_buffer::{OverlayImage, RawThermalSample};

    #[test]
    fn same_size_is_untouched() {
        let mut sample = RawThermalSample::new(3, 2);
        sample.put_pixel(1, 1, Luma([40000]));
        let resized = resize(&sample, 3, 2, Method::Lanczos3);
        assert_eq!(resized, sample);
    }

    #[test]
    fn nearest_enlarges_blocks() {
        let mut image = GrayImage::new(2, 2);
        image.put_pixel(1, 0, Luma([255]));
        let resized = resize(&image, 4, 4, Method::Nearest);
        assert_eq!(resized.dimensions(), (4, 4));
        for (x, y, pixel) in resized.enumerate_pixels() {
            let expected = if x >= 2 && y < 2 { 255 } else { 0 };
            assert_eq!(pixel[0], expected, "pixel ({}, {})", x, y);
        }
    }

    #[test]
    fn scale_keeps_alpha() {
        let overlay = OverlayImage::from_pixel(4, 6, Bgra([10, 20, 30, 77]));
        let scaled = scale(&overlay, 0.5, Method::Nearest);
        assert_eq!(scaled.dimensions(), (2, 3));
        assert!(scaled.pixels().all(|p| *p == Bgra([10, 20, 30, 77])));
    }

    #[test]
    fn scale_never_collapses() {
        let overlay = OverlayImage::new(3, 3);
        assert_eq!(scale(&overlay, 0.01, Method::Nearest).dimensions(), (1, 1));
    }

    #[test]
    fn method_names() {
        #[derive(serde::Deserialize)]
        struct Wrapper {
            method: Method,
        }
        let parse = |name: &str| {
            toml::from_str::<Wrapper>(&format!("method = \"{}\"", name))
                .unwrap()
                .method
        };
        assert_eq!(parse("nearest"), Method::Nearest);
        assert_eq!(parse("bilinear"), Method::Triangle);
        assert_eq!(parse("linear"), Method::Triangle);
        assert_eq!(parse("bicubic"), Method::CatmullRom);
        assert_eq!(parse("catmull_rom"), Method::CatmullRom);
        assert_eq!(parse("lanczos"), Method::Lanczos3);
        assert_eq!(Method::default(), Method::Triangle);
    }
}
