// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::Bytes;
#[cfg(not(feature = "mozjpeg"))]
use bytes::{BufMut, BytesMut};
#[cfg(not(feature = "mozjpeg"))]
use image::codecs::jpeg::JpegEncoder as ImageJpegEncoder;
use tracing::trace;

#[cfg(feature = "mozjpeg")]
use anyhow::anyhow;
#[cfg(feature = "mozjpeg")]
use mozjpeg::{ColorSpace, Compress};

use crate::image_buffer::FrameImage;

#[cfg(feature = "mozjpeg")]
fn encode_jpeg_mozjpeg(image: &FrameImage, quality: u8) -> anyhow::Result<Bytes> {
    trace!("using mozjpeg to encode JPEG image");
    // A fresh encoder each time, so this can be called from any blocking task.
    let mut jpeg_encoder = Compress::new(ColorSpace::JCS_RGB);
    jpeg_encoder.set_fastest_defaults();
    jpeg_encoder.set_quality(f32::from(quality));
    jpeg_encoder.set_mem_dest();
    jpeg_encoder.set_size(image.width() as usize, image.height() as usize);
    jpeg_encoder.start_compress();
    if !jpeg_encoder.write_scanlines(image.as_raw()) {
        return Err(anyhow!("mozjpeg was unable to write every scanline"));
    }
    jpeg_encoder.finish_compress();
    let data = jpeg_encoder
        .data_to_vec()
        .map_err(|_| anyhow!("mozjpeg did not produce any output"))?;
    Ok(Bytes::from(data))
}

#[cfg(not(feature = "mozjpeg"))]
fn encode_jpeg_image(image: &FrameImage, quality: u8) -> anyhow::Result<Bytes> {
    trace!("using image crate to encode JPEG image");
    let mut jpeg_buf = BytesMut::new().writer();
    let mut encoder = ImageJpegEncoder::new_with_quality(&mut jpeg_buf, quality);
    encoder.encode_image(image)?;
    Ok(jpeg_buf.into_inner().freeze())
}

/// Encode a frame as a JPEG image at the given quality (1-100).
#[cfg(not(feature = "mozjpeg"))]
pub(crate) fn encode_jpeg(image: &FrameImage, quality: u8) -> anyhow::Result<Bytes> {
    encode_jpeg_image(image, quality)
}

/// Encode a frame as a JPEG image at the given quality (1-100).
#[cfg(feature = "mozjpeg")]
pub(crate) fn encode_jpeg(image: &FrameImage, quality: u8) -> anyhow::Result<Bytes> {
    encode_jpeg_mozjpeg(image, quality)
}

#[cfg(test)]
mod test {
    use image::{GenericImageView, Rgb};

    use super::encode_jpeg;
    use crate::image_buffer::FrameImage;

    #[test]
    fn decodes_back() {
        let frame = FrameImage::from_pixel(40, 30, Rgb([200, 40, 10]));
        let jpeg = encode_jpeg(&frame, 75).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.dimensions(), (40, 30));
    }
}
