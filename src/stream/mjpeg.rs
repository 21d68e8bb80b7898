// SPDX-License-Identifier: GPL-3.0-or-later
use bytes::{BufMut, Bytes, BytesMut};

/// The multipart boundary. It is also written verbatim at the start of every part.
pub(crate) const BOUNDARY: &str = "--jpgboundary";

pub(crate) fn content_type() -> String {
    format!("multipart/x-mixed-replace; boundary={}", BOUNDARY)
}

/// Wrap an encoded JPEG image as one part of the multipart stream.
pub(crate) fn frame_part(jpeg: &[u8]) -> Bytes {
    let header = format!(
        "{}\r\nContent-type: image/jpeg\r\nContent-length: {}\r\n\r\n",
        BOUNDARY,
        jpeg.len()
    );
    let mut part = BytesMut::with_capacity(header.len() + jpeg.len() + 2);
    part.put_slice(header.as_bytes());
    part.put_slice(jpeg);
    part.put_slice(b"\r\n");
    part.freeze()
}
