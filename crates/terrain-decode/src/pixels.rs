//! PNG pixel extraction.

use image::{DynamicImage, GenericImageView, ImageFormat};

use crate::ChunkKind;
use crate::error::{DecodeError, DecodeResult};

/// Decoded image as a flat little-endian pixel buffer.
///
/// Multi-byte samples are stored little-endian regardless of host order, so
/// a 16-bit grayscale image has `bytes_per_pixel == 2` and each pixel reads
/// back with `u16::from_le_bytes`.
#[derive(Debug, Clone)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub bytes_per_pixel: usize,
    pub data: Vec<u8>,
}

impl PixelBuffer {
    #[must_use]
    pub fn pixel_count(&self) -> usize {
        self.data.len() / self.bytes_per_pixel.max(1)
    }
}

/// Decode PNG bytes into a [`PixelBuffer`], keeping the stored pixel format.
///
/// 8-bit colour images come back blue first (BGR / BGRA), the order the
/// game's own tooling reads them in. 16-bit and float colour images keep
/// RGB order.
pub fn decode_png(bytes: &[u8]) -> DecodeResult<PixelBuffer> {
    let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?;
    let (width, height) = image.dimensions();
    let bytes_per_pixel = usize::from(image.color().bytes_per_pixel());

    let data = match image {
        DynamicImage::ImageLuma8(buf) => buf.into_raw(),
        DynamicImage::ImageLumaA8(buf) => buf.into_raw(),
        DynamicImage::ImageRgb8(buf) => swap_red_blue(buf.into_raw(), 3),
        DynamicImage::ImageRgba8(buf) => swap_red_blue(buf.into_raw(), 4),
        DynamicImage::ImageLuma16(buf) => le_bytes(buf.as_raw(), |v| v.to_le_bytes()),
        DynamicImage::ImageLumaA16(buf) => le_bytes(buf.as_raw(), |v| v.to_le_bytes()),
        DynamicImage::ImageRgb16(buf) => le_bytes(buf.as_raw(), |v| v.to_le_bytes()),
        DynamicImage::ImageRgba16(buf) => le_bytes(buf.as_raw(), |v| v.to_le_bytes()),
        DynamicImage::ImageRgb32F(buf) => le_bytes(buf.as_raw(), |v| v.to_le_bytes()),
        DynamicImage::ImageRgba32F(buf) => le_bytes(buf.as_raw(), |v| v.to_le_bytes()),
        other => {
            let rgba = other.to_rgba8();
            return Ok(PixelBuffer {
                width,
                height,
                bytes_per_pixel: 4,
                data: swap_red_blue(rgba.into_raw(), 4),
            });
        }
    };

    Ok(PixelBuffer {
        width,
        height,
        bytes_per_pixel,
        data,
    })
}

fn swap_red_blue(mut data: Vec<u8>, bytes_per_pixel: usize) -> Vec<u8> {
    for pixel in data.chunks_exact_mut(bytes_per_pixel) {
        pixel.swap(0, 2);
    }
    data
}

fn le_bytes<T: Copy, const N: usize>(samples: &[T], to_le: impl Fn(T) -> [u8; N]) -> Vec<u8> {
    samples.iter().flat_map(|&v| to_le(v)).collect()
}

/// Convert pixels with the width-dependent rule shared by the material-index
/// and weight chunks: 4-byte pixels are raw `f32`, 2-byte pixels are `u16`
/// values, anything else is read as one byte per pixel divided by 255.
#[must_use]
pub fn pixels_to_floats(pixels: &PixelBuffer) -> Vec<f32> {
    let count = pixels.pixel_count();
    match pixels.bytes_per_pixel {
        4 => pixels
            .data
            .chunks_exact(4)
            .map(|p| f32::from_le_bytes([p[0], p[1], p[2], p[3]]))
            .collect(),
        2 => pixels
            .data
            .chunks_exact(2)
            .map(|p| f32::from(u16::from_le_bytes([p[0], p[1]])))
            .collect(),
        // Wider or odd layouts are consumed one byte per pixel from the
        // start of the buffer.
        _ => pixels.data[..count]
            .iter()
            .map(|&b| f32::from(b) / 255.0)
            .collect(),
    }
}

/// Decode a PNG and require a specific pixel width.
pub(crate) fn decode_png_with_width(
    bytes: &[u8],
    kind: ChunkKind,
    bytes_per_pixel: usize,
) -> DecodeResult<PixelBuffer> {
    let pixels = decode_png(bytes)?;
    if pixels.bytes_per_pixel != bytes_per_pixel {
        return Err(DecodeError::PixelLayout {
            kind,
            bytes_per_pixel: pixels.bytes_per_pixel,
        });
    }
    Ok(pixels)
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gray16_is_little_endian() {
        let png = test_png::gray16(2, 1, &[0x1234, 0xFFFF]);
        let pixels = decode_png(&png).unwrap();
        assert_eq!((pixels.width, pixels.height), (2, 1));
        assert_eq!(pixels.bytes_per_pixel, 2);
        assert_eq!(pixels.data, vec![0x34, 0x12, 0xFF, 0xFF]);
    }

    #[test]
    fn float_rule_by_pixel_width() {
        let gray8 = decode_png(&test_png::gray8(2, 1, &[255, 51])).unwrap();
        assert_eq!(pixels_to_floats(&gray8), vec![1.0, 0.2]);

        let gray16 = decode_png(&test_png::gray16(1, 1, &[300])).unwrap();
        assert_eq!(pixels_to_floats(&gray16), vec![300.0]);

        // The float's bytes come out blue first, so store them red-blue swapped.
        let [b0, b1, b2, b3] = 1.5f32.to_le_bytes();
        let rgba = decode_png(&test_png::rgba8(1, 1, &[b2, b1, b0, b3])).unwrap();
        assert_eq!(pixels_to_floats(&rgba), vec![1.5]);

        let bits = 1.5f32.to_le_bytes();
        let stored_in_order = decode_png(&test_png::rgba8(1, 1, &bits)).unwrap();
        assert_ne!(pixels_to_floats(&stored_in_order), vec![1.5]);
    }

    #[test]
    fn rgba8_comes_back_blue_first() {
        let png = test_png::rgba8(2, 1, &[10, 20, 30, 40, 1, 2, 3, 4]);
        let pixels = decode_png(&png).unwrap();
        assert_eq!(pixels.bytes_per_pixel, 4);
        assert_eq!(pixels.data, vec![30, 20, 10, 40, 3, 2, 1, 4]);
    }

    #[test]
    fn rgb8_comes_back_blue_first() {
        let png = test_png::rgb8(2, 1, &[10, 20, 30, 1, 2, 3]);
        let pixels = decode_png(&png).unwrap();
        assert_eq!(pixels.bytes_per_pixel, 3);
        assert_eq!(pixels.data, vec![30, 20, 10, 3, 2, 1]);
    }

    #[test]
    fn rgb16_keeps_channel_order() {
        let png = test_png::rgb16(1, 1, &[0x0102, 0x0304, 0x0506]);
        let pixels = decode_png(&png).unwrap();
        assert_eq!(pixels.bytes_per_pixel, 6);
        assert_eq!(pixels.data, vec![0x02, 0x01, 0x04, 0x03, 0x06, 0x05]);
    }

    #[test]
    fn garbage_is_an_image_error() {
        assert!(matches!(
            decode_png(b"not a png"),
            Err(DecodeError::ImageDecode(_))
        ));
    }

    #[test]
    fn width_requirement_is_checked() {
        let png = test_png::gray8(1, 1, &[0]);
        let err = decode_png_with_width(&png, ChunkKind::Height, 2).unwrap_err();
        assert!(matches!(
            err,
            DecodeError::PixelLayout {
                kind: ChunkKind::Height,
                bytes_per_pixel: 1
            }
        ));
    }
}
