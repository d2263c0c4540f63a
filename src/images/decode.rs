/// Image decoding and the hover magnifier
use image::{imageops, RgbaImage};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{GreditError, Result};

/// An image decoded to 8-bit RGBA
#[derive(Clone)]
pub struct DecodedImage {
    pub path: PathBuf,
    pub pixels: RgbaImage,
}

impl fmt::Debug for DecodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedImage")
            .field("path", &self.path)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

impl DecodedImage {
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Copy out the part of the image covered by `uv`.
    /// Returns None when the region is empty.
    pub fn crop_uv(&self, uv: UvRect) -> Option<RgbaImage> {
        let (width, height) = (self.width() as f32, self.height() as f32);

        let x0 = (uv.min.0 * width).floor().clamp(0.0, width) as u32;
        let y0 = (uv.min.1 * height).floor().clamp(0.0, height) as u32;
        let x1 = (uv.max.0 * width).ceil().clamp(0.0, width) as u32;
        let y1 = (uv.max.1 * height).ceil().clamp(0.0, height) as u32;

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(imageops::crop_imm(&self.pixels, x0, y0, x1 - x0, y1 - y0).to_image())
    }
}

/// Read and decode an image file
pub fn decode(path: &Path) -> Result<DecodedImage> {
    let bytes = std::fs::read(path).map_err(|e| GreditError::io(path, e))?;

    let pixels = image::load_from_memory(&bytes)
        .map_err(|source| GreditError::Image {
            path: path.to_path_buf(),
            source,
        })?
        .to_rgba8();

    log::debug!(
        "🖼️  Decoded {} ({}x{})",
        path.display(),
        pixels.width(),
        pixels.height()
    );

    Ok(DecodedImage {
        path: path.to_path_buf(),
        pixels,
    })
}

/// Decode on the blocking pool so the UI keeps drawing
pub async fn decode_async(path: PathBuf) -> std::result::Result<DecodedImage, String> {
    tokio::task::spawn_blocking(move || decode(&path).map_err(|e| e.to_string()))
        .await
        .map_err(|e| format!("Task join error: {}", e))?
}

/// A rectangle in texture coordinates (0.0..=1.0 on both axes)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvRect {
    pub min: (f32, f32),
    pub max: (f32, f32),
}

/// The `region`-sized square centred on `cursor`, kept inside a
/// `display`-sized area and expressed as UV coordinates of that area.
///
/// `cursor` is relative to the top-left corner of the displayed image.
pub fn magnifier_region(cursor: (f32, f32), display: (f32, f32), region: f32) -> UvRect {
    let (display_width, display_height) = display;

    let x = (cursor.0 - region * 0.5).clamp(0.0, (display_width - region).max(0.0));
    let y = (cursor.1 - region * 0.5).clamp(0.0, (display_height - region).max(0.0));

    UvRect {
        min: (x / display_width, y / display_height),
        max: (
            ((x + region) / display_width).min(1.0),
            ((y + region) / display_height).min(1.0),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn checkerboard(width: u32, height: u32) -> DecodedImage {
        let pixels = RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                Rgba([255, 255, 255, 255])
            } else {
                Rgba([0, 0, 0, 255])
            }
        });
        DecodedImage {
            path: PathBuf::from("board.png"),
            pixels,
        }
    }

    #[test]
    fn region_centres_on_cursor() {
        let uv = magnifier_region((360.0, 240.0), (720.0, 480.0), 32.0);
        assert_eq!(uv.min, (344.0 / 720.0, 224.0 / 480.0));
        assert_eq!(uv.max, (376.0 / 720.0, 256.0 / 480.0));
    }

    #[test]
    fn region_is_clamped_to_display() {
        let top_left = magnifier_region((2.0, 3.0), (720.0, 480.0), 32.0);
        assert_eq!(top_left.min, (0.0, 0.0));

        let bottom_right = magnifier_region((719.0, 479.0), (720.0, 480.0), 32.0);
        assert_eq!(bottom_right.min, (688.0 / 720.0, 448.0 / 480.0));
        assert_eq!(bottom_right.max, (1.0, 1.0));
    }

    #[test]
    fn crop_maps_uv_onto_pixels() {
        let image = checkerboard(100, 40);
        let crop = image
            .crop_uv(UvRect {
                min: (0.25, 0.25),
                max: (0.5, 0.75),
            })
            .unwrap();
        assert_eq!(crop.dimensions(), (25, 20));
        // (25, 10) is a black square on the board
        assert_eq!(crop.get_pixel(0, 0), &Rgba([0, 0, 0, 255]));
        assert_eq!(crop.get_pixel(1, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn empty_crop_is_none() {
        let image = checkerboard(10, 10);
        assert!(image
            .crop_uv(UvRect {
                min: (0.5, 0.5),
                max: (0.5, 0.9),
            })
            .is_none());
    }

    #[test]
    fn decode_png_from_disk() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("board.png");
        checkerboard(4, 3).pixels.save(&path).expect("failed to save png");

        let decoded = decode(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
        assert_eq!(decoded.path, path);
    }

    #[test]
    fn garbage_file_is_an_image_error() {
        let dir = tempdir().expect("failed to create temp dir");
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not an image").unwrap();

        assert!(matches!(decode(&path), Err(GreditError::Image { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempdir().expect("failed to create temp dir");
        assert!(matches!(
            decode(&dir.path().join("absent.png")),
            Err(GreditError::Io { .. })
        ));
    }
}
