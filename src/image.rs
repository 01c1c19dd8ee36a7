use anyhow::{bail, Result};

use crate::my_types::*;

/// Per-pixel colour access consumed by the likelihood model.
///
/// Implementors guarantee `hue`/`saturation` are only called with
/// `x < width()` and `y < height()`.
pub trait ColorFrame {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn hue(&self, x: usize, y: usize) -> f64;

    fn saturation(&self, x: usize, y: usize) -> f64;

    fn shape(&self) -> ImageShape {
        (self.width(), self.height())
    }
}

/// Row-major hue and saturation planes, 8-bit OpenCV convention
/// (hue in 0..180, saturation in 0..=255). Value is not stored.
///
/// Both planes always hold `width * height` bytes.
#[derive(Clone, Debug)]
pub struct HsvImage {
    hue: Vec<u8>,
    saturation: Vec<u8>,
    width: usize,
    height: usize,
}

impl HsvImage {
    /// Create an empty image
    pub fn empty() -> HsvImage {
        HsvImage {
            hue: vec![],
            saturation: vec![],
            width: 0,
            height: 0,
        }
    }

    /// A frame of a single colour
    pub fn filled(width: usize, height: usize, hue: u8, saturation: u8) -> HsvImage {
        HsvImage {
            hue: vec![hue; width * height],
            saturation: vec![saturation; width * height],
            width,
            height,
        }
    }

    pub fn from_planes(
        hue: Vec<u8>,
        saturation: Vec<u8>,
        width: usize,
        height: usize,
    ) -> Result<HsvImage> {
        let n = width * height;
        if hue.len() != n || saturation.len() != n {
            bail!(
                "planes of {} and {} bytes do not match a {width} x {height} frame",
                hue.len(),
                saturation.len()
            );
        }
        Ok(HsvImage {
            hue,
            saturation,
            width,
            height,
        })
    }

    #[inline(always)]
    pub fn set_value(&mut self, x: usize, y: usize, hue: u8, saturation: u8) {
        let i = y * self.width + x;
        self.hue[i] = hue;
        self.saturation[i] = saturation;
    }
}

impl ColorFrame for HsvImage {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    #[inline(always)]
    fn hue(&self, x: usize, y: usize) -> f64 {
        self.hue[y * self.width + x] as f64
    }

    #[inline(always)]
    fn saturation(&self, x: usize, y: usize) -> f64 {
        self.saturation[y * self.width + x] as f64
    }
}

/// Row-major interleaved 8-bit RGB, as decoded from video
#[derive(Clone, Debug)]
pub struct RgbImage {
    pub data: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl RgbImage {
    pub fn empty() -> RgbImage {
        RgbImage {
            data: vec![],
            width: 0,
            height: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_planes_checks_length() {
        assert!(HsvImage::from_planes(vec![0; 6], vec![0; 6], 3, 2).is_ok());
        assert!(HsvImage::from_planes(vec![0; 5], vec![0; 6], 3, 2).is_err());
        assert!(HsvImage::from_planes(vec![0; 6], vec![0; 2], 3, 2).is_err());
    }

    #[test]
    fn test_set_value() {
        let mut image = HsvImage::filled(3, 2, 1, 2);
        image.set_value(2, 1, 70, 200);
        assert_eq!(image.shape(), (3, 2));
        assert_eq!(image.hue(2, 1), 70.);
        assert_eq!(image.saturation(2, 1), 200.);
        assert_eq!(image.hue(1, 1), 1.);
    }
}
