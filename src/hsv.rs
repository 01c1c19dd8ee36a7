use anyhow::{bail, Result};
use cv2::prelude::*;
use opencv as cv2;

use crate::image::{HsvImage, RgbImage};

/// Borrow the RGB buffer as a 3-channel OpenCV matrix without copying.
fn rgb_to_cv_8uc3(img: &RgbImage) -> Result<cv2::core::Mat> {
    if img.data.len() != 3 * img.width * img.height {
        bail!(
            "RGB buffer holds {} bytes, expected {} for {} x {}",
            img.data.len(),
            3 * img.width * img.height,
            img.width,
            img.height
        );
    }
    // The matrix only lives inside `HsvImage::from_rgb`, which holds the borrow of `img`.
    let mat = unsafe {
        cv2::core::Mat::new_rows_cols_with_data(
            img.height as i32,
            img.width as i32,
            cv2::core::CV_8UC3,
            img.data.as_ptr() as *mut std::ffi::c_void,
            cv2::core::Mat_AUTO_STEP,
        )?
    };
    Ok(mat)
}

impl HsvImage {
    /// Hue and saturation planes of an RGB frame, 8-bit OpenCV convention.
    pub fn from_rgb(rgb: &RgbImage) -> Result<HsvImage> {
        if rgb.width == 0 || rgb.height == 0 {
            return Ok(HsvImage::empty());
        }
        let rgb_mat = rgb_to_cv_8uc3(rgb)?;
        let mut hsv_mat = cv2::core::Mat::default();
        cv2::imgproc::cvt_color(&rgb_mat, &mut hsv_mat, cv2::imgproc::COLOR_RGB2HSV, 0)?;

        let mut planes = cv2::core::Vector::<cv2::core::Mat>::new();
        cv2::core::split(&hsv_mat, &mut planes)?;
        let hue = planes.get(0)?.data_bytes()?.to_vec();
        let saturation = planes.get(1)?.data_bytes()?.to_vec();
        HsvImage::from_planes(hue, saturation, rgb.width, rgb.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ColorFrame;

    fn single_row(pixels: &[[u8; 3]]) -> RgbImage {
        RgbImage {
            data: pixels.iter().flatten().copied().collect(),
            width: pixels.len(),
            height: 1,
        }
    }

    #[test]
    fn test_primary_colors() {
        let hsv = HsvImage::from_rgb(&single_row(&[[255, 0, 0], [0, 255, 0], [0, 0, 255]])).unwrap();
        assert_eq!(hsv.shape(), (3, 1));
        assert_eq!(hsv.hue(0, 0), 0.);
        assert_eq!(hsv.hue(1, 0), 60.);
        assert_eq!(hsv.hue(2, 0), 120.);
        for x in 0..3 {
            assert_eq!(hsv.saturation(x, 0), 255.);
        }
    }

    #[test]
    fn test_gray_has_no_saturation() {
        let hsv = HsvImage::from_rgb(&single_row(&[[0, 0, 0], [128, 128, 128]])).unwrap();
        assert_eq!(hsv.saturation(0, 0), 0.);
        assert_eq!(hsv.saturation(1, 0), 0.);
        assert_eq!(hsv.hue(1, 0), 0.);
    }

    #[test]
    fn test_rejects_short_buffer() {
        let rgb = RgbImage {
            data: vec![0; 5],
            width: 2,
            height: 1,
        };
        assert!(HsvImage::from_rgb(&rgb).is_err());
    }

    #[test]
    fn test_empty_frame() {
        let hsv = HsvImage::from_rgb(&RgbImage::empty()).unwrap();
        assert_eq!(hsv.shape(), (0, 0));
    }
}
