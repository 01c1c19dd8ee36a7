use crate::image::HsvImage;
use crate::my_types::*;

/// A disk of the target colour moving at constant velocity over a uniform
/// background, bouncing off the frame borders.
#[derive(Clone, Debug)]
pub struct SyntheticSequence {
    pub shape: ImageShape,
    pub radius: f64,
    pub center: Vector2d,
    pub velocity: Vector2d,
    /// (hue, saturation)
    pub target_color: (u8, u8),
    pub background_color: (u8, u8),
    pub frame_count: usize,
    frame_index: usize,
}

pub struct SyntheticFrame {
    pub image: HsvImage,
    /// Ground truth disk centre
    pub center: Vector2d,
}

impl SyntheticSequence {
    pub fn new(
        shape: ImageShape,
        radius: f64,
        center: Vector2d,
        velocity: Vector2d,
        frame_count: usize,
    ) -> Self {
        Self {
            shape,
            radius,
            center,
            velocity,
            target_color: (70, 200),
            background_color: (20, 40),
            frame_count,
            frame_index: 0,
        }
    }

    fn render(&self) -> HsvImage {
        let (width, height) = self.shape;
        let (bh, bs) = self.background_color;
        let (th, ts) = self.target_color;
        let mut image = HsvImage::filled(width, height, bh, bs);
        let r2 = self.radius.powi(2);
        let x0 = (self.center.x - self.radius).floor().max(0.) as usize;
        let y0 = (self.center.y - self.radius).floor().max(0.) as usize;
        let x1 = ((self.center.x + self.radius).ceil() as usize).min(width.saturating_sub(1));
        let y1 = ((self.center.y + self.radius).ceil() as usize).min(height.saturating_sub(1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                let d = Vector2d::new(x as f64, y as f64) - self.center;
                if d.norm_squared() <= r2 {
                    image.set_value(x, y, th, ts);
                }
            }
        }
        image
    }

    fn advance(&mut self) {
        self.center += self.velocity;
        let max = [self.shape.0 as f64 - 1., self.shape.1 as f64 - 1.];
        for i in 0..2 {
            if self.center[i] < 0. {
                self.center[i] = -self.center[i];
                self.velocity[i] = -self.velocity[i];
            } else if self.center[i] > max[i] {
                self.center[i] = 2. * max[i] - self.center[i];
                self.velocity[i] = -self.velocity[i];
            }
        }
    }
}

impl Iterator for SyntheticSequence {
    type Item = SyntheticFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame_index >= self.frame_count {
            return None;
        }
        if self.frame_index > 0 {
            self.advance();
        }
        self.frame_index += 1;
        Some(SyntheticFrame {
            image: self.render(),
            center: self.center,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ColorFrame;

    #[test]
    fn test_disk_is_drawn_at_center() {
        let mut seq = SyntheticSequence::new((40, 30), 3., Vector2d::new(10., 12.), Vector2d::new(2., 0.), 2);
        let frame = seq.next().unwrap();
        assert_eq!(frame.image.hue(10, 12), 70.);
        assert_eq!(frame.image.saturation(13, 12), 200.);
        assert_eq!(frame.image.hue(14, 12), 20.);

        let frame = seq.next().unwrap();
        assert_eq!(frame.center, Vector2d::new(12., 12.));
        assert_eq!(frame.image.hue(15, 12), 70.);
        assert!(seq.next().is_none());
    }

    #[test]
    fn test_bounces_off_border() {
        let mut seq = SyntheticSequence::new((20, 20), 2., Vector2d::new(17., 5.), Vector2d::new(4., -3.), 3);
        seq.next();
        let frame = seq.next().unwrap();
        // x: 21 reflects to 17, y: 2
        assert_eq!(frame.center, Vector2d::new(17., 2.));
        assert_eq!(seq.velocity, Vector2d::new(-4., -3.));
        let frame = seq.next().unwrap();
        assert_eq!(frame.center, Vector2d::new(13., 1.));
        assert_eq!(seq.velocity, Vector2d::new(-4., 3.));
    }

    #[test]
    fn test_disk_clipped_at_corner() {
        let mut seq = SyntheticSequence::new((10, 10), 4., Vector2d::new(0., 0.), Vector2d::zeros(), 1);
        let frame = seq.next().unwrap();
        assert_eq!(frame.image.hue(0, 0), 70.);
        assert_eq!(frame.image.hue(9, 9), 20.);
    }
}
