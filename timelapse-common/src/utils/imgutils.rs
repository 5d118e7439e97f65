use image::math::Rect;
use image::{ImageBuffer, Rgb, RgbImage};

/// Like [`Rect`], but allowed to stick out of the image on any side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LooseRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl LooseRect {
    /// The part of this rectangle that is inside of an image of the given size.
    pub fn clip(self, img_width: u32, img_height: u32) -> Option<Rect> {
        let left = self.x.max(0);
        let top = self.y.max(0);
        let right = (self.x + i64::from(self.width)).min(i64::from(img_width));
        let bottom = (self.y + i64::from(self.height)).min(i64::from(img_height));

        if left >= right || top >= bottom {
            return None;
        }

        Some(Rect {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        })
    }
}

/// Blends `color` over the pixels covered by `rect`. An `alpha` of 1 paints the color
/// opaquely, 0 leaves the image untouched.
pub fn blend_rect(img: &mut RgbImage, rect: LooseRect, color: Rgb<u8>, alpha: f32) {
    let alpha = alpha.clamp(0.0, 1.0);
    let Some(Rect {
        x,
        y,
        width,
        height,
    }) = rect.clip(img.width(), img.height())
    else {
        return;
    };

    for py in y..y + height {
        for px in x..x + width {
            let pixel = img.get_pixel_mut(px, py);
            for (channel, &over) in pixel.0.iter_mut().zip(color.0.iter()) {
                let mixed = alpha * f32::from(over) + (1.0 - alpha) * f32::from(*channel);
                *channel = mixed.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

pub fn filled(width: u32, height: u32, red: u8, green: u8, blue: u8) -> RgbImage {
    let mut buf = ImageBuffer::new(width, height);
    buf.enumerate_pixels_mut()
        .for_each(|(_, _, pixel)| *pixel = image::Rgb([red, green, blue]));
    buf
}
