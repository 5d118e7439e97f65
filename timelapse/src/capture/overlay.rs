use image::{Rgb, RgbImage};
use timelapse_common::utils::{
    font,
    imgutils::{blend_rect, LooseRect},
};

/// Text scale to start from before shrinking it to fit.
const START_SCALE: u32 = 6;
/// Distance from the left and bottom edges to the text.
const MARGIN: i64 = 5;
/// How far the backing box reaches outside of the text.
const PADDING: i64 = 8;
const BOX_ALPHA: f32 = 0.5;

/// Where and how big a timestamp is drawn. Computed once per session from a sample text
/// and reused, so the box doesn't jitter between photos.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimestampLayout {
    pub scale: u32,
    /// Top left corner of the text
    pub text_x: i64,
    pub text_y: i64,
    pub backing: LooseRect,
}

impl TimestampLayout {
    pub fn compute(frame_width: u32, frame_height: u32, sample: &str) -> Self {
        let max_height = frame_height / 10;
        let mut scale = START_SCALE;
        while scale > 1 && font::text_size(sample, scale).1 > max_height {
            scale -= 1;
        }
        let (text_w, text_h) = font::text_size(sample, scale);
        log::debug!(
            "Timestamp scale {scale} gives {text_w}x{text_h} on a \
             {frame_width}x{frame_height} frame"
        );

        let baseline = i64::from(frame_height) - MARGIN;
        let text_y = baseline - i64::from(text_h);
        Self {
            scale,
            text_x: MARGIN,
            text_y,
            backing: LooseRect {
                x: MARGIN - PADDING,
                y: text_y - PADDING,
                width: text_w + 2 * PADDING as u32,
                height: text_h + 2 * PADDING as u32,
            },
        }
    }

    /// Darkens the area behind the text, then writes the text in white.
    pub fn stamp(&self, mut frame: RgbImage, text: &str) -> RgbImage {
        blend_rect(&mut frame, self.backing, Rgb([0, 0, 0]), BOX_ALPHA);
        font::draw_text(
            &mut frame,
            text,
            self.text_x,
            self.text_y,
            self.scale,
            Rgb([255, 255, 255]),
        );
        frame
    }
}
