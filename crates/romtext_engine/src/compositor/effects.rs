use image::{imageops, Rgba, RgbaImage};

use crate::Color;

/// Draws `src` onto `dst` with its top left corner at `(x, y)` using
/// source-over alpha compositing. Parts outside `dst` are clipped.
pub fn blend(dst: &mut RgbaImage, src: &RgbaImage, x: i64, y: i64) {
    let (dw, dh) = (dst.width() as i64, dst.height() as i64);
    for (sx, sy, pixel) in src.enumerate_pixels() {
        if pixel[3] == 0 {
            continue;
        }
        let (tx, ty) = (x + sx as i64, y + sy as i64);
        if tx < 0 || ty < 0 || tx >= dw || ty >= dh {
            continue;
        }
        let target = dst.get_pixel_mut(tx as u32, ty as u32);
        *target = over(*pixel, *target);
    }
}

fn over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    if src[3] == 255 {
        return src;
    }
    let sa = src[3] as f32 / 255.0;
    let da = dst[3] as f32 / 255.0;
    let out_a = sa + da * (1.0 - sa);
    if out_a <= 0.0 {
        return Rgba([0, 0, 0, 0]);
    }
    let channel = |i: usize| ((src[i] as f32 * sa + dst[i] as f32 * da * (1.0 - sa)) / out_a).round().clamp(0.0, 255.0) as u8;
    Rgba([channel(0), channel(1), channel(2), (out_a * 255.0).round() as u8])
}

/// Multiplies the RGB of every visible pixel by `color / 255`. Alpha is kept.
pub fn multiply(image: &mut RgbaImage, color: Color) {
    let tint = [color.r as u32, color.g as u32, color.b as u32];
    for pixel in image.pixels_mut() {
        if pixel[3] == 0 {
            continue;
        }
        for (channel, t) in pixel.0.iter_mut().take(3).zip(tint) {
            *channel = ((*channel as u32 * t + 127) / 255) as u8;
        }
    }
}

/// The alpha mask of `image` filled with `color`.
pub fn silhouette(image: &RgbaImage, color: Color) -> RgbaImage {
    RgbaImage::from_fn(image.width(), image.height(), |x, y| color.with_alpha(image.get_pixel(x, y)[3]))
}

/// Blurs a silhouette with a gaussian of `sigma`, growing it by the returned
/// padding on every side so the falloff is not cut off.
pub fn blur_silhouette(silhouette: &RgbaImage, color: Color, sigma: f32) -> (RgbaImage, u32) {
    if sigma <= 0.0 {
        return (silhouette.clone(), 0);
    }
    let pad = (sigma * 3.0).ceil() as u32;
    // transparent pixels carry the shadow color too, so edges don't darken
    let mut padded = RgbaImage::from_pixel(silhouette.width() + pad * 2, silhouette.height() + pad * 2, color.with_alpha(0));
    imageops::replace(&mut padded, silhouette, pad as i64, pad as i64);
    (imageops::blur(&padded, sigma), pad)
}

/// The eight neighbour offsets of distance `width`: cardinals and diagonals.
pub fn outline_offsets(width: i64) -> [(i64, i64); 8] {
    [
        (-width, -width),
        (0, -width),
        (width, -width),
        (-width, 0),
        (width, 0),
        (-width, width),
        (0, width),
        (width, width),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_opaque_replaces() {
        let mut dst = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 255]));
        let src = RgbaImage::from_pixel(1, 1, Rgba([200, 100, 0, 255]));
        blend(&mut dst, &src, 1, 1);
        assert_eq!(dst.get_pixel(1, 1), &Rgba([200, 100, 0, 255]));
        assert_eq!(dst.get_pixel(0, 0), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_blend_half_alpha_over_opaque() {
        let mut dst = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let src = RgbaImage::from_pixel(1, 1, Rgba([255, 255, 255, 51]));
        blend(&mut dst, &src, 0, 0);
        assert_eq!(dst.get_pixel(0, 0), &Rgba([51, 51, 51, 255]));
    }

    #[test]
    fn test_blend_clips() {
        let mut dst = RgbaImage::new(2, 2);
        let src = RgbaImage::from_pixel(3, 3, Rgba([1, 1, 1, 255]));
        blend(&mut dst, &src, -2, 1);
        assert_eq!(dst.get_pixel(0, 1), &Rgba([1, 1, 1, 255]));
        assert_eq!(dst.get_pixel(1, 1)[3], 0);
        assert_eq!(dst.get_pixel(0, 0)[3], 0);
    }

    #[test]
    fn test_multiply() {
        let mut image = RgbaImage::from_fn(2, 1, |x, _| if x == 0 { Rgba([255, 128, 10, 200]) } else { Rgba([255, 255, 255, 0]) });
        multiply(&mut image, Color::new(255, 0, 128));
        assert_eq!(image.get_pixel(0, 0), &Rgba([255, 0, 5, 200]));
        // invisible pixels are left alone
        assert_eq!(image.get_pixel(1, 0), &Rgba([255, 255, 255, 0]));
    }

    #[test]
    fn test_silhouette_keeps_alpha() {
        let image = RgbaImage::from_fn(2, 1, |x, _| Rgba([9, 9, 9, if x == 0 { 77 } else { 0 }]));
        let s = silhouette(&image, Color::new(1, 2, 3));
        assert_eq!(s.get_pixel(0, 0), &Rgba([1, 2, 3, 77]));
        assert_eq!(s.get_pixel(1, 0), &Rgba([1, 2, 3, 0]));
    }

    #[test]
    fn test_blur_spreads_alpha() {
        let s = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 255]));
        let (blurred, pad) = blur_silhouette(&s, Color::BLACK, 1.0);
        assert_eq!(pad, 3);
        assert_eq!(blurred.dimensions(), (7, 7));
        let center = blurred.get_pixel(3, 3)[3];
        let near = blurred.get_pixel(4, 3)[3];
        assert!(center > near && near > 0);
    }

    #[test]
    fn test_outline_offsets_cover_all_neighbours() {
        let offsets = outline_offsets(2);
        assert_eq!(offsets.len(), 8);
        assert!(!offsets.contains(&(0, 0)));
        assert!(offsets.contains(&(2, -2)));
    }
}
