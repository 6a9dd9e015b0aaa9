//! Raster operations on `image` buffers: perspective warp, quad masks and
//! masked blending.

use crate::{Homography, Quad};
use image::imageops::{self, FilterType};
use image::{GrayImage, Luma, Rgb, Rgb32FImage, RgbImage};
use nalgebra::Point2;

#[inline]
fn get_rgb(src: &RgbImage, x: i64, y: i64) -> [f32; 3] {
    if x < 0 || y < 0 || x >= src.width() as i64 || y >= src.height() as i64 {
        return [0.0; 3];
    }
    src.get_pixel(x as u32, y as u32).0.map(f32::from)
}

/// Bilinear sample with pixel centers at integer coordinates and a zero border.
#[inline]
fn sample_bilinear_rgb(src: &RgbImage, x: f32, y: f32) -> Rgb<u8> {
    let x0 = x.floor();
    let y0 = y.floor();
    let fx = x - x0;
    let fy = y - y0;
    let (xi, yi) = (x0 as i64, y0 as i64);

    let p00 = get_rgb(src, xi, yi);
    let p10 = get_rgb(src, xi + 1, yi);
    let p01 = get_rgb(src, xi, yi + 1);
    let p11 = get_rgb(src, xi + 1, yi + 1);

    let mut out = [0u8; 3];
    for c in 0..3 {
        let a = p00[c] + fx * (p10[c] - p00[c]);
        let b = p01[c] + fx * (p11[c] - p01[c]);
        out[c] = (a + fy * (b - a)).round().clamp(0.0, 255.0) as u8;
    }
    Rgb(out)
}

/// Warp `src` into an `out_w x out_h` frame.
///
/// `h_src_from_dst` maps output pixel coordinates into `src`. Pixels that
/// land outside `src` are black.
pub fn warp_perspective_rgb(
    src: &RgbImage,
    h_src_from_dst: &Homography,
    out_w: u32,
    out_h: u32,
) -> RgbImage {
    RgbImage::from_fn(out_w, out_h, |x, y| {
        // sample at pixel center
        let p = h_src_from_dst.apply(Point2::new(x as f32 + 0.5, y as f32 + 0.5));
        sample_bilinear_rgb(src, p.x - 0.5, p.y - 0.5)
    })
}

/// Binary mask of `quad` in a `width x height` frame: 255 inside, 0 outside.
///
/// Equivalent to warping a solid white frame onto `quad`. Returns `None` when
/// the quad is degenerate.
pub fn quad_mask(width: u32, height: u32, quad: &Quad) -> Option<GrayImage> {
    let frame = Quad::frame(width, height);
    let h_frame_from_img = Homography::between(quad, &frame)?;
    let (w, h) = (width as f32, height as f32);

    Some(GrayImage::from_fn(width, height, |x, y| {
        let f = h_frame_from_img.apply(Point2::new(x as f32 + 0.5, y as f32 + 0.5));
        let inside = f.x >= 0.0 && f.y >= 0.0 && f.x < w && f.y < h;
        Luma([if inside { 255 } else { 0 }])
    }))
}

/// `foreground` where `mask` is set, `background` elsewhere.
///
/// All three buffers must share dimensions; `None` otherwise.
pub fn blend_masked(
    background: &RgbImage,
    foreground: &RgbImage,
    mask: &GrayImage,
) -> Option<RgbImage> {
    let dims = background.dimensions();
    if foreground.dimensions() != dims || mask.dimensions() != dims {
        return None;
    }

    let mut out = background.clone();
    for ((dst, fg), m) in out
        .pixels_mut()
        .zip(foreground.pixels())
        .zip(mask.pixels())
    {
        if m.0[0] != 0 {
            *dst = *fg;
        }
    }
    Some(out)
}

/// Cut the region inside `quad` out of `src` and rectify it to `out_w x out_h`.
pub fn rectify_quad(src: &RgbImage, quad: &Quad, out_w: u32, out_h: u32) -> Option<RgbImage> {
    let h_img_from_rect = Homography::between(&Quad::frame(out_w, out_h), quad)?;
    Some(warp_perspective_rgb(src, &h_img_from_rect, out_w, out_h))
}

/// Nearest-neighbour resize.
pub fn resize_nearest(img: &RgbImage, width: u32, height: u32) -> RgbImage {
    if img.dimensions() == (width, height) {
        return img.clone();
    }
    imageops::resize(img, width, height, FilterType::Nearest)
}

/// Widen to `f32` keeping the 0..=255 scale.
pub fn to_float(img: &RgbImage) -> Rgb32FImage {
    Rgb32FImage::from_fn(img.width(), img.height(), |x, y| {
        Rgb(img.get_pixel(x, y).0.map(f32::from))
    })
}
