use imgref::{ImgRef, ImgVec};
use rayon::prelude::*;
use rgb::RGB8;

use crate::Error;
use crate::kernel::{TAPS, bicubic_weight};

/// Resize `src` to `dst_height` x `dst_width` with 3x3 bicubic convolution.
///
/// Destination pixel `(dy, dx)` maps to source row `dy * (src_h / dst_h)` and
/// source column `dx * (src_w / dst_w)`. Out-of-bounds taps are skipped rather
/// than clamped, and weights are not renormalized, so borders darken and
/// off-grid positions can overshoot. Each channel sum is clipped to `[0, 255]`
/// and truncated.
pub fn resample(
    src: ImgRef<'_, RGB8>,
    dst_height: usize,
    dst_width: usize,
) -> Result<ImgVec<RGB8>, Error> {
    let src_h = src.height();
    let src_w = src.width();
    let invalid = || Error::InvalidDimensions {
        src_width: src_w,
        src_height: src_h,
        dst_width,
        dst_height,
    };

    if dst_height == 0 || dst_width == 0 || src_h == 0 || src_w == 0 {
        return Err(invalid());
    }
    // The output buffer must be allocatable.
    let len = dst_width
        .checked_mul(dst_height)
        .filter(|&n| n <= isize::MAX as usize / std::mem::size_of::<RGB8>())
        .ok_or_else(invalid)?;

    let row_ratio = src_h as f64 / dst_height as f64;
    let col_ratio = src_w as f64 / dst_width as f64;

    let mut pixels = vec![RGB8::new(0, 0, 0); len];

    pixels
        .par_chunks_mut(dst_width)
        .enumerate()
        .for_each(|(dy, dst_row)| {
            let sx = dy as f64 * row_ratio;
            let x0 = sx.floor();
            let u = sx - x0;
            let x0 = x0 as isize;

            for (dx, out) in dst_row.iter_mut().enumerate() {
                let sy = dx as f64 * col_ratio;
                let y0 = sy.floor();
                let v = sy - y0;
                let y0 = y0 as isize;

                let mut acc = [0.0_f64; 3];
                for &i in &TAPS {
                    let r = x0 + i;
                    if r < 0 || r as usize >= src_h {
                        continue;
                    }
                    let row = &src.buf()[r as usize * src.stride()..][..src_w];
                    let wr = bicubic_weight(i as f64 - u);

                    for &j in &TAPS {
                        let c = y0 + j;
                        if c < 0 || c as usize >= src_w {
                            continue;
                        }
                        let wc = bicubic_weight(j as f64 - v);
                        let p = row[c as usize];
                        acc[0] += p.r as f64 * wr * wc;
                        acc[1] += p.g as f64 * wr * wc;
                        acc[2] += p.b as f64 * wr * wc;
                    }
                }

                *out = RGB8::new(clip8(acc[0]), clip8(acc[1]), clip8(acc[2]));
            }
        });

    Ok(ImgVec::new(pixels, dst_width, dst_height))
}

/// Enlarge both dimensions by an integer factor.
pub fn upscale(src: ImgRef<'_, RGB8>, factor: usize) -> Result<ImgVec<RGB8>, Error> {
    match (src.height().checked_mul(factor), src.width().checked_mul(factor)) {
        (Some(dst_height), Some(dst_width)) => resample(src, dst_height, dst_width),
        _ => Err(Error::InvalidDimensions {
            src_width: src.width(),
            src_height: src.height(),
            dst_width: src.width().saturating_mul(factor),
            dst_height: src.height().saturating_mul(factor),
        }),
    }
}

/// Shrink both dimensions by an integer factor (flooring), as used to build
/// low-resolution inputs from a high-resolution set.
pub fn downscale(src: ImgRef<'_, RGB8>, factor: usize) -> Result<ImgVec<RGB8>, Error> {
    if factor == 0 {
        return Err(Error::InvalidDimensions {
            src_width: src.width(),
            src_height: src.height(),
            dst_width: 0,
            dst_height: 0,
        });
    }
    resample(src, src.height() / factor, src.width() / factor)
}

fn clip8(v: f64) -> u8 {
    v.clamp(0.0, 255.0) as u8
}
