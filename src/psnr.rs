use imgref::ImgRef;
use rgb::RGB8;

use crate::Error;

/// Returned by [`psnr`] when the images are effectively identical.
pub const IDENTICAL_PSNR: f64 = 100.0;

const MAX_VALUE: f64 = 255.0;
const MSE_FLOOR: f64 = 1e-10;

/// Mean squared error over every sample of every channel.
///
/// If the shapes differ, `b` is resampled to the shape of `a` first.
pub fn mse(a: ImgRef<'_, RGB8>, b: ImgRef<'_, RGB8>) -> Result<f64, Error> {
    let resized = crate::reconcile(a, b)?;
    let b = resized.as_ref().map_or(b, |r| r.as_ref());

    let mut sum = 0.0_f64;
    for (row_a, row_b) in a.rows().zip(b.rows()) {
        for (pa, pb) in row_a.iter().zip(row_b) {
            sum += sq_diff(pa.r, pb.r) + sq_diff(pa.g, pb.g) + sq_diff(pa.b, pb.b);
        }
    }

    Ok(sum / (a.width() * a.height() * 3) as f64)
}

/// Square root of [`mse`].
pub fn rmse(a: ImgRef<'_, RGB8>, b: ImgRef<'_, RGB8>) -> Result<f64, Error> {
    mse(a, b).map(f64::sqrt)
}

/// Peak signal-to-noise ratio in dB, `10 log10(255^2 / mse)`.
///
/// Returns [`IDENTICAL_PSNR`] when the MSE is below `1e-10`.
pub fn psnr(a: ImgRef<'_, RGB8>, b: ImgRef<'_, RGB8>) -> Result<f64, Error> {
    mse(a, b).map(psnr_from_mse)
}

pub(crate) fn psnr_from_mse(mse: f64) -> f64 {
    if mse < MSE_FLOOR {
        IDENTICAL_PSNR
    } else {
        10.0 * (MAX_VALUE * MAX_VALUE / mse).log10()
    }
}

fn sq_diff(a: u8, b: u8) -> f64 {
    let d = a as f64 - b as f64;
    d * d
}
