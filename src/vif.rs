use imgref::{ImgRef, ImgVec};
use rgb::RGB8;

use crate::Error;
use crate::plane;
use crate::window::GaussianWindow;

/// Variance of the additive noise in the visual channel model.
const SIGMA_NSQ: f64 = 2.0;
const EPS: f64 = 1e-10;
const SCALES: u32 = 4;

/// Smallest side length for which all four scales fit.
pub const MIN_SIZE: usize = 41;

/// Pixel-domain visual information fidelity (VIFp) of `b` measured against `a`.
///
/// `a` plays the reference and `b` the distorted image, which is the order
/// [`crate::evaluate`] passes the reconstruction and its ground truth in.
/// Computed per channel on raw 0..255 samples over four scales, then averaged.
/// Unlike the other metrics this is not symmetric. Images smaller than
/// [`MIN_SIZE`] on either side fail with [`Error::InvalidWindowSize`]. A
/// reference channel without any local variance scores 1.
pub fn vif(a: ImgRef<'_, RGB8>, b: ImgRef<'_, RGB8>) -> Result<f64, Error> {
    let resized = crate::reconcile(a, b)?;
    let b = resized.as_ref().map_or(b, |r| r.as_ref());

    let reference = plane::split(a, 1.0);
    let distorted = plane::split(b, 1.0);

    let mut total = 0.0;
    for (r, d) in reference.iter().zip(&distorted) {
        total += channel_vif(r, d)?;
    }
    Ok(total / 3.0)
}

fn channel_vif(reference: &ImgVec<f64>, distorted: &ImgVec<f64>) -> Result<f64, Error> {
    let mut reference = reference.clone();
    let mut distorted = distorted.clone();
    let mut num = 0.0_f64;
    let mut den = 0.0_f64;

    for scale in 1..=SCALES {
        let n = (1_usize << (SCALES - scale + 1)) + 1;
        let window = GaussianWindow::new(n, n as f64 / 5.0);

        if scale > 1 {
            reference = plane::decimate(&filter(&window, &reference)?);
            distorted = plane::decimate(&filter(&window, &distorted)?);
        }

        let mu1 = filter(&window, &reference)?;
        let mu2 = filter(&window, &distorted)?;
        let e11 = filter(&window, &plane::product(&reference, &reference))?;
        let e22 = filter(&window, &plane::product(&distorted, &distorted))?;
        let e12 = filter(&window, &plane::product(&reference, &distorted))?;

        for i in 0..mu1.buf().len() {
            let m1 = mu1.buf()[i];
            let m2 = mu2.buf()[i];

            let mut sigma_ref_sq = (e11.buf()[i] - m1 * m1).max(0.0);
            let sigma_dist_sq = (e22.buf()[i] - m2 * m2).max(0.0);
            let sigma12 = e12.buf()[i] - m1 * m2;

            let mut g = sigma12 / (sigma_ref_sq + EPS);
            let mut sv_sq = sigma_dist_sq - g * sigma12;

            if sigma_ref_sq < EPS {
                g = 0.0;
                sv_sq = sigma_dist_sq;
                sigma_ref_sq = 0.0;
            }
            if sigma_dist_sq < EPS {
                g = 0.0;
                sv_sq = 0.0;
            }
            if g < 0.0 {
                sv_sq = sigma_dist_sq;
                g = 0.0;
            }
            let sv_sq = sv_sq.max(EPS);

            num += (1.0 + g * g * sigma_ref_sq / (sv_sq + SIGMA_NSQ)).log10();
            den += (1.0 + sigma_ref_sq / SIGMA_NSQ).log10();
        }
    }

    Ok(if den == 0.0 { 1.0 } else { num / den })
}

fn filter(window: &GaussianWindow, plane: &ImgVec<f64>) -> Result<ImgVec<f64>, Error> {
    window
        .filter_valid(plane.as_ref())
        .ok_or(Error::InvalidWindowSize {
            window_size: window.size(),
            width: plane.width(),
            height: plane.height(),
        })
}
