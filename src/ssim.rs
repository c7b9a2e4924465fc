use imgref::{ImgRef, ImgVec};
use rgb::RGB8;

use crate::Error;
use crate::plane;
use crate::window::GaussianWindow;

pub const DEFAULT_WINDOW_SIZE: usize = 11;
pub const DEFAULT_SIGMA: f64 = 1.5;

/// Per-scale weights for [`ms_ssim`], finest scale first.
pub const MS_SSIM_WEIGHTS: [f64; 5] = [0.0448, 0.2856, 0.3001, 0.2363, 0.1333];

// Stabilizers for samples normalized to [0, 1].
const C1: f64 = 0.01 * 0.01;
const C2: f64 = 0.03 * 0.03;

/// How local statistics treat the image border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Padding {
    /// Zero-padded, map has the image's size.
    Same,
    /// Only positions where the whole window fits.
    Valid,
}

/// Window parameters for SSIM and MS-SSIM.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SsimConfig {
    /// Side of the square Gaussian window.
    pub window_size: usize,
    /// Standard deviation of the Gaussian, in pixels.
    pub sigma: f64,
}

impl Default for SsimConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            sigma: DEFAULT_SIGMA,
        }
    }
}

impl SsimConfig {
    pub fn window(&self) -> GaussianWindow {
        GaussianWindow::new(self.window_size, self.sigma)
    }
}

/// Per-pixel SSIM and contrast-structure maps, one plane per channel (R, G, B).
#[derive(Debug, Clone)]
pub struct SsimMap {
    pub ssim: [ImgVec<f64>; 3],
    /// `(2 sigma12 + C2) / (sigma1^2 + sigma2^2 + C2)`, the part of SSIM
    /// without the luminance term.
    pub cs: [ImgVec<f64>; 3],
}

impl SsimMap {
    /// Mean over every channel and pixel. This is the SSIM score.
    pub fn mean(&self) -> f64 {
        mean_of(&self.ssim)
    }

    pub fn channel_means(&self) -> [f64; 3] {
        [
            plane::mean(&self.ssim[0]),
            plane::mean(&self.ssim[1]),
            plane::mean(&self.ssim[2]),
        ]
    }

    pub fn cs_mean(&self) -> f64 {
        mean_of(&self.cs)
    }
}

fn mean_of(planes: &[ImgVec<f64>; 3]) -> f64 {
    planes.iter().map(plane::mean).sum::<f64>() / 3.0
}

/// Mean SSIM with a Gaussian window of side `window_size` (sigma 1.5).
///
/// Samples are normalized to `[0, 1]`, statistics are taken with zero-padded
/// "same" filtering, and the map is averaged over all channels and pixels.
/// If the shapes differ, `b` is resampled to the shape of `a` first.
pub fn ssim(a: ImgRef<'_, RGB8>, b: ImgRef<'_, RGB8>, window_size: usize) -> Result<f64, Error> {
    let config = SsimConfig {
        window_size,
        ..SsimConfig::default()
    };
    ssim_map(a, b, &config).map(|m| m.mean())
}

/// Full SSIM maps, for callers that need per-channel or per-pixel values.
pub fn ssim_map(
    a: ImgRef<'_, RGB8>,
    b: ImgRef<'_, RGB8>,
    config: &SsimConfig,
) -> Result<SsimMap, Error> {
    let resized = crate::reconcile(a, b)?;
    let b = resized.as_ref().map_or(b, |r| r.as_ref());
    check_window(config.window_size, a.width(), a.height())?;

    let window = config.window();
    let pa = plane::split(a, 1.0 / 255.0);
    let pb = plane::split(b, 1.0 / 255.0);
    compute_map(&pa, &pb, &window, Padding::Same)
}

/// Multi-scale SSIM over up to five dyadic scales.
///
/// Local statistics only cover positions where the whole window fits, so the
/// coarse scales are not dominated by border padding. Scales before the last
/// contribute their mean contrast-structure term, the last contributes its
/// mean SSIM. Scales too small for the window are not run and the remaining
/// weights are renormalized. Negative means count as 0.
pub fn ms_ssim(
    a: ImgRef<'_, RGB8>,
    b: ImgRef<'_, RGB8>,
    config: &SsimConfig,
) -> Result<f64, Error> {
    let resized = crate::reconcile(a, b)?;
    let b = resized.as_ref().map_or(b, |r| r.as_ref());
    check_window(config.window_size, a.width(), a.height())?;

    let window = config.window();
    let mut pa = plane::split(a, 1.0 / 255.0);
    let mut pb = plane::split(b, 1.0 / 255.0);
    let mut terms: Vec<(f64, f64)> = Vec::with_capacity(MS_SSIM_WEIGHTS.len());

    for (scale, &weight) in MS_SSIM_WEIGHTS.iter().enumerate() {
        let (w, h) = (pa[0].width(), pa[0].height());
        let last =
            scale + 1 == MS_SSIM_WEIGHTS.len() || (w / 2).min(h / 2) < config.window_size;

        let map = compute_map(&pa, &pb, &window, Padding::Valid)?;
        let value = if last { map.mean() } else { map.cs_mean() };
        terms.push((value.max(0.0), weight));

        if last {
            if scale + 1 < MS_SSIM_WEIGHTS.len() {
                log::debug!(
                    "ms-ssim: {w}x{h} cannot be halved below window {}, using {} of {} scales",
                    config.window_size,
                    scale + 1,
                    MS_SSIM_WEIGHTS.len()
                );
            }
            break;
        }

        pa = [plane::halve(&pa[0]), plane::halve(&pa[1]), plane::halve(&pa[2])];
        pb = [plane::halve(&pb[0]), plane::halve(&pb[1]), plane::halve(&pb[2])];
    }

    let total: f64 = terms.iter().map(|&(_, w)| w).sum();
    Ok(terms.iter().map(|&(v, w)| v.powf(w / total)).product())
}

fn check_window(window_size: usize, width: usize, height: usize) -> Result<(), Error> {
    if window_size == 0 || window_size > width || window_size > height {
        return Err(Error::InvalidWindowSize {
            window_size,
            width,
            height,
        });
    }
    Ok(())
}

fn compute_map(
    pa: &[ImgVec<f64>; 3],
    pb: &[ImgVec<f64>; 3],
    window: &GaussianWindow,
    padding: Padding,
) -> Result<SsimMap, Error> {
    let (s0, c0) = channel_map(&pa[0], &pb[0], window, padding)?;
    let (s1, c1) = channel_map(&pa[1], &pb[1], window, padding)?;
    let (s2, c2) = channel_map(&pa[2], &pb[2], window, padding)?;
    Ok(SsimMap {
        ssim: [s0, s1, s2],
        cs: [c0, c1, c2],
    })
}

fn filter(
    window: &GaussianWindow,
    plane: &ImgVec<f64>,
    padding: Padding,
) -> Result<ImgVec<f64>, Error> {
    match padding {
        Padding::Same => Ok(window.filter_same(plane.as_ref())),
        Padding::Valid => window
            .filter_valid(plane.as_ref())
            .ok_or(Error::InvalidWindowSize {
                window_size: window.size(),
                width: plane.width(),
                height: plane.height(),
            }),
    }
}

fn channel_map(
    a: &ImgVec<f64>,
    b: &ImgVec<f64>,
    window: &GaussianWindow,
    padding: Padding,
) -> Result<(ImgVec<f64>, ImgVec<f64>), Error> {
    let mu1 = filter(window, a, padding)?;
    let mu2 = filter(window, b, padding)?;
    let e11 = filter(window, &plane::product(a, a), padding)?;
    let e22 = filter(window, &plane::product(b, b), padding)?;
    let e12 = filter(window, &plane::product(a, b), padding)?;

    let (w, h) = (mu1.width(), mu1.height());
    let n = w * h;
    let mut ssim = Vec::with_capacity(n);
    let mut cs = Vec::with_capacity(n);

    for i in 0..n {
        let m1 = mu1.buf()[i];
        let m2 = mu2.buf()[i];
        let mu1_sq = m1 * m1;
        let mu2_sq = m2 * m2;
        let mu1_mu2 = m1 * m2;

        let sigma1_sq = e11.buf()[i] - mu1_sq;
        let sigma2_sq = e22.buf()[i] - mu2_sq;
        let sigma12 = e12.buf()[i] - mu1_mu2;

        let cs_num = 2.0 * sigma12 + C2;
        let cs_den = sigma1_sq + sigma2_sq + C2;

        ssim.push(((2.0 * mu1_mu2 + C1) * cs_num) / ((mu1_sq + mu2_sq + C1) * cs_den));
        cs.push(cs_num / cs_den);
    }

    Ok((ImgVec::new(ssim, w, h), ImgVec::new(cs, w, h)))
}
