#![forbid(unsafe_code)]

//! Bicubic super-resolution baseline and full-reference image quality metrics.
//!
//! The crate does two things:
//!
//! - **Reconstruct**: [`resample`] scales an RGB image with a 3x3 cubic
//!   convolution kernel. It is the classic bicubic baseline that learned
//!   super-resolution models are compared against, reproduced exactly,
//!   including its border darkening.
//! - **Score**: [`psnr`], [`ssim`] and friends compare a reconstruction with
//!   its ground truth. [`evaluate`] computes all of them at once.
//!
//! Everything works on [`imgref`] images of [`rgb::RGB8`] pixels. Loading and
//! saving files, walking dataset folders and averaging scores over a dataset
//! are left to the caller.
//!
//! ```
//! use srscore::{EvalConfig, evaluate, pattern, downscale, upscale};
//!
//! let truth = pattern::gradient(96, 96);
//! let low_res = downscale(truth.as_ref(), 2).unwrap();
//! let restored = upscale(low_res.as_ref(), 2).unwrap();
//!
//! let report = evaluate(restored.as_ref(), truth.as_ref(), &EvalConfig::default()).unwrap();
//! assert!(report.psnr > 15.0 && report.psnr < 100.0);
//! assert!(report.ssim > 0.4 && report.ssim < 1.0);
//! ```
//!
//! ## Shape reconciliation
//!
//! Every metric accepts images of different sizes: the second image (the
//! reference) is resampled to the size of the first before comparing. Only
//! images with zero area are rejected.
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`] facade at `debug` level. Install any
//! logger to see them.
//!
//! ## License
//!
//! AGPL-3.0-or-later.

pub mod kernel;
pub mod pattern;
mod plane;
pub mod psnr;
pub mod resample;
pub mod sam;
pub mod ssim;
pub mod vif;
pub mod window;

// Re-export imgref and rgb types for convenience
pub use imgref::{Img, ImgRef, ImgVec};
pub use rgb::RGB8;

pub use kernel::bicubic_weight;
pub use psnr::{mse, psnr, rmse};
pub use resample::{downscale, resample, upscale};
pub use sam::sam;
pub use ssim::{SsimConfig, SsimMap, ms_ssim, ssim, ssim_map};
pub use vif::vif;
pub use window::GaussianWindow;

/// Which metrics [`evaluate`] computes beyond MSE, RMSE, PSNR and SSIM.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Window used by SSIM and MS-SSIM.
    pub ssim: SsimConfig,
    pub ms_ssim: bool,
    pub sam: bool,
    /// VIF needs at least [`vif::MIN_SIZE`] pixels on each side.
    pub vif: bool,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            ssim: SsimConfig::default(),
            ms_ssim: true,
            sam: true,
            vif: true,
        }
    }
}

/// Scores for one reconstruction against its reference.
#[derive(Debug, Clone, PartialEq)]
pub struct QualityReport {
    pub mse: f64,
    pub rmse: f64,
    /// dB; 100 for identical images.
    pub psnr: f64,
    pub ssim: f64,
    pub ms_ssim: Option<f64>,
    /// Radians.
    pub sam: Option<f64>,
    pub vif: Option<f64>,
}

impl std::fmt::Display for QualityReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MSE: {:.2} RMSE: {:.2} PSNR: {:.2} SSIM: {:.4}",
            self.mse, self.rmse, self.psnr, self.ssim
        )?;
        if let Some(v) = self.ms_ssim {
            write!(f, " MS-SSIM: {v:.4}")?;
        }
        if let Some(v) = self.sam {
            write!(f, " SAM: {v:.4}")?;
        }
        if let Some(v) = self.vif {
            write!(f, " VIF: {v:.4}")?;
        }
        Ok(())
    }
}

/// Error type for resampling and metric operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(
        "cannot resample {src_width}x{src_height} to {dst_width}x{dst_height}: dimensions must be non-zero and fit in memory"
    )]
    InvalidDimensions {
        src_width: usize,
        src_height: usize,
        dst_width: usize,
        dst_height: usize,
    },
    #[error("cannot compare {width_a}x{height_a} with {width_b}x{height_b}")]
    ShapeMismatch {
        width_a: usize,
        height_a: usize,
        width_b: usize,
        height_b: usize,
    },
    #[error("window size {window_size} does not fit a {width}x{height} image")]
    InvalidWindowSize {
        window_size: usize,
        width: usize,
        height: usize,
    },
}

/// Bring `b` to the shape of `a`.
///
/// Returns `None` when the shapes already match, or the resampled copy of `b`.
fn reconcile(a: ImgRef<'_, RGB8>, b: ImgRef<'_, RGB8>) -> Result<Option<ImgVec<RGB8>>, Error> {
    let empty = |img: &ImgRef<'_, RGB8>| img.width() == 0 || img.height() == 0;
    if empty(&a) || empty(&b) {
        return Err(Error::ShapeMismatch {
            width_a: a.width(),
            height_a: a.height(),
            width_b: b.width(),
            height_b: b.height(),
        });
    }

    if a.width() == b.width() && a.height() == b.height() {
        return Ok(None);
    }

    log::debug!(
        "resampling reference from {}x{} to {}x{} before comparison",
        b.width(),
        b.height(),
        a.width(),
        a.height()
    );
    resample::resample(b, a.height(), a.width()).map(Some)
}

/// Score `reconstructed` against `reference` with every metric enabled in `config`.
///
/// Shapes are reconciled once up front. Any metric failure fails the whole call.
pub fn evaluate(
    reconstructed: ImgRef<'_, RGB8>,
    reference: ImgRef<'_, RGB8>,
    config: &EvalConfig,
) -> Result<QualityReport, Error> {
    let resized = reconcile(reconstructed, reference)?;
    let reference = resized.as_ref().map_or(reference, |r| r.as_ref());

    let mse = psnr::mse(reconstructed, reference)?;
    let ssim = ssim::ssim_map(reconstructed, reference, &config.ssim)?.mean();

    let ms_ssim = if config.ms_ssim {
        Some(ssim::ms_ssim(reconstructed, reference, &config.ssim)?)
    } else {
        None
    };
    let sam = if config.sam {
        Some(sam::sam(reconstructed, reference)?)
    } else {
        None
    };
    let vif = if config.vif {
        Some(vif::vif(reconstructed, reference)?)
    } else {
        None
    };

    let report = QualityReport {
        mse,
        rmse: mse.sqrt(),
        psnr: psnr::psnr_from_mse(mse),
        ssim,
        ms_ssim,
        sam,
        vif,
    };
    log::debug!("{report}");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reconcile_same_shape_borrows() {
        let a = pattern::uniform(5, 4, 1);
        let b = pattern::uniform(5, 4, 2);
        assert!(reconcile(a.as_ref(), b.as_ref()).unwrap().is_none());
    }

    #[test]
    fn reconcile_resizes_reference() {
        let a = pattern::uniform(10, 6, 1);
        let b = pattern::noise(5, 3, 2);
        let r = reconcile(a.as_ref(), b.as_ref()).unwrap().unwrap();
        assert_eq!(r.width(), 10);
        assert_eq!(r.height(), 6);
    }

    #[test]
    fn reconcile_rejects_empty() {
        let a = pattern::uniform(5, 4, 1);
        let empty: ImgVec<RGB8> = ImgVec::new(Vec::new(), 5, 0);
        assert!(matches!(
            reconcile(a.as_ref(), empty.as_ref()),
            Err(Error::ShapeMismatch {
                width_a: 5,
                height_a: 4,
                width_b: 5,
                height_b: 0
            })
        ));
    }

    #[test]
    fn evaluate_identical() {
        let img = pattern::noise(64, 64, 3);
        let report = evaluate(img.as_ref(), img.as_ref(), &EvalConfig::default()).unwrap();
        assert_eq!(report.mse, 0.0);
        assert_eq!(report.rmse, 0.0);
        assert_eq!(report.psnr, 100.0);
        assert!((report.ssim - 1.0).abs() < 1e-12);
        assert!((report.ms_ssim.unwrap() - 1.0).abs() < 1e-12);
        assert!(report.sam.unwrap().abs() < 1e-6);
        assert!((report.vif.unwrap() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn evaluate_skips_disabled_metrics() {
        let a = pattern::noise(16, 16, 1);
        let b = pattern::noise(16, 16, 2);
        let config = EvalConfig {
            ms_ssim: false,
            sam: false,
            vif: false,
            ..EvalConfig::default()
        };
        let report = evaluate(a.as_ref(), b.as_ref(), &config).unwrap();
        assert!(report.ms_ssim.is_none());
        assert!(report.sam.is_none());
        assert!(report.vif.is_none());
        assert!((report.rmse - report.mse.sqrt()).abs() < 1e-12);
        assert_eq!(report.psnr, psnr(a.as_ref(), b.as_ref()).unwrap());
    }

    #[test]
    fn evaluate_fails_atomically() {
        // Large enough for SSIM, too small for VIF.
        let img = pattern::noise(20, 20, 1);
        let result = evaluate(img.as_ref(), img.as_ref(), &EvalConfig::default());
        assert!(matches!(result, Err(Error::InvalidWindowSize { .. })));
    }

    #[test]
    fn report_display() {
        let report = QualityReport {
            mse: 12.3456,
            rmse: 3.5136,
            psnr: 37.2161,
            ssim: 0.912345,
            ms_ssim: None,
            sam: Some(0.05),
            vif: None,
        };
        assert_eq!(
            report.to_string(),
            "MSE: 12.35 RMSE: 3.51 PSNR: 37.22 SSIM: 0.9123 SAM: 0.0500"
        );
    }

    #[test]
    fn crate_docs_state_package_license() {
        let docs = include_str!("lib.rs");
        let line = concat!("//! ", env!("CARGO_PKG_LICENSE"), ".");
        assert!(docs.contains(line), "missing license line {line:?}");
    }

    #[test]
    fn error_messages() {
        let e = Error::InvalidWindowSize {
            window_size: 11,
            width: 8,
            height: 8,
        };
        assert_eq!(e.to_string(), "window size 11 does not fit a 8x8 image");
    }
}
