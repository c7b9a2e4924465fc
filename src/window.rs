use imgref::{ImgRef, ImgVec};
use rayon::prelude::*;

/// A normalized, square Gaussian window.
///
/// Only the 1D taps are stored; the 2D window is their outer product, so
/// filtering runs as a horizontal pass followed by a vertical pass. Build it
/// once and reuse it across as many images as needed.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianWindow {
    size: usize,
    sigma: f64,
    taps: Vec<f64>,
}

impl GaussianWindow {
    /// Tap `k` gets `exp(-(k - size/2)^2 / (2 sigma^2))` (integer centre), then
    /// the taps are scaled to sum to 1.
    ///
    /// A non-positive `sigma` degenerates to a unit impulse at the centre.
    pub fn new(size: usize, sigma: f64) -> Self {
        let center = (size / 2) as isize;
        let mut taps: Vec<f64> = if sigma > 0.0 {
            (0..size)
                .map(|k| {
                    let d = (k as isize - center) as f64;
                    (-(d * d) / (2.0 * sigma * sigma)).exp()
                })
                .collect()
        } else {
            (0..size)
                .map(|k| if k as isize == center { 1.0 } else { 0.0 })
                .collect()
        };

        let total: f64 = taps.iter().sum();
        if total > 0.0 {
            for t in &mut taps {
                *t /= total;
            }
        }

        Self { size, sigma, taps }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// The normalized 1D taps.
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// 2D window weight at row `ky`, column `kx`.
    pub fn weight(&self, ky: usize, kx: usize) -> f64 {
        self.taps[ky] * self.taps[kx]
    }

    /// Zero-padded "same" filtering: the output has the input's dimensions and
    /// tap `k` reads the sample at offset `k - size/2`.
    pub fn filter_same(&self, plane: ImgRef<'_, f64>) -> ImgVec<f64> {
        let w = plane.width();
        let h = plane.height();
        if w == 0 || h == 0 {
            return ImgVec::new_stride(Vec::new(), w, h, plane.stride());
        }
        let pad = (self.size / 2) as isize;

        let mut horiz = vec![0.0_f64; w * h];
        horiz
            .par_chunks_mut(w)
            .zip(plane.rows().collect::<Vec<_>>())
            .for_each(|(out, row)| {
                for (x, o) in out.iter_mut().enumerate() {
                    let mut acc = 0.0;
                    for (k, &t) in self.taps.iter().enumerate() {
                        let sx = x as isize + k as isize - pad;
                        if sx >= 0 && (sx as usize) < w {
                            acc += t * row[sx as usize];
                        }
                    }
                    *o = acc;
                }
            });

        let mut out = vec![0.0_f64; w * h];
        out.par_chunks_mut(w).enumerate().for_each(|(y, out_row)| {
            for (k, &t) in self.taps.iter().enumerate() {
                let sy = y as isize + k as isize - pad;
                if sy < 0 || sy as usize >= h {
                    continue;
                }
                let src_row = &horiz[sy as usize * w..][..w];
                for (o, &s) in out_row.iter_mut().zip(src_row) {
                    *o += t * s;
                }
            }
        });

        ImgVec::new(out, w, h)
    }

    /// "Valid" filtering: only positions where the whole window fits.
    /// The output is `(width - size + 1) x (height - size + 1)`; `None` if the
    /// window does not fit at all.
    pub fn filter_valid(&self, plane: ImgRef<'_, f64>) -> Option<ImgVec<f64>> {
        let w = plane.width();
        let h = plane.height();
        let ow = (w + 1).saturating_sub(self.size);
        let oh = (h + 1).saturating_sub(self.size);
        if ow == 0 || oh == 0 {
            return None;
        }

        let mut horiz = vec![0.0_f64; ow * h];
        horiz
            .par_chunks_mut(ow)
            .zip(plane.rows().collect::<Vec<_>>())
            .for_each(|(out, row)| {
                for (x, o) in out.iter_mut().enumerate() {
                    *o = self
                        .taps
                        .iter()
                        .zip(&row[x..x + self.size])
                        .map(|(t, s)| t * s)
                        .sum();
                }
            });

        let mut out = vec![0.0_f64; ow * oh];
        out.par_chunks_mut(ow).enumerate().for_each(|(y, out_row)| {
            for (k, &t) in self.taps.iter().enumerate() {
                let src_row = &horiz[(y + k) * ow..][..ow];
                for (o, &s) in out_row.iter_mut().zip(src_row) {
                    *o += t * s;
                }
            }
        });

        Some(ImgVec::new(out, ow, oh))
    }
}
