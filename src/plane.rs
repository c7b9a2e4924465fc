//! Single-channel `f64` planes used by the windowed metrics.

use imgref::{ImgRef, ImgVec};
use rgb::RGB8;

/// Split an RGB image into three planes, multiplying every sample by `scale`.
pub(crate) fn split(img: ImgRef<'_, RGB8>, scale: f64) -> [ImgVec<f64>; 3] {
    let n = img.width() * img.height();
    let mut r = Vec::with_capacity(n);
    let mut g = Vec::with_capacity(n);
    let mut b = Vec::with_capacity(n);

    for row in img.rows() {
        for px in row {
            r.push(px.r as f64 * scale);
            g.push(px.g as f64 * scale);
            b.push(px.b as f64 * scale);
        }
    }

    let (w, h) = (img.width(), img.height());
    [ImgVec::new(r, w, h), ImgVec::new(g, w, h), ImgVec::new(b, w, h)]
}

/// Element-wise product of two equally sized planes.
pub(crate) fn product(a: &ImgVec<f64>, b: &ImgVec<f64>) -> ImgVec<f64> {
    debug_assert_eq!(a.width(), b.width());
    debug_assert_eq!(a.height(), b.height());
    let buf = a.buf().iter().zip(b.buf().iter()).map(|(x, y)| x * y).collect();
    ImgVec::new(buf, a.width(), a.height())
}

/// Average 2x2 blocks. A trailing odd row or column is dropped.
pub(crate) fn halve(plane: &ImgVec<f64>) -> ImgVec<f64> {
    let w = plane.width() / 2;
    let h = plane.height() / 2;
    let stride = plane.stride();
    let src = plane.buf();

    let mut out = Vec::with_capacity(w * h);
    for y in 0..h {
        let top = &src[2 * y * stride..];
        let bottom = &src[(2 * y + 1) * stride..];
        for x in 0..w {
            let sum = top[2 * x] + top[2 * x + 1] + bottom[2 * x] + bottom[2 * x + 1];
            out.push(sum * 0.25);
        }
    }
    ImgVec::new(out, w, h)
}

/// Keep every other row and column, starting with the first.
pub(crate) fn decimate(plane: &ImgVec<f64>) -> ImgVec<f64> {
    let w = plane.width().div_ceil(2);
    let h = plane.height().div_ceil(2);
    let out = plane
        .as_ref()
        .rows()
        .step_by(2)
        .flat_map(|row| row.iter().step_by(2).copied())
        .collect();
    ImgVec::new(out, w, h)
}

/// Mean of all samples; zero for an empty plane.
pub(crate) fn mean(plane: &ImgVec<f64>) -> f64 {
    let n = plane.width() * plane.height();
    if n == 0 {
        return 0.0;
    }
    plane.as_ref().rows().flatten().sum::<f64>() / n as f64
}
