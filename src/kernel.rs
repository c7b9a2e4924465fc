/// Sample offsets visited on each axis around the floor of the source coordinate.
///
/// The cubic kernel has a support of 2, so a full evaluation would need four
/// taps per axis. The resampler only visits three, which reproduces the
/// reference outputs bit for bit (including their edge darkening).
pub const TAPS: [isize; 3] = [-1, 0, 1];

/// Cubic convolution weight for a distance `x` (in source pixels).
///
/// This is the Keys kernel with `a = -1`:
/// `1 - 2|x|^2 + |x|^3` on `[0, 1]`, `4 - 8|x| + 5|x|^2 - |x|^3` on `(1, 2)`, zero beyond.
pub fn bicubic_weight(x: f64) -> f64 {
    let ax = x.abs();
    if ax <= 1.0 {
        1.0 - 2.0 * (ax * ax) + ax * ax * ax
    } else if ax < 2.0 {
        4.0 - 8.0 * ax + 5.0 * (ax * ax) - ax * ax * ax
    } else {
        0.0
    }
}

/// Sum of the weights the resampler applies along one axis for fractional offset `u`.
///
/// Only in-bounds taps contribute; `first` is the index of the floor sample and
/// `len` the extent of the axis. Interior positions with `u == 0` sum to exactly 1.
pub fn truncated_weight_sum(u: f64, first: isize, len: usize) -> f64 {
    TAPS.iter()
        .filter(|&&i| {
            let p = first + i;
            p >= 0 && (p as usize) < len
        })
        .map(|&i| bicubic_weight(i as f64 - u))
        .sum()
}
