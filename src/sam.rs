use std::f64::consts::FRAC_PI_2;

use imgref::ImgRef;
use rgb::RGB8;

use crate::Error;

/// Spectral angle between the two images, in radians, averaged over R, G and B.
///
/// Each channel plane is treated as one vector; the angle between the two
/// vectors ignores overall brightness and only measures how the energy is
/// distributed across the plane. A channel that is all zero in exactly one
/// image counts as a right angle; all zero in both counts as no angle.
pub fn sam(a: ImgRef<'_, RGB8>, b: ImgRef<'_, RGB8>) -> Result<f64, Error> {
    let resized = crate::reconcile(a, b)?;
    let b = resized.as_ref().map_or(b, |r| r.as_ref());

    let mut dot = [0.0_f64; 3];
    let mut norm_a = [0.0_f64; 3];
    let mut norm_b = [0.0_f64; 3];

    for (row_a, row_b) in a.rows().zip(b.rows()) {
        for (pa, pb) in row_a.iter().zip(row_b) {
            for (c, (va, vb)) in [(pa.r, pb.r), (pa.g, pb.g), (pa.b, pb.b)]
                .into_iter()
                .enumerate()
            {
                let (va, vb) = (va as f64, vb as f64);
                dot[c] += va * vb;
                norm_a[c] += va * va;
                norm_b[c] += vb * vb;
            }
        }
    }

    let total: f64 = (0..3)
        .map(|c| spectral_angle(dot[c], norm_a[c], norm_b[c]))
        .sum();
    Ok(total / 3.0)
}

fn spectral_angle(dot: f64, norm_a_sq: f64, norm_b_sq: f64) -> f64 {
    match (norm_a_sq == 0.0, norm_b_sq == 0.0) {
        (true, true) => 0.0,
        (true, false) | (false, true) => FRAC_PI_2,
        (false, false) => {
            let cos = dot / (norm_a_sq.sqrt() * norm_b_sq.sqrt());
            cos.clamp(-1.0, 1.0).acos()
        }
    }
}
