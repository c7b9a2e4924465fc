use imgref::ImgVec;
use rgb::RGB8;

pub const DARK: u8 = 50;
pub const BRIGHT: u8 = 250;

/// A single flat color.
pub fn uniform(width: usize, height: usize, value: u8) -> ImgVec<RGB8> {
    ImgVec::new(
        vec![RGB8::new(value, value, value); width * height],
        width,
        height,
    )
}

/// Red ramps left to right, green top to bottom, blue along the diagonal.
pub fn gradient(width: usize, height: usize) -> ImgVec<RGB8> {
    let ramp = |i: usize, n: usize| -> u8 {
        if n <= 1 {
            0
        } else {
            (i * 255 / (n - 1)) as u8
        }
    };

    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            pixels.push(RGB8::new(
                ramp(x, width),
                ramp(y, height),
                ramp(x + y, width + height - 1),
            ));
        }
    }
    ImgVec::new(pixels, width, height)
}

/// Square cells of `cell` pixels alternating between [`DARK`] and [`BRIGHT`].
pub fn checkerboard(width: usize, height: usize, cell: usize) -> ImgVec<RGB8> {
    let cell = cell.max(1);
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let v = if (x / cell + y / cell) % 2 == 0 {
                DARK
            } else {
                BRIGHT
            };
            pixels.push(RGB8::new(v, v, v));
        }
    }
    ImgVec::new(pixels, width, height)
}

/// Deterministic per-channel noise. The same seed always gives the same image.
pub fn noise(width: usize, height: usize, seed: u64) -> ImgVec<RGB8> {
    let pixels = (0..width * height)
        .map(|i| {
            let h = mix(seed ^ (i as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15));
            RGB8::new(h as u8, (h >> 8) as u8, (h >> 16) as u8)
        })
        .collect();
    ImgVec::new(pixels, width, height)
}

// splitmix64 finalizer
fn mix(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
