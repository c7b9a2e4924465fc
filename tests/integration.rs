use imgref::{ImgRef, ImgVec};
use rgb::RGB8;
use srscore::{EvalConfig, Error, SsimConfig, pattern};

fn encode_png(img: ImgRef<'_, RGB8>) -> Vec<u8> {
    let mut out = Vec::new();
    let mut encoder = png::Encoder::new(&mut out, img.width() as u32, img.height() as u32);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header().unwrap();
    let raw: Vec<u8> = img.rows().flatten().flat_map(|p| [p.r, p.g, p.b]).collect();
    writer.write_image_data(&raw).unwrap();
    writer.finish().unwrap();
    out
}

fn decode_png(bytes: &[u8]) -> ImgVec<RGB8> {
    let decoder = png::Decoder::new(bytes);
    let mut reader = decoder.read_info().unwrap();
    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).unwrap();
    assert_eq!(info.color_type, png::ColorType::Rgb);
    assert_eq!(info.bit_depth, png::BitDepth::Eight);
    let pixels = buf[..info.buffer_size()]
        .chunks_exact(3)
        .map(|c| RGB8::new(c[0], c[1], c[2]))
        .collect();
    ImgVec::new(pixels, info.width as usize, info.height as usize)
}

/// Downscale then upscale back, the way a bicubic baseline is produced.
fn bicubic_baseline(truth: &ImgVec<RGB8>, factor: usize) -> ImgVec<RGB8> {
    let low = srscore::downscale(truth.as_ref(), factor).unwrap();
    srscore::upscale(low.as_ref(), factor).unwrap()
}

#[test]
fn png_round_trip_is_lossless() {
    let img = pattern::gradient(40, 30);
    let decoded = decode_png(&encode_png(img.as_ref()));
    assert_eq!(decoded.width(), 40);
    assert_eq!(decoded.height(), 30);
    assert_eq!(
        srscore::psnr(decoded.as_ref(), img.as_ref()).unwrap(),
        srscore::psnr::IDENTICAL_PSNR
    );
    let s = srscore::ssim(decoded.as_ref(), img.as_ref(), 11).unwrap();
    assert!((s - 1.0).abs() < 1e-12, "ssim {s}");
}

#[test]
fn baseline_from_decoded_low_resolution() {
    let truth = pattern::checkerboard(64, 64, 8);
    let low = srscore::downscale(truth.as_ref(), 2).unwrap();
    let low = decode_png(&encode_png(low.as_ref()));
    assert_eq!((low.width(), low.height()), (32, 32));

    let restored = srscore::upscale(low.as_ref(), 2).unwrap();
    assert_eq!(restored.buf(), bicubic_baseline(&truth, 2).buf());
}

#[test]
fn baseline_report() {
    let truth = pattern::gradient(64, 64);
    let restored = bicubic_baseline(&truth, 2);
    let report =
        srscore::evaluate(restored.as_ref(), truth.as_ref(), &EvalConfig::default()).unwrap();

    assert!(report.psnr > 15.0 && report.psnr < 30.0, "{report}");
    assert!(report.ssim > 0.3 && report.ssim < 1.0, "{report}");
    assert!((report.rmse * report.rmse - report.mse).abs() < 1e-9);

    let ms_ssim = report.ms_ssim.unwrap();
    assert!((0.0..1.0).contains(&ms_ssim), "{report}");
    let sam = report.sam.unwrap();
    assert!(sam > 0.0 && sam < std::f64::consts::FRAC_PI_2, "{report}");
    let vif = report.vif.unwrap();
    assert!(vif > 0.0 && vif < 1.0, "{report}");

    let line = report.to_string();
    assert!(line.starts_with("MSE: "), "{line}");
    assert!(line.contains(" VIF: "), "{line}");
}

#[test]
fn smooth_content_survives_better_than_noise() {
    let smooth = pattern::gradient(64, 64);
    let rough = pattern::noise(64, 64, 7);
    let smooth_psnr =
        srscore::psnr(bicubic_baseline(&smooth, 2).as_ref(), smooth.as_ref()).unwrap();
    let rough_psnr = srscore::psnr(bicubic_baseline(&rough, 2).as_ref(), rough.as_ref()).unwrap();
    assert!(smooth_psnr > rough_psnr + 5.0, "{smooth_psnr} vs {rough_psnr}");
}

#[test]
fn reference_is_resampled_to_first_shape() {
    let small = pattern::noise(50, 50, 3);
    let large = srscore::upscale(small.as_ref(), 2).unwrap();
    assert_eq!((large.width(), large.height()), (100, 100));

    // The reference goes through the same resampler, so the two match exactly.
    assert_eq!(
        srscore::psnr(large.as_ref(), small.as_ref()).unwrap(),
        srscore::psnr::IDENTICAL_PSNR
    );
    let s = srscore::ssim(large.as_ref(), small.as_ref(), 11).unwrap();
    assert!((s - 1.0).abs() < 1e-12, "ssim {s}");

    let report =
        srscore::evaluate(large.as_ref(), small.as_ref(), &EvalConfig::default()).unwrap();
    assert_eq!(report.mse, 0.0);
    assert!((report.vif.unwrap() - 1.0).abs() < 1e-6);
}

#[test]
fn evaluate_matches_individual_metrics() {
    let a = pattern::noise(48, 48, 1);
    let b = pattern::checkerboard(48, 48, 6);
    let report = srscore::evaluate(a.as_ref(), b.as_ref(), &EvalConfig::default()).unwrap();

    assert_eq!(report.mse, srscore::mse(a.as_ref(), b.as_ref()).unwrap());
    assert_eq!(report.psnr, srscore::psnr(a.as_ref(), b.as_ref()).unwrap());
    assert_eq!(report.ssim, srscore::ssim(a.as_ref(), b.as_ref(), 11).unwrap());
    assert_eq!(
        report.ms_ssim,
        Some(srscore::ms_ssim(a.as_ref(), b.as_ref(), &SsimConfig::default()).unwrap())
    );
    assert_eq!(report.sam, Some(srscore::sam(a.as_ref(), b.as_ref()).unwrap()));
    assert_eq!(report.vif, Some(srscore::vif(a.as_ref(), b.as_ref()).unwrap()));
}

#[test]
fn symmetric_metrics() {
    let a = pattern::gradient(48, 40);
    let b = pattern::noise(48, 40, 9);
    let (a, b) = (a.as_ref(), b.as_ref());
    assert_eq!(srscore::mse(a, b).unwrap(), srscore::mse(b, a).unwrap());
    let s_ab = srscore::ssim(a, b, 11).unwrap();
    let s_ba = srscore::ssim(b, a, 11).unwrap();
    assert!((s_ab - s_ba).abs() < 1e-12);
    let sam_ab = srscore::sam(a, b).unwrap();
    let sam_ba = srscore::sam(b, a).unwrap();
    assert!((sam_ab - sam_ba).abs() < 1e-12);
}

#[test]
fn arbitrary_ratios() {
    let src = pattern::gradient(30, 20);
    let out = srscore::resample(src.as_ref(), 33, 45).unwrap();
    assert_eq!(out.width(), 45);
    assert_eq!(out.height(), 33);

    let back = srscore::resample(out.as_ref(), 20, 30).unwrap();
    assert!(srscore::psnr(back.as_ref(), src.as_ref()).unwrap() > 10.0);
}

#[test]
fn invalid_inputs() {
    let img = pattern::uniform(16, 16, 10);
    assert!(matches!(
        srscore::resample(img.as_ref(), 0, 16),
        Err(Error::InvalidDimensions { .. })
    ));
    assert!(matches!(
        srscore::downscale(img.as_ref(), 32),
        Err(Error::InvalidDimensions { .. })
    ));
    assert!(matches!(
        srscore::ssim(img.as_ref(), img.as_ref(), 17),
        Err(Error::InvalidWindowSize { .. })
    ));
    assert!(matches!(
        srscore::vif(img.as_ref(), img.as_ref()),
        Err(Error::InvalidWindowSize { .. })
    ));
}
