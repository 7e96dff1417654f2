//! Compares the two band-limiting strategies on a mix of a low hum and a
//! high whine, and shows the stereo (noise | anti-noise) export.

use anc_rs::prelude::*;
use anc_rs::rms;

fn main() -> Result<(), AncError> {
    env_logger::init();

    let sample_rate = 44_100;
    let noise: Vec<f32> = (0..sample_rate as usize * 2)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            0.4 * (2.0 * std::f32::consts::PI * 120.0 * t).sin()
                + 0.2 * (2.0 * std::f32::consts::PI * 3500.0 * t).sin()
        })
        .collect();
    let buffer = SampleBuffer::mono(noise, sample_rate);

    let strategies = [
        ("spectral mask", BandLimitMode::SpectralMask),
        ("butterworth x4", BandLimitMode::Butterworth { order: 4 }),
        ("butterworth x8", BandLimitMode::Butterworth { order: 8 }),
    ];

    for (name, mode) in strategies {
        let pipeline = AncPipeline::new(AncConfigF32::reference().with_band_limit(mode))?;
        let output = pipeline.process(&buffer)?;

        println!(
            "{:<16} anti-noise RMS {:.4}  reduction {:6.2} dB  latency {:.3} ms/frame",
            name,
            rms(&output.anti_noise),
            output.metrics.reduction_db,
            output.metrics.avg_latency_ms
        );

        let stereo = output.to_stereo();
        println!("{:<16} stereo export: {} interleaved samples", "", stereo.len());
    }

    Ok(())
}
