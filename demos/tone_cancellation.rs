//! Runs the reference configuration over a 5 s, 400 Hz tone (inside the
//! cancelled band) and the same tone at 2 kHz (outside it).
//!
//! `RUST_LOG=debug cargo run --example tone_cancellation`

use anc_rs::prelude::*;

fn tone(freq: f64, amplitude: f64, seconds: f64, sample_rate: u32) -> Vec<f64> {
    let len = (seconds * sample_rate as f64) as usize;
    (0..len)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            amplitude * (2.0 * std::f64::consts::PI * freq * t).sin()
        })
        .collect()
}

fn main() -> Result<(), AncError> {
    env_logger::init();

    let config = AncConfigF64::reference();
    let sample_rate = config.sample_rate;
    let pipeline = AncPipeline::new(config)?;

    for freq in [400.0, 2000.0] {
        let noise = SampleBuffer::mono(tone(freq, 0.5, 5.0, sample_rate), sample_rate);
        let output = pipeline.process(&noise)?;

        println!("\n===== {} Hz tone =====", freq);
        println!("{}", output.metrics);
        println!("Dropped trailing samples : {}", output.dropped_samples);
        output.metrics.log_summary();
    }

    Ok(())
}
