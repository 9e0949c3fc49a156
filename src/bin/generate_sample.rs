use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const SAMPLES: usize = 500;
const SAMPLE_RATE: f64 = 250.0;

const HEADER: [&str; 7] = [
    "V5",
    "P-wave",
    "P-peak",
    "QRS-complex",
    "R-peak",
    "T-wave",
    "T-peak",
];

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// One wave of a beat: centre, width and amplitude, in seconds / mV.
#[derive(Clone, Copy)]
struct Wave {
    mu: f64,
    sigma: f64,
    amplitude: f64,
}

impl Wave {
    /// Samples within two sigma of the centre are labelled.
    fn covers(&self, t: f64) -> bool {
        (t - self.mu).abs() <= 2.0 * self.sigma
    }

    fn peak_sample(&self) -> usize {
        (self.mu * SAMPLE_RATE).round() as usize
    }
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn flag(active: bool) -> &'static str {
    if active {
        "1"
    } else {
        "0"
    }
}

/// Write one two-second segment with a single P-QRS-T beat.
fn write_segment(path: &Path, rng: &mut SimpleRng, noise: f64) -> Result<()> {
    let shift = rng.uniform(-0.15, 0.15);
    let p = Wave { mu: 0.6 + shift, sigma: 0.025, amplitude: 0.15 };
    let qrs = Wave { mu: 0.85 + shift, sigma: 0.012, amplitude: rng.uniform(0.9, 1.4) };
    let t_wave = Wave { mu: 1.2 + shift, sigma: 0.05, amplitude: 0.3 };

    let mut writer =
        csv::Writer::from_path(path).with_context(|| format!("creating {}", path.display()))?;
    writer.write_record(HEADER)?;

    for i in 0..SAMPLES {
        let t = i as f64 / SAMPLE_RATE;
        let v5 = [p, qrs, t_wave]
            .iter()
            .map(|w| gaussian(t, w.mu, w.sigma, w.amplitude))
            .sum::<f64>()
            + rng.gauss(0.0, noise);

        writer.write_record([
            format!("{v5:.5}").as_str(),
            flag(p.covers(t)),
            flag(i == p.peak_sample()),
            flag(qrs.covers(t)),
            flag(i == qrs.peak_sample()),
            flag(t_wave.covers(t)),
            flag(i == t_wave.peak_sample()),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample_output"));
    let pcb = output_path.join("pcb");
    fs::create_dir_all(&pcb).with_context(|| format!("creating {}", pcb.display()))?;

    let mut rng = SimpleRng::new(42);

    // Gaps at 4 and 9, as left behind by an earlier pipeline stage.
    let ids: Vec<u32> = (1..=14).filter(|id| *id != 4 && *id != 9).collect();
    for (n, &id) in ids.iter().enumerate() {
        let noise = if n % 5 == 4 { 0.12 } else { 0.01 };
        write_segment(&pcb.join(format!("{id}.csv")), &mut rng, noise)?;
    }

    // A record the viewer cannot plot but can still keep or reject.
    fs::write(pcb.join("15.csv"), "V5,P-wave\n0.1,0\n")?;
    // Not an identifier; never touched by the reviewer.
    fs::write(pcb.join("notes.txt"), "segments exported for review\n")?;

    println!(
        "Wrote {} segments ({SAMPLES} samples each) to {}",
        ids.len() + 1,
        pcb.display()
    );
    Ok(())
}
