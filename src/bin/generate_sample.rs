use std::error::Error;

/// Seeded splitmix64 stream; the sample only needs repeatable jitter.
struct Jitter(u64);

impl Jitter {
    fn next_unit(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Approximately normal noise with standard deviation `spread`, bounded
    /// by `±6 * spread` (twelve uniforms minus their mean).
    fn noise(&mut self, spread: f64) -> f64 {
        let sum: f64 = (0..12).map(|_| self.next_unit()).sum();
        (sum - 6.0) * spread
    }
}

/// Easting/northing of a gently curving route at kilometre point `kp`.
fn route_position(kp: f64) -> (f64, f64) {
    let easting = 512_000.0 + kp * 850.0 + 120.0 * (kp / 3.0).sin();
    let northing = 6_210_000.0 + kp * 430.0 - 80.0 * (kp / 5.0).cos();
    (easting, northing)
}

fn main() -> Result<(), Box<dyn Error>> {
    let mut jitter = Jitter(42);

    let output_path = "sample_survey.csv";
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(["KP", "X", "Y", "Z", "Label"])?;

    // 0.000 → 24.975 km, step 25 m
    let n_points = 1000;
    for i in 0..n_points {
        let kp = i as f64 * 0.025;
        let (x, y) = route_position(kp);
        let depth = -45.0 - 15.0 * (kp / 4.0).sin() + jitter.noise(0.3);
        let label = if i % 200 == 0 { "checkpoint" } else { "survey" };

        writer.write_record([
            format!("{kp:.3}"),
            format!("{:.2}", x + jitter.noise(0.5)),
            format!("{:.2}", y + jitter.noise(0.5)),
            format!("{depth:.2}"),
            label.to_string(),
        ])?;
    }
    writer.flush()?;

    println!("Wrote {n_points} survey points to {output_path}");
    Ok(())
}
