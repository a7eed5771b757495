use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

/// Write a deterministic wide trade-share CSV for trying out the analyses.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Output path.
    #[arg(default_value = "sample_trade.csv")]
    output: PathBuf,
    /// Seed for the generator.
    #[arg(long, default_value_t = 42)]
    seed: u64,
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

    /// Uniform in [lo, hi).
    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// Round to one decimal, as trade shares are usually published.
fn share(v: f64) -> String {
    format!("{:.1}", (v * 10.0).round() / 10.0)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);
    let output_path = args.output.display().to_string();

    let years = ["2022", "2023", "2024"];
    let metrics = ["수출", "수입"];

    // (country, export share baseline, import share baseline)
    let countries: [(&str, f64, f64); 12] = [
        ("대한민국", 40.0, 38.0),
        ("일본", 15.0, 17.0),
        ("중국", 20.0, 17.0),
        ("미국", 8.0, 12.0),
        ("독일", 39.0, 34.0),
        ("베트남", 93.0, 88.0),
        ("싱가포르", 110.0, 95.0),
        ("네덜란드", 80.0, 72.0),
        ("멕시코", 38.0, 40.0),
        ("브라질", 15.0, 13.0),
        ("인도", 12.0, 19.0),
        ("호주", 22.0, 18.0),
    ];

    let mut wtr = csv::Writer::from_path(&args.output)
        .with_context(|| format!("creating {output_path}"))?;

    let mut period_row = vec!["국가".to_string()];
    let mut metric_row = vec![String::new()];
    for year in &years {
        for metric in &metrics {
            period_row.push(year.to_string());
            metric_row.push(metric.to_string());
        }
    }
    wtr.write_record(&period_row)?;
    wtr.write_record(&metric_row)?;

    for (country, export_base, import_base) in countries {
        let mut row = vec![country.to_string()];
        for _ in &years {
            // Roughly one cell in twenty is unpublished.
            for base in [export_base, import_base] {
                if rng.next_f64() < 0.05 {
                    row.push("-".to_string());
                } else {
                    row.push(share(base * rng.range(0.85, 1.15)));
                }
            }
        }
        wtr.write_record(&row)?;
    }
    wtr.flush().context("flushing sample CSV")?;

    log::info!(
        "wrote {} countries x {} years to {output_path}",
        countries.len(),
        years.len()
    );
    println!("Wrote {} countries to {output_path}", countries.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn output_defaults_to_sample_file() {
        Args::command().debug_assert();
        let args = Args::try_parse_from(["generate_sample"]).unwrap();
        assert_eq!(args.output, PathBuf::from("sample_trade.csv"));
        assert_eq!(args.seed, 42);
    }

    #[test]
    fn output_and_seed_can_be_given() {
        let args = Args::try_parse_from(["generate_sample", "out.csv", "--seed", "7"]).unwrap();
        assert_eq!(args.output, PathBuf::from("out.csv"));
        assert_eq!(args.seed, 7);
    }
}
