use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::domain::{CellCount, GridConfig, Particle, Plane};

/// Parsed run description.
///
/// Text layout, one value per line:
/// ```text
/// N          particle count
/// L          side length
/// M | -      cell count, `-` for automatic sizing
/// r_c        interaction radius
/// true|false periodic boundaries
/// r_1 .. r_N one radius per line
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSpec {
    pub side_length: f64,
    pub cell_count: CellCount,
    pub interaction_radius: f64,
    pub periodic: bool,
    pub radii: Vec<f64>,
}

impl InputSpec {
    /// Reads a text input, or JSON when the path ends in `.json`.
    pub fn from_path(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file {}", path.display()))?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse JSON input {}", path.display()))
        } else {
            text.parse()
                .with_context(|| format!("Failed to parse input file {}", path.display()))
        }
    }

    pub fn particle_count(&self) -> usize {
        self.radii.len()
    }

    pub fn grid_config(&self) -> Result<GridConfig> {
        GridConfig::new(self.cell_count, self.interaction_radius, self.periodic)
            .context("Invalid grid configuration")
    }
}

impl FromStr for InputSpec {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut lines = s
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .enumerate();

        let mut next = |what: &str| {
            lines
                .next()
                .map(|(i, l)| (i + 1, l))
                .ok_or_else(|| anyhow!("Missing {} line", what))
        };

        let (line, raw) = next("particle count")?;
        let count: usize = raw
            .parse()
            .with_context(|| format!("line {}: invalid particle count '{}'", line, raw))?;

        let (line, raw) = next("side length")?;
        let side_length: f64 = raw
            .parse()
            .with_context(|| format!("line {}: invalid side length '{}'", line, raw))?;

        let (line, raw) = next("cell count")?;
        let cell_count = if raw == "-" {
            CellCount::Auto
        } else {
            CellCount::Fixed(
                raw.parse()
                    .with_context(|| format!("line {}: invalid cell count '{}'", line, raw))?,
            )
        };

        let (line, raw) = next("interaction radius")?;
        let interaction_radius: f64 = raw
            .parse()
            .with_context(|| format!("line {}: invalid interaction radius '{}'", line, raw))?;

        let (line, raw) = next("periodic flag")?;
        let periodic = match raw.to_ascii_lowercase().as_str() {
            "true" => true,
            "false" => false,
            other => bail!("line {}: periodic flag must be true or false, got '{}'", line, other),
        };

        let mut radii = Vec::with_capacity(count);
        for (i, raw) in lines {
            let r: f64 = raw
                .parse()
                .with_context(|| format!("line {}: invalid radius '{}'", i + 1, raw))?;
            radii.push(r);
        }

        if radii.len() != count {
            bail!(
                "Particle count does not match the amount of radii provided ({} declared, {} found)",
                count,
                radii.len()
            );
        }

        Ok(Self {
            side_length,
            cell_count,
            interaction_radius,
            periodic,
            radii,
        })
    }
}

/// Deterministic generator when `seed` is given, entropy-seeded otherwise.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Places one particle per radius uniformly in `[0, L)²`, labelled `p_0`, `p_1`, ...
pub fn place_randomly<R: Rng + ?Sized>(spec: &InputSpec, rng: &mut R) -> Result<Plane> {
    let l = spec.side_length;
    if !l.is_finite() || l <= 0.0 {
        bail!("side length must be positive, got {}", l);
    }

    let particles = spec
        .radii
        .iter()
        .enumerate()
        .map(|(i, &r)| {
            let x = rng.gen_range(0.0..l);
            let y = rng.gen_range(0.0..l);
            Particle::new(format!("p_{}", i), r, x, y)
        })
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to create particles")?;

    Plane::new(l, particles).context("Failed to build plane")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "3\n20\n-\n1.5\nfalse\n0.25\n0.5\n0.1\n";

    #[test]
    fn parses_text_layout() {
        let spec: InputSpec = SAMPLE.parse().unwrap();
        assert_eq!(spec.particle_count(), 3);
        assert_eq!(spec.cell_count, CellCount::Auto);
        assert!(!spec.periodic);
        assert!((spec.side_length - 20.0).abs() < 1e-12);
        assert!((spec.interaction_radius - 1.5).abs() < 1e-12);
        assert_eq!(spec.radii, vec![0.25, 0.5, 0.1]);
    }

    #[test]
    fn parses_fixed_cell_count_and_periodic() {
        let spec: InputSpec = "1\n10\n4\n1\nTRUE\n0.3\n".parse().unwrap();
        assert_eq!(spec.cell_count, CellCount::Fixed(4));
        assert!(spec.periodic);
    }

    #[test]
    fn rejects_count_mismatch() {
        let err = "3\n10\n-\n1\nfalse\n0.1\n".parse::<InputSpec>().unwrap_err();
        assert!(err.to_string().contains("does not match"));
    }

    #[test]
    fn rejects_bad_flag() {
        assert!("1\n10\n-\n1\nmaybe\n0.1\n".parse::<InputSpec>().is_err());
    }

    #[test]
    fn seeded_placement_is_reproducible() {
        let spec: InputSpec = SAMPLE.parse().unwrap();
        let a = place_randomly(&spec, &mut seeded_rng(Some(7))).unwrap();
        let b = place_randomly(&spec, &mut seeded_rng(Some(7))).unwrap();
        for (p, q) in a.particles().iter().zip(b.particles()) {
            assert_eq!(p.position(), q.position());
            assert_eq!(p.label(), q.label());
        }
        assert_eq!(a.particles()[2].label(), "p_2");
        assert!(a
            .particles()
            .iter()
            .all(|p| (0.0..20.0).contains(&p.x()) && (0.0..20.0).contains(&p.y())));
    }
}
