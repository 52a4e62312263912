use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::analysis::validation::NeighborStats;
use crate::core::domain::{GridConfig, Plane};
use crate::core::neighbors::NeighborMap;

/// Labels of a particle's neighbors, in plane order.
fn neighbor_labels(plane: &Plane, map: &NeighborMap, index: usize) -> Vec<String> {
    let particle = &plane.particles()[index];
    let mut idx: Vec<usize> = map
        .neighbors_of(particle.id())
        .map(|set| set.iter().filter_map(|id| plane.index_of(*id)).collect())
        .unwrap_or_default();
    idx.sort_unstable();
    idx.into_iter()
        .map(|j| plane.particles()[j].label().to_string())
        .collect()
}

/// One line per particle: `label radius x y "n1, n2, ..."`.
///
/// Space-delimited. Only the neighbor list is quoted, always, so it stays one
/// field even when empty.
pub fn write_text<W: Write>(writer: W, plane: &Plane, map: &NeighborMap) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(b' ')
        .has_headers(false)
        .quote_style(csv::QuoteStyle::Never)
        .from_writer(writer);

    for (i, p) in plane.particles().iter().enumerate() {
        let neighbors = format!("\"{}\"", neighbor_labels(plane, map, i).join(", "));
        out.write_record([
            p.label().to_string(),
            format!("{:.6}", p.radius()),
            format!("{:.6}", p.x()),
            format!("{:.6}", p.y()),
            neighbors,
        ])
        .with_context(|| format!("Failed to write record for {}", p.label()))?;
    }
    out.flush().context("Failed to flush output")?;
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct ParticleReport {
    pub label: String,
    pub radius: f64,
    pub x: f64,
    pub y: f64,
    pub neighbors: Vec<String>,
}

/// Machine-readable description of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub elapsed_ms: f64,
    pub method: String,
    pub side_length: f64,
    pub cell_count: usize,
    pub config: GridConfig,
    pub validated: bool,
    pub stats: NeighborStats,
    pub particles: Vec<ParticleReport>,
}

impl RunReport {
    pub fn particle_reports(plane: &Plane, map: &NeighborMap) -> Vec<ParticleReport> {
        plane
            .particles()
            .iter()
            .enumerate()
            .map(|(i, p)| ParticleReport {
                label: p.label().to_string(),
                radius: p.radius(),
                x: p.x(),
                y: p.y(),
                neighbors: neighbor_labels(plane, map, i),
            })
            .collect()
    }
}

pub fn write_json<W: Write>(writer: W, report: &RunReport) -> Result<()> {
    serde_json::to_writer_pretty(writer, report).context("Failed to serialize run report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::domain::Particle;

    fn sample() -> (Plane, NeighborMap) {
        let a = Particle::new("p_0", 0.5, 1.0, 1.0).unwrap();
        let b = Particle::new("p_1", 0.25, 1.0, 2.0).unwrap();
        let c = Particle::new("p_2", 0.0, 8.0, 8.0).unwrap();
        let (ia, ib) = (a.id(), b.id());
        let plane = Plane::new(10.0, vec![a, b, c]).unwrap();
        let mut map = NeighborMap::for_plane(&plane);
        map.insert_pair(ia, ib);
        (plane, map)
    }

    #[test]
    fn text_output_reads_back_as_five_fields() {
        let (plane, map) = sample();
        let mut buf = Vec::new();
        write_text(&mut buf, &plane, &map).unwrap();

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b' ')
            .has_headers(false)
            .from_reader(buf.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 3);
        assert_eq!(&rows[0][0], "p_0");
        assert_eq!(&rows[0][1], "0.500000");
        assert_eq!(&rows[0][4], "p_1");
        assert_eq!(&rows[1][4], "p_0");
        assert_eq!(&rows[2][4], "");
    }

    #[test]
    fn text_output_quotes_only_the_neighbor_list() {
        let (plane, map) = sample();
        let mut buf = Vec::new();
        write_text(&mut buf, &plane, &map).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "p_0 0.500000 1.000000 1.000000 \"p_1\"");
        assert_eq!(lines[1], "p_1 0.250000 1.000000 2.000000 \"p_0\"");
        assert_eq!(lines[2], "p_2 0.000000 8.000000 8.000000 \"\"");
    }

    #[test]
    fn report_lists_neighbors_by_label() {
        let (plane, map) = sample();
        let reports = RunReport::particle_reports(&plane, &map);
        assert_eq!(reports[0].neighbors, vec!["p_1".to_string()]);
        assert!(reports[2].neighbors.is_empty());
    }
}
