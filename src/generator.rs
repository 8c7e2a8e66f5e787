use std::fs::File as StdFile;
use std::io::{BufWriter, Write};
use std::path::Path;

use rand::Rng;

use crate::error::{Result, TspError};
use crate::parser::Node;

/// Random planar instance: ids `0..n_nodes`, integer coordinates in `[1, x_max] x [1, y_max]`.
///
/// Coordinates may repeat.
pub fn generate_nodes<R: Rng + ?Sized>(
    n_nodes: usize,
    x_max: u32,
    y_max: u32,
    rng: &mut R,
) -> Result<Vec<Node>> {
    if n_nodes < 2 {
        return Err(TspError::config("nodes", n_nodes, "at least 2 nodes are required"));
    }
    if x_max == 0 {
        return Err(TspError::config("x_max", x_max, "must be positive"));
    }
    if y_max == 0 {
        return Err(TspError::config("y_max", y_max, "must be positive"));
    }

    Ok((0..n_nodes)
        .map(|id| {
            let x = rng.random_range(1..=x_max);
            let y = rng.random_range(1..=y_max);
            Node::new(id, x as f64, y as f64)
        })
        .collect())
}

/// Writes nodes as `id,x,y` lines, the format [`crate::parser::parse_node_file`] reads.
pub fn write_node_file(file_path: impl AsRef<Path>, nodes: &[Node]) -> Result<()> {
    let path = file_path.as_ref();
    let file = StdFile::create(path).map_err(|e| TspError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    for node in nodes {
        writeln!(writer, "{},{},{}", node.id, node.x, node.y).map_err(|e| TspError::io(path, e))?;
    }
    writer.flush().map_err(|e| TspError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_node_file;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn coordinates_stay_in_bounds() {
        let mut rng = StdRng::seed_from_u64(10);
        let nodes = generate_nodes(200, 100, 50, &mut rng).unwrap();
        assert_eq!(nodes.len(), 200);
        for (idx, node) in nodes.iter().enumerate() {
            assert_eq!(node.id, idx);
            assert!((1.0..=100.0).contains(&node.x));
            assert!((1.0..=50.0).contains(&node.y));
            assert_eq!(node.x.fract(), 0.0);
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let a = generate_nodes(10, 100, 100, &mut StdRng::seed_from_u64(1)).unwrap();
        let b = generate_nodes(10, 100, 100, &mut StdRng::seed_from_u64(1)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn rejects_degenerate_requests() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(generate_nodes(1, 100, 100, &mut rng).is_err());
        assert!(generate_nodes(10, 0, 100, &mut rng).is_err());
        assert!(generate_nodes(10, 100, 0, &mut rng).is_err());
    }

    #[test]
    fn written_file_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data_12.csv");
        let nodes = generate_nodes(12, 100, 100, &mut StdRng::seed_from_u64(3)).unwrap();
        write_node_file(&path, &nodes).unwrap();
        assert_eq!(parse_node_file(&path).unwrap(), nodes);
    }
}
