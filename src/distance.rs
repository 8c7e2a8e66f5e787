use rayon::prelude::*;

use crate::error::{Result, TspError};
use crate::parser::Node;

/// Decimal places kept by [`DistanceTable::tour_length`].
pub const LENGTH_DECIMALS: i32 = 3;

pub fn distance(a: (f64, f64), b: (f64, f64)) -> f64 {
    let dx = a.0 - b.0;
    let dy = a.1 - b.1;
    (dx * dx + dy * dy).sqrt()
}

pub fn round_length(length: f64) -> f64 {
    let scale = 10f64.powi(LENGTH_DECIMALS);
    (length * scale).round() / scale
}

/// Symmetric pairwise Euclidean distances, zero on the diagonal. Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceTable {
    dist_matrix: Vec<Vec<f64>>,
}

impl DistanceTable {
    pub fn build(nodes: &[Node]) -> Result<Self> {
        if nodes.len() < 2 {
            return Err(TspError::invalid_input(format!(
                "at least 2 nodes are required, found {}",
                nodes.len()
            )));
        }
        if let Some(node) = nodes.iter().find(|n| !n.x.is_finite() || !n.y.is_finite()) {
            return Err(TspError::invalid_input(format!(
                "node {} has a malformed coordinate ({}, {})",
                node.id, node.x, node.y
            )));
        }

        let dimension = nodes.len();
        // Upper triangle only, mirrored below so the table is exactly symmetric.
        let upper: Vec<Vec<f64>> = (0..dimension)
            .into_par_iter()
            .map(|i| {
                ((i + 1)..dimension)
                    .map(|j| distance(nodes[i].coords(), nodes[j].coords()))
                    .collect()
            })
            .collect();

        let mut dist_matrix = vec![vec![0.0; dimension]; dimension];
        for (i, row) in upper.iter().enumerate() {
            for (offset, &d) in row.iter().enumerate() {
                let j = i + 1 + offset;
                if !d.is_finite() {
                    return Err(TspError::Arithmetic(format!(
                        "distance between nodes {} and {} is not finite",
                        nodes[i].id, nodes[j].id
                    )));
                }
                dist_matrix[i][j] = d;
                dist_matrix[j][i] = d;
            }
        }

        Ok(DistanceTable { dist_matrix })
    }

    pub fn dimension(&self) -> usize {
        self.dist_matrix.len()
    }

    pub fn get(&self, city1_idx: usize, city2_idx: usize) -> f64 {
        self.dist_matrix[city1_idx][city2_idx]
    }

    /// Closed-cycle length of `tour`, rounded to [`LENGTH_DECIMALS`] places.
    ///
    /// Rounding keeps floating-point noise from counting as an improvement when
    /// two tours are compared. An empty tour has length zero.
    pub fn tour_length(&self, tour: &[usize]) -> f64 {
        let Some((&first, &last)) = tour.first().zip(tour.last()) else {
            return 0.0;
        };
        let open: f64 = tour.windows(2).map(|w| self.dist_matrix[w[0]][w[1]]).sum();
        round_length(open + self.dist_matrix[last][first])
    }
}
