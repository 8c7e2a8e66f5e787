use std::collections::HashSet;
use std::fs::File as StdFile;
use std::io::{BufRead, BufReader as StdBufReader};
use std::path::Path;

use crate::error::{Result, TspError};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Node {
    pub id: usize,
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub fn new(id: usize, x: f64, y: f64) -> Self {
        Node { id, x, y }
    }

    pub fn coords(&self) -> (f64, f64) {
        (self.x, self.y)
    }
}

/// Reads a node file: one `id,x,y` record per line, comma separated, no header.
///
/// Blank lines are skipped. Node order in the file defines tour positions, so
/// position `k` of a tour refers to the `k`-th record.
pub fn parse_node_file(file_path: impl AsRef<Path>) -> Result<Vec<Node>> {
    let path = file_path.as_ref();
    let file = StdFile::open(path).map_err(|e| TspError::io(path, e))?;
    parse_nodes(StdBufReader::new(file)).map_err(|e| match e {
        TspError::Io { source, .. } => TspError::io(path, source),
        other => other,
    })
}

pub fn parse_nodes(reader: impl BufRead) -> Result<Vec<Node>> {
    let mut nodes: Vec<Node> = Vec::new();
    let mut seen_ids = HashSet::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let current_line_num = idx + 1;
        let line = line_result.map_err(|e| TspError::io("<node input>", e))?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split(',').map(|s| s.trim()).collect();
        if parts.len() != 3 {
            return Err(TspError::invalid_line(
                current_line_num,
                format!("malformed node line (expected id,x,y): '{}'", line),
            ));
        }

        let id = parts[0].parse::<usize>().map_err(|e| {
            TspError::invalid_line(
                current_line_num,
                format!("invalid node id '{}': {}", parts[0], e),
            )
        })?;
        let x = parse_coord(parts[1], "x", current_line_num)?;
        let y = parse_coord(parts[2], "y", current_line_num)?;

        if !seen_ids.insert(id) {
            return Err(TspError::invalid_line(
                current_line_num,
                format!("duplicate node id {}", id),
            ));
        }
        nodes.push(Node { id, x, y });
    }

    Ok(nodes)
}

fn parse_coord(raw: &str, axis: &str, line_num: usize) -> Result<f64> {
    let value = raw.parse::<f64>().map_err(|e| {
        TspError::invalid_line(line_num, format!("invalid {} coord '{}': {}", axis, raw, e))
    })?;
    if !value.is_finite() {
        return Err(TspError::invalid_line(
            line_num,
            format!("non-finite {} coord '{}'", axis, raw),
        ));
    }
    Ok(value)
}
