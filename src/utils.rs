use std::collections::HashMap;
use std::fs::File as StdFile;
use std::io::{BufRead, BufReader as StdBufReader};
use std::path::Path;

use crate::error::{Result, TspError};

/// Reads known shortest tour lengths, one `name: length` entry per line.
///
/// Names are lower-cased; anything after the first word of either side is ignored,
/// so `data_10 (random): 290.31 best known` maps `data_10` to `290.31`.
pub fn load_reference_lengths(file_path: impl AsRef<Path>) -> Result<HashMap<String, f64>> {
    let path = file_path.as_ref();
    let file = StdFile::open(path).map_err(|e| TspError::io(path, e))?;
    let reader = StdBufReader::new(file);
    let mut references = HashMap::new();

    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| TspError::io(path, e))?;
        let Some((name_part, value_part)) = line.split_once(':') else {
            continue;
        };
        let Some(name) = name_part.split_whitespace().next() else {
            continue;
        };
        let value_str = value_part.split_whitespace().next().unwrap_or("");
        let value = value_str.parse::<f64>().map_err(|e| {
            TspError::invalid_line(
                idx + 1,
                format!("invalid reference length for {} ('{}'): {}", name, value_str, e),
            )
        })?;
        references.insert(name.to_lowercase(), value);
    }
    Ok(references)
}

/// Lookup key for an instance: the lower-cased file stem of its node file.
pub fn instance_name(file_path: impl AsRef<Path>) -> String {
    file_path
        .as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// Percentage by which `found_length` exceeds `reference_length`.
pub fn optimality_gap(found_length: f64, reference_length: f64) -> f64 {
    if reference_length == 0.0 {
        if found_length == 0.0 { 0.0 } else { f64::INFINITY }
    } else {
        (found_length - reference_length) / reference_length * 100.0
    }
}

/// Reference length and gap for `instance`, if the reference table knows it.
pub fn evaluate_solution(
    instance: &str,
    found_length: f64,
    references: &HashMap<String, f64>,
) -> Option<(f64, f64)> {
    references
        .get(&instance.to_lowercase())
        .map(|&reference| (reference, optimality_gap(found_length, reference)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_reference_lengths() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "data_10 : 290.31").unwrap();
        writeln!(file, "DATA_12 (random): 301.5 best known").unwrap();
        writeln!(file, "no separator here").unwrap();
        let references = load_reference_lengths(file.path()).unwrap();
        assert_eq!(references.len(), 2);
        assert_eq!(references["data_10"], 290.31);
        assert_eq!(references["data_12"], 301.5);
    }

    #[test]
    fn bad_reference_value_reports_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "a: 1").unwrap();
        writeln!(file, "b: lots").unwrap();
        let err = load_reference_lengths(file.path()).unwrap_err();
        assert!(matches!(err, TspError::InvalidInput { line: Some(2), .. }));
    }

    #[test]
    fn instance_name_is_lowercase_stem() {
        assert_eq!(instance_name("data/Data_10.csv"), "data_10");
        assert_eq!(instance_name(""), "");
    }

    #[test]
    fn gap_is_relative_percentage() {
        assert_eq!(optimality_gap(110.0, 100.0), 10.0);
        assert_eq!(optimality_gap(0.0, 0.0), 0.0);
        assert!(optimality_gap(1.0, 0.0).is_infinite());

        let mut references = HashMap::new();
        references.insert("data_10".to_string(), 200.0);
        assert_eq!(
            evaluate_solution("DATA_10", 250.0, &references),
            Some((200.0, 25.0))
        );
        assert_eq!(evaluate_solution("other", 1.0, &references), None);
    }
}
