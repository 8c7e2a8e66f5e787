use std::fs::{File as StdFile, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::distance::round_length;
use crate::error::{Result, TspError};
use crate::parser::Node;
use crate::solver::{Improvement, Source};

/// One output row: when the best tour improved, the tour as node ids, its length and origin.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRecord {
    pub cycle: usize,
    pub tour: Vec<usize>,
    pub length: f64,
    pub source: Source,
}

impl ResultRecord {
    /// Translates tour positions into the ids the input file used.
    pub fn from_improvement(improvement: &Improvement, nodes: &[Node]) -> Self {
        ResultRecord {
            cycle: improvement.cycle,
            tour: improvement.tour.iter().map(|&idx| nodes[idx].id).collect(),
            length: round_length(improvement.length),
            source: improvement.source,
        }
    }

    /// `cycle,"[id, id, ...]",length,F|R`
    pub fn to_csv_row(&self) -> String {
        let ids: Vec<String> = self.tour.iter().map(|id| id.to_string()).collect();
        format!(
            "{},\"[{}]\",{:.3},{}",
            self.cycle,
            ids.join(", "),
            self.length,
            self.source
        )
    }
}

/// Destination for run results.
pub trait ResultSink {
    fn record_improvement(&mut self, record: &ResultRecord) -> Result<()>;

    /// Called once per finished run with its final best.
    fn record_summary(&mut self, record: &ResultRecord) -> Result<()>;

    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Appends rows to a CSV file, creating it if needed. Earlier runs' rows are kept.
///
/// Every improvement gets a row, then each run's summary. With `summary_only`
/// only the summaries are written.
pub struct CsvResultSink {
    path: PathBuf,
    writer: BufWriter<StdFile>,
    summary_only: bool,
}

impl CsvResultSink {
    pub fn append(path: impl AsRef<Path>, summary_only: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| TspError::io(&path, e))?;
        Ok(CsvResultSink {
            path,
            writer: BufWriter::new(file),
            summary_only,
        })
    }

    fn write_row(&mut self, record: &ResultRecord) -> Result<()> {
        writeln!(self.writer, "{}", record.to_csv_row()).map_err(|e| TspError::io(&self.path, e))
    }
}

impl ResultSink for CsvResultSink {
    fn record_improvement(&mut self, record: &ResultRecord) -> Result<()> {
        if !self.summary_only {
            self.write_row(record)?;
        }
        Ok(())
    }

    fn record_summary(&mut self, record: &ResultRecord) -> Result<()> {
        self.write_row(record)
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush().map_err(|e| TspError::io(&self.path, e))
    }
}

#[derive(Debug, Default)]
pub struct MemorySink {
    pub improvements: Vec<ResultRecord>,
    pub summaries: Vec<ResultRecord>,
}

impl ResultSink for MemorySink {
    fn record_improvement(&mut self, record: &ResultRecord) -> Result<()> {
        self.improvements.push(record.clone());
        Ok(())
    }

    fn record_summary(&mut self, record: &ResultRecord) -> Result<()> {
        self.summaries.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn record(cycle: usize, source: Source) -> ResultRecord {
        ResultRecord {
            cycle,
            tour: vec![3, 1, 2],
            length: 24.0,
            source,
        }
    }

    #[test]
    fn improvement_tours_use_input_ids() {
        let nodes = vec![
            Node::new(10, 0.0, 0.0),
            Node::new(20, 1.0, 0.0),
            Node::new(30, 1.0, 1.0),
        ];
        let improvement = Improvement {
            cycle: 4,
            bee_index: 2,
            source: Source::Recruit,
            tour: vec![2, 0, 1],
            length: 3.41421356,
        };
        let rec = ResultRecord::from_improvement(&improvement, &nodes);
        assert_eq!(rec.tour, vec![30, 10, 20]);
        assert_eq!(rec.length, 3.414);
        assert_eq!(rec.to_csv_row(), "4,\"[30, 10, 20]\",3.414,R");
    }

    #[test]
    fn csv_sink_appends_improvements_unless_summary_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");

        let mut quiet = CsvResultSink::append(&path, true).unwrap();
        quiet.record_improvement(&record(1, Source::Forager)).unwrap();
        quiet.record_summary(&record(2, Source::Recruit)).unwrap();
        quiet.finish().unwrap();
        drop(quiet);

        let mut chatty = CsvResultSink::append(&path, false).unwrap();
        chatty.record_improvement(&record(5, Source::Forager)).unwrap();
        chatty.record_summary(&record(5, Source::Forager)).unwrap();
        chatty.finish().unwrap();
        drop(chatty);

        let contents = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(
            lines,
            vec![
                "2,\"[3, 1, 2]\",24.000,R",
                "5,\"[3, 1, 2]\",24.000,F",
                "5,\"[3, 1, 2]\",24.000,F",
            ]
        );
    }

    #[test]
    fn memory_sink_keeps_everything() {
        let mut sink = MemorySink::default();
        sink.record_improvement(&record(1, Source::Forager)).unwrap();
        sink.record_summary(&record(1, Source::Forager)).unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.improvements.len(), 1);
        assert_eq!(sink.summaries.len(), 1);
    }
}
