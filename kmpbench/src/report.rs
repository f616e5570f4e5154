use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::BenchResult;
use crate::results::RunReport;

/// Appends plain-text run records to an output sink.
///
/// Each record is the label line, the match count line and the elapsed time
/// line, followed by a blank separator line:
///
/// ```text
/// Single thread:
/// patterns found:1874
/// time (ms): 412
///
/// ```
pub struct Reporter<W: Write> {
    out: W,
}

impl Reporter<BufWriter<File>> {
    /// Creates (or truncates) the file at `path`
    pub fn to_path(path: &Path) -> BenchResult<Self> {
        debug!("Writing reports to {}", path.display());
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl Reporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl Reporter<Box<dyn Write>> {
    /// Writes to `path` when given, otherwise to stdout
    pub fn open(path: Option<&Path>) -> BenchResult<Self> {
        Ok(match path {
            Some(path) => Self::new(Box::new(Reporter::to_path(path)?.into_inner())),
            None => Self::new(Box::new(io::stdout())),
        })
    }
}

impl<W: Write> Reporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Writes one record with a single `write_all` and flushes it.
    ///
    /// Ranks of a simple-mode run may share one stdout; a record handed over
    /// in one write stays contiguous instead of interleaving line by line.
    pub fn record(&mut self, report: &RunReport) -> BenchResult<()> {
        self.out.write_all(format_record(report).as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Renders one record, blank separator line included
pub fn format_record(report: &RunReport) -> String {
    format!(
        "{}:\npatterns found:{}\ntime (ms): {}\n\n",
        report.label,
        report.matches,
        report.elapsed_ms()
    )
}

/// Output file for one rank of a simple-mode run: `res.out` becomes `res.out.rank3`.
pub fn rank_output_path(path: &Path, rank: usize) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".rank{}", rank));
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_record_format() {
        let single = RunReport::new("Single thread", 12, 4, Duration::from_millis(35));
        let shared = RunReport::new("Shared memory", 12, 4, Duration::from_micros(900));
        let mut reporter = Reporter::new(Vec::new());
        reporter.record(&single).unwrap();
        reporter.record(&shared).unwrap();

        let text = String::from_utf8(reporter.into_inner()).unwrap();
        assert_eq!(
            text,
            "Single thread:\npatterns found:12\ntime (ms): 35\n\n\
             Shared memory:\npatterns found:12\ntime (ms): 0\n\n"
        );
    }

    /// Counts the `write` calls reaching the sink
    struct WriteCounter {
        writes: Vec<Vec<u8>>,
    }

    impl Write for WriteCounter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes.push(buf.to_vec());
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_record_is_a_single_write() {
        let first = RunReport::new("Distributed (rank 2)", 7, 3, Duration::from_millis(5));
        let second = RunReport::new("Distributed (rank 1)", 4, 3, Duration::from_millis(6));
        let mut reporter = Reporter::new(WriteCounter { writes: Vec::new() });
        reporter.record(&first).unwrap();
        reporter.record(&second).unwrap();

        let writes = reporter.into_inner().writes;
        assert_eq!(writes.len(), 2);
        assert_eq!(
            writes[0],
            b"Distributed (rank 2):\npatterns found:7\ntime (ms): 5\n\n".to_vec()
        );
    }

    #[test]
    fn test_file_sink() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("res.out");
        let report = RunReport::new("Distributed", 1, 1, Duration::from_millis(2));
        let mut reporter = Reporter::to_path(&path).unwrap();
        reporter.record(&report).unwrap();
        drop(reporter);

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Distributed:\npatterns found:1\n"));
    }

    #[test]
    fn test_open_file_or_stdout() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("boxed.out");
        let mut reporter = Reporter::open(Some(&path)).unwrap();
        reporter
            .record(&RunReport::new("Single thread", 0, 0, Duration::ZERO))
            .unwrap();
        drop(reporter);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Single thread:\npatterns found:0\ntime (ms): 0\n\n"
        );
        assert!(Reporter::open(None).is_ok());
    }

    #[test]
    fn test_rank_output_path() {
        assert_eq!(
            rank_output_path(Path::new("out/res.out"), 3),
            PathBuf::from("out/res.out.rank3")
        );
    }
}
