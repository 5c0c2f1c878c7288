//! Result persistence and console progress.

use serde::Serialize;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::AnalyzedEmail;

/// Errors that can occur while writing results.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to serialize results: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Serializes `value` as JSON indented by four spaces.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Writes `results` as a JSON array to `path`, replacing any existing file.
pub fn write_results(path: &Path, results: &[AnalyzedEmail]) -> Result<(), WriteError> {
    let bytes = to_pretty_json(results)?;
    std::fs::write(path, bytes).map_err(|source| WriteError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), count = results.len(), "Wrote results");
    Ok(())
}

/// Echoes rows to a human-facing stream as they are produced.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Prints one analyzed email.
    pub fn report(&mut self, row: &AnalyzedEmail) {
        let result = to_pretty_json(row)
            .map_err(io::Error::from)
            .and_then(|bytes| {
                self.out.write_all(&bytes)?;
                self.out.write_all(b"\n")
            });
        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to echo result");
        }
    }

    /// Prints the completion banner once results are on disk.
    pub fn complete(&mut self, path: &Path) {
        if let Err(e) = writeln!(
            self.out,
            "\nAnalysis complete! Results saved to '{}'",
            path.display()
        ) {
            tracing::warn!(error = %e, "Failed to echo completion");
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Classification;
    use pretty_assertions::assert_eq;

    fn row(id: &str) -> AnalyzedEmail {
        AnalyzedEmail::new(id, "Meeting", "bob@x.com", Classification::new("work", "neutral"))
    }

    #[test]
    fn writes_indented_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");

        write_results(&path, &[row("1")]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "[\n    {\n        \"id\": \"1\",\n        \"subject\": \"Meeting\",\n        \"sender\": \"bob@x.com\",\n        \"category\": \"work\",\n        \"emotion\": \"neutral\"\n    }\n]"
        );
    }

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        std::fs::write(&path, "x".repeat(4096)).unwrap();

        write_results(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.json");

        let err = write_results(&path, &[row("1")]).unwrap_err();
        assert!(matches!(err, WriteError::Io { .. }));
    }

    #[test]
    fn reporter_echoes_rows_and_banner() {
        let mut reporter = ConsoleReporter::new(Vec::new());
        reporter.report(&row("1"));
        reporter.complete(Path::new("results.json"));

        let output = String::from_utf8(reporter.into_inner()).unwrap();
        assert!(output.starts_with("{\n    \"id\": \"1\","));
        assert!(output.ends_with("\nAnalysis complete! Results saved to 'results.json'\n"));
    }
}
