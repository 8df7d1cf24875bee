//! JSON-lines interaction source.

use std::fs::File;
use std::io::{BufRead, BufReader};

use basket_core::{InteractionRecord, InteractionSource, SourceError};
use camino::Utf8PathBuf;

/// Interaction source reading one JSON record per line.
///
/// Lines deserialise into [`InteractionRecord`]; blank lines are skipped.
/// Records are returned in file order, which keeps index assignment
/// reproducible across runs over the same file.
///
/// # Examples
///
/// ```no_run
/// use basket_core::InteractionSource;
/// use basket_data::JsonlInteractions;
///
/// let source = JsonlInteractions::new("interactions.jsonl");
/// let records = source.fetch().expect("readable history");
/// println!("{} records", records.len());
/// ```
#[derive(Debug, Clone)]
pub struct JsonlInteractions {
    path: Utf8PathBuf,
}

impl JsonlInteractions {
    /// Creates a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl InteractionSource for JsonlInteractions {
    fn fetch(&self) -> Result<Vec<InteractionRecord>, SourceError> {
        let file = File::open(self.path.as_std_path()).map_err(|source| SourceError::Io {
            origin: self.path.to_string(),
            source,
        })?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for (number, line) in reader.lines().enumerate() {
            let line = line.map_err(|source| SourceError::Io {
                origin: self.path.to_string(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let record =
                serde_json::from_str::<InteractionRecord>(&line).map_err(|source| {
                    SourceError::Malformed {
                        origin: self.path.to_string(),
                        line: number + 1,
                        source: Box::new(source),
                    }
                })?;
            records.push(record);
        }
        log::info!("read {} interaction records from {}", records.len(), self.path);
        Ok(records)
    }
}
