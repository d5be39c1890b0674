//! Sources of sampled records.
//!
//! The auditor only depends on [`Sampler`]; a fault returned from
//! [`Sampler::fetch_sample`] is reported for that table and never aborts the
//! audit of the others.

use std::{
    collections::BTreeSet,
    fs,
    io::{self, ErrorKind},
    path::{Component, Path, PathBuf},
};

use encoding_rs::{Encoding, UTF_8};
use indexmap::IndexMap;
use log::debug;
use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::{
    io_utils,
    sample::{Record, record_from_json},
    value::FieldValue,
};

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("table '{table}' not found in {location}")]
    NotFound { table: String, location: String },
    #[error("permission denied reading table '{table}'")]
    PermissionDenied { table: String },
    #[error("reading {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("parsing {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("parsing {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("unsupported sample format in {path:?}: {message}")]
    Format { path: PathBuf, message: String },
}

pub trait Sampler {
    /// Returns up to `max_records` records of `table`; `0` means all.
    fn fetch_sample(&self, table: &str, max_records: usize) -> Result<Vec<Record>, SampleError>;
}

/// Reads `<root>/<table>.json` or, failing that, `<root>/<table>.csv`.
///
/// JSON files hold an array of records, or an object with a `records` array
/// as exported by the source system.
#[derive(Debug, Clone)]
pub struct DirectorySampler {
    root: PathBuf,
    delimiter: Option<u8>,
    encoding: &'static Encoding,
}

impl DirectorySampler {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            delimiter: None,
            encoding: UTF_8,
        }
    }

    pub fn with_delimiter(mut self, delimiter: Option<u8>) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Table names available in the directory: file stems of `.json`,
    /// `.csv` and `.tsv` files, sorted.
    pub fn table_names(&self) -> io::Result<Vec<String>> {
        let mut names = BTreeSet::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            let supported = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| {
                    ["json", "csv", "tsv"]
                        .iter()
                        .any(|known| ext.eq_ignore_ascii_case(known))
                });
            if supported
                && path.is_file()
                && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
            {
                names.insert(stem.to_string());
            }
        }
        Ok(names.into_iter().collect())
    }

    fn locate(&self, table: &str) -> Result<PathBuf, SampleError> {
        let candidate = Path::new(table);
        let plain = candidate
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if table.trim().is_empty() || !plain || candidate.components().count() != 1 {
            return Err(SampleError::Format {
                path: self.root.clone(),
                message: format!("table name '{table}' is not a plain file name"),
            });
        }
        ["json", "csv", "tsv"]
            .iter()
            .map(|ext| self.root.join(format!("{table}.{ext}")))
            .find(|path| path.is_file())
            .ok_or_else(|| SampleError::NotFound {
                table: table.to_string(),
                location: self.root.display().to_string(),
            })
    }

    fn read_json_records(&self, table: &str, path: &Path) -> Result<Vec<Record>, SampleError> {
        let bytes = fs::read(path).map_err(|source| io_error(table, path, source))?;
        let document: JsonValue =
            serde_json::from_slice(&bytes).map_err(|source| SampleError::Json {
                path: path.to_path_buf(),
                source,
            })?;
        let items = match &document {
            JsonValue::Array(items) => items,
            JsonValue::Object(object) => match object.get("records") {
                Some(JsonValue::Array(items)) => items,
                _ => {
                    return Err(SampleError::Format {
                        path: path.to_path_buf(),
                        message: "expected an array of records or a `records` array".to_string(),
                    });
                }
            },
            _ => {
                return Err(SampleError::Format {
                    path: path.to_path_buf(),
                    message: "expected an array of records".to_string(),
                });
            }
        };
        items
            .iter()
            .enumerate()
            .map(|(idx, item)| {
                record_from_json(item).ok_or_else(|| SampleError::Format {
                    path: path.to_path_buf(),
                    message: format!("record {idx} is not an object"),
                })
            })
            .collect()
    }

    fn read_csv_records(
        &self,
        table: &str,
        path: &Path,
        max_records: usize,
    ) -> Result<Vec<Record>, SampleError> {
        let delimiter = io_utils::resolve_input_delimiter(path, self.delimiter);
        let mut reader = io_utils::open_csv_reader_from_path(path, delimiter)
            .map_err(|source| io_error(table, path, source))?;
        let csv_error = |source| SampleError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let decode_error = |err: anyhow::Error| SampleError::Format {
            path: path.to_path_buf(),
            message: err.to_string(),
        };
        let header_bytes = reader.byte_headers().map_err(csv_error)?.clone();
        let headers = io_utils::decode_record(&header_bytes, self.encoding).map_err(decode_error)?;

        let mut records = Vec::new();
        for record in reader.byte_records() {
            if max_records > 0 && records.len() >= max_records {
                break;
            }
            let record = record.map_err(csv_error)?;
            let cells = io_utils::decode_record(&record, self.encoding).map_err(decode_error)?;
            let parsed = headers
                .iter()
                .zip(cells.iter())
                .filter_map(|(name, cell)| {
                    FieldValue::from_cell(cell).map(|value| (name.clone(), value))
                })
                .collect::<Record>();
            records.push(parsed);
        }
        Ok(records)
    }
}

impl Sampler for DirectorySampler {
    fn fetch_sample(&self, table: &str, max_records: usize) -> Result<Vec<Record>, SampleError> {
        let path = self.locate(table)?;
        debug!("Reading sample for '{table}' from {path:?}");
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            let mut records = self.read_json_records(table, &path)?;
            if max_records > 0 {
                records.truncate(max_records);
            }
            Ok(records)
        } else {
            self.read_csv_records(table, &path, max_records)
        }
    }
}

fn io_error(table: &str, path: &Path, source: io::Error) -> SampleError {
    match source.kind() {
        ErrorKind::PermissionDenied => SampleError::PermissionDenied {
            table: table.to_string(),
        },
        ErrorKind::NotFound => SampleError::NotFound {
            table: table.to_string(),
            location: path.display().to_string(),
        },
        _ => SampleError::Io {
            path: path.to_path_buf(),
            source,
        },
    }
}

/// In-memory sampler for fixtures and embedding callers.
#[derive(Debug, Clone, Default)]
pub struct MemorySampler {
    tables: IndexMap<String, Vec<Record>>,
    denied: BTreeSet<String>,
}

impl MemorySampler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(mut self, table: impl Into<String>, records: Vec<Record>) -> Self {
        self.tables.insert(table.into(), records);
        self
    }

    /// Marks `table` as unreadable; fetching it yields a permission fault.
    pub fn deny(mut self, table: impl Into<String>) -> Self {
        self.denied.insert(table.into());
        self
    }
}

impl Sampler for MemorySampler {
    fn fetch_sample(&self, table: &str, max_records: usize) -> Result<Vec<Record>, SampleError> {
        if self.denied.contains(table) {
            return Err(SampleError::PermissionDenied {
                table: table.to_string(),
            });
        }
        let records = self
            .tables
            .get(table)
            .ok_or_else(|| SampleError::NotFound {
                table: table.to_string(),
                location: "memory".to_string(),
            })?;
        let take = if max_records == 0 {
            records.len()
        } else {
            max_records
        };
        Ok(records.iter().take(take).cloned().collect())
    }
}
