//! Question datasets in JSON Lines form, one Pinecone-datasets style
//! document per line:
//!
//! ```json
//! {"id": "17", "values": [0.1, ...], "blob": {"text": "How do I learn Rust?"}}
//! ```
//!
//! The question text is taken from `blob.text`, then `metadata.text`, then a
//! top-level `text` field.

use crate::errors::DatasetError;
use domain::models::QuestionRecord;
use serde::Deserialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Cursor, Lines};
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatasetSource {
    File(PathBuf),
    Url(String),
}

impl DatasetSource {
    pub fn parse(raw: &str) -> Self {
        if raw.starts_with("http://") || raw.starts_with("https://") {
            DatasetSource::Url(raw.to_string())
        } else {
            DatasetSource::File(PathBuf::from(raw))
        }
    }

    /// Open the source for line-by-line reading. Remote datasets are
    /// downloaded in full first.
    pub async fn open(&self) -> Result<Box<dyn BufRead + Send>, DatasetError> {
        match self {
            DatasetSource::File(path) => {
                info!(path = %path.display(), "opening dataset file");
                Ok(Box::new(BufReader::new(File::open(path)?)))
            }
            DatasetSource::Url(url) => {
                info!(%url, "downloading dataset");
                let bytes = reqwest::get(url)
                    .await?
                    .error_for_status()?
                    .bytes()
                    .await?;
                debug!(bytes = bytes.len(), "dataset downloaded");
                Ok(Box::new(Cursor::new(bytes.to_vec())))
            }
        }
    }
}

#[derive(Deserialize)]
struct DatasetDocument {
    id: Value,
    #[serde(default)]
    values: Option<Vec<f32>>,
    #[serde(default)]
    blob: Option<TextBlob>,
    #[serde(default)]
    metadata: Option<TextBlob>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
struct TextBlob {
    #[serde(default)]
    text: Option<String>,
}

/// Streams [`QuestionRecord`]s, skipping blank lines and records without text.
pub struct DatasetReader<R> {
    lines: Lines<R>,
    line_no: usize,
    skipped: usize,
}

impl<R: BufRead> DatasetReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            skipped: 0,
        }
    }

    /// Records dropped so far because their text was empty.
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse_line(&self, line: &str) -> Result<Option<QuestionRecord>, DatasetError> {
        let doc: DatasetDocument = serde_json::from_str(line).map_err(|source| {
            DatasetError::Malformed {
                line: self.line_no,
                source,
            }
        })?;

        let id = match doc.id {
            Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            _ => return Err(DatasetError::MissingId { line: self.line_no }),
        };

        let text = doc
            .blob
            .and_then(|b| b.text)
            .or_else(|| doc.metadata.and_then(|m| m.text))
            .or(doc.text)
            .map(|t| t.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Ok(None);
        }

        Ok(Some(QuestionRecord {
            id,
            text,
            values: doc.values.filter(|v| !v.is_empty()),
        }))
    }
}

impl<R: BufRead> Iterator for DatasetReader<R> {
    type Item = Result<QuestionRecord, DatasetError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(err.into())),
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            match self.parse_line(&line) {
                Ok(Some(record)) => return Some(Ok(record)),
                Ok(None) => {
                    self.skipped += 1;
                    continue;
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }
}
