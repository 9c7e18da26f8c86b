//! Outbound request shape handed to a dispatch gate

use std::fmt;
use std::path::Path;

use serde_json::Value;

use crate::route::Route;

/// Attachment sent as a multipart part
#[derive(Clone, PartialEq, Eq)]
pub struct File {
    pub filename: String,
    pub data: Vec<u8>,
}

impl File {
    pub fn new(filename: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            data: data.into(),
        }
    }

    /// Read a file from disk, naming the part after the file
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let filename = path
            .file_name()
            .map_or_else(|| "file".to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self { filename, data })
    }
}

impl fmt::Debug for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("File")
            .field("filename", &self.filename)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Verb and route plus an optional JSON body, attachment and audit reason
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub route: Route,
    pub payload: Option<Value>,
    pub file: Option<File>,
    /// Shown in the guild audit log
    pub reason: Option<String>,
}

impl Request {
    pub fn new(route: Route) -> Self {
        Self {
            route,
            payload: None,
            file: None,
            reason: None,
        }
    }

    #[must_use]
    pub fn json(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    #[must_use]
    pub fn file(mut self, file: File) -> Self {
        self.file = Some(file);
        self
    }

    #[must_use]
    pub fn reason(mut self, reason: Option<&str>) -> Self {
        self.reason = reason.map(String::from);
        self
    }
}

impl From<Route> for Request {
    fn from(route: Route) -> Self {
        Self::new(route)
    }
}
