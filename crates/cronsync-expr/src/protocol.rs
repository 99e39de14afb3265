//! Resource protocols and API response formats.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Resource prefix carried by a job's URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiProtocol {
    Uri,
    File,
    Ftp,
    Hdfs,
}

impl ApiProtocol {
    pub const ALL: [ApiProtocol; 4] = [
        ApiProtocol::Uri,
        ApiProtocol::File,
        ApiProtocol::Ftp,
        ApiProtocol::Hdfs,
    ];

    pub fn prefix(self) -> &'static str {
        match self {
            ApiProtocol::Uri => "uri://",
            ApiProtocol::File => "file://",
            ApiProtocol::Ftp => "ftp://",
            ApiProtocol::Hdfs => "hdfs://",
        }
    }

    /// Exact prefix lookup. Anything unrecognized is [`ApiProtocol::Uri`].
    pub fn from_prefix(prefix: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| p.prefix() == prefix)
            .unwrap_or(ApiProtocol::Uri)
    }

    /// Classify the leading prefix of `url`.
    pub fn of(url: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|p| url.starts_with(p.prefix()))
            .unwrap_or(ApiProtocol::Uri)
    }

    /// `url` with one leading recognized prefix removed.
    pub fn strip(url: &str) -> &str {
        Self::ALL
            .into_iter()
            .find_map(|p| url.strip_prefix(p.prefix()))
            .unwrap_or(url)
    }
}

/// Response format requested from the fetch proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFormat {
    #[default]
    Json,
    Xml,
    Csv,
    Text,
    File,
    Stream,
}

impl ApiFormat {
    pub const ALL: [ApiFormat; 6] = [
        ApiFormat::Json,
        ApiFormat::Xml,
        ApiFormat::Csv,
        ApiFormat::Text,
        ApiFormat::File,
        ApiFormat::Stream,
    ];

    /// Upper-case name, e.g. `JSON`.
    pub fn name(self) -> &'static str {
        match self {
            ApiFormat::Json => "JSON",
            ApiFormat::Xml => "XML",
            ApiFormat::Csv => "CSV",
            ApiFormat::Text => "TEXT",
            ApiFormat::File => "FILE",
            ApiFormat::Stream => "STREAM",
        }
    }

    /// Case-insensitive lookup. Unknown names are [`ApiFormat::Text`].
    pub fn from_name(name: &str) -> Self {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(name))
            .unwrap_or(ApiFormat::Text)
    }

    pub fn media_type(self) -> &'static str {
        match self {
            ApiFormat::Json => "application/json",
            ApiFormat::Xml => "application/xml",
            ApiFormat::Csv | ApiFormat::Text => "text/plain",
            ApiFormat::File | ApiFormat::Stream => "application/octet-stream",
        }
    }
}

impl fmt::Display for ApiFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
