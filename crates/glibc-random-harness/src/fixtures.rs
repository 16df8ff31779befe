//! Fixture loading and management.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// A single reference stream: `count` outputs of `seed`, after `skip` draws.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Seed passed to `srandom`. Accepts a number or a `"0x..."` string.
    #[serde(
        deserialize_with = "deserialize_seed",
        serialize_with = "serialize_seed"
    )]
    pub seed: u32,
    /// Outputs compared after the skipped prefix.
    pub count: usize,
    /// Outputs drawn and discarded before comparison starts.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub skip: usize,
    /// Exact outputs expected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_outputs: Option<Vec<u32>>,
    /// Hex SHA-256 of the outputs as little-endian `u32` words.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_sha256: Option<String>,
}

/// A collection of fixture cases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Function family name.
    pub family: String,
    /// UTC timestamp of capture.
    pub captured_at: String,
    /// Where the expectations came from (host libc, published vectors, ...).
    #[serde(default)]
    pub source: String,
    /// Individual test cases.
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &std::path::Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let set = Self::from_json(&content)?;
        Ok(set)
    }

    /// Loads every `*.json` file in `dir`, sorted by file name.
    ///
    /// Files that fail to parse are returned alongside their error rather than
    /// aborting the load.
    pub fn load_dir(
        dir: &std::path::Path,
    ) -> std::io::Result<Vec<(std::path::PathBuf, Result<Self, String>)>> {
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                paths.push(path);
            }
        }
        paths.sort();
        Ok(paths
            .into_iter()
            .map(|path| {
                let set = Self::from_file(&path).map_err(|e| e.to_string());
                (path, set)
            })
            .collect())
    }
}

/// Hex SHA-256 over `outputs` encoded as little-endian `u32` words.
#[must_use]
pub fn sequence_digest(outputs: &[u32]) -> String {
    let mut hasher = Sha256::new();
    for v in outputs {
        hasher.update(v.to_le_bytes());
    }
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

fn is_zero(v: &usize) -> bool {
    *v == 0
}

fn serialize_seed<S>(seed: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u32(*seed)
}

fn deserialize_seed<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    parse_seed_value(&value).map_err(de::Error::custom)
}

pub(crate) fn parse_seed_value(value: &serde_json::Value) -> Result<u32, String> {
    match value {
        serde_json::Value::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| format!("seed {n} is not a 32-bit unsigned integer")),
        serde_json::Value::String(s) => parse_seed(s),
        other => Err(format!("seed must be a number or string, got {other}")),
    }
}

/// Parses a decimal or `0x`-prefixed hexadecimal seed.
pub fn parse_seed(text: &str) -> Result<u32, String> {
    let text = text.trim();
    let parsed = match text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|e| format!("invalid seed '{text}': {e}"))
}
