//! Loading the configuration schema over HTTP or from disk.

use std::{path::PathBuf, time::Duration};

use serde_json::Value;
use tomlforms::{data::schema::Schema, error::FetchError};

const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Where the schema is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaSource {
    /// Downloaded over HTTP(S).
    Url(String),
    /// Read from a local file.
    File(PathBuf),
}

impl SchemaSource {
    /// `http://` and `https://` arguments are URLs, anything else a path.
    pub fn from_arg(arg: &str) -> Self {
        if arg.starts_with("http://") || arg.starts_with("https://") {
            Self::Url(arg.to_string())
        } else {
            Self::File(PathBuf::from(arg))
        }
    }

    /// Load and parse the schema.
    pub async fn fetch(self) -> Result<Schema, FetchError> {
        let json = match self {
            Self::Url(url) => download(&url).await?,
            Self::File(path) => {
                let text = tokio::fs::read_to_string(&path).await.map_err(|e| {
                    FetchError::Transport(format!("failed to read {}: {e}", path.display()))
                })?;
                serde_json::from_str(&text)?
            }
        };
        let schema = Schema::from_json(&json)?;
        info!("schema has {} modules", schema.module_names().count());
        Ok(schema)
    }
}

async fn download(url: &str) -> Result<Value, FetchError> {
    info!("downloading schema from {url}");
    let client = reqwest::Client::builder()
        .timeout(FETCH_TIMEOUT)
        .user_agent(concat!("starconf/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| FetchError::Transport(format!("failed to create HTTP client: {e}")))?;

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::Transport(format!("failed to download from {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(FetchError::Transport(format!(
            "HTTP error {}: {url}",
            response.status()
        )));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| FetchError::Transport(format!("failed to read response body: {e}")))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_from_arg() {
        assert_eq!(
            SchemaSource::from_arg("https://starship.rs/config-schema.json"),
            SchemaSource::Url("https://starship.rs/config-schema.json".into())
        );
        assert_eq!(
            SchemaSource::from_arg("./schema.json"),
            SchemaSource::File("./schema.json".into())
        );
    }

    #[tokio::test]
    async fn test_fetch_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(
            &path,
            r#"{"time": [{"name": "time_format", "type": "string"},
                         {"name": "disabled", "type": "boolean", "default": true}]}"#,
        )
        .unwrap();

        let schema = SchemaSource::File(path).fetch().await.unwrap();
        let time = schema.module("time").unwrap();
        assert_eq!(time.len(), 2);
        assert_eq!(time[0].name, "time_format");
    }

    #[tokio::test]
    async fn test_missing_file_is_a_fetch_error() {
        let err = SchemaSource::File("/nonexistent/schema.json".into())
            .fetch()
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[tokio::test]
    async fn test_bad_json_is_a_fetch_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("schema.json");
        fs::write(&path, "{ not json").unwrap();
        let err = SchemaSource::File(path).fetch().await.unwrap_err();
        assert!(matches!(err, FetchError::Json(_)));
    }
}
