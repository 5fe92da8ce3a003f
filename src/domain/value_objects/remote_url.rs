use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// RemoteUrl関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum RemoteUrlError {
    #[error("Remote URL cannot be empty")]
    Empty,

    #[error("Invalid remote URL format: {0}")]
    InvalidFormat(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Missing host in URL: {0}")]
    MissingHost(String),

    #[error("Invalid characters in URL: {0}")]
    InvalidCharacters(String),
}

const SUPPORTED_SCHEMES: &[&str] = &["https", "http", "ssh", "git", "file"];

fn scp_like_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^(?:[A-Za-z0-9._-]+@)?[A-Za-z0-9.-]+:[^\s]+$").ok())
        .as_ref()
}

/// リモートリポジトリURLの値オブジェクト
///
/// `https://`、`ssh://`、`git://`、`file://` 形式、`git@host:owner/repo.git` 形式、
/// およびローカルに存在するパス（ベアリポジトリ等）を受け付ける。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteUrl {
    url: String,
}

impl RemoteUrl {
    /// 新しいRemoteUrlインスタンスを作成
    pub fn new(url: &str) -> Result<Self, RemoteUrlError> {
        let trimmed = url.trim();
        Self::validate(trimmed)?;
        Ok(Self {
            url: trimmed.to_string(),
        })
    }

    fn validate(url: &str) -> Result<(), RemoteUrlError> {
        if url.is_empty() {
            return Err(RemoteUrlError::Empty);
        }

        // git に渡す引数として危険な文字を拒否
        if url.starts_with('-') || url.chars().any(|c| c.is_control() || c.is_whitespace()) {
            return Err(RemoteUrlError::InvalidCharacters(url.to_string()));
        }

        if url.contains("://") {
            let parsed =
                Url::parse(url).map_err(|_| RemoteUrlError::InvalidFormat(url.to_string()))?;
            if !SUPPORTED_SCHEMES.contains(&parsed.scheme()) {
                return Err(RemoteUrlError::UnsupportedScheme(parsed.scheme().to_string()));
            }
            if parsed.scheme() != "file" && parsed.host_str().map_or(true, str::is_empty) {
                return Err(RemoteUrlError::MissingHost(url.to_string()));
            }
            return Ok(());
        }

        if Path::new(url).exists() {
            return Ok(());
        }

        if scp_like_pattern().map_or(false, |pattern| pattern.is_match(url)) {
            return Ok(());
        }

        Err(RemoteUrlError::InvalidFormat(url.to_string()))
    }

    /// URL文字列を取得
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// 末尾の `/` と `.git` を無視して同じリポジトリを指しているか判定
    pub fn same_repository(&self, other: &str) -> bool {
        fn normalize(url: &str) -> &str {
            let url = url.trim().trim_end_matches('/');
            url.strip_suffix(".git").unwrap_or(url)
        }
        normalize(&self.url) == normalize(other)
    }
}

impl fmt::Display for RemoteUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}

impl TryFrom<String> for RemoteUrl {
    type Error = RemoteUrlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<RemoteUrl> for String {
    fn from(value: RemoteUrl) -> Self {
        value.url
    }
}
