use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// BranchName関連のエラー
#[derive(Debug, Error, PartialEq)]
pub enum BranchNameError {
    #[error("Branch name cannot be empty")]
    Empty,

    #[error("Branch name too long: {0} characters (max: 255)")]
    TooLong(usize),

    #[error("Invalid character in branch name: {0:?}")]
    InvalidCharacter(char),

    #[error("Branch name cannot start with '-': {0}")]
    StartsWithHyphen(String),

    #[error("Branch name cannot end with '.lock': {0}")]
    EndsWithLock(String),

    #[error("Branch name contains consecutive dots: {0}")]
    ConsecutiveDots(String),

    #[error("Reserved branch name: {0}")]
    Reserved(String),
}

/// Gitブランチ名の値オブジェクト
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName {
    /// 検証済みブランチ名
    name: String,
}

impl BranchName {
    /// 新しいBranchNameインスタンスを作成
    pub fn new(name: &str) -> Result<Self, BranchNameError> {
        Self::validate(name)?;
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// ブランチ名の妥当性を検証
    fn validate(name: &str) -> Result<(), BranchNameError> {
        if name.is_empty() {
            return Err(BranchNameError::Empty);
        }

        if name.len() > 255 {
            return Err(BranchNameError::TooLong(name.len()));
        }

        if name.starts_with('-') {
            return Err(BranchNameError::StartsWithHyphen(name.to_string()));
        }

        if name.ends_with(".lock") {
            return Err(BranchNameError::EndsWithLock(name.to_string()));
        }

        if matches!(name, "HEAD" | "ORIG_HEAD" | "FETCH_HEAD" | "MERGE_HEAD") {
            return Err(BranchNameError::Reserved(name.to_string()));
        }

        // ASCII制御文字、スペース、~、^、:、?、*、[、\
        if let Some(ch) = name.chars().find(|&ch| {
            ch.is_ascii_control() || matches!(ch, ' ' | '~' | '^' | ':' | '?' | '*' | '[' | '\\')
        }) {
            return Err(BranchNameError::InvalidCharacter(ch));
        }

        if name.contains("..") {
            return Err(BranchNameError::ConsecutiveDots(name.to_string()));
        }

        Ok(())
    }

    /// ブランチ名を文字列として取得
    pub fn as_str(&self) -> &str {
        &self.name
    }

    /// 対応するリモート追跡ブランチ名（`origin/<name>`）
    pub fn remote_tracking(&self, remote: &str) -> String {
        format!("{}/{}", remote, self.name)
    }
}

impl Default for BranchName {
    fn default() -> Self {
        Self {
            name: "master".to_string(),
        }
    }
}

impl fmt::Display for BranchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl TryFrom<String> for BranchName {
    type Error = BranchNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::validate(&value)?;
        Ok(Self { name: value })
    }
}

impl From<BranchName> for String {
    fn from(value: BranchName) -> Self {
        value.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_branch_names() {
        for name in ["main", "master", "feature/ci-trigger", "release-1.2", "user_x/fix"] {
            assert!(BranchName::new(name).is_ok(), "{name} should be valid");
        }
    }

    #[test]
    fn test_invalid_branch_names() {
        assert_eq!(BranchName::new(""), Err(BranchNameError::Empty));
        assert!(matches!(
            BranchName::new("-oops"),
            Err(BranchNameError::StartsWithHyphen(_))
        ));
        assert!(matches!(
            BranchName::new("topic.lock"),
            Err(BranchNameError::EndsWithLock(_))
        ));
        assert!(matches!(
            BranchName::new("a..b"),
            Err(BranchNameError::ConsecutiveDots(_))
        ));
        assert_eq!(
            BranchName::new("has space"),
            Err(BranchNameError::InvalidCharacter(' '))
        );
        assert!(matches!(
            BranchName::new("HEAD"),
            Err(BranchNameError::Reserved(_))
        ));
        assert!(matches!(
            BranchName::new(&"x".repeat(256)),
            Err(BranchNameError::TooLong(256))
        ));
    }

    #[test]
    fn test_remote_tracking_name() {
        let branch = BranchName::new("master").unwrap();
        assert_eq!(branch.remote_tracking("origin"), "origin/master");
        assert_eq!(branch.to_string(), "master");
    }

    #[test]
    fn test_serde_round_trip_validates() {
        let branch: BranchName = serde_yaml::from_str("develop").unwrap();
        assert_eq!(branch.as_str(), "develop");
        assert!(serde_yaml::from_str::<BranchName>("\"bad name\"").is_err());
    }
}
