use std::path::{Component, Path, PathBuf};

/// 不要ファイルリストの1エントリ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnwantedEntry {
    /// 設定ファイル上の行（前後の空白を除去済み）
    raw: String,
    /// 1始まりの行番号
    line: usize,
}

impl UnwantedEntry {
    pub fn new(raw: impl Into<String>, line: usize) -> Self {
        Self {
            raw: raw.into(),
            line,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn as_path(&self) -> &Path {
        Path::new(&self.raw)
    }

    /// ベースディレクトリ内に収まる相対パスとして正規化する
    ///
    /// 絶対パスや `..` でベースディレクトリの外に出るエントリは `None`。
    pub fn normalized_relative(&self) -> Option<PathBuf> {
        let mut normalized = PathBuf::new();
        for component in self.as_path().components() {
            match component {
                Component::Normal(part) => normalized.push(part),
                Component::CurDir => {}
                Component::ParentDir => {
                    if !normalized.pop() {
                        return None;
                    }
                }
                Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        if normalized.as_os_str().is_empty() {
            None
        } else {
            Some(normalized)
        }
    }
}

/// 不要ファイルリスト
///
/// 1行1エントリ。空行は無視し、コメント構文やエスケープは持たない。
/// 重複は除去しない（各エントリを独立に処理する）。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnwantedFileList {
    entries: Vec<UnwantedEntry>,
}

impl UnwantedFileList {
    /// テキストからリストを構築
    pub fn parse(content: &str) -> Self {
        let entries = content
            .lines()
            .enumerate()
            .filter_map(|(index, line)| {
                let trimmed = line.trim();
                (!trimmed.is_empty()).then(|| UnwantedEntry::new(trimmed, index + 1))
            })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[UnwantedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
