use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// パイプラインのステージ
///
/// 宣言順が実行順であり、設定で並べ替えることはできない。
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Stage {
    /// 不要ファイルのアーカイブ
    Archive,
    /// CI定義ファイルの生成
    GenerateCi,
    /// リモートリポジトリとの同期
    Sync,
    /// コミットとプッシュ
    Publish,
}

impl Stage {
    /// 固定の実行順
    pub const ALL: [Stage; 4] = [Stage::Archive, Stage::GenerateCi, Stage::Sync, Stage::Publish];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Archive => "archive",
            Stage::GenerateCi => "generate-ci",
            Stage::Sync => "sync",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 実行するステージの集合
///
/// 何も選択されていない場合は全ステージを実行する。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageSelection {
    stages: BTreeSet<Stage>,
}

impl StageSelection {
    /// 全ステージ
    pub fn all() -> Self {
        Self {
            stages: Stage::ALL.into_iter().collect(),
        }
    }

    /// 指定されたステージのみ（空なら全ステージ）
    pub fn from_stages(stages: impl IntoIterator<Item = Stage>) -> Self {
        let stages: BTreeSet<Stage> = stages.into_iter().collect();
        if stages.is_empty() {
            Self::all()
        } else {
            Self { stages }
        }
    }

    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// 実行順に並んだステージ
    pub fn ordered(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.stages.contains(stage))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_means_all_stages() {
        let selection = StageSelection::from_stages(Vec::new());
        assert_eq!(selection.ordered(), Stage::ALL.to_vec());
    }

    #[test]
    fn test_selection_order_is_fixed() {
        let selection = StageSelection::from_stages([Stage::Publish, Stage::Archive]);
        assert_eq!(selection.ordered(), vec![Stage::Archive, Stage::Publish]);
        assert!(!selection.contains(Stage::Sync));
    }

    #[test]
    fn test_stage_display() {
        assert_eq!(Stage::GenerateCi.to_string(), "generate-ci");
        assert_eq!(Stage::Archive.to_string(), "archive");
    }
}
