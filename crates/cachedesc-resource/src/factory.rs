//! 依副檔名選擇資源工廠

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// 資源類型（由副檔名決定）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    /// 一般檔案
    File,
    /// 圖片
    Image,
    /// 頁面模板
    Template,
    /// 第三方擴充類型
    Custom(String),
}

/// 資源工廠註冊表
///
/// 副檔名對應到資源類型，未註冊的副檔名使用預設類型（一般檔案）。
/// 副檔名不分大小寫。
#[derive(Debug, Clone)]
pub struct FactoryRegistry {
    by_extension: HashMap<String, ResourceKind>,
    default_kind: ResourceKind,
}

impl FactoryRegistry {
    /// 創建空的註冊表
    pub fn new() -> Self {
        Self {
            by_extension: HashMap::new(),
            default_kind: ResourceKind::File,
        }
    }

    /// 建構器模式：註冊副檔名
    pub fn with_kind(mut self, extension: &str, kind: ResourceKind) -> Self {
        self.register(extension, kind);
        self
    }

    /// 註冊副檔名（覆蓋既有註冊）
    pub fn register(&mut self, extension: &str, kind: ResourceKind) {
        let extension = normalize_extension(extension);
        tracing::debug!(extension = %extension, ?kind, "註冊資源工廠");
        self.by_extension.insert(extension, kind);
    }

    /// 查詢副檔名對應的資源類型
    pub fn kind_for(&self, extension: Option<&str>) -> ResourceKind {
        extension
            .map(normalize_extension)
            .and_then(|ext| self.by_extension.get(&ext))
            .unwrap_or(&self.default_kind)
            .clone()
    }

    /// 查詢路徑對應的資源類型
    pub fn kind_for_path(&self, path: &Path) -> ResourceKind {
        self.kind_for(path.extension().and_then(|ext| ext.to_str()))
    }

    /// 已註冊的副檔名數量
    pub fn len(&self) -> usize {
        self.by_extension.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_extension.is_empty()
    }
}

impl Default for FactoryRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim_start_matches('.').to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn registry() -> FactoryRegistry {
        FactoryRegistry::new()
            .with_kind("gif", ResourceKind::Image)
            .with_kind(".pt", ResourceKind::Template)
    }

    #[rstest]
    #[case("test.gif", ResourceKind::Image)]
    #[case("TEST.GIF", ResourceKind::Image)]
    #[case("page.pt", ResourceKind::Template)]
    #[case("test.txt", ResourceKind::File)]
    #[case("README", ResourceKind::File)]
    fn test_kind_for_path(#[case] path: &str, #[case] expected: ResourceKind) {
        assert_eq!(registry().kind_for_path(Path::new(path)), expected);
    }

    #[test]
    fn test_register_overrides() {
        let mut factories = registry();
        factories.register("GIF", ResourceKind::Custom("sprite".to_string()));

        assert_eq!(factories.len(), 2);
        assert_eq!(
            factories.kind_for(Some("gif")),
            ResourceKind::Custom("sprite".to_string())
        );
        assert_eq!(factories.kind_for(None), ResourceKind::File);
    }
}
