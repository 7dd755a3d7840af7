//! 快取屬性綁定配置

use serde::{Deserialize, Serialize};

use crate::{CacheError, Result};

/// 快取屬性綁定配置
///
/// 描述一個快取屬性的名稱與其相依屬性，可從 JSON 載入。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingConfig {
    /// 屬性名稱
    pub name: String,

    /// 相依屬性（順序即快照順序）
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// 是否為揮發屬性（首次存取時初始化，之後不再重算）
    #[serde(default)]
    pub volatile: bool,
}

impl BindingConfig {
    /// 創建新的綁定配置
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependencies: Vec::new(),
            volatile: false,
        }
    }

    /// 建構器模式：加入相依屬性
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    /// 建構器模式：設置全部相依屬性
    pub fn with_dependencies<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dependencies = names.into_iter().map(Into::into).collect();
        self
    }

    /// 建構器模式：標記為揮發屬性
    pub fn with_volatile(mut self, volatile: bool) -> Self {
        self.volatile = volatile;
        self
    }

    /// 從 JSON 字串載入多筆配置
    pub fn list_from_json(json: &str) -> Result<Vec<Self>> {
        let configs: Vec<Self> =
            serde_json::from_str(json).map_err(|e| CacheError::Config(e.to_string()))?;
        for config in &configs {
            config.validate()?;
        }
        Ok(configs)
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(CacheError::Config("屬性名稱不可為空".to_string()));
        }

        if self.volatile && !self.dependencies.is_empty() {
            return Err(CacheError::Config(format!(
                "揮發屬性 {} 不可宣告相依屬性",
                self.name
            )));
        }

        // 重複的相依屬性照樣接受，快照中出現多次
        if self.dependencies.iter().any(String::is_empty) {
            return Err(CacheError::Config(format!(
                "屬性 {} 的相依屬性名稱不可為空",
                self.name
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_config() {
        let config = BindingConfig::new("file").with_dependency("filename");

        assert_eq!(config.name, "file");
        assert_eq!(config.dependencies, vec!["filename".to_string()]);
        assert!(!config.volatile);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_json() {
        let json = r#"[
            {"name": "p0"},
            {"name": "p2", "dependencies": ["state1", "state2"]},
            {"name": "_v_data", "volatile": true}
        ]"#;

        let configs = BindingConfig::list_from_json(json).unwrap();

        assert_eq!(configs.len(), 3);
        assert!(configs[0].dependencies.is_empty());
        assert_eq!(configs[1].dependencies, vec!["state1", "state2"]);
        assert!(configs[2].volatile);
    }

    #[test]
    fn test_repeated_dependency_accepted() {
        let config = BindingConfig::new("p2").with_dependencies(["state1", "state1"]);

        assert!(config.validate().is_ok());
        assert_eq!(config.dependencies, vec!["state1", "state1"]);
    }

    #[test]
    fn test_invalid_configs() {
        // 揮發屬性不可有相依屬性
        let volatile = BindingConfig::new("_v_data")
            .with_volatile(true)
            .with_dependency("state1");
        assert!(volatile.validate().is_err());

        // 空的相依屬性名稱
        let blank = BindingConfig::new("p2").with_dependencies(["state1", ""]);
        assert!(blank.validate().is_err());

        // 空名稱
        assert!(BindingConfig::new("").validate().is_err());

        // 無效 JSON
        assert!(matches!(
            BindingConfig::list_from_json("{"),
            Err(CacheError::Config(_))
        ));
    }
}
