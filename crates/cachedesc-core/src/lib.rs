//! # Cachedesc Core
//!
//! 核心資料模型與類型定義

pub mod attributes;
pub mod config;
pub mod key;

// Re-export 主要類型
pub use attributes::Attributes;
pub use config::BindingConfig;
pub use key::CacheKey;

/// 屬性值（以 JSON 值表示，相等性即結構相等）
pub type AttrValue = serde_json::Value;

/// 快取錯誤類型
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CacheError {
    #[error("找不到屬性: {0}")]
    AttributeNotFound(String),

    #[error("無法讀取屬性 {name}: {reason}")]
    AttributeRead { name: String, reason: String },

    #[error("計算失敗: {0}")]
    Compute(String),

    #[error("快取槽 {slot} 存放的值類型不符（綁定: {binding}）")]
    SlotMismatch { slot: String, binding: String },

    #[error("綁定 {binding} 的快取槽正在使用中，不可重入")]
    Reentrant { binding: String },

    #[error("重複的綁定名稱: {0}")]
    DuplicateBinding(String),

    #[error("無效的配置: {0}")]
    Config(String),
}

impl CacheError {
    /// 建立計算失敗錯誤
    pub fn compute(message: impl Into<String>) -> Self {
        Self::Compute(message.into())
    }

    /// 是否為相依屬性讀取失敗
    pub fn is_dependency_failure(&self) -> bool {
        matches!(
            self,
            CacheError::AttributeNotFound(_) | CacheError::AttributeRead { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, CacheError>;
