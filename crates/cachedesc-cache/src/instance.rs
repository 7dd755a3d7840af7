//! 動態屬性實例

use std::collections::HashMap;

use cachedesc_core::{AttrValue, Attributes, CacheError, Result};

use crate::slots::{CacheHost, CacheSlots};

/// 以名稱存取屬性的動態實例
///
/// 適用於屬性集合在執行期才決定的擁有者；自帶快取槽。
#[derive(Debug, Clone, Default)]
pub struct AttributeMap {
    values: HashMap<String, AttrValue>,
    cache: CacheSlots,
}

impl AttributeMap {
    /// 創建空實例
    pub fn new() -> Self {
        Self::default()
    }

    /// 設置屬性（無條件覆寫）
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// 建構器模式：設置屬性
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.set(name, value);
        self
    }

    /// 取得屬性
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.values.get(name)
    }

    /// 移除屬性
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.values.remove(name)
    }

    /// 屬性名稱
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }
}

impl Attributes for AttributeMap {
    fn attribute(&self, name: &str) -> Result<AttrValue> {
        self.values
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::AttributeNotFound(name.to_string()))
    }
}

impl CacheHost for AttributeMap {
    fn cache_slots(&self) -> &CacheSlots {
        &self.cache
    }
}
