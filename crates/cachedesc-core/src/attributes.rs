//! 具名屬性存取

use std::collections::{BTreeMap, HashMap};

use crate::{AttrValue, CacheError, Result};

/// 擁有者實例的具名屬性讀取介面
///
/// 快取屬性透過此介面讀取相依屬性的目前值。
/// 屬性未設定時應回傳 [`CacheError::AttributeNotFound`]。
pub trait Attributes {
    /// 讀取屬性目前值
    fn attribute(&self, name: &str) -> Result<AttrValue>;

    /// 檢查屬性是否存在
    fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_ok()
    }
}

impl Attributes for HashMap<String, AttrValue> {
    fn attribute(&self, name: &str) -> Result<AttrValue> {
        self.get(name)
            .cloned()
            .ok_or_else(|| CacheError::AttributeNotFound(name.to_string()))
    }
}

impl Attributes for BTreeMap<String, AttrValue> {
    fn attribute(&self, name: &str) -> Result<AttrValue> {
        self.get(name)
            .cloned()
            .ok_or_else(|| CacheError::AttributeNotFound(name.to_string()))
    }
}

impl<A: Attributes + ?Sized> Attributes for &A {
    fn attribute(&self, name: &str) -> Result<AttrValue> {
        (**self).attribute(name)
    }
}
