//! 快取鍵（相依屬性快照）

use serde::{Deserialize, Serialize};

use crate::{AttrValue, Attributes, Result};

/// 快取鍵
///
/// 形狀由相依屬性的數量決定，同一個綁定永遠產生同一種形狀：
/// - 無相依屬性 → [`CacheKey::Sentinel`]（只計算一次）
/// - 一個相依屬性 → [`CacheKey::Single`]
/// - 多個相依屬性 → [`CacheKey::Sequence`]，依宣告順序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CacheKey {
    /// 固定哨兵值
    Sentinel,
    /// 單一屬性值
    Single(AttrValue),
    /// 多個屬性值（依宣告順序）
    Sequence(Vec<AttrValue>),
}

impl CacheKey {
    /// 從實例讀取相依屬性，產生目前快照
    ///
    /// 任一屬性讀取失敗時直接回傳該錯誤。
    pub fn snapshot<A, S>(instance: &A, names: &[S]) -> Result<Self>
    where
        A: Attributes + ?Sized,
        S: AsRef<str>,
    {
        match names {
            [] => Ok(CacheKey::Sentinel),
            [name] => Ok(CacheKey::Single(instance.attribute(name.as_ref())?)),
            _ => {
                let values = names
                    .iter()
                    .map(|name| instance.attribute(name.as_ref()))
                    .collect::<Result<Vec<_>>>()?;
                Ok(CacheKey::Sequence(values))
            }
        }
    }

    /// 是否為哨兵鍵
    pub fn is_sentinel(&self) -> bool {
        matches!(self, CacheKey::Sentinel)
    }

    /// 快照中的屬性值數量
    pub fn arity(&self) -> usize {
        match self {
            CacheKey::Sentinel => 0,
            CacheKey::Single(_) => 1,
            CacheKey::Sequence(values) => values.len(),
        }
    }
}
