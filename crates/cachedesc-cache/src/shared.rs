//! 執行緒安全的快取槽

use parking_lot::Mutex;

use cachedesc_core::{CacheKey, Result};

use crate::slots::CacheEntry;

/// 以互斥鎖保護的單一快取槽
///
/// 用於需要跨執行緒共用的擁有者：讀取鍵、比對、計算與寫入都在同一把鎖內，
/// 同一個鍵只會計算一次。計算函數在鎖內執行，不可重入同一個槽。
#[derive(Debug)]
pub struct SharedCacheSlot<V> {
    entry: Mutex<Option<CacheEntry<V>>>,
}

impl<V> Default for SharedCacheSlot<V> {
    fn default() -> Self {
        Self {
            entry: Mutex::new(None),
        }
    }
}

impl<V: Clone> SharedCacheSlot<V> {
    /// 創建空的快取槽
    pub fn new() -> Self {
        Self::default()
    }

    /// 取得快取值，鍵不符時計算並寫入
    pub fn get_or_compute<K, C>(&self, key: K, compute: C) -> Result<V>
    where
        K: FnOnce() -> Result<CacheKey>,
        C: FnOnce() -> Result<V>,
    {
        let mut guard = self.entry.lock();
        let key = key()?;

        if let Some(entry) = guard.as_ref().filter(|entry| entry.is_fresh(&key)) {
            return Ok(entry.value.clone());
        }

        let value = compute()?;
        *guard = Some(CacheEntry::new(key, value.clone()));
        Ok(value)
    }

    /// 已存的快取值（不論是否過期）
    pub fn peek(&self) -> Option<V> {
        self.entry.lock().as_ref().map(|entry| entry.value.clone())
    }

    /// 是否已有內容
    pub fn is_occupied(&self) -> bool {
        self.entry.lock().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cachedesc_core::CacheError;
    use rayon::prelude::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_compute_once_under_contention() {
        let slot = SharedCacheSlot::new();
        let calls = AtomicUsize::new(0);

        let values: Vec<usize> = (0..64)
            .into_par_iter()
            .map(|_| {
                slot.get_or_compute(
                    || Ok(CacheKey::Single(json!(1))),
                    || Ok(calls.fetch_add(1, Ordering::SeqCst) + 1),
                )
                .unwrap()
            })
            .collect();

        assert!(values.iter().all(|&v| v == 1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failures_leave_slot_untouched() {
        let slot: SharedCacheSlot<i32> = SharedCacheSlot::new();

        let err = slot
            .get_or_compute(
                || Err(CacheError::AttributeNotFound("state1".to_string())),
                || Ok(1),
            )
            .unwrap_err();
        assert!(err.is_dependency_failure());
        assert!(!slot.is_occupied());

        let err = slot
            .get_or_compute(
                || Ok(CacheKey::Sentinel),
                || Err(CacheError::compute("boom")),
            )
            .unwrap_err();
        assert_eq!(err, CacheError::compute("boom"));
        assert_eq!(slot.peek(), None);
    }
}
