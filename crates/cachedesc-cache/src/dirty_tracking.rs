//! 快取項目狀態追蹤

use std::collections::BTreeSet;

/// 單一（實例, 綁定）的快取項目狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// 尚無項目
    Empty,
    /// 項目存在且鍵與目前快照一致
    Valid,
    /// 項目存在但相依屬性已改變
    Stale,
}

/// 髒標記追蹤器
///
/// 記錄某個實例上已過期（下次讀取會重新計算）的綁定名稱。
#[derive(Debug, Clone, Default)]
pub struct DirtyTracker {
    dirty_bindings: BTreeSet<String>,
}

impl DirtyTracker {
    /// 創建新的追蹤器
    pub fn new() -> Self {
        Self::default()
    }

    /// 標記綁定為髒
    pub fn mark_dirty(&mut self, binding: impl Into<String>) {
        self.dirty_bindings.insert(binding.into());
    }

    /// 檢查綁定是否為髒
    pub fn is_dirty(&self, binding: &str) -> bool {
        self.dirty_bindings.contains(binding)
    }

    /// 是否沒有任何髒標記
    pub fn is_clean(&self) -> bool {
        self.dirty_bindings.is_empty()
    }

    /// 清除所有髒標記
    pub fn clear(&mut self) {
        self.dirty_bindings.clear();
    }

    /// 獲取所有髒綁定（依名稱排序）
    pub fn get_dirty_bindings(&self) -> Vec<String> {
        self.dirty_bindings.iter().cloned().collect()
    }
}
