//! 實例快取槽

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

use cachedesc_core::{CacheError, CacheKey, Result};

/// 快取槽編號
///
/// 由宣告表編號與表內的宣告順序組成。宣告表編號在行程內唯一，
/// 因此不同宣告表的綁定即使用在同一個實例上也不會共用槽位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotId {
    table: usize,
    index: usize,
}

impl SlotId {
    pub(crate) fn new(table: usize, index: usize) -> Self {
        Self { table, index }
    }

    /// 宣告表編號
    pub fn table(self) -> usize {
        self.table
    }

    /// 表內索引（宣告順序）
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.table, self.index)
    }
}

/// 快取項目：最後一次看到的鍵與計算結果
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<V> {
    /// 相依屬性快照
    pub key: CacheKey,

    /// 計算結果
    pub value: V,
}

impl<V> CacheEntry<V> {
    /// 創建新的快取項目
    pub fn new(key: CacheKey, value: V) -> Self {
        Self { key, value }
    }

    /// 鍵是否與目前快照一致
    pub fn is_fresh(&self, current: &CacheKey) -> bool {
        self.key == *current
    }
}

/// 擁有快取槽的實例
pub trait CacheHost {
    /// 實例自身的快取槽
    fn cache_slots(&self) -> &CacheSlots;
}

enum Stored {
    Ready(Box<dyn Any>),
    /// 內容已借出，正在 [`CacheSlots::modify_or_insert`] 中修改
    Leased,
}

/// 實例持有的快取槽表
///
/// 以 [`SlotId`] 為鍵的小型側表，放在實例的欄位上。
/// 槽位在第一次寫入時才配置。複製實例時不複製快取內容。
///
/// 非執行緒安全；跨執行緒共用請使用 [`crate::SharedCacheSlot`]。
/// 所有存取都不會 panic：重入正在修改中的槽位時回傳 [`CacheError::Reentrant`]。
#[derive(Default)]
pub struct CacheSlots {
    entries: RefCell<HashMap<SlotId, Stored>>,
}

impl CacheSlots {
    /// 創建空的快取槽表
    pub fn new() -> Self {
        Self::default()
    }

    /// 預先配置槽位
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RefCell::new(HashMap::with_capacity(capacity)),
        }
    }

    /// 讀取槽位內容
    ///
    /// 槽位存放的值類型與 `V` 不符時回傳 [`CacheError::SlotMismatch`]。
    pub(crate) fn read<V, R, F>(&self, slot: SlotId, binding: &str, f: F) -> Result<R>
    where
        V: 'static,
        F: FnOnce(Option<&CacheEntry<V>>) -> R,
    {
        let entries = self
            .entries
            .try_borrow()
            .map_err(|_| reentrant(binding))?;
        match entries.get(&slot) {
            None => Ok(f(None)),
            Some(Stored::Leased) => Err(reentrant(binding)),
            Some(Stored::Ready(stored)) => match stored.downcast_ref::<CacheEntry<V>>() {
                Some(entry) => Ok(f(Some(entry))),
                None => Err(mismatch(slot, binding)),
            },
        }
    }

    /// 就地修改槽位內容，槽位為空時先以 `init` 填入
    ///
    /// 修改期間項目從表中借出，`init` 與 `f` 可以讀寫同一個實例上的其他槽位；
    /// 重入同一個槽位回傳 [`CacheError::Reentrant`]。
    pub(crate) fn modify_or_insert<V, R, I, F>(
        &self,
        slot: SlotId,
        binding: &str,
        init: I,
        f: F,
    ) -> Result<R>
    where
        V: 'static,
        I: FnOnce() -> CacheEntry<V>,
        F: FnOnce(&mut CacheEntry<V>) -> R,
    {
        let taken = {
            let mut entries = self
                .entries
                .try_borrow_mut()
                .map_err(|_| reentrant(binding))?;
            match entries.insert(slot, Stored::Leased) {
                Some(Stored::Leased) => return Err(reentrant(binding)),
                Some(Stored::Ready(stored)) => Some(stored),
                None => None,
            }
        };

        let mut lease = Lease {
            slots: self,
            slot,
            value: None,
        };
        let stored = match taken {
            Some(stored) => stored,
            None => {
                tracing::trace!(slot = %slot, binding, "初始化快取槽");
                Box::new(init()) as Box<dyn Any>
            }
        };

        let entry = lease
            .value
            .insert(stored)
            .downcast_mut::<CacheEntry<V>>()
            .ok_or_else(|| mismatch(slot, binding))?;
        Ok(f(entry))
    }

    /// 寫入槽位（覆蓋舊內容）
    pub(crate) fn write<V: 'static>(
        &self,
        slot: SlotId,
        binding: &str,
        entry: CacheEntry<V>,
    ) -> Result<()> {
        let mut entries = self
            .entries
            .try_borrow_mut()
            .map_err(|_| reentrant(binding))?;
        if let Some(Stored::Leased) = entries.get(&slot) {
            return Err(reentrant(binding));
        }
        if entries.insert(slot, Stored::Ready(Box::new(entry))).is_none() {
            tracing::trace!(slot = %slot, binding, "配置快取槽");
        }
        Ok(())
    }

    /// 槽位是否已有內容
    pub fn is_occupied(&self, slot: SlotId) -> bool {
        self.entries
            .try_borrow()
            .map_or(false, |entries| entries.contains_key(&slot))
    }

    /// 已有內容的槽位數量
    pub fn occupied(&self) -> usize {
        self.entries.try_borrow().map_or(0, |entries| entries.len())
    }

    /// 清除所有快取內容（修改中的槽位除外）
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.try_borrow_mut() {
            entries.retain(|_, stored| matches!(stored, Stored::Leased));
        }
    }
}

/// 借出的槽位內容，離開作用域時放回（`init` 或 `f` panic 時也一樣）
struct Lease<'a> {
    slots: &'a CacheSlots,
    slot: SlotId,
    value: Option<Box<dyn Any>>,
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        if let Ok(mut entries) = self.slots.entries.try_borrow_mut() {
            match self.value.take() {
                Some(value) => {
                    entries.insert(self.slot, Stored::Ready(value));
                }
                None => {
                    entries.remove(&self.slot);
                }
            }
        }
    }
}

impl Clone for CacheSlots {
    fn clone(&self) -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheSlots {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheSlots")
            .field("occupied", &self.occupied())
            .finish()
    }
}

fn mismatch(slot: SlotId, binding: &str) -> CacheError {
    CacheError::SlotMismatch {
        slot: slot.to_string(),
        binding: binding.to_string(),
    }
}

fn reentrant(binding: &str) -> CacheError {
    CacheError::Reentrant {
        binding: binding.to_string(),
    }
}
