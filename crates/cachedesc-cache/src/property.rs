//! 快取屬性

use cachedesc_core::{Attributes, CacheKey, Result};

use crate::dirty_tracking::EntryState;
use crate::shared::SharedCacheSlot;
use crate::slots::{CacheEntry, CacheHost, SlotId};

type ComputeFn<T, V> = Box<dyn Fn(&T) -> Result<V> + Send + Sync>;

/// 快取屬性綁定
///
/// 將計算函數與其相依屬性配對。綁定在類型定義時宣告一次（透過
/// [`crate::PropertyTable`]），同類型的所有實例共用；每個實例的快取
/// 項目存放在實例自身的 [`crate::CacheSlots`] 中。
///
/// 快取只在讀取時檢查是否過期：相依屬性的快照與上次存下的鍵不同時才重新計算。
pub struct CachedProperty<T, V> {
    slot: SlotId,
    name: String,
    dependencies: Vec<String>,
    compute: ComputeFn<T, V>,
}

impl<T, V> CachedProperty<T, V>
where
    V: Clone + 'static,
{
    pub(crate) fn new(
        slot: SlotId,
        name: String,
        dependencies: Vec<String>,
        compute: ComputeFn<T, V>,
    ) -> Self {
        Self {
            slot,
            name,
            dependencies,
            compute,
        }
    }

    /// 屬性名稱
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 快取槽編號
    pub fn slot(&self) -> SlotId {
        self.slot
    }

    /// 相依屬性（快照順序）
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }

    /// 讀取屬性值
    ///
    /// 1. 讀取相依屬性產生目前的鍵，失敗時原樣回傳錯誤
    /// 2. 快取項目的鍵與目前鍵相等 → 直接回傳快取值
    /// 3. 否則呼叫計算函數，成功後寫入新的鍵與值
    ///
    /// 計算失敗時不寫入任何狀態，既有的快取項目保持不變。
    /// 計算函數執行期間不持有快取槽，因此可以讀取同一實例上的其他快取屬性，
    /// 但不可重入同一個屬性。
    pub fn get(&self, instance: &T) -> Result<V>
    where
        T: Attributes + CacheHost,
    {
        let key = CacheKey::snapshot(instance, self.dependencies.as_slice())?;
        let slots = instance.cache_slots();

        let cached = slots.read(self.slot, &self.name, |entry: Option<&CacheEntry<V>>| {
            entry
                .filter(|entry| entry.is_fresh(&key))
                .map(|entry| entry.value.clone())
        })?;

        if let Some(value) = cached {
            tracing::trace!(property = %self.name, "快取命中");
            return Ok(value);
        }

        tracing::debug!(property = %self.name, slot = %self.slot, "快取未命中，重新計算");
        let value = (self.compute)(instance)?;
        slots.write(self.slot, &self.name, CacheEntry::new(key, value.clone()))?;
        Ok(value)
    }

    /// 透過執行緒安全的快取槽讀取屬性值
    ///
    /// 讀取、計算與寫入在同一把鎖內完成，同一個鍵在並行讀取下只計算一次。
    pub fn get_shared(&self, instance: &T, slot: &SharedCacheSlot<V>) -> Result<V>
    where
        T: Attributes,
    {
        slot.get_or_compute(|| CacheKey::snapshot(instance, self.dependencies.as_slice()), || {
            tracing::debug!(property = %self.name, "共享快取未命中，重新計算");
            (self.compute)(instance)
        })
    }

    /// 檢查快取項目狀態（不觸發計算）
    pub fn state(&self, instance: &T) -> Result<EntryState>
    where
        T: Attributes + CacheHost,
    {
        let key = CacheKey::snapshot(instance, self.dependencies.as_slice())?;
        instance
            .cache_slots()
            .read(self.slot, &self.name, |entry: Option<&CacheEntry<V>>| match entry {
                None => EntryState::Empty,
                Some(entry) if entry.is_fresh(&key) => EntryState::Valid,
                Some(_) => EntryState::Stale,
            })
    }

    /// 取得已存的快取值（不論是否過期）
    pub fn peek(&self, instance: &T) -> Result<Option<V>>
    where
        T: CacheHost,
    {
        instance
            .cache_slots()
            .read(self.slot, &self.name, |entry: Option<&CacheEntry<V>>| {
                entry.map(|entry| entry.value.clone())
            })
    }
}

impl<T, V> std::fmt::Debug for CachedProperty<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedProperty")
            .field("slot", &self.slot)
            .field("name", &self.name)
            .field("dependencies", &self.dependencies)
            .finish()
    }
}
