//! 快取屬性宣告表

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use cachedesc_core::{Attributes, BindingConfig, CacheError, Result};

use crate::dirty_tracking::{DirtyTracker, EntryState};
use crate::property::CachedProperty;
use crate::slots::{CacheHost, CacheSlots, SlotId};
use crate::volatile::Volatile;

/// 宣告在某個類型上的綁定
pub trait Binding<T>: Send + Sync {
    /// 綁定名稱
    fn name(&self) -> &str;

    /// 快取槽編號
    fn slot(&self) -> SlotId;

    /// 相依屬性
    fn dependencies(&self) -> &[String];

    /// 快取項目狀態
    fn state(&self, instance: &T) -> Result<EntryState>;
}

impl<T, V> Binding<T> for CachedProperty<T, V>
where
    T: Attributes + CacheHost,
    V: Clone + 'static,
{
    fn name(&self) -> &str {
        CachedProperty::name(self)
    }

    fn slot(&self) -> SlotId {
        CachedProperty::slot(self)
    }

    fn dependencies(&self) -> &[String] {
        CachedProperty::dependencies(self)
    }

    fn state(&self, instance: &T) -> Result<EntryState> {
        CachedProperty::state(self, instance)
    }
}

impl<T, V> Binding<T> for Volatile<T, V>
where
    T: CacheHost,
    V: 'static,
{
    fn name(&self) -> &str {
        Volatile::name(self)
    }

    fn slot(&self) -> SlotId {
        Volatile::slot(self)
    }

    fn dependencies(&self) -> &[String] {
        &[]
    }

    fn state(&self, instance: &T) -> Result<EntryState> {
        Ok(Volatile::state(self, instance))
    }
}

/// 宣告表編號，行程內遞增
static NEXT_TABLE_ID: AtomicUsize = AtomicUsize::new(0);

/// 快取屬性宣告表
///
/// 在類型定義時建立一次，依宣告順序為每個綁定分配快取槽編號。
/// 每張表有行程內唯一的編號，任何兩個綁定都不會共用槽位，
/// 即使來自不同的表。通常放在 `OnceLock` 中與類型一起共用。
pub struct PropertyTable<T> {
    id: usize,
    bindings: Vec<Arc<dyn Binding<T>>>,
}

impl<T: CacheHost + 'static> PropertyTable<T> {
    /// 創建空的宣告表
    pub fn new() -> Self {
        Self {
            id: NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed),
            bindings: Vec::new(),
        }
    }

    /// 宣告表編號
    pub fn id(&self) -> usize {
        self.id
    }

    /// 宣告揮發屬性
    pub fn volatile<V, F>(&mut self, name: &str, init: F) -> Result<Arc<Volatile<T, V>>>
    where
        V: 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        let config = BindingConfig::new(name).with_volatile(true);
        self.volatile_from_config(&config, init)
    }

    /// 依配置宣告揮發屬性
    pub fn volatile_from_config<V, F>(
        &mut self,
        config: &BindingConfig,
        init: F,
    ) -> Result<Arc<Volatile<T, V>>>
    where
        V: 'static,
        F: Fn() -> V + Send + Sync + 'static,
    {
        config.validate()?;
        if !config.volatile {
            return Err(CacheError::Config(format!(
                "屬性 {} 不是揮發屬性",
                config.name
            )));
        }

        let slot = self.next_slot(&config.name)?;
        let volatile = Arc::new(Volatile::new(slot, config.name.clone(), Box::new(init)));
        self.bindings.push(volatile.clone());
        Ok(volatile)
    }

    /// 已宣告的綁定數量
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// 依宣告順序列出綁定名稱
    pub fn names(&self) -> Vec<&str> {
        self.bindings.iter().map(|b| b.name()).collect()
    }

    /// 依名稱查找綁定
    pub fn binding(&self, name: &str) -> Option<&Arc<dyn Binding<T>>> {
        self.bindings.iter().find(|b| b.name() == name)
    }

    /// 為新實例配置大小剛好的快取槽
    pub fn new_slots(&self) -> CacheSlots {
        CacheSlots::with_capacity(self.len())
    }

    /// 檢查實例上各綁定的狀態，回傳已過期的綁定
    pub fn dirty(&self, instance: &T) -> Result<DirtyTracker> {
        let mut tracker = DirtyTracker::new();
        for binding in &self.bindings {
            if binding.state(instance)? == EntryState::Stale {
                tracker.mark_dirty(binding.name());
            }
        }
        Ok(tracker)
    }

    fn next_slot(&self, name: &str) -> Result<SlotId> {
        if self.binding(name).is_some() {
            return Err(CacheError::DuplicateBinding(name.to_string()));
        }
        let slot = SlotId::new(self.id, self.bindings.len());
        tracing::debug!(binding = name, slot = %slot, "宣告快取屬性");
        Ok(slot)
    }
}

impl<T: Attributes + CacheHost + 'static> PropertyTable<T> {
    /// 宣告快取屬性
    ///
    /// `dependencies` 為空時只計算一次；否則任一相依屬性改變後，
    /// 下一次讀取會重新計算。
    pub fn property<V, F>(
        &mut self,
        name: &str,
        compute: F,
        dependencies: &[&str],
    ) -> Result<Arc<CachedProperty<T, V>>>
    where
        V: Clone + 'static,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.try_property(name, move |instance: &T| Ok(compute(instance)), dependencies)
    }

    /// 宣告計算可能失敗的快取屬性
    pub fn try_property<V, F>(
        &mut self,
        name: &str,
        compute: F,
        dependencies: &[&str],
    ) -> Result<Arc<CachedProperty<T, V>>>
    where
        V: Clone + 'static,
        F: Fn(&T) -> Result<V> + Send + Sync + 'static,
    {
        let config = BindingConfig::new(name).with_dependencies(dependencies.iter().copied());
        self.property_from_config(&config, compute)
    }

    /// 依配置宣告快取屬性
    pub fn property_from_config<V, F>(
        &mut self,
        config: &BindingConfig,
        compute: F,
    ) -> Result<Arc<CachedProperty<T, V>>>
    where
        V: Clone + 'static,
        F: Fn(&T) -> Result<V> + Send + Sync + 'static,
    {
        config.validate()?;
        if config.volatile {
            return Err(CacheError::Config(format!(
                "屬性 {} 為揮發屬性，請使用 volatile_from_config",
                config.name
            )));
        }

        let slot = self.next_slot(&config.name)?;
        let property = Arc::new(CachedProperty::new(
            slot,
            config.name.clone(),
            config.dependencies.clone(),
            Box::new(compute),
        ));
        self.bindings.push(property.clone());
        Ok(property)
    }
}

impl<T: CacheHost + 'static> Default for PropertyTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for PropertyTable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyTable")
            .field("id", &self.id)
            .field(
                "bindings",
                &self.bindings.iter().map(|b| b.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
