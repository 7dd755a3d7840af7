//! 揮發屬性

use std::marker::PhantomData;

use cachedesc_core::{CacheKey, Result};

use crate::dirty_tracking::EntryState;
use crate::slots::{CacheEntry, CacheHost, SlotId};

type InitFn<V> = Box<dyn Fn() -> V + Send + Sync>;

/// 揮發屬性：首次存取時計算預設值並存下，之後不再重算
///
/// 相當於沒有相依屬性、鍵永遠相符的快取屬性。存下的值可以就地修改，
/// 修改結果在下一次存取時可見。
///
/// ```
/// use std::collections::HashMap;
/// use cachedesc_cache::{AttributeMap, PropertyTable};
///
/// let mut table = PropertyTable::<AttributeMap>::new();
/// let data = table.volatile("_v_data", HashMap::<String, i64>::new).unwrap();
///
/// let inst = AttributeMap::new();
/// data.with_mut(&inst, |d| d.insert("x".to_string(), 1)).unwrap();
/// assert_eq!(data.get(&inst).unwrap().get("x"), Some(&1));
/// ```
pub struct Volatile<T, V> {
    slot: SlotId,
    name: String,
    init: InitFn<V>,
    _owner: PhantomData<fn(&T)>,
}

impl<T, V> Volatile<T, V>
where
    T: CacheHost,
    V: 'static,
{
    pub(crate) fn new(slot: SlotId, name: String, init: InitFn<V>) -> Self {
        Self {
            slot,
            name,
            init,
            _owner: PhantomData,
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

    /// 取得值，尚未存在時先初始化
    pub fn get(&self, instance: &T) -> Result<V>
    where
        V: Clone,
    {
        self.with_mut(instance, |value| value.clone())
    }

    /// 就地存取值，尚未存在時先初始化
    ///
    /// `f` 執行期間可以讀取同一個實例上的其他快取屬性；
    /// 重入同一個揮發屬性回傳 [`cachedesc_core::CacheError::Reentrant`]。
    pub fn with_mut<R, F>(&self, instance: &T, f: F) -> Result<R>
    where
        F: FnOnce(&mut V) -> R,
    {
        instance.cache_slots().modify_or_insert(
            self.slot,
            &self.name,
            || CacheEntry::new(CacheKey::Sentinel, (self.init)()),
            |entry: &mut CacheEntry<V>| f(&mut entry.value),
        )
    }

    /// 檢查是否已初始化
    pub fn state(&self, instance: &T) -> EntryState {
        if instance.cache_slots().is_occupied(self.slot) {
            EntryState::Valid
        } else {
            EntryState::Empty
        }
    }
}

impl<T, V> std::fmt::Debug for Volatile<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Volatile")
            .field("slot", &self.slot)
            .field("name", &self.name)
            .finish()
    }
}
