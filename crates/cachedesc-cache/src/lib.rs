//! # Cachedesc Cache
//!
//! 依相依屬性失效的快取屬性
//!
//! 快取屬性是會快取計算結果的計算屬性。它們會考慮所依賴的實例屬性，
//! 當這些屬性改變時，下一次讀取就會重新計算。快取資料存放在實例自身的
//! [`CacheSlots`] 上，實例釋放時快取一併釋放。
//!
//! ```
//! use std::sync::{Arc, OnceLock};
//! use cachedesc_cache::{AttributeMap, CachedProperty, PropertyTable};
//!
//! fn upper() -> &'static Arc<CachedProperty<AttributeMap, String>> {
//!     static UPPER: OnceLock<Arc<CachedProperty<AttributeMap, String>>> = OnceLock::new();
//!     UPPER.get_or_init(|| {
//!         let mut table = PropertyTable::new();
//!         table
//!             .try_property("upper", |m: &AttributeMap| {
//!                 Ok(m.get("filename").and_then(|v| v.as_str()).unwrap_or_default().to_uppercase())
//!             }, &["filename"])
//!             .expect("唯一名稱")
//!     })
//! }
//!
//! let mut manager = AttributeMap::new();
//! manager.set("filename", "data.txt");
//! assert_eq!(upper().get(&manager).unwrap(), "DATA.TXT");
//!
//! manager.set("filename", "other.txt");
//! assert_eq!(upper().get(&manager).unwrap(), "OTHER.TXT");
//! ```

pub mod dirty_tracking;
pub mod instance;
pub mod property;
pub mod shared;
pub mod slots;
pub mod table;
pub mod volatile;

// Re-export 主要類型
pub use cachedesc_core::{AttrValue, Attributes, CacheError, CacheKey, Result};
pub use dirty_tracking::{DirtyTracker, EntryState};
pub use instance::AttributeMap;
pub use property::CachedProperty;
pub use shared::SharedCacheSlot;
pub use slots::{CacheEntry, CacheHost, CacheSlots, SlotId};
pub use table::{Binding, PropertyTable};
pub use volatile::Volatile;
