//! # Cachedesc
//!
//! 依相依屬性失效的快取屬性，以及建立在其上的瀏覽器資源
//!
//! - [`cache`]：快取屬性、揮發屬性、宣告表
//! - [`resource`]：檔案、目錄、多語系資源與註冊指令

pub use cachedesc_cache as cache;
pub use cachedesc_resource as resource;

pub use cachedesc_cache::{
    AttrValue, AttributeMap, Attributes, CacheError, CacheHost, CacheKey, CacheSlots,
    CachedProperty, PropertyTable, Volatile,
};
pub use cachedesc_core::BindingConfig;
