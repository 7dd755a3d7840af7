//! # Cachedesc Resource
//!
//! 瀏覽器資源：將磁碟上的檔案與目錄對應到網址
//!
//! 包含檔案資源、可逐層走訪的目錄資源、多語系檔案資源、依副檔名選擇的
//! 資源工廠、註冊指令與圖示。HTTP 協定處理（請求、回應、條件式請求）
//! 由宿主框架負責，不在此模組範圍內。

pub mod directive;
pub mod directory;
pub mod factory;
pub mod file;
pub mod i18n;
pub mod icon;
pub mod registry;
pub mod resource;
pub mod url;

// Re-export 主要類型
pub use directive::{
    Directive, DirectiveSet, I18nResourceDirective, IconDirective, ResourceDirective,
    ResourceDirectoryDirective, Translation,
};
pub use directory::DirectoryResource;
pub use factory::{FactoryRegistry, ResourceKind};
pub use file::{File, FileResource};
pub use i18n::I18nFileResource;
pub use icon::IconView;
pub use registry::{Permission, Registration, ResourceRegistry};
pub use resource::{CustomResource, Resource};
pub use url::resource_url;

/// 資源錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("找不到資源: 物件 {}, 名稱 {name}", object.as_deref().unwrap_or("None"))]
    NotFound { object: Option<String>, name: String },

    #[error("配置錯誤: {0}")]
    Configuration(String),

    #[error("配置衝突: {0}")]
    Conflict(String),

    #[error("快取錯誤: {0}")]
    Cache(#[from] cachedesc_core::CacheError),

    #[error("檔案存取錯誤: {0}")]
    Io(#[from] std::io::Error),

    #[error("配置格式錯誤: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResourceError {
    pub(crate) fn not_found(object: Option<&str>, name: &str) -> Self {
        Self::NotFound {
            object: object.map(str::to_string),
            name: name.to_string(),
        }
    }

    /// 是否為找不到資源
    pub fn is_not_found(&self) -> bool {
        matches!(self, ResourceError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ResourceError>;
