//! 資源

use crate::directory::DirectoryResource;
use crate::factory::ResourceKind;
use crate::file::FileResource;
use crate::i18n::I18nFileResource;
use crate::url::resource_url;
use crate::{ResourceError, Result};

/// 由外部工廠產生的資源
///
/// 只記錄名稱與工廠名稱，實際建構由宿主框架負責。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomResource {
    pub name: String,
    pub factory: String,
}

/// 已註冊或走訪得到的資源
#[derive(Debug, Clone)]
pub enum Resource {
    File(FileResource),
    Directory(DirectoryResource),
    I18n(I18nFileResource),
    Custom(CustomResource),
}

impl Resource {
    /// 資源名稱（目錄中的資源包含目錄名稱，例如 `files/test.gif`）
    pub fn name(&self) -> &str {
        match self {
            Resource::File(file) => file.name(),
            Resource::Directory(dir) => dir.name(),
            Resource::I18n(i18n) => i18n.name(),
            Resource::Custom(custom) => &custom.name,
        }
    }

    /// 資源的絕對網址
    pub fn url(&self, site_url: &str) -> String {
        resource_url(site_url, self.name())
    }

    /// 往下走訪一層
    pub fn traverse(&self, name: &str) -> Result<Resource> {
        match self {
            Resource::File(file) => file.traverse(name),
            Resource::Directory(dir) => dir.traverse(name),
            Resource::I18n(_) | Resource::Custom(_) => {
                Err(ResourceError::not_found(Some(self.name()), name))
            }
        }
    }

    /// 檔案資源的類型
    pub fn kind(&self) -> Option<&ResourceKind> {
        match self {
            Resource::File(file) => Some(file.kind()),
            _ => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileResource> {
        match self {
            Resource::File(file) => Some(file),
            _ => None,
        }
    }

    pub fn as_directory(&self) -> Option<&DirectoryResource> {
        match self {
            Resource::Directory(dir) => Some(dir),
            _ => None,
        }
    }

    pub fn as_i18n(&self) -> Option<&I18nFileResource> {
        match self {
            Resource::I18n(i18n) => Some(i18n),
            _ => None,
        }
    }
}
