//! 目錄資源
//!
//! 磁碟上的目錄註冊為資源後，可逐層走訪取得其中的檔案與子目錄。
//! 目錄內資源的名稱以 `/` 串接目錄名稱，例如 `files/sub/test.gif`。

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::factory::FactoryRegistry;
use crate::file::FileResource;
use crate::resource::Resource;
use crate::{ResourceError, Result};

/// 目錄資源
#[derive(Debug, Clone)]
pub struct DirectoryResource {
    path: PathBuf,
    name: String,
    factories: Arc<FactoryRegistry>,
}

impl DirectoryResource {
    /// 創建目錄資源
    pub fn new(
        path: impl Into<PathBuf>,
        name: impl Into<String>,
        factories: Arc<FactoryRegistry>,
    ) -> Self {
        Self {
            path: path.into(),
            name: name.into(),
            factories,
        }
    }

    /// 目錄路徑
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 資源名稱
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 取得目錄中的資源
    ///
    /// 名稱不存在時回傳 `default`；未提供 `default` 時回傳 [`ResourceError::NotFound`]。
    /// 檔案依副檔名選擇資源類型，子目錄成為新的目錄資源。
    /// 名稱只能是單一路徑片段。
    pub fn get(&self, name: &str, default: Option<Resource>) -> Result<Resource> {
        let target = self.child_path(name);
        let (is_file, is_dir) = match &target {
            Some(path) => (path.is_file(), path.is_dir()),
            None => (false, false),
        };

        let path = match target {
            Some(path) if is_file || is_dir => path,
            _ => {
                return default.ok_or_else(|| ResourceError::not_found(Some(&self.name), name));
            }
        };

        let rname = format!("{}/{}", self.name, name);
        if is_file {
            let kind = self.factories.kind_for_path(&path);
            tracing::trace!(resource = %rname, ?kind, "走訪檔案資源");
            Ok(Resource::File(FileResource::open(&path, &rname, kind)?))
        } else {
            tracing::trace!(resource = %rname, "走訪子目錄資源");
            Ok(Resource::Directory(DirectoryResource::new(
                path,
                rname,
                self.factories.clone(),
            )))
        }
    }

    /// 以名稱取得資源，不存在時回傳錯誤
    pub fn index(&self, name: &str) -> Result<Resource> {
        self.get(name, None)
    }

    /// 往下走訪一層
    pub fn traverse(&self, name: &str) -> Result<Resource> {
        self.get(name, None)
    }

    fn child_path(&self, name: &str) -> Option<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(_)), None) => Some(self.path.join(name)),
            _ => None,
        }
    }
}
