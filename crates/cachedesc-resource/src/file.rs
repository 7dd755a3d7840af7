//! 檔案資源

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::factory::ResourceKind;
use crate::resource::Resource;
use crate::{ResourceError, Result};

/// 預設快取時間（秒），一天
pub const DEFAULT_CACHE_TIMEOUT: u64 = 86_400;

/// HTTP 日期格式（RFC 7231，GMT）
const HTTP_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// 磁碟上的檔案及其中繼資料
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// 檔案路徑
    path: PathBuf,

    /// 資源名稱
    name: String,

    /// 內容類型
    content_type: String,

    /// 最後修改時間
    last_modified: DateTime<Utc>,
}

impl File {
    /// 開啟檔案並讀取中繼資料
    ///
    /// 內容類型先依副檔名推斷，推斷不出時檢查內容。
    /// 修改時間為零（無法取得）時以目前時間代替。
    pub fn open(path: impl AsRef<Path>, name: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let content_type = guess_content_type(path, &data);

        let modified: DateTime<Utc> = fs::metadata(path)?.modified()?.into();
        let last_modified = if modified.timestamp() == 0 {
            Utc::now()
        } else {
            modified
        };

        Ok(Self {
            path: path.to_path_buf(),
            name: name.into(),
            content_type,
            last_modified,
        })
    }

    /// 檔案路徑
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 資源名稱
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 內容類型
    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// 最後修改時間
    pub fn last_modified(&self) -> DateTime<Utc> {
        self.last_modified
    }

    /// 最後修改時間（HTTP 日期格式）
    pub fn last_modified_http(&self) -> String {
        self.last_modified.format(HTTP_DATE_FORMAT).to_string()
    }

    /// 讀取檔案內容
    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(fs::read(&self.path)?)
    }
}

/// 推斷內容類型
pub fn guess_content_type(path: &Path, data: &[u8]) -> String {
    match mime_guess::from_path(path).first() {
        Some(mime) => mime.essence_str().to_string(),
        None if std::str::from_utf8(data).is_ok() => "text/plain".to_string(),
        None => "application/octet-stream".to_string(),
    }
}

/// 檔案資源
///
/// 檔案資源不可再往下走訪。
#[derive(Debug, Clone)]
pub struct FileResource {
    file: Arc<File>,
    name: String,
    kind: ResourceKind,
    cache_timeout: u64,
}

impl FileResource {
    /// 創建檔案資源
    pub fn new(file: Arc<File>, name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            file,
            name: name.into(),
            kind,
            cache_timeout: DEFAULT_CACHE_TIMEOUT,
        }
    }

    /// 開啟檔案並創建資源
    pub fn open(path: impl AsRef<Path>, name: &str, kind: ResourceKind) -> Result<Self> {
        let file = File::open(path, name)?;
        Ok(Self::new(Arc::new(file), name, kind))
    }

    /// 建構器模式：設置快取時間（秒）
    pub fn with_cache_timeout(mut self, secs: u64) -> Self {
        self.cache_timeout = secs;
        self
    }

    /// 資源名稱
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 對應的檔案
    pub fn file(&self) -> &Arc<File> {
        &self.file
    }

    /// 資源類型
    pub fn kind(&self) -> &ResourceKind {
        &self.kind
    }

    /// 快取時間（秒）
    pub fn cache_timeout(&self) -> u64 {
        self.cache_timeout
    }

    /// 快取控制標頭值
    pub fn cache_control(&self) -> String {
        format!("public,max-age={}", self.cache_timeout)
    }

    /// 過期時間
    pub fn expires_at(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now + Duration::seconds(self.cache_timeout as i64)
    }

    /// 過期時間（HTTP 日期格式）
    pub fn expires_http(&self, now: DateTime<Utc>) -> String {
        self.expires_at(now).format(HTTP_DATE_FORMAT).to_string()
    }

    /// 讀取檔案內容
    pub fn read(&self) -> Result<Vec<u8>> {
        self.file.read()
    }

    /// 檔案資源不可再往下走訪
    pub fn traverse(&self, name: &str) -> Result<Resource> {
        Err(ResourceError::not_found(None, name))
    }
}
