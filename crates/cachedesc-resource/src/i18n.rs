//! 多語系檔案資源

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use cachedesc_cache::{AttrValue, Attributes, CacheHost, CacheSlots, CachedProperty, PropertyTable};
use cachedesc_core::CacheError;

use crate::file::File;
use crate::{ResourceError, Result};

/// 預設語言
pub const DEFAULT_LANGUAGE: &str = "en";

type ChosenFile = CachedProperty<I18nFileResource, Arc<File>>;

/// 選出的檔案依「協商語言」與「預設語言」快取
fn chosen_file() -> std::result::Result<&'static ChosenFile, CacheError> {
    static CHOSEN: OnceLock<std::result::Result<Arc<ChosenFile>, CacheError>> = OnceLock::new();
    CHOSEN
        .get_or_init(|| {
            let mut table = PropertyTable::new();
            table.try_property(
                "chosen_file",
                I18nFileResource::lookup_file,
                &["language", "default_language"],
            )
        })
        .as_ref()
        .map(|property| property.as_ref())
        .map_err(Clone::clone)
}

/// 多語系檔案資源
///
/// 每種語言對應一個檔案。依請求偏好的語言選檔，沒有符合的語言時使用預設語言。
#[derive(Debug, Clone)]
pub struct I18nFileResource {
    name: String,
    files: BTreeMap<String, Arc<File>>,
    default_language: String,
    language: Option<String>,
    cache: CacheSlots,
}

impl I18nFileResource {
    /// 創建多語系資源
    ///
    /// 預設語言必須有對應的檔案。語言標籤一律正規化為小寫並以 `-` 分隔
    /// （`pt_BR` → `pt-br`）。
    pub fn new(
        name: impl Into<String>,
        files: BTreeMap<String, Arc<File>>,
        default_language: impl AsRef<str>,
    ) -> Result<Self> {
        let name = name.into();
        let default_language = normalize_language(default_language.as_ref());
        let files: BTreeMap<String, Arc<File>> = files
            .into_iter()
            .map(|(lang, file)| (normalize_language(&lang), file))
            .collect();
        if !files.contains_key(&default_language) {
            return Err(ResourceError::Configuration(format!(
                "資源 {name} 必須提供預設語言 ({default_language}) 的翻譯"
            )));
        }

        Ok(Self {
            name,
            files,
            default_language,
            language: None,
            cache: CacheSlots::new(),
        })
    }

    /// 資源名稱
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 預設語言
    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    /// 設置預設語言（必須是已有翻譯的語言）
    pub fn set_default_language(&mut self, language: &str) -> Result<()> {
        let language = normalize_language(language);
        if !self.files.contains_key(&language) {
            return Err(ResourceError::Configuration(format!(
                "無法將不存在的語言 ({language}) 設為預設語言"
            )));
        }
        self.default_language = language;
        Ok(())
    }

    /// 可用語言（排序）
    pub fn available_languages(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    /// 目前協商出的語言
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// 依偏好語言協商，回傳協商結果
    ///
    /// 依序比對偏好語言（不分大小寫，`_` 視同 `-`）；找不到完全相符的語言時，
    /// 再比對主要語言標籤（`pt-BR` → `pt`）。
    pub fn negotiate(&mut self, preferred: &[&str]) -> Option<&str> {
        self.language = preferred.iter().find_map(|lang| {
            let lang = normalize_language(lang);
            if self.files.contains_key(&lang) {
                return Some(lang);
            }
            let primary = lang.split('-').next().unwrap_or_default();
            self.files
                .contains_key(primary)
                .then(|| primary.to_string())
        });
        self.language()
    }

    /// 依偏好語言選出檔案
    pub fn choose(&mut self, preferred: &[&str]) -> Result<Arc<File>> {
        self.negotiate(preferred);
        self.context()
    }

    /// 目前語言對應的檔案（未協商或語言不可用時為預設語言）
    pub fn context(&self) -> Result<Arc<File>> {
        Ok(chosen_file()?.get(self)?)
    }

    /// 讀取指定語言的檔案內容
    pub fn read(&self, language: &str) -> Result<Vec<u8>> {
        match self.files.get(&normalize_language(language)) {
            Some(file) => file.read(),
            None => Err(ResourceError::not_found(Some(&self.name), language)),
        }
    }

    fn lookup_file(&self) -> cachedesc_core::Result<Arc<File>> {
        self.language
            .as_ref()
            .and_then(|lang| self.files.get(lang))
            .or_else(|| self.files.get(&self.default_language))
            .cloned()
            .ok_or_else(|| {
                CacheError::compute(format!("資源 {} 缺少預設語言的檔案", self.name))
            })
    }
}

fn normalize_language(language: &str) -> String {
    language.trim().to_lowercase().replace('_', "-")
}

impl Attributes for I18nFileResource {
    fn attribute(&self, name: &str) -> cachedesc_core::Result<AttrValue> {
        match name {
            "language" => Ok(self
                .language
                .as_ref()
                .map_or(AttrValue::Null, |lang| AttrValue::from(lang.as_str()))),
            "default_language" => Ok(AttrValue::from(self.default_language.as_str())),
            _ => Err(CacheError::AttributeNotFound(name.to_string())),
        }
    }
}

impl CacheHost for I18nFileResource {
    fn cache_slots(&self) -> &CacheSlots {
        &self.cache
    }
}
