//! 資源註冊指令

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::i18n::DEFAULT_LANGUAGE;
use crate::icon::DEFAULT_ICON_SIZE;
use crate::Result;

/// 預設請求層
pub const DEFAULT_LAYER: &str = "default";

/// 公開權限名稱
pub const PUBLIC_PERMISSION: &str = "zope.Public";

fn default_layer() -> String {
    DEFAULT_LAYER.to_string()
}

fn default_permission() -> String {
    PUBLIC_PERMISSION.to_string()
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_icon_size() -> u32 {
    DEFAULT_ICON_SIZE
}

/// 註冊指令
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Directive {
    Resource(ResourceDirective),
    ResourceDirectory(ResourceDirectoryDirective),
    I18nResource(I18nResourceDirective),
    Icon(IconDirective),
}

/// 單一資源
///
/// `factory`、`file`、`image`、`template` 必須恰好指定一個；
/// `image` 與 `template` 已淘汰，等同 `file`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDirective {
    pub name: String,

    #[serde(default = "default_layer")]
    pub layer: String,

    #[serde(default = "default_permission")]
    pub permission: String,

    #[serde(default)]
    pub factory: Option<String>,

    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub image: Option<PathBuf>,

    #[serde(default)]
    pub template: Option<PathBuf>,
}

impl ResourceDirective {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            layer: default_layer(),
            permission: default_permission(),
            factory: None,
            file: None,
            image: None,
            template: None,
        }
    }

    /// 以檔案註冊的資源
    pub fn file(name: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(file.into()),
            ..Self::new(name)
        }
    }

    /// 以外部工廠註冊的資源
    pub fn factory(name: impl Into<String>, factory: impl Into<String>) -> Self {
        Self {
            factory: Some(factory.into()),
            ..Self::new(name)
        }
    }

    /// 建構器模式：設置請求層
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    /// 建構器模式：設置權限
    pub fn with_permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = permission.into();
        self
    }

    /// 建構器模式：設置圖片（已淘汰）
    pub fn with_image(mut self, image: impl Into<PathBuf>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// 建構器模式：設置模板（已淘汰）
    pub fn with_template(mut self, template: impl Into<PathBuf>) -> Self {
        self.template = Some(template.into());
        self
    }
}

/// 資源目錄
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDirectoryDirective {
    pub name: String,

    pub directory: PathBuf,

    #[serde(default = "default_layer")]
    pub layer: String,

    #[serde(default = "default_permission")]
    pub permission: String,
}

impl ResourceDirectoryDirective {
    pub fn new(name: impl Into<String>, directory: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            directory: directory.into(),
            layer: default_layer(),
            permission: default_permission(),
        }
    }

    /// 建構器模式：設置請求層
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }
}

/// 單一語言的翻譯檔案（`file` 與 `image` 恰好指定一個）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    pub language: String,

    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub image: Option<PathBuf>,
}

impl Translation {
    pub fn file(language: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            language: language.into(),
            file: Some(file.into()),
            image: None,
        }
    }
}

/// 多語系資源
///
/// 沒有名稱時只驗證翻譯，不註冊任何資源。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct I18nResourceDirective {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default = "default_language")]
    pub default_language: String,

    #[serde(default = "default_layer")]
    pub layer: String,

    #[serde(default)]
    pub permission: Option<String>,

    #[serde(default)]
    pub translations: Vec<Translation>,
}

impl I18nResourceDirective {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            default_language: default_language(),
            layer: default_layer(),
            permission: None,
            translations: Vec::new(),
        }
    }

    /// 建構器模式：加入翻譯
    pub fn with_translation(mut self, translation: Translation) -> Self {
        self.translations.push(translation);
        self
    }

    /// 建構器模式：設置預設語言
    pub fn with_default_language(mut self, language: impl Into<String>) -> Self {
        self.default_language = language.into();
        self
    }
}

/// 圖示
///
/// `file` 與 `resource` 恰好指定一個。指定 `file` 時會以
/// `<模組>-<介面>-<名稱><副檔名>` 為名另外註冊一個檔案資源。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconDirective {
    pub name: String,

    /// 介面的完整名稱，例如 `zope.component.testfiles.views.IC`
    #[serde(rename = "for")]
    pub for_: String,

    #[serde(default)]
    pub file: Option<PathBuf>,

    #[serde(default)]
    pub resource: Option<String>,

    #[serde(default = "default_layer")]
    pub layer: String,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default = "default_icon_size")]
    pub width: u32,

    #[serde(default = "default_icon_size")]
    pub height: u32,
}

impl IconDirective {
    pub fn new(name: impl Into<String>, for_: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            for_: for_.into(),
            file: None,
            resource: None,
            layer: default_layer(),
            title: None,
            width: DEFAULT_ICON_SIZE,
            height: DEFAULT_ICON_SIZE,
        }
    }

    /// 建構器模式：設置圖片檔案
    pub fn with_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// 建構器模式：使用已註冊的資源
    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = Some(resource.into());
        self
    }

    /// 建構器模式：設置標題
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// 建構器模式：設置寬高
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

/// 依序執行的一組指令
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DirectiveSet {
    directives: Vec<Directive>,
}

impl DirectiveSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// 從 JSON 陣列載入
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// 從 JSON 檔案載入，相對路徑以檔案所在目錄為基準
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut set = Self::from_json(&content)?;
        if let Some(base) = path.parent() {
            set.resolve_paths(base);
        }
        Ok(set)
    }

    /// 建構器模式：加入指令
    pub fn with(mut self, directive: Directive) -> Self {
        self.directives.push(directive);
        self
    }

    pub fn push(&mut self, directive: Directive) {
        self.directives.push(directive);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Directive> {
        self.directives.iter()
    }

    pub fn len(&self) -> usize {
        self.directives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directives.is_empty()
    }

    /// 將相對路徑改為以 `base` 為基準
    pub fn resolve_paths(&mut self, base: &Path) {
        let resolve = |path: &mut PathBuf| {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        };

        for directive in &mut self.directives {
            match directive {
                Directive::Resource(d) => {
                    d.file.iter_mut().for_each(resolve);
                    d.image.iter_mut().for_each(resolve);
                    d.template.iter_mut().for_each(resolve);
                }
                Directive::ResourceDirectory(d) => resolve(&mut d.directory),
                Directive::I18nResource(d) => {
                    for translation in &mut d.translations {
                        translation.file.iter_mut().for_each(resolve);
                        translation.image.iter_mut().for_each(resolve);
                    }
                }
                Directive::Icon(d) => d.file.iter_mut().for_each(resolve),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_directives() {
        let json = r#"[
            {"kind": "resource", "name": "test.txt", "file": "testfiles/test.txt"},
            {"kind": "resource", "name": "index", "factory": "views.IndexFactory", "layer": "skin"},
            {"kind": "resource_directory", "name": "files", "directory": "testfiles"},
            {"kind": "i18n_resource", "name": "logo", "default_language": "fr",
             "translations": [{"language": "fr", "file": "fr.gif"}]},
            {"kind": "icon", "name": "zmi_icon", "for": "zope.component.testfiles.views.IC", "file": "test.gif"}
        ]"#;

        let set = DirectiveSet::from_json(json).unwrap();
        assert_eq!(set.len(), 5);

        let directives: Vec<_> = set.iter().collect();
        assert_eq!(
            directives[0],
            &Directive::Resource(ResourceDirective::file("test.txt", "testfiles/test.txt"))
        );
        assert_eq!(
            directives[1],
            &Directive::Resource(
                ResourceDirective::factory("index", "views.IndexFactory").with_layer("skin")
            )
        );
        match directives[3] {
            Directive::I18nResource(d) => {
                assert_eq!(d.default_language, "fr");
                assert_eq!(d.permission, None);
                assert_eq!(d.translations.len(), 1);
            }
            other => panic!("unexpected directive: {other:?}"),
        }
        match directives[4] {
            Directive::Icon(d) => {
                assert_eq!(d.width, 16);
                assert_eq!(d.height, 16);
                assert_eq!(d.title, None);
            }
            other => panic!("unexpected directive: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_paths() {
        let mut set = DirectiveSet::new()
            .with(Directive::Resource(ResourceDirective::file("a", "a.txt")))
            .with(Directive::Resource(ResourceDirective::file("b", "/abs/b.txt")))
            .with(Directive::ResourceDirectory(ResourceDirectoryDirective::new("d", "dir")));

        set.resolve_paths(Path::new("/etc/app"));

        let directives: Vec<_> = set.iter().cloned().collect();
        assert_eq!(
            directives[0],
            Directive::Resource(ResourceDirective::file("a", "/etc/app/a.txt"))
        );
        assert_eq!(
            directives[1],
            Directive::Resource(ResourceDirective::file("b", "/abs/b.txt"))
        );
        assert_eq!(
            directives[2],
            Directive::ResourceDirectory(ResourceDirectoryDirective::new("d", "/etc/app/dir"))
        );
    }

    #[test]
    fn test_from_json_file_resolves_relative_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.json");
        std::fs::write(
            &path,
            r#"[
                {"kind": "resource", "name": "a", "file": "static/a.txt"},
                {"kind": "resource", "name": "b", "file": "/srv/b.txt"},
                {"kind": "i18n_resource", "name": "c",
                 "translations": [{"language": "en", "image": "c_en.gif"}]}
            ]"#,
        )
        .unwrap();

        let set = DirectiveSet::from_json_file(&path).unwrap();
        let directives: Vec<_> = set.iter().cloned().collect();

        assert_eq!(
            directives[0],
            Directive::Resource(ResourceDirective::file("a", dir.path().join("static/a.txt")))
        );
        assert_eq!(
            directives[1],
            Directive::Resource(ResourceDirective::file("b", "/srv/b.txt"))
        );
        match &directives[2] {
            Directive::I18nResource(d) => {
                assert_eq!(d.translations[0].image, Some(dir.path().join("c_en.gif")));
            }
            other => panic!("unexpected directive: {other:?}"),
        }

        assert!(matches!(
            DirectiveSet::from_json_file(&dir.path().join("missing.json")),
            Err(crate::ResourceError::Io(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(DirectiveSet::from_json(r#"[{"kind": "unknown"}]"#).is_err());
    }
}
