//! 資源註冊表
//!
//! 執行註冊指令並依 `(名稱, 請求層)` 查找資源。

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::directive::{
    Directive, DirectiveSet, I18nResourceDirective, IconDirective, ResourceDirective,
    ResourceDirectoryDirective, DEFAULT_LAYER, PUBLIC_PERMISSION,
};
use crate::directory::DirectoryResource;
use crate::factory::{FactoryRegistry, ResourceKind};
use crate::file::{File, FileResource};
use crate::i18n::I18nFileResource;
use crate::icon::IconView;
use crate::resource::{CustomResource, Resource};
use crate::{ResourceError, Result};

/// 存取權限
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Permission {
    /// 公開
    Public,
    /// 具名權限
    Named(String),
}

impl From<&str> for Permission {
    fn from(name: &str) -> Self {
        if name == PUBLIC_PERMISSION {
            Permission::Public
        } else {
            Permission::Named(name.to_string())
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Permission::Public => f.write_str(PUBLIC_PERMISSION),
            Permission::Named(name) => f.write_str(name),
        }
    }
}

/// 已註冊的資源
#[derive(Debug, Clone)]
pub struct Registration {
    pub resource: Resource,
    pub layer: String,
    pub permission: Permission,
}

type ResourceKey = (String, String);
type Discriminator = (&'static str, String, String);
type IconKey = (String, String, String);

/// 檔案資源與資源目錄共用的衝突類別
const RESOURCE: &str = "resource";
/// 多語系資源的衝突類別
const I18N_RESOURCE: &str = "i18n-resource";

/// 資源註冊表
#[derive(Debug, Default)]
pub struct ResourceRegistry {
    base_dir: Option<PathBuf>,
    factories: Arc<FactoryRegistry>,
    resources: HashMap<ResourceKey, Registration>,
    discriminators: HashSet<Discriminator>,
    icons: HashMap<IconKey, IconView>,
}

impl ResourceRegistry {
    /// 創建空的註冊表（使用預設資源工廠）
    pub fn new() -> Self {
        Self::default()
    }

    /// 建構器模式：設置資源工廠
    pub fn with_factories(mut self, factories: FactoryRegistry) -> Self {
        self.factories = Arc::new(factories);
        self
    }

    /// 建構器模式：相對路徑的基準目錄
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = Some(base_dir.into());
        self
    }

    /// 註冊副檔名對應的資源類型
    ///
    /// 只影響之後執行的指令。
    pub fn register_factory(&mut self, extension: &str, kind: ResourceKind) {
        Arc::make_mut(&mut self.factories).register(extension, kind);
    }

    /// 資源工廠
    pub fn factories(&self) -> &FactoryRegistry {
        &self.factories
    }

    /// 執行單一指令
    pub fn execute(&mut self, directive: &Directive) -> Result<()> {
        match directive {
            Directive::Resource(d) => self.resource(d),
            Directive::ResourceDirectory(d) => self.resource_directory(d),
            Directive::I18nResource(d) => self.i18n_resource(d),
            Directive::Icon(d) => self.icon_directive(d),
        }
    }

    /// 依序執行一組指令，遇到錯誤即停止
    pub fn execute_all(&mut self, directives: &DirectiveSet) -> Result<()> {
        for directive in directives.iter() {
            self.execute(directive)?;
        }
        tracing::info!(
            directives = directives.len(),
            resources = self.resources.len(),
            "資源指令執行完成"
        );
        Ok(())
    }

    /// 從 JSON 載入並執行指令
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        let directives = DirectiveSet::from_json(json)?;
        self.execute_all(&directives)
    }

    /// 依名稱與請求層查找資源
    pub fn lookup(&self, name: &str, layer: &str) -> Option<&Registration> {
        self.resources.get(&(name.to_string(), layer.to_string()))
    }

    /// 在預設請求層走訪資源（`@@/<名稱>`）
    pub fn traverse(&self, name: &str) -> Result<Resource> {
        self.lookup(name, DEFAULT_LAYER)
            .map(|registration| registration.resource.clone())
            .ok_or_else(|| ResourceError::not_found(None, name))
    }

    /// 走訪以 `/` 分隔的資源路徑，例如 `files/subdir/test.gif`
    pub fn resolve(&self, path: &str) -> Result<Resource> {
        let mut segments = path.split('/').filter(|segment| !segment.is_empty());
        let first = segments
            .next()
            .ok_or_else(|| ResourceError::not_found(None, path))?;

        segments.try_fold(self.traverse(first)?, |resource, segment| {
            resource.traverse(segment)
        })
    }

    /// 查找介面上的圖示
    pub fn icon(&self, for_: &str, name: &str, layer: &str) -> Option<&IconView> {
        self.icons
            .get(&(for_.to_string(), name.to_string(), layer.to_string()))
    }

    /// 已註冊的資源數量
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    fn path(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// 登記資源
    ///
    /// 衝突以 `(類別, 名稱, 請求層)` 判斷；不同類別的同名資源不衝突，
    /// 查找時以後註冊者為準。
    fn register(
        &mut self,
        kind: &'static str,
        name: &str,
        layer: &str,
        permission: Permission,
        resource: Resource,
    ) -> Result<()> {
        let discriminator = (kind, name.to_string(), layer.to_string());
        if self.discriminators.contains(&discriminator) {
            return Err(ResourceError::Conflict(format!(
                "{kind} {name} 已在請求層 {layer} 註冊"
            )));
        }

        tracing::info!(kind, resource = name, layer, %permission, "註冊資源");
        self.discriminators.insert(discriminator);
        self.resources.insert(
            (name.to_string(), layer.to_string()),
            Registration {
                resource,
                layer: layer.to_string(),
                permission,
            },
        );
        Ok(())
    }

    fn resource(&mut self, d: &ResourceDirective) -> Result<()> {
        let given = [
            d.factory.is_some(),
            d.file.is_some(),
            d.image.is_some(),
            d.template.is_some(),
        ];
        if given.iter().filter(|given| **given).count() > 1 {
            return Err(ResourceError::Configuration(
                "資源指令的 factory、file、image、template 只能指定其中一個".to_string(),
            ));
        }

        if d.image.is_some() || d.template.is_some() {
            tracing::warn!(
                resource = %d.name,
                "資源指令的 image 與 template 屬性已淘汰，請改用 file 並依副檔名選擇資源工廠"
            );
        }

        let resource = if let Some(factory) = &d.factory {
            Resource::Custom(CustomResource {
                name: d.name.clone(),
                factory: factory.clone(),
            })
        } else {
            let file = d
                .file
                .as_ref()
                .or(d.image.as_ref())
                .or(d.template.as_ref())
                .ok_or_else(|| {
                    ResourceError::Configuration(
                        "資源指令必須指定 factory、file、image、template 其中一個".to_string(),
                    )
                })?;
            let path = self.path(file);
            let kind = self.factories.kind_for_path(&path);
            Resource::File(FileResource::open(&path, &d.name, kind)?)
        };

        self.register(RESOURCE, &d.name, &d.layer, d.permission.as_str().into(), resource)
    }

    fn resource_directory(&mut self, d: &ResourceDirectoryDirective) -> Result<()> {
        let directory = self.path(&d.directory);
        if !directory.is_dir() {
            return Err(ResourceError::Configuration(format!(
                "目錄 {} 不存在",
                directory.display()
            )));
        }

        let resource = Resource::Directory(DirectoryResource::new(
            directory,
            d.name.clone(),
            self.factories.clone(),
        ));
        self.register(RESOURCE, &d.name, &d.layer, d.permission.as_str().into(), resource)
    }

    fn i18n_resource(&mut self, d: &I18nResourceDirective) -> Result<()> {
        let name = d.name.as_deref().unwrap_or_default();

        let mut files = BTreeMap::new();
        for translation in &d.translations {
            let file = match (&translation.file, &translation.image) {
                (Some(_), Some(_)) => {
                    return Err(ResourceError::Configuration(
                        "翻譯的 file 與 image 只能指定其中一個".to_string(),
                    ));
                }
                (None, None) => {
                    return Err(ResourceError::Configuration(
                        "翻譯必須指定 file 或 image".to_string(),
                    ));
                }
                (Some(file), None) => file,
                (None, Some(image)) => {
                    tracing::warn!(
                        resource = name,
                        language = %translation.language,
                        "多語系資源的 image 屬性已淘汰，請改用 file"
                    );
                    image
                }
            };
            let file = File::open(self.path(file), name)?;
            files.insert(translation.language.clone(), Arc::new(file));
        }

        let Some(name) = d.name.as_deref() else {
            tracing::debug!("多語系資源未指定名稱，略過註冊");
            return Ok(());
        };

        let resource = I18nFileResource::new(name, files, d.default_language.clone())?;
        let permission = d
            .permission
            .as_deref()
            .map_or(Permission::Public, Permission::from);
        self.register(I18N_RESOURCE, name, &d.layer, permission, Resource::I18n(resource))
    }

    fn icon_directive(&mut self, d: &IconDirective) -> Result<()> {
        let (module, iname) = d.for_.rsplit_once('.').unwrap_or(("", d.for_.as_str()));
        let title = d
            .title
            .clone()
            .unwrap_or_else(|| iname.strip_prefix('I').unwrap_or(iname).to_string());

        let resource_name = match (&d.file, &d.resource) {
            (Some(_), Some(_)) => {
                return Err(ResourceError::Configuration(
                    "圖示指令的 file 與 resource 只能指定其中一個".to_string(),
                ));
            }
            (None, None) => {
                return Err(ResourceError::Configuration(
                    "圖示指令必須指定 file 或 resource".to_string(),
                ));
            }
            (None, Some(resource)) => resource.clone(),
            (Some(file), None) => {
                let mut resource_name = format!("{}-{iname}-{}", module.replace('.', "-"), d.name);
                if let Some(ext) = file.extension().and_then(|ext| ext.to_str()) {
                    resource_name.push('.');
                    resource_name.push_str(ext);
                }
                let directive = ResourceDirective::file(resource_name.clone(), file.clone())
                    .with_layer(d.layer.clone());
                self.resource(&directive)?;
                resource_name
            }
        };

        tracing::info!(icon = %d.name, interface = %d.for_, resource = %resource_name, "註冊圖示");
        let view = IconView::new(resource_name, title).with_size(d.width, d.height);
        self.icons
            .insert((d.for_.clone(), d.name.clone(), d.layer.clone()), view);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directive::Translation;
    use std::fs;

    fn testfiles() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("test.txt"), b"test data\n").unwrap();
        fs::write(dir.path().join("test.gif"), b"GIF89a").unwrap();
        fs::write(dir.path().join("test.pt"), b"<html />").unwrap();
        fs::write(dir.path().join("test_en.txt"), b"English").unwrap();
        fs::write(dir.path().join("test_fr.txt"), "Français").unwrap();
        fs::create_dir(dir.path().join("subdir")).unwrap();
        fs::write(dir.path().join("subdir").join("test.gif"), b"GIF89a").unwrap();
        dir
    }

    fn registry(dir: &tempfile::TempDir) -> ResourceRegistry {
        ResourceRegistry::new().with_base_dir(dir.path())
    }

    #[test]
    fn test_register_file_resource() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        registry
            .execute(&Directive::Resource(ResourceDirective::file("test", "test.txt")))
            .unwrap();

        let registration = registry.lookup("test", DEFAULT_LAYER).unwrap();
        assert_eq!(registration.permission, Permission::Public);

        let resource = registry.traverse("test").unwrap();
        assert_eq!(resource.as_file().unwrap().read().unwrap(), b"test data\n");
        assert_eq!(resource.url("http://127.0.0.1"), "http://127.0.0.1/@@/test");
    }

    #[test]
    fn test_file_resource_uses_extension_factory() {
        let dir = testfiles();
        let mut registry = registry(&dir);
        registry.register_factory("pt", ResourceKind::Template);

        registry
            .execute(&Directive::Resource(ResourceDirective::file("page", "test.pt")))
            .unwrap();
        registry
            .execute(&Directive::Resource(ResourceDirective::file("text", "test.txt")))
            .unwrap();

        assert_eq!(registry.traverse("page").unwrap().kind(), Some(&ResourceKind::Template));
        assert_eq!(registry.traverse("text").unwrap().kind(), Some(&ResourceKind::File));
    }

    #[test]
    fn test_resource_requires_exactly_one_source() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        let both = ResourceDirective::file("test", "test.txt").with_image("test.gif");
        assert!(matches!(
            registry.execute(&Directive::Resource(both)),
            Err(ResourceError::Configuration(_))
        ));

        let mut none = ResourceDirective::file("test", "test.txt");
        none.file = None;
        assert!(matches!(
            registry.execute(&Directive::Resource(none)),
            Err(ResourceError::Configuration(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_deprecated_image_attribute() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        let mut directive = ResourceDirective::file("img", "unused");
        directive.file = None;
        let directive = directive.with_image("test.gif");
        registry.execute(&Directive::Resource(directive)).unwrap();

        let resource = registry.traverse("img").unwrap();
        assert_eq!(resource.as_file().unwrap().file().content_type(), "image/gif");
    }

    #[test]
    fn test_factory_and_permission() {
        let mut registry = ResourceRegistry::new();
        registry
            .execute(&Directive::Resource(
                ResourceDirective::factory("index", "views.IndexFactory")
                    .with_permission("zope.ManageContent"),
            ))
            .unwrap();

        let registration = registry.lookup("index", DEFAULT_LAYER).unwrap();
        assert_eq!(
            registration.permission,
            Permission::Named("zope.ManageContent".to_string())
        );
        match &registration.resource {
            Resource::Custom(custom) => assert_eq!(custom.factory, "views.IndexFactory"),
            other => panic!("unexpected resource: {other:?}"),
        }
    }

    #[test]
    fn test_conflicting_registrations() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        registry
            .execute(&Directive::Resource(ResourceDirective::file("test", "test.txt")))
            .unwrap();
        let err = registry
            .execute(&Directive::ResourceDirectory(ResourceDirectoryDirective::new(
                "test", "subdir",
            )))
            .unwrap_err();
        assert!(matches!(err, ResourceError::Conflict(_)));

        // 不同請求層不衝突
        registry
            .execute(&Directive::Resource(
                ResourceDirective::file("test", "test.gif").with_layer("skin"),
            ))
            .unwrap();
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_i18n_resource_does_not_conflict_with_file_resource() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        registry
            .execute(&Directive::Resource(ResourceDirective::file("greet", "test.txt")))
            .unwrap();
        let i18n = I18nResourceDirective::new("greet")
            .with_translation(Translation::file("en", "test_en.txt"));
        registry.execute(&Directive::I18nResource(i18n.clone())).unwrap();

        // 後註冊者為準
        assert!(registry.traverse("greet").unwrap().as_i18n().is_some());
        assert_eq!(registry.len(), 1);

        // 同類別仍然衝突
        assert!(matches!(
            registry.execute(&Directive::I18nResource(i18n)),
            Err(ResourceError::Conflict(_))
        ));
    }

    #[test]
    fn test_resource_directory() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        registry
            .execute(&Directive::ResourceDirectory(ResourceDirectoryDirective::new(
                "files", ".",
            )))
            .unwrap();

        let resource = registry.resolve("files/subdir/test.gif").unwrap();
        assert_eq!(resource.name(), "files/subdir/test.gif");
        assert!(registry.resolve("files/missing.txt").unwrap_err().is_not_found());
        assert!(registry.resolve("").unwrap_err().is_not_found());

        let missing = ResourceDirectoryDirective::new("nothing", "does-not-exist");
        assert!(matches!(
            registry.execute(&Directive::ResourceDirectory(missing)),
            Err(ResourceError::Configuration(_))
        ));
    }

    #[test]
    fn test_i18n_resource() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        let directive = I18nResourceDirective::new("i18n")
            .with_default_language("fr")
            .with_translation(Translation::file("en", "test_en.txt"))
            .with_translation(Translation::file("fr", "test_fr.txt"));
        registry.execute(&Directive::I18nResource(directive)).unwrap();

        let resource = registry.traverse("i18n").unwrap();
        let i18n = resource.as_i18n().unwrap();
        assert_eq!(i18n.default_language(), "fr");
        assert_eq!(i18n.context().unwrap().read().unwrap(), "Français".as_bytes());
    }

    #[test]
    fn test_i18n_resource_validation() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        // 缺少預設語言
        let directive = I18nResourceDirective::new("i18n")
            .with_translation(Translation::file("fr", "test_fr.txt"));
        assert!(matches!(
            registry.execute(&Directive::I18nResource(directive)),
            Err(ResourceError::Configuration(_))
        ));

        // file 與 image 同時指定
        let mut translation = Translation::file("en", "test_en.txt");
        translation.image = Some("test.gif".into());
        let directive = I18nResourceDirective::new("i18n").with_translation(translation);
        assert!(matches!(
            registry.execute(&Directive::I18nResource(directive)),
            Err(ResourceError::Configuration(_))
        ));

        // 未指定名稱：只驗證，不註冊
        let mut directive = I18nResourceDirective::new("unused")
            .with_translation(Translation::file("en", "test_en.txt"));
        directive.name = None;
        registry.execute(&Directive::I18nResource(directive)).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_icon_with_file() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        let directive =
            IconDirective::new("zmi_icon", "zope.component.testfiles.views.IC").with_file("test.gif");
        registry.execute(&Directive::Icon(directive)).unwrap();

        let rname = "zope-component-testfiles-views-IC-zmi_icon.gif";
        assert!(registry.traverse(rname).is_ok());

        let view = registry
            .icon("zope.component.testfiles.views.IC", "zmi_icon", DEFAULT_LAYER)
            .unwrap();
        assert_eq!(
            view.render("http://127.0.0.1"),
            format!(
                r#"<img src="http://127.0.0.1/@@/{rname}" alt="C" width="16" height="16" border="0" />"#
            )
        );
    }

    #[test]
    fn test_icon_with_resource() {
        let dir = testfiles();
        let mut registry = registry(&dir);
        registry
            .execute(&Directive::Resource(ResourceDirective::file("zmi_icon_res", "test.gif")))
            .unwrap();

        let directive = IconDirective::new("zmi_icon", "zope.component.testfiles.views.IC")
            .with_resource("zmi_icon_res")
            .with_title("click this!")
            .with_size(20, 12);
        registry.execute(&Directive::Icon(directive)).unwrap();

        let view = registry
            .icon("zope.component.testfiles.views.IC", "zmi_icon", DEFAULT_LAYER)
            .unwrap();
        assert_eq!(
            view.render("http://127.0.0.1"),
            r#"<img src="http://127.0.0.1/@@/zmi_icon_res" alt="click this!" width="20" height="12" border="0" />"#
        );
    }

    #[test]
    fn test_icon_validation() {
        let mut registry = ResourceRegistry::new();

        let neither = IconDirective::new("zmi_icon", "zope.component.testfiles.views.IC");
        assert!(matches!(
            registry.execute(&Directive::Icon(neither)),
            Err(ResourceError::Configuration(_))
        ));

        let both = IconDirective::new("zmi_icon", "zope.component.testfiles.views.IC")
            .with_file("test.gif")
            .with_resource("zmi_icon_res");
        assert!(matches!(
            registry.execute(&Directive::Icon(both)),
            Err(ResourceError::Configuration(_))
        ));
    }

    #[test]
    fn test_load_json() {
        let dir = testfiles();
        let mut registry = registry(&dir);

        registry
            .load_json(
                r#"[
                    {"kind": "resource", "name": "test.txt", "file": "test.txt"},
                    {"kind": "resource_directory", "name": "files", "directory": "subdir"}
                ]"#,
            )
            .unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.resolve("files/test.gif").is_ok());
        assert!(registry.traverse("missing").unwrap_err().is_not_found());
    }
}
