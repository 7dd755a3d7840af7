//! # 檔案管理範例
//!
//! 這個範例展示：
//! - 以快取屬性記住依檔名計算的結果
//! - 以揮發屬性保存存取記錄
//! - 以註冊指令發佈目錄資源

use std::sync::{Arc, OnceLock};

use anyhow::Context;
use cachedesc::cache::Result as CacheResult;
use cachedesc::resource::{Directive, DirectiveSet, ResourceDirectoryDirective, ResourceRegistry};
use cachedesc::{AttrValue, Attributes, CacheError, CacheHost, CacheSlots, CachedProperty, PropertyTable, Volatile};
use tracing_subscriber::EnvFilter;

/// 檔案管理器
#[derive(Debug, Default)]
struct FileManager {
    filename: String,
    encoding: String,
    cache: CacheSlots,
}

impl Attributes for FileManager {
    fn attribute(&self, name: &str) -> CacheResult<AttrValue> {
        match name {
            "filename" => Ok(AttrValue::from(self.filename.as_str())),
            "encoding" => Ok(AttrValue::from(self.encoding.as_str())),
            _ => Err(CacheError::AttributeNotFound(name.to_string())),
        }
    }
}

impl CacheHost for FileManager {
    fn cache_slots(&self) -> &CacheSlots {
        &self.cache
    }
}

struct Bindings {
    contents: Arc<CachedProperty<FileManager, String>>,
    access_log: Arc<Volatile<FileManager, Vec<String>>>,
}

fn bindings() -> &'static Bindings {
    static BINDINGS: OnceLock<Bindings> = OnceLock::new();
    BINDINGS.get_or_init(|| {
        let mut table = PropertyTable::new();
        let contents = table
            .try_property(
                "contents",
                |fm: &FileManager| {
                    tracing::info!(filename = %fm.filename, "讀取檔案");
                    std::fs::read_to_string(&fm.filename)
                        .map_err(|e| CacheError::compute(format!("{}: {e}", fm.filename)))
                },
                &["filename", "encoding"],
            )
            .expect("宣告表內名稱唯一");
        let access_log = table
            .volatile("_v_access_log", Vec::new)
            .expect("宣告表內名稱唯一");
        Bindings {
            contents,
            access_log,
        }
    })
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("===== File Manager Example =====\n");

    let dir = std::env::temp_dir().join("cachedesc-file-manager");
    std::fs::create_dir_all(&dir).context("建立範例目錄失敗")?;
    let first = dir.join("first.txt");
    let second = dir.join("second.txt");
    std::fs::write(&first, "first file\n")?;
    std::fs::write(&second, "second file\n")?;

    // 步驟 1: 快取屬性
    println!("[1] Cached property");
    let b = bindings();
    let mut fm = FileManager {
        filename: first.display().to_string(),
        encoding: "utf-8".to_string(),
        ..Default::default()
    };

    for _ in 0..3 {
        let contents = b.contents.get(&fm)?;
        b.access_log
            .with_mut(&fm, |log| log.push(fm.filename.clone()))?;
        println!("    {}", contents.trim_end());
    }

    fm.filename = second.display().to_string();
    println!("    {}", b.contents.get(&fm)?.trim_end());
    println!("    state: {:?}", b.contents.state(&fm)?);
    println!("    accesses: {}\n", b.access_log.get(&fm)?.len());

    // 步驟 2: 目錄資源
    println!("[2] Resource directory");
    let mut registry = ResourceRegistry::new();
    let directives =
        DirectiveSet::new().with(Directive::ResourceDirectory(ResourceDirectoryDirective::new(
            "files", &dir,
        )));
    registry.execute_all(&directives)?;

    for name in ["files/first.txt", "files/second.txt"] {
        let resource = registry.resolve(name)?;
        let file = resource.as_file().context("不是檔案資源")?;
        println!(
            "    {} ({}) -> {}",
            resource.url("http://localhost:8080"),
            file.file().content_type(),
            file.cache_control()
        );
    }

    if let Err(e) = registry.resolve("files/missing.txt") {
        println!("    {e}");
    }

    Ok(())
}
