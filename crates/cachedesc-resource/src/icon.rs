//! 圖示

use crate::url::resource_url;

/// 預設圖示寬高（像素）
pub const DEFAULT_ICON_SIZE: u32 = 16;

/// 圖示視圖：以 `<img>` 標籤呈現某個已註冊的圖片資源
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconView {
    /// 圖片資源名稱
    pub resource_name: String,
    /// 替代文字
    pub alt: String,
    pub width: u32,
    pub height: u32,
}

impl IconView {
    /// 創建圖示視圖
    pub fn new(resource_name: impl Into<String>, alt: impl Into<String>) -> Self {
        Self {
            resource_name: resource_name.into(),
            alt: alt.into(),
            width: DEFAULT_ICON_SIZE,
            height: DEFAULT_ICON_SIZE,
        }
    }

    /// 建構器模式：設置寬高
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// 圖片資源網址
    pub fn url(&self, site_url: &str) -> String {
        resource_url(site_url, &self.resource_name)
    }

    /// 呈現為 HTML
    pub fn render(&self, site_url: &str) -> String {
        format!(
            r#"<img src="{}" alt="{}" width="{}" height="{}" border="0" />"#,
            self.url(site_url),
            self.alt,
            self.width,
            self.height
        )
    }
}
