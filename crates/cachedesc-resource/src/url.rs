//! 資源網址

/// 資源名稱前綴（網址中不保留）
pub const RESOURCE_PREFIX: &str = "++resource++";

/// 資源命名空間（`<site>/@@/<name>`）
pub const RESOURCE_NAMESPACE: &str = "@@";

/// 計算資源的絕對網址
pub fn resource_url(site_url: &str, name: &str) -> String {
    let name = name.strip_prefix(RESOURCE_PREFIX).unwrap_or(name);
    format!(
        "{}/{}/{}",
        site_url.trim_end_matches('/'),
        RESOURCE_NAMESPACE,
        name
    )
}
