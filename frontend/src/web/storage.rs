//! 浏览器持久化封装模块
//!
//! 会话凭证的"双写"落在两个互相独立的存储位置上：
//! - `LocalStorage`：长生命周期，仅页面内可见
//! - `CookieJar`：短有效期、全站路径，边缘守卫唯一能读到的那一半
//!
//! 两者都基于 `web_sys` 直接封装，不引入 gloo-storage，减小 WASM 体积。

use wasm_bindgen::JsCast;

/// LocalStorage 操作封装
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }

    /// 获取存储的字符串值；键不存在或存储被禁用时返回 `None`
    pub fn get(key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    /// 设置存储值，返回操作是否成功
    ///
    /// 用户代理可能禁用存储，调用方不应依赖写入一定成功。
    pub fn set(key: &str, value: &str) -> bool {
        Self::storage()
            .and_then(|s| s.set_item(key, value).ok())
            .is_some()
    }

    /// 删除键值对，返回操作是否成功
    pub fn delete(key: &str) -> bool {
        Self::storage()
            .and_then(|s| s.remove_item(key).ok())
            .is_some()
    }
}

/// document.cookie 操作封装
///
/// 写入固定为 `Path=/; SameSite=Lax`，与边缘守卫读取的约定一致。
pub struct CookieJar;

impl CookieJar {
    fn document() -> Option<web_sys::HtmlDocument> {
        web_sys::window()?
            .document()?
            .dyn_into::<web_sys::HtmlDocument>()
            .ok()
    }

    /// 读取指定名字的 cookie 值
    pub fn get(name: &str) -> Option<String> {
        let raw = Self::document()?.cookie().ok()?;
        raw.split(';').find_map(|pair| {
            pair.trim()
                .strip_prefix(name)?
                .strip_prefix('=')
                .map(|v| v.to_string())
        })
    }

    /// 写入 cookie，`max_age_secs` 为 0 表示立即作废
    ///
    /// 作废必须通过 Max-Age=0 下发，单纯清掉客户端状态挡不住
    /// 浏览器缓存里的旧 cookie。
    pub fn set(name: &str, value: &str, max_age_secs: i64) -> bool {
        let cookie = format!(
            "{}={}; Path=/; Max-Age={}; SameSite=Lax",
            name, value, max_age_secs
        );
        Self::document()
            .and_then(|d| d.set_cookie(&cookie).ok())
            .is_some()
    }
}
