//! 会话令牌存储模块 (Token Store)
//!
//! 同一个逻辑值的两个副本：LocalStorage（页面可见）与 Cookie（边缘守卫
//! 可见）。`persist` 是唯一的写入口，一次写两处；`clear` 是唯一的清除
//! 入口，一次作废两处。存储可能被用户代理禁用，写失败一律吞掉。
//!
//! Cookie 有 Max-Age 而 LocalStorage 没有过期语义，为避免"页面认为已
//! 登录、边缘认为未登录"的重定向循环，LocalStorage 侧额外镜像一份过期
//! 时间戳，`restore` 时发现已过期就整体作废。

use omnilearn_shared::{SESSION_COOKIE, SESSION_EXPIRY_KEY, SESSION_MAX_AGE_SECS};

use crate::web::{CookieJar, LocalStorage};

/// 存储后端特性 (Trait)
///
/// 把两处存储与时钟抽象出来，让令牌生命周期逻辑可以在宿主环境单测。
pub trait SessionBackend {
    fn local_get(&self, key: &str) -> Option<String>;
    fn local_set(&self, key: &str, value: &str) -> bool;
    fn local_remove(&self, key: &str) -> bool;
    fn cookie_get(&self, name: &str) -> Option<String>;
    /// `max_age_secs` 为 0 表示立即作废
    fn cookie_set(&self, name: &str, value: &str, max_age_secs: i64) -> bool;
    /// 当前 Unix 毫秒时间戳
    fn now_ms(&self) -> i64;
}

/// 生产实现：浏览器 LocalStorage + document.cookie
pub struct WebSessionBackend;

impl SessionBackend for WebSessionBackend {
    fn local_get(&self, key: &str) -> Option<String> {
        LocalStorage::get(key)
    }

    fn local_set(&self, key: &str, value: &str) -> bool {
        LocalStorage::set(key, value)
    }

    fn local_remove(&self, key: &str) -> bool {
        LocalStorage::delete(key)
    }

    fn cookie_get(&self, name: &str) -> Option<String> {
        CookieJar::get(name)
    }

    fn cookie_set(&self, name: &str, value: &str, max_age_secs: i64) -> bool {
        CookieJar::set(name, value, max_age_secs)
    }

    fn now_ms(&self) -> i64 {
        js_sys::Date::now() as i64
    }
}

/// 令牌存储
pub struct TokenStore<B: SessionBackend> {
    backend: B,
}

impl TokenStore<WebSessionBackend> {
    pub fn new() -> Self {
        Self::with_backend(WebSessionBackend)
    }
}

impl Default for TokenStore<WebSessionBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: SessionBackend> TokenStore<B> {
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// 恢复既有会话：LocalStorage 优先，Cookie 兜底
    ///
    /// 进程启动时调用一次。LocalStorage 中的令牌若已过镜像的过期时间，
    /// 视为失效并顺手清掉两处。
    pub fn restore(&self) -> Option<String> {
        if let Some(token) = self
            .backend
            .local_get(SESSION_COOKIE)
            .filter(|t| !t.is_empty())
        {
            let lapsed = self
                .backend
                .local_get(SESSION_EXPIRY_KEY)
                .and_then(|v| v.parse::<i64>().ok())
                .is_some_and(|expires| expires <= self.backend.now_ms());

            if lapsed {
                self.clear();
            } else {
                return Some(token);
            }
        }

        self.backend
            .cookie_get(SESSION_COOKIE)
            .filter(|t| !t.is_empty())
    }

    /// 持久化令牌到两处存储
    pub fn persist(&self, token: &str) {
        let expires_at = self.backend.now_ms() + SESSION_MAX_AGE_SECS * 1000;
        let _ = self.backend.local_set(SESSION_COOKIE, token);
        let _ = self
            .backend
            .local_set(SESSION_EXPIRY_KEY, &expires_at.to_string());
        let _ = self
            .backend
            .cookie_set(SESSION_COOKIE, token, SESSION_MAX_AGE_SECS);
    }

    /// 清除两处存储
    pub fn clear(&self) {
        let _ = self.backend.local_remove(SESSION_COOKIE);
        let _ = self.backend.local_remove(SESSION_EXPIRY_KEY);
        let _ = self.backend.cookie_set(SESSION_COOKIE, "", 0);
    }

    /// 出站请求应携带的 Authorization 头；无会话时为 `None`
    #[allow(dead_code)]
    pub fn current_header(&self) -> Option<String> {
        self.restore().map(|token| format!("Bearer {}", token))
    }
}

// =========================================================
// 单元测试 (Unit Tests)
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    /// In-memory backend recording cookie writes with their max-age
    struct MockBackend {
        locals: RefCell<HashMap<String, String>>,
        cookies: RefCell<HashMap<String, (String, i64)>>,
        now: Cell<i64>,
    }

    impl MockBackend {
        fn new() -> Self {
            Self {
                locals: RefCell::new(HashMap::new()),
                cookies: RefCell::new(HashMap::new()),
                now: Cell::new(1_000),
            }
        }
    }

    impl SessionBackend for MockBackend {
        fn local_get(&self, key: &str) -> Option<String> {
            self.locals.borrow().get(key).cloned()
        }
        fn local_set(&self, key: &str, value: &str) -> bool {
            self.locals
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            true
        }
        fn local_remove(&self, key: &str) -> bool {
            self.locals.borrow_mut().remove(key).is_some()
        }
        fn cookie_get(&self, name: &str) -> Option<String> {
            self.cookies
                .borrow()
                .get(name)
                .filter(|(_, max_age)| *max_age > 0)
                .map(|(v, _)| v.clone())
        }
        fn cookie_set(&self, name: &str, value: &str, max_age_secs: i64) -> bool {
            self.cookies
                .borrow_mut()
                .insert(name.to_string(), (value.to_string(), max_age_secs));
            true
        }
        fn now_ms(&self) -> i64 {
            self.now.get()
        }
    }

    #[test]
    fn persist_then_restore_round_trips() {
        let store = TokenStore::with_backend(MockBackend::new());
        store.persist("tok-123");
        assert_eq!(store.restore().as_deref(), Some("tok-123"));
        assert_eq!(store.current_header().as_deref(), Some("Bearer tok-123"));
    }

    #[test]
    fn persist_writes_both_locations() {
        let store = TokenStore::with_backend(MockBackend::new());
        store.persist("tok-123");
        assert_eq!(
            store.backend.locals.borrow().get(SESSION_COOKIE).unwrap(),
            "tok-123"
        );
        let cookies = store.backend.cookies.borrow();
        let (value, max_age) = cookies.get(SESSION_COOKIE).unwrap();
        assert_eq!(value, "tok-123");
        assert_eq!(*max_age, SESSION_MAX_AGE_SECS);
    }

    #[test]
    fn clear_empties_both_and_zeroes_cookie_max_age() {
        let store = TokenStore::with_backend(MockBackend::new());
        store.persist("tok-123");
        store.clear();

        assert!(store.backend.locals.borrow().is_empty());
        // The cookie must be expired via Max-Age=0, not just forgotten
        let cookies = store.backend.cookies.borrow();
        assert_eq!(cookies.get(SESSION_COOKIE).unwrap().1, 0);
        drop(cookies);
        assert_eq!(store.restore(), None);
        assert_eq!(store.current_header(), None);
    }

    #[test]
    fn lapsed_local_token_is_invalidated_on_restore() {
        let store = TokenStore::with_backend(MockBackend::new());
        store.persist("tok-123");

        // Jump past the mirrored expiry
        store
            .backend
            .now
            .set(1_000 + SESSION_MAX_AGE_SECS * 1000 + 1);
        assert_eq!(store.restore(), None);
        assert!(store.backend.locals.borrow().is_empty());
    }

    #[test]
    fn restore_falls_back_to_cookie() {
        let backend = MockBackend::new();
        backend.cookie_set(SESSION_COOKIE, "cookie-tok", SESSION_MAX_AGE_SECS);
        let store = TokenStore::with_backend(backend);
        assert_eq!(store.restore().as_deref(), Some("cookie-tok"));
    }
}
