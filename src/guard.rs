//! 守卫策略模块 - 纯业务逻辑层
//!
//! 不依赖 worker 类型，路径与 Cookie 头都是普通字符串，
//! 因此可以在宿主环境直接单元测试。入口层只负责把判定结果
//! 翻译成资源转发或 302 重定向。

use omnilearn_shared::SESSION_COOKIE;

/// 守卫判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardVerdict {
    /// 放行，转发给静态资源
    Allow,
    /// 重定向到登录页，`return_to` 为原始请求路径
    RedirectToLogin { return_to: String },
}

/// 无需会话即可访问的路径
///
/// - `/` 公开落地页（未登录用户在这里使用访客模式）
/// - `/auth/*` 登录与注册入口，拦截它们会造成重定向死循环
/// - 带扩展名的文件与公共目录视为静态资源
fn is_public(path: &str) -> bool {
    if path == "/" {
        return true;
    }
    if path.starts_with("/auth") {
        return true;
    }
    if path.contains('.') {
        return true;
    }
    path.starts_with("/favicon") || path.starts_with("/images") || path.starts_with("/public")
}

/// 从 Cookie 头中取出指定名字的 cookie 值
pub fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        pair.trim().strip_prefix(name)?.strip_prefix('=')
    })
}

/// 核心守卫逻辑
///
/// 公开路径一律放行；其余路径要求 Cookie 头中带有非空会话值。
pub fn evaluate(path: &str, cookie_header: Option<&str>) -> GuardVerdict {
    if is_public(path) {
        return GuardVerdict::Allow;
    }

    let session = cookie_header
        .and_then(|h| cookie_value(h, SESSION_COOKIE))
        .filter(|v| !v.is_empty());

    match session {
        Some(_) => GuardVerdict::Allow,
        None => GuardVerdict::RedirectToLogin {
            return_to: path.to_string(),
        },
    }
}
