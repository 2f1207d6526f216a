//! 路由定义模块 - 领域模型
//!
//! 纯粹的业务逻辑层，不依赖 DOM 或 web_sys。
//! 定义应用的所有路由及其属性，包括登录页携带的回跳目标。

use omnilearn_shared::RETURN_TO_PARAM;
use std::fmt::Display;

/// 应用路由枚举
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AppRoute {
    /// 公开落地页（访客模式入口，默认路由）
    #[default]
    Home,
    /// 登录页面，`next` 为登录成功后的回跳路径
    Login { next: Option<String> },
    /// 注册页面
    Register,
    /// 个人资料页（需要认证）
    Profile,
    /// 页面未找到
    NotFound,
}

impl AppRoute {
    /// 将 URL path + query 解析为路由枚举
    ///
    /// `query` 不含开头的 `?`，可以为空。
    pub fn from_path(path: &str, query: &str) -> Self {
        match path {
            "/" => Self::Home,
            "/auth/login" => Self::Login {
                next: query_param(query, RETURN_TO_PARAM),
            },
            "/auth/register" => Self::Register,
            "/profile" => Self::Profile,
            _ => Self::NotFound,
        }
    }

    /// 获取路由对应的 URL path（含必要的查询参数）
    pub fn to_path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login { next: None } => "/auth/login".to_string(),
            Self::Login { next: Some(next) } => {
                format!("/auth/login?{}={}", RETURN_TO_PARAM, next)
            }
            Self::Register => "/auth/register".to_string(),
            Self::Profile => "/profile".to_string(),
            Self::NotFound => "/404".to_string(),
        }
    }

    /// **核心守卫逻辑：定义该路由是否需要认证**
    ///
    /// 页面内导航的守卫与边缘守卫保持同一份口径。
    pub fn requires_auth(&self) -> bool {
        matches!(self, Self::Profile)
    }

    /// 已认证用户是否应该离开此路由（登录/注册页）
    pub fn should_redirect_when_authenticated(&self) -> bool {
        matches!(self, Self::Login { .. } | Self::Register)
    }

    /// 认证失败时的重定向目标，携带原始目的地
    pub fn auth_failure_redirect(&self) -> Self {
        Self::Login {
            next: Some(self.to_path()),
        }
    }

    /// 认证成功时的重定向目标（从登录页回跳）
    pub fn auth_success_redirect(&self) -> Self {
        if let Self::Login { next: Some(next) } = self {
            let route = Self::from_path(next, "");
            if route != Self::NotFound {
                return route;
            }
        }
        Self::Home
    }
}

impl Display for AppRoute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_path())
    }
}

/// 从 query 字符串中取出指定参数的值
fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        pair.strip_prefix(name)?
            .strip_prefix('=')
            .filter(|v| !v.is_empty())
            .map(|v| v.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_with_return_destination() {
        let route = AppRoute::from_path("/auth/login", "next=/profile");
        assert_eq!(
            route,
            AppRoute::Login {
                next: Some("/profile".to_string())
            }
        );
        assert_eq!(route.auth_success_redirect(), AppRoute::Profile);
    }

    #[test]
    fn login_without_destination_falls_back_to_home() {
        let route = AppRoute::from_path("/auth/login", "");
        assert_eq!(route.auth_success_redirect(), AppRoute::Home);
    }

    #[test]
    fn failure_redirect_records_the_attempted_path() {
        let redirect = AppRoute::Profile.auth_failure_redirect();
        assert_eq!(redirect.to_path(), "/auth/login?next=/profile");
    }

    #[test]
    fn unknown_paths_resolve_to_not_found() {
        assert_eq!(AppRoute::from_path("/nope", ""), AppRoute::NotFound);
    }
}
