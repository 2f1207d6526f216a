//! 路由服务模块 - 核心引擎
//!
//! 封装 web_sys 的 History API，实现高内聚：
//! 所有对 window.history 的操作都集中在此模块。
//! 实现了"监听 -> 验证 -> 处理 -> 加载"的导航流程。
//!
//! 页面内导航的守卫只是体验优化；整页加载的权威检查在边缘 Worker，
//! 它读取的是会话 Cookie 而不是这里注入的信号。

use leptos::prelude::*;
use wasm_bindgen::prelude::*;

use super::route::AppRoute;

/// 获取当前浏览器路径
fn current_path() -> String {
    web_sys::window()
        .and_then(|w| w.location().pathname().ok())
        .unwrap_or_else(|| "/".to_string())
}

/// 获取当前查询字符串（不含 `?`）
fn current_query() -> String {
    web_sys::window()
        .and_then(|w| w.location().search().ok())
        .map(|s| s.trim_start_matches('?').to_string())
        .unwrap_or_default()
}

/// 推送 History 状态（内部工具函数）
fn push_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.push_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 替换 History 状态（内部工具函数，用于重定向）
fn replace_history_state(path: &str) {
    if let Some(window) = web_sys::window() {
        if let Ok(history) = window.history() {
            let _ = history.replace_state_with_url(&JsValue::NULL, "", Some(path));
        }
    }
}

/// 路由器服务
///
/// 封装所有路由操作，通过 Signal 驱动界面更新。
/// 通过注入认证检查信号实现与认证系统的解耦。
#[derive(Clone, Copy)]
pub struct RouterService {
    /// 当前路由（只读信号）
    current_route: ReadSignal<AppRoute>,
    /// 设置当前路由（写入信号）
    set_route: WriteSignal<AppRoute>,
    /// 认证状态检查（注入的信号，实现解耦）
    is_authenticated: Signal<bool>,
}

impl RouterService {
    /// 创建新的路由服务
    fn new(is_authenticated: Signal<bool>) -> Self {
        let initial_route = AppRoute::from_path(&current_path(), &current_query());
        let (current_route, set_route) = signal(initial_route);

        Self {
            current_route,
            set_route,
            is_authenticated,
        }
    }

    /// 获取当前路由信号
    pub fn current_route(&self) -> ReadSignal<AppRoute> {
        self.current_route
    }

    /// **核心方法：导航与守卫**
    ///
    /// 流程：请求 -> 验证(Guard) -> 处理 -> 加载
    pub fn navigate(&self, route: AppRoute) {
        self.navigate_to_route(route, true);
    }

    /// 按路径导航（解析后走统一流程）
    pub fn navigate_path(&self, path: &str) {
        let (path, query) = match path.split_once('?') {
            Some((p, q)) => (p, q),
            None => (path, ""),
        };
        self.navigate(AppRoute::from_path(path, query));
    }

    /// 导航到指定路由
    ///
    /// `use_push` 为 true 使用 pushState，false 使用 replaceState。
    fn navigate_to_route(&self, target_route: AppRoute, use_push: bool) {
        let is_auth = self.is_authenticated.get_untracked();

        // --- Step 1: 验证目标路由 ---
        // 如果目标需要认证但用户未认证，重定向到登录页并记下原始目的地
        if target_route.requires_auth() && !is_auth {
            web_sys::console::log_1(&"[Router] Access denied, redirecting to login.".into());
            let redirect = target_route.auth_failure_redirect();
            self.apply(redirect, use_push);
            return;
        }

        // 如果用户已认证但访问登录/注册页，回跳到记录的目的地
        if target_route.should_redirect_when_authenticated() && is_auth {
            web_sys::console::log_1(&"[Router] Already authenticated, leaving auth page.".into());
            let redirect = target_route.auth_success_redirect();
            self.apply(redirect, use_push);
            return;
        }

        // --- Step 2: 加载页面 (更新状态) ---
        self.apply(target_route, use_push);
    }

    fn apply(&self, route: AppRoute, use_push: bool) {
        if use_push {
            push_history_state(&route.to_path());
        } else {
            replace_history_state(&route.to_path());
        }
        self.set_route.set(route);
    }

    /// 初始化浏览器后退/前进按钮监听
    fn init_popstate_listener(&self) {
        let set_route = self.set_route;
        let is_authenticated = self.is_authenticated;

        let closure = Closure::<dyn Fn()>::new(move || {
            let target_route = AppRoute::from_path(&current_path(), &current_query());

            // popstate 时也执行守卫逻辑
            if target_route.requires_auth() && !is_authenticated.get_untracked() {
                let redirect = target_route.auth_failure_redirect();
                replace_history_state(&redirect.to_path());
                set_route.set(redirect);
            } else {
                set_route.set(target_route);
            }
        });

        if let Some(window) = web_sys::window() {
            let _ = window
                .add_event_listener_with_callback("popstate", closure.as_ref().unchecked_ref());
        }

        // 泄漏闭包以保持监听器存活
        closure.forget();
    }

    /// 设置认证状态变化时的自动重定向
    fn setup_auth_redirect(&self) {
        let current_route = self.current_route;
        let set_route = self.set_route;
        let is_authenticated = self.is_authenticated;

        Effect::new(move |_| {
            let is_auth = is_authenticated.get();
            let route = current_route.get_untracked();

            if is_auth {
                // 用户刚登录，离开登录/注册页回到记录的目的地
                if route.should_redirect_when_authenticated() {
                    let redirect = route.auth_success_redirect();
                    push_history_state(&redirect.to_path());
                    set_route.set(redirect);
                }
            } else {
                // 用户登出，受保护页面退回登录页
                if route.requires_auth() {
                    let redirect = route.auth_failure_redirect();
                    push_history_state(&redirect.to_path());
                    set_route.set(redirect);
                }
            }
        });
    }
}

/// 提供路由服务到 Context 并初始化
fn provide_router(is_authenticated: Signal<bool>) -> RouterService {
    let router = RouterService::new(is_authenticated);

    router.init_popstate_listener();
    router.setup_auth_redirect();

    provide_context(router);
    router
}

/// 从 Context 获取路由服务
pub fn use_router() -> RouterService {
    use_context::<RouterService>()
        .expect("RouterService not found in context. Ensure Router is provided.")
}

// ============================================================================
// UI 组件
// ============================================================================

/// 路由器根组件
///
/// 提供路由上下文，应在 App 根部使用。
#[component]
pub fn Router(
    /// 认证状态信号
    is_authenticated: Signal<bool>,
    /// 子组件
    children: Children,
) -> impl IntoView {
    provide_router(is_authenticated);

    children()
}

/// 路由出口组件
///
/// 根据当前路由状态渲染对应的组件。
#[component]
pub fn RouterOutlet(
    /// 路由匹配函数：接收当前路由，返回对应视图
    matcher: fn(AppRoute) -> AnyView,
) -> impl IntoView {
    let router = use_router();

    move || {
        let current = router.current_route().get();
        matcher(current)
    }
}
