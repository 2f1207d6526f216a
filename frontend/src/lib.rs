//! OmniLearn 前端应用
//!
//! 采用 Context-Driven 的高内聚低耦合架构：
//! - `web::route` / `web::router`: 路由定义与路由服务
//! - `auth` / `session`: 认证状态与令牌双写持久化
//! - `provider`: 内容提供者（远端 / 访客）多态抽象
//! - `study`: 导航状态机、获取缓存与学习控制器
//! - `components`: UI 组件层

mod api;
mod auth;
mod components {
    mod google_button;
    pub mod home;
    mod lesson_view;
    pub mod login;
    pub mod profile;
    mod question_view;
    pub mod register;
    mod topic_form;
    mod tree_view;
}
mod provider;
mod session;
mod study;

use crate::components::home::HomePage;
use crate::components::login::LoginPage;
use crate::components::profile::ProfilePage;
use crate::components::register::RegisterPage;

use leptos::prelude::*;

// 原生 Web API 封装模块
// 此模块提供对浏览器原生 API 的轻量级封装（存储、Cookie、GIS 脚本），
// 替代 gloo-* 系列 crate，以减小 WASM 二进制体积。
pub(crate) mod web {
    pub mod google;
    pub mod route;
    pub mod router;
    mod storage;

    pub use storage::{CookieJar, LocalStorage};
}

use crate::auth::{AuthContext, init_auth};
use web::route::AppRoute;
use web::router::{Router, RouterOutlet};

/// 路由匹配函数
///
/// 根据 AppRoute 枚举返回对应的视图组件。
fn route_matcher(route: AppRoute) -> AnyView {
    match route {
        AppRoute::Home => view! { <HomePage /> }.into_any(),
        AppRoute::Login { .. } => view! { <LoginPage /> }.into_any(),
        AppRoute::Register => view! { <RegisterPage /> }.into_any(),
        AppRoute::Profile => view! { <ProfilePage /> }.into_any(),
        AppRoute::NotFound => view! {
            <div class="flex items-center justify-center min-h-screen bg-gray-50">
                <div class="text-center">
                    <h1 class="text-6xl font-bold text-red-500">"404"</h1>
                    <p class="text-xl mt-4">"Page not found"</p>
                </div>
            </div>
        }
        .into_any(),
    }
}

#[component]
pub fn App() -> impl IntoView {
    // 1. 创建认证上下文
    let auth_ctx = AuthContext::new();
    provide_context(auth_ctx);

    // 2. 启动时恢复一次既有会话（LocalStorage 优先，Cookie 兜底）
    init_auth(&auth_ctx);

    // 3. 获取认证状态信号，用于注入路由服务（解耦）
    let is_authenticated = auth_ctx.is_authenticated_signal();

    view! {
        // 4. 路由器组件：注入认证信号实现页面内守卫
        <Router is_authenticated=is_authenticated>
            <RouterOutlet matcher=route_matcher />
        </Router>
    }
}
