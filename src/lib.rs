use worker::*;

pub mod guard;

use guard::GuardVerdict;
use omnilearn_shared::{LOGIN_PATH, RETURN_TO_PARAM};

// =========================================================
// 跨平台日志宏
// =========================================================

#[cfg(target_arch = "wasm32")]
macro_rules! log_info {
    ($($t:tt)*) => (worker::console_log!($($t)*))
}

#[cfg(not(target_arch = "wasm32"))]
#[allow(unused_macros)]
macro_rules! log_info {
    ($($t:tt)*) => (println!($($t)*))
}

// =========================================================
// 动态运行时配置 (Runtime Configuration)
// =========================================================

/// 默认值，如果 wrangler.toml 的 [vars] 中没有定义，则使用这些值
const DEFAULT_ASSETS_BINDING: &str = "ASSETS";

/// 运行时配置结构体
/// 负责从 Env 中读取 [vars]，实现配置解耦
struct RuntimeConfig {
    assets_binding: String,
}

impl RuntimeConfig {
    fn new(env: &Env) -> Self {
        Self {
            // 尝试读取 [vars] ASSETS_BINDING，读不到就用默认值 "ASSETS"
            assets_binding: env
                .var("ASSETS_BINDING")
                .map(|v| v.to_string())
                .unwrap_or_else(|_| DEFAULT_ASSETS_BINDING.to_string()),
        }
    }
}

// =========================================================
// 入口 (Entry Point)
// =========================================================

/// 边缘路由守卫
///
/// 在静态资源服务之前拦截每个请求：公开路径直接放行，
/// 其余路径要求非空会话 Cookie，否则带着原始目标重定向到登录页。
/// 守卫只能看到 Cookie —— 页面侧的 LocalStorage 在这个执行环境里不存在，
/// 这也是前端每次 persist 都必须同时写两处的原因。
#[event(fetch)]
pub async fn main(req: Request, env: Env, _ctx: Context) -> Result<Response> {
    console_error_panic_hook::set_once();

    let config = RuntimeConfig::new(&env);
    let path = req.path();
    let cookie_header = req.headers().get("Cookie")?;

    match guard::evaluate(&path, cookie_header.as_deref()) {
        GuardVerdict::Allow => {
            env.assets(&config.assets_binding)?
                .fetch_request(req)
                .await
        }
        GuardVerdict::RedirectToLogin { return_to } => {
            log_info!("[Guard] no session for {}, redirecting to login", return_to);
            let mut url = req.url()?;
            url.set_path(LOGIN_PATH);
            url.set_query(None);
            url.query_pairs_mut().append_pair(RETURN_TO_PARAM, &return_to);
            Response::redirect(url)
        }
    }
}
