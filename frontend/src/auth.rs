//! 认证模块
//!
//! 管理用户认证状态，与路由系统解耦。
//! 路由服务通过注入的认证信号来检查认证状态。
//!
//! 四条会话流程（密码登录、注册、Google 断言登录、登出）都在这里收口：
//! 成功拿到的令牌交给 TokenStore 双写持久化，再更新内存状态。

use leptos::prelude::*;
use omnilearn_shared::protocol::UserProfile;

use crate::api::Api;
use crate::provider::ProviderError;
use crate::session::TokenStore;

/// 注册时本地校验的最短密码长度；权威校验在后端
const MIN_PASSWORD_LEN: usize = 6;

/// 认证状态
#[derive(Clone, Default)]
pub struct AuthState {
    /// 当前会话令牌（仅在认证成功后存在）
    pub token: Option<String>,
    /// `/auth/me` 拉回的用户资料（资料页按需加载）
    pub profile: Option<UserProfile>,
    /// 是否正在恢复启动时的会话
    pub is_loading: bool,
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// 以当前令牌构造 API 客户端
    pub fn api(&self) -> Api {
        Api::new(self.token.clone())
    }
}

/// 认证上下文
///
/// 包含读写信号，通过 Context 在组件间共享。
#[derive(Clone, Copy)]
pub struct AuthContext {
    /// 认证状态（只读）
    pub state: ReadSignal<AuthState>,
    /// 设置认证状态（写入）
    pub set_state: WriteSignal<AuthState>,
}

impl AuthContext {
    /// 创建新的认证上下文
    pub fn new() -> Self {
        let (state, set_state) = signal(AuthState {
            is_loading: true,
            ..AuthState::default()
        });
        Self { state, set_state }
    }

    /// 获取认证状态信号（用于路由服务注入）
    pub fn is_authenticated_signal(&self) -> Signal<bool> {
        let state = self.state;
        Signal::derive(move || state.get().is_authenticated())
    }
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

/// 从 Context 获取认证上下文
pub fn use_auth() -> AuthContext {
    use_context::<AuthContext>().expect("AuthContext should be provided")
}

/// 初始化认证状态
///
/// 进程启动时调用一次：从双份持久化中恢复上一次的会话令牌。
pub fn init_auth(ctx: &AuthContext) {
    let token = TokenStore::new().restore();
    ctx.set_state.update(|state| {
        state.token = token;
        state.is_loading = false;
    });
}

/// 密码登录
///
/// 成功后令牌双写持久化并更新内存状态；调用方负责回跳导航。
pub async fn login(ctx: &AuthContext, email: String, password: String) -> Result<(), String> {
    let api = Api::new(None);
    let response = api
        .login(&email, &password)
        .await
        .map_err(login_error_message)?;

    TokenStore::new().persist(&response.access_token);
    ctx.set_state.update(|state| {
        state.token = Some(response.access_token);
        state.profile = None;
    });
    Ok(())
}

/// 注册新账号（不自动登录，成功后由调用方导航到登录页）
pub async fn register(email: String, password: String, name: String) -> Result<(), String> {
    // 本地校验只为减少一次往返，后端仍是权威
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if email.trim().is_empty() {
        return Err("Email is required".to_string());
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }

    Api::new(None)
        .register(email.trim(), &password, name.trim())
        .await
        .map(|_| ())
        .map_err(|e| match e {
            ProviderError::Backend { message, .. } if !message.is_empty() => message,
            other => other.to_string(),
        })
}

/// Google 断言登录：把身份部件给的 ID token 换成本站会话令牌
pub async fn login_with_google(ctx: &AuthContext, id_token: String) -> Result<(), String> {
    let response = Api::new(None)
        .google_login(&id_token)
        .await
        .map_err(login_error_message)?;

    TokenStore::new().persist(&response.access_token);
    ctx.set_state.update(|state| {
        state.token = Some(response.access_token);
        state.profile = None;
    });
    Ok(())
}

/// 登出
///
/// 后端调用是尽力而为的：不管它成败，本地会话必须清掉，
/// 用户不能被"卡在已登录"。导航由路由服务监听认证状态自动处理。
pub async fn logout(ctx: &AuthContext) {
    let api = ctx.state.get_untracked().api();
    if let Err(e) = api.logout().await {
        web_sys::console::warn_1(&format!("[Auth] logout call failed: {}", e).into());
    }

    TokenStore::new().clear();
    ctx.set_state.update(|state| {
        state.token = None;
        state.profile = None;
    });
}

/// 把后端的认证失败翻译成可重试的表单错误
fn login_error_message(error: ProviderError) -> String {
    match error {
        ProviderError::Backend { status: 401, .. } | ProviderError::Backend { status: 403, .. } => {
            "Invalid credentials".to_string()
        }
        other => other.to_string(),
    }
}
