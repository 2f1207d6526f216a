use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{login_with_google, use_auth};
use crate::web::google;

/// Google 客户端 id；部署时替换（对应 GIS 控制台配置）
const GOOGLE_CLIENT_ID: &str = "";

/// Google 登录按钮
///
/// 官方部件渲染在占位 div 里；拿到身份断言后走 OAuth 兑换流程，
/// 成功后的回跳由路由服务监听认证状态自动处理。
#[component]
pub fn GoogleLoginButton() -> impl IntoView {
    let auth = use_auth();
    let node_ref = NodeRef::<html::Div>::new();

    Effect::new(move |_| {
        let Some(el) = node_ref.get() else {
            return;
        };
        google::load_identity_script(move || {
            google::init_button(GOOGLE_CLIENT_ID, el.as_ref(), move |credential| {
                spawn_local(async move {
                    if let Err(message) = login_with_google(&auth, credential).await {
                        web_sys::console::error_1(
                            &format!("[Auth] google login failed: {}", message).into(),
                        );
                    }
                });
            });
        });
    });

    view! { <div node_ref=node_ref class="flex justify-center"></div> }
}
