use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::{logout, use_auth};
use crate::web::route::AppRoute;
use crate::web::router::use_router;

/// 个人资料页（受保护路由）
///
/// 按需拉取 `/auth/me`；未认证或拉取失败时给出回落地页的出口。
#[component]
pub fn ProfilePage() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();

    let (is_loading, set_is_loading) = signal(true);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    Effect::new(move |_| {
        let state = auth.state.get_untracked();
        if !state.is_authenticated() {
            set_error_msg.set(Some("Not authenticated".to_string()));
            set_is_loading.set(false);
            return;
        }
        let api = state.api();
        spawn_local(async move {
            match api.me().await {
                Ok(profile) => auth.set_state.update(|s| s.profile = Some(profile)),
                Err(_) => set_error_msg.set(Some("Not authenticated".to_string())),
            }
            set_is_loading.set(false);
        });
    });

    let on_logout = move |_| {
        // 登出后的重定向由路由服务监听认证状态自动处理
        spawn_local(async move { logout(&auth).await });
    };

    view! {
        <main class="min-h-screen bg-gray-50 p-8">
            {move || {
                if is_loading.get() {
                    return view! { <p class="text-gray-500">"Loading..."</p> }.into_any();
                }
                if let Some(message) = error_msg.get() {
                    return view! {
                        <div>
                            <p class="mb-4">{message}</p>
                            <button
                                class="underline"
                                on:click=move |_| router.navigate(AppRoute::Home)
                            >
                                "Back to home"
                            </button>
                        </div>
                    }
                    .into_any();
                }

                let profile = auth.state.get().profile;
                let Some(profile) = profile else {
                    return view! { <p class="text-gray-500">"Loading..."</p> }.into_any();
                };

                let picture = profile.picture_url.clone().map(|url| {
                    view! {
                        <img src=url alt="avatar" class="w-16 h-16 rounded-full mb-4" />
                    }
                });

                view! {
                    <div class="max-w-xl mx-auto">
                        <h1 class="text-2xl font-bold mb-4">"My profile"</h1>
                        {picture}
                        <div class="space-y-1">
                            <div><span class="font-semibold">"ID: "</span>{profile.id}</div>
                            <div><span class="font-semibold">"Name: "</span>{profile.name.clone()}</div>
                            <div><span class="font-semibold">"Email: "</span>{profile.email.clone()}</div>
                        </div>
                        <button
                            class="mt-6 px-4 py-2 bg-red-600 text-white rounded"
                            on:click=on_logout
                        >
                            "Sign out"
                        </button>
                    </div>
                }
                .into_any()
            }}
        </main>
    }
}
