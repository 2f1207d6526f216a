use leptos::prelude::*;
use leptos::task::spawn_local;
use std::rc::Rc;

use crate::auth::{logout, use_auth};
use crate::components::google_button::GoogleLoginButton;
use crate::components::topic_form::TopicForm;
use crate::components::tree_view::TreeView;
use crate::provider::provider_for_session;
use crate::study::{ControllerHandle, StudyController};
use crate::web::route::AppRoute;
use crate::web::router::use_router;

/// 公开落地页：访客直接使用本地合成内容，登录用户走真实后端
#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();

    // 学习区只依赖 (is_loading, token)：资料拉取等其它状态变化不应重建它
    let session = Memo::new(move |_| {
        let state = auth.state.get();
        (state.is_loading, state.token.clone())
    });

    view! {
        <main class="min-h-screen bg-gray-50">
            <div class="container mx-auto py-8 px-4">
                <Header />
                {move || {
                    let (is_loading, token) = session.get();
                    if is_loading {
                        view! { <p class="text-center py-8 text-gray-500">"Loading..."</p> }
                            .into_any()
                    } else {
                        view! { <StudyArea token /> }.into_any()
                    }
                }}
            </div>
        </main>
    }
}

#[component]
fn Header() -> impl IntoView {
    let auth = use_auth();
    let router = use_router();
    let is_auth = move || auth.state.get().is_authenticated();

    view! {
        <header class="text-center mb-8">
            <h1 class="text-4xl font-bold text-blue-600">"OmniLearn"</h1>
            <p class="text-xl text-gray-600 mt-2">"Adaptive learning platform"</p>
            <div class="flex flex-col items-center gap-3 mt-4">
                <Show
                    when=is_auth
                    fallback=move || {
                        view! {
                            <div class="flex gap-3">
                                <button
                                    class="px-4 py-2 rounded bg-blue-600 text-white hover:bg-blue-700"
                                    on:click=move |_| router.navigate(AppRoute::Register)
                                >
                                    "Sign up"
                                </button>
                                <button
                                    class="px-4 py-2 rounded border border-blue-600 text-blue-600 hover:bg-blue-50"
                                    on:click=move |_| router.navigate(AppRoute::Login { next: None })
                                >
                                    "Sign in"
                                </button>
                            </div>
                            <GoogleLoginButton />
                            <p class="text-gray-600">"Try the system below without signing in."</p>
                        }
                    }
                >
                    <div class="flex gap-3 justify-center">
                        <button
                            class="text-blue-600 underline"
                            on:click=move |_| router.navigate(AppRoute::Profile)
                        >
                            "Go to my profile"
                        </button>
                        <button
                            class="text-red-600 underline"
                            on:click=move |_| {
                                spawn_local(async move { logout(&auth).await });
                            }
                        >
                            "Sign out"
                        </button>
                    </div>
                </Show>
            </div>
        </header>
    }
}

/// 学习区
///
/// 组合根：这里是全应用唯一按认证状态选择内容提供者的地方，
/// 之后控制器与视图对变体一无所知。认证状态变化时整个学习区重建，
/// 提供者随之重新选择。
#[component]
fn StudyArea(token: Option<String>) -> impl IntoView {
    let provider = provider_for_session(token);
    let ctrl: ControllerHandle = StoredValue::new_local(Rc::new(StudyController::new(provider)));
    let machine = ctrl.with_value(|c| c.machine());

    view! {
        <Show
            when=move || machine.with(|m| m.has_tree())
            fallback=move || view! { <TopicForm ctrl /> }
        >
            <TreeView ctrl />
        </Show>
    }
}
