use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::auth::register;
use crate::web::route::AppRoute;
use crate::web::router::use_router;

#[component]
pub fn RegisterPage() -> impl IntoView {
    let router = use_router();

    let (name, set_name) = signal(String::new());
    let (email, set_email) = signal(String::new());
    let (password, set_password) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        set_is_submitting.set(true);
        set_error_msg.set(None);

        spawn_local(async move {
            let result = register(
                email.get_untracked(),
                password.get_untracked(),
                name.get_untracked(),
            )
            .await;
            match result {
                // 注册不自动登录，成功后引导去登录页
                Ok(()) => router.navigate(AppRoute::Login { next: None }),
                Err(message) => set_error_msg.set(Some(message)),
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <main class="min-h-screen flex items-center justify-center bg-gray-50 p-4">
            <div class="w-full max-w-md bg-white rounded-xl shadow p-6">
                <h1 class="text-2xl font-bold text-center">"Create account"</h1>
                <p class="text-center text-gray-600 mt-1">"Sign up to get started"</p>

                <form class="mt-6 space-y-4" on:submit=on_submit>
                    <div>
                        <label class="block text-sm font-medium" for="name">"Name"</label>
                        <input
                            id="name"
                            class="mt-1 w-full border rounded px-3 py-2"
                            on:input=move |ev| set_name.set(event_target_value(&ev))
                            prop:value=name
                            required
                        />
                    </div>
                    <div>
                        <label class="block text-sm font-medium" for="email">"Email"</label>
                        <input
                            id="email"
                            type="email"
                            class="mt-1 w-full border rounded px-3 py-2"
                            on:input=move |ev| set_email.set(event_target_value(&ev))
                            prop:value=email
                            required
                        />
                    </div>
                    <div>
                        <label class="block text-sm font-medium" for="password">"Password"</label>
                        <input
                            id="password"
                            type="password"
                            class="mt-1 w-full border rounded px-3 py-2"
                            on:input=move |ev| set_password.set(event_target_value(&ev))
                            prop:value=password
                            required
                        />
                    </div>
                    <Show when=move || error_msg.get().is_some()>
                        <p class="text-sm text-red-600">{move || error_msg.get().unwrap_or_default()}</p>
                    </Show>
                    <button
                        class="w-full bg-blue-600 text-white rounded py-2 hover:bg-blue-700 disabled:opacity-60"
                        disabled=move || is_submitting.get()
                    >
                        {move || if is_submitting.get() { "Creating..." } else { "Create account" }}
                    </button>
                </form>

                <p class="mt-4 text-sm text-center">
                    "Already have an account? "
                    <button
                        class="text-blue-600 underline"
                        on:click=move |_| router.navigate(AppRoute::Login { next: None })
                    >
                        "Sign in"
                    </button>
                </p>
            </div>
        </main>
    }
}
