use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::study::ControllerHandle;

/// 主题输入表单：提交后让控制器生成课程树
#[component]
pub fn TopicForm(ctrl: ControllerHandle) -> impl IntoView {
    let (topic, set_topic) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    let guest = ctrl.with_value(|c| c.is_guest());

    let on_submit = move |ev: web_sys::SubmitEvent| {
        ev.prevent_default();
        let value = topic.get();
        let value = value.trim().to_string();
        if value.len() < 3 {
            set_error_msg.set(Some("Topic must be at least 3 characters.".to_string()));
            return;
        }

        set_is_submitting.set(true);
        set_error_msg.set(None);

        let ctrl = ctrl.get_value();
        spawn_local(async move {
            if let Err(e) = ctrl.create_tree(&value).await {
                // 访客操作不会失败，错误文案只属于远端模式
                if !ctrl.is_guest() {
                    set_error_msg.set(Some(format!("Error creating learning path: {}", e)));
                }
            }
            set_is_submitting.set(false);
        });
    };

    view! {
        <div class="w-full max-w-md mx-auto bg-white rounded-xl shadow">
            <div class="p-6 pb-2">
                <h2 class="text-xl font-bold">"Create a Learning Path"</h2>
                <p class="text-gray-600 text-sm mt-1">
                    "Enter a topic you want to learn about, and we'll create a personalized learning path for you."
                </p>
                <Show when=move || guest>
                    <p class="text-gray-500 text-xs mt-1">
                        "You are trying the system as a guest. Sign in for a full curriculum."
                    </p>
                </Show>
            </div>
            <form class="p-6 pt-4 space-y-4" on:submit=on_submit>
                <div>
                    <label class="block text-sm font-medium" for="topic">"Topic"</label>
                    <input
                        id="topic"
                        type="text"
                        class="mt-1 w-full border rounded px-3 py-2"
                        placeholder="e.g. Machine Learning, JavaScript, World History"
                        on:input=move |ev| set_topic.set(event_target_value(&ev))
                        prop:value=topic
                        required
                    />
                </div>
                <Show when=move || error_msg.get().is_some()>
                    <p class="text-sm text-red-600">{move || error_msg.get().unwrap_or_default()}</p>
                </Show>
                <button
                    type="submit"
                    class="w-full bg-blue-600 text-white rounded py-2 hover:bg-blue-700 disabled:opacity-60"
                    disabled=move || is_submitting.get()
                >
                    {move || if is_submitting.get() { "Creating..." } else { "Create Learning Path" }}
                </button>
            </form>
        </div>
    }
}
