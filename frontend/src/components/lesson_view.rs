use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::study::ControllerHandle;

/// 课文视图
///
/// 只读状态机的活跃小节和课文缓存：加载中、就绪、失败三态。
/// 访客模式下操作不会失败，错误态只在远端模式渲染。
#[component]
pub fn LessonView(ctrl: ControllerHandle) -> impl IntoView {
    let machine = ctrl.with_value(|c| c.machine());
    let revision = ctrl.with_value(|c| c.revision());
    let guest = ctrl.with_value(|c| c.is_guest());

    move || {
        // revision 订阅缓存结算，课文到达时重渲染
        revision.get();
        let m = machine.get();
        let Some(sub) = m.active_subsection_data().cloned() else {
            return ().into_any();
        };

        let (lesson, error, loading) = ctrl.with_value(|c| {
            (
                c.lesson_ready(sub.id),
                c.lesson_error(sub.id),
                c.lesson_loading(sub.id),
            )
        });

        if let Some(lesson) = lesson {
            let questions_pending = ctrl.with_value(|c| c.questions_loading());
            let multimedia = (!lesson.multimedia_urls.is_empty()).then(|| {
                let images = lesson
                    .multimedia_urls
                    .iter()
                    .enumerate()
                    .map(|(index, url)| {
                        view! {
                            <img
                                src=url.clone()
                                alt=format!("Visual aid {}", index + 1)
                                class="rounded-md max-h-64 object-contain"
                            />
                        }
                    })
                    .collect_view();
                view! {
                    <div class="mt-6 space-y-4">
                        <h3 class="text-lg font-medium">"Visual Aids"</h3>
                        <div class="grid grid-cols-1 md:grid-cols-2 gap-4">{images}</div>
                    </div>
                }
            });

            return view! {
                <div class="bg-white rounded-xl shadow">
                    <div class="p-6 pb-2">
                        <h2 class="text-xl font-bold">{sub.title.clone()}</h2>
                        <p class="text-gray-600 text-sm mt-1">{sub.description.clone()}</p>
                    </div>
                    <div class="p-6 pt-2">
                        <div class="prose max-w-none" inner_html=lesson.content></div>
                        {multimedia}
                    </div>
                    <div class="p-6 pt-0 flex justify-between">
                        <button
                            class="border border-gray-300 rounded px-4 py-2 hover:bg-gray-50"
                            on:click=move |_| ctrl.with_value(|c| c.back_to_tree())
                        >
                            "Back to Learning Path"
                        </button>
                        <button
                            class="bg-blue-600 text-white rounded px-4 py-2 hover:bg-blue-700 disabled:opacity-60"
                            disabled=questions_pending
                            on:click=move |_| {
                                let ctrl = ctrl.get_value();
                                spawn_local(async move {
                                    let _ = ctrl.start_practice().await;
                                });
                            }
                        >
                            "Practice Questions"
                        </button>
                    </div>
                </div>
            }
            .into_any();
        }

        if !loading {
            if let Some(error) = error {
                if !guest {
                    return view! {
                        <div class="bg-white rounded-xl shadow p-6">
                            <p class="text-center text-red-500">
                                {format!("Error loading lesson: {}. Select the topic again to retry.", error)}
                            </p>
                        </div>
                    }
                    .into_any();
                }
            }
        }

        view! {
            <div class="bg-white rounded-xl shadow p-6">
                <p class="text-center text-gray-500">"Loading lesson content..."</p>
            </div>
        }
        .into_any()
    }
}
