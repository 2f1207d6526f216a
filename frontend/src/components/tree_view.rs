use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::components::lesson_view::LessonView;
use crate::components::question_view::QuestionView;
use crate::study::{ControllerHandle, StudyView};

/// 课程树视图：左侧学习路径导航，右侧按状态机当前视图渲染内容
#[component]
pub fn TreeView(ctrl: ControllerHandle) -> impl IntoView {
    let machine = ctrl.with_value(|c| c.machine());

    view! {
        <div class="py-6">
            <h1 class="text-3xl font-bold mb-6">
                {move || machine.with(|m| m.tree().map(|t| t.topic.clone()).unwrap_or_default())}
            </h1>

            <div class="grid grid-cols-1 md:grid-cols-4 gap-6">
                <div class="md:col-span-1">
                    <div class="bg-white rounded-xl shadow p-6">
                        <h2 class="text-lg font-bold mb-4">"Learning Path"</h2>
                        <ul class="space-y-4">{move || section_list(ctrl)}</ul>
                    </div>
                </div>

                <div class="md:col-span-3">
                    {move || {
                        match machine.with(|m| m.view()) {
                            StudyView::Tree => tree_prompt(ctrl).into_any(),
                            StudyView::Lesson => view! { <LessonView ctrl /> }.into_any(),
                            StudyView::Practice { .. } | StudyView::Feedback { .. } => {
                                view! { <QuestionView ctrl /> }.into_any()
                            }
                        }
                    }}
                </div>
            </div>
        </div>
    }
}

/// 左侧章节/小节列表
fn section_list(ctrl: ControllerHandle) -> impl IntoView {
    let machine = ctrl.with_value(|c| c.machine());
    let m = machine.get();
    let active_section = m.active_section();
    let active_subsection = m.active_subsection();

    let Some(tree) = m.tree() else {
        return ().into_any();
    };

    tree.sections
        .iter()
        .enumerate()
        .map(|(index, section)| {
            let is_active = index == active_section;
            let title = section.title.clone();
            let section_class = if is_active {
                "text-left font-medium w-full text-blue-600"
            } else {
                "text-left font-medium w-full"
            };

            let subsections = is_active.then(|| {
                section
                    .subsections
                    .iter()
                    .map(|sub| {
                        let id = sub.id;
                        let sub_title = sub.title.clone();
                        let sub_class = if active_subsection == Some(id) {
                            "text-left text-sm w-full text-blue-600 font-medium"
                        } else {
                            "text-left text-sm w-full"
                        };
                        view! {
                            <li>
                                <button
                                    class=sub_class
                                    on:click=move |_| {
                                        let ctrl = ctrl.get_value();
                                        spawn_local(async move {
                                            let _ = ctrl.open_lesson(id).await;
                                        });
                                    }
                                >
                                    {sub_title}
                                </button>
                            </li>
                        }
                    })
                    .collect_view()
            });

            view! {
                <li>
                    <button
                        class=section_class
                        on:click=move |_| ctrl.with_value(|c| c.select_section(index))
                    >
                        {title}
                    </button>
                    {subsections.map(|subs| view! { <ul class="ml-4 mt-2 space-y-2">{subs}</ul> })}
                </li>
            }
        })
        .collect_view()
        .into_any()
}

/// 右侧占位：树视图下提示选择章节或小节
fn tree_prompt(ctrl: ControllerHandle) -> impl IntoView {
    let machine = ctrl.with_value(|c| c.machine());
    let m = machine.get();

    let card = |title: String, body: String| {
        view! {
            <div class="bg-white rounded-xl shadow p-6">
                <h2 class="text-xl font-bold">{title}</h2>
                <p class="text-gray-600 mt-2">{body}</p>
            </div>
        }
    };

    let Some(tree) = m.tree() else {
        return card(
            "Welcome".to_string(),
            "Create a learning path to begin.".to_string(),
        );
    };

    match tree.sections.get(m.active_section()) {
        Some(section) => card(
            section.title.clone(),
            format!(
                "{} Select a subsection from the menu to view its content.",
                section.description
            ),
        ),
        None => card(
            format!("Welcome to {}", tree.topic),
            "Select a section from the menu to begin learning.".to_string(),
        ),
    }
}
