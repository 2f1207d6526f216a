use leptos::prelude::*;
use leptos::task::spawn_local;
use omnilearn_shared::Difficulty;

use crate::study::{ControllerHandle, StudyView};

fn difficulty_class(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Easy => "text-sm font-medium text-green-500",
        Difficulty::Medium => "text-sm font-medium text-yellow-500",
        Difficulty::Hard => "text-sm font-medium text-red-500",
    }
}

/// 练习视图：出题、作答、展示批改反馈
///
/// Practice(i) 渲染答题卡，Feedback(i) 在同一张卡下方叠加反馈面板。
/// 提交按钮在答案为空或批改在途时禁用；空答案根本不会发起请求。
#[component]
pub fn QuestionView(ctrl: ControllerHandle) -> impl IntoView {
    let machine = ctrl.with_value(|c| c.machine());
    let revision = ctrl.with_value(|c| c.revision());
    let feedback = ctrl.with_value(|c| c.feedback());
    let guest = ctrl.with_value(|c| c.is_guest());

    let (answer, set_answer) = signal(String::new());
    let (is_submitting, set_is_submitting) = signal(false);
    let (error_msg, set_error_msg) = signal(Option::<String>::None);

    move || {
        revision.get();
        let m = machine.get();
        let (question_index, showing_feedback) = match m.view() {
            StudyView::Practice { question } => (question, false),
            StudyView::Feedback { question } => (question, true),
            _ => return ().into_any(),
        };

        let questions = ctrl.with_value(|c| c.active_questions());
        let Some(questions) = questions else {
            if let Some(error) = ctrl.with_value(|c| c.questions_error()) {
                if !guest {
                    return view! {
                        <div class="bg-white rounded-xl shadow p-6">
                            <p class="text-center text-red-500">
                                {format!("Error loading questions: {}. Go back and try again.", error)}
                            </p>
                            <div class="flex justify-center mt-4">
                                <button
                                    class="border border-gray-300 rounded px-4 py-2 hover:bg-gray-50"
                                    on:click=move |_| ctrl.with_value(|c| c.back_to_tree())
                                >
                                    "Back to Learning Path"
                                </button>
                            </div>
                        </div>
                    }
                    .into_any();
                }
            }
            return view! {
                <div class="bg-white rounded-xl shadow p-6">
                    <p class="text-center text-gray-500">"Loading practice questions..."</p>
                </div>
            }
            .into_any();
        };

        let Some(question) = questions.get(question_index).cloned() else {
            return view! {
                <div class="bg-white rounded-xl shadow p-6">
                    <p class="text-center text-gray-500">
                        "No practice questions available for this section."
                    </p>
                </div>
            }
            .into_any();
        };

        let total = questions.len();

        let on_submit = move |_| {
            let value = answer.get_untracked();
            if value.trim().is_empty() {
                return;
            }
            set_is_submitting.set(true);
            set_error_msg.set(None);
            let ctrl = ctrl.get_value();
            spawn_local(async move {
                if let Err(e) = ctrl.submit_answer(&value).await {
                    if !ctrl.is_guest() {
                        set_error_msg.set(Some(format!("Error evaluating answer: {}", e)));
                    }
                }
                set_is_submitting.set(false);
            });
        };

        let on_next = move |_| {
            set_answer.set(String::new());
            set_error_msg.set(None);
            ctrl.with_value(|c| c.advance());
        };

        let feedback_panel = showing_feedback.then(|| {
            feedback.get().map(|fb| {
                let panel_class = if fb.is_correct {
                    "mt-6 p-4 rounded-lg bg-green-50"
                } else {
                    "mt-6 p-4 rounded-lg bg-red-50"
                };
                let title_class = if fb.is_correct {
                    "font-medium text-green-700"
                } else {
                    "font-medium text-red-700"
                };
                let title = if fb.is_correct { "Correct!" } else { "Not quite right" };
                let hint = fb.correct_answer.clone().map(|correct| {
                    view! {
                        <div class="mt-4 p-3 bg-gray-100 rounded-md">
                            <p class="font-medium">"Correct answer:"</p>
                            <p>{correct}</p>
                        </div>
                    }
                });
                let next_label = if question_index + 1 < total {
                    "Next Question"
                } else {
                    "Finish Practice"
                };

                view! {
                    <div class=panel_class>
                        <h3 class=title_class>{title}</h3>
                        <p class="mt-2">{fb.feedback.clone()}</p>
                        {hint}
                        <div class="flex justify-end mt-4">
                            <button
                                class="bg-blue-600 text-white rounded px-4 py-2 hover:bg-blue-700"
                                on:click=on_next
                            >
                                {next_label}
                            </button>
                        </div>
                    </div>
                }
            })
        });

        view! {
            <div class="bg-white rounded-xl shadow">
                <div class="p-6 pb-2">
                    <div class="flex justify-between items-center">
                        <h2 class="text-xl font-bold">
                            {format!("Practice Question {}/{}", question_index + 1, total)}
                        </h2>
                        <span class=difficulty_class(question.difficulty)>
                            {question.difficulty.label()}
                        </span>
                    </div>
                    <p class="text-gray-600 text-sm mt-1">"Test your understanding of the material"</p>
                </div>
                <div class="p-6 pt-2 space-y-4">
                    <div class="text-lg font-medium">{question.text.clone()}</div>
                    <textarea
                        class="w-full border rounded px-3 py-2 min-h-[120px]"
                        placeholder="Type your answer here..."
                        prop:value=answer
                        disabled=move || showing_feedback || is_submitting.get()
                        on:input=move |ev| set_answer.set(event_target_value(&ev))
                    ></textarea>
                    <Show when=move || error_msg.get().is_some()>
                        <p class="text-sm text-red-600">{move || error_msg.get().unwrap_or_default()}</p>
                    </Show>
                </div>
                <div class="p-6 pt-0 flex justify-between">
                    <button
                        class="border border-gray-300 rounded px-4 py-2 hover:bg-gray-50"
                        on:click=move |_| ctrl.with_value(|c| c.back_to_tree())
                    >
                        "Back to Learning Path"
                    </button>
                    <Show when=move || !showing_feedback>
                        <button
                            class="bg-blue-600 text-white rounded px-4 py-2 hover:bg-blue-700 disabled:opacity-60"
                            disabled=move || {
                                answer.get().trim().is_empty() || is_submitting.get()
                            }
                            on:click=on_submit
                        >
                            {move || if is_submitting.get() { "Evaluating..." } else { "Submit Answer" }}
                        </button>
                    </Show>
                </div>
                {feedback_panel}
            </div>
        }
        .into_any()
    }
}
