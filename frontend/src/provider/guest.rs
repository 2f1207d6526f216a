//! 访客内容提供者
//!
//! 未登录用户的本地替身：不发任何网络请求，所有内容由主题字符串
//! 确定性合成。操作定义为永不失败——没有网络就没有网络错误，
//! 视图层在访客模式下也因此不需要错误态。
//!
//! 为保持与远端变体一致的异步外观，每个操作前有一小段模拟延迟。

use omnilearn_shared::{AnswerFeedback, Difficulty, KnowledgeTree, Lesson, Question, Section, Subsection};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use super::{ContentProvider, ProviderError};

/// 模拟生成耗时（毫秒）
#[cfg(target_arch = "wasm32")]
const GUEST_DELAY_MS: u32 = 300;

/// 访客批改的关键词表
///
/// 答案只要命中其中一个词就算正确。这是访客模式的演示性近似，
/// 不是批改算法——真实批改永远在后端。
const GRADING_KEYWORDS: [&str; 7] = [
    "concept",
    "principle",
    "fundamental",
    "practical",
    "apply",
    "benefit",
    "skill",
];

/// 合成树的固定形状：3 个章节，每章 3 个小节
const SECTIONS_PER_TREE: usize = 3;
const SUBSECTIONS_PER_SECTION: usize = 3;

pub struct GuestProvider {
    /// 本会话合成过的树，供课文合成回查小节标题与描述
    trees: RefCell<Vec<KnowledgeTree>>,
    /// 已生成的练习题，批改时回查题面
    questions: RefCell<HashMap<i64, Question>>,
    /// 练习题 id 计数器（会话内单调递增）
    next_question_id: Cell<i64>,
}

impl GuestProvider {
    pub fn new() -> Self {
        Self {
            trees: RefCell::new(Vec::new()),
            questions: RefCell::new(HashMap::new()),
            next_question_id: Cell::new(1),
        }
    }

    fn find_subsection(&self, subsection_id: i64) -> Option<Subsection> {
        self.trees
            .borrow()
            .iter()
            .rev()
            .find_map(|tree| tree.find_subsection(subsection_id).cloned())
    }
}

impl Default for GuestProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// 与远端请求对齐的延迟；宿主环境（单元测试）下没有 JS 定时器，直接返回
async fn simulate_latency() {
    #[cfg(target_arch = "wasm32")]
    gloo_timers::future::TimeoutFuture::new(GUEST_DELAY_MS).await;
}

/// 合成一棵固定形状的课程树
///
/// id 由本次合成私有的计数器从 1 开始铸造：树内唯一，
/// 跨树没有唯一性保证（每次合成都从 1 重新开始）。
fn synthesize_tree(topic: &str) -> KnowledgeTree {
    let mut next_id = 1i64;
    let mut mint = || {
        let id = next_id;
        next_id += 1;
        id
    };

    let tree_id = mint();
    let sections = (0..SECTIONS_PER_TREE)
        .map(|s_idx| {
            let section_id = mint();
            let title = format!("Section {}", s_idx + 1);
            let description = format!("Overview of {} - part {}", topic, s_idx + 1);
            let subsections = (0..SUBSECTIONS_PER_SECTION)
                .map(|sub_idx| Subsection {
                    id: mint(),
                    section_id,
                    title: format!("{} - Topic {}", title, sub_idx + 1),
                    description: format!("Details on {} / {} #{}", topic, title, sub_idx + 1),
                    section_title: title.clone(),
                })
                .collect();
            Section {
                id: section_id,
                tree_id,
                title,
                description,
                subsections,
            }
        })
        .collect();

    KnowledgeTree {
        id: tree_id,
        topic: topic.to_string(),
        sections,
    }
}

#[async_trait::async_trait(?Send)]
impl ContentProvider for GuestProvider {
    async fn create_tree(&self, topic: &str) -> Result<KnowledgeTree, ProviderError> {
        simulate_latency().await;
        let tree = synthesize_tree(topic);
        self.trees.borrow_mut().push(tree.clone());
        Ok(tree)
    }

    async fn lesson(&self, subsection_id: i64) -> Result<Lesson, ProviderError> {
        simulate_latency().await;

        // 访客模式没有 not-found：查不到也给出通用课文
        let (title, description) = match self.find_subsection(subsection_id) {
            Some(sub) => (sub.title, sub.description),
            None => (
                "This topic".to_string(),
                "an overview of the selected topic".to_string(),
            ),
        };

        let content = format!(
            "<h2>{title}</h2>\
             <p>{description}</p>\
             <p>This lesson walks you through {title} one idea at a time. \
             Start with the big picture, then revisit each point until it feels familiar. \
             Sign in to unlock a personalized, in-depth curriculum for this topic.</p>\
             <p>When you feel ready, open the practice questions to check your understanding.</p>",
        );

        Ok(Lesson {
            subsection_id,
            content,
            multimedia_urls: Vec::new(),
        })
    }

    async fn ensure_questions(
        &self,
        section_id: i64,
        section_title: &str,
    ) -> Result<Vec<Question>, ProviderError> {
        simulate_latency().await;

        let blueprints = [
            (
                Difficulty::Easy,
                format!("What is the most important concept introduced in {}?", section_title),
            ),
            (
                Difficulty::Medium,
                format!(
                    "Explain one principle from {} in your own words, and describe a practical situation where you would apply it.",
                    section_title
                ),
            ),
            (
                Difficulty::Hard,
                format!(
                    "What are the benefits and the limits of the ideas covered in {}? Support your answer with an example.",
                    section_title
                ),
            ),
        ];

        let generated: Vec<Question> = blueprints
            .into_iter()
            .map(|(difficulty, text)| {
                let id = self.next_question_id.get();
                self.next_question_id.set(id + 1);
                Question {
                    id,
                    section_id,
                    text,
                    difficulty,
                }
            })
            .collect();

        let mut bank = self.questions.borrow_mut();
        for question in &generated {
            bank.insert(question.id, question.clone());
        }

        Ok(generated)
    }

    async fn evaluate(
        &self,
        question_id: i64,
        answer: &str,
    ) -> Result<AnswerFeedback, ProviderError> {
        simulate_latency().await;

        let normalized = answer.to_lowercase();
        let is_correct = GRADING_KEYWORDS.iter().any(|k| normalized.contains(k));

        if is_correct {
            return Ok(AnswerFeedback {
                is_correct: true,
                feedback: "Correct! Your answer connects with the key ideas of this section."
                    .to_string(),
                correct_answer: None,
            });
        }

        let hint = match self.questions.borrow().get(&question_id) {
            Some(question) => format!(
                "A strong answer to \"{}\" would name one core concept and explain how to apply it in practice.",
                question.text
            ),
            None => "A strong answer would name one core concept and explain how to apply it in practice.".to_string(),
        };

        Ok(AnswerFeedback {
            is_correct: false,
            feedback: "Not quite. Try to relate your answer to the core ideas of this section."
                .to_string(),
            correct_answer: Some(hint),
        })
    }

    fn is_guest(&self) -> bool {
        true
    }
}
