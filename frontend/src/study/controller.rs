//! 学习控制器 - 组合层
//!
//! 把内容提供者、两张获取缓存（课文按小节、练习题按章节）和导航状态机
//! 组合成完整流程。状态机放在 Signal 里驱动视图；缓存结算后递增
//! `revision` 信号触发重渲染。
//!
//! 异步结果回来后一律用 `try_*` 写信号（视图可能已被卸载），并用发起前
//! 记下的 era 决定是否还允许转移状态。

use leptos::prelude::*;
use omnilearn_shared::{AnswerFeedback, Lesson, Question};
use std::rc::Rc;

use super::cache::FetchMap;
use super::machine::{StudyMachine, StudyView};
use crate::provider::{ContentProvider, ProviderError};

pub struct StudyController {
    provider: Rc<dyn ContentProvider>,
    machine: RwSignal<StudyMachine>,
    lessons: FetchMap<Lesson>,
    questions: FetchMap<Vec<Question>>,
    feedback: RwSignal<Option<AnswerFeedback>>,
    revision: RwSignal<u64>,
}

impl StudyController {
    pub fn new(provider: Rc<dyn ContentProvider>) -> Self {
        Self {
            provider,
            machine: RwSignal::new(StudyMachine::new()),
            lessons: FetchMap::new(),
            questions: FetchMap::new(),
            feedback: RwSignal::new(None),
            revision: RwSignal::new(0),
        }
    }

    // ---------------------------------------------------------
    // 信号与快照（视图读取面）
    // ---------------------------------------------------------

    pub fn machine(&self) -> RwSignal<StudyMachine> {
        self.machine
    }

    /// 当前题的批改反馈；只在 Feedback 视图期间存在
    pub fn feedback(&self) -> RwSignal<Option<AnswerFeedback>> {
        self.feedback
    }

    /// 缓存结算计数，视图在闭包里 get 它来订阅缓存变化
    pub fn revision(&self) -> RwSignal<u64> {
        self.revision
    }

    pub fn is_guest(&self) -> bool {
        self.provider.is_guest()
    }

    pub fn lesson_ready(&self, subsection_id: i64) -> Option<Lesson> {
        self.lessons.ready(subsection_id)
    }

    pub fn lesson_error(&self, subsection_id: i64) -> Option<ProviderError> {
        self.lessons.error(subsection_id)
    }

    pub fn lesson_loading(&self, subsection_id: i64) -> bool {
        self.lessons.is_in_flight(subsection_id)
    }

    /// 活跃小节所属章节的练习题（就绪时）
    pub fn active_questions(&self) -> Option<Vec<Question>> {
        let section_id = self.active_section_id()?;
        self.questions.ready(section_id)
    }

    pub fn questions_loading(&self) -> bool {
        self.active_section_id()
            .map(|id| self.questions.is_in_flight(id))
            .unwrap_or(false)
    }

    pub fn questions_error(&self) -> Option<ProviderError> {
        let section_id = self.active_section_id()?;
        self.questions.error(section_id)
    }

    fn active_section_id(&self) -> Option<i64> {
        self.machine
            .with_untracked(|m| m.practice_target().map(|(id, _)| id))
    }

    fn bump_revision(&self) {
        self.revision.try_update(|r| *r += 1);
    }

    // ---------------------------------------------------------
    // 流程
    // ---------------------------------------------------------

    /// 生成课程树并进入 TreeReady
    pub async fn create_tree(&self, topic: &str) -> Result<(), ProviderError> {
        let mut tree = self.provider.create_tree(topic).await?;
        tree.link_backrefs()
            .map_err(|e| ProviderError::Decode(e.to_string()))?;

        self.feedback.try_set(None);
        self.machine.try_update(|m| m.tree_ready(tree));
        self.bump_revision();
        Ok(())
    }

    /// 切换活跃章节
    pub fn select_section(&self, index: usize) {
        self.machine.update(|m| {
            m.select_section(index);
        });
    }

    /// 选中小节并确保课文已加载
    ///
    /// 重复选择同一小节由缓存短路，不会重新请求。
    pub async fn open_lesson(&self, subsection_id: i64) -> Result<(), ProviderError> {
        let selected = self
            .machine
            .try_update(|m| m.select_subsection(subsection_id))
            .flatten();
        if selected.is_none() {
            return Err(ProviderError::NotInTree(subsection_id));
        }
        self.feedback.try_set(None);

        let provider = Rc::clone(&self.provider);
        let result = self
            .lessons
            .get_or_fetch(subsection_id, async move {
                provider.lesson(subsection_id).await
            })
            .await;
        self.bump_revision();
        result.map(|_| ())
    }

    /// 进入练习并确保题目已生成
    ///
    /// 快速连点只会产生一次生成请求：状态机对重复请求返回同一目标，
    /// 缓存把后来者挂到同一次在途获取上。
    pub async fn start_practice(&self) -> Result<(), ProviderError> {
        let target = self.machine.try_update(|m| m.start_practice()).flatten();
        let Some((section_id, section_title)) = target else {
            return Ok(());
        };
        self.feedback.try_set(None);

        let provider = Rc::clone(&self.provider);
        let result = self
            .questions
            .get_or_fetch(section_id, async move {
                provider.ensure_questions(section_id, &section_title).await
            })
            .await;
        self.bump_revision();
        result.map(|_| ())
    }

    /// 提交当前题的作答
    ///
    /// 空答案本地拒绝：不发请求，不转移状态。批改结果回来时若用户已
    /// 离开当前题（era 不一致），结果丢弃。
    pub async fn submit_answer(&self, answer: &str) -> Result<(), ProviderError> {
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(());
        }

        let snapshot = self.machine.with_untracked(|m| {
            let question_index = match m.view() {
                StudyView::Practice { question } => question,
                _ => return None,
            };
            let (section_id, _) = m.practice_target()?;
            Some((section_id, question_index, m.era()))
        });
        let Some((section_id, question_index, era)) = snapshot else {
            return Ok(());
        };
        let Some(question) = self
            .questions
            .ready(section_id)
            .and_then(|qs| qs.get(question_index).cloned())
        else {
            return Ok(());
        };

        let feedback = self.provider.evaluate(question.id, answer).await?;

        let applied = self
            .machine
            .try_update(|m| {
                if m.era() == era {
                    m.show_feedback()
                } else {
                    false
                }
            })
            .unwrap_or(false);
        if applied {
            self.feedback.try_set(Some(feedback));
            self.bump_revision();
        }
        Ok(())
    }

    /// 离开反馈：下一题，或题目用尽回到课文
    pub fn advance(&self) {
        let question_count = self.active_questions().map(|qs| qs.len()).unwrap_or(0);
        self.feedback.set(None);
        self.machine.update(|m| {
            m.advance(question_count);
        });
    }

    /// 从任意内容视图回到树
    pub fn back_to_tree(&self) {
        self.feedback.set(None);
        self.machine.update(|m| m.back_to_tree());
    }
}

// =========================================================
// 单元测试 (Unit Tests)
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::GuestProvider;
    use omnilearn_shared::{Difficulty, KnowledgeTree, Section, Subsection};
    use std::cell::RefCell;

    // ---------------------------------------------------------
    // Mock provider with an operation log
    // ---------------------------------------------------------

    struct MockProvider {
        log: RefCell<Vec<String>>,
    }

    impl MockProvider {
        fn new() -> Self {
            Self {
                log: RefCell::new(Vec::new()),
            }
        }

        fn push(&self, entry: String) {
            self.log.borrow_mut().push(entry);
        }

        fn count(&self, prefix: &str) -> usize {
            self.log
                .borrow()
                .iter()
                .filter(|e| e.starts_with(prefix))
                .count()
        }

        fn tree() -> KnowledgeTree {
            KnowledgeTree {
                id: 1,
                topic: "Math".to_string(),
                sections: vec![Section {
                    id: 2,
                    tree_id: 1,
                    title: "Section 1".to_string(),
                    description: "numbers".to_string(),
                    subsections: vec![Subsection {
                        id: 3,
                        section_id: 2,
                        title: "Section 1 - Topic 1".to_string(),
                        description: "counting".to_string(),
                        section_title: String::new(),
                    }],
                }],
            }
        }
    }

    #[async_trait::async_trait(?Send)]
    impl ContentProvider for MockProvider {
        async fn create_tree(&self, topic: &str) -> Result<KnowledgeTree, ProviderError> {
            self.push(format!("create_tree:{}", topic));
            Ok(Self::tree())
        }

        async fn lesson(&self, subsection_id: i64) -> Result<Lesson, ProviderError> {
            self.push(format!("lesson:{}", subsection_id));
            tokio::task::yield_now().await;
            Ok(Lesson {
                subsection_id,
                content: "<p>lesson</p>".to_string(),
                multimedia_urls: Vec::new(),
            })
        }

        async fn ensure_questions(
            &self,
            section_id: i64,
            section_title: &str,
        ) -> Result<Vec<Question>, ProviderError> {
            self.push(format!("ensure_questions:{}", section_id));
            tokio::task::yield_now().await;
            Ok((0..3)
                .map(|i| Question {
                    id: 100 + i,
                    section_id,
                    text: format!("{} q{}", section_title, i),
                    difficulty: Difficulty::Medium,
                })
                .collect())
        }

        async fn evaluate(
            &self,
            question_id: i64,
            _answer: &str,
        ) -> Result<AnswerFeedback, ProviderError> {
            self.push(format!("evaluate:{}", question_id));
            // Deliberately slow so a competing navigation can win the race
            for _ in 0..3 {
                tokio::task::yield_now().await;
            }
            Ok(AnswerFeedback {
                is_correct: true,
                feedback: "ok".to_string(),
                correct_answer: None,
            })
        }
    }

    fn controller_with_mock() -> (Rc<MockProvider>, StudyController) {
        let provider = Rc::new(MockProvider::new());
        let controller = StudyController::new(provider.clone());
        (provider, controller)
    }

    // ---------------------------------------------------------
    // Scenario: full guest walkthrough
    // ---------------------------------------------------------

    #[tokio::test]
    async fn guest_walkthrough() {
        let controller = StudyController::new(Rc::new(GuestProvider::new()));
        assert!(controller.is_guest());

        controller.create_tree("History").await.unwrap();
        let machine = controller.machine();

        let titles: Vec<String> = machine.with_untracked(|m| {
            m.tree()
                .unwrap()
                .sections
                .iter()
                .map(|s| s.title.clone())
                .collect()
        });
        assert_eq!(titles, vec!["Section 1", "Section 2", "Section 3"]);

        // Open "Section 1 - Topic 2" and read its lesson
        let sub_id = machine.with_untracked(|m| {
            m.tree()
                .unwrap()
                .sections
                .iter()
                .flat_map(|s| s.subsections.iter())
                .find(|s| s.title == "Section 1 - Topic 2")
                .unwrap()
                .id
        });
        controller.open_lesson(sub_id).await.unwrap();
        assert_eq!(machine.with_untracked(|m| m.view()), StudyView::Lesson);
        let lesson = controller.lesson_ready(sub_id).unwrap();
        assert!(lesson.content.contains("History"));

        // Practice: three questions, easy -> medium -> hard
        controller.start_practice().await.unwrap();
        let questions = controller.active_questions().unwrap();
        let difficulties: Vec<Difficulty> = questions.iter().map(|q| q.difficulty).collect();
        assert_eq!(
            difficulties,
            vec![Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
        );

        // A keyword answer is graded correct
        controller
            .submit_answer("it covers core concepts")
            .await
            .unwrap();
        assert_eq!(
            machine.with_untracked(|m| m.view()),
            StudyView::Feedback { question: 0 }
        );
        let feedback = controller.feedback().get_untracked().unwrap();
        assert!(feedback.is_correct);

        // Next question, then a wrong answer with a correct-answer hint
        controller.advance();
        assert_eq!(
            machine.with_untracked(|m| m.view()),
            StudyView::Practice { question: 1 }
        );
        controller.submit_answer("xyz").await.unwrap();
        let feedback = controller.feedback().get_untracked().unwrap();
        assert!(!feedback.is_correct);
        assert!(feedback.correct_answer.is_some());

        // Feedback is ephemeral: leaving the question drops it
        controller.back_to_tree();
        assert_eq!(controller.feedback().get_untracked(), None);
        assert_eq!(machine.with_untracked(|m| m.view()), StudyView::Tree);
    }

    // ---------------------------------------------------------
    // Caching and dedupe
    // ---------------------------------------------------------

    #[tokio::test]
    async fn reopening_a_lesson_does_not_refetch() {
        let (provider, controller) = controller_with_mock();
        controller.create_tree("Math").await.unwrap();

        controller.open_lesson(3).await.unwrap();
        controller.back_to_tree();
        controller.open_lesson(3).await.unwrap();

        assert_eq!(provider.count("lesson:"), 1);
    }

    #[tokio::test]
    async fn rapid_double_practice_requests_generate_once() {
        let (provider, controller) = controller_with_mock();
        controller.create_tree("Math").await.unwrap();
        controller.open_lesson(3).await.unwrap();

        let (a, b) = futures::join!(controller.start_practice(), controller.start_practice());
        a.unwrap();
        b.unwrap();

        assert_eq!(provider.count("ensure_questions:"), 1);
        assert_eq!(controller.active_questions().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn lesson_outside_the_tree_is_refused() {
        let (provider, controller) = controller_with_mock();
        controller.create_tree("Math").await.unwrap();

        let err = controller.open_lesson(999).await.unwrap_err();
        assert_eq!(err, ProviderError::NotInTree(999));
        assert_eq!(provider.count("lesson:"), 0);
    }

    // ---------------------------------------------------------
    // Answer submission
    // ---------------------------------------------------------

    #[tokio::test]
    async fn empty_answer_is_rejected_locally() {
        let (provider, controller) = controller_with_mock();
        controller.create_tree("Math").await.unwrap();
        controller.open_lesson(3).await.unwrap();
        controller.start_practice().await.unwrap();

        controller.submit_answer("   ").await.unwrap();

        assert_eq!(provider.count("evaluate:"), 0);
        assert_eq!(
            controller.machine().with_untracked(|m| m.view()),
            StudyView::Practice { question: 0 }
        );
        assert_eq!(controller.feedback().get_untracked(), None);
    }

    #[tokio::test]
    async fn stale_evaluation_result_is_dropped() {
        let (provider, controller) = controller_with_mock();
        controller.create_tree("Math").await.unwrap();
        controller.open_lesson(3).await.unwrap();
        controller.start_practice().await.unwrap();

        // The user navigates back to the tree while grading is in flight
        let submit = controller.submit_answer("some answer");
        let navigate = async {
            tokio::task::yield_now().await;
            controller.back_to_tree();
        };
        let (result, _) = futures::join!(submit, navigate);
        result.unwrap();

        // The call happened, but the late result did not touch live state
        assert_eq!(provider.count("evaluate:"), 1);
        assert_eq!(
            controller.machine().with_untracked(|m| m.view()),
            StudyView::Tree
        );
        assert_eq!(controller.feedback().get_untracked(), None);
    }
}
