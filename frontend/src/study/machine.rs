//! 导航状态机 - 领域模型
//!
//! 纯数据与同步转移，不碰提供者也不碰 DOM，视图层只读它的当前状态。
//! 每次成功转移递增 `era`：异步结果回来时与发起前记下的 era 比对，
//! 不一致就说明用户已经离开，结果直接丢弃。

use omnilearn_shared::{KnowledgeTree, Subsection};

/// 当前展示的内容视图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyView {
    /// 浏览课程树（或尚未生成树）
    Tree,
    /// 展示某小节的课文
    Lesson,
    /// 练习第 `question` 题（0 起）
    Practice { question: usize },
    /// 第 `question` 题的批改反馈
    Feedback { question: usize },
}

/// 导航状态机
///
/// `tree == None` 即初始空状态；`tree_ready` 之后树不可变，
/// 所有转移都校验目标在树内可达。
#[derive(Debug, Clone, PartialEq)]
pub struct StudyMachine {
    tree: Option<KnowledgeTree>,
    active_section: usize,
    active_subsection: Option<i64>,
    view: StudyView,
    era: u64,
}

impl Default for StudyMachine {
    fn default() -> Self {
        Self {
            tree: None,
            active_section: 0,
            active_subsection: None,
            view: StudyView::Tree,
            era: 0,
        }
    }
}

impl StudyMachine {
    pub fn new() -> Self {
        Self::default()
    }

    fn bump(&mut self) {
        self.era += 1;
    }

    // ---------------------------------------------------------
    // 转移
    // ---------------------------------------------------------

    /// Empty -> TreeReady：装入生成好的课程树
    pub fn tree_ready(&mut self, tree: KnowledgeTree) {
        self.tree = Some(tree);
        self.active_section = 0;
        self.active_subsection = None;
        self.view = StudyView::Tree;
        self.bump();
    }

    /// 切换活跃章节（停留在树视图，清掉活跃小节）
    pub fn select_section(&mut self, index: usize) -> bool {
        let Some(tree) = &self.tree else {
            return false;
        };
        if index >= tree.sections.len() {
            return false;
        }
        self.active_section = index;
        self.active_subsection = None;
        self.view = StudyView::Tree;
        self.bump();
        true
    }

    /// 选中小节，进入课文视图
    ///
    /// 小节必须在当前树内可达，否则拒绝转移并返回 `None`——
    /// 控制器因此永远不会为树外 id 发起课文请求。
    pub fn select_subsection(&mut self, subsection_id: i64) -> Option<Subsection> {
        let tree = self.tree.as_ref()?;
        let section_index = tree.section_index_of(subsection_id)?;
        let subsection = tree.find_subsection(subsection_id)?.clone();

        self.active_section = section_index;
        self.active_subsection = Some(subsection_id);
        self.view = StudyView::Lesson;
        self.bump();
        Some(subsection)
    }

    /// 从课文进入练习，返回练习题的请求目标（章节 id 与标题）
    ///
    /// 已经在练习视图时重复请求是合法的（快速连点）：
    /// 不再转移，但仍返回目标，让调用方汇入同一次在途生成。
    pub fn start_practice(&mut self) -> Option<(i64, String)> {
        let target = self.practice_target()?;
        match self.view {
            StudyView::Lesson => {
                self.view = StudyView::Practice { question: 0 };
                self.bump();
                Some(target)
            }
            StudyView::Practice { .. } => Some(target),
            _ => None,
        }
    }

    /// Practice(i) -> Feedback(i)：批改结果就绪
    pub fn show_feedback(&mut self) -> bool {
        match self.view {
            StudyView::Practice { question } => {
                self.view = StudyView::Feedback { question };
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// Feedback(i) -> Practice(i+1)，题目用尽则回到课文
    pub fn advance(&mut self, question_count: usize) -> bool {
        match self.view {
            StudyView::Feedback { question } => {
                self.view = if question + 1 < question_count {
                    StudyView::Practice {
                        question: question + 1,
                    }
                } else {
                    StudyView::Lesson
                };
                self.bump();
                true
            }
            _ => false,
        }
    }

    /// 从任意内容视图回到树：保留活跃章节，清掉活跃小节
    pub fn back_to_tree(&mut self) {
        if self.tree.is_none() {
            return;
        }
        self.active_subsection = None;
        self.view = StudyView::Tree;
        self.bump();
    }

    // ---------------------------------------------------------
    // 查询
    // ---------------------------------------------------------

    pub fn view(&self) -> StudyView {
        self.view
    }

    pub fn era(&self) -> u64 {
        self.era
    }

    pub fn has_tree(&self) -> bool {
        self.tree.is_some()
    }

    pub fn tree(&self) -> Option<&KnowledgeTree> {
        self.tree.as_ref()
    }

    pub fn active_section(&self) -> usize {
        self.active_section
    }

    pub fn active_subsection(&self) -> Option<i64> {
        self.active_subsection
    }

    pub fn active_subsection_data(&self) -> Option<&Subsection> {
        let id = self.active_subsection?;
        self.tree.as_ref()?.find_subsection(id)
    }

    /// 练习题请求目标：活跃小节反向引用的 (章节 id, 章节标题)
    pub fn practice_target(&self) -> Option<(i64, String)> {
        let sub = self.active_subsection_data()?;
        Some((sub.section_id, sub.section_title.clone()))
    }
}

// =========================================================
// 单元测试 (Unit Tests)
// =========================================================
#[cfg(test)]
mod tests {
    use super::*;
    use omnilearn_shared::Section;

    fn tree_with_two_sections() -> KnowledgeTree {
        let section = |id: i64, title: &str, sub_base: i64| Section {
            id,
            tree_id: 1,
            title: title.to_string(),
            description: format!("about {}", title),
            subsections: (0..2)
                .map(|i| Subsection {
                    id: sub_base + i,
                    section_id: id,
                    title: format!("{} - Topic {}", title, i + 1),
                    description: "details".to_string(),
                    section_title: title.to_string(),
                })
                .collect(),
        };
        KnowledgeTree {
            id: 1,
            topic: "Rust".to_string(),
            sections: vec![section(2, "Section 1", 10), section(3, "Section 2", 20)],
        }
    }

    fn machine_with_tree() -> StudyMachine {
        let mut machine = StudyMachine::new();
        machine.tree_ready(tree_with_two_sections());
        machine
    }

    #[test]
    fn empty_machine_rejects_content_transitions() {
        let mut machine = StudyMachine::new();
        assert!(!machine.select_section(0));
        assert_eq!(machine.select_subsection(10), None);
        assert_eq!(machine.start_practice(), None);
        assert!(!machine.show_feedback());
        assert_eq!(machine.view(), StudyView::Tree);
        assert_eq!(machine.era(), 0);
    }

    #[test]
    fn tree_ready_starts_at_first_section() {
        let machine = machine_with_tree();
        assert_eq!(machine.view(), StudyView::Tree);
        assert_eq!(machine.active_section(), 0);
        assert_eq!(machine.active_subsection(), None);
        assert!(machine.has_tree());
    }

    #[test]
    fn selecting_a_subsection_enters_the_lesson() {
        let mut machine = machine_with_tree();
        let sub = machine.select_subsection(21).unwrap();
        assert_eq!(sub.section_id, 3);
        // The owning section becomes active automatically
        assert_eq!(machine.active_section(), 1);
        assert_eq!(machine.view(), StudyView::Lesson);
    }

    #[test]
    fn unknown_subsection_is_rejected_without_state_change() {
        let mut machine = machine_with_tree();
        let before = machine.clone();
        assert_eq!(machine.select_subsection(999), None);
        assert_eq!(machine, before);
    }

    #[test]
    fn practice_flow_walks_the_question_set() {
        let mut machine = machine_with_tree();
        machine.select_subsection(10).unwrap();

        let (section_id, section_title) = machine.start_practice().unwrap();
        assert_eq!(section_id, 2);
        assert_eq!(section_title, "Section 1");
        assert_eq!(machine.view(), StudyView::Practice { question: 0 });

        assert!(machine.show_feedback());
        assert_eq!(machine.view(), StudyView::Feedback { question: 0 });

        assert!(machine.advance(3));
        assert_eq!(machine.view(), StudyView::Practice { question: 1 });

        machine.show_feedback();
        machine.advance(3);
        machine.show_feedback();
        // Last question answered: the set is exhausted, back to the lesson
        assert!(machine.advance(3));
        assert_eq!(machine.view(), StudyView::Lesson);
    }

    #[test]
    fn repeated_start_practice_keeps_the_current_question() {
        let mut machine = machine_with_tree();
        machine.select_subsection(10).unwrap();
        machine.start_practice().unwrap();
        let era = machine.era();

        // A second click while practice is loading returns the same target
        let target = machine.start_practice().unwrap();
        assert_eq!(target.0, 2);
        assert_eq!(machine.view(), StudyView::Practice { question: 0 });
        assert_eq!(machine.era(), era);
    }

    #[test]
    fn back_to_tree_preserves_the_active_section() {
        let mut machine = machine_with_tree();
        machine.select_subsection(21).unwrap();
        machine.start_practice().unwrap();

        machine.back_to_tree();
        assert_eq!(machine.view(), StudyView::Tree);
        assert_eq!(machine.active_section(), 1);
        assert_eq!(machine.active_subsection(), None);
    }

    #[test]
    fn era_increases_on_every_transition() {
        let mut machine = machine_with_tree();
        let e0 = machine.era();
        machine.select_subsection(10).unwrap();
        let e1 = machine.era();
        machine.start_practice().unwrap();
        let e2 = machine.era();
        machine.back_to_tree();
        let e3 = machine.era();
        assert!(e0 < e1 && e1 < e2 && e2 < e3);
    }

    #[test]
    fn feedback_requires_practice_and_advance_requires_feedback() {
        let mut machine = machine_with_tree();
        machine.select_subsection(10).unwrap();
        assert!(!machine.show_feedback());
        assert!(!machine.advance(3));
    }
}
