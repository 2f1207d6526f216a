//! 领域模型 (Domain Models)
//!
//! 课程树三层结构（树 -> 章节 -> 小节）以及课文、练习题、批改反馈。
//! 所有类型与后端 JSON 一一对应，由前端的两种内容提供者共同使用。

use serde::{Deserialize, Serialize};

/// 课程树：一次生成，之后不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeTree {
    pub id: i64,
    pub topic: String,
    pub sections: Vec<Section>,
}

/// 章节：顺序即展示顺序
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: i64,
    pub tree_id: i64,
    pub title: String,
    pub description: String,
    pub subsections: Vec<Subsection>,
}

/// 小节
///
/// `section_title` 是反向引用的冗余字段：课文视图靠它直接发起练习题请求，
/// 无需回头再查一次章节。远端返回的树可能缺失该字段（serde default），
/// 统一由 [`KnowledgeTree::link_backrefs`] 填充。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    pub id: i64,
    pub section_id: i64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub section_title: String,
}

/// 课文：与小节一对一，懒加载
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub subsection_id: i64,
    pub content: String,
    #[serde(default)]
    pub multimedia_urls: Vec<String>,
}

/// 练习题难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

/// 练习题：按章节批量生成，不随树下发
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub section_id: i64,
    pub text: String,
    pub difficulty: Difficulty,
}

/// 批改反馈：仅存在于一道题的复盘期间，客户端不持久化
///
/// `correct_answer` 只在回答错误时出现。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub feedback: String,
    #[serde(default)]
    pub correct_answer: Option<String>,
}

impl KnowledgeTree {
    /// 规范化反向引用
    ///
    /// 为每个小节回填所属章节标题，同时校验 `section_id` 确实指向本树中的
    /// 章节。前端接受任何来源的树时都必须先经过这里，树内可达性不变量
    /// 因此只需要在这一个入口维护。
    pub fn link_backrefs(&mut self) -> Result<(), OrphanSubsection> {
        for section in &mut self.sections {
            for sub in &mut section.subsections {
                if sub.section_id != section.id {
                    return Err(OrphanSubsection {
                        subsection_id: sub.id,
                        section_id: sub.section_id,
                    });
                }
                sub.section_title = section.title.clone();
            }
        }
        Ok(())
    }

    /// 在树中查找小节
    pub fn find_subsection(&self, subsection_id: i64) -> Option<&Subsection> {
        self.sections
            .iter()
            .flat_map(|s| s.subsections.iter())
            .find(|sub| sub.id == subsection_id)
    }

    /// 小节所属章节在 `sections` 中的下标
    pub fn section_index_of(&self, subsection_id: i64) -> Option<usize> {
        self.sections
            .iter()
            .position(|s| s.subsections.iter().any(|sub| sub.id == subsection_id))
    }
}

/// 小节的 `section_id` 没有落在所属树内
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrphanSubsection {
    pub subsection_id: i64,
    pub section_id: i64,
}

impl std::fmt::Display for OrphanSubsection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "subsection {} references section {} outside its tree",
            self.subsection_id, self.section_id
        )
    }
}

impl std::error::Error for OrphanSubsection {}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> KnowledgeTree {
        KnowledgeTree {
            id: 1,
            topic: "Rust".into(),
            sections: vec![Section {
                id: 2,
                tree_id: 1,
                title: "Basics".into(),
                description: "intro".into(),
                subsections: vec![Subsection {
                    id: 3,
                    section_id: 2,
                    title: "Ownership".into(),
                    description: "moves".into(),
                    section_title: String::new(),
                }],
            }],
        }
    }

    #[test]
    fn link_backrefs_fills_section_title() {
        let mut tree = sample_tree();
        tree.link_backrefs().unwrap();
        assert_eq!(tree.sections[0].subsections[0].section_title, "Basics");
    }

    #[test]
    fn link_backrefs_rejects_orphan() {
        let mut tree = sample_tree();
        tree.sections[0].subsections[0].section_id = 99;
        let err = tree.link_backrefs().unwrap_err();
        assert_eq!(err.subsection_id, 3);
        assert_eq!(err.section_id, 99);
    }

    #[test]
    fn subsection_tolerates_missing_backref_field() {
        // Remote payloads do not carry section_title
        let json = r#"{"id":3,"section_id":2,"title":"t","description":"d"}"#;
        let sub: Subsection = serde_json::from_str(json).unwrap();
        assert_eq!(sub.section_title, "");
    }

    #[test]
    fn difficulty_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"hard\"");
        let d: Difficulty = serde_json::from_str("\"easy\"").unwrap();
        assert_eq!(d, Difficulty::Easy);
    }

    #[test]
    fn find_subsection_and_section_index() {
        let tree = sample_tree();
        assert_eq!(tree.find_subsection(3).map(|s| s.id), Some(3));
        assert_eq!(tree.section_index_of(3), Some(0));
        assert_eq!(tree.find_subsection(42), None);
        assert_eq!(tree.section_index_of(42), None);
    }
}
