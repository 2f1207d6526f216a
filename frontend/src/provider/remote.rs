//! 远端内容提供者
//!
//! 薄委托层：四个内容操作全部转发给后端。
//! 练习题采用"先查已有、为空再生成"的两段式，
//! 生成本身的并发去重由控制器缓存负责。

use omnilearn_shared::{AnswerFeedback, KnowledgeTree, Lesson, Question};

use super::{ContentProvider, ProviderError};
use crate::api::Api;

pub struct RemoteProvider {
    api: Api,
}

impl RemoteProvider {
    pub fn new(api: Api) -> Self {
        Self { api }
    }
}

#[async_trait::async_trait(?Send)]
impl ContentProvider for RemoteProvider {
    async fn create_tree(&self, topic: &str) -> Result<KnowledgeTree, ProviderError> {
        self.api.create_tree(topic).await
    }

    async fn lesson(&self, subsection_id: i64) -> Result<Lesson, ProviderError> {
        self.api.lesson_by_subsection(subsection_id).await
    }

    async fn ensure_questions(
        &self,
        section_id: i64,
        section_title: &str,
    ) -> Result<Vec<Question>, ProviderError> {
        let existing = self.api.questions_by_section(section_id).await?;
        if !existing.is_empty() {
            return Ok(existing);
        }
        self.api.create_questions(section_id, section_title).await
    }

    async fn evaluate(
        &self,
        question_id: i64,
        answer: &str,
    ) -> Result<AnswerFeedback, ProviderError> {
        self.api.evaluate(question_id, answer).await
    }
}
