//! 内容提供者模块 (Content Provider)
//!
//! 对 {生成课程树, 取课文, 确保练习题, 批改答案} 这组能力做多态抽象：
//! - `RemoteProvider`：委托课程后端
//! - `GuestProvider`：本地确定性合成，零网络
//!
//! 具体实现只在组合根 [`provider_for_session`] 处按认证状态选择一次，
//! 导航控制器之后一律通过 trait 调用，不再区分变体。

mod guest;
mod remote;

pub use guest::GuestProvider;
pub use remote::RemoteProvider;

use omnilearn_shared::{AnswerFeedback, KnowledgeTree, Lesson, Question};
use std::rc::Rc;

use crate::api::Api;

/// 内容获取错误
///
/// Clone 语义是刻意的：同一次去重获取可能有多个等待者，
/// 失败结果要能广播给每一个。
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderError {
    /// 网络层失败（请求未到达后端）
    Network(String),
    /// 后端返回非 2xx
    Backend { status: u16, message: String },
    /// 响应体解析失败
    Decode(String),
    /// 请求的实体不在当前加载的树内（导航不变量被破坏）
    NotInTree(i64),
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::Network(msg) => write!(f, "network error: {}", msg),
            ProviderError::Backend { status, message } => {
                write!(f, "backend returned {}: {}", status, message)
            }
            ProviderError::Decode(msg) => write!(f, "invalid response: {}", msg),
            ProviderError::NotInTree(id) => {
                write!(f, "entity {} is not part of the loaded tree", id)
            }
        }
    }
}

impl std::error::Error for ProviderError {}

/// 内容提供者特性 (Trait)
///
/// Worker/浏览器环境下很多类型不是 Send 的，故用 `?Send`。
#[async_trait::async_trait(?Send)]
pub trait ContentProvider {
    /// 依据主题生成课程树
    async fn create_tree(&self, topic: &str) -> Result<KnowledgeTree, ProviderError>;

    /// 按小节取课文
    async fn lesson(&self, subsection_id: i64) -> Result<Lesson, ProviderError>;

    /// 返回章节已有的练习题，没有则触发生成
    ///
    /// 同一章节的并发去重不在这里做——控制器的获取缓存统一保证
    /// 任意时刻每个章节至多一个在途生成请求。
    async fn ensure_questions(
        &self,
        section_id: i64,
        section_title: &str,
    ) -> Result<Vec<Question>, ProviderError>;

    /// 批改一道题的作答
    async fn evaluate(&self, question_id: i64, answer: &str)
        -> Result<AnswerFeedback, ProviderError>;

    /// 建议性标记，仅供界面文案使用（如访客模式下不展示网络错误）
    fn is_guest(&self) -> bool {
        false
    }
}

/// 组合根：按认证状态选择提供者变体
///
/// 有令牌 ⇒ 远端；无令牌 ⇒ 访客。这是全 crate 唯一按变体分支的地方。
pub fn provider_for_session(token: Option<String>) -> Rc<dyn ContentProvider> {
    match token {
        Some(token) => Rc::new(RemoteProvider::new(Api::new(Some(token)))),
        None => Rc::new(GuestProvider::new()),
    }
}
