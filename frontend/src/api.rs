//! 课程后端 API 客户端
//!
//! 所有请求都带 `credentials: include`（部署拓扑依赖 Cookie 关联时
//! 需要），持有令牌时附加 Bearer 认证头。

use gloo_net::http::{Request, RequestBuilder, Response};
use omnilearn_shared::protocol::{
    CreateQuestionsRequest, CreateTreeRequest, EvaluateRequest, GoogleLoginRequest, LoginRequest,
    RegisterRequest, TokenResponse, UserProfile,
};
use omnilearn_shared::{AnswerFeedback, KnowledgeTree, Lesson, Question};
use serde::Serialize;
use serde::de::DeserializeOwned;
use web_sys::RequestCredentials;

use crate::provider::ProviderError;

/// 后端基地址；部署时由边缘入口改写为 `/api/v1` 反向代理
pub const API_BASE: &str = "http://localhost:8000/api/v1";

#[derive(Clone, Debug, PartialEq)]
pub struct Api {
    base_url: String,
    token: Option<String>,
}

impl Api {
    pub fn new(token: Option<String>) -> Self {
        Self::with_base(API_BASE, token)
    }

    pub fn with_base(base_url: &str, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder.credentials(RequestCredentials::Include);
        match &self.token {
            Some(token) => builder.header("Authorization", &format!("Bearer {}", token)),
            None => builder,
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ProviderError> {
        let response = self
            .decorate(Request::get(&self.url(path)))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        expect_json(response).await
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ProviderError> {
        let response = self
            .decorate(Request::post(&self.url(path)))
            .json(body)
            .map_err(|e| ProviderError::Decode(e.to_string()))?
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        expect_json(response).await
    }

    // ---------------------------------------------------------
    // 内容接口
    // ---------------------------------------------------------

    pub async fn create_tree(&self, topic: &str) -> Result<KnowledgeTree, ProviderError> {
        let body = CreateTreeRequest {
            topic: topic.to_string(),
        };
        self.post_json("/knowledge-tree/", &body).await
    }

    // 按 id 重取课程树（树在本会话内不可变，当前流程直接复用创建结果）
    #[allow(dead_code)]
    pub async fn get_tree(&self, tree_id: i64) -> Result<KnowledgeTree, ProviderError> {
        self.get_json(&format!("/knowledge-tree/{}", tree_id)).await
    }

    pub async fn lesson_by_subsection(&self, subsection_id: i64) -> Result<Lesson, ProviderError> {
        self.get_json(&format!("/lessons/subsection/{}", subsection_id))
            .await
    }

    pub async fn questions_by_section(
        &self,
        section_id: i64,
    ) -> Result<Vec<Question>, ProviderError> {
        self.get_json(&format!("/questions/section/{}", section_id))
            .await
    }

    pub async fn create_questions(
        &self,
        section_id: i64,
        section_title: &str,
    ) -> Result<Vec<Question>, ProviderError> {
        let body = CreateQuestionsRequest {
            section_id,
            section_title: section_title.to_string(),
        };
        self.post_json("/questions/", &body).await
    }

    pub async fn evaluate(
        &self,
        question_id: i64,
        answer: &str,
    ) -> Result<AnswerFeedback, ProviderError> {
        let body = EvaluateRequest {
            question_id,
            answer: answer.to_string(),
        };
        self.post_json("/questions/evaluate", &body).await
    }

    // ---------------------------------------------------------
    // 会话接口
    // ---------------------------------------------------------

    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ProviderError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post_json("/auth/login", &body).await
    }

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<UserProfile, ProviderError> {
        let body = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            name: name.to_string(),
        };
        self.post_json("/auth/register", &body).await
    }

    pub async fn google_login(&self, id_token: &str) -> Result<TokenResponse, ProviderError> {
        let body = GoogleLoginRequest {
            id_token: id_token.to_string(),
        };
        self.post_json("/auth/google", &body).await
    }

    pub async fn me(&self) -> Result<UserProfile, ProviderError> {
        self.get_json("/auth/me").await
    }

    /// 登出是尽力而为的：调用方不应因它失败而阻塞本地清理
    pub async fn logout(&self) -> Result<(), ProviderError> {
        let response = self
            .decorate(Request::post(&self.url("/auth/logout")))
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        if response.ok() {
            Ok(())
        } else {
            Err(backend_error(response).await)
        }
    }
}

async fn expect_json<T: DeserializeOwned>(response: Response) -> Result<T, ProviderError> {
    if !response.ok() {
        return Err(backend_error(response).await);
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ProviderError::Decode(e.to_string()))
}

async fn backend_error(response: Response) -> ProviderError {
    let status = response.status();
    let message = response.text().await.unwrap_or_default();
    ProviderError::Backend { status, message }
}
