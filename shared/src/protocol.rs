//! 请求/响应 DTO (Wire Protocol)
//!
//! 与课程后端 `/api/v1` 交换的请求体和响应体。
//! 字段名即后端约定的 JSON 键名。

use serde::{Deserialize, Serialize};

// =========================================================
// 内容接口
// =========================================================

/// 依据主题生成课程树
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTreeRequest {
    pub topic: String,
}

/// 为章节生成练习题
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQuestionsRequest {
    pub section_id: i64,
    pub section_title: String,
}

/// 提交答案等待批改
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluateRequest {
    pub question_id: i64,
    pub answer: String,
}

// =========================================================
// 会话接口
// =========================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// Google Identity 返回的断言，换取本站会话令牌
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleLoginRequest {
    pub id_token: String,
}

/// 登录/OAuth 兑换成功后的会话令牌
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
}

/// `/auth/me` 返回的用户资料
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub email: String,
    pub name: String,
    #[serde(default)]
    pub picture_url: Option<String>,
}
