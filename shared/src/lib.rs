pub mod model;
pub mod protocol;

pub use model::{AnswerFeedback, Difficulty, KnowledgeTree, Lesson, Question, Section, Subsection};

// =========================================================
// 常量定义 (Constants)
// =========================================================

/// 会话 Cookie 名称，前端写入、边缘守卫读取
pub const SESSION_COOKIE: &str = "ol_jwt";

/// LocalStorage 中与 Cookie 同步的过期时间键（毫秒时间戳）
pub const SESSION_EXPIRY_KEY: &str = "ol_jwt_expires";

/// 会话有效期（秒），Cookie Max-Age 与 LocalStorage 过期镜像共用
pub const SESSION_MAX_AGE_SECS: i64 = 60 * 60 * 24 * 7;

/// 登录入口路径，未认证请求被重定向到这里
pub const LOGIN_PATH: &str = "/auth/login";

/// 重定向时携带原始目标路径的查询参数名
pub const RETURN_TO_PARAM: &str = "next";
