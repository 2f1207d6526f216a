//! 学习导航模块 (Study Navigation)
//!
//! 驱动 树 -> 章节 -> 小节 -> 课文 -> 练习 -> 反馈 的层级导航，
//! 与具体内容提供者无关。分成三层，让每条不变量都可机械验证：
//! - `machine`: 纯状态机，同步转移，零 I/O
//! - `cache`: 按实体 id 的获取状态映射，保证单飞 (single-flight)
//! - `controller`: 把提供者、缓存、状态机组合成完整流程

mod cache;
mod controller;
mod machine;

pub use cache::FetchMap;
pub use controller::StudyController;
pub use machine::{StudyMachine, StudyView};

use leptos::prelude::{LocalStorage, StoredValue};
use std::rc::Rc;

/// 视图层持有的控制器句柄
///
/// 控制器含 `Rc`/`RefCell`，不能直接塞进视图闭包（视图类型要求 Send）；
/// 经由 LocalStorage 仲裁的 StoredValue 句柄是 Copy + Send 的。
pub type ControllerHandle = StoredValue<Rc<StudyController>, LocalStorage>;
