//! # 内容处理流水线模块（pipeline）
//!
//! ## 设计思路
//!
//! 剪贴板内容的"识别 → 变换"规则被抽象为 `ContentHandler`，
//! 由 `Pipeline` 按固定顺序调度：
//!
//! - 每个处理器先判断是否匹配（`matches`），仅在匹配时才执行变换（`transform`）
//! - 第一个匹配的处理器即为最终选择，后续处理器不再被调用
//! - 匹配但变换失败视同未匹配（不转发），但在日志中可区分
//!
//! 处理器之间是互斥的候选，而非逐级叠加的变换链。
//!
//! ## 调用链
//!
//! ```text
//! 剪贴板变化 (Buffer)
//!    ↓
//! runner.rs（按顺序调度 + 步骤日志）
//!    ├─ json.rs（JSON 识别 + 两空格缩进美化）
//!    └─ trim.rs（首尾空白裁剪）
//!    ↓
//! Outcome::Transformed → 下游 sink
//! ```
//!
//! - `handler`：处理器能力契约
//! - `outcome`：单次运行结果与步骤轨迹
//! - `error`：处理器级错误（只在流水线内部流转）

mod error;
mod handler;
mod json;
mod outcome;
mod runner;
mod trim;

/// 剪贴板内容在某一时刻的不可变字节快照。
pub type Buffer = bytes::Bytes;

pub use error::TransformError;
pub use handler::ContentHandler;
pub use json::{JSON_HANDLER_NAME, JsonPrettyHandler};
pub use outcome::{Outcome, Step, StepEvent};
pub use runner::Pipeline;
pub use trim::{TRIM_HANDLER_NAME, WhitespaceTrimHandler};
