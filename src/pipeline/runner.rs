//! # 流水线调度模块
//!
//! ## 设计思路
//!
//! `Pipeline` 只负责"按顺序挑选第一个匹配的处理器并执行它"：
//! 1. 依次调用 `matches`
//! 2. 第一个匹配者执行 `transform`，其余处理器不再被触碰
//! 3. 变换失败或产物为空都降级为"无输出"
//!
//! ## 实现思路
//!
//! - 每个步骤生成一条 `StepEvent`，同时写入日志，便于排查为何没有美化。
//! - `Pipeline` 不持有任何可变状态，可在多个任务间共享（`Arc<Pipeline>`）。
//! - `forward` 在运行后把非空产物送入下游通道；通道满时等待，形成背压。

use tokio::sync::mpsc;

use super::outcome::{Outcome, Step, StepEvent};
use super::{Buffer, ContentHandler, JsonPrettyHandler, TransformError};
use crate::error::AppError;

/// 有序的处理器列表。
pub struct Pipeline {
    handlers: Vec<Box<dyn ContentHandler>>,
}

impl Pipeline {
    /// 创建空流水线（不匹配任何内容）。
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// 追加一个处理器，返回自身便于链式构建。
    ///
    /// # 示例
    /// ```rust
    /// use clipboard_pretty::pipeline::{JsonPrettyHandler, Pipeline, WhitespaceTrimHandler};
    ///
    /// let pipeline = Pipeline::new()
    ///     .with_handler(JsonPrettyHandler::new())
    ///     .with_handler(WhitespaceTrimHandler::new());
    /// assert_eq!(pipeline.handler_names(), vec!["JSON Handler", "Trim Handler"]);
    /// ```
    pub fn with_handler(mut self, handler: impl ContentHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// 在末尾注册一个处理器。
    pub fn push(&mut self, handler: Box<dyn ContentHandler>) {
        self.handlers.push(handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn handler_names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// 运行一次流水线，只返回结果。
    pub fn run(&self, buffer: &[u8]) -> Outcome {
        self.run_traced(buffer).0
    }

    /// 运行一次流水线，同时返回按发生顺序排列的步骤轨迹。
    pub fn run_traced(&self, buffer: &[u8]) -> (Outcome, Vec<StepEvent>) {
        let mut trace = Vec::with_capacity(2);

        for handler in &self.handlers {
            let name = handler.name();

            if !handler.matches(buffer) {
                record(&mut trace, StepEvent::new(name, Step::Match, false));
                continue;
            }
            record(&mut trace, StepEvent::new(name, Step::Match, true));

            let outcome = match handler.transform(buffer) {
                Ok(output) if !output.is_empty() => Outcome::Transformed {
                    handler: name.to_string(),
                    output,
                },
                Ok(_) => Outcome::TransformFailed {
                    handler: name.to_string(),
                    reason: TransformError::EmptyOutput,
                },
                Err(reason) => Outcome::TransformFailed {
                    handler: name.to_string(),
                    reason,
                },
            };

            let processed = matches!(outcome, Outcome::Transformed { .. });
            record(&mut trace, StepEvent::new(name, Step::Process, processed));
            if let Outcome::TransformFailed { reason, .. } = &outcome {
                log::warn!("⚠️ {} 匹配成功但变换失败：{}", name, reason);
            }

            return (outcome, trace);
        }

        (Outcome::Unmatched, trace)
    }

    /// 运行流水线并把非空产物发送到下游。
    ///
    /// 返回是否发送了内容。下游接收端已关闭时返回 `AppError::ChannelClosed`。
    pub async fn forward(
        &self,
        buffer: &[u8],
        output: &mpsc::Sender<Buffer>,
    ) -> Result<bool, AppError> {
        let Some(transformed) = self.run(buffer).into_output() else {
            return Ok(false);
        };

        output
            .send(transformed)
            .await
            .map_err(|_| AppError::ChannelClosed("pipeline output"))?;
        Ok(true)
    }
}

impl Default for Pipeline {
    /// 默认流水线只包含 JSON 美化处理器。
    fn default() -> Self {
        Self::new().with_handler(JsonPrettyHandler::new())
    }
}

fn record(trace: &mut Vec<StepEvent>, event: StepEvent) {
    log::log!(event.log_level(), "{}", event);
    trace.push(event);
}
