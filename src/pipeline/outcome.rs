//! # 运行结果与步骤轨迹
//!
//! `Outcome` 描述一次 `Pipeline::run` 的结果；`StepEvent` 记录每个处理器
//! 的匹配 / 处理步骤是否发生，既写入日志也可被测试直接检查。

use std::fmt;

use super::{Buffer, TransformError};

/// 处理器内部的两个步骤。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Match,
    Process,
}

impl Step {
    fn label(self) -> &'static str {
        match self {
            Self::Match => "Match",
            Self::Process => "Process",
        }
    }
}

/// 单个步骤的执行记录。
///
/// `Display` 输出形如 `Match step taken for JSON Handler` 的轨迹行。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepEvent {
    pub handler: String,
    pub step: Step,
    pub taken: bool,
}

impl StepEvent {
    pub(crate) fn new(handler: &str, step: Step, taken: bool) -> Self {
        Self {
            handler: handler.to_string(),
            step,
            taken,
        }
    }

    /// 未匹配只在 debug 级别输出，处理失败为 warn。
    pub(crate) fn log_level(&self) -> log::Level {
        match (self.step, self.taken) {
            (Step::Match, false) => log::Level::Debug,
            (Step::Process, false) => log::Level::Warn,
            _ => log::Level::Info,
        }
    }
}

impl fmt::Display for StepEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.taken { "taken" } else { "not taken" };
        write!(f, "{} step {} for {}", self.step.label(), state, self.handler)
    }
}

/// 一次流水线运行的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// 某个处理器匹配并成功产出了非空内容。
    Transformed { handler: String, output: Buffer },
    /// 某个处理器匹配了，但变换失败；不会转发给下游。
    TransformFailed {
        handler: String,
        reason: TransformError,
    },
    /// 没有任何处理器匹配。
    Unmatched,
}

impl Outcome {
    /// 可转发给下游的内容；只有非空的变换结果才算。
    pub fn output(&self) -> Option<&Buffer> {
        match self {
            Self::Transformed { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }

    pub fn into_output(self) -> Option<Buffer> {
        match self {
            Self::Transformed { output, .. } if !output.is_empty() => Some(output),
            _ => None,
        }
    }

    /// 选中的处理器名称（未匹配时为 `None`）。
    pub fn handler(&self) -> Option<&str> {
        match self {
            Self::Transformed { handler, .. } | Self::TransformFailed { handler, .. } => {
                Some(handler.as_str())
            }
            Self::Unmatched => None,
        }
    }
}
