//! 应用设置
//!
//! 设置来自可选的 JSON 文件（路径由环境变量 `CLIPBOARD_PRETTY_SETTINGS` 指定），
//! 文件不存在时使用默认值。键名为 camelCase，所有数值在加载时归一化到合法区间。
//!
//! ```json
//! {
//!   "handlers": ["json", "trim"],
//!   "pollIntervalMs": 500,
//!   "channelCapacity": 1,
//!   "writeBack": true,
//!   "mirrorToDisplay": true,
//!   "clipboardRetries": 3,
//!   "clipboardRetryDelayMs": 100
//! }
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::clipboard::RetryPolicy;
use crate::clipboard::listener::normalize_poll_interval_ms;
use crate::error::AppError;
use crate::pipeline::{ContentHandler, JsonPrettyHandler, Pipeline, WhitespaceTrimHandler};

pub const SETTINGS_PATH_ENV: &str = "CLIPBOARD_PRETTY_SETTINGS";

/// 可配置的处理器种类，按列表顺序装入流水线。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerKind {
    Json,
    Trim,
}

impl HandlerKind {
    pub fn build(self) -> Box<dyn ContentHandler> {
        match self {
            Self::Json => Box::new(JsonPrettyHandler::new()),
            Self::Trim => Box::new(WhitespaceTrimHandler::new()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub handlers: Vec<HandlerKind>,
    pub poll_interval_ms: u64,
    pub channel_capacity: usize,
    pub write_back: bool,
    pub mirror_to_display: bool,
    pub clipboard_retries: u32,
    pub clipboard_retry_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            handlers: vec![HandlerKind::Json],
            poll_interval_ms: 500,
            channel_capacity: 1,
            write_back: true,
            mirror_to_display: true,
            clipboard_retries: 3,
            clipboard_retry_delay_ms: 100,
        }
    }
}

impl Settings {
    /// 从 `CLIPBOARD_PRETTY_SETTINGS` 指向的文件加载；未设置时返回默认值。
    pub fn load_from_env() -> Result<Self, AppError> {
        match std::env::var_os(SETTINGS_PATH_ENV) {
            Some(path) => Self::load(Path::new(&path)),
            None => Ok(Self::default()),
        }
    }

    /// 从文件加载；文件不存在时返回默认值。
    pub fn load(path: &Path) -> Result<Self, AppError> {
        if !path.exists() {
            log::info!("⚙️ 设置文件 {} 不存在，使用默认设置", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        let settings = Self::from_json_str(&content)?;
        log::info!("⚙️ 已加载设置文件 {}", path.display());
        Ok(settings)
    }

    pub fn from_json_str(content: &str) -> Result<Self, AppError> {
        let parsed: Self = serde_json::from_str(content)?;
        parsed.normalized()
    }

    fn normalized(mut self) -> Result<Self, AppError> {
        if self.handlers.is_empty() {
            return Err(AppError::Settings("handlers 不能为空".to_string()));
        }

        self.poll_interval_ms = normalize_poll_interval_ms(self.poll_interval_ms);
        self.channel_capacity = self.channel_capacity.clamp(1, 64);
        self.clipboard_retries = self.clipboard_retries.clamp(1, 10);
        self.clipboard_retry_delay_ms = self.clipboard_retry_delay_ms.clamp(10, 5_000);
        Ok(self)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.clipboard_retries,
            base_delay_ms: self.clipboard_retry_delay_ms,
        }
    }

    /// 按设置中的顺序构建流水线。
    pub fn build_pipeline(&self) -> Pipeline {
        let mut pipeline = Pipeline::new();
        for kind in &self.handlers {
            pipeline.push(kind.build());
        }
        pipeline
    }
}
