//! # 剪贴板写入模块
//!
//! ## 设计思路
//!
//! 将写回系统剪贴板的逻辑独立出来，便于隔离平台不稳定因素
//! （其他应用持有剪贴板时写入会短暂失败）。
//!
//! ## 实现思路
//!
//! - 长期持有一个 `arboard::Clipboard`：Linux 上剪贴板内容由该实例的
//!   后台线程提供，过早释放会让写入的内容消失。
//! - 写入前通过 `EchoFilter` 登记内容，成功后 `commit`，失败时守卫自动撤销。
//! - 失败后丢弃实例重新连接，并按指数退避有限重试。
//! - 本模块是同步阻塞的，调用方负责放到阻塞线程中执行。

use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::Duration;

use super::EchoFilter;
use crate::error::AppError;
use crate::pipeline::Buffer;

const RETRY_DELAY_MAX_MS: u64 = 5_000;

/// 写入重试策略。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 最大尝试次数（至少 1 次）。
    pub attempts: u32,
    /// 首次重试前的等待（毫秒），之后每次翻倍。
    pub base_delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay_ms: 100,
        }
    }
}

impl RetryPolicy {
    /// 第 `attempt` 次失败后的等待时间（`attempt` 从 1 开始）。
    pub(crate) fn delay_after(&self, attempt: u32) -> Duration {
        let exp = 1_u64 << attempt.saturating_sub(1).min(8);
        let delay = self
            .base_delay_ms
            .max(1)
            .saturating_mul(exp)
            .min(RETRY_DELAY_MAX_MS.max(self.base_delay_ms));
        Duration::from_millis(delay)
    }
}

/// 系统剪贴板写入器。
pub struct ClipboardWriter {
    clipboard: Mutex<Option<arboard::Clipboard>>,
    echo: EchoFilter,
    retry: RetryPolicy,
}

impl ClipboardWriter {
    pub fn new(echo: EchoFilter, retry: RetryPolicy) -> Self {
        Self {
            clipboard: Mutex::new(None),
            echo,
            retry,
        }
    }

    /// 将文本写入系统剪贴板（含重试）。
    pub fn write(&self, content: &Buffer) -> Result<(), AppError> {
        let text = std::str::from_utf8(content)
            .map_err(|e| AppError::Clipboard(format!("写入内容不是合法 UTF-8: {}", e)))?;

        let guard = self.echo.guard(content.clone());
        let attempts = self.retry.attempts.max(1);
        let mut last_error = None;

        for attempt in 1..=attempts {
            match self.try_write(text) {
                Ok(()) => {
                    guard.commit();
                    if attempt > 1 {
                        log::info!("📋 剪贴板写入在第 {} 次尝试成功", attempt);
                    }
                    return Ok(());
                }
                Err(err) => {
                    log::warn!("📋 剪贴板写入失败（attempt={}/{}）: {}", attempt, attempts, err);
                    last_error = Some(err);
                    if attempt < attempts {
                        thread::sleep(self.retry.delay_after(attempt));
                    }
                }
            }
        }

        Err(AppError::Clipboard(format!(
            "重试 {} 次后仍失败: {}",
            attempts,
            last_error.map(|e| e.to_string()).unwrap_or_default()
        )))
    }

    fn try_write(&self, text: &str) -> Result<(), arboard::Error> {
        let mut slot = self.lock_clipboard();
        if slot.is_none() {
            *slot = Some(arboard::Clipboard::new()?);
        }
        let Some(clipboard) = slot.as_mut() else {
            return Err(arboard::Error::ClipboardNotSupported);
        };

        let result = clipboard.set_text(text);
        if result.is_err() {
            // 下次重试重新建立连接
            *slot = None;
        }
        result
    }

    fn lock_clipboard(&self) -> MutexGuard<'_, Option<arboard::Clipboard>> {
        match self.clipboard.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("剪贴板写入锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_delay_doubles_then_caps() {
        let policy = RetryPolicy {
            attempts: 10,
            base_delay_ms: 100,
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(100));
        assert_eq!(policy.delay_after(2), Duration::from_millis(200));
        assert_eq!(policy.delay_after(3), Duration::from_millis(400));
        assert_eq!(policy.delay_after(9), Duration::from_millis(5_000));
    }

    #[test]
    fn non_utf8_content_is_rejected_before_touching_clipboard() {
        let echo = EchoFilter::new();
        let writer = ClipboardWriter::new(echo.clone(), RetryPolicy::default());

        let result = writer.write(&Buffer::from_static(b"\xff\xfe"));

        assert!(matches!(result, Err(AppError::Clipboard(_))));
        assert_eq!(echo.pending_len(), 0);
    }

    #[test]
    #[ignore = "requires system clipboard access"]
    fn write_registers_echo_on_success() {
        let echo = EchoFilter::new();
        let writer = ClipboardWriter::new(echo.clone(), RetryPolicy::default());

        writer
            .write(&Buffer::from_static(b"{\n  \"a\": 1\n}"))
            .expect("clipboard write should succeed");

        assert!(echo.consume(b"{\n  \"a\": 1\n}"));
    }
}
