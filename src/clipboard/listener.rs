//! # 剪贴板监听模块
//!
//! ## 设计思路
//!
//! 监听器运行在独立 OS 线程中（`clipboard-master` 的事件循环是阻塞的），
//! 每次变化时读取剪贴板文本，经过 `ChangeFilter` 过滤后送入流水线通道。
//!
//! - 应用自身写入（回声）与连续重复内容在这里被丢弃，流水线本身不做去重
//! - 通道已满时阻塞等待，形成背压；接收端关闭时停止监听
//! - 取消令牌触发后通过 `clipboard-master` 的 shutdown 通道结束事件循环
//! - 事件循环意外退出时按指数退避重启
//!
//! ## 实现思路
//!
//! 过滤逻辑（`ChangeFilter::admit`）与平台 I/O 分离，便于单元测试。

use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use clipboard_master::{CallbackResult, ClipboardHandler, Master};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

use super::EchoFilter;
use crate::pipeline::Buffer;

const POLL_INTERVAL_MIN_MS: u64 = 20;
const POLL_INTERVAL_MAX_MS: u64 = 5_000;
const MONITOR_RESTART_BASE_DELAY_MS: u64 = 100;
const MONITOR_RESTART_MAX_DELAY_MS: u64 = 5_000;

pub(crate) fn normalize_poll_interval_ms(value_ms: u64) -> u64 {
    value_ms.clamp(POLL_INTERVAL_MIN_MS, POLL_INTERVAL_MAX_MS)
}

fn compute_restart_backoff_ms(restart_attempt: u32) -> u64 {
    let exp = 1_u64 << restart_attempt.saturating_sub(1).min(6);
    MONITOR_RESTART_BASE_DELAY_MS
        .saturating_mul(exp)
        .min(MONITOR_RESTART_MAX_DELAY_MS)
}

// ============================================================================
// 变化过滤
// ============================================================================

/// 对一次剪贴板变化的处理决定。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// 送入流水线。
    Forward(Buffer),
    /// 应用自身写入引起的变化。
    Echo,
    /// 与上一次看到的内容相同。
    Duplicate,
    /// 空内容。
    Empty,
}

/// 监听线程内的变化过滤器：回声抑制 + 连续重复抑制。
#[derive(Debug)]
pub struct ChangeFilter {
    echo: EchoFilter,
    last_seen: Option<Buffer>,
}

impl ChangeFilter {
    pub fn new(echo: EchoFilter) -> Self {
        Self {
            echo,
            last_seen: None,
        }
    }

    pub fn admit(&mut self, content: Buffer) -> Admission {
        if content.is_empty() {
            return Admission::Empty;
        }

        if self.echo.consume(&content) {
            self.last_seen = Some(content);
            return Admission::Echo;
        }

        if self.last_seen.as_ref() == Some(&content) {
            return Admission::Duplicate;
        }

        self.last_seen = Some(content.clone());
        Admission::Forward(content)
    }
}

// ============================================================================
// clipboard-master 回调
// ============================================================================

/// 剪贴板事件处理器（内部实现）
struct Handler {
    reader: Option<arboard::Clipboard>,
    filter: ChangeFilter,
    sender: mpsc::Sender<Buffer>,
    cancel: CancellationToken,
    poll_interval: Duration,
}

impl Handler {
    fn read_text(&mut self) -> Result<Option<Buffer>, arboard::Error> {
        if self.reader.is_none() {
            self.reader = Some(arboard::Clipboard::new()?);
        }
        let Some(clipboard) = self.reader.as_mut() else {
            return Ok(None);
        };

        match clipboard.get_text() {
            Ok(text) => Ok(Some(Buffer::from(text))),
            Err(arboard::Error::ContentNotAvailable) => Ok(None),
            Err(err) => {
                self.reader = None;
                Err(err)
            }
        }
    }
}

impl ClipboardHandler for Handler {
    fn on_clipboard_change(&mut self) -> CallbackResult {
        if self.cancel.is_cancelled() {
            return CallbackResult::Stop;
        }

        let content = match self.read_text() {
            Ok(Some(content)) => content,
            Ok(None) => {
                log::trace!("剪贴板变化不含文本，跳过");
                return CallbackResult::Next;
            }
            Err(err) => {
                log::warn!("读取剪贴板文本失败: {}", err);
                return CallbackResult::Next;
            }
        };

        match self.filter.admit(content) {
            Admission::Forward(buffer) => {
                log::debug!("📋 剪贴板文本变化（{} 字节），送入流水线", buffer.len());
                if self.sender.blocking_send(buffer).is_err() {
                    log::info!("📋 流水线已停止接收，结束剪贴板监听");
                    return CallbackResult::Stop;
                }
            }
            Admission::Echo => log::debug!("⏭️  忽略应用主动写入引起的剪贴板变化"),
            Admission::Duplicate => log::trace!("⏭️  剪贴板内容未变化，跳过"),
            Admission::Empty => log::trace!("⏭️  剪贴板文本为空，跳过"),
        }

        CallbackResult::Next
    }

    fn on_clipboard_error(&mut self, error: io::Error) -> CallbackResult {
        log::error!("剪贴板错误：{}", error);
        CallbackResult::Next
    }

    fn sleep_interval(&self) -> Duration {
        self.poll_interval
    }
}

// ============================================================================
// 监听器
// ============================================================================

/// 剪贴板变化订阅：把文本变化以 `Buffer` 流的形式送入通道。
pub struct ClipboardWatcher {
    poll_interval: Duration,
    echo: EchoFilter,
}

impl ClipboardWatcher {
    pub fn new(poll_interval: Duration, echo: EchoFilter) -> Self {
        let poll_ms = u64::try_from(poll_interval.as_millis()).unwrap_or(POLL_INTERVAL_MAX_MS);
        Self {
            poll_interval: Duration::from_millis(normalize_poll_interval_ms(poll_ms)),
            echo,
        }
    }

    /// 在后台线程启动监听。
    ///
    /// 必须在 tokio 运行时内调用：取消令牌与 shutdown 通道之间的桥接任务
    /// 运行在当前运行时上。
    pub fn spawn(
        self,
        sender: mpsc::Sender<Buffer>,
        cancel: CancellationToken,
    ) -> io::Result<JoinHandle<()>> {
        let runtime = Handle::current();

        thread::Builder::new()
            .name("clipboard-watcher".to_string())
            .spawn(move || self.run(runtime, sender, cancel))
    }

    fn run(self, runtime: Handle, sender: mpsc::Sender<Buffer>, cancel: CancellationToken) {
        let mut restart_attempt: u32 = 0;

        loop {
            if cancel.is_cancelled() || sender.is_closed() {
                break;
            }

            let handler = Handler {
                reader: None,
                filter: ChangeFilter::new(self.echo.clone()),
                sender: sender.clone(),
                cancel: cancel.clone(),
                poll_interval: self.poll_interval,
            };

            match Master::new(handler) {
                Ok(mut master) => {
                    restart_attempt = 0;
                    let shutdown = master.shutdown_channel();
                    let (done_tx, done_rx) = oneshot::channel::<()>();
                    let bridge_cancel = cancel.clone();
                    runtime.spawn(async move {
                        tokio::select! {
                            _ = bridge_cancel.cancelled() => shutdown.signal(),
                            _ = done_rx => {}
                        }
                    });

                    log::info!("📋 剪贴板监听已启动（轮询间隔 {}ms）", self.poll_interval.as_millis());
                    let result = master.run();
                    let _ = done_tx.send(());

                    if cancel.is_cancelled() || sender.is_closed() {
                        break;
                    }
                    match result {
                        Ok(()) => log::warn!("📋 剪贴板监听已退出，将尝试重启"),
                        Err(err) => log::error!("📋 剪贴板监听异常退出: {}", err),
                    }
                }
                Err(err) => {
                    log::error!("📋 创建剪贴板监听失败: {}", err);
                }
            }

            restart_attempt = restart_attempt.saturating_add(1);
            let backoff_ms = compute_restart_backoff_ms(restart_attempt);
            log::warn!("📋 剪贴板监听 {}ms 后重试（attempt={}）", backoff_ms, restart_attempt);

            let wait_cancel = cancel.clone();
            runtime.block_on(async move {
                tokio::select! {
                    _ = wait_cancel.cancelled() => {}
                    _ = tokio::time::sleep(Duration::from_millis(backoff_ms)) => {}
                }
            });
        }

        log::info!("📋 剪贴板监听已停止");
    }
}
