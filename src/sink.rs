//! 下游输出模块（sink）
//!
//! # 设计思路
//!
//! 流水线的非空产物最终交给一组 `ContentSink`：
//! - `ClipboardWriter`：写回系统剪贴板
//! - `DisplaySink`：镜像到显示界面（"设置显示文本"）
//!
//! 后台上下文只能调用 `ContentSink::deliver`。显示界面若要求在 UI 线程
//! 更新，由 `DisplaySurface` 的实现自行投递到 UI 事件循环，
//! 后台任务从不直接修改界面状态。

use std::sync::Arc;

use crate::clipboard::ClipboardWriter;
use crate::error::AppError;
use crate::pipeline::Buffer;

/// 下游输出端。
pub trait ContentSink: Send + Sync {
    fn name(&self) -> &str;

    /// 交付一份变换后的内容。会在阻塞线程中被调用。
    fn deliver(&self, content: &Buffer) -> Result<(), AppError>;
}

impl ContentSink for ClipboardWriter {
    fn name(&self) -> &str {
        "clipboard"
    }

    fn deliver(&self, content: &Buffer) -> Result<(), AppError> {
        self.write(content)
    }
}

/// 显示界面：只接收"设置显示文本"一种调用。
pub trait DisplaySurface: Send + Sync {
    fn set_text(&self, text: &str);
}

impl<D: DisplaySurface + ?Sized> DisplaySurface for Arc<D> {
    fn set_text(&self, text: &str) {
        (**self).set_text(text);
    }
}

/// 把内容镜像到 `DisplaySurface` 的 sink。
pub struct DisplaySink<D> {
    surface: D,
}

impl<D: DisplaySurface> DisplaySink<D> {
    pub fn new(surface: D) -> Self {
        Self { surface }
    }
}

impl<D: DisplaySurface> ContentSink for DisplaySink<D> {
    fn name(&self) -> &str {
        "display"
    }

    fn deliver(&self, content: &Buffer) -> Result<(), AppError> {
        let text = String::from_utf8_lossy(content);
        self.surface.set_text(&text);
        Ok(())
    }
}

/// 无界面运行时使用的显示面：把内容写入日志。
#[derive(Debug, Default, Clone, Copy)]
pub struct LogDisplay;

impl DisplaySurface for LogDisplay {
    fn set_text(&self, text: &str) {
        log::info!("🖥️ 已美化剪贴板内容（{} 行）:\n{}", text.lines().count(), text);
    }
}
