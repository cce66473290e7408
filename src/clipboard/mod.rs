//! 剪贴板管理模块
//!
//! # 设计思路
//!
//! 统一管理剪贴板相关的宿主能力（流水线之外的外部协作者）：
//! - **监控**：`listener` 通过 `clipboard-master` 监听系统剪贴板变化，
//!   读取文本后以 `Buffer` 形式送入流水线
//! - **写回**：`writer` 把美化后的文本写回系统剪贴板（含重试）
//! - **回声抑制 + RAII Guard**：应用自身的写入也会触发一次变化事件，
//!   通过 `EchoFilter` 按内容识别并跳过，避免写回再次进入流水线形成循环
//!
//! # 实现思路
//!
//! - `EchoFilter` 在写入前登记即将写入的内容，监听器读到相同内容时消费该登记。
//! - `IgnoreGuard` 采用 RAII 模式：写入失败时 `Drop` 自动撤销登记，
//!   只有 `commit()` 之后登记才会保留。
//! - 登记队列有上限，避免平台不发出变化事件时无限堆积。

pub mod listener;
pub mod writer;

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::pipeline::Buffer;

pub use listener::{Admission, ChangeFilter, ClipboardWatcher};
pub use writer::{ClipboardWriter, RetryPolicy};

/// 同时等待被消费的写入登记上限
const MAX_PENDING_ECHOES: usize = 8;

// ============================================================================
// EchoFilter — 跨线程共享的回声登记表
// ============================================================================

/// 应用自身写入的内容登记表，由写入端与监听线程共享。
#[derive(Debug, Clone, Default)]
pub struct EchoFilter {
    pending: Arc<Mutex<VecDeque<Buffer>>>,
}

impl EchoFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记即将写入的内容并返回守卫。
    ///
    /// # 示例
    /// ```rust
    /// use clipboard_pretty::clipboard::EchoFilter;
    /// use clipboard_pretty::pipeline::Buffer;
    ///
    /// let filter = EchoFilter::new();
    /// let guard = filter.guard(Buffer::from_static(b"{}"));
    /// // ... 写入剪贴板成功 ...
    /// guard.commit();
    /// assert!(filter.consume(b"{}"));
    /// ```
    pub fn guard(&self, content: Buffer) -> IgnoreGuard {
        self.register(content.clone());
        IgnoreGuard {
            filter: self.clone(),
            content,
            committed: false,
        }
    }

    fn register(&self, content: Buffer) {
        let mut pending = self.lock_pending();
        if pending.len() >= MAX_PENDING_ECHOES {
            pending.pop_front();
        }
        pending.push_back(content);
        log::debug!("🚫 已登记应用写入内容 - 下一次相同内容的剪贴板变化将被忽略");
    }

    /// 若内容与某条登记一致，则消费该登记并返回 `true`。
    pub fn consume(&self, content: &[u8]) -> bool {
        let mut pending = self.lock_pending();
        match pending.iter().position(|p| p[..] == *content) {
            Some(index) => {
                pending.remove(index);
                true
            }
            None => false,
        }
    }

    fn forget(&self, content: &[u8]) {
        let mut pending = self.lock_pending();
        if let Some(index) = pending.iter().rposition(|p| p[..] == *content) {
            pending.remove(index);
        }
    }

    pub fn pending_len(&self) -> usize {
        self.lock_pending().len()
    }

    fn lock_pending(&self) -> MutexGuard<'_, VecDeque<Buffer>> {
        match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                log::warn!("回声登记表锁中毒，继续使用恢复数据");
                poisoned.into_inner()
            }
        }
    }
}

// ============================================================================
// IgnoreGuard — RAII 登记管理
// ============================================================================

/// 一次写入对应的回声登记。
///
/// 未 `commit()` 就被丢弃（写入失败、提前返回、panic）时自动撤销登记。
pub struct IgnoreGuard {
    filter: EchoFilter,
    content: Buffer,
    committed: bool,
}

impl IgnoreGuard {
    /// 写入成功，保留登记等待监听器消费。
    pub fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for IgnoreGuard {
    fn drop(&mut self) {
        if !self.committed {
            self.filter.forget(&self.content);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn committed_guard_is_consumed_once() {
        let filter = EchoFilter::new();
        filter.guard(Buffer::from_static(b"abc")).commit();

        assert!(filter.consume(b"abc"));
        assert!(!filter.consume(b"abc"));
    }

    #[test]
    fn dropped_guard_withdraws_registration() {
        let filter = EchoFilter::new();
        {
            let _guard = filter.guard(Buffer::from_static(b"abc"));
            assert_eq!(filter.pending_len(), 1);
        }
        assert_eq!(filter.pending_len(), 0);
        assert!(!filter.consume(b"abc"));
    }

    #[test]
    fn pending_registrations_are_bounded() {
        let filter = EchoFilter::new();
        for i in 0..(MAX_PENDING_ECHOES + 3) {
            filter.guard(Buffer::from(i.to_string())).commit();
        }

        assert_eq!(filter.pending_len(), MAX_PENDING_ECHOES);
        assert!(!filter.consume(b"0"));
        assert!(filter.consume((MAX_PENDING_ECHOES + 2).to_string().as_bytes()));
    }

    #[test]
    fn clones_share_the_same_table() {
        let writer_side = EchoFilter::new();
        let listener_side = writer_side.clone();
        writer_side.guard(Buffer::from_static(b"{}")).commit();

        assert!(listener_side.consume(b"{}"));
        assert_eq!(writer_side.pending_len(), 0);
    }
}
