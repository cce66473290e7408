//! # 服务编排模块
//!
//! ## 设计思路
//!
//! 把"监听 → 流水线 → 输出"拆成相互独立的执行上下文，通过有界通道交接：
//!
//! ```text
//! 监听线程 ──(input, cap=N)──▶ runner 任务 ──(output, cap=N)──▶ sink 任务
//! ```
//!
//! - runner 串行消费输入，保证输出顺序与剪贴板事件顺序一致
//! - 通道满时发送方等待（背压），不会无限排队
//! - sink 任务是唯一的剪贴板写入者，写入天然串行
//!
//! ## 取消语义
//!
//! 取消令牌触发后 runner 不再接收新的输入；已接收的内容会完整走完流水线。
//! runner 退出时丢弃输出发送端，sink 任务处理完剩余内容后自然结束。

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;
use crate::pipeline::{Buffer, Pipeline};
use crate::sink::ContentSink;

/// 流水线服务的构建器。
pub struct FormatterService {
    pipeline: Arc<Pipeline>,
    sinks: Vec<Arc<dyn ContentSink>>,
    channel_capacity: usize,
}

impl FormatterService {
    pub fn new(pipeline: Pipeline, channel_capacity: usize) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            sinks: Vec::new(),
            channel_capacity: channel_capacity.max(1),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ContentSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// 启动 runner 与 sink 任务，返回输入端与任务句柄。
    pub fn start(self, cancel: CancellationToken) -> (mpsc::Sender<Buffer>, ServiceHandle) {
        let (input_tx, input_rx) = mpsc::channel(self.channel_capacity);
        let (output_tx, output_rx) = mpsc::channel(self.channel_capacity);

        log::info!(
            "🚀 流水线服务启动 - handlers={:?} sinks={:?} capacity={}",
            self.pipeline.handler_names(),
            self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>(),
            self.channel_capacity
        );

        let runner = tokio::spawn(run_pipeline(self.pipeline, input_rx, output_tx, cancel));
        let sink = tokio::spawn(run_sinks(output_rx, self.sinks));

        (input_tx, ServiceHandle { runner, sink })
    }
}

/// 后台任务句柄。
pub struct ServiceHandle {
    runner: JoinHandle<()>,
    sink: JoinHandle<()>,
}

impl ServiceHandle {
    /// 等待 runner 与 sink 全部结束。
    pub async fn join(self) -> Result<(), AppError> {
        self.runner
            .await
            .map_err(|e| AppError::Task(format!("runner: {}", e)))?;
        self.sink
            .await
            .map_err(|e| AppError::Task(format!("sink: {}", e)))?;
        log::info!("🛑 流水线服务已停止");
        Ok(())
    }
}

/// 串行消费输入并把非空产物转发给输出通道。
pub async fn run_pipeline(
    pipeline: Arc<Pipeline>,
    mut input: mpsc::Receiver<Buffer>,
    output: mpsc::Sender<Buffer>,
    cancel: CancellationToken,
) {
    loop {
        let buffer = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                log::info!("🛑 已取消，流水线停止接收新内容");
                break;
            }
            next = input.recv() => match next {
                Some(buffer) => buffer,
                None => break,
            },
        };

        if let Err(err) = pipeline.forward(&buffer, &output).await {
            log::error!("❌ 流水线输出失败，停止处理: {}", err);
            break;
        }
    }
}

/// 把每份内容依次交给所有 sink；单个 sink 失败只记录日志。
pub async fn run_sinks(mut output: mpsc::Receiver<Buffer>, sinks: Vec<Arc<dyn ContentSink>>) {
    let sinks: Arc<[Arc<dyn ContentSink>]> = sinks.into();

    while let Some(content) = output.recv().await {
        let sinks = Arc::clone(&sinks);
        let delivered = tokio::task::spawn_blocking(move || {
            for sink in sinks.iter() {
                if let Err(err) = sink.deliver(&content) {
                    log::error!("❌ 输出到 {} 失败: {}", sink.name(), err);
                }
            }
        })
        .await;

        if let Err(err) = delivered {
            log::error!("❌ 输出线程执行失败: {}", err);
        }
    }
}
