//! # 剪贴板 JSON 美化工具 — 库入口
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  clipboard::listener（clipboard-master 监听线程）        │
//! │       │  文本变化 → Buffer（回声 / 重复已过滤）          │
//! │       ↓  有界通道                                        │
//! │  service::run_pipeline（tokio 任务）                     │
//! │       │  pipeline::Pipeline — 第一个匹配的处理器胜出     │
//! │       │    ├─ JsonPrettyHandler  JSON 识别 + 两空格缩进  │
//! │       │    └─ WhitespaceTrimHandler  首尾空白裁剪        │
//! │       ↓  有界通道（仅非空产物）                          │
//! │  service::run_sinks（tokio 任务，串行写入）              │
//! │       ├─ clipboard::ClipboardWriter  写回剪贴板          │
//! │       └─ sink::DisplaySink          镜像到显示界面       │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`error`] | 统一错误类型 `AppError` |
//! | [`pipeline`] | 处理器契约、JSON / 裁剪处理器、有序调度与步骤轨迹 |
//! | [`clipboard`] | 剪贴板监听、写回、回声抑制 `EchoFilter` |
//! | [`sink`] | 下游输出契约与显示界面适配 |
//! | [`service`] | 通道交接、取消、任务编排 |
//! | [`settings`] | JSON 设置文件加载与归一化 |

pub mod error;
pub mod clipboard;
pub mod pipeline;
pub mod service;
pub mod settings;
pub mod sink;
