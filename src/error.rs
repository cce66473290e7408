//! 统一错误类型模块
//!
//! # 设计思路
//!
//! 定义全局统一的 `AppError` 枚举，覆盖剪贴板读写、设置加载、监听线程与
//! 通道交接等宿主层失败。
//!
//! 内容处理器（handler）的失败不属于此类：它们以 `TransformError` 表示，
//! 在流水线边界被吸收为 `Outcome::TransformFailed`，永远不会上抛到这里。
//!
//! # 实现思路
//!
//! - 使用 `thiserror` 派生可读错误消息。
//! - 为 `std::io::Error` 与 `serde_json::Error` 提供 `From` 转换，无需手动 map。

/// 应用级统一错误类型
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// 剪贴板读写操作失败
    #[error("剪贴板操作失败: {0}")]
    Clipboard(String),

    /// 文件系统 I/O 错误
    #[error("文件系统错误: {0}")]
    Io(#[from] std::io::Error),

    /// 设置文件无法解析或取值非法
    #[error("设置错误: {0}")]
    Settings(String),

    /// 设置文件 JSON 解析失败
    #[error("设置解析失败: {0}")]
    SettingsJson(#[from] serde_json::Error),

    /// 剪贴板监听器创建或运行失败
    #[error("剪贴板监听失败: {0}")]
    Monitor(String),

    /// 下游通道已关闭（接收端退出）
    #[error("通道已关闭: {0}")]
    ChannelClosed(&'static str),

    /// 后台任务异常退出
    #[error("后台任务失败: {0}")]
    Task(String),
}
