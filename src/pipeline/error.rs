//! 处理器级错误
//!
//! 这些错误永远不会越过 `Pipeline` 边界：runner 会把它们降级为
//! `Outcome::TransformFailed`，调用方只会看到"有输出"或"无输出"。

/// 单个处理器变换失败的原因。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// 输入无法按处理器声明的格式解析
    #[error("输入格式错误：{0}")]
    Malformed(String),

    /// 重新序列化或文本编码失败
    #[error("编码错误：{0}")]
    Encoding(String),

    /// 变换成功但产物为空，空内容不允许写回剪贴板
    #[error("变换结果为空")]
    EmptyOutput,
}
