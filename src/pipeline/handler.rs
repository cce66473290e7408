use super::{Buffer, TransformError};

/// 一条"格式识别 + 变换"规则。
///
/// 实现必须是无状态的（或只在构造时配置），这样同一个 `Pipeline`
/// 才能被多个调用方并发地 `run`。
///
/// # 约定
///
/// - `matches` 是纯谓词，不修改输入，不产生副作用。
/// - `transform` 只会在同一输入上的 `matches` 返回 `true` 之后被调用，
///   但它依然必须对任意字节序列安全：失败时返回 `Err`，绝不 panic。
pub trait ContentHandler: Send + Sync {
    /// 处理器名称，用于步骤日志。
    fn name(&self) -> &str;

    /// 判断输入是否为本处理器理解的格式。
    fn matches(&self, buffer: &[u8]) -> bool;

    /// 生成变换后的内容。
    fn transform(&self, buffer: &[u8]) -> Result<Buffer, TransformError>;
}
