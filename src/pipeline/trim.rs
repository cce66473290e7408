//! 首尾空白裁剪处理器
//!
//! 匹配"有实际内容、但首尾带空白"的 UTF-8 文本，变换为裁剪后的文本。

use super::{Buffer, ContentHandler, TransformError};

pub const TRIM_HANDLER_NAME: &str = "Trim Handler";

#[derive(Debug, Clone)]
pub struct WhitespaceTrimHandler {
    name: String,
}

impl WhitespaceTrimHandler {
    pub fn new() -> Self {
        Self {
            name: TRIM_HANDLER_NAME.to_string(),
        }
    }
}

impl Default for WhitespaceTrimHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHandler for WhitespaceTrimHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, buffer: &[u8]) -> bool {
        match std::str::from_utf8(buffer) {
            Ok(text) => {
                let trimmed = text.trim();
                !trimmed.is_empty() && trimmed.len() != text.len()
            }
            Err(_) => false,
        }
    }

    fn transform(&self, buffer: &[u8]) -> Result<Buffer, TransformError> {
        let text = std::str::from_utf8(buffer)
            .map_err(|e| TransformError::Encoding(e.to_string()))?;
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TransformError::EmptyOutput);
        }
        Ok(Buffer::copy_from_slice(trimmed.as_bytes()))
    }
}
