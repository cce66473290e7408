//! # JSON 美化处理器
//!
//! ## 设计思路
//!
//! - 识别：输入必须是一个完整、合法的 JSON 值（允许首尾空白）。
//! - 变换：只改空白。两空格缩进，键值之间为 `": "`，
//!   每个键 / 元素独占一行，空容器保持 `{}` / `[]`，首尾空白去掉。
//! - 剪贴板里的数据属于用户：字符串和数字按原字节照抄，重复键、
//!   转义写法（`\/`、`\u00e9`）和数字字面量都不变。
//!
//! ## 实现思路
//!
//! - 识别和变换走同一个扫描器 `Reindenter`，识别时不写输出，
//!   两者对同一输入的结论必然一致。
//! - 扫描器不递归，用显式的容器栈记录嵌套，没有深度上限。
//! - 字符串只校验 JSON 语法（控制字符、转义序列），不解码内容，
//!   所以孤立代理项和非 UTF-8 字节会原样保留。
//! - 美化结果本身仍是合法 JSON，再次美化得到完全相同的字节（幂等）。

use super::{Buffer, ContentHandler, TransformError};

/// 默认处理器名称。
pub const JSON_HANDLER_NAME: &str = "JSON Handler";

const INDENT: &[u8] = b"  ";

/// 将合法 JSON 重新格式化为两空格缩进。
#[derive(Debug, Clone)]
pub struct JsonPrettyHandler {
    name: String,
}

impl JsonPrettyHandler {
    pub fn new() -> Self {
        Self::with_name(JSON_HANDLER_NAME)
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for JsonPrettyHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentHandler for JsonPrettyHandler {
    fn name(&self) -> &str {
        &self.name
    }

    fn matches(&self, buffer: &[u8]) -> bool {
        Reindenter::new(buffer, false).run().is_ok()
    }

    fn transform(&self, buffer: &[u8]) -> Result<Buffer, TransformError> {
        let pretty = Reindenter::new(buffer, true).run()?;
        Ok(Buffer::from(pretty))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

impl Container {
    fn close(self) -> u8 {
        match self {
            Self::Object => b'}',
            Self::Array => b']',
        }
    }
}

/// 单遍扫描：校验语法，`emit` 为真时同时写出重新缩进的结果。
struct Reindenter<'a> {
    input: &'a [u8],
    pos: usize,
    emit: bool,
    out: Vec<u8>,
    stack: Vec<Container>,
}

impl<'a> Reindenter<'a> {
    fn new(input: &'a [u8], emit: bool) -> Self {
        let capacity = if emit { input.len() + input.len() / 2 } else { 0 };
        Self {
            input,
            pos: 0,
            emit,
            out: Vec::with_capacity(capacity),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<u8>, TransformError> {
        'value: loop {
            self.skip_whitespace();
            match self.peek() {
                Some(open @ (b'{' | b'[')) => {
                    let kind = if open == b'{' { Container::Object } else { Container::Array };
                    self.pos += 1;
                    self.skip_whitespace();
                    if self.peek() == Some(kind.close()) {
                        self.pos += 1;
                        self.write(&[open, kind.close()]);
                    } else {
                        self.write(&[open]);
                        self.stack.push(kind);
                        self.newline();
                        if kind == Container::Object {
                            self.key()?;
                        }
                        continue 'value;
                    }
                }
                Some(b'"') => self.string()?,
                Some(b't') => self.literal(b"true")?,
                Some(b'f') => self.literal(b"false")?,
                Some(b'n') => self.literal(b"null")?,
                Some(b'-' | b'0'..=b'9') => self.number()?,
                Some(byte) => return Err(self.error(&format!("意外的字符 0x{:02x}", byte))),
                None => return Err(self.error("缺少 JSON 值")),
            }

            // 一个值结束：处理逗号与闭合括号，直到需要下一个值
            loop {
                self.skip_whitespace();
                let Some(&kind) = self.stack.last() else {
                    break 'value;
                };
                match self.peek() {
                    Some(b',') => {
                        self.pos += 1;
                        self.write(b",");
                        self.newline();
                        if kind == Container::Object {
                            self.key()?;
                        }
                        continue 'value;
                    }
                    Some(close) if close == kind.close() => {
                        self.pos += 1;
                        self.stack.pop();
                        self.newline();
                        self.write(&[close]);
                    }
                    Some(byte) => {
                        return Err(self.error(&format!("容器内意外的字符 0x{:02x}", byte)));
                    }
                    None => return Err(self.error("容器未闭合")),
                }
            }
        }

        self.skip_whitespace();
        if self.pos != self.input.len() {
            return Err(self.error("JSON 值之后存在多余内容"));
        }
        Ok(self.out)
    }

    /// 对象成员的键和冒号。
    fn key(&mut self) -> Result<(), TransformError> {
        self.skip_whitespace();
        if self.peek() != Some(b'"') {
            return Err(self.error("对象键必须是字符串"));
        }
        self.string()?;
        self.skip_whitespace();
        if self.peek() != Some(b':') {
            return Err(self.error("对象键之后缺少冒号"));
        }
        self.pos += 1;
        self.write(b": ");
        Ok(())
    }

    fn string(&mut self) -> Result<(), TransformError> {
        let start = self.pos;
        self.pos += 1;
        loop {
            match self.peek() {
                None => return Err(self.error("字符串未闭合")),
                Some(b'"') => break,
                Some(b'\\') => {
                    self.pos += 1;
                    match self.peek() {
                        Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => {
                            self.pos += 1;
                        }
                        Some(b'u') => {
                            self.pos += 1;
                            for _ in 0..4 {
                                if !self.peek().is_some_and(|b| b.is_ascii_hexdigit()) {
                                    return Err(self.error("\\u 之后需要 4 位十六进制数"));
                                }
                                self.pos += 1;
                            }
                        }
                        _ => return Err(self.error("非法的转义序列")),
                    }
                }
                Some(byte) if byte < 0x20 => {
                    return Err(self.error("字符串中存在未转义的控制字符"));
                }
                Some(_) => self.pos += 1,
            }
        }
        self.pos += 1;
        self.copy_from(start);
        Ok(())
    }

    fn number(&mut self) -> Result<(), TransformError> {
        let start = self.pos;
        if self.peek() == Some(b'-') {
            self.pos += 1;
        }
        match self.peek() {
            Some(b'0') => self.pos += 1,
            Some(b'1'..=b'9') => self.digits(),
            _ => return Err(self.error("数字缺少整数部分")),
        }
        if self.peek() == Some(b'.') {
            self.pos += 1;
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.error("小数点之后缺少数字"));
            }
            self.digits();
        }
        if matches!(self.peek(), Some(b'e' | b'E')) {
            self.pos += 1;
            if matches!(self.peek(), Some(b'+' | b'-')) {
                self.pos += 1;
            }
            if !self.peek().is_some_and(|b| b.is_ascii_digit()) {
                return Err(self.error("指数部分缺少数字"));
            }
            self.digits();
        }
        self.copy_from(start);
        Ok(())
    }

    fn digits(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    fn literal(&mut self, word: &'static [u8]) -> Result<(), TransformError> {
        if !self.input[self.pos..].starts_with(word) {
            return Err(self.error("无法识别的字面量"));
        }
        self.pos += word.len();
        self.write(word);
        Ok(())
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b' ' | b'\t' | b'\n' | b'\r')) {
            self.pos += 1;
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn copy_from(&mut self, start: usize) {
        if self.emit {
            self.out.extend_from_slice(&self.input[start..self.pos]);
        }
    }

    fn write(&mut self, bytes: &[u8]) {
        if self.emit {
            self.out.extend_from_slice(bytes);
        }
    }

    fn newline(&mut self) {
        if self.emit {
            self.out.push(b'\n');
            for _ in 0..self.stack.len() {
                self.out.extend_from_slice(INDENT);
            }
        }
    }

    fn error(&self, reason: &str) -> TransformError {
        TransformError::Malformed(format!("{}（偏移 {}）", reason, self.pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pretty(input: &str) -> String {
        let out = JsonPrettyHandler::new()
            .transform(input.as_bytes())
            .expect("valid json should transform");
        String::from_utf8(out.to_vec()).expect("output is utf-8")
    }

    #[test]
    fn indents_simple_object() {
        assert_eq!(pretty(r#"{"a":1}"#), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn indents_nested_containers() {
        let out = pretty(r#"{"list":[1,{"k":null}],"ok":true}"#);
        let expected = "{\n  \"list\": [\n    1,\n    {\n      \"k\": null\n    }\n  ],\n  \"ok\": true\n}";
        assert_eq!(out, expected);
    }

    #[test]
    fn keeps_empty_containers_compact() {
        assert_eq!(pretty(r#"{"a":[],"b":{}}"#), "{\n  \"a\": [],\n  \"b\": {}\n}");
    }

    #[test]
    fn preserves_key_order() {
        assert_eq!(pretty(r#"{"z":1,"a":2}"#), "{\n  \"z\": 1,\n  \"a\": 2\n}");
    }

    #[test]
    fn preserves_number_literals() {
        assert_eq!(pretty("[1.50,1e3,12345678901234567890123]"), "[\n  1.50,\n  1e3,\n  12345678901234567890123\n]");
    }

    #[test]
    fn accepts_surrounding_whitespace() {
        let handler = JsonPrettyHandler::new();
        assert!(handler.matches(b"  \n{\"a\": 1}\r\n"));
        assert_eq!(pretty("  {\"a\": 1}\n"), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn scalars_are_valid_json() {
        let handler = JsonPrettyHandler::new();
        assert!(handler.matches(b"42"));
        assert!(handler.matches(b"\"text\""));
        assert!(handler.matches(b"null"));
    }

    #[test]
    fn rejects_non_json() {
        let handler = JsonPrettyHandler::new();
        assert!(!handler.matches(b"hello world"));
        assert!(!handler.matches(b""));
        assert!(!handler.matches(b"{\"a\":"));
        assert!(!handler.matches(b"{\"a\":1} trailing"));
        assert!(!handler.matches(b"{'a': 1}"));
    }

    #[test]
    fn transform_fails_without_panicking() {
        let handler = JsonPrettyHandler::new();
        for input in [&b""[..], b"{\"a\":", b"\xff\xfe\x00", b"[1,]"] {
            assert!(matches!(
                handler.transform(input),
                Err(TransformError::Malformed(_))
            ));
        }
    }

    #[test]
    fn duplicate_keys_are_kept() {
        assert_eq!(pretty(r#"{"a":1,"a":2}"#), "{\n  \"a\": 1,\n  \"a\": 2\n}");
    }

    #[test]
    fn string_escapes_are_copied_verbatim() {
        assert_eq!(
            pretty(r#"{"s":"\u00e9 <\/b>","t":"tab\tquote\""}"#),
            "{\n  \"s\": \"\\u00e9 <\\/b>\",\n  \"t\": \"tab\\tquote\\\"\"\n}"
        );
    }

    #[test]
    fn whitespace_inside_empty_containers_is_dropped() {
        assert_eq!(pretty("[ { } , [\n] ]"), "[\n  {},\n  []\n]");
    }

    #[test]
    fn deep_nesting_has_no_depth_limit() {
        let depth = 200;
        let input = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
        let handler = JsonPrettyHandler::new();

        assert!(handler.matches(input.as_bytes()));
        let out = handler.transform(input.as_bytes()).expect("deep nesting transforms");
        let lines: Vec<&str> = std::str::from_utf8(&out).expect("utf-8").lines().collect();
        assert_eq!(lines.len(), 2 * depth - 1);
        assert_eq!(lines[depth - 1], format!("{}[]", "  ".repeat(depth - 1)));
    }

    #[test]
    fn lone_surrogate_escape_is_accepted() {
        let handler = JsonPrettyHandler::new();
        assert!(handler.matches(br#""\ud800""#));
        assert_eq!(pretty(r#"  "\ud800"  "#), r#""\ud800""#);
    }

    #[test]
    fn invalid_utf8_inside_string_is_copied() {
        let handler = JsonPrettyHandler::new();
        let input = b"[\"\xff\"]";

        assert!(handler.matches(input));
        let out = handler.transform(input).expect("string bytes are not decoded");
        assert_eq!(&out[..], b"[\n  \"\xff\"\n]");
    }

    #[test]
    fn rejects_bad_tokens() {
        let handler = JsonPrettyHandler::new();
        for input in [
            &b"[01]"[..],
            b"[1.]",
            b"[1e]",
            b"[-]",
            b"\"\\x\"",
            b"\"\\u12\"",
            b"\"a\nb\"",
            b"{\"a\" 1}",
            b"{1:2}",
            b"[1}",
            b"tru",
            b"[1] [2]",
        ] {
            assert!(!handler.matches(input), "{:?}", String::from_utf8_lossy(input));
            assert!(handler.transform(input).is_err());
        }
    }

    #[test]
    fn custom_name_is_reported() {
        assert_eq!(JsonPrettyHandler::with_name("json").name(), "json");
        assert_eq!(JsonPrettyHandler::default().name(), JSON_HANDLER_NAME);
    }
}
