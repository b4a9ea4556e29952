//! 工具模块

pub mod request_logger;

pub use request_logger::RequestLogger;

/// API 密钥脱敏
///
/// 不超过 8 个字符时全部替换为 `*`，否则保留首尾各 4 个字符
pub fn mask_api_key(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 8 {
        "*".repeat(chars.len())
    } else {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    }
}

/// 按字符截断字符串，超出部分以 `...` 结尾
pub fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &s[..idx]),
        None => s.to_string(),
    }
}
