//! 声明提取
//!
//! 用正则从 C/C++ 头文件中提取函数声明/定义和结构体定义，连同紧邻其前的注释

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use super::types::{BlockKind, CodeBlock};

/// 连续的 `//` 行注释或 `/* */` 块注释
const LEADING_COMMENTS: &str =
    r"(?P<comments>(?:[ \t]*//[^\n]*\n|[ \t]*/\*[^*]*\*+(?:[^/*][^*]*\*+)*/[ \t]*\n)*)";

/// 花括号体，允许一层嵌套
const BRACE_BODY: &str = r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}";

static RE_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{}(?P<return_type>[\w\*\s]+?)\s+(?P<name>\w+)\s*\((?P<params>[^)]*)\)\s*(?P<body>{}|;)",
        LEADING_COMMENTS, BRACE_BODY
    ))
    .expect("function pattern is valid")
});

static RE_STRUCT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"{}struct\s+(?P<name>\w+)\s*(?P<body>{})\s*;",
        LEADING_COMMENTS, BRACE_BODY
    ))
    .expect("struct pattern is valid")
});

/// 不会是函数名的关键字
const NON_FUNCTION_NAMES: &[&str] = &[
    "if",
    "else",
    "for",
    "while",
    "do",
    "switch",
    "case",
    "return",
    "sizeof",
    "alignof",
    "typeof",
    "decltype",
    "defined",
    "static_assert",
    "__attribute__",
    "__declspec",
];

/// 提取文件中的全部声明块，按源码顺序返回
pub fn extract_blocks(content: &str) -> Vec<CodeBlock> {
    // 统一换行，保证注释模式里的 `\n` 能匹配 CRLF 文件
    let content = content.replace("\r\n", "\n");
    let mut blocks = Vec::new();

    for caps in RE_FUNCTION.captures_iter(&content) {
        let return_type = caps.name("return_type").map_or("", |m| m.as_str()).trim();
        let name = &caps["name"];
        if return_type.is_empty() || NON_FUNCTION_NAMES.contains(&name) {
            continue;
        }
        if let Some(block) = to_block(&caps, BlockKind::Function) {
            blocks.push(block);
        }
    }

    for caps in RE_STRUCT.captures_iter(&content) {
        if let Some(block) = to_block(&caps, BlockKind::Struct) {
            blocks.push(block);
        }
    }

    blocks.sort_by_key(|b| b.offset);
    blocks
}

fn to_block(caps: &Captures<'_>, kind: BlockKind) -> Option<CodeBlock> {
    let whole = caps.get(0)?;
    let comments = caps.name("comments").map_or("", |m| m.as_str());
    let declaration = trim_blank_lines(&whole.as_str()[comments.len()..]);
    if declaration.is_empty() {
        return None;
    }

    let comment = trim_blank_lines(comments);
    let offset = whole.start() + comments.len() + leading_blank_len(&whole.as_str()[comments.len()..]);

    Some(CodeBlock {
        kind,
        name: caps["name"].to_string(),
        comment: if comment.is_empty() { None } else { Some(comment) },
        declaration,
        offset,
    })
}

/// 去掉首尾的空行，保留行内缩进
fn trim_blank_lines(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();
    let start = lines.iter().position(|l| !l.trim().is_empty());
    let end = lines.iter().rposition(|l| !l.trim().is_empty());

    match (start, end) {
        (Some(start), Some(end)) => lines[start..=end].join("\n"),
        _ => String::new(),
    }
}

/// 开头空白的字节数
fn leading_blank_len(text: &str) -> usize {
    text.len() - text.trim_start().len()
}
