//! 文档生成器类型定义
//!
//! 源文件单元、声明块、请求/结果以及导航条目

use std::path::{Path, PathBuf};

use crate::llm::ChatMessage;

/// 生成文档所在的子目录
pub const DOCS_SUBDIR: &str = "files";

/// 索引页文件名
pub const INDEX_FILE: &str = "index.md";

/// VitePress 侧边栏配置文件（相对输出目录）
pub const SIDEBAR_FILE: &str = ".vitepress/sidebar.json";

/// 声明类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// 函数声明或定义
    Function,
    /// 结构体定义
    Struct,
}

/// 头文件中的一个声明块
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    pub kind: BlockKind,
    /// 函数名或结构体名
    pub name: String,
    /// 紧邻声明之前的注释
    pub comment: Option<String>,
    /// 声明文本（不含前置注释）
    pub declaration: String,
    /// 在文件中的字节偏移
    pub offset: usize,
}

impl CodeBlock {
    /// 注释与声明合并后的完整文本
    pub fn text(&self) -> String {
        match &self.comment {
            Some(comment) => format!("{}\n{}", comment, self.declaration),
            None => self.declaration.clone(),
        }
    }
}

/// 一个头文件的可文档化内容
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// 完整路径
    pub path: PathBuf,
    /// 相对于输入目录的路径（统一使用 `/`）
    pub relative_path: String,
    /// 按源码顺序排列的声明块
    pub blocks: Vec<CodeBlock>,
}

impl SourceUnit {
    /// 文件名（不含扩展名）
    pub fn stem(&self) -> String {
        Path::new(&self.relative_path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.relative_path.clone())
    }

    /// 代码块的语言标记
    pub fn code_lang(&self) -> &'static str {
        match Path::new(&self.relative_path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("h") | Some("c") => "c",
            _ => "cpp",
        }
    }

    /// 文档相对输出目录的路径
    ///
    /// 例如: net/socket.h -> files/net/socket.md
    pub fn doc_relative_path(&self) -> String {
        doc_relative_path(&self.relative_path)
    }

    /// 所有函数名（源码顺序）
    pub fn function_names(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter(|b| b.kind == BlockKind::Function)
            .map(|b| b.name.clone())
            .collect()
    }
}

/// 源文件相对路径 -> 文档相对路径
pub fn doc_relative_path(relative_source: &str) -> String {
    let with_md = Path::new(relative_source).with_extension("md");
    format!(
        "{}/{}",
        DOCS_SUBDIR,
        with_md.to_string_lossy().replace('\\', "/")
    )
}

/// 发给 LLM 的一次文档请求
#[derive(Debug, Clone)]
pub struct DocRequest<'a> {
    pub unit: &'a SourceUnit,
    pub block: &'a CodeBlock,
    pub messages: Vec<ChatMessage>,
}

/// 一个源文件生成的文档
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocResult {
    /// 文档输出路径
    pub output_path: PathBuf,
    /// markdown 内容
    pub markdown: String,
}

/// 导航条目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavEntry {
    /// 源文件相对路径
    pub source_path: String,
    /// 文档相对输出目录的路径
    pub doc_path: String,
    /// 显示标题
    pub title: String,
    /// 文件中的函数名，用于生成锚点链接
    pub symbols: Vec<String>,
}

impl NavEntry {
    pub fn from_unit(unit: &SourceUnit) -> Self {
        Self {
            source_path: unit.relative_path.clone(),
            doc_path: unit.doc_relative_path(),
            title: unit.stem(),
            symbols: unit.function_names(),
        }
    }

    /// VitePress 站内链接（无扩展名）
    ///
    /// 例如: files/net/socket.md -> /files/net/socket
    pub fn site_link(&self) -> String {
        format!("/{}", self.doc_path.trim_end_matches(".md"))
    }

    /// 构建后 HTML 页面的相对链接
    pub fn html_link(&self) -> String {
        format!("{}.html", self.doc_path.trim_end_matches(".md"))
    }

    /// 源文件所在目录的各级名称
    pub fn dir_components(&self) -> Vec<String> {
        let mut parts: Vec<String> = self.source_path.split('/').map(str::to_string).collect();
        parts.pop();
        parts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(relative_path: &str, blocks: Vec<CodeBlock>) -> SourceUnit {
        SourceUnit {
            path: PathBuf::from("/sdk").join(relative_path),
            relative_path: relative_path.to_string(),
            blocks,
        }
    }

    fn block(kind: BlockKind, name: &str) -> CodeBlock {
        CodeBlock {
            kind,
            name: name.to_string(),
            comment: None,
            declaration: format!("void {}(void);", name),
            offset: 0,
        }
    }

    #[test]
    fn test_doc_relative_path() {
        assert_eq!(doc_relative_path("socket.h"), "files/socket.md");
        assert_eq!(doc_relative_path("net/socket.hpp"), "files/net/socket.md");
        assert_eq!(doc_relative_path("a/b/c.tar.h"), "files/a/b/c.tar.md");
    }

    #[test]
    fn test_code_block_text() {
        let mut b = block(BlockKind::Function, "f");
        assert_eq!(b.text(), "void f(void);");
        b.comment = Some("// does f".to_string());
        assert_eq!(b.text(), "// does f\nvoid f(void);");
    }

    #[test]
    fn test_nav_entry_from_unit() {
        let u = unit(
            "net/socket.h",
            vec![
                block(BlockKind::Function, "sock_open"),
                block(BlockKind::Struct, "sock_addr"),
                block(BlockKind::Function, "sock_close"),
            ],
        );
        let entry = NavEntry::from_unit(&u);
        assert_eq!(entry.title, "socket");
        assert_eq!(entry.doc_path, "files/net/socket.md");
        assert_eq!(entry.symbols, vec!["sock_open", "sock_close"]);
        assert_eq!(entry.site_link(), "/files/net/socket");
        assert_eq!(entry.html_link(), "files/net/socket.html");
        assert_eq!(entry.dir_components(), vec!["net"]);
    }

    #[test]
    fn test_code_lang() {
        assert_eq!(unit("a.h", vec![]).code_lang(), "c");
        assert_eq!(unit("a.HPP", vec![]).code_lang(), "cpp");
    }
}
