//! 索引页与 VitePress 侧边栏
//!
//! 输入相同的导航条目集合时，输出逐字节一致

use serde::Serialize;
use std::path::Path;

use super::types::NavEntry;

/// VitePress 侧边栏条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SidebarItem {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collapsed: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<SidebarItem>,
}

impl SidebarItem {
    fn group(text: &str) -> Self {
        Self {
            text: text.to_string(),
            link: None,
            collapsed: Some(false),
            items: Vec::new(),
        }
    }

    fn leaf(entry: &NavEntry) -> Self {
        Self {
            text: entry.title.clone(),
            link: Some(entry.site_link()),
            collapsed: None,
            items: Vec::new(),
        }
    }
}

/// 按路径逐级排序（`net/a.h` 排在 `net_x.h` 之前）
pub fn sort_entries(entries: &mut [NavEntry]) {
    entries.sort_by(|a, b| Path::new(&a.source_path).cmp(Path::new(&b.source_path)));
}

/// 生成 index.md
///
/// 每个文件一个二级标题，下面列出函数的锚点链接
pub fn render_index_markdown(entries: &[NavEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(&format!("## {}\n", entry.title));
        let link = entry.html_link();
        for symbol in &entry.symbols {
            out.push_str(&format!("- [{}]({}#{})\n", symbol, link, symbol));
        }
        out.push('\n');
    }
    out
}

/// 构建层级侧边栏，每个目录一个分组
///
/// 条目需已排序
pub fn build_sidebar(entries: &[NavEntry]) -> Vec<SidebarItem> {
    let mut root: Vec<SidebarItem> = Vec::new();

    for entry in entries {
        let mut level = &mut root;
        for dir in entry.dir_components() {
            let pos = match level
                .iter()
                .position(|item| item.link.is_none() && item.text == dir)
            {
                Some(pos) => pos,
                None => {
                    level.push(SidebarItem::group(&dir));
                    level.len() - 1
                }
            };
            level = &mut level[pos].items;
        }
        level.push(SidebarItem::leaf(entry));
    }

    root
}

/// 侧边栏 JSON
pub fn render_sidebar(entries: &[NavEntry]) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(&build_sidebar(entries))?;
    json.push('\n');
    Ok(json)
}
