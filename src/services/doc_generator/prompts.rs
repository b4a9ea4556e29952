//! LLM Prompt 模板
//!
//! 每个声明块发送两条 user 消息：第一条是整理要求，第二条是声明源码

use super::types::{BlockKind, CodeBlock, DocRequest, SourceUnit};
use crate::llm::ChatMessage;

/// SDK 声明整理要求
pub const SDK_DOC_PROMPT: &str = r#"请把我接下来发送的 C/C++ SDK 声明整理成{language} markdown 文档。

输出格式要求：
1. 标题使用 `## 名称 {#名称}`，名称为函数名或结构体名
2. 用 markdown 代码块给出完整定义
3. 描述：把注释中的说明翻译为{language}；没有注释时根据定义简要说明用途
4. 参数（函数）或字段（结构体）：用 markdown 表格列出名称、类型、说明
5. 返回值（仅函数）：详细说明各种情况下的返回值

只输出文档内容，不要添加开场白或总结。"#;

/// 声明消息模板
pub const DECLARATION_MESSAGE: &str = r#"{kind} `{name}`（来自 `{file_path}`）：

```{lang}
{code}
```"#;

/// 格式化整理要求
pub fn format_sdk_doc_prompt(language: &str) -> String {
    SDK_DOC_PROMPT.replace("{language}", language)
}

/// 格式化声明消息
pub fn format_declaration_message(unit: &SourceUnit, block: &CodeBlock) -> String {
    let kind = match block.kind {
        BlockKind::Function => "函数",
        BlockKind::Struct => "结构体",
    };

    DECLARATION_MESSAGE
        .replace("{kind}", kind)
        .replace("{name}", &block.name)
        .replace("{file_path}", &unit.relative_path)
        .replace("{lang}", unit.code_lang())
        .replace("{code}", &block.text())
}

/// 为一个声明块构建请求
pub fn build_doc_request<'a>(
    unit: &'a SourceUnit,
    block: &'a CodeBlock,
    language: &str,
) -> DocRequest<'a> {
    DocRequest {
        unit,
        block,
        messages: vec![
            ChatMessage::user(format_sdk_doc_prompt(language)),
            ChatMessage::user(format_declaration_message(unit, block)),
        ],
    }
}
