//! 标注结果渲染
//!
//! 渲染器是纯函数：输入两组标注行，输出一份可下载的文档字节。
//! 与匹配、替换逻辑完全解耦。

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use wordswap_core::{AnnotatedLine, Replacement, Role};

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("原文与替换后行数不一致: {original} / {replaced}")]
    LineCountMismatch { original: usize, replaced: usize },
    #[error("格式化失败: {0}")]
    Format(#[from] std::fmt::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RenderOptions {
    /// 原词高亮颜色
    pub original_color: String,
    /// 替换词高亮颜色
    pub substitute_color: String,
    pub title: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            original_color: "#ffd6d6".to_string(),
            substitute_color: "#d6f5d6".to_string(),
            title: "替换对照".to_string(),
        }
    }
}

/// 输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html,
    Text,
}

impl OutputFormat {
    pub fn renderer(self, options: RenderOptions) -> Box<dyn Renderer> {
        match self {
            OutputFormat::Html => Box::new(HtmlRenderer::new(options)),
            OutputFormat::Text => Box::new(TextRenderer),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(OutputFormat::Html),
            "text" | "txt" => Ok(OutputFormat::Text),
            other => Err(format!("不支持的输出格式: {}", other)),
        }
    }
}

/// 渲染器接口
pub trait Renderer {
    fn render(&self, replacement: &Replacement) -> Result<Vec<u8>, RenderError>;

    /// 输出文件的默认扩展名
    fn extension(&self) -> &'static str;
}

fn check_line_counts(replacement: &Replacement) -> Result<(), RenderError> {
    let original = replacement.original_lines.len();
    let replaced = replacement.replaced_lines.len();
    if original != replaced {
        return Err(RenderError::LineCountMismatch { original, replaced });
    }
    Ok(())
}

/// 双栏 HTML 渲染器
pub struct HtmlRenderer {
    options: RenderOptions,
}

impl HtmlRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    fn write_line(out: &mut String, line: &AnnotatedLine) -> std::fmt::Result {
        for (segment, role) in line.segments() {
            match role {
                Some(Role::Original) => {
                    write!(out, "<mark class=\"original\">{}</mark>", escape_html(segment))?
                }
                Some(Role::Substitute) => {
                    write!(out, "<mark class=\"substitute\">{}</mark>", escape_html(segment))?
                }
                None => out.push_str(&escape_html(segment)),
            }
        }
        Ok(())
    }
}

impl Renderer for HtmlRenderer {
    fn render(&self, replacement: &Replacement) -> Result<Vec<u8>, RenderError> {
        check_line_counts(replacement)?;

        let title = escape_html(&self.options.title);
        let mut out = String::new();
        writeln!(out, "<!DOCTYPE html>")?;
        writeln!(out, "<html><head><meta charset=\"utf-8\"><title>{}</title>", title)?;
        writeln!(
            out,
            "<style>table{{border-collapse:collapse;width:100%}}td{{vertical-align:top;\
             padding:2px 8px;white-space:pre-wrap}}mark.original{{background:{}}}\
             mark.substitute{{background:{}}}</style>",
            escape_html(&self.options.original_color),
            escape_html(&self.options.substitute_color)
        )?;
        writeln!(out, "</head><body>")?;
        writeln!(out, "<h1>{}</h1>", title)?;
        writeln!(out, "<table>")?;
        writeln!(out, "<tr><th>原文</th><th>替换后</th></tr>")?;

        for (original, replaced) in replacement
            .original_lines
            .iter()
            .zip(&replacement.replaced_lines)
        {
            out.push_str("<tr><td>");
            Self::write_line(&mut out, original)?;
            out.push_str("</td><td>");
            Self::write_line(&mut out, replaced)?;
            out.push_str("</td></tr>\n");
        }

        writeln!(out, "</table>")?;
        writeln!(out, "<p>{}</p>", escape_html(&replacement.summary()))?;
        writeln!(out, "</body></html>")?;

        log::debug!("[Render] HTML 输出 {} 字节", out.len());
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

/// 纯文本渲染器
///
/// 先输出原文再输出替换后文本，原词标记为 `[-…-]`，替换词标记为 `{+…+}`。
pub struct TextRenderer;

impl TextRenderer {
    fn write_block(out: &mut String, heading: &str, lines: &[AnnotatedLine]) {
        out.push_str(heading);
        out.push('\n');
        for line in lines {
            for (segment, role) in line.segments() {
                match role {
                    Some(Role::Original) => {
                        out.push_str("[-");
                        out.push_str(segment);
                        out.push_str("-]");
                    }
                    Some(Role::Substitute) => {
                        out.push_str("{+");
                        out.push_str(segment);
                        out.push_str("+}");
                    }
                    None => out.push_str(segment),
                }
            }
            out.push('\n');
        }
    }
}

impl Renderer for TextRenderer {
    fn render(&self, replacement: &Replacement) -> Result<Vec<u8>, RenderError> {
        check_line_counts(replacement)?;

        let mut out = String::new();
        Self::write_block(&mut out, "==== 原文 ====", &replacement.original_lines);
        out.push('\n');
        Self::write_block(&mut out, "==== 替换后 ====", &replacement.replaced_lines);
        out.push('\n');
        out.push_str(&replacement.summary());
        out.push('\n');
        Ok(out.into_bytes())
    }

    fn extension(&self) -> &'static str {
        "txt"
    }
}

fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
