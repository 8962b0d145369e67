//! 产品代码列表加载
//!
//! 支持 `.txt`（按行）、`.xlsx` / `.xls`（第一个工作表的 A 列）、
//! `.xml`（所有 `<code>` 元素的文本，兼容旧文件中的 `<kod>`）。

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use regex::Regex;
use tokio::fs;

use crate::error::FileError;
use crate::models::ProductCodeList;

/// 按扩展名选择读取方式
pub async fn load_product_codes(path: &Path) -> Result<ProductCodeList> {
    let extension = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let codes = match extension.as_str() {
        "txt" => read_txt_file(path).await?,
        "xlsx" | "xls" => read_spreadsheet(path).await?,
        "xml" => read_xml_file(path).await?,
        _ => {
            return Err(FileError::UnsupportedFormat {
                extension: format!(".{}", extension),
            }
            .into())
        }
    };

    tracing::info!(
        "从 {} 读取到 {} 个产品代码",
        path.file_name().unwrap_or_default().to_string_lossy(),
        codes.len()
    );
    Ok(codes)
}

pub async fn read_txt_file(path: &Path) -> Result<ProductCodeList> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取文本文件: {}", path.display()))?;
    Ok(ProductCodeList::new(content.lines()))
}

pub async fn read_xml_file(path: &Path) -> Result<ProductCodeList> {
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("无法读取XML文件: {}", path.display()))?;
    Ok(parse_xml_codes(&content))
}

pub async fn read_spreadsheet(path: &Path) -> Result<ProductCodeList> {
    let path = path.to_path_buf();
    // calamine 是同步读取
    tokio::task::spawn_blocking(move || read_spreadsheet_sync(&path))
        .await
        .context("表格读取任务异常退出")?
}

fn read_spreadsheet_sync(path: &Path) -> Result<ProductCodeList> {
    let parse_failed = |message: String| FileError::SpreadsheetParseFailed {
        path: path.display().to_string(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| parse_failed(e.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| parse_failed("没有工作表".to_string()))?
        .map_err(|e| parse_failed(e.to_string()))?;

    // Range 从第一个非空单元格开始，起始列不是 A 时说明 A 列为空
    let first_column = range.start().map(|(_, col)| col).unwrap_or(0);
    if first_column != 0 {
        return Ok(ProductCodeList::default());
    }

    let values = range
        .rows()
        .filter_map(|row| row.first())
        .filter(|cell| !matches!(cell, Data::Empty))
        .map(cell_to_code);
    Ok(ProductCodeList::new(values))
}

/// 数字单元格里的整数代码不带小数点
fn cell_to_code(cell: &Data) -> String {
    match cell {
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        other => other.to_string(),
    }
}

/// 只匹配纯文本（或 CDATA）内容的 `<code>` 元素，含子元素的不算
fn code_element_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)<(?:code|kod)(?:\s[^>]*)?>((?:<!\[CDATA\[.*?\]\]>|[^<])*)</(?:code|kod)\s*>")
            .expect("静态正则表达式")
    })
}

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").expect("静态正则表达式"))
}

/// 按正则提取，不是完整的 XML 解析：不校验文档结构，只处理五个预定义实体
pub fn parse_xml_codes(content: &str) -> ProductCodeList {
    let content = comment_regex().replace_all(content, "");
    let codes = code_element_regex()
        .captures_iter(&content)
        .filter_map(|cap| cap.get(1))
        .map(|m| unescape_xml(m.as_str().trim()));
    ProductCodeList::new(codes)
}

fn unescape_xml(text: &str) -> String {
    let text = text
        .strip_prefix("<![CDATA[")
        .and_then(|t| t.strip_suffix("]]>"))
        .unwrap_or(text);
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xml_codes_in_document_order() {
        let xml = r#"<?xml version="1.0"?>
            <root>
              <item><code> A100 </code></item>
              <item><kod>A200</kod></item>
              <item><code type="x">A&amp;B</code></item>
              <item><code></code></item>
              <item><codes>ignored</codes></item>
            </root>"#;
        assert_eq!(&*parse_xml_codes(xml), &["A100", "A200", "A&B"]);
    }

    #[test]
    fn test_xml_skips_comments_and_nested_elements() {
        let xml = r#"<root>
              <!-- <code>OLD1</code> -->
              <code><![CDATA[C<1>]]></code>
              <code><part>X</part></code>
              <code>C2</code>
            </root>"#;
        assert_eq!(&*parse_xml_codes(xml), &["C<1>", "C2"]);
    }

    #[test]
    fn test_integer_float_cells_lose_decimal_point() {
        assert_eq!(cell_to_code(&Data::Float(12345.0)), "12345");
        assert_eq!(cell_to_code(&Data::String("A-1".to_string())), "A-1");
    }
}
