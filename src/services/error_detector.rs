//! 错误页识别 - 业务能力层
//!
//! 目标服务器出错时仍返回 HTTP 200，只在页面正文中嵌入错误信息，
//! 所以只能按关键词判断。措辞变化会造成漏判，这是已知限制。

/// "给定页面文本，判断是否为失败页"的能力
pub trait FailureDetector: Send + Sync {
    /// `page_text` 已经转换为小写
    fn is_failure(&self, page_text: &str) -> bool;
}

/// 关键词匹配：任一关键词是页面文本的子串即判定为失败
#[derive(Debug, Clone)]
pub struct KeywordDetector {
    phrases: Vec<String>,
}

impl KeywordDetector {
    pub fn new<I, S>(phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            phrases: phrases
                .into_iter()
                .map(|p| p.into().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn phrases(&self) -> &[String] {
        &self.phrases
    }
}

impl FailureDetector for KeywordDetector {
    fn is_failure(&self, page_text: &str) -> bool {
        self.phrases.iter().any(|phrase| page_text.contains(phrase.as_str()))
    }
}
