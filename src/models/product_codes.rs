use std::ops::Deref;

/// 产品代码列表
///
/// 保持输入顺序；每项已去除首尾空白且非空；不去重，重复的代码各自独立处理。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductCodeList(Vec<String>);

impl ProductCodeList {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(
            codes
                .into_iter()
                .map(|c| c.as_ref().trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
        )
    }
}

impl Deref for ProductCodeList {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
