//! 扩展选项
//!
//! Inkscape 通过扩展参数机制传入五个选项。解析层只做类型转换，
//! `version` 与 `ec` 保留原始文本，由符号生成阶段决定是否采用。

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 默认模块尺寸
pub const DEFAULT_SIZE: u32 = 8;

/// 默认留白（模块尺寸单位）
pub const DEFAULT_PADDING: i64 = 4;

/// 默认纠错等级字母
pub const DEFAULT_EC: &str = "M";

/// 纠错等级
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCorrection {
    /// 约 7% 容错
    L,
    /// 约 15% 容错
    M,
    /// 约 25% 容错
    Q,
    /// 约 30% 容错
    H,
}

impl ErrorCorrection {
    /// 按字母查表，只接受 `L`、`M`、`Q`、`H`
    pub fn from_letter(letter: &str) -> Option<Self> {
        match letter {
            "L" => Some(Self::L),
            "M" => Some(Self::M),
            "Q" => Some(Self::Q),
            "H" => Some(Self::H),
            _ => None,
        }
    }

    pub fn letter(&self) -> &'static str {
        match self {
            Self::L => "L",
            Self::M => "M",
            Self::Q => "Q",
            Self::H => "H",
        }
    }
}

impl fmt::Display for ErrorCorrection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.letter())
    }
}

/// 无法识别的纠错等级字母
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error correction level: {0:?}")]
pub struct UnknownErrorCorrection(pub String);

impl FromStr for ErrorCorrection {
    type Err = UnknownErrorCorrection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_letter(s).ok_or_else(|| UnknownErrorCorrection(s.to_string()))
    }
}

/// 二维码渲染选项
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrOptions {
    /// 要编码的文本
    pub content: String,

    /// 模块尺寸（像素）
    pub size: u32,

    /// 背景留白，以模块尺寸为单位
    pub padding: i64,

    /// 符号版本的原始文本，空串表示自动选择
    pub version: String,

    /// 纠错等级字母的原始文本
    pub ec: String,
}

impl Default for QrOptions {
    fn default() -> Self {
        Self {
            content: String::new(),
            size: DEFAULT_SIZE,
            padding: DEFAULT_PADDING,
            version: String::new(),
            ec: DEFAULT_EC.to_string(),
        }
    }
}

impl QrOptions {
    /// 使用默认参数创建
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: u32) -> Self {
        self.size = size;
        self
    }

    pub fn with_padding(mut self, padding: i64) -> Self {
        self.padding = padding;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_ec(mut self, ec: impl Into<String>) -> Self {
        self.ec = ec.into();
        self
    }

    /// 内容是否为空
    pub fn has_content(&self) -> bool {
        !self.content.is_empty()
    }

    /// 请求的符号版本
    ///
    /// 只有能解析为正整数时才返回；`""`、`"abc"`、`"0"`、`"-1"` 都返回 `None`。
    /// 超出 `u32` 范围的正数保留为 `u32::MAX`，交给编码器报错。
    pub fn requested_version(&self) -> Option<u32> {
        let version: i64 = self.version.trim().parse().ok()?;
        (version > 0).then(|| u32::try_from(version).unwrap_or(u32::MAX))
    }

    /// 请求的纠错等级，未识别的字母返回 `None`
    pub fn requested_error_correction(&self) -> Option<ErrorCorrection> {
        ErrorCorrection::from_letter(&self.ec)
    }
}
