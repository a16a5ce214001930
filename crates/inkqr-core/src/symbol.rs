//! 二维码符号
//!
//! 编码器接收一个 [`SymbolRequest`]（参数集合），返回内存中的 [`SymbolDocument`]：
//! 一个视口框加若干可绘制的子元素。符号文档只在移植阶段短暂存在。

use crate::options::{ErrorCorrection, QrOptions};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// 输出图像工厂
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFactory {
    /// 所有深色模块合并为一条路径的 SVG
    SvgPath,
}

/// 传给编码器的参数集合
///
/// 未设置的 `version` 与 `error_correction` 不会出现在序列化结果中，
/// 由编码器使用自己的默认行为。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolRequest {
    /// 要编码的文本
    pub content: String,

    /// 符号自带的静区宽度（模块数）
    pub border: u32,

    /// 模块尺寸
    pub box_size: u32,

    /// 输出格式
    pub image_factory: ImageFactory,

    /// 最小符号版本
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,

    /// 纠错等级
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_correction: Option<ErrorCorrection>,
}

impl SymbolRequest {
    /// 根据扩展选项组装参数
    pub fn from_options(options: &QrOptions) -> Self {
        Self {
            content: options.content.clone(),
            border: 0,
            box_size: options.size,
            image_factory: ImageFactory::SvgPath,
            version: options.requested_version(),
            error_correction: options.requested_error_correction(),
        }
    }
}

/// 视口框解析错误
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewBoxError {
    #[error("viewBox needs 4 numbers, found {0}")]
    WrongCount(usize),

    #[error("invalid viewBox number: {0:?}")]
    InvalidNumber(String),
}

/// SVG 视口框
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewBox {
    pub fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> Self {
        Self {
            min_x,
            min_y,
            width,
            height,
        }
    }
}

impl FromStr for ViewBox {
    type Err = ViewBoxError;

    /// 解析 `viewBox` 属性：四个数，以空白和/或逗号分隔
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() != 4 {
            return Err(ViewBoxError::WrongCount(parts.len()));
        }

        let mut values = [0.0; 4];
        for (value, part) in values.iter_mut().zip(&parts) {
            *value = part
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| ViewBoxError::InvalidNumber(part.to_string()))?;
        }

        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use crate::math::format_number;
        write!(
            f,
            "{} {} {} {}",
            format_number(self.min_x),
            format_number(self.min_y),
            format_number(self.width),
            format_number(self.height)
        )
    }
}

/// 符号文档中的一个子元素
///
/// 属性按写入顺序保存，键为不带命名空间的属性名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
}

impl SymbolElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
        }
    }

    /// 追加属性
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl ToString) -> Self {
        self.attributes.push((name.into(), value.to_string()));
        self
    }

    /// 获取属性值
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// 编码结果的元信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolInfo {
    /// 实际使用的符号版本（1-40）
    pub version: u32,

    /// 实际使用的纠错等级
    pub error_correction: ErrorCorrection,

    /// 每边模块数
    pub modules: usize,
}

/// 编码器生成的符号文档
#[derive(Debug, Clone, PartialEq)]
pub struct SymbolDocument {
    pub view_box: ViewBox,
    pub children: Vec<SymbolElement>,
    pub info: SymbolInfo,
}

/// 编码失败
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("QR encoding failed: {0}")]
    Qr(#[from] qrcode::types::QrError),

    #[error("QR version {0} is out of range (1-40)")]
    VersionOutOfRange(u32),
}

/// 二维码编码器
pub trait SymbolEncoder {
    /// 按参数集合编码，调用一次返回一个符号文档
    fn encode(&self, request: &SymbolRequest) -> Result<SymbolDocument, EncodeError>;
}
