//! 单位系统
//!
//! SVG 长度单位与用户单位之间的换算。内部统一以 CSS 像素（96 px/in）为基准，
//! 文档声明了 `viewBox` 时再按宽度比例缩放到用户单位。

use crate::symbol::ViewBox;
use serde::{Deserialize, Serialize};

/// 每英寸像素数（CSS）
pub const PX_PER_INCH: f64 = 96.0;

/// SVG 长度单位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Unit {
    /// 像素（无单位数值也按像素处理）
    #[default]
    Pixel,
    /// 点 (1/72 英寸)
    Point,
    /// 派卡 (12 点)
    Pica,
    /// 毫米
    Millimeter,
    /// 厘米
    Centimeter,
    /// 米
    Meter,
    /// 千米
    Kilometer,
    /// 英寸
    Inch,
    /// 英尺 (12 英寸)
    Foot,
    /// 码 (3 英尺)
    Yard,
}

impl Unit {
    /// 获取单位到像素的转换因子
    pub fn to_px_factor(&self) -> f64 {
        match self {
            Unit::Pixel => 1.0,
            Unit::Point => PX_PER_INCH / 72.0,
            Unit::Pica => PX_PER_INCH / 6.0,
            Unit::Millimeter => PX_PER_INCH / 25.4,
            Unit::Centimeter => PX_PER_INCH / 2.54,
            Unit::Meter => PX_PER_INCH / 0.0254,
            Unit::Kilometer => PX_PER_INCH / 0.0000254,
            Unit::Inch => PX_PER_INCH,
            Unit::Foot => PX_PER_INCH * 12.0,
            Unit::Yard => PX_PER_INCH * 36.0,
        }
    }

    /// 从单位后缀解析，空串表示像素
    pub fn from_suffix(s: &str) -> Option<Self> {
        match s {
            "" | "px" => Some(Unit::Pixel),
            "pt" => Some(Unit::Point),
            "pc" => Some(Unit::Pica),
            "mm" => Some(Unit::Millimeter),
            "cm" => Some(Unit::Centimeter),
            "m" => Some(Unit::Meter),
            "km" => Some(Unit::Kilometer),
            "in" => Some(Unit::Inch),
            "ft" => Some(Unit::Foot),
            "yd" => Some(Unit::Yard),
            _ => None,
        }
    }
}

/// 带单位的长度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Length {
    pub value: f64,
    pub unit: Unit,
}

impl Length {
    pub fn new(value: f64, unit: Unit) -> Self {
        Self { value, unit }
    }

    /// 解析 `"210mm"`、`"12.5"`、`" 1e2px "` 之类的长度；百分比和未知单位返回 `None`
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let split = s
            .char_indices()
            .find(|&(i, c)| {
                c.is_ascii_alphabetic()
                    && !((c == 'e' || c == 'E')
                        && s[i + 1..]
                            .chars()
                            .next()
                            .is_some_and(|n| n.is_ascii_digit() || n == '-' || n == '+'))
            })
            .map(|(i, _)| i)
            .unwrap_or(s.len());

        let (number, suffix) = s.split_at(split);
        let value: f64 = number.trim().parse().ok()?;
        if !value.is_finite() {
            return None;
        }
        Some(Self::new(value, Unit::from_suffix(suffix.trim())?))
    }

    /// 换算为像素
    pub fn to_px(&self) -> f64 {
        self.value * self.unit.to_px_factor()
    }
}

/// 文档的用户单位比例
///
/// 文档同时声明宽度和 `viewBox` 时，一个像素对应 `viewBox.width / width_px` 个用户单位。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DocumentScale {
    user_units_per_px: f64,
}

impl DocumentScale {
    /// 无缩放（用户单位即像素）
    pub fn identity() -> Self {
        Self {
            user_units_per_px: 1.0,
        }
    }

    /// 由根元素的 `width` 与 `viewBox` 推导
    pub fn from_root(width: Option<&str>, view_box: Option<&ViewBox>) -> Self {
        let width_px = width.and_then(Length::parse).map(|l| l.to_px());
        match (width_px, view_box) {
            (Some(w), Some(vb)) if w > 0.0 && vb.width > 0.0 => Self {
                user_units_per_px: vb.width / w,
            },
            _ => Self::identity(),
        }
    }

    /// 像素换算为用户单位
    pub fn px_to_user(&self, px: f64) -> f64 {
        px * self.user_units_per_px
    }

    /// 长度换算为用户单位
    pub fn to_user(&self, length: &Length) -> f64 {
        self.px_to_user(length.to_px())
    }
}

impl Default for DocumentScale {
    fn default() -> Self {
        Self::identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;

    #[test]
    fn test_unit_factors() {
        assert!((Length::new(1.0, Unit::Inch).to_px() - 96.0).abs() < 1e-9);
        assert!((Length::new(72.0, Unit::Point).to_px() - 96.0).abs() < 1e-9);
        assert!((Length::new(25.4, Unit::Millimeter).to_px() - 96.0).abs() < 1e-9);
        assert!((Length::new(1.0, Unit::Yard).to_px() - 3456.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_length() {
        assert_eq!(Length::parse("12"), Some(Length::new(12.0, Unit::Pixel)));
        assert_eq!(Length::parse(" 210mm "), Some(Length::new(210.0, Unit::Millimeter)));
        assert_eq!(Length::parse("1.5in"), Some(Length::new(1.5, Unit::Inch)));
        assert_eq!(Length::parse("1e2px"), Some(Length::new(100.0, Unit::Pixel)));
        assert_eq!(Length::parse("-4.5pt"), Some(Length::new(-4.5, Unit::Point)));
        assert_eq!(Length::parse("100%"), None);
        assert_eq!(Length::parse("3em"), None);
        assert_eq!(Length::parse(""), None);
        assert_eq!(Length::parse("mm"), None);
    }

    #[test]
    fn test_document_scale() {
        // A4 毫米文档：210mm 宽，viewBox 宽 210
        let vb = ViewBox::new(0.0, 0.0, 210.0, 297.0);
        let scale = DocumentScale::from_root(Some("210mm"), Some(&vb));
        let one_mm_in_px = Unit::Millimeter.to_px_factor();
        assert!(approx_eq(scale.px_to_user(one_mm_in_px), 1.0));

        let scale = DocumentScale::from_root(Some("100%"), Some(&vb));
        assert_eq!(scale, DocumentScale::identity());

        let scale = DocumentScale::from_root(Some("500"), None);
        assert!(approx_eq(scale.to_user(&Length::new(2.0, Unit::Inch)), 192.0));
    }
}
