//! 数学基础类型
//!
//! 基于 nalgebra 提供的向量和点类型的别名，以及 SVG 数值格式化。

use nalgebra as na;

/// 2D点类型
pub type Point2 = na::Point2<f64>;

/// 2D变换矩阵
pub type Matrix3 = na::Matrix3<f64>;

/// 数值容差，用于几何比较
pub const EPSILON: f64 = 1e-10;

/// 判断两个浮点数是否近似相等
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// 将数值格式化为 SVG 属性文本
///
/// 整数不带小数部分（`-3` 而不是 `-3.0`），负零写作 `0`。
pub fn format_number(value: f64) -> String {
    // -0.0 + 0.0 == +0.0
    format!("{}", value + 0.0)
}

/// 以十分之一为单位的定点数格式化（`168` -> `16.8`，`80` -> `8`）
pub fn format_tenths(tenths: i64) -> String {
    let sign = if tenths < 0 { "-" } else { "" };
    let abs = tenths.unsigned_abs();
    if abs % 10 == 0 {
        format!("{}{}", sign, abs / 10)
    } else {
        format!("{}{}.{}", sign, abs / 10, abs % 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(-3.0), "-3");
        assert_eq!(format_number(106.0), "106");
        assert_eq!(format_number(16.8), "16.8");
        assert_eq!(format_number(-0.0), "0");
    }

    #[test]
    fn test_format_tenths() {
        assert_eq!(format_tenths(0), "0");
        assert_eq!(format_tenths(8), "0.8");
        assert_eq!(format_tenths(80), "8");
        assert_eq!(format_tenths(168), "16.8");
        assert_eq!(format_tenths(-32), "-3.2");
    }
}
