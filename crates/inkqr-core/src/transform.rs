//! 2D变换操作
//!
//! 插入的二维码组只需要平移，矩阵形式与 SVG `transform` 属性一一对应。

use crate::math::{Matrix3, Point2};

/// 2D平移变换
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2D {
    matrix: Matrix3,
}

impl Transform2D {
    /// 创建平移变换
    pub fn translation(dx: f64, dy: f64) -> Self {
        Self {
            matrix: Matrix3::new(
                1.0, 0.0, dx,
                0.0, 1.0, dy,
                0.0, 0.0, 1.0,
            ),
        }
    }

    /// 平移到指定点
    pub fn translate_to(point: Point2) -> Self {
        Self::translation(point.x, point.y)
    }

    /// 输出为 SVG `transform` 属性值
    ///
    /// 坐标总带小数部分（`translate(0.0, 0.0)`），与 Inkscape 扩展历来写出的格式一致。
    pub fn to_svg(&self) -> String {
        format!("translate({:?}, {:?})", self.matrix[(0, 2)], self.matrix[(1, 2)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_svg_translate() {
        assert_eq!(Transform2D::translation(0.0, 0.0).to_svg(), "translate(0.0, 0.0)");
        assert_eq!(
            Transform2D::translate_to(Point2::new(148.5, 105.0)).to_svg(),
            "translate(148.5, 105.0)"
        );
        assert_eq!(
            Transform2D::translate_to(Point2::new(-2.25, 1e-3)).to_svg(),
            "translate(-2.25, 0.001)"
        );
    }
}
