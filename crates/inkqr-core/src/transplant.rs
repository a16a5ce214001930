//! 节点移植
//!
//! 把符号文档的内容复制到宿主文档：先插入白色背景矩形，
//! 再把符号的每个子元素的全部属性复制到新建的 `path` 节点。

use crate::context::{Attributes, DocumentContext, QName};
use crate::math::format_number;
use crate::symbol::{SymbolDocument, ViewBox};

/// 背景矩形样式
pub const BACKGROUND_STYLE: &str = "fill:#fff;";

/// 留白偏移量：`padding * size / 10`，整数除法向下取整
pub fn padding_offset(padding: i64, size: u32) -> i64 {
    padding.saturating_mul(i64::from(size)).div_euclid(10)
}

/// 背景宽高的增量：`2 * padding * size / 10`
///
/// 先乘后除，所以不一定等于 `2 * padding_offset(..)`。
pub fn padding_growth(padding: i64, size: u32) -> i64 {
    padding
        .saturating_mul(2)
        .saturating_mul(i64::from(size))
        .div_euclid(10)
}

/// 背景矩形
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Background {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Background {
    /// 按留白参数扩展视口框
    pub fn around(view_box: &ViewBox, padding: i64, size: u32) -> Self {
        let offset = padding_offset(padding, size) as f64;
        let growth = padding_growth(padding, size) as f64;
        Self {
            x: view_box.min_x - offset,
            y: view_box.min_y - offset,
            width: view_box.width + growth,
            height: view_box.height + growth,
        }
    }

    /// 矩形节点的属性
    pub fn attributes(&self) -> Attributes {
        vec![
            (QName::plain("x"), format_number(self.x)),
            (QName::plain("y"), format_number(self.y)),
            (QName::plain("width"), format_number(self.width)),
            (QName::plain("height"), format_number(self.height)),
            (QName::plain("style"), BACKGROUND_STYLE.to_string()),
        ]
    }
}

/// 移植结果
#[derive(Debug, Clone, PartialEq)]
pub struct Transplanted<N> {
    pub background: N,
    pub paths: Vec<N>,
}

/// 把符号文档移植到 `parent` 下
///
/// 子元素的标签不做检查，一律作为 `path` 复制。
pub fn transplant<C: DocumentContext>(
    ctx: &mut C,
    parent: C::Node,
    symbol: &SymbolDocument,
    padding: i64,
    size: u32,
) -> Transplanted<C::Node> {
    let background = Background::around(&symbol.view_box, padding, size);
    let rect = ctx.create_element(parent, &QName::svg("rect"), &background.attributes());

    let paths = symbol
        .children
        .iter()
        .map(|child| {
            let attributes: Attributes = child
                .attributes
                .iter()
                .map(|(key, value)| (QName::plain(key.as_str()), value.clone()))
                .collect();
            ctx.create_element(parent, &QName::svg("path"), &attributes)
        })
        .collect();

    Transplanted {
        background: rect,
        paths,
    }
}
