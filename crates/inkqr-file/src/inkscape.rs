//! Inkscape 编辑器状态
//!
//! 从 `sodipodi:namedview` 读取当前图层与视图中心，把 [`SvgDocument`]
//! 包装成核心逻辑使用的 [`DocumentContext`]。

use crate::document::{NodeId, SvgDocument};
use inkqr_core::context::{DocumentContext, QName};
use inkqr_core::math::Point2;
use inkqr_core::symbol::ViewBox;
use inkqr_core::units::{DocumentScale, Length};
use tracing::{debug, warn};

/// 查找 `sodipodi:namedview`
pub fn named_view(document: &SvgDocument) -> Option<NodeId> {
    document.find_first(&QName::sodipodi("namedview"))
}

fn root_view_box(document: &SvgDocument) -> Option<ViewBox> {
    let root = document.root();
    document
        .get_attribute(root, &QName::plain("viewBox"))?
        .parse()
        .ok()
}

/// 文档的用户单位比例
pub fn document_scale(document: &SvgDocument) -> DocumentScale {
    let root = document.root();
    DocumentScale::from_root(
        document.get_attribute(root, &QName::plain("width")),
        root_view_box(document).as_ref(),
    )
}

/// 文档高度（用户单位）
///
/// 优先使用根元素的 `height`，其次 `viewBox` 的高度，都没有时为 0。
pub fn document_height(document: &SvgDocument) -> f64 {
    let root = document.root();
    let height = document
        .get_attribute(root, &QName::plain("height"))
        .and_then(Length::parse);

    match (height, root_view_box(document)) {
        (Some(height), _) => document_scale(document).to_user(&height),
        (None, Some(view_box)) => view_box.height,
        (None, None) => 0.0,
    }
}

/// 当前图层，找不到时为根元素
///
/// 只接受 `svg:g` 元素作为图层。
pub fn current_layer(document: &SvgDocument) -> NodeId {
    let Some(layer_id) = named_view(document)
        .and_then(|nv| document.get_attribute(nv, &QName::inkscape("current-layer")))
    else {
        return document.root();
    };

    let layer = document
        .find_by_id(layer_id)
        .filter(|&node| document.is_element(node, &QName::svg("g")));
    match layer {
        Some(layer) => layer,
        None => {
            warn!(layer = layer_id, "current layer is not a group, using the root element");
            document.root()
        }
    }
}

/// 视图中心（用户单位）
///
/// `inkscape:cy` 从文档底边量起，需要按文档高度翻转。
/// 任一坐标缺失、无法解析或为 0 时返回原点。
pub fn view_center(document: &SvgDocument) -> Point2 {
    let coordinate = |name: &str| {
        named_view(document)
            .and_then(|nv| document.get_attribute(nv, &QName::inkscape(name)))
            .and_then(|value| value.trim().parse::<f64>().ok())
            .filter(|value| value.is_finite())
    };

    let (Some(cx), Some(cy)) = (coordinate("cx"), coordinate("cy")) else {
        return Point2::origin();
    };
    if cx == 0.0 || cy == 0.0 {
        return Point2::origin();
    }

    let scale = document_scale(document);
    Point2::new(
        scale.px_to_user(cx),
        document_height(document) - scale.px_to_user(cy),
    )
}

/// 以 Inkscape 文档为宿主的上下文
#[derive(Debug)]
pub struct InkscapeContext<'a> {
    document: &'a mut SvgDocument,
    layer: NodeId,
    view_center: Point2,
}

impl<'a> InkscapeContext<'a> {
    pub fn new(document: &'a mut SvgDocument) -> Self {
        let layer = current_layer(document);
        let view_center = view_center(document);
        debug!(?layer, x = view_center.x, y = view_center.y, "inkscape context");
        Self {
            document,
            layer,
            view_center,
        }
    }
}

impl DocumentContext for InkscapeContext<'_> {
    type Node = NodeId;

    fn current_parent(&self) -> NodeId {
        self.layer
    }

    fn viewport_center(&self) -> Point2 {
        self.view_center
    }

    fn create_element(
        &mut self,
        parent: NodeId,
        name: &QName,
        attributes: &[(QName, String)],
    ) -> NodeId {
        self.document.append_element(parent, name, attributes)
    }
}
