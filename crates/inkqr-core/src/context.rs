//! 宿主文档上下文
//!
//! 核心逻辑通过 [`DocumentContext`] 访问宿主编辑器的状态（当前图层、视图中心）
//! 并创建节点，因此不依赖运行中的 Inkscape 即可测试。

use crate::math::Point2;
use std::fmt;

/// 已知的 XML 命名空间
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    Svg,
    Inkscape,
    Sodipodi,
}

impl Namespace {
    /// 命名空间 URI
    pub fn uri(&self) -> &'static str {
        match self {
            Namespace::Svg => "http://www.w3.org/2000/svg",
            Namespace::Inkscape => "http://www.inkscape.org/namespaces/inkscape",
            Namespace::Sodipodi => "http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd",
        }
    }

    /// 惯用前缀
    pub fn prefix(&self) -> &'static str {
        match self {
            Namespace::Svg => "svg",
            Namespace::Inkscape => "inkscape",
            Namespace::Sodipodi => "sodipodi",
        }
    }
}

/// 带命名空间的名称
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub namespace: Option<Namespace>,
    pub local: String,
}

impl QName {
    /// 无命名空间的名称（普通属性）
    pub fn plain(local: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local: local.into(),
        }
    }

    pub fn new(namespace: Namespace, local: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace),
            local: local.into(),
        }
    }

    pub fn svg(local: impl Into<String>) -> Self {
        Self::new(Namespace::Svg, local)
    }

    pub fn inkscape(local: impl Into<String>) -> Self {
        Self::new(Namespace::Inkscape, local)
    }

    pub fn sodipodi(local: impl Into<String>) -> Self {
        Self::new(Namespace::Sodipodi, local)
    }
}

impl fmt::Display for QName {
    /// Clark 记法：`{uri}local`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns.uri(), self.local),
            None => f.write_str(&self.local),
        }
    }
}

/// 属性列表
pub type Attributes = Vec<(QName, String)>;

/// 宿主编辑器文档
pub trait DocumentContext {
    /// 文档中节点的句柄
    type Node: Copy + fmt::Debug;

    /// 新内容应插入的父节点（当前图层）
    fn current_parent(&self) -> Self::Node;

    /// 当前视图中心（用户单位）
    fn viewport_center(&self) -> Point2;

    /// 在 `parent` 末尾创建子元素，名称与属性按命名空间解析
    fn create_element(
        &mut self,
        parent: Self::Node,
        name: &QName,
        attributes: &[(QName, String)],
    ) -> Self::Node;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespace_prefixes() {
        assert_eq!(Namespace::Svg.prefix(), "svg");
        assert_eq!(Namespace::Sodipodi.prefix(), "sodipodi");
        assert_eq!(
            QName::inkscape("label").namespace.map(|ns| ns.uri()),
            Some("http://www.inkscape.org/namespaces/inkscape")
        );
    }

    #[test]
    fn test_qname_display() {
        assert_eq!(QName::plain("x").to_string(), "x");
        assert_eq!(
            QName::svg("rect").to_string(),
            "{http://www.w3.org/2000/svg}rect"
        );
    }
}
