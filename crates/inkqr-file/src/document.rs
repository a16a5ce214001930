//! SVG 文档数据模型
//!
//! 可修改的 XML 树，用 quick-xml 读写。未改动的部分按原样写回：
//! 序言（XML 声明、DOCTYPE、注释）、元素与属性顺序、限定名前缀、文本和 CDATA。

use crate::error::FileError;
use inkqr_core::context::QName;
use quick_xml::events::{BytesCData, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use quick_xml::escape::{escape, unescape};
use quick_xml::events::attributes::Attribute;
use std::path::Path;

/// 文档中的节点句柄
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

/// 元素：限定名与有序属性
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// 原样保存的限定名（如 `svg:rect`、`sodipodi:namedview`）
    pub name: String,

    /// 原样保存的属性键与规范化、反转义后的值
    pub attributes: Vec<(String, String)>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// 获取属性（按限定名精确匹配）
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// 设置属性，已存在时原位替换
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }
}

/// 节点内容
#[derive(Debug, Clone, PartialEq, Eq)]
enum NodeKind {
    Element(Element),
    /// 未反转义的原始文本
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// 拆分限定名为（前缀，本地名）
fn split_qualified(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, name),
    }
}

fn utf8(bytes: &[u8]) -> Result<String, FileError> {
    Ok(std::str::from_utf8(bytes)?.to_string())
}

/// 转义属性值，空白控制字符写作字符引用
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}

fn read_element(start: &BytesStart<'_>) -> Result<Element, FileError> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    for attr in start.attributes() {
        let attr = attr?;
        let key = utf8(attr.key.as_ref())?;
        // 属性值规范化：字面的换行和制表符视为空格，字符引用保留
        let raw = utf8(&attr.value)?
            .replace("\r\n", " ")
            .replace(['\n', '\r', '\t'], " ");
        element.attributes.push((key, unescape(&raw)?.into_owned()));
    }
    Ok(element)
}

/// SVG 文档
#[derive(Debug, Clone)]
pub struct SvgDocument {
    /// 节点存储，NodeId 为下标
    nodes: Vec<NodeData>,

    /// 根元素
    root: NodeId,

    /// 根元素之前的内容（声明、DOCTYPE、注释、空白）
    prolog: Vec<Event<'static>>,

    /// 根元素之后的内容
    epilog: Vec<Event<'static>>,

    /// 是否已修改
    modified: bool,
}

impl SvgDocument {
    /// 从文本解析
    pub fn parse(text: &str) -> Result<Self, FileError> {
        let mut reader = Reader::from_str(text);
        reader.trim_text(false);

        let mut nodes: Vec<NodeData> = Vec::new();
        let mut stack: Vec<NodeId> = Vec::new();
        let mut root: Option<NodeId> = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();

        loop {
            let event = reader.read_event()?;

            // 根元素之外的杂项
            if stack.is_empty() {
                match event {
                    Event::Start(_) | Event::Empty(_) => {}
                    Event::Eof => break,
                    Event::End(_) => {
                        return Err(FileError::InvalidFormat("unexpected end tag".to_string()))
                    }
                    Event::CData(_) => {
                        return Err(FileError::InvalidFormat(
                            "CDATA outside the root element".to_string(),
                        ))
                    }
                    other => {
                        if root.is_none() {
                            prolog.push(other.into_owned());
                        } else {
                            epilog.push(other.into_owned());
                        }
                        continue;
                    }
                }
            }

            let opens = matches!(event, Event::Start(_));
            let kind = match event {
                Event::Start(ref start) | Event::Empty(ref start) => {
                    NodeKind::Element(read_element(start)?)
                }
                Event::End(_) => {
                    stack.pop();
                    continue;
                }
                Event::Text(text) => NodeKind::Text(utf8(&text)?),
                Event::CData(data) => NodeKind::CData(utf8(&data)?),
                Event::Comment(text) => NodeKind::Comment(utf8(&text)?),
                Event::PI(text) => NodeKind::ProcessingInstruction(utf8(&text)?),
                Event::Decl(_) | Event::DocType(_) => {
                    return Err(FileError::InvalidFormat(
                        "declaration inside the root element".to_string(),
                    ))
                }
                Event::Eof => break,
            };

            let id = NodeId(nodes.len());
            let parent = stack.last().copied();
            nodes.push(NodeData {
                kind,
                parent,
                children: Vec::new(),
            });

            match parent {
                Some(parent) => nodes[parent.0].children.push(id),
                None if root.is_some() => {
                    return Err(FileError::InvalidFormat(
                        "more than one root element".to_string(),
                    ))
                }
                None => root = Some(id),
            }

            if opens {
                stack.push(id);
            }
        }

        if !stack.is_empty() {
            return Err(FileError::InvalidFormat("unclosed element".to_string()));
        }

        Ok(Self {
            nodes,
            root: root.ok_or(FileError::MissingRoot)?,
            prolog,
            epilog,
            modified: false,
        })
    }

    /// 从文件加载
    pub fn open(path: impl AsRef<Path>) -> Result<Self, FileError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// 序列化为字节
    pub fn to_bytes(&self) -> Result<Vec<u8>, FileError> {
        let mut writer = Writer::new(Vec::new());
        for event in &self.prolog {
            writer.write_event(event)?;
        }
        self.write_node(&mut writer, self.root)?;
        for event in &self.epilog {
            writer.write_event(event)?;
        }
        Ok(writer.into_inner())
    }

    /// 序列化为字符串
    pub fn to_xml_string(&self) -> Result<String, FileError> {
        utf8(&self.to_bytes()?)
    }

    /// 写入任意输出流
    pub fn write_to(&self, mut out: impl std::io::Write) -> Result<(), FileError> {
        out.write_all(&self.to_bytes()?)?;
        out.flush()?;
        Ok(())
    }

    /// 另存为
    pub fn save_as(&mut self, path: impl AsRef<Path>) -> Result<(), FileError> {
        std::fs::write(path, self.to_bytes()?)?;
        self.modified = false;
        Ok(())
    }

    fn write_node(&self, writer: &mut Writer<Vec<u8>>, id: NodeId) -> Result<(), FileError> {
        let data = &self.nodes[id.0];
        match &data.kind {
            NodeKind::Element(element) => {
                let mut start = BytesStart::new(element.name.as_str());
                for (key, value) in &element.attributes {
                    let value = escape_attribute(value);
                    start.push_attribute(Attribute::from((key.as_bytes(), value.as_bytes())));
                }

                if data.children.is_empty() {
                    writer.write_event(Event::Empty(start))?;
                } else {
                    writer.write_event(Event::Start(start))?;
                    for child in &data.children {
                        self.write_node(writer, *child)?;
                    }
                    writer.write_event(Event::End(BytesEnd::new(element.name.as_str())))?;
                }
            }
            NodeKind::Text(raw) => {
                writer.write_event(Event::Text(BytesText::from_escaped(raw.as_str())))?
            }
            NodeKind::CData(raw) => {
                writer.write_event(Event::CData(BytesCData::new(raw.as_str())))?
            }
            NodeKind::Comment(raw) => {
                writer.write_event(Event::Comment(BytesText::from_escaped(raw.as_str())))?
            }
            NodeKind::ProcessingInstruction(raw) => {
                writer.write_event(Event::PI(BytesText::from_escaped(raw.as_str())))?
            }
        }
        Ok(())
    }

    /// 根元素
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// 获取元素
    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match &self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// 获取可变元素
    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut Element> {
        self.modified = true;
        match &mut self.nodes[id.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    /// 子节点
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// 子元素（跳过文本、注释等）
    #[cfg(test)]
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.children(id)
            .iter()
            .copied()
            .filter(|child| self.element(*child).is_some())
    }

    /// 父节点
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    /// 以先序遍历返回 `id` 及其所有后代
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut pending = vec![id];
        while let Some(node) = pending.pop() {
            result.push(node);
            pending.extend(self.children(node).iter().rev());
        }
        result
    }

    /// 按 `id` 属性查找元素
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root).into_iter().find(|node| {
            self.element(*node)
                .and_then(|e| e.attribute("id"))
                .is_some_and(|value| value == id)
        })
    }

    /// 查找所有匹配名称的元素（文档顺序）
    #[cfg(test)]
    pub fn find_all(&self, name: &QName) -> Vec<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .filter(|node| self.is_element(*node, name))
            .collect()
    }

    /// 查找第一个匹配名称的元素
    pub fn find_first(&self, name: &QName) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.is_element(*node, name))
    }

    /// 查找元素作用域内前缀绑定的命名空间 URI（`None` 表示默认命名空间）
    pub fn lookup_namespace(&self, id: NodeId, prefix: Option<&str>) -> Option<&str> {
        let declaration = match prefix {
            Some(prefix) => format!("xmlns:{prefix}"),
            None => "xmlns".to_string(),
        };

        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(uri) = self.element(node).and_then(|e| e.attribute(&declaration)) {
                return Some(uri);
            }
            current = self.parent(node);
        }
        None
    }

    /// 元素名称是否匹配（按命名空间解析前缀）
    pub fn is_element(&self, id: NodeId, name: &QName) -> bool {
        let Some(element) = self.element(id) else {
            return false;
        };
        let (prefix, local) = split_qualified(&element.name);
        if local != name.local {
            return false;
        }

        let uri = self.lookup_namespace(id, prefix);
        match name.namespace {
            Some(ns) => uri == Some(ns.uri()),
            None => uri.is_none(),
        }
    }

    /// 获取带命名空间的属性
    ///
    /// 无前缀的属性不属于任何命名空间（不继承默认命名空间）。
    pub fn get_attribute(&self, id: NodeId, name: &QName) -> Option<&str> {
        let element = self.element(id)?;
        element.attributes.iter().find_map(|(key, value)| {
            let (prefix, local) = split_qualified(key);
            if local != name.local {
                return None;
            }
            let matches = match (prefix, name.namespace) {
                (None, None) => true,
                (Some("xmlns"), _) | (None, Some(_)) | (Some(_), None) => false,
                (Some(prefix), Some(ns)) => {
                    self.lookup_namespace(id, Some(prefix)) == Some(ns.uri())
                }
            };
            matches.then_some(value.as_str())
        })
    }

    /// 把名称解析为可写入文档的限定名
    ///
    /// 使用根元素上声明的前缀；元素名在根元素默认命名空间相同时不加前缀；
    /// 未声明的命名空间会以惯用前缀声明到根元素上。
    pub fn qualified_name(&mut self, name: &QName, is_element: bool) -> String {
        let Some(ns) = name.namespace else {
            return name.local.clone();
        };

        if is_element && self.lookup_namespace(self.root, None) == Some(ns.uri()) {
            return name.local.clone();
        }

        let prefix = match self.root_prefix_for(ns.uri()) {
            Some(prefix) => prefix,
            None => self.declare_namespace(ns),
        };
        format!("{prefix}:{}", name.local)
    }

    fn root_prefix_for(&self, uri: &str) -> Option<String> {
        self.element(self.root)?
            .attributes
            .iter()
            .find_map(|(key, value)| {
                key.strip_prefix("xmlns:")
                    .filter(|_| value == uri)
                    .map(str::to_string)
            })
    }

    fn declare_namespace(&mut self, ns: inkqr_core::context::Namespace) -> String {
        let mut prefix = ns.prefix().to_string();
        let mut counter = 0;
        while self.lookup_namespace(self.root, Some(&prefix)).is_some() {
            counter += 1;
            prefix = format!("{}{}", ns.prefix(), counter);
        }

        let root = self.root;
        if let Some(element) = self.element_mut(root) {
            element.set_attribute(format!("xmlns:{prefix}"), ns.uri());
        }
        tracing::debug!(prefix = %prefix, uri = ns.uri(), "declared namespace on root");
        prefix
    }

    /// 在 `parent` 末尾追加新元素
    pub fn append_element(
        &mut self,
        parent: NodeId,
        name: &QName,
        attributes: &[(QName, String)],
    ) -> NodeId {
        let mut element = Element::new(self.qualified_name(name, true));
        for (key, value) in attributes {
            let key = self.qualified_name(key, false);
            element.set_attribute(key, value.clone());
        }

        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData {
            kind: NodeKind::Element(element),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.push(id);
        self.modified = true;
        id
    }

    /// 是否已修改
    pub fn is_modified(&self) -> bool {
        self.modified
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkqr_core::context::Namespace;

    const DRAWING: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>
<!-- Created with Inkscape (http://www.inkscape.org/) -->

<svg
   width="210mm"
   height="297mm"
   viewBox="0 0 210 297"
   version="1.1"
   id="svg1"
   xmlns:inkscape="http://www.inkscape.org/namespaces/inkscape"
   xmlns:sodipodi="http://sodipodi.sourceforge.net/DTD/sodipodi-0.dtd"
   xmlns="http://www.w3.org/2000/svg"
   xmlns:svg="http://www.w3.org/2000/svg">
  <sodipodi:namedview
     id="namedview1"
     inkscape:cx="400"
     inkscape:cy="560"
     inkscape:current-layer="layer1" />
  <defs
     id="defs1"><style><![CDATA[ .a > b { fill: red } ]]></style></defs>
  <g
     inkscape:label="Layer 1"
     inkscape:groupmode="layer"
     id="layer1">
    <text id="t1">Tom &amp; Jerry &lt;3</text>
  </g>
</svg>
"#;

    #[test]
    fn test_untouched_roundtrip() {
        let doc = SvgDocument::parse(DRAWING).unwrap();
        let text = doc.to_xml_string().unwrap();

        assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8" standalone="no"?>"#));
        assert!(text.contains("<!-- Created with Inkscape (http://www.inkscape.org/) -->"));
        assert!(text.contains("<![CDATA[ .a > b { fill: red } ]]>"));
        assert!(text.contains("Tom &amp; Jerry &lt;3"));
        assert!(text.contains(r#"inkscape:current-layer="layer1""#));

        // 再次解析得到相同的结构
        let again = SvgDocument::parse(&text).unwrap();
        assert_eq!(again.to_xml_string().unwrap(), text);
        assert!(!doc.is_modified());
    }

    #[test]
    fn test_attribute_values_are_unescaped() {
        let doc = SvgDocument::parse(r#"<svg xmlns="http://www.w3.org/2000/svg" id="a&amp;b"/>"#)
            .unwrap();
        let root = doc.element(doc.root()).unwrap();

        assert_eq!(root.attribute("id"), Some("a&b"));
        assert!(doc.to_xml_string().unwrap().contains(r#"id="a&amp;b""#));
    }

    #[test]
    fn test_whitespace_character_references_survive() {
        let doc = SvgDocument::parse(r#"<svg data-x="a&#10;b" data-y="c&#9;d&#13;"/>"#).unwrap();
        let root = doc.element(doc.root()).unwrap();
        assert_eq!(root.attribute("data-x"), Some("a\nb"));
        assert_eq!(root.attribute("data-y"), Some("c\td\r"));

        let text = doc.to_xml_string().unwrap();
        assert!(text.contains(r#"data-x="a&#10;b""#), "{text}");
        assert!(text.contains(r#"data-y="c&#9;d&#13;""#), "{text}");

        // 再次解析得到相同的值
        let again = SvgDocument::parse(&text).unwrap();
        assert_eq!(again.element(again.root()).unwrap().attribute("data-x"), Some("a\nb"));
    }

    #[test]
    fn test_literal_whitespace_in_attributes_is_normalized() {
        let doc = SvgDocument::parse("<svg d=\"M 0 0\n L 1 1\tz\r\n\"/>").unwrap();
        let root = doc.element(doc.root()).unwrap();

        assert_eq!(root.attribute("d"), Some("M 0 0  L 1 1 z "));
        assert!(!doc.to_xml_string().unwrap().contains("&#10;"));
    }

    #[test]
    fn test_namespace_aware_lookup() {
        let doc = SvgDocument::parse(DRAWING).unwrap();
        let named_view = doc.find_first(&QName::sodipodi("namedview")).unwrap();

        assert_eq!(
            doc.get_attribute(named_view, &QName::inkscape("current-layer")),
            Some("layer1")
        );
        assert_eq!(doc.get_attribute(named_view, &QName::plain("id")), Some("namedview1"));
        assert_eq!(doc.get_attribute(named_view, &QName::plain("current-layer")), None);

        let layer = doc.find_by_id("layer1").unwrap();
        assert!(doc.is_element(layer, &QName::svg("g")));
        assert!(doc.is_element(doc.root(), &QName::svg("svg")));
        assert!(!doc.is_element(layer, &QName::plain("g")));
        assert_eq!(doc.find_all(&QName::svg("g")), vec![layer]);
    }

    #[test]
    fn test_append_element_uses_document_prefixes() {
        let mut doc = SvgDocument::parse(DRAWING).unwrap();
        let layer = doc.find_by_id("layer1").unwrap();

        let group = doc.append_element(
            layer,
            &QName::svg("g"),
            &[(QName::inkscape("label"), "QRCode".to_string())],
        );

        let element = doc.element(group).unwrap();
        assert_eq!(element.name, "g");
        assert_eq!(element.attribute("inkscape:label"), Some("QRCode"));
        assert_eq!(doc.parent(group), Some(layer));
        assert_eq!(doc.children(layer).last(), Some(&group));
        assert!(doc.is_modified());

        let text = doc.to_xml_string().unwrap();
        assert!(text.contains(r#"<g inkscape:label="QRCode"/>"#), "{text}");
    }

    #[test]
    fn test_prefixed_svg_namespace() {
        let mut doc = SvgDocument::parse(
            r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg"><svg:g id="l"/></svg:svg>"#,
        )
        .unwrap();
        let layer = doc.find_by_id("l").unwrap();
        let rect = doc.append_element(layer, &QName::svg("rect"), &[]);

        assert_eq!(doc.element(rect).unwrap().name, "svg:rect");
        assert!(doc.is_element(rect, &QName::svg("rect")));
    }

    #[test]
    fn test_undeclared_namespace_is_declared_on_root() {
        let mut doc = SvgDocument::parse(r#"<svg xmlns="http://www.w3.org/2000/svg"/>"#).unwrap();
        let root = doc.root();
        let group = doc.append_element(
            root,
            &QName::svg("g"),
            &[(QName::inkscape("label"), "QRCode".to_string())],
        );

        assert_eq!(
            doc.lookup_namespace(root, Some("inkscape")),
            Some(Namespace::Inkscape.uri())
        );
        assert_eq!(
            doc.get_attribute(group, &QName::inkscape("label")),
            Some("QRCode")
        );
    }

    #[test]
    fn test_malformed_documents() {
        assert!(matches!(SvgDocument::parse(""), Err(FileError::MissingRoot)));
        assert!(matches!(
            SvgDocument::parse("<svg><g></svg>"),
            Err(FileError::Xml(_))
        ));
        assert!(matches!(
            SvgDocument::parse("<svg/><svg/>"),
            Err(FileError::InvalidFormat(_))
        ));
        assert!(SvgDocument::parse("<svg>").is_err());
    }

    #[test]
    fn test_open_and_save() {
        let dir = std::env::temp_dir();
        let input = dir.join("inkqr_document_open.svg");
        let output = dir.join("inkqr_document_save.svg");
        std::fs::write(&input, DRAWING).unwrap();

        let mut doc = SvgDocument::open(&input).unwrap();
        let layer = doc.find_by_id("layer1").unwrap();
        doc.append_element(layer, &QName::svg("rect"), &[]);
        assert!(doc.is_modified());

        doc.save_as(&output).unwrap();
        let saved = std::fs::read_to_string(&output).unwrap();
        assert_eq!(saved, doc.to_xml_string().unwrap());
        assert!(!doc.is_modified());

        std::fs::remove_file(&input).ok();
        std::fs::remove_file(&output).ok();
    }
}
