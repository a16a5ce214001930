//! inkqr 文档处理
//!
//! 支持：
//! - SVG 文档的读取与原样写回（基于 quick-xml）
//! - 命名空间感知的元素创建
//! - Inkscape 当前图层与视图中心

pub mod document;
pub mod error;
pub mod inkscape;

pub use document::{NodeId, SvgDocument};
pub use error::FileError;
pub use inkscape::InkscapeContext;
