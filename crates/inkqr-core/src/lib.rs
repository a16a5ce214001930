//! inkqr 核心
//!
//! 把二维码作为原生矢量路径插入 Inkscape 文档。
//!
//! # 架构设计
//!
//! 单次处理流程：
//! - `options`: 五个扩展选项及其默认值
//! - `symbol` / `encoder`: 组装参数集合，调用 `qrcode` crate 生成符号文档
//! - `transplant`: 计算带留白的背景矩形，复制符号路径
//! - `effect`: 在当前图层下建立组并完成插入
//!
//! 宿主编辑器的状态通过 [`context::DocumentContext`] 注入。
//!
//! # 示例
//!
//! ```rust,ignore
//! use inkqr_core::prelude::*;
//!
//! let options = QrOptions::new("https://inkscape.org");
//! let inserted = insert_qrcode(&mut ctx, &QrcodeEncoder::new(), &options)?;
//! println!("{} paths", inserted.paths.len());
//! ```

pub mod context;
pub mod effect;
pub mod encoder;
pub mod math;
pub mod options;
pub mod symbol;
pub mod transform;
pub mod transplant;
pub mod units;

pub mod prelude {
    //! 常用类型的便捷导入
    pub use crate::context::{DocumentContext, Namespace, QName};
    pub use crate::effect::{insert_qrcode, EffectError, Insertion, EMPTY_CONTENT_MESSAGE};
    pub use crate::encoder::QrcodeEncoder;
    pub use crate::math::Point2;
    pub use crate::options::{ErrorCorrection, QrOptions};
    pub use crate::symbol::{SymbolDocument, SymbolEncoder, SymbolRequest, ViewBox};
    pub use crate::transform::Transform2D;
}
