//! 二维码插入效果
//!
//! 检查内容、生成符号，然后在当前图层下建立一个以视图中心为原点的组，
//! 把符号移植进去。内容为空时不修改文档。

use crate::context::{DocumentContext, QName};
use crate::options::QrOptions;
use crate::symbol::{EncodeError, SymbolEncoder, SymbolInfo, SymbolRequest};
use crate::transform::Transform2D;
use crate::transplant::transplant;
use thiserror::Error;
use tracing::{debug, info};

/// 插入组的 `inkscape:label`
pub const GROUP_LABEL: &str = "QRCode";

/// 内容为空时显示给用户的消息
pub const EMPTY_CONTENT_MESSAGE: &str = "Please enter some content.";

#[derive(Debug, Error)]
pub enum EffectError {
    #[error("{}", EMPTY_CONTENT_MESSAGE)]
    EmptyContent,

    #[error(transparent)]
    Encode(#[from] EncodeError),
}

/// 一次插入的结果
#[derive(Debug, Clone, PartialEq)]
pub struct Insertion<N> {
    pub group: N,
    pub background: N,
    pub paths: Vec<N>,
    pub symbol: SymbolInfo,
}

/// 在宿主文档中插入二维码
pub fn insert_qrcode<C, E>(
    ctx: &mut C,
    encoder: &E,
    options: &QrOptions,
) -> Result<Insertion<C::Node>, EffectError>
where
    C: DocumentContext,
    E: SymbolEncoder + ?Sized,
{
    if !options.has_content() {
        return Err(EffectError::EmptyContent);
    }

    let request = SymbolRequest::from_options(options);
    debug!(?request, "generating QR symbol");
    let symbol = encoder.encode(&request)?;

    let transform = Transform2D::translate_to(ctx.viewport_center());
    let layer = ctx.current_parent();
    let group = ctx.create_element(
        layer,
        &QName::svg("g"),
        &[
            (QName::inkscape("label"), GROUP_LABEL.to_string()),
            (QName::plain("transform"), transform.to_svg()),
        ],
    );

    let moved = transplant(ctx, group, &symbol, options.padding, options.size);

    info!(
        version = symbol.info.version,
        paths = moved.paths.len(),
        "inserted QR code group"
    );

    Ok(Insertion {
        group,
        background: moved.background,
        paths: moved.paths,
        symbol: symbol.info,
    })
}
