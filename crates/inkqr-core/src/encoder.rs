//! 基于 `qrcode` crate 的符号编码器
//!
//! 直接读取编码库的模块网格构造符号文档，不经过 SVG 文本的序列化与重新解析。
//!
//! 几何约定沿用 Inkscape 历来使用的路径图像：一个模块边长为 `box_size / 10`
//! 个用户单位，所有深色模块合并为一条 `path`，每个模块一个闭合子路径。

use crate::math::format_tenths;
use crate::options::ErrorCorrection;
use crate::symbol::{
    EncodeError, SymbolDocument, SymbolElement, SymbolEncoder, SymbolInfo, SymbolRequest, ViewBox,
};
use qrcode::types::QrError;
use qrcode::{Color, EcLevel, QrCode, Version};

/// 最大符号版本
pub const MAX_VERSION: u32 = 40;

/// 编码库的默认纠错等级（与 `QrCode::new` 一致）
pub const DEFAULT_ERROR_CORRECTION: ErrorCorrection = ErrorCorrection::M;

/// 符号路径的 `id`
pub const PATH_ID: &str = "qr-path";

/// 符号路径的样式
pub const PATH_STYLE: &str = "fill:#000000;fill-opacity:1;fill-rule:nonzero;stroke:none";

impl From<ErrorCorrection> for EcLevel {
    fn from(ec: ErrorCorrection) -> Self {
        match ec {
            ErrorCorrection::L => EcLevel::L,
            ErrorCorrection::M => EcLevel::M,
            ErrorCorrection::Q => EcLevel::Q,
            ErrorCorrection::H => EcLevel::H,
        }
    }
}

fn error_correction_of(level: EcLevel) -> ErrorCorrection {
    match level {
        EcLevel::L => ErrorCorrection::L,
        EcLevel::M => ErrorCorrection::M,
        EcLevel::Q => ErrorCorrection::Q,
        EcLevel::H => ErrorCorrection::H,
    }
}

/// 使用 `qrcode` crate 的编码器
#[derive(Debug, Clone, Copy, Default)]
pub struct QrcodeEncoder;

impl QrcodeEncoder {
    pub fn new() -> Self {
        Self
    }

    /// 从 `start` 版本开始寻找能容纳数据的最小版本
    fn best_fit(data: &[u8], start: u32, level: EcLevel) -> Result<QrCode, EncodeError> {
        if !(1..=MAX_VERSION).contains(&start) {
            return Err(EncodeError::VersionOutOfRange(start));
        }

        let mut version = start;
        loop {
            // start 已检查过范围，version <= 40 可安全转换
            match QrCode::with_version(data, Version::Normal(version as i16), level) {
                Err(QrError::DataTooLong) if version < MAX_VERSION => version += 1,
                result => return Ok(result?),
            }
        }
    }
}

impl SymbolEncoder for QrcodeEncoder {
    fn encode(&self, request: &SymbolRequest) -> Result<SymbolDocument, EncodeError> {
        let level: EcLevel = request
            .error_correction
            .unwrap_or(DEFAULT_ERROR_CORRECTION)
            .into();
        let data = request.content.as_bytes();

        let code = match request.version {
            Some(start) => Self::best_fit(data, start, level)?,
            None => QrCode::with_error_correction_level(data, level)?,
        };

        let version = match code.version() {
            Version::Normal(v) | Version::Micro(v) => v as u32,
        };

        let info = SymbolInfo {
            version,
            error_correction: error_correction_of(code.error_correction_level()),
            modules: code.width(),
        };

        tracing::debug!(
            version = info.version,
            ec = %info.error_correction,
            modules = info.modules,
            "encoded QR symbol"
        );

        Ok(build_document(&code, request.border, request.box_size, info))
    }
}

/// 由模块网格构造符号文档
fn build_document(code: &QrCode, border: u32, box_size: u32, info: SymbolInfo) -> SymbolDocument {
    let width = code.width();
    let colors = code.to_colors();
    let box_size = i64::from(box_size);
    let border = i64::from(border);

    // 坐标以十分之一用户单位计算，避免浮点误差
    let dimension = (width as i64 + 2 * border) * box_size;

    let mut subpaths = Vec::new();
    for (index, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let row = (index / width) as i64;
        let col = (index % width) as i64;

        let x0 = format_tenths((col + border) * box_size);
        let y0 = format_tenths((row + border) * box_size);
        let x1 = format_tenths((col + border + 1) * box_size);
        let y1 = format_tenths((row + border + 1) * box_size);

        subpaths.push(format!(
            "M {x0} {y0} L {x0} {y1} L {x1} {y1} L {x1} {y0} z"
        ));
    }

    let path = SymbolElement::new("path")
        .with_attribute("d", subpaths.join(" "))
        .with_attribute("id", PATH_ID)
        .with_attribute("style", PATH_STYLE);

    let extent = dimension as f64 / 10.0;

    SymbolDocument {
        view_box: ViewBox::new(0.0, 0.0, extent, extent),
        children: vec![path],
        info,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::approx_eq;
    use crate::options::QrOptions;

    fn encode(options: &QrOptions) -> SymbolDocument {
        QrcodeEncoder::new()
            .encode(&SymbolRequest::from_options(options))
            .unwrap()
    }

    #[test]
    fn test_auto_version_for_short_text() {
        let symbol = encode(&QrOptions::new("hello"));

        assert_eq!(symbol.info.version, 1);
        assert_eq!(symbol.info.modules, 21);
        assert_eq!(symbol.info.error_correction, ErrorCorrection::M);

        // 21 个模块 * 8 / 10
        assert!(approx_eq(symbol.view_box.min_x, 0.0));
        assert!(approx_eq(symbol.view_box.width, 16.8));
        assert!(approx_eq(symbol.view_box.height, 16.8));
    }

    #[test]
    fn test_single_path_child() {
        let symbol = encode(&QrOptions::new("hello"));

        assert_eq!(symbol.children.len(), 1);
        let path = &symbol.children[0];
        assert_eq!(path.tag, "path");
        assert_eq!(path.attribute("id"), Some(PATH_ID));
        assert_eq!(path.attribute("style"), Some(PATH_STYLE));

        // 左上角定位图案的第一个模块
        let d = path.attribute("d").unwrap();
        assert!(d.starts_with("M 0 0 L 0 0.8 L 0.8 0.8 L 0.8 0 z"), "{d}");
    }

    #[test]
    fn test_requested_version_is_minimum() {
        let symbol = encode(&QrOptions::new("hello").with_version("5"));
        assert_eq!(symbol.info.version, 5);
        assert_eq!(symbol.info.modules, 37);

        // 版本 1 放不下时自动升级
        let long = "x".repeat(100);
        let symbol = encode(&QrOptions::new(long).with_version("1"));
        assert!(symbol.info.version > 1);
    }

    #[test]
    fn test_unknown_ec_uses_encoder_default() {
        let symbol = encode(&QrOptions::new("hello").with_ec("Z"));
        assert_eq!(symbol.info.error_correction, DEFAULT_ERROR_CORRECTION);

        let symbol = encode(&QrOptions::new("hello").with_ec("H"));
        assert_eq!(symbol.info.error_correction, ErrorCorrection::H);
    }

    #[test]
    fn test_version_out_of_range() {
        let request = SymbolRequest::from_options(&QrOptions::new("hello").with_version("41"));
        let result = QrcodeEncoder::new().encode(&request);

        assert!(matches!(result, Err(EncodeError::VersionOutOfRange(41))));
    }

    #[test]
    fn test_data_too_long() {
        let huge = "x".repeat(4000);
        let request = SymbolRequest::from_options(&QrOptions::new(huge).with_ec("H"));

        assert!(matches!(
            QrcodeEncoder::new().encode(&request),
            Err(EncodeError::Qr(QrError::DataTooLong))
        ));
    }

    #[test]
    fn test_deterministic() {
        let options = QrOptions::new("https://inkscape.org").with_ec("Q");
        assert_eq!(encode(&options), encode(&options));
    }
}
