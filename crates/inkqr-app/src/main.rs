//! inkqr 主程序入口
//! Inkscape 以命令行方式调用：读取当前文档，插入二维码后写回标准输出

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use inkqr_core::effect::{insert_qrcode, EffectError};
use inkqr_core::encoder::QrcodeEncoder;
use inkqr_core::options::{QrOptions, DEFAULT_EC, DEFAULT_PADDING, DEFAULT_SIZE};
use inkqr_file::{InkscapeContext, SvgDocument};

/// 日志过滤环境变量
const LOG_ENV: &str = "INKQR_LOG";

/// 扩展参数（与 inkqr.inx 中的 param 对应）
#[derive(Parser, Debug)]
#[command(name = "inkqr")]
#[command(about = "Render a QR code as vector paths in an Inkscape document", long_about = None)]
#[command(disable_version_flag = true)]
struct Cli {
    /// Text to encode
    #[arg(long, default_value = "")]
    content: String,

    /// Module size
    #[arg(long, default_value_t = DEFAULT_SIZE)]
    size: u32,

    /// Padding around the symbol, in module sizes
    #[arg(long, default_value_t = DEFAULT_PADDING, allow_negative_numbers = true)]
    padding: i64,

    /// Minimum symbol version (1-40), empty for automatic
    #[arg(long, default_value = "")]
    version: String,

    /// Error correction level (L, M, Q, H)
    #[arg(long, default_value = DEFAULT_EC)]
    ec: String,

    /// Selected object ids (ignored)
    #[arg(long)]
    id: Vec<String>,

    /// Selected nodes (ignored)
    #[arg(long = "selected-nodes")]
    selected_nodes: Vec<String>,

    /// Active notebook tab (ignored)
    #[arg(long, hide = true)]
    tab: Option<String>,

    /// Write the document here instead of standard output
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Input document, standard input when absent
    input: Option<PathBuf>,
}

impl Cli {
    fn options(&self) -> QrOptions {
        QrOptions::new(self.content.clone())
            .with_size(self.size)
            .with_padding(self.padding)
            .with_version(self.version.clone())
            .with_ec(self.ec.clone())
    }
}

fn read_document(input: Option<&PathBuf>) -> Result<SvgDocument> {
    match input {
        Some(path) => SvgDocument::open(path)
            .with_context(|| format!("failed to load {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read standard input")?;
            SvgDocument::parse(&text).context("failed to parse standard input")
        }
    }
}

fn write_document(document: &mut SvgDocument, output: Option<&PathBuf>) -> Result<()> {
    match output {
        Some(path) => document
            .save_as(path)
            .with_context(|| format!("failed to write {}", path.display())),
        None => document
            .write_to(std::io::stdout().lock())
            .context("failed to write standard output"),
    }
}

fn main() -> Result<()> {
    // 初始化日志，Inkscape 会把 stderr 的全部内容显示给用户
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_writer(std::io::stderr)
            .finish(),
    )?;

    let cli = Cli::parse();
    debug!(
        ids = ?cli.id,
        selected = ?cli.selected_nodes,
        tab = ?cli.tab,
        "selection is not used"
    );

    let mut document = read_document(cli.input.as_ref())?;
    let options = cli.options();

    let mut ctx = InkscapeContext::new(&mut document);
    match insert_qrcode(&mut ctx, &QrcodeEncoder::new(), &options) {
        Ok(inserted) => info!(
            version = inserted.symbol.version,
            modules = inserted.symbol.modules,
            "QR code inserted"
        ),
        Err(EffectError::EmptyContent) => eprintln!("{}", EffectError::EmptyContent),
        Err(err) => return Err(err).context("failed to render QR code"),
    }

    debug!(modified = document.is_modified(), "writing document");
    write_document(&mut document, cli.output.as_ref())
}
