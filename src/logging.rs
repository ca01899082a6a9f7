//! ログ出力の初期化
//!
//! `RUST_LOG` があればそれを優先し、なければ `--verbose` で debug に上げる。
//! 出力は stderr（stdout は結果表示に使う）。

use tracing_subscriber::{fmt, EnvFilter};

pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("foodseg_dashboard={0},foodseg={0},foodseg_desktop={0}", default_level)));

    // 二重初期化（テスト等）は無視
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
