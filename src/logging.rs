use tracing_subscriber::EnvFilter;

/// 診断ログの初期化
///
/// 進捗表示は標準出力、ログは標準エラーへ。`RUST_LOG` があればそちらを優先する。
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 二重初期化（テスト等）は無視
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
