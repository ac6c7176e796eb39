//! ロガーの初期化

use std::io::Write;

/// ビルド種別ごとのデフォルトログレベル
///
/// リリースビルドではWarnレベル以上、デバッグビルドではInfoレベル以上のログを出力
pub fn default_level() -> log::LevelFilter {
    if cfg!(debug_assertions) {
        log::LevelFilter::Info
    } else {
        log::LevelFilter::Warn
    }
}

/// env_logger を初期化する（RUST_LOG で上書き可能）
///
/// 二重初期化はエラーにせず無視する。
pub fn init_logger() {
    let _ = env_logger::Builder::new()
        .filter_level(default_level())
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5} {}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        })
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_level_matches_build() {
        #[cfg(debug_assertions)]
        assert_eq!(default_level(), log::LevelFilter::Info);
        #[cfg(not(debug_assertions))]
        assert_eq!(default_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn test_init_logger_twice_does_not_panic() {
        init_logger();
        init_logger();
    }
}
