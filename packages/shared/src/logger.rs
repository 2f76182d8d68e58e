//! Logging setup utilities for the Duet binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Workspace crates whose spans and events are enabled at the default level.
const WORKSPACE_CRATES: [&str; 3] = ["duet_shared", "duet_client", "duet_host"];

/// Build the default filter directives for the given binary.
///
/// Every workspace crate and the binary itself get `default_log_level`;
/// everything else falls back to the subscriber's default (`error`).
pub fn default_directives(binary_name: &str, default_log_level: &str) -> String {
    let binary_target = binary_name.replace('-', "_");
    let binary = (!WORKSPACE_CRATES.contains(&binary_target.as_str())).then_some(binary_target);

    WORKSPACE_CRATES
        .iter()
        .map(|target| target.to_string())
        .chain(binary)
        .map(|target| format!("{}={}", target, default_log_level))
        .collect::<Vec<_>>()
        .join(",")
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "duet-host", "duet-client")
/// * `default_log_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use duet_shared::logger::setup_logger;
///
/// setup_logger("duet-host", "debug");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directives(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_binary_is_listed_once() {
        // テスト項目: バイナリがワークスペースのクレートと同名なら指定は 1 回だけになる
        // given (前提条件):
        let binary_name = "duet-client";

        // when (操作):
        let directives = default_directives(binary_name, "info");

        // then (期待する結果):
        assert_eq!(
            directives,
            "duet_shared=info,duet_client=info,duet_host=info"
        );
    }

    #[test]
    fn test_other_binary_is_appended() {
        // テスト項目: ワークスペース外の名前のバイナリは末尾に追加される
        // given (前提条件):
        let binary_name = "duet-bench";

        // when (操作):
        let directives = default_directives(binary_name, "debug");

        // then (期待する結果):
        assert_eq!(
            directives,
            "duet_shared=debug,duet_client=debug,duet_host=debug,duet_bench=debug"
        );
    }
}
