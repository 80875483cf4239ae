use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Фильтр по умолчанию: SQL-запросы sea-orm/sqlx не шумят в логах
pub const DEFAULT_LOG_FILTER: &str = "info,sqlx=warn,sea_orm=warn,reqwest=warn";

/// Каталог логов: рядом с исполняемым файлом, иначе target/logs
fn resolve_log_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join("logs")))
        .unwrap_or_else(|| PathBuf::from("target").join("logs"))
}

fn log_filter() -> String {
    std::env::var("RUST_LOG")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string())
}

/// Инициализация системы трассировки (tracing)
///
/// Логи пишутся в:
/// - stdout (с цветами)
/// - logs/backend.log рядом с exe (без цветов)
pub fn initialize() -> anyhow::Result<()> {
    println!("========================================");
    println!("  TOUR PLANNER LOGGING");
    println!("========================================");

    let log_dir = resolve_log_dir();
    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        println!("✗ ERROR: Cannot create log directory {}: {}", log_dir.display(), e);
        return Err(anyhow::anyhow!("Cannot create log directory: {}", e));
    }

    let log_file_path = log_dir.join("backend.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .map_err(|e| {
            println!("✗ ERROR: Cannot open log file {}: {}", log_file_path.display(), e);
            anyhow::anyhow!("Cannot open log file: {}", e)
        })?;
    println!("✓ Log file: {}", log_file_path.display());

    let filter = log_filter();
    println!("✓ Log level: {}", filter);

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::sync::Arc::new(log_file))
                .with_ansi(false),
        )
        .init();

    println!("========================================\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_dir_is_named_logs() {
        assert!(resolve_log_dir().ends_with("logs"));
    }

    #[test]
    fn test_default_filter_silences_sql() {
        assert!(DEFAULT_LOG_FILTER.contains("sea_orm=warn"));
        assert!(DEFAULT_LOG_FILTER.starts_with("info"));
    }
}
