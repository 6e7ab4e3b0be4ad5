use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// 日誌輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// 給人看的單行格式
    Compact,
    /// 每行一個 JSON 物件，給排程器或集中式日誌收集
    Json,
}

impl LogFormat {
    pub fn from_flag(json: bool) -> Self {
        if json {
            LogFormat::Json
        } else {
            LogFormat::Compact
        }
    }
}

/// `RUST_LOG` 未設定時使用的過濾規則
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "chefs_etl=debug,warn"
    } else {
        "chefs_etl=info,warn"
    }
}

/// 安裝全域 subscriber。stdout 保留給 JSON 輸出，日誌一律寫到 stderr
pub fn init_logger(format: LogFormat, verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .with_file(false)
        .with_line_number(false);

    let layer = match format {
        LogFormat::Compact => layer.compact().boxed(),
        LogFormat::Json => layer.json().flatten_event(true).boxed(),
    };

    tracing_subscriber::registry().with(filter).with(layer).init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flag() {
        assert_eq!(LogFormat::from_flag(true), LogFormat::Json);
        assert_eq!(LogFormat::from_flag(false), LogFormat::Compact);
    }

    #[test]
    fn test_default_directive_parses() {
        for verbose in [true, false] {
            let directive = default_directive(verbose);
            assert!(directive.parse::<EnvFilter>().is_ok(), "{}", directive);
        }
        assert!(default_directive(true).contains("chefs_etl=debug"));
        assert!(default_directive(false).contains("chefs_etl=info"));
    }
}
