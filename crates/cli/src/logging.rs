use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

const LOG_ENV: &str = "OASGO_LOG";
const DEFAULT_LEVEL: &str = "info";

/// Install the stderr subscriber for a CLI run.
pub fn init_tracing() {
    let filter = filter_spec(std::env::var(LOG_ENV).ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// OASGO_LOG holds either a plain level ("debug"), applied to both oasgo
/// crates, or a full filter spec like "oasgo_core=trace,oasgo_cli=warn".
fn filter_spec(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(level) if is_plain_level(level) => crate_filter(&level.to_ascii_lowercase()),
        Some(spec) if !spec.is_empty() => spec.to_string(),
        _ => crate_filter(DEFAULT_LEVEL),
    }
}

fn crate_filter(level: &str) -> String {
    format!("oasgo_core={level},oasgo_cli={level}")
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_level_applies_to_both_crates() {
        assert_eq!(
            filter_spec(Some("DEBUG")),
            "oasgo_core=debug,oasgo_cli=debug"
        );
    }

    #[test]
    fn test_full_spec_passes_through() {
        assert_eq!(
            filter_spec(Some("oasgo_core=trace,oasgo_cli=warn")),
            "oasgo_core=trace,oasgo_cli=warn"
        );
    }

    #[test]
    fn test_default_level() {
        assert_eq!(filter_spec(None), "oasgo_core=info,oasgo_cli=info");
        assert_eq!(filter_spec(Some("  ")), "oasgo_core=info,oasgo_cli=info");
    }
}
