/// Heading printed before the organized URLs.
pub const REPORT_HEADER: &str = "=== Organized Files ===";

/// Render organized URLs as printed by `clipyard-organize`: the header, then one URL per line.
pub fn format_report(urls: &[String]) -> String {
    let mut report = String::from(REPORT_HEADER);
    for url in urls {
        report.push('\n');
        report.push_str(url);
    }
    report
}

/// Initialize tracing for CLI binaries.
///
/// Logs go to stderr so stdout carries only the report.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}
