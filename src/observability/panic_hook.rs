//! Crash report printed when the binary panics.
//!
//! Reports the phase, service and API the panicking thread was working on,
//! so an operator can tell which input triggered it.

use super::context::{get_current_context, AnalysisContext};
use std::panic::PanicHookInfo;
use tracing::Span;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const RULE_WIDTH: usize = 80;

/// Install the crash report hook. Call once, early in `main`.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        print_crash_report(info);
    }));
}

fn print_crash_report(info: &PanicHookInfo<'_>) {
    let context = get_current_context();

    eprintln!();
    eprintln!("{}", "=".repeat(RULE_WIDTH));
    eprintln!("GAPMAP CRASH REPORT");
    eprintln!("  Version:  {VERSION}");
    eprintln!("  Platform: {}", std::env::consts::OS);
    eprintln!(
        "  Time:     {}",
        chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC")
    );
    eprintln!("{}", "=".repeat(RULE_WIDTH));
    eprintln!("  PANIC: {}", truncate(&extract_panic_message(info), 70));
    if let Some(location) = info.location() {
        eprintln!(
            "  Location: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        );
    }
    eprintln!("{}", "=".repeat(RULE_WIDTH));
    for line in context_lines(&context) {
        eprintln!("  {line}");
    }
    if let Some(metadata) = Span::current().metadata() {
        eprintln!("  Span: {}", metadata.name());
    }
    eprintln!("{}", "=".repeat(RULE_WIDTH));

    if std::env::var("RUST_BACKTRACE").is_ok() {
        eprintln!("{}", std::backtrace::Backtrace::capture());
    } else {
        eprintln!("Run with RUST_BACKTRACE=1 for a stack trace");
    }
}

fn context_lines(context: &AnalysisContext) -> Vec<String> {
    let mut lines = vec![match &context.phase {
        Some(phase) => format!("Phase: {phase}"),
        None => "Phase: (not set, crash occurred before analysis started)".to_string(),
    }];
    if let Some(service) = &context.service {
        lines.push(format!("Service: {service}"));
    }
    if let Some(api) = &context.current_api {
        lines.push(format!("API: {api}"));
    }
    lines
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}
