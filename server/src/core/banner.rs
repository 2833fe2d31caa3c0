//! Startup banner and registry listing

use super::config::{AppConfig, DatabaseBackend, is_all_interfaces};
use super::constants::APP_NAME;
use crate::domain::analytics::catalog;

/// Print the startup banner with URLs and engine settings
pub fn print_banner(config: &AppConfig) {
    let host = config.server.host.as_str();
    let port = config.server.port;
    let display_host = if is_all_interfaces(host) {
        "localhost"
    } else {
        host
    };

    println!();
    println!(
        "  \x1b[1m\x1b[36m{}\x1b[0m \x1b[90mv{}\x1b[0m",
        APP_NAME,
        env!("CARGO_PKG_VERSION")
    );
    println!();

    // Label width: "Analyze:" plus padding
    const W: usize = 12;

    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/v1/admin/{{domain}}/analyze/{{metric}}",
        "Analyze:", display_host, port
    );
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}/api/docs",
        "Docs:", display_host, port
    );

    if is_all_interfaces(host)
        && let Ok(interfaces) = local_ip_address::list_afinet_netifas()
    {
        for (_, ip) in interfaces
            .iter()
            .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
        {
            println!(
                "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m http://{}:{}",
                "Network:", ip, port
            );
        }
    } else if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    }

    let database = match config.database.backend {
        DatabaseBackend::Postgres => "postgres".to_string(),
        DatabaseBackend::Sqlite => format!("sqlite {}", config.database.sqlite.path.display()),
    };
    println!("  \x1b[90m➜  {:<W$} {}\x1b[0m", "Database:", database);
    println!(
        "  \x1b[90m➜  {:<W$} {} overview, {}s deadline\x1b[0m",
        "Engine:",
        config.analytics.overview_policy,
        config.analytics.request_timeout_secs
    );
    println!();
}

/// Print every domain with its metric slugs and overview fields
pub fn print_catalog() {
    for domain in catalog() {
        let primary = domain
            .primary_scope
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "\x1b[1m{}\x1b[0m \x1b[90m(scopeNo: {})\x1b[0m",
            domain.domain, primary
        );
        for metric in &domain.metrics {
            let scopes: Vec<String> = metric.scopes.iter().map(|s| s.to_string()).collect();
            println!(
                "  {:<16} {:<28} {:<12} [{}]",
                metric.metric.slug(),
                metric.field,
                metric.table,
                scopes.join(", ")
            );
        }
        println!("  overview: {}", domain.overview_fields.join(", "));
        println!();
    }
}
