//! Startup banner and URL display

use super::config::is_all_interfaces;
use super::constants::{APP_NAME, MOVIES_PATH};

// Label width: "Network:" padded for alignment with "Catalog:"
const W: usize = 9;

/// Print the startup banner with URLs
pub fn print_banner(host: &str, port: u16, catalog_source: &str, record_count: usize) {
    // Use localhost for display when binding to all interfaces
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

    let movies_url = format!("http://{}:{}{}", display_host, port, MOVIES_PATH);
    println!(
        "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
        "Movies:",
        terminal_link(&movies_url)
    );

    if host == "127.0.0.1" || host == "localhost" {
        println!(
            "  \x1b[90m➜  {:<W$} use --host 0.0.0.0 to expose\x1b[0m",
            "Network:"
        );
    } else if is_all_interfaces(host) {
        if let Ok(interfaces) = local_ip_address::list_afinet_netifas() {
            for (_, ip) in interfaces
                .iter()
                .filter(|(_, ip)| ip.is_ipv4() && !ip.is_loopback())
            {
                let network_url = format!("http://{}:{}{}", ip, port, MOVIES_PATH);
                println!(
                    "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
                    "Network:",
                    terminal_link(&network_url)
                );
            }
        }
    } else {
        let network_url = format!("http://{}:{}{}", host, port, MOVIES_PATH);
        println!(
            "  \x1b[32m➜\x1b[0m  \x1b[1m{:<W$}\x1b[0m {}",
            "Network:",
            terminal_link(&network_url)
        );
    }

    println!(
        "  \x1b[90m➜  {:<W$} {} ({} movies)\x1b[0m",
        "Catalog:", catalog_source, record_count
    );
    println!();
}

/// Format a URL as a clickable terminal hyperlink if supported.
///
/// Uses OSC 8 escape sequences where the terminal understands them and
/// falls back to plain colored text otherwise.
fn terminal_link(url: &str) -> String {
    if supports_hyperlinks::on(supports_hyperlinks::Stream::Stdout) {
        format!("\x1b]8;;{}\x07\x1b[36m{}\x1b[0m\x1b]8;;\x07", url, url)
    } else {
        format!("\x1b[36m{}\x1b[0m", url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_link_keeps_url_and_color() {
        let url = "http://localhost:5390/api/v1/movies?title=matrix";
        let result = terminal_link(url);

        assert!(result.contains(url));
        assert!(result.contains("\x1b[36m"));
        if !result.contains("\x1b]8;;") {
            assert_eq!(result, format!("\x1b[36m{}\x1b[0m", url));
        } else {
            assert!(result.ends_with("\x1b]8;;\x07"));
        }
    }
}
