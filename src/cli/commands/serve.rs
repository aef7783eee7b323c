//! Web server command.

use console::style;

use crate::config::Settings;

/// Port used when the bind address names only a host.
const DEFAULT_PORT: u16 = 8501;

/// Start the web server.
pub async fn cmd_serve(settings: &Settings) -> anyhow::Result<()> {
    let (host, port) = parse_bind_address(&settings.bind);

    let processor = match settings.create_processor() {
        Ok(processor) => processor,
        Err(e) => {
            eprintln!("{} {}", style("✗").red(), e);
            std::process::exit(1);
        }
    };

    println!(
        "{} Starting groundqa upload page at http://{}:{}",
        style("→").cyan(),
        host,
        port
    );
    println!("  Press Ctrl+C to stop");

    crate::server::serve(processor, settings.output.clone(), &host, port).await
}

/// Parse a bind address that can be:
/// - Just a port: "8501" -> 127.0.0.1:8501
/// - Just a host: "0.0.0.0" -> 0.0.0.0:8501
/// - Host and port: "0.0.0.0:8501" -> 0.0.0.0:8501
fn parse_bind_address(bind: &str) -> (String, u16) {
    if let Ok(port) = bind.parse::<u16>() {
        return ("127.0.0.1".to_string(), port);
    }

    if let Some((host, port_str)) = bind.rsplit_once(':') {
        if let Ok(port) = port_str.parse::<u16>() {
            return (host.to_string(), port);
        }
    }

    (bind.to_string(), DEFAULT_PORT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bind_address() {
        assert_eq!(parse_bind_address("9000"), ("127.0.0.1".to_string(), 9000));
        assert_eq!(parse_bind_address("0.0.0.0"), ("0.0.0.0".to_string(), 8501));
        assert_eq!(
            parse_bind_address("192.168.1.5:8080"),
            ("192.168.1.5".to_string(), 8080)
        );
        assert_eq!(
            parse_bind_address("localhost"),
            ("localhost".to_string(), 8501)
        );
    }
}
