use clap::Parser;
use sheetsift_sheet::SerializeOptions;

/// Default cap on upload bodies (50 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

/// sheetsift-server - Upload a workbook, pick a sheet, search its rows
#[derive(Debug, Clone, Parser)]
#[command(name = "sheetsift-server")]
#[command(author, version, about = "HTTP API for searching spreadsheet sheets", long_about = None)]
pub struct ServerConfig {
    /// Interface to bind
    #[arg(long, default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    /// Largest accepted request body in bytes
    #[arg(long, value_name = "BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Emit every non-null value in search results as a string
    #[arg(long)]
    pub stringify: bool,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServerConfig {
    /// Socket address to bind, as `host:port`.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Serializer defaults for search responses.
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions::default().with_stringify(self.stringify)
    }

    /// Log filter used when RUST_LOG is not set.
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::try_parse_from(["sheetsift-server"]).unwrap();
        assert_eq!(config.addr(), "0.0.0.0:8000");
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(!config.serialize_options().stringify);
        assert_eq!(config.default_log_filter(), "info");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::try_parse_from([
            "sheetsift-server",
            "--host",
            "127.0.0.1",
            "-p",
            "9000",
            "--max-upload-bytes",
            "1024",
            "--stringify",
            "-v",
        ])
        .unwrap();

        assert_eq!(config.addr(), "127.0.0.1:9000");
        assert_eq!(config.max_upload_bytes, 1024);
        assert!(config.serialize_options().stringify);
        assert_eq!(config.default_log_filter(), "debug");
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(ServerConfig::try_parse_from(["sheetsift-server", "--port", "http"]).is_err());
    }
}
