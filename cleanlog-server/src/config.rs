//! cleanlog-server configuration
//!
//! Precedence: command-line flag > environment variable > TOML file > default.
//! clap handles the first two; the TOML `[mail]` table fills whatever mail
//! settings are still unset.

use chrono::NaiveTime;
use clap::Parser;
use cleanlog_common::config::load_optional_toml;
use cleanlog_common::time::parse_wall_clock;
use cleanlog_common::{Error, Result};
use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

/// Default wall-clock time of the daily report
pub const DEFAULT_REPORT_TIME: &str = "18:00";

/// Default interval between WebSocket update messages
pub const DEFAULT_WS_INTERVAL_SECS: u64 = 10;

/// Command-line arguments for cleanlog-server
#[derive(Parser, Debug, Clone)]
#[command(name = "cleanlog-server")]
#[command(about = "Cleaning record backend: REST API, uploads, WebSocket updates and daily report")]
#[command(version)]
pub struct Args {
    /// Address to bind
    #[arg(long, default_value = "0.0.0.0", env = "BIND_ADDR")]
    pub bind: IpAddr,

    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "PORT")]
    pub port: u16,

    /// SQLite database URL
    #[arg(long, default_value = "sqlite://cleanlog.db", env = "DATABASE_URL")]
    pub database_url: String,

    /// Directory uploaded photos are written to and served from
    #[arg(long, default_value = "uploads", env = "UPLOADS_DIR")]
    pub uploads_dir: PathBuf,

    /// Directory of static pages (login.html, dashboards)
    #[arg(long, default_value = "public", env = "PUBLIC_DIR")]
    pub public_dir: PathBuf,

    /// Seconds between WebSocket update messages
    #[arg(long, default_value_t = DEFAULT_WS_INTERVAL_SECS, env = "WS_INTERVAL_SECS")]
    pub ws_interval_secs: u64,

    /// TOML config file with a [mail] table
    #[arg(short, long, env = "CLEANLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// SMTP relay host
    #[arg(long, env = "SMTP_HOST")]
    pub smtp_host: Option<String>,

    /// SMTP relay port (465 = implicit TLS, anything else = STARTTLS)
    #[arg(long, env = "SMTP_PORT")]
    pub smtp_port: Option<u16>,

    #[arg(long, env = "SMTP_USER")]
    pub smtp_user: Option<String>,

    #[arg(long, env = "SMTP_PASS", hide_env_values = true)]
    pub smtp_pass: Option<String>,

    /// Sender address of the daily report
    #[arg(long, env = "REPORT_FROM")]
    pub report_from: Option<String>,

    /// Recipient of the daily report
    #[arg(long, env = "REPORT_TO")]
    pub report_to: Option<String>,

    /// Local time the daily report is sent (HH:MM)
    #[arg(long, env = "REPORT_TIME")]
    pub report_time: Option<String>,
}

/// Contents of the optional TOML config file
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub mail: MailFileConfig,
}

#[derive(Debug, Default, Deserialize)]
pub struct MailFileConfig {
    pub smtp_host: Option<String>,
    pub smtp_port: Option<u16>,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub report_from: Option<String>,
    pub report_to: Option<String>,
    pub report_time: Option<String>,
}

/// Resolved server configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub uploads_dir: PathBuf,
    pub public_dir: PathBuf,
    pub ws_interval: Duration,
    /// None when the mail relay or recipient is not configured
    pub mail: Option<MailConfig>,
}

/// SMTP relay and daily report settings
#[derive(Clone)]
pub struct MailConfig {
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_pass: Option<String>,
    pub from: String,
    pub to: String,
    pub report_time: NaiveTime,
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("smtp_host", &self.smtp_host)
            .field("smtp_port", &self.smtp_port)
            .field("smtp_user", &self.smtp_user)
            .field("smtp_pass", &self.smtp_pass.as_ref().map(|_| "***"))
            .field("from", &self.from)
            .field("to", &self.to)
            .field("report_time", &self.report_time)
            .finish()
    }
}

impl Config {
    /// Parse flags/environment and merge the config file
    pub fn load() -> Result<Self> {
        let args = Args::parse();
        let file: FileConfig = load_optional_toml(args.config.as_deref())?;
        Self::from_sources(args, file)
    }

    pub fn from_sources(args: Args, file: FileConfig) -> Result<Self> {
        if args.ws_interval_secs == 0 {
            return Err(Error::Config("ws_interval_secs must be at least 1".to_string()));
        }

        let mail = resolve_mail(&args, file.mail)?;

        Ok(Self {
            bind_addr: SocketAddr::new(args.bind, args.port),
            database_url: args.database_url,
            uploads_dir: args.uploads_dir,
            public_dir: args.public_dir,
            ws_interval: Duration::from_secs(args.ws_interval_secs),
            mail,
        })
    }
}

fn resolve_mail(args: &Args, file: MailFileConfig) -> Result<Option<MailConfig>> {
    let smtp_host = args.smtp_host.clone().or(file.smtp_host);
    let to = args.report_to.clone().or(file.report_to);

    let (Some(smtp_host), Some(to)) = (smtp_host, to) else {
        return Ok(None);
    };

    let smtp_user = args.smtp_user.clone().or(file.smtp_user);
    let from = args
        .report_from
        .clone()
        .or(file.report_from)
        .or_else(|| smtp_user.clone())
        .ok_or_else(|| Error::Config("report_from (or smtp_user) is required to send mail".to_string()))?;

    let time_text = args
        .report_time
        .clone()
        .or(file.report_time)
        .unwrap_or_else(|| DEFAULT_REPORT_TIME.to_string());
    let report_time = parse_wall_clock(&time_text)
        .ok_or_else(|| Error::Config(format!("Invalid report_time '{}', expected HH:MM", time_text)))?;

    Ok(Some(MailConfig {
        smtp_host,
        smtp_port: args.smtp_port.or(file.smtp_port).unwrap_or(587),
        smtp_user,
        smtp_pass: args.smtp_pass.clone().or(file.smtp_pass),
        from,
        to,
        report_time,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    /// Parse flags with every env binding removed, so PORT, SMTP_HOST and
    /// friends set on the test machine cannot leak in
    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["cleanlog-server"];
        argv.extend_from_slice(extra);
        let matches = Args::command()
            .mut_args(|arg| arg.env(None::<&'static str>))
            .try_get_matches_from(argv)
            .unwrap();
        Args::from_arg_matches(&matches).unwrap()
    }

    #[test]
    fn test_environment_binds_only_outside_test_parsing() {
        std::env::set_var("WS_INTERVAL_SECS", "42");
        let from_env = Args::try_parse_from(["cleanlog-server"]).unwrap();
        let isolated = args(&[]);
        std::env::remove_var("WS_INTERVAL_SECS");

        assert_eq!(from_env.ws_interval_secs, 42);
        assert_eq!(isolated.ws_interval_secs, DEFAULT_WS_INTERVAL_SECS);
    }

    #[test]
    fn test_defaults_without_mail() {
        let config = Config::from_sources(args(&[]), FileConfig::default()).unwrap();

        assert_eq!(config.bind_addr.port(), 3000);
        assert_eq!(config.uploads_dir, PathBuf::from("uploads"));
        assert_eq!(config.ws_interval, Duration::from_secs(10));
        assert!(config.mail.is_none());
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            mail: MailFileConfig {
                smtp_host: Some("file.example".to_string()),
                smtp_port: Some(465),
                report_from: Some("bot@example.com".to_string()),
                report_to: Some("file@example.com".to_string()),
                report_time: Some("07:30".to_string()),
                ..MailFileConfig::default()
            },
        };
        let config = Config::from_sources(
            args(&["--smtp-host", "flag.example", "--report-to", "boss@example.com"]),
            file,
        )
        .unwrap();

        let mail = config.mail.unwrap();
        assert_eq!(mail.smtp_host, "flag.example");
        assert_eq!(mail.smtp_port, 465);
        assert_eq!(mail.to, "boss@example.com");
        assert_eq!(mail.from, "bot@example.com");
        assert_eq!(mail.report_time, NaiveTime::from_hms_opt(7, 30, 0).unwrap());
    }

    #[test]
    fn test_sender_falls_back_to_smtp_user() {
        let config = Config::from_sources(
            args(&["--smtp-host", "relay", "--smtp-user", "me@example.com", "--report-to", "boss@example.com"]),
            FileConfig::default(),
        )
        .unwrap();

        let mail = config.mail.unwrap();
        assert_eq!(mail.from, "me@example.com");
        assert_eq!(mail.smtp_port, 587);
        assert_eq!(mail.report_time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
    }

    #[test]
    fn test_invalid_report_time_rejected() {
        let result = Config::from_sources(
            args(&["--smtp-host", "relay", "--report-to", "a@b.c", "--report-from", "x@b.c", "--report-time", "late"]),
            FileConfig::default(),
        );
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_file_config_parses_mail_table() {
        let parsed: FileConfig = toml_from_str(
            r#"
            [mail]
            smtp_host = "smtp.example.com"
            report_to = "office@example.com"
            "#,
        );
        assert_eq!(parsed.mail.smtp_host.as_deref(), Some("smtp.example.com"));
        assert_eq!(parsed.mail.report_to.as_deref(), Some("office@example.com"));
    }

    fn toml_from_str(s: &str) -> FileConfig {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        std::io::Write::write_all(&mut file, s.as_bytes()).unwrap();
        cleanlog_common::config::load_toml_file(file.path()).unwrap()
    }
}
