use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use std::path::PathBuf;

use crate::feed::share::ShareTarget;

#[derive(Parser, Debug)]
#[command(name = "sharefeed", about = "A social post sharing server")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Browse the feed of a running server from the terminal
    Browse(BrowseArgs),
}

#[derive(Args, Debug, Clone)]
pub struct BrowseArgs {
    /// Base URL of the server
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    pub url: String,

    /// Only show posts of this type ("text", "image" or "all")
    #[arg(long = "type")]
    pub kind: Option<String>,

    /// Only show posts with this tag ("all" for every tag)
    #[arg(long)]
    pub tag: Option<String>,

    /// Page of the filtered feed to show
    #[arg(long, default_value_t = 1)]
    pub page: usize,

    /// Cards per page
    #[arg(long, default_value_t = 8)]
    pub per_page: usize,

    /// How many posts to fetch from the server
    #[arg(long, default_value_t = 100)]
    pub limit: u32,

    /// Print the clipboard text for this post id
    #[arg(long)]
    pub copy: Option<i64>,

    /// Print a share link for the post given by --post
    #[arg(long, value_enum, requires = "post")]
    pub share: Option<ShareTarget>,

    /// Post id used by --share
    #[arg(long)]
    pub post: Option<i64>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub feed: FeedConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub path: Option<PathBuf>,
    pub max_upload_mb: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    pub cookie_name: String,
    pub session_hours: u64,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FeedConfig {
    /// Page size used when `/all-posts` is called without a usable `limit`
    pub default_limit: u32,
    /// Upper bound applied to `limit`; unset leaves it uncapped
    pub max_limit: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_upload_mb: 10,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            cookie_name: "sharefeed_session".to_string(),
            session_hours: 720,
        }
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            default_limit: 5,
            max_limit: None,
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }

        config.resolve_paths(&data_dir);
        Ok(config)
    }

    /// Fill unset storage locations with defaults under `data_dir`.
    pub fn resolve_paths(&mut self, data_dir: &std::path::Path) {
        if self.database.path.is_none() {
            self.database.path = Some(data_dir.join("sharefeed.db"));
        }
        if self.storage.path.is_none() {
            self.storage.path = Some(data_dir.join("uploads"));
        }
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".sharefeed")
        })
    }

    pub fn db_path(&self) -> PathBuf {
        self.database
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("sharefeed.db"))
    }

    pub fn uploads_path(&self) -> PathBuf {
        self.storage
            .path
            .clone()
            .unwrap_or_else(|| PathBuf::from("uploads"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_for(data_dir: PathBuf) -> Cli {
        Cli {
            config: None,
            host: None,
            port: None,
            data_dir: Some(data_dir),
            command: None,
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.auth.cookie_name, "sharefeed_session");
        assert_eq!(config.auth.session_hours, 720);
        assert_eq!(config.feed.default_limit, 5);
        assert!(config.feed.max_limit.is_none());
        assert_eq!(config.storage.max_upload_mb, 10);
        assert!(config.database.path.is_none());
        assert!(config.storage.path.is_none());
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli_for(PathBuf::from("/tmp/test-sharefeed"));
        assert_eq!(Config::data_dir(&cli), PathBuf::from("/tmp/test-sharefeed"));
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli_for(tmp.path().to_path_buf())).unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.db_path(), tmp.path().join("sharefeed.db"));
        assert_eq!(config.uploads_path(), tmp.path().join("uploads"));
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000

[feed]
default_limit = 10
max_limit = 50

[auth]
cookie_name = "my_cookie"
"#,
        )
        .unwrap();

        let mut cli = cli_for(tmp.path().to_path_buf());
        cli.config = Some(config_path);
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.feed.default_limit, 10);
        assert_eq!(config.feed.max_limit, Some(50));
        assert_eq!(config.auth.cookie_name, "my_cookie");
        assert_eq!(config.auth.session_hours, 720);
    }

    #[test]
    fn cli_overrides_beat_toml_values() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            host: Some("10.0.0.1".to_string()),
            port: Some(4000),
            data_dir: Some(tmp.path().to_path_buf()),
            command: None,
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn browse_subcommand_parses() {
        let cli = Cli::parse_from([
            "sharefeed",
            "browse",
            "--type",
            "image",
            "--page",
            "2",
            "--share",
            "twitter",
            "--post",
            "7",
        ]);
        match cli.command {
            Some(Command::Browse(args)) => {
                assert_eq!(args.kind.as_deref(), Some("image"));
                assert_eq!(args.page, 2);
                assert_eq!(args.per_page, 8);
                assert_eq!(args.share, Some(ShareTarget::Twitter));
                assert_eq!(args.post, Some(7));
            }
            other => panic!("expected browse, got {:?}", other),
        }
    }
}
