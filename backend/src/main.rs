//! Backend entry-point: parses configuration, initialises logging, and runs
//! the HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use tablemap::server::{ServerConfig, create_server};

/// Restaurant registration and map-browsing service.
#[derive(Parser, Debug)]
#[command(name = "tablemap", version, about)]
struct Cli {
    /// Socket address to bind.
    #[arg(long, env = "TABLEMAP_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Directory holding the CSV datasets.
    #[arg(long, env = "TABLEMAP_DATA_DIR", default_value = "csv_files")]
    data_dir: PathBuf,

    /// Directory stored images are written to and served from.
    #[arg(long, env = "TABLEMAP_IMAGE_DIR", default_value = "static/images")]
    image_dir: PathBuf,

    /// File holding the session signing key material.
    #[arg(
        long,
        env = "SESSION_KEY_FILE",
        default_value = "/var/run/secrets/session_key"
    )]
    session_key_file: PathBuf,

    /// Set the Secure attribute on the session cookie.
    #[arg(
        long,
        env = "SESSION_COOKIE_SECURE",
        default_value_t = true,
        action = clap::ArgAction::Set
    )]
    cookie_secure: bool,

    /// Allow an ephemeral session key when the key file is unreadable.
    /// Sessions then expire on every restart; never use this in production.
    #[arg(long, env = "SESSION_ALLOW_EPHEMERAL", default_value_t = false)]
    allow_ephemeral_key: bool,
}

fn load_session_key(cli: &Cli) -> std::io::Result<Key> {
    match std::fs::read(&cli.session_key_file) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(err) => {
            if cfg!(debug_assertions) || cli.allow_ephemeral_key {
                warn!(
                    path = %cli.session_key_file.display(),
                    error = %err,
                    "using temporary session key (dev only)"
                );
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {}: {err}",
                    cli.session_key_file.display()
                )))
            }
        }
    }
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let cli = Cli::parse();

    if let Err(err) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %err, "tracing init failed");
    }

    let key = load_session_key(&cli)?;
    let config = ServerConfig::new(key, cli.cookie_secure, SameSite::Lax, cli.bind)
        .with_data_dir(cli.data_dir)
        .with_image_dir(cli.image_dir);

    create_server(config)?.await
}
