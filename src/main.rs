mod config;
mod logging;
mod ports;
mod reddit_rs;
mod services;
mod youtube_rs;

use std::path::PathBuf;

use chrono::Utc;
use clap::{Parser, Subcommand};
use color_eyre::{Result, eyre::WrapErr};
use reqwest::Client;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    config::Config,
    logging::init_tracing,
    ports::{auth::AuthProvider, clock::SystemClock},
    services::{
        reddit::RedditHttpAdapter,
        sync::{SyncOptions, SyncOrchestrator},
        youtube::{PlaylistService, client::YoutubeHttpAdapter, credentials::FileCredentialStore},
    },
    youtube_rs::auth::{
        GOOGLE_TOKEN_URL, StoredCredential, exchange_code_for_token, initiate_oauth,
        parse_authorization_code,
    },
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, global = true, env = "REDDIT_PLAYLIST_SYNC_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `info` or `reddit_playlist_sync=debug`
    #[arg(long, default_value = "info", global = true, env = "LOG_LEVEL")]
    log_level: String,

    /// OTLP gRPC endpoint to export traces to
    #[arg(long, global = true, env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    otlp_endpoint: Option<String>,

    /// Path to the OAuth credential file
    #[arg(long, global = true, env = "REDDIT_PLAYLIST_SYNC_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Defaults to `sync`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add today's feed videos to today's playlist
    Sync {
        /// Subreddit to read, repeatable. Overrides the configured sources
        #[arg(short, long = "source")]
        sources: Vec<String>,

        /// Only log what would be created or inserted
        #[arg(long)]
        dry_run: bool,
    },
    /// Authorize access to the YouTube account and store the credentials
    Authorize {
        #[arg(long, env = "YOUTUBE_CLIENT_ID")]
        client_id: String,

        #[arg(long, env = "YOUTUBE_CLIENT_SECRET")]
        client_secret: String,

        /// Redirect URI registered for the OAuth client
        #[arg(long, default_value = "http://127.0.0.1:8080")]
        redirect_uri: String,
    },
    /// List the playlists of the authorized account
    Playlists,
    /// Show title and channel for the given video ids
    Videos {
        #[arg(required = true)]
        ids: Vec<String>,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

fn load_config(path: Option<&PathBuf>) -> Result<(Config, Client)> {
    let config = match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
    .wrap_err("Failed to load reddit-playlist-sync config")?;
    let http = http_client(&config)?;
    Ok((config, http))
}

fn http_client(config: &Config) -> Result<Client> {
    Client::builder()
        .user_agent(&config.user_agent)
        .connect_timeout(config.connect_timeout())
        .timeout(config.request_timeout())
        .build()
        .wrap_err("Failed to build http client")
}

/// Resolves a credential up front so an unusable credential file stops the
/// run before any API call.
async fn playlist_service(
    config: &Config,
    credentials: Option<PathBuf>,
    http: Client,
) -> Result<PlaylistService<YoutubeHttpAdapter<FileCredentialStore>>> {
    let credentials_path = credentials.unwrap_or_else(|| config.credentials_path());
    tracing::debug!("Using credentials from {}", credentials_path.display());

    let auth = FileCredentialStore::new(credentials_path, http.clone());
    auth.credential()
        .await
        .wrap_err("Failed to obtain YouTube credentials")?;

    Ok(PlaylistService::new(YoutubeHttpAdapter::new(
        http,
        config.youtube_api_base_url()?,
        auth,
    )))
}

async fn run(args: Args) -> Result<()> {
    let command = args.command.unwrap_or(Commands::Sync {
        sources: Vec::new(),
        dry_run: false,
    });

    match command {
        Commands::Sync { sources, dry_run } => {
            let (config, http) = load_config(args.config.as_ref())?;
            let sources = if sources.is_empty() {
                config.sources.clone()
            } else {
                sources
            };

            let playlists = playlist_service(&config, args.credentials, http.clone()).await?;
            let feed = RedditHttpAdapter::new(http, config.feed_base_url()?);
            let options = SyncOptions {
                source_label: config.source_label(&sources),
                sources,
                privacy: config.privacy_status,
                dry_run,
                permalink_base: config.permalink_base.clone(),
            };

            let report = SyncOrchestrator::new(feed, playlists, SystemClock, options)
                .run()
                .await
                .wrap_err("Playlist sync aborted")?;

            if report.failed > 0 {
                tracing::warn!("{} videos could not be added", report.failed);
            }
        }
        Commands::Authorize {
            client_id,
            client_secret,
            redirect_uri,
        } => {
            let (config, http) = load_config(args.config.as_ref())?;
            let credentials_path = args
                .credentials
                .unwrap_or_else(|| config.credentials_path());
            let (request, session) = initiate_oauth(&client_id, &redirect_uri);

            println!("Open this URL in a browser and approve access:\n\n{}\n", request.auth_url);
            println!("Then paste the `code` parameter, or the whole URL you were redirected to:");

            let mut input = String::new();
            BufReader::new(tokio::io::stdin())
                .read_line(&mut input)
                .await
                .wrap_err("Failed to read authorization code")?;
            let code = parse_authorization_code(&input, &session.state)?;

            let token = exchange_code_for_token(
                &http,
                GOOGLE_TOKEN_URL,
                &client_id,
                &client_secret,
                &code,
                &session.code_verifier,
                &redirect_uri,
            )
            .await?;

            StoredCredential::from_token_response(
                token,
                client_id,
                client_secret,
                GOOGLE_TOKEN_URL.to_string(),
                Utc::now(),
            )?
            .save(&credentials_path)
            .await?;
            tracing::info!("Credentials saved to {}", credentials_path.display());
        }
        Commands::Playlists => {
            let (config, http) = load_config(args.config.as_ref())?;
            let playlists = playlist_service(&config, args.credentials, http).await?;
            for playlist in playlists.list_playlists().await? {
                println!("{}\t{}", playlist.id, playlist.title);
            }
        }
        Commands::Videos { ids } => {
            let (config, http) = load_config(args.config.as_ref())?;
            let playlists = playlist_service(&config, args.credentials, http).await?;
            for video in playlists.list_videos(&ids).await? {
                println!(
                    "{}\t{}\t{}",
                    video.id,
                    video.title,
                    video.channel_title.unwrap_or_default()
                );
            }
        }
        Commands::Config(ConfigCommands::CreateDefault) => {
            tracing::debug!("Creating default config");
            let path = Config::create_default()?;
            tracing::info!("Default config at {}", path.display());
        }
        Commands::Config(ConfigCommands::Path) => match Config::config_path() {
            Some(path) => println!("{}", path.display()),
            None => println!("No default config path found"),
        },
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let tracer_provider = init_tracing(
        env!("CARGO_PKG_NAME"),
        args.otlp_endpoint.as_deref(),
        &args.log_level,
    )?;

    tracing::debug!("reddit-playlist-sync starting");
    let result = run(args).await;

    if let Some(tracer_provider) = tracer_provider
        && let Err(error) = tracer_provider.shutdown()
    {
        eprintln!("Failed to flush traces: {}", error);
    }

    result
}
