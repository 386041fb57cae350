use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use classify_gateway::client::{render, HttpTransport, PreviewRegistry, Session, UploadFile};
use classify_gateway::config::ClientConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Send one image through the gateway and print the classification.
#[derive(Debug, Parser)]
#[command(name = "classify", version)]
struct Args {
    /// Image to classify.
    file: PathBuf,

    /// Declared content type; guessed from the extension when omitted.
    #[arg(long)]
    mime: Option<String>,

    /// Gateway base URL, absolute or relative to --origin.
    #[arg(long, env = "BACKEND_URL")]
    backend_url: Option<String>,

    /// Origin that relative base URLs are resolved against.
    #[arg(long, default_value = "http://127.0.0.1:4000")]
    origin: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let args = Args::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base) = &args.backend_url {
        config = config.with_api_base(base);
    }

    let transport = HttpTransport::new(config.endpoint(&args.origin, "/predict"));
    let file = UploadFile::from_path(&args.file, args.mime.as_deref())
        .with_context(|| format!("reading {}", args.file.display()))?;

    let mut session = Session::new(config, PreviewRegistry::new());
    if session.select(file).is_ok() {
        println!("{}\n", render(&session));
        // The outcome is recorded in the session and rendered below.
        let _ = session.submit(&transport).await;
    }
    println!("{}", render(&session));

    Ok(if session.error().is_some() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
