//! odet command-line client.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use odet_client::InferenceClient;
use odet_models::{ModelId, Upload};
use odet_presets::{ConfigStore, JsonFileStorage};
use odet_session::{DetectionSession, Phase, SessionConfig, Submission};

const USAGE: &str = "\
Usage:
  odet health
  odet models
  odet detect <file> [model] [preset-id]
  odet presets list
  odet presets save <name>
  odet presets delete <id>";

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenvy::dotenv().ok();

    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args).await {
        error!("{:#}", e);
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

/// Colored output for dev, JSON when `LOG_FORMAT=json`.
fn init_tracing() {
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("odet=info,warn"));

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .with(env_filter)
            .init();
    }
}

async fn run(args: &[String]) -> Result<()> {
    let config = SessionConfig::from_env();
    info!("Session config: {:?}", config);

    let command: Vec<&str> = args.iter().map(String::as_str).collect();
    match command.as_slice() {
        ["health"] => health(&config).await,
        ["models"] => models(&config).await,
        ["detect", file, rest @ ..] if rest.len() <= 2 => {
            detect(&config, file, rest.first().copied(), rest.get(1).copied()).await
        }
        ["presets", "list"] => {
            let store = load_presets(&config);
            print_json(&store.presets())
        }
        ["presets", "save", name] => {
            let mut store = load_presets(&config);
            let preset = store.save_preset(name)?;
            print_json(&preset)
        }
        ["presets", "delete", id] => {
            let mut store = load_presets(&config);
            let preset = store.delete_preset(id)?;
            println!("Deleted preset {} ({})", preset.id, preset.name);
            Ok(())
        }
        _ => bail!("unrecognized command\n{}", USAGE),
    }
}

async fn health(config: &SessionConfig) -> Result<()> {
    let client = InferenceClient::new(config.client.clone())?;
    let status = client
        .health_check()
        .await
        .context("inference service is unreachable")?;
    print_json(&status)?;

    if !status.is_healthy() {
        bail!("inference service reports status {:?}", status.status);
    }
    Ok(())
}

async fn models(config: &SessionConfig) -> Result<()> {
    let session = DetectionSession::from_config(config)?;
    print_json(&session.models().await?)
}

async fn detect(
    config: &SessionConfig,
    file: &str,
    model: Option<&str>,
    preset_id: Option<&str>,
) -> Result<()> {
    let upload = Upload::from_path(Path::new(file))
        .with_context(|| format!("failed to read {}", file))?;

    let client = Arc::new(InferenceClient::new(config.client.clone())?);
    let store = load_presets(config);
    if let Some(id) = preset_id {
        store.select_preset_by_id(id)?;
    }

    let mut session = DetectionSession::new(
        client.clone(),
        client.clone(),
        store,
        config.poller.clone(),
        config.default_model.clone(),
    );
    if let Some(model) = model {
        session.select_model(ModelId::new(model));
    }

    info!(
        file = %file,
        model = %session.model(),
        "Submitting {} ({} bytes)",
        upload.content_type,
        upload.len()
    );

    let state = match session.submit_upload(upload).await? {
        Submission::Applied(state) => state,
        Submission::Superseded => bail!("submission was superseded"),
    };
    if state.phase != Phase::Success {
        bail!("detection did not succeed");
    }

    print_json(&state)?;
    for url in [&state.result_image_url, &state.result_video_url]
        .into_iter()
        .flatten()
    {
        println!("{}", client.media_url(url)?);
    }
    Ok(())
}

fn load_presets(config: &SessionConfig) -> ConfigStore {
    ConfigStore::load(Arc::new(JsonFileStorage::new(config.presets_dir.clone())))
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
