mod config;
mod error;
mod models;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::{get, post},
};
use clap::Parser;
use serde::Serialize;
use serde_json::Value;
use std::{net::SocketAddr, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::ZendeskConfig;
use error::BridgeError;
use models::submission::{Submission, validate_submission};
use models::ticket::{TicketFields, TicketPayload};
use models::zendesk_api::{CreateTicketRequest, UploadRequest};

/// Generous ceiling for screenshot uploads.
const UPLOAD_BODY_LIMIT: usize = 25 * 1024 * 1024;

/// ----------------------------------------------------------------------
/// 1  Command-line arguments
/// ----------------------------------------------------------------------
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, env = "BRIDGE_CONFIG", default_value = "config.yml")]
    config: String,

    /// Port (default 8000)
    #[arg(short, long, default_value_t = 8000)]
    port: u16,
}

/// ----------------------------------------------------------------------
/// 2  Shared app state
/// ----------------------------------------------------------------------
struct AppState {
    zendesk: ZendeskConfig,
    fields: TicketFields,
    recaptcha_site_key: String,
}

/// ----------------------------------------------------------------------
/// 3  Program start
/// ----------------------------------------------------------------------
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // a) logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // b) CLI
    let cli = Cli::parse();

    // c) configuration and state
    config::init(&cli.config)?;
    let loaded = config::get();
    let state = Arc::new(AppState {
        zendesk: loaded.zendesk.clone(),
        fields: loaded.fields.clone(),
        recaptcha_site_key: loaded.recaptcha.site_key.clone(),
    });

    // d) router
    let app = router(state);

    // e) server
    let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
    info!("Listening on http://{addr}/api/{{form, upload, config}}");
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/form", post(submit_form))
        .route(
            "/api/upload",
            post(upload_attachment).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/config", get(client_config))
        .route("/health", get(health))
        .with_state(state)
}

/// ----------------------------------------------------------------------
/// 4  Handlers
/// ----------------------------------------------------------------------
#[tracing::instrument(skip_all, fields(form_id = %submission.form_id))]
async fn submit_form(
    State(state): State<Arc<AppState>>,
    Json(submission): Json<Submission>,
) -> Result<Json<Value>, BridgeError> {
    let variant = validate_submission(&submission, &state.fields)?;
    let ticket = TicketPayload::from_submission(&submission, variant, &state.fields)?;

    let created = CreateTicketRequest::new(ticket)
        .submit(&state.zendesk)
        .await?;
    info!("ticket created");
    Ok(Json(created))
}

/// Accepts one file part, plus an optional `name` text part that overrides
/// the stored file name, and trades the bytes for a Zendesk upload token.
#[tracing::instrument(skip_all)]
async fn upload_attachment(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<UploadCreated>, BridgeError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut display_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| BridgeError::InvalidUpload("malformed multipart body"))?
    {
        let part = field.name().unwrap_or_default().to_string();
        if part == "name" {
            display_name = Some(
                field
                    .text()
                    .await
                    .map_err(|_| BridgeError::InvalidUpload("unreadable name part"))?,
            );
        } else if file.is_none() {
            let file_name = field
                .file_name()
                .map(str::to_string)
                .unwrap_or_else(|| "attachment".to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|_| BridgeError::InvalidUpload("unreadable file part"))?;
            file = Some((file_name, bytes.to_vec()));
        }
    }

    let Some((file_name, bytes)) = file else {
        return Err(BridgeError::InvalidUpload("missing file part"));
    };

    let upload = UploadRequest {
        file_name: display_name.unwrap_or(file_name),
        bytes,
    };
    let token = upload.submit(&state.zendesk).await?;
    Ok(Json(UploadCreated { token }))
}

#[derive(Debug, Serialize)]
struct UploadCreated {
    token: String,
}

/// The public half of the runtime configuration; secrets stay server-side.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ClientConfig {
    recaptcha_site_key: String,
}

async fn client_config(State(state): State<Arc<AppState>>) -> Json<ClientConfig> {
    Json(ClientConfig {
        recaptcha_site_key: state.recaptcha_site_key.clone(),
    })
}

async fn health() -> &'static str {
    "ok"
}
