use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::config::ZendeskConfig;
use crate::error::BridgeError;
use crate::models::ticket::TicketPayload;

/// `POST /api/v2/tickets` with the `{ "ticket": … }` wrapper Zendesk expects.
#[derive(Debug, Serialize)]
pub struct CreateTicketRequest {
    pub ticket: TicketPayload,
}

impl CreateTicketRequest {
    pub fn new(ticket: TicketPayload) -> Self {
        Self { ticket }
    }

    /// Submits the ticket and relays Zendesk's JSON answer verbatim.
    ///
    /// Non-2xx answers keep their body text so operators can see what the
    /// account rejected. At most one attempt; there is no retry.
    pub async fn submit(&self, zendesk: &ZendeskConfig) -> Result<Value, BridgeError> {
        let client = Client::new();
        let url = format!("{}/api/v2/tickets", zendesk.endpoint.trim_end_matches('/'));

        info!("Zendesk request URL: {}", url);
        debug!("Zendesk request: {:?}", self);

        let response = client
            .post(&url)
            .json(&self)
            .basic_auth(&zendesk.user, Some(&zendesk.token))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BridgeError::Upstream { status, body });
        }

        serde_json::from_str(&body).map_err(|source| {
            error!("unparseable ticket response: {source}");
            BridgeError::Upstream { status, body }
        })
    }
}

/// `POST /api/v2/uploads.json`: raw bytes in, opaque upload token out.
#[derive(Debug)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    upload: Upload,
}

#[derive(Debug, Deserialize)]
struct Upload {
    token: String,
    attachment: Attachment,
}

#[derive(Debug, Deserialize)]
struct Attachment {
    url: String,
}

impl UploadRequest {
    pub async fn submit(self, zendesk: &ZendeskConfig) -> Result<String, BridgeError> {
        let client = Client::new();
        let url = format!(
            "{}/api/v2/uploads.json",
            zendesk.endpoint.trim_end_matches('/')
        );

        info!("Zendesk request URL: {} (filename: {})", url, self.file_name);

        let response = client
            .post(&url)
            .query(&[("filename", self.file_name.as_str())])
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .basic_auth(&zendesk.user, Some(&zendesk.token))
            .body(self.bytes)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(BridgeError::Upstream { status, body });
        }

        let parsed: UploadResponse = {
            let mut deserializer = serde_json::Deserializer::from_str(&body);
            serde_path_to_error::deserialize(&mut deserializer).map_err(|source| {
                error!("unexpected upload response shape: {source}");
                BridgeError::Upstream {
                    status,
                    body: body.clone(),
                }
            })?
        };

        info!("attachment stored at {}", parsed.upload.attachment.url);
        Ok(parsed.upload.token)
    }
}
