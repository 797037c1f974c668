use crate::{CliClientResult, ClientError};

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client as ReqwestClient, StatusCode};

/// Multipart field the service reads the executable from
pub const UPLOAD_FIELD: &str = "uploadfile";

/// HTTP client for the su-service API
pub struct Client {
    pub base_url: String,
    client: ReqwestClient,
}

/// Status and text body of a service response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ServerResponse {
    /// e.g. `200 OK`
    pub fn status_line(&self) -> String {
        self.status.to_string()
    }
}

impl Client {
    /// Client for the service at `host:port`
    pub fn new(host: &str, port: u16) -> Self {
        Self::with_base_url(&format!("http://{host}:{port}"))
    }

    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: ReqwestClient::new(),
        }
    }

    pub fn update_url(&self, reboot: bool) -> String {
        let url = format!("{}/api/v1/update/self", self.base_url);
        if reboot {
            url
        } else {
            format!("{url}?reboot=false")
        }
    }

    /// Upload `file` as the service's new executable.
    ///
    /// One POST, no retry. Non-success statuses are returned, not errors.
    pub async fn update_self(&self, file: &Path, reboot: bool) -> CliClientResult<ServerResponse> {
        let content = tokio::fs::read(file)
            .await
            .map_err(|e| ClientError::io(file, e))?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ClientError::validation(format!("{} is not a file", file.display()))
            })?;

        let part = Part::bytes(content)
            .file_name(file_name)
            .mime_str("application/octet-stream")?;
        let form = Form::new().part(UPLOAD_FIELD, part);

        let response = self
            .client
            .post(self.update_url(reboot))
            .multipart(form)
            .send()
            .await?;

        Self::read(response).await
    }

    /// GET /api/v1/version
    pub async fn version(&self) -> CliClientResult<ServerResponse> {
        let response = self
            .client
            .get(format!("{}/api/v1/version", self.base_url))
            .send()
            .await?;

        Self::read(response).await
    }

    async fn read(response: reqwest::Response) -> CliClientResult<ServerResponse> {
        let status = response.status();
        let body = response.text().await?;
        Ok(ServerResponse { status, body })
    }
}
