//! HTTP transport against the CMS REST API (blocking `reqwest`)

use std::path::Path;
use std::time::Duration;

use reqwest::blocking::{multipart, Client, RequestBuilder, Response};
use serde::Deserialize;

use crate::domain::entities::{BuildId, BuildStatus};
use crate::domain::ports::{Transport, UploadOptions};
use crate::error::{BuildError, SyncError, TransportError};

const FILE_MAPPER: &str = "content/filemapper/v1";
const PROJECTS: &str = "dfs/v1/projects";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Error body returned by the API
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ApiErrorBody {
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    sub_category: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProvisionResponse {
    build_id: u64,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    status: String,
}

/// Blocking HTTP client for one API base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    api_base: String,
    access_token: Option<String>,
}

impl HttpTransport {
    pub fn new(api_base: &str, access_token: Option<String>) -> Result<Self, SyncError> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("cmsync/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            access_token,
        })
    }

    /// Absolute URL for an API path. Remote paths are appended segment-wise so
    /// leading slashes never produce `//`.
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path.trim_start_matches('/'))
    }

    fn authorize(&self, request: RequestBuilder, account_id: u64) -> RequestBuilder {
        let request = request.query(&[("portalId", account_id)]);
        match &self.access_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, TransportError> {
        let response = request
            .send()
            .map_err(|e| TransportError::Network(e.to_string()))?;
        if response.status().is_success() {
            return Ok(response);
        }
        Err(api_error(response))
    }

    fn project_url(&self, project: &str, rest: &str) -> String {
        self.url(&format!("{}/{}/{}", PROJECTS, encode_segment(project), rest))
    }
}

impl Transport for HttpTransport {
    fn upload(
        &self,
        account_id: u64,
        local_path: &Path,
        remote_path: &str,
        options: &UploadOptions,
    ) -> Result<(), TransportError> {
        let form = multipart::Form::new()
            .file("file", local_path)
            .map_err(|e| TransportError::LocalFile {
                path: local_path.to_path_buf(),
                message: e.to_string(),
            })?;
        let url = self.url(&format!("{}/upload/{}", FILE_MAPPER, encode_path(remote_path)));
        let request = self
            .client
            .post(url)
            .query(&[("buffer", options.mode.is_buffered())])
            .multipart(form);

        self.send(self.authorize(request, account_id))?;
        Ok(())
    }

    fn delete(&self, account_id: u64, remote_path: &str) -> Result<(), TransportError> {
        let url = self.url(&format!("{}/delete/{}", FILE_MAPPER, encode_path(remote_path)));
        self.send(self.authorize(self.client.delete(url), account_id))?;
        Ok(())
    }

    fn provision_build(&self, account_id: u64, project: &str) -> Result<BuildId, BuildError> {
        let url = self.project_url(project, "builds/staged/provision");
        let response = self
            .send(self.authorize(self.client.post(url), account_id))
            .map_err(|e| BuildError::from_provision(project, e))?;
        let body: ProvisionResponse = response.json().map_err(|e| BuildError::Provision {
            project: project.to_string(),
            source: TransportError::InvalidResponse(e.to_string()),
        })?;
        Ok(BuildId(body.build_id))
    }

    fn upload_to_build(
        &self,
        account_id: u64,
        project: &str,
        build_id: BuildId,
        local_path: &Path,
        remote_path: &str,
    ) -> Result<(), TransportError> {
        let form = multipart::Form::new()
            .file("file", local_path)
            .map_err(|e| TransportError::LocalFile {
                path: local_path.to_path_buf(),
                message: e.to_string(),
            })?;
        let url = self.project_url(
            project,
            &format!("builds/staged/{}/files/{}", build_id.0, encode_path(remote_path)),
        );
        let request = self.client.post(url).multipart(form);
        self.send(self.authorize(request, account_id))?;
        Ok(())
    }

    fn queue_build(
        &self,
        account_id: u64,
        project: &str,
        build_id: BuildId,
    ) -> Result<(), BuildError> {
        let url = self.project_url(project, &format!("builds/staged/{}/queue", build_id.0));
        self.send(self.authorize(self.client.post(url), account_id))
            .map_err(|e| BuildError::from_queue(project, build_id.0, e))?;
        Ok(())
    }

    fn build_status(
        &self,
        account_id: u64,
        project: &str,
        build_id: BuildId,
    ) -> Result<BuildStatus, BuildError> {
        let url = self.project_url(project, &format!("builds/{}/status", build_id.0));
        let poll_error = |source| BuildError::Poll {
            build_id: build_id.0,
            source,
        };
        let response = self
            .send(self.authorize(self.client.get(url), account_id))
            .map_err(poll_error)?;
        let body: StatusResponse = response
            .json()
            .map_err(|e| poll_error(TransportError::InvalidResponse(e.to_string())))?;
        Ok(BuildStatus::parse(&body.status))
    }
}

/// Turn a non-success response into a `TransportError::Api`
fn api_error(response: Response) -> TransportError {
    let status = response.status();
    let text = response.text().unwrap_or_default();
    let body: ApiErrorBody = serde_json::from_str(&text).unwrap_or_default();
    let message = body.message.unwrap_or_else(|| {
        if text.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("request failed")
                .to_string()
        } else {
            text
        }
    });

    TransportError::Api {
        status: status.as_u16(),
        category: body.category,
        sub_category: body.sub_category,
        message,
    }
}

/// Percent-encode each segment of a remote path, dropping empty segments
fn encode_path(path: &str) -> String {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(encode_segment)
        .collect::<Vec<_>>()
        .join("/")
}

/// Percent-encode one path segment, keeping only RFC 3986 unreserved bytes
pub(crate) fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
