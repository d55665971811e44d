/// HTTP implementation of the catalog collaborators, plus the backend enum
/// the task worker is handed (HTTP or in-memory mock)
use std::{
    env,
    sync::{
        RwLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use ::log::{debug, warn};
use image_catalog::{
    CatalogError, CollectionErrorEntry, CollectionResponse, CollectionStore, Connection,
    InMemoryCatalog, RemoteTrigger, fixtures,
};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use crate::config::Config;

const USER_AGENT: &str = concat!("image-dash/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Longest error body excerpt kept in a status error
const MAX_ERROR_BODY: usize = 200;

/// How the client authenticates against the API
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    AccessToken(String),
    ClientCredentials {
        client_id: String,
        client_secret: String,
    },
    None,
}

impl Credentials {
    /// Read credentials from FALCON_ACCESS_TOKEN or FALCON_CLIENT_ID/SECRET
    pub fn from_env() -> Self {
        if let Ok(token) = env::var("FALCON_ACCESS_TOKEN")
            && !token.is_empty()
        {
            return Credentials::AccessToken(token);
        }
        match (env::var("FALCON_CLIENT_ID"), env::var("FALCON_CLIENT_SECRET")) {
            (Ok(client_id), Ok(client_secret)) => Credentials::ClientCredentials {
                client_id,
                client_secret,
            },
            _ => Credentials::None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Error payload shapes returned by the API and by the sync function
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    errors: Vec<CollectionErrorEntry>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug)]
pub struct HttpCatalogClient {
    http: Client,
    api_base: String,
    function_base: String,
    credentials: Credentials,
    token: RwLock<Option<String>>,
    connected: AtomicBool,
}

impl HttpCatalogClient {
    pub fn new(
        api_base: &str,
        function_base: &str,
        credentials: Credentials,
    ) -> Result<Self, CatalogError> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            function_base: function_base.trim_end_matches('/').to_string(),
            credentials,
            token: RwLock::new(None),
            connected: AtomicBool::new(false),
        })
    }

    fn object_url(&self, collection: &str, key: &str) -> String {
        format!(
            "{}/customobjects/v1/collections/{}/objects/{}",
            self.api_base, collection, key
        )
    }

    fn function_url(&self, path: &str) -> String {
        format!("{}/{}", self.function_base, path.trim_start_matches('/'))
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, CatalogError> {
        let token = self
            .token
            .read()
            .map_err(|_| CatalogError::NotConnected)?
            .clone()
            .ok_or(CatalogError::NotConnected)?;
        Ok(request.bearer_auth(token))
    }

    fn store_token(&self, token: String) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token);
        }
        self.connected.store(true, Ordering::SeqCst);
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, CatalogError> {
        let response = self
            .authorized(request)?
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        check_status(response).await
    }
}

/// Turn non-2xx responses into errors, preferring the body's own error text
async fn check_status(response: Response) -> Result<Response, CatalogError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let parsed: ErrorBody = serde_json::from_str(&body).unwrap_or_default();
    if let Some(first) = parsed.errors.into_iter().next() {
        return Err(CatalogError::Remote {
            code: first.code,
            message: first.message,
        });
    }
    if let Some(message) = parsed.error {
        return Err(CatalogError::Remote {
            code: i64::from(status.as_u16()),
            message,
        });
    }

    Err(CatalogError::Status {
        code: status.as_u16(),
        message: body.chars().take(MAX_ERROR_BODY).collect(),
    })
}

impl Connection for HttpCatalogClient {
    async fn connect(&self) -> Result<(), CatalogError> {
        match &self.credentials {
            Credentials::AccessToken(token) => {
                self.store_token(token.clone());
                Ok(())
            }
            Credentials::ClientCredentials {
                client_id,
                client_secret,
            } => {
                let url = format!("{}/oauth2/token", self.api_base);
                debug!("Requesting access token from {}", url);
                let response = self
                    .http
                    .post(&url)
                    .form(&[
                        ("client_id", client_id.as_str()),
                        ("client_secret", client_secret.as_str()),
                    ])
                    .send()
                    .await
                    .map_err(|e| CatalogError::Transport(e.to_string()))?;
                let body = check_status(response)
                    .await?
                    .text()
                    .await
                    .map_err(|e| CatalogError::Transport(e.to_string()))?;
                let token: TokenResponse = serde_json::from_str(&body)?;
                self.store_token(token.access_token);
                Ok(())
            }
            Credentials::None => Err(CatalogError::Credentials(
                "set FALCON_CLIENT_ID and FALCON_CLIENT_SECRET, or FALCON_ACCESS_TOKEN".to_string(),
            )),
        }
    }

    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }
}

impl CollectionStore for HttpCatalogClient {
    async fn read_all(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<CollectionResponse, CatalogError> {
        let response = self
            .send(self.http.get(self.object_url(collection, key)))
            .await?;
        let body = response
            .text()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn write(
        &self,
        collection: &str,
        key: &str,
        record: &CollectionResponse,
    ) -> Result<(), CatalogError> {
        self.send(self.http.put(self.object_url(collection, key)).json(record))
            .await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), CatalogError> {
        self.send(self.http.delete(self.object_url(collection, key)))
            .await?;
        Ok(())
    }
}

impl RemoteTrigger for HttpCatalogClient {
    async fn post(&self, path: &str, body: Option<Value>) -> Result<(), CatalogError> {
        let request = self.http.post(self.function_url(path));
        let request = match body {
            Some(body) => request.json(&body),
            None => request,
        };
        self.send(request).await?;
        Ok(())
    }
}

/// Client handed to background tasks
#[derive(Debug)]
pub enum Backend {
    Http(HttpCatalogClient),
    Mock(InMemoryCatalog),
}

impl Backend {
    /// Build the backend for `config`, falling back to the mock catalog in
    /// mock mode
    pub fn from_config(config: &Config) -> Result<Self, CatalogError> {
        if config.use_mock() {
            warn!("Mock mode enabled, serving the built-in catalog");
            let catalog = InMemoryCatalog::with_images(fixtures::mock_images())
                .with_upstream(fixtures::mock_images());
            return Ok(Backend::Mock(catalog));
        }
        let client = HttpCatalogClient::new(
            &config.api_base,
            &config.function_base,
            Credentials::from_env(),
        )?;
        Ok(Backend::Http(client))
    }

    pub fn is_mock(&self) -> bool {
        matches!(self, Backend::Mock(_))
    }
}

impl Connection for Backend {
    async fn connect(&self) -> Result<(), CatalogError> {
        match self {
            Backend::Http(client) => client.connect().await,
            Backend::Mock(client) => client.connect().await,
        }
    }

    fn is_connected(&self) -> bool {
        match self {
            Backend::Http(client) => client.is_connected(),
            Backend::Mock(client) => client.is_connected(),
        }
    }
}

impl CollectionStore for Backend {
    async fn read_all(
        &self,
        collection: &str,
        key: &str,
    ) -> Result<CollectionResponse, CatalogError> {
        match self {
            Backend::Http(client) => client.read_all(collection, key).await,
            Backend::Mock(client) => client.read_all(collection, key).await,
        }
    }

    async fn write(
        &self,
        collection: &str,
        key: &str,
        record: &CollectionResponse,
    ) -> Result<(), CatalogError> {
        match self {
            Backend::Http(client) => client.write(collection, key, record).await,
            Backend::Mock(client) => client.write(collection, key, record).await,
        }
    }

    async fn delete(&self, collection: &str, key: &str) -> Result<(), CatalogError> {
        match self {
            Backend::Http(client) => client.delete(collection, key).await,
            Backend::Mock(client) => client.delete(collection, key).await,
        }
    }
}

impl RemoteTrigger for Backend {
    async fn post(&self, path: &str, body: Option<Value>) -> Result<(), CatalogError> {
        match self {
            Backend::Http(client) => client.post(path, body).await,
            Backend::Mock(client) => client.post(path, body).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::*;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn connected_client(server: &MockServer) -> HttpCatalogClient {
        let client = HttpCatalogClient::new(
            &server.uri(),
            &format!("{}/functions/syncimages", server.uri()),
            Credentials::AccessToken("token-123".to_string()),
        )
        .unwrap();
        client.connect().await.unwrap();
        client
    }

    #[tokio::test]
    async fn test_client_credentials_exchange() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/oauth2/token"))
            .and(body_string_contains("client_id=abc"))
            .respond_with(
                ResponseTemplate::new(201)
                    .set_body_json(serde_json::json!({"access_token": "fresh", "expires_in": 1799})),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/customobjects/v1/collections/images/objects/all"))
            .and(header("authorization", "Bearer fresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "images": []
            })))
            .mount(&server)
            .await;

        let client = HttpCatalogClient::new(
            &server.uri(),
            &server.uri(),
            Credentials::ClientCredentials {
                client_id: "abc".to_string(),
                client_secret: "secret".to_string(),
            },
        )
        .unwrap();
        assert!(!client.is_connected());

        client.connect().await.unwrap();
        assert!(client.is_connected());

        let resp = client.read_all("images", "all").await.unwrap();
        assert!(resp.images.is_empty());
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_connect() {
        let client = HttpCatalogClient::new("http://localhost", "http://localhost", Credentials::None)
            .unwrap();
        assert!(matches!(
            client.connect().await,
            Err(CatalogError::Credentials(_))
        ));
        assert!(!client.is_connected());
    }

    #[tokio::test]
    async fn test_read_before_connect_is_rejected() {
        let client = HttpCatalogClient::new(
            "http://localhost",
            "http://localhost",
            Credentials::AccessToken("t".to_string()),
        )
        .unwrap();
        assert_eq!(
            client.read_all("images", "all").await,
            Err(CatalogError::NotConnected)
        );
    }

    #[tokio::test]
    async fn test_read_parses_collection() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customobjects/v1/collections/images/objects/all"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "updated": "2025-03-01T10:00:00Z",
                "duration": 812,
                "images": [{
                    "name": "Falcon Image Analyzer",
                    "latest": "1.0.2",
                    "registry": "registry.example.com",
                    "repository": "registry.example.com/falcon-imageanalyzer/us-1/release/falcon-imageanalyzer",
                    "tags": [{"name": "1.0.1", "arch": ["x86_64"]}, {"name": "1.0.2", "arch": ["x86_64"]}]
                }]
            })))
            .mount(&server)
            .await;

        let client = connected_client(&server).await;
        let resp = client.read_all("images", "all").await.unwrap();
        assert_eq!(resp.duration_ms, 812);
        assert_eq!(resp.images[0].tags.len(), 2);
    }

    #[tokio::test]
    async fn test_error_records_in_body_become_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customobjects/v1/collections/images/objects/all"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "errors": [{"code": 404, "message": "object not found"}]
            })))
            .mount(&server)
            .await;

        let client = connected_client(&server).await;
        assert_eq!(
            client.read_all("images", "all").await,
            Err(CatalogError::Remote {
                code: 404,
                message: "object not found".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/customobjects/v1/collections/images/objects/all"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = connected_client(&server).await;
        assert!(matches!(
            client.read_all("images", "all").await,
            Err(CatalogError::Malformed(_))
        ));
    }

    #[tokio::test]
    async fn test_sync_trigger_posts_to_function() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/functions/syncimages/sync-images"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({
                "error": "Error getting registry token: unauthorized"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = connected_client(&server).await;
        assert_eq!(
            client.post("/sync-images", None).await,
            Err(CatalogError::Remote {
                code: 500,
                message: "Error getting registry token: unauthorized".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_write_and_delete() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/customobjects/v1/collections/images/objects/all"))
            .and(body_partial_json(serde_json::json!({"images": []})))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("DELETE"))
            .and(path("/customobjects/v1/collections/images/objects/all"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = connected_client(&server).await;
        client
            .write("images", "all", &CollectionResponse::default())
            .await
            .unwrap();
        client.delete("images", "all").await.unwrap();
    }
}
