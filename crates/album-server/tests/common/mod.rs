//! Common test utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use album_server::{Server, ServerConfig};
use album_session::{SessionConfig, SessionManager, SweeperHandle};
use anyhow::Result;
use reqwest::{Client, redirect::Policy};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;

/// Password every test server accepts.
pub const PASSWORD: &str = "test-password";

/// A test server that runs in the background.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// Browser-like client: keeps cookies, does not follow redirects.
    pub client: Client,
    /// The server's session store.
    pub sessions: SessionManager,
    /// Upload directory.
    pub upload_dir: TempDir,
    /// Handle to the server task.
    _handle: JoinHandle<()>,
    /// Handle to the idle sweeper.
    _sweeper: SweeperHandle,
}

impl TestServer {
    /// Start a new test server with default session settings.
    pub async fn start() -> Result<Self> {
        Self::start_with(SessionConfig::default()).await
    }

    /// Start a new test server with the given session settings.
    pub async fn start_with(session_config: SessionConfig) -> Result<Self> {
        let upload_dir = TempDir::new()?;

        // Find an available port
        let addr = find_available_port().await?;

        let config = ServerConfig::new(Some(PASSWORD.to_string()))
            .with_bind_address(addr)
            .with_upload_dir(upload_dir.path())
            .with_request_logging(false);

        let sessions = SessionManager::new(session_config);
        let sweeper = sessions.spawn_sweeper();

        // Start server in background
        let server = Server::new(config, sessions.clone())?;
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = browser_client()?;
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            sessions,
            upload_dir,
            _handle: handle,
            _sweeper: sweeper,
        })
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Full URL of `path`.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url(), path)
    }

    /// GET request builder.
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(self.url(path))
    }

    /// POST request builder.
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(self.url(path))
    }

    /// Submit the login form with `password`.
    pub async fn login_with(&self, password: &str) -> Result<reqwest::Response> {
        Ok(self
            .post("/login")
            .form(&[("password", password)])
            .send()
            .await?)
    }

    /// Log in with the right password.
    pub async fn login(&self) -> Result<reqwest::Response> {
        self.login_with(PASSWORD).await
    }

    /// Check if server is healthy.
    pub async fn health(&self) -> Result<bool> {
        let resp = self.get("/health").send().await?;
        Ok(resp.status().is_success())
    }
}

/// Client that stores cookies like a browser but hands redirects back to the test.
pub fn browser_client() -> Result<Client> {
    Ok(Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()?)
}

/// Session identifier carried by a response's `Set-Cookie` header, if any.
pub fn session_cookie(resp: &reqwest::Response) -> Option<String> {
    resp.headers()
        .get_all(reqwest::header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .filter_map(|pair| pair.split_once('='))
        .find(|(name, _)| *name == album_session::DEFAULT_COOKIE_NAME)
        .map(|(_, value)| value.to_string())
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
