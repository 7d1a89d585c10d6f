//! Webhook chat adapter.
//!
//! A generic HTTP bridge: an external relay POSTs chat messages to
//! `/messages` and receives replies on its callback URL. Both directions are
//! authenticated with the same bearer token.

pub mod config;
mod server;
pub mod transport;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use neighbot_core::adapter::chat_adapter::ChatAdapter;
use neighbot_core::adapter::config::{AdapterConfig, downcast_config};
use neighbot_core::adapter::lifecycle::Lifecycle;
use neighbot_core::conversation::ReplyHandler;
use neighbot_types::adapter::AdapterState;
use neighbot_types::error::AdapterError;

use self::config::{DEFAULT_SHUTDOWN_GRACE_SECS, WebhookConfig};
use self::server::ServerState;
use self::transport::WebhookTransport;

/// Registry name of the webhook adapter.
pub const WEBHOOK_ADAPTER: &str = "webhook";

struct Running {
    cancel: CancellationToken,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
    grace: Duration,
}

#[derive(Default)]
pub struct WebhookAdapter {
    lifecycle: Lifecycle,
    config: Option<WebhookConfig>,
    bind: Option<SocketAddr>,
    state: Option<ServerState>,
    running: Option<Running>,
}

impl WebhookAdapter {
    /// Address the server is listening on, once started.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running.as_ref().map(|r| r.local_addr)
    }
}

impl ChatAdapter for WebhookAdapter {
    fn name(&self) -> &str {
        WEBHOOK_ADAPTER
    }

    fn state(&self) -> AdapterState {
        self.lifecycle.state()
    }

    fn set_config(&mut self, config: Box<dyn AdapterConfig>) -> Result<(), AdapterError> {
        self.lifecycle.check(AdapterState::Configured)?;
        self.config = Some(downcast_config::<WebhookConfig>(config, WEBHOOK_ADAPTER)?);
        self.lifecycle.advance(AdapterState::Configured)
    }

    fn initialize(&mut self) -> Result<(), AdapterError> {
        self.lifecycle.check(AdapterState::Initialized)?;
        let config = self
            .config
            .as_ref()
            .ok_or_else(|| AdapterError::MissingConfig(WEBHOOK_ADAPTER.to_string()))?;

        if config.token.trim().is_empty() {
            return Err(AdapterError::MissingConfig("webhook.token".to_string()));
        }
        if config.callback_url.trim().is_empty() {
            return Err(AdapterError::MissingConfig("webhook.callback_url".to_string()));
        }
        if !config.callback_url.starts_with("http://") && !config.callback_url.starts_with("https://")
        {
            return Err(AdapterError::InvalidConfig(format!(
                "webhook.callback_url is not an http(s) URL: {}",
                config.callback_url
            )));
        }
        let bind: SocketAddr = config.bind.parse().map_err(|e| {
            AdapterError::InvalidConfig(format!("webhook.bind '{}': {e}", config.bind))
        })?;
        let shared = config
            .base
            .shared
            .clone()
            .ok_or_else(|| AdapterError::MissingConfig("shared dependencies".to_string()))?;

        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| AdapterError::Connection(e.to_string()))?;
        let transport = WebhookTransport::new(
            client,
            config.callback_url.clone(),
            config.token.clone(),
            config.bot_id.clone(),
        );

        self.bind = Some(bind);
        self.state = Some(ServerState {
            handler: ReplyHandler::new(shared, WEBHOOK_ADAPTER),
            transport: Arc::new(transport),
            token: Arc::from(config.token.as_str()),
        });
        self.lifecycle.advance(AdapterState::Initialized)
    }

    async fn start(&mut self) -> Result<(), AdapterError> {
        self.lifecycle.check(AdapterState::Running)?;
        let (Some(bind), Some(state)) = (self.bind, self.state.clone()) else {
            return Err(AdapterError::MissingConfig(WEBHOOK_ADAPTER.to_string()));
        };

        let listener = TcpListener::bind(bind)
            .await
            .map_err(|e| AdapterError::Connection(format!("bind {bind}: {e}")))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| AdapterError::Connection(e.to_string()))?;

        let grace = Duration::from_secs(
            self.config
                .as_ref()
                .map_or(DEFAULT_SHUTDOWN_GRACE_SECS, |c| c.shutdown_grace_secs),
        );
        let cancel = CancellationToken::new();
        let shutdown = cancel.clone();
        let app = server::router(state);
        let task = tokio::spawn(async move {
            let served = axum::serve(listener, app)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await;
            if let Err(e) = served {
                error!(adapter = WEBHOOK_ADAPTER, error = %e, "webhook server failed");
            }
        });

        info!(adapter = WEBHOOK_ADAPTER, addr = %local_addr, "webhook listening");
        self.running = Some(Running {
            cancel,
            task,
            local_addr,
            grace,
        });
        self.lifecycle.advance(AdapterState::Running)
    }

    /// Stop accepting requests and wait up to the grace period for
    /// in-flight ones. A turn still running after that is abandoned.
    async fn stop(&mut self) -> Result<(), AdapterError> {
        self.lifecycle.check(AdapterState::Stopped)?;
        if let Some(mut running) = self.running.take() {
            running.cancel.cancel();
            match tokio::time::timeout(running.grace, &mut running.task).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(adapter = WEBHOOK_ADAPTER, error = %e, "webhook server task panicked");
                }
                Err(_) => {
                    warn!(
                        adapter = WEBHOOK_ADAPTER,
                        grace_secs = running.grace.as_secs(),
                        "in-flight requests did not finish in time, aborting webhook server"
                    );
                    running.task.abort();
                }
            }
        }
        self.lifecycle.advance(AdapterState::Stopped)
    }
}
