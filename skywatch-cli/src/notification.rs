//! Notification fan-out for rendered alerts.
//!
//! Each target group owns a `NotifierGroup` built from its URLs. The group is
//! created right before its messages go out and dropped right after.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use thiserror::Error;

use skywatch_core::config::{Config, TargetGroup, TargetUrl};
use skywatch_core::template::notifications_for;
use skywatch_core::{AlertReport, Notification};

const DISCORD_WEBHOOK_BASE: &str = "https://discord.com/api/webhooks";

/// Per-request limit for webhook deliveries.
pub const NOTIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client shared by every notifier in one run.
pub fn http_client() -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder().timeout(NOTIFY_TIMEOUT).build()
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("POST {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("POST {url} returned HTTP {status}")]
    Status { url: String, status: u16 },
}

/// Delivers one title/body pair somewhere.
#[async_trait]
pub trait Notifier: Send + Sync {
    fn describe(&self) -> String;

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError>;
}

async fn post_json(
    client: &reqwest::Client,
    url: &str,
    payload: &serde_json::Value,
) -> Result<(), NotifyError> {
    let response = client
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(|source| NotifyError::Request {
            url: url.to_string(),
            source,
        })?;
    let status = response.status();
    if !status.is_success() {
        return Err(NotifyError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    Ok(())
}

/// Generic JSON webhook: `{"title", "body", "group"}`.
pub struct WebhookNotifier {
    url: String,
    group: String,
    client: reqwest::Client,
}

impl WebhookNotifier {
    pub fn new(url: &str, group: &str, client: reqwest::Client) -> Self {
        WebhookNotifier {
            url: url.to_string(),
            group: group.to_string(),
            client,
        }
    }

    fn payload(&self, title: &str, body: &str) -> serde_json::Value {
        serde_json::json!({
            "title": title,
            "body": body,
            "group": self.group,
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn describe(&self) -> String {
        format!("webhook {}", self.url)
    }

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        post_json(&self.client, &self.url, &self.payload(title, body)).await
    }
}

/// Discord channel webhook.
pub struct DiscordNotifier {
    endpoint: String,
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(id: &str, token: &str, client: reqwest::Client) -> Self {
        DiscordNotifier {
            endpoint: format!("{DISCORD_WEBHOOK_BASE}/{id}/{token}"),
            client,
        }
    }

    fn payload(title: &str, body: &str) -> serde_json::Value {
        serde_json::json!({ "content": format!("**{title}**\n{body}") })
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn describe(&self) -> String {
        // The token is a credential; keep it out of logs.
        "discord webhook".to_string()
    }

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        post_json(&self.client, &self.endpoint, &Self::payload(title, body)).await
    }
}

/// Writes messages to the log. Useful as a dry-run target.
pub struct LogNotifier {
    group: String,
}

impl LogNotifier {
    pub fn new(group: &str) -> Self {
        LogNotifier {
            group: group.to_string(),
        }
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn describe(&self) -> String {
        "log".to_string()
    }

    async fn notify(&self, title: &str, body: &str) -> Result<(), NotifyError> {
        info!("[{}] {title}: {body}", self.group);
        Ok(())
    }
}

/// All notifiers for one target group.
pub struct NotifierGroup {
    name: String,
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierGroup {
    pub fn new(name: &str, notifiers: Vec<Box<dyn Notifier>>) -> Self {
        NotifierGroup {
            name: name.to_string(),
            notifiers,
        }
    }

    /// Build the notifiers for a configured target group.
    pub fn from_target(target: &TargetGroup, client: &reqwest::Client) -> Self {
        let notifiers = target
            .urls
            .iter()
            .map(|url| -> Box<dyn Notifier> {
                match url {
                    TargetUrl::Webhook(u) => {
                        Box::new(WebhookNotifier::new(u, &target.name, client.clone()))
                    }
                    TargetUrl::Discord { id, token } => {
                        Box::new(DiscordNotifier::new(id, token, client.clone()))
                    }
                    TargetUrl::Log => Box::new(LogNotifier::new(&target.name)),
                }
            })
            .collect::<Vec<_>>();
        for n in &notifiers {
            debug!("Adding {} for {}", n.describe(), target.name);
        }
        NotifierGroup::new(&target.name, notifiers)
    }

    /// Send to every notifier. Returns how many deliveries succeeded.
    pub async fn send(&self, notification: &Notification) -> usize {
        let mut delivered = 0;
        for n in &self.notifiers {
            match n.notify(&notification.title, &notification.body).await {
                Ok(()) => delivered += 1,
                Err(e) => warn!("[{}] {} delivery failed: {e}", self.name, n.describe()),
            }
        }
        delivered
    }
}

/// Totals from one dispatch pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub messages: usize,
    pub deliveries: usize,
    pub template_errors: usize,
}

/// Render and send notifications for every target group with alerts.
///
/// `build` creates the notifier group; it is dropped once that group's
/// messages are out. A template error skips only its own group.
pub async fn dispatch<F>(config: &Config, report: &AlertReport, mut build: F) -> DispatchSummary
where
    F: FnMut(&TargetGroup) -> NotifierGroup,
{
    let mut summary = DispatchSummary::default();

    for target in config.active_targets() {
        let record = match report.get(&target.name) {
            Some(r) => r,
            None => continue,
        };

        let notifications =
            match notifications_for(&target.name, &target.title, &target.message, record) {
                Ok(n) => n,
                Err(e) => {
                    warn!("[{}] template error, skipping group: {e}", target.name);
                    summary.template_errors += 1;
                    continue;
                }
            };

        debug!("Alerting for point: {}", target.name);
        let group = build(target);
        for notification in &notifications {
            debug!("Title: {}", notification.title);
            debug!("  Msg: {}", notification.body);
            summary.messages += 1;
            summary.deliveries += group.send(notification).await;
        }
    }

    summary
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
