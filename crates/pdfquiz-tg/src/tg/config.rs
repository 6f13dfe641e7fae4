use serde::Deserialize;
use teloxide::types::UserId;

#[derive(Deserialize, Clone)]
pub(crate) struct Config {
    pub(crate) token: String,

    /// ID of the user, who owns the bot. Nobody else may use it
    pub(crate) owner: UserId,

    /// Public base URL of the bot. If set, the bot receives updates via
    /// a webhook at `{webhook_url}/webhook`, otherwise long polling is used.
    pub(crate) webhook_url: Option<url::Url>,

    /// Local port the webhook HTTP server listens on
    #[serde(default = "default_webhook_port")]
    pub(crate) webhook_port: u16,
}

fn default_webhook_port() -> u16 {
    8443
}
