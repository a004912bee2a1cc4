use serde::{Deserialize, Serialize};

/// A channel-render event forwarded by the host client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRenderEvent {
    pub channel_id: String,
    pub space_id: String,
    pub name: String,
}
