use crate::config::Config;
use serde::{Deserialize, Serialize};

/// Body of the streaming run request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    pub assistant_id: String,
    pub input: RunInput,
    pub stream_mode: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInput {
    pub merchant_id: String,
}

impl RunRequest {
    pub fn from_config(cfg: &Config, merchant_id: Option<&str>) -> Self {
        Self {
            assistant_id: cfg.endpoint.assistant_id.clone(),
            input: RunInput {
                merchant_id: merchant_id
                    .unwrap_or(cfg.endpoint.merchant_id.as_str())
                    .to_string(),
            },
            stream_mode: cfg.endpoint.stream_mode.clone(),
        }
    }
}
