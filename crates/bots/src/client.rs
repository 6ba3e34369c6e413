//! Signed REST client for the bot backend
//!
//! Every request carries the API key in `APIKEY` and an HMAC-SHA256
//! signature in `Signature`. The signed payload is the request path
//! (including the `/public/api` prefix and query string) followed by the
//! JSON body, if any.

use hmac::{Hmac, Mac};
use meridian_ports::{BackendError, BackendResult};
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::time::Duration;

use crate::settings::{BotSettingsUpdate, CreateBotRequest};

type HmacSha256 = Hmac<Sha256>;

pub const DEFAULT_BOT_API_URL: &str = "https://api.3commas.io";
const API_PREFIX: &str = "/public/api";

/// Hex-encoded HMAC-SHA256 of `payload`
pub fn sign(secret: &str, payload: &str) -> BackendResult<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| BackendError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotResponse {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfitsInUsd {
    #[serde(default)]
    pub overall_usd_profit: f64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BotStatsResponse {
    #[serde(default)]
    pub profits_in_usd: ProfitsInUsd,
}

impl BotStatsResponse {
    pub fn profit_label(&self) -> String {
        format!("{:.2} USD", self.profits_in_usd.overall_usd_profit)
    }
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

#[derive(Clone)]
pub struct BotApiClient {
    client: Client,
    base_url: String,
    api_key: String,
    api_secret: String,
}

impl BotApiClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        timeout: Duration,
    ) -> BackendResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| BackendError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
        })
    }

    pub async fn list_accounts(&self) -> BackendResult<Vec<Account>> {
        self.request::<_, ()>(Method::GET, "/ver1/accounts", None).await
    }

    pub async fn create_bot(&self, request: &CreateBotRequest) -> BackendResult<BotResponse> {
        self.request(Method::POST, "/ver1/bots/create_bot", Some(request)).await
    }

    pub async fn update_bot(
        &self,
        bot_id: u64,
        update: &BotSettingsUpdate,
    ) -> BackendResult<BotResponse> {
        let path = format!("/ver1/bots/{}/update", bot_id);
        self.request(Method::PATCH, &path, Some(update)).await
    }

    pub async fn bot_stats(&self, bot_id: u64) -> BackendResult<BotStatsResponse> {
        let path = format!("/ver1/bots/stats?bot_id={}", bot_id);
        self.request::<_, ()>(Method::GET, &path, None).await
    }

    async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> BackendResult<T>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let full_path = format!("{}{}", API_PREFIX, path);
        let body = body
            .map(serde_json::to_string)
            .transpose()
            .map_err(|e| BackendError::Parse(e.to_string()))?;

        let payload = format!("{}{}", full_path, body.as_deref().unwrap_or(""));
        let signature = sign(&self.api_secret, &payload)?;

        let url = format!("{}{}", self.base_url, full_path);
        let mut builder = self
            .client
            .request(method, &url)
            .header("APIKEY", &self.api_key)
            .header("Signature", signature);
        if let Some(body) = body {
            builder = builder
                .header("Content-Type", "application/json")
                .body(body);
        }

        let resp = builder
            .send()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| BackendError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiError>(&text) {
                Ok(err) => err.error_description.unwrap_or(err.error),
                Err(_) => text,
            };
            return Err(BackendError::Api {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&text).map_err(|e| BackendError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "NhqPtmdSJYdKjVHjA7PZj4Mge3R5YNiP1e3UZjInClVN65XAbvqqM6A7H5fATj0j";

    #[test]
    fn test_signature_is_hex_sha256() {
        let signature = sign(SECRET, "/public/api/ver1/accounts").unwrap();
        assert_eq!(signature.len(), 64);
        assert!(signature.chars().all(|c| c.is_ascii_hexdigit()));

        // Deterministic, and sensitive to the payload
        assert_eq!(signature, sign(SECRET, "/public/api/ver1/accounts").unwrap());
        assert_ne!(signature, sign(SECRET, "/public/api/ver1/bots").unwrap());
    }

    #[test]
    fn test_known_hmac_vector() {
        // RFC 4231 test case 2
        let signature = sign("Jefe", "what do ya want for nothing?").unwrap();
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_stats_profit_label() {
        let stats: BotStatsResponse =
            serde_json::from_str(r#"{"profits_in_usd": {"overall_usd_profit": 12.346}}"#).unwrap();
        assert_eq!(stats.profit_label(), "12.35 USD");

        let empty: BotStatsResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.profit_label(), "0.00 USD");
    }
}
