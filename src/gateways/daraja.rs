use crate::config::MpesaConfig;
use crate::domain::phone::normalize_phone;
use crate::gateways::{GatewayError, PaymentGateway, StkPushCommand, StkPushReply};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

pub struct DarajaGateway {
    pub config: MpesaConfig,
    pub client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct StkPushPayload {
    pub business_short_code: String,
    pub password: String,
    pub timestamp: String,
    pub transaction_type: String,
    pub amount: i64,
    pub party_a: String,
    pub party_b: String,
    pub phone_number: String,
    #[serde(rename = "CallBackURL")]
    pub call_back_url: String,
    pub account_reference: String,
    pub transaction_desc: String,
}

pub fn stk_timestamp(now: DateTime<Utc>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

pub fn stk_password(short_code: &str, passkey: &str, timestamp: &str) -> String {
    STANDARD.encode(format!("{}{}{}", short_code, passkey, timestamp))
}

/// Whole units, half away from zero.
pub fn whole_amount(amount: Decimal) -> i64 {
    amount
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .unwrap_or_default()
}

impl DarajaGateway {
    pub fn new(config: MpesaConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn build_payload(&self, command: &StkPushCommand, now: DateTime<Utc>) -> StkPushPayload {
        let timestamp = stk_timestamp(now);
        let phone = normalize_phone(&command.phone);
        StkPushPayload {
            business_short_code: self.config.short_code.clone(),
            password: stk_password(&self.config.short_code, &self.config.passkey, &timestamp),
            timestamp,
            transaction_type: "CustomerPayBillOnline".to_string(),
            amount: whole_amount(command.amount),
            party_a: phone.clone(),
            party_b: self.config.short_code.clone(),
            phone_number: phone,
            call_back_url: self.config.callback_url_with_token(),
            account_reference: command.account_reference.clone(),
            transaction_desc: command.transaction_desc.clone(),
        }
    }

    async fn access_token(&self) -> Result<String, GatewayError> {
        let url = format!(
            "{}/oauth/v1/generate?grant_type=client_credentials",
            self.config.base_url
        );
        let resp = self
            .client
            .get(url)
            .basic_auth(&self.config.consumer_key, Some(&self.config.consumer_secret))
            .timeout(std::time::Duration::from_millis(self.config.timeout_ms))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(GatewayError::Authentication {
                status: resp.status().as_u16(),
            });
        }

        let token: TokenResponse = resp
            .json()
            .await
            .map_err(|e| GatewayError::Decode(format!("token body: {}", e)))?;
        Ok(token.access_token)
    }
}

#[async_trait]
impl PaymentGateway for DarajaGateway {
    fn name(&self) -> &'static str {
        "daraja"
    }

    async fn stk_push(&self, command: StkPushCommand) -> Result<StkPushReply, GatewayError> {
        let token = self.access_token().await?;
        let payload = self.build_payload(&command, Utc::now());

        tracing::info!(
            party_a = %payload.party_a,
            amount = payload.amount,
            account_reference = %payload.account_reference,
            "initiating stk push"
        );

        let url = format!("{}/mpesa/stkpush/v1/processrequest", self.config.base_url);
        let resp = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&payload)
            .timeout(std::time::Duration::from_millis(self.config.timeout_ms))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        tracing::info!(status = status.as_u16(), body = %body, "stk push response");

        serde_json::from_str::<StkPushReply>(&body).map_err(|e| {
            GatewayError::Decode(format!(
                "HTTP_{}: {}: {}",
                status.as_u16(),
                e,
                body.chars().take(200).collect::<String>()
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn config() -> MpesaConfig {
        MpesaConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            consumer_key: "key".to_string(),
            consumer_secret: "secret".to_string(),
            short_code: "174379".to_string(),
            passkey: "passkey".to_string(),
            callback_url: "https://shop.example/mpesa/callback".to_string(),
            callback_token: None,
            timeout_ms: 1_000,
        }
    }

    #[test]
    fn timestamp_is_compact_utc() {
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        assert_eq!(stk_timestamp(now), "20240307090501");
    }

    #[test]
    fn password_is_base64_of_shortcode_passkey_timestamp() {
        let pw = stk_password("174379", "passkey", "20240307090501");
        let decoded = STANDARD.decode(pw).unwrap();
        assert_eq!(decoded, b"174379passkey20240307090501");
    }

    #[test]
    fn amounts_round_to_whole_units() {
        assert_eq!(whole_amount(Decimal::new(14949, 2)), 149);
        assert_eq!(whole_amount(Decimal::new(1495, 1)), 150);
        assert_eq!(whole_amount(Decimal::new(150, 0)), 150);
    }

    #[test]
    fn payload_normalizes_phone_and_sets_parties() {
        let gateway = DarajaGateway::new(config());
        let now = Utc.with_ymd_and_hms(2024, 3, 7, 9, 5, 1).unwrap();
        let payload = gateway.build_payload(
            &StkPushCommand {
                phone: "0712345678".to_string(),
                amount: Decimal::new(4995, 2),
                account_reference: "ORDER-1b4e28ba".to_string(),
                transaction_desc: "Pure Squeeze Order - 2 items".to_string(),
            },
            now,
        );

        assert_eq!(payload.party_a, "254712345678");
        assert_eq!(payload.phone_number, "254712345678");
        assert_eq!(payload.party_b, "174379");
        assert_eq!(payload.amount, 50);
        assert_eq!(payload.timestamp, "20240307090501");
        assert_eq!(payload.call_back_url, "https://shop.example/mpesa/callback");

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["TransactionType"], "CustomerPayBillOnline");
        assert_eq!(json["CallBackURL"], "https://shop.example/mpesa/callback");
        assert_eq!(json["PartyA"], "254712345678");
    }

    #[test]
    fn payload_carries_callback_token() {
        let mut cfg = config();
        cfg.callback_token = Some("s3cret".to_string());
        let gateway = DarajaGateway::new(cfg);
        let payload = gateway.build_payload(
            &StkPushCommand {
                phone: "254712345678".to_string(),
                amount: Decimal::ONE,
                account_reference: "r".to_string(),
                transaction_desc: "d".to_string(),
            },
            Utc::now(),
        );
        assert_eq!(payload.call_back_url, "https://shop.example/mpesa/callback?token=s3cret");
    }
}
