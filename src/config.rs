use dotenv::dotenv;
use log::warn;
use once_cell::sync::Lazy;
use std::env;

use crate::core::balance::UnknownParticipantPolicy;
use crate::core::constants::DEFAULT_CURRENCY;
use crate::core::services::SettlementSettings;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub default_currency: String,
    pub exchange_rate_base_url: String,
    pub exchange_rate_api_key: Option<String>,
    /// `EUR:SGD=1.45,USD:SGD=1.34`, used when no API key is set.
    pub static_rates: Option<String>,
    pub email_api_url: Option<String>,
    /// Raw `UNKNOWN_PARTICIPANT_POLICY`; read through `settlement_settings`.
    pub unknown_participant_policy: Option<String>,
    pub dedup_window_secs: i64,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("default_currency", &self.default_currency)
            .field("exchange_rate_base_url", &self.exchange_rate_base_url)
            .field(
                "exchange_rate_api_key",
                &self.exchange_rate_api_key.as_ref().map(|_| "<redacted>"),
            )
            .field("static_rates", &self.static_rates)
            .field("email_api_url", &self.email_api_url)
            .field("unknown_participant_policy", &self.unknown_participant_policy)
            .field("dedup_window_secs", &self.dedup_window_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            default_currency: non_empty("DEFAULT_CURRENCY")
                .map(|c| c.to_ascii_uppercase())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            exchange_rate_base_url: non_empty("EXCHANGE_RATE_BASE_URL")
                .unwrap_or_else(|| "https://v6.exchangerate-api.com/v6".to_string()),
            exchange_rate_api_key: non_empty("EXCHANGE_RATE_API_KEY"),
            static_rates: non_empty("STATIC_RATES"),
            email_api_url: non_empty("EMAIL_API_URL"),
            unknown_participant_policy: non_empty("UNKNOWN_PARTICIPANT_POLICY"),
            dedup_window_secs: env::var("DEDUP_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|secs| *secs > 0)
                .unwrap_or(300),
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        }
    }

    /// Call after logging is set up, so a bad policy value is reported.
    pub fn settlement_settings(&self) -> SettlementSettings {
        SettlementSettings {
            default_currency: self.default_currency.clone(),
            unknown_participant_policy: participant_policy(self.unknown_participant_policy.as_deref()),
        }
    }
}

pub(crate) fn participant_policy(raw: Option<&str>) -> UnknownParticipantPolicy {
    let Some(raw) = raw else {
        return UnknownParticipantPolicy::default();
    };
    raw.parse().unwrap_or_else(|e| {
        let fallback = UnknownParticipantPolicy::default();
        warn!("Ignoring UNKNOWN_PARTICIPANT_POLICY, using {:?}: {}", fallback, e);
        fallback
    })
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
