//! Turns a LNURL into something the send flow can act on.
//!
//! LNURL-auth is known from the url alone. Everything else needs one round
//! trip to the service, whose answer is classified into a [`LnUrlVariant`] or
//! a [`LnUrlFailure`].

use std::time::Duration;

use async_trait::async_trait;
use lightning::log_error;
use lightning::util::logger::Logger;
use lnurl::pay::PayResponse;
use lnurl::withdraw::WithdrawalResponse;
use serde_json::Value;
use url::Url;

use crate::error::ScanError;
use crate::logging::ScanLogger;
use crate::input::{
    LnUrlFailure, LnUrlFailureKind, LnUrlParams, LnUrlRequest, LnUrlVariant, ParsedInput,
};

#[cfg(test)]
use mockall::{automock, predicate::*};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A raw answer from a LNURL service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LnUrlReply {
    pub status: u16,
    pub body: String,
}

/// Performs the LNURL network round trip.
#[cfg_attr(test, automock)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait LnUrlClient {
    async fn get(&self, url: &str) -> Result<LnUrlReply, ScanError>;
}

#[derive(Clone, Debug)]
pub struct HttpLnUrlClient {
    http_client: reqwest::Client,
}

impl HttpLnUrlClient {
    pub fn new() -> Result<Self, ScanError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// The timeout only applies on native targets, browsers enforce their own.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ScanError> {
        #[cfg(not(target_arch = "wasm32"))]
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        #[cfg(target_arch = "wasm32")]
        let http_client = {
            let _ = timeout;
            reqwest::Client::new()
        };

        Ok(HttpLnUrlClient { http_client })
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl LnUrlClient for HttpLnUrlClient {
    async fn get(&self, url: &str) -> Result<LnUrlReply, ScanError> {
        let response = self.http_client.get(url).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(LnUrlReply { status, body })
    }
}

/// Host of the service, or the whole url when it has none.
pub(crate) fn origin_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_string()))
        .unwrap_or_else(|| url.to_string())
}

fn is_auth_url(url: &str) -> bool {
    Url::parse(url)
        .map(|u| u.query_pairs().any(|(k, v)| k == "tag" && v == "login"))
        .unwrap_or(false)
}

/// Resolves a decoded LNURL into a request or a failure, never an error:
/// a service that can't be reached is a generic failure of that service.
pub async fn resolve<C: LnUrlClient + ?Sized>(
    client: &C,
    logger: &ScanLogger,
    url: &str,
) -> ParsedInput {
    let origin = origin_of(url);

    if is_auth_url(url) {
        return ParsedInput::LnUrlRequest(LnUrlRequest {
            url: url.to_string(),
            origin,
            variant: LnUrlVariant::Auth,
        });
    }

    match client.get(url).await {
        Ok(reply) => classify_reply(url, origin, &reply),
        Err(e) => {
            log_error!(logger, "could not reach LNURL service {}: {}", origin, e);
            ParsedInput::LnUrlFailure(LnUrlFailure {
                origin,
                kind: LnUrlFailureKind::Generic,
            })
        }
    }
}

/// Classifies what a LNURL service answered.
pub fn classify_reply(url: &str, origin: String, reply: &LnUrlReply) -> ParsedInput {
    let failure = |origin: String, kind| ParsedInput::LnUrlFailure(LnUrlFailure { origin, kind });

    if !(200..300).contains(&reply.status) {
        return failure(origin, LnUrlFailureKind::Code(reply.status));
    }

    let json: Value = match serde_json::from_str(&reply.body) {
        Ok(json @ Value::Object(_)) => json,
        _ => return failure(origin, LnUrlFailureKind::Unreadable),
    };

    if json
        .get("status")
        .and_then(Value::as_str)
        .is_some_and(|s| s.eq_ignore_ascii_case("ERROR"))
    {
        let reason = json
            .get("reason")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default();
        return if reason.is_empty() {
            failure(origin, LnUrlFailureKind::Generic)
        } else {
            failure(origin, LnUrlFailureKind::Detailed(reason.to_string()))
        };
    }

    let Some(tag) = json.get("tag").and_then(Value::as_str).map(str::to_string) else {
        return failure(origin, LnUrlFailureKind::Unreadable);
    };

    let variant = match tag.as_str() {
        "withdrawRequest" => match serde_json::from_value::<WithdrawalResponse>(json) {
            Ok(withdraw) => LnUrlVariant::Withdraw(LnUrlParams {
                callback: withdraw.callback,
                min: withdraw.min_withdrawable.unwrap_or(0),
                max: withdraw.max_withdrawable,
                k1: Some(withdraw.k1),
            }),
            Err(_) => return failure(origin, LnUrlFailureKind::Unreadable),
        },
        "payRequest" => match serde_json::from_value::<PayResponse>(json) {
            Ok(pay) => LnUrlVariant::Pay(LnUrlParams {
                callback: pay.callback,
                min: pay.min_sendable,
                max: pay.max_sendable,
                k1: None,
            }),
            Err(_) => return failure(origin, LnUrlFailureKind::Unreadable),
        },
        _ => LnUrlVariant::Unsupported(tag),
    };

    ParsedInput::LnUrlRequest(LnUrlRequest {
        url: url.to_string(),
        origin,
        variant,
    })
}
