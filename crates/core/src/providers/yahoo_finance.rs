use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header, Client};
use serde::Deserialize;
use tracing::debug;

use super::traits::{QuoteProvider, BROWSER_USER_AGENT, DEFAULT_TIMEOUT_SECS};
use crate::errors::CoreError;
use crate::models::price::{PriceRecord, Provenance, DEFAULT_CURRENCY};

const PROVIDER: &str = "Yahoo Finance";
const BASE_URL: &str = "https://query1.finance.yahoo.com";
const MODULES: &str = "price,summaryDetail,financialData,defaultKeyStatistics";

/// Yahoo Finance quoteSummary provider (primary price source).
///
/// - **Free**: No API key required.
/// - **Data**: Live price, market cap, P/E, EPS, 52-week range, dividend yield.
///
/// One `GET /v10/finance/quoteSummary/{symbol}` per call. Yahoo wraps every
/// number as `{"raw": .., "fmt": ..}` and sends `{}` when it has no value;
/// anything missing maps to 0.
pub struct YahooFinanceProvider {
    client: Client,
    base_url: String,
}

impl YahooFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, CoreError> {
        Self::with_base_url(BASE_URL, timeout)
    }

    /// Point the provider at another host (mirrors, local test servers).
    pub fn with_base_url(base_url: &str, timeout: Duration) -> Result<Self, CoreError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("Failed to build HTTP client: {e}"),
            })?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

// ── quoteSummary response types ─────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResponse {
    quote_summary: QuoteSummary,
}

#[derive(Debug, Deserialize)]
struct QuoteSummary {
    #[serde(default)]
    result: Option<Vec<QuoteSummaryResult>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteSummaryResult {
    price: Option<PriceModule>,
    summary_detail: Option<SummaryDetailModule>,
    financial_data: Option<FinancialDataModule>,
    default_key_statistics: Option<KeyStatisticsModule>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PriceModule {
    currency: Option<String>,
    regular_market_price: Option<RawValue>,
    market_cap: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SummaryDetailModule {
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<RawValue>,
    fifty_two_week_high: Option<RawValue>,
    fifty_two_week_low: Option<RawValue>,
    dividend_yield: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinancialDataModule {
    trailing_eps: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyStatisticsModule {
    trailing_eps: Option<RawValue>,
}

#[derive(Debug, Deserialize)]
struct RawValue {
    raw: Option<f64>,
}

fn raw(value: Option<&RawValue>) -> f64 {
    value
        .and_then(|v| v.raw)
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Map a quoteSummary JSON body to a primary-source record.
///
/// Fails when the body isn't quoteSummary JSON or carries no result.
pub fn parse_quote_summary(symbol: &str, body: &str) -> Result<PriceRecord, CoreError> {
    let resp: QuoteSummaryResponse = serde_json::from_str(body).map_err(|e| CoreError::Parse {
        provider: PROVIDER.into(),
        message: format!("Failed to parse quote for {symbol}: {e}"),
    })?;

    let result = resp
        .quote_summary
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
        .ok_or_else(|| CoreError::Api {
            provider: PROVIDER.into(),
            message: format!("No quote data for {symbol}"),
        })?;

    let price = result.price.as_ref();
    let detail = result.summary_detail.as_ref();

    let financial_eps = raw(result.financial_data.as_ref().and_then(|f| f.trailing_eps.as_ref()));
    let eps = if financial_eps != 0.0 {
        financial_eps
    } else {
        raw(result
            .default_key_statistics
            .as_ref()
            .and_then(|k| k.trailing_eps.as_ref()))
    };

    Ok(PriceRecord {
        symbol: symbol.to_uppercase(),
        current_price: raw(price.and_then(|p| p.regular_market_price.as_ref())),
        currency: price
            .and_then(|p| p.currency.clone())
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        pe_ratio: raw(detail.and_then(|d| d.trailing_pe.as_ref())),
        eps,
        market_cap: raw(price.and_then(|p| p.market_cap.as_ref())),
        fifty_two_week_high: raw(detail.and_then(|d| d.fifty_two_week_high.as_ref())),
        fifty_two_week_low: raw(detail.and_then(|d| d.fifty_two_week_low.as_ref())),
        dividend_yield: raw(detail.and_then(|d| d.dividend_yield.as_ref())),
        timestamp: Utc::now(),
        source: Provenance::PrimarySource,
    })
}

#[async_trait]
impl QuoteProvider for YahooFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_quote(&self, symbol: &str) -> Result<PriceRecord, CoreError> {
        let symbol = symbol.to_uppercase();
        let url = format!("{}/v10/finance/quoteSummary/{}", self.base_url, symbol);

        let response = self
            .client
            .get(&url)
            .query(&[("modules", MODULES)])
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .header(header::ACCEPT, "application/json")
            .header(header::ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .header(header::REFERER, "https://finance.yahoo.com/")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("HTTP {status} for {symbol}"),
            });
        }

        let body = response.text().await?;
        let record = parse_quote_summary(&symbol, &body)?;
        debug!("{PROVIDER} quote for {symbol}: {}", record.current_price);
        Ok(record)
    }
}
