use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::{header, Client};
use scraper::{Html, Selector};
use tracing::debug;

use super::traits::{FundamentalsProvider, BROWSER_USER_AGENT, DEFAULT_TIMEOUT_SECS};
use crate::errors::CoreError;
use crate::models::price::Fundamentals;

const PROVIDER: &str = "Google Finance";
const BASE_URL: &str = "https://www.google.com";
const DEFAULT_EXCHANGE: &str = "NASDAQ";

lazy_static! {
    static ref PE_LABEL_REGEX: Regex =
        Regex::new(r"(?i)\b(?:p/e(?:\s+ratio)?|pe\s+ratio)\b").expect("Invalid regex pattern");

    static ref EPS_LABEL_REGEX: Regex =
        Regex::new(r"(?i)\b(?:eps|earnings\s+per\s+share)\b").expect("Invalid regex pattern");

    /// First number in a label's trailing text; thousands separators allowed.
    static ref NUMBER_REGEX: Regex =
        Regex::new(r"-?\d[\d,]*(?:\.\d+)?").expect("Invalid regex pattern");

    /// Key statistic blocks. One block may carry several labels.
    static ref STAT_BLOCK_SELECTOR: Selector =
        Selector::parse("div[data-attrid], div.gyFHrc").expect("Invalid selector");
}

/// Google Finance quote page scraper (secondary P/E and EPS source).
///
/// There is no API behind this, only HTML. The parser is best-effort: a
/// markup change upstream silently yields zeros, which callers accept.
pub struct GoogleFinanceProvider {
    client: Client,
    base_url: String,
    exchange: String,
}

impl GoogleFinanceProvider {
    pub fn new() -> Result<Self, CoreError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, CoreError> {
        Self::with_base_url(BASE_URL, timeout)
    }

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
            exchange: DEFAULT_EXCHANGE.to_string(),
        })
    }

    /// Exchange suffix used in the quote URL (`AAPL:NASDAQ`).
    pub fn with_exchange(mut self, exchange: &str) -> Self {
        self.exchange = exchange.to_uppercase();
        self
    }
}

/// Number that follows the first match of `label` in `text`, if any. The
/// search stops at the next known label, so a bare label never borrows its
/// neighbour's value.
fn number_after_label(text: &str, label: &Regex) -> Option<f64> {
    let rest = &text[label.find(text)?.end()..];
    let stop = [&*PE_LABEL_REGEX, &*EPS_LABEL_REGEX]
        .iter()
        .filter_map(|re| re.find(rest))
        .map(|m| m.start())
        .min()
        .unwrap_or(rest.len());
    let token = NUMBER_REGEX.find(&rest[..stop])?;
    token.as_str().replace(',', "").parse::<f64>().ok()
}

/// Pull P/E and EPS out of a quote page. Misses read as 0.
pub fn parse_fundamentals(html: &str) -> Fundamentals {
    let document = Html::parse_document(html);
    let mut fundamentals = Fundamentals::default();

    for block in document.select(&STAT_BLOCK_SELECTOR) {
        let text = block.text().collect::<Vec<_>>().join(" ");

        if fundamentals.pe_ratio == 0.0 {
            if let Some(pe) = number_after_label(&text, &PE_LABEL_REGEX) {
                fundamentals.pe_ratio = pe;
            }
        }
        if fundamentals.eps == 0.0 {
            if let Some(eps) = number_after_label(&text, &EPS_LABEL_REGEX) {
                fundamentals.eps = eps;
            }
        }
    }

    fundamentals
}

#[async_trait]
impl FundamentalsProvider for GoogleFinanceProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn get_fundamentals(&self, symbol: &str) -> Result<Fundamentals, CoreError> {
        let symbol = symbol.to_uppercase();
        let url = format!(
            "{}/finance/quote/{}:{}",
            self.base_url, symbol, self.exchange
        );

        let response = self
            .client
            .get(&url)
            .header(header::USER_AGENT, BROWSER_USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CoreError::Api {
                provider: PROVIDER.into(),
                message: format!("HTTP {status} for {symbol}"),
            });
        }

        let html = response.text().await?;
        let fundamentals = parse_fundamentals(&html);
        debug!(
            "{PROVIDER} fundamentals for {symbol}: PE={}, EPS={}",
            fundamentals.pe_ratio, fundamentals.eps
        );
        Ok(fundamentals)
    }
}
