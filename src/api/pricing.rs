//! Price quotes for configured print products

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::domain::pricing::{self, ConfigAction, PriceQuote, PrintConfiguration};
use crate::Result;

#[derive(Debug, Deserialize)]
pub struct QuoteRequest {
    pub configuration: PrintConfiguration,
    /// Applied in order to `configuration` before pricing.
    #[serde(default)]
    pub actions: Vec<ConfigAction>,
}

#[derive(Debug, Serialize)]
pub struct QuoteResponse {
    pub configuration: PrintConfiguration,
    pub quote: PriceQuote,
}

pub async fn quote(Json(r): Json<QuoteRequest>) -> Result<Json<QuoteResponse>> {
    let configuration = r.configuration.apply_all(r.actions);
    let quote = pricing::quote(&configuration)?;
    Ok(Json(QuoteResponse { configuration, quote }))
}
