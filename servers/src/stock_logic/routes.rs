//! # Stock Routes
//!
//! One `GET` route per data category. Each handler takes the symbol from the
//! path, calls the upstream accessors in `AppState`, reshapes the result and
//! answers with JSON. Any upstream failure is logged and becomes the `{"error"}`
//! envelope through `ApiError`.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::{Map, Value, json};

use lib_common::UpstreamError;

use crate::stock_logic::error::{ApiError, SymbolPath};
use crate::stock_logic::model::{CompanyProfile, StockSummary};
use crate::stock_logic::state::AppState;
use crate::stock_logic::timeframe::period_for;

type Records = Vec<Map<String, Value>>;

const HISTORY_INTERVAL: &str = "1d";
const NO_NEWS: &str = "No news available for the given stock.";
const PEERS_FAILED: &str = "Failed to fetch peers";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/stock/summary/{symbol}", get(summary))
        .route("/stock/historical/{symbol}/{timeframe}", get(historical))
        .route("/stock/news/{symbol}", get(news))
        .route("/stock/financials/{symbol}", get(financials))
        .route("/stock/holdings/{symbol}", get(holdings))
        .route("/stock/analysis/{symbol}", get(analysis))
        .route("/stock/peers/{symbol}", get(peers))
        .route("/stock/dividends/{symbol}", get(dividends))
        .route("/stock/earnings/{symbol}", get(earnings))
        .route("/stock/splits/{symbol}", get(splits))
        .route("/stock/sustainability/{symbol}", get(sustainability))
        .route("/stock/options/{symbol}", get(options))
        .route("/stock/insider/{symbol}", get(insider))
        .route("/stock/profile/{symbol}", get(profile))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Logs an upstream failure for `route` and converts it for the response.
fn failed(route: &'static str, symbol: &str) -> impl FnOnce(UpstreamError) -> ApiError {
    let symbol = symbol.to_string();
    move |err| {
        log::warn!("{} failed for {}: {}", route, symbol, err);
        ApiError::from(err)
    }
}

async fn summary(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<StockSummary>, ApiError> {
    let info = state
        .provider
        .info(&symbol)
        .await
        .map_err(failed("summary", &symbol))?;
    Ok(Json(StockSummary::from_info(&info)))
}

async fn historical(
    State(state): State<AppState>,
    SymbolPath((symbol, timeframe)): SymbolPath<(String, String)>,
) -> Result<Json<Records>, ApiError> {
    let period = period_for(&timeframe);
    let table = state
        .provider
        .history(&symbol, period, HISTORY_INTERVAL)
        .await
        .map_err(failed("historical", &symbol))?;
    Ok(Json(table.reset_index().to_records()))
}

async fn news(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Vec<Value>>, ApiError> {
    let items = state
        .provider
        .news(&symbol)
        .await
        .map_err(failed("news", &symbol))?;

    if items.is_empty() {
        return Err(ApiError::NotFound(NO_NEWS.to_string()));
    }
    Ok(Json(items))
}

async fn financials(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Value>, ApiError> {
    let on_err = || failed("financials", &symbol);
    let income = state.provider.income_stmt(&symbol).await.map_err(on_err())?;
    let balance = state.provider.balance_sheet(&symbol).await.map_err(on_err())?;
    let cash = state.provider.cash_flow(&symbol).await.map_err(on_err())?;

    Ok(Json(json!({
        "income_stmt": income.to_column_map(),
        "balance_sheet": balance.to_column_map(),
        "cash_flow": cash.to_column_map(),
    })))
}

async fn holdings(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Value>, ApiError> {
    let on_err = || failed("holdings", &symbol);
    let institutional = state
        .provider
        .institutional_holders(&symbol)
        .await
        .map_err(on_err())?;
    let major = state.provider.major_holders(&symbol).await.map_err(on_err())?;

    Ok(Json(json!({
        "institutional_holders": institutional.to_column_map(),
        "major_holders": major.to_column_map(),
    })))
}

async fn analysis(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Value>, ApiError> {
    let on_err = || failed("analysis", &symbol);
    let recommendations = state
        .provider
        .recommendations(&symbol)
        .await
        .map_err(on_err())?;
    let earnings = state.provider.earnings_dates(&symbol).await.map_err(on_err())?;

    Ok(Json(json!({
        "recommendations": recommendations.reset_index().to_records(),
        "earnings_estimates": earnings.reset_index().to_records(),
    })))
}

async fn peers(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Value>, ApiError> {
    let peers = match state.peers.peers(&symbol).await {
        Ok(peers) => peers,
        Err(err @ UpstreamError::Status { .. }) => {
            log::warn!("peers failed for {}: {}", symbol, err);
            return Err(ApiError::UpstreamFailure(PEERS_FAILED.to_string()));
        }
        Err(err) => return Err(failed("peers", &symbol)(err)),
    };

    let peers: Vec<String> = peers
        .into_iter()
        .filter(|p| !p.eq_ignore_ascii_case(&symbol))
        .collect();
    Ok(Json(json!({ "peers": peers })))
}

async fn dividends(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Records>, ApiError> {
    let table = state
        .provider
        .dividends(&symbol)
        .await
        .map_err(failed("dividends", &symbol))?;
    Ok(Json(table.reset_index().to_records()))
}

async fn earnings(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Records>, ApiError> {
    let table = state
        .provider
        .earnings_dates(&symbol)
        .await
        .map_err(failed("earnings", &symbol))?;
    Ok(Json(table.reset_index().to_records()))
}

async fn splits(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Records>, ApiError> {
    let table = state
        .provider
        .splits(&symbol)
        .await
        .map_err(failed("splits", &symbol))?;
    Ok(Json(table.reset_index().to_records()))
}

async fn sustainability(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let table = state
        .provider
        .sustainability(&symbol)
        .await
        .map_err(failed("sustainability", &symbol))?;
    Ok(Json(table.to_column_map()))
}

async fn options(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Map<String, Value>>, ApiError> {
    let on_err = || failed("options", &symbol);
    let dates = state.provider.options(&symbol).await.map_err(on_err())?;

    let mut chains = Map::new();
    for date in dates {
        let chain = state
            .provider
            .option_chain(&symbol, &date)
            .await
            .map_err(on_err())?;
        chains.insert(
            date,
            json!({
                "calls": chain.calls.to_records(),
                "puts": chain.puts.to_records(),
            }),
        );
    }
    Ok(Json(chains))
}

async fn insider(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<Records>, ApiError> {
    let table = state
        .provider
        .insider_transactions(&symbol)
        .await
        .map_err(failed("insider", &symbol))?;
    Ok(Json(table.reset_index().to_records()))
}

async fn profile(
    State(state): State<AppState>,
    SymbolPath(symbol): SymbolPath<String>,
) -> Result<Json<CompanyProfile>, ApiError> {
    let info = state
        .provider
        .info(&symbol)
        .await
        .map_err(failed("profile", &symbol))?;
    Ok(Json(CompanyProfile::from_info(&info)))
}

async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
