use serde::Serialize;
use serde_json::Value;

use lib_common::InfoDocument;
use lib_common::markets::info::Officer;

const MISSING_BOUND: &str = "N/A";

/// Quote snapshot served by the summary route.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StockSummary {
    pub previous_close: Value,
    pub open: Value,
    pub bid: Value,
    pub ask: Value,
    pub days_range: String,
    #[serde(rename = "52WeekRange")]
    pub fifty_two_week_range: String,
    pub volume: Value,
    pub avg_volume: Value,
    pub market_cap: Value,
    pub beta: Value,
    pub pe_ratio: Value,
    pub eps: Value,
    pub earnings_date: Value,
    pub dividend_yield: Value,
    pub target_estimate: Value,
}

impl StockSummary {
    pub fn from_info(info: &InfoDocument) -> Self {
        Self {
            previous_close: info.get_or_null("previousClose"),
            open: info.get_or_null("open"),
            bid: info.get_or_null("bid"),
            ask: info.get_or_null("ask"),
            days_range: format_range(info.get("dayLow"), info.get("dayHigh")),
            fifty_two_week_range: format_range(
                info.get("fiftyTwoWeekLow"),
                info.get("fiftyTwoWeekHigh"),
            ),
            volume: info.get_or_null("volume"),
            avg_volume: info.get_or_null("averageVolume"),
            market_cap: info.get_or_null("marketCap"),
            beta: info.get_or_null("beta"),
            pe_ratio: info.get_or_null("trailingPE"),
            eps: info.get_or_null("trailingEps"),
            earnings_date: info.get_or_null("earningsDate"),
            dividend_yield: info.get_or_null("dividendYield"),
            target_estimate: info.get_or_null("targetMeanPrice"),
        }
    }
}

/// Company description served by the profile route.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompanyProfile {
    pub long_name: Value,
    pub sector: Value,
    pub industry: Value,
    pub website: Value,
    pub description: Value,
    pub ceo: Option<String>,
    pub city: Value,
    pub country: Value,
}

impl CompanyProfile {
    pub fn from_info(info: &InfoDocument) -> Self {
        Self {
            long_name: info.get_or_null("longName"),
            sector: info.get_or_null("sector"),
            industry: info.get_or_null("industry"),
            website: info.get_or_null("website"),
            description: info.get_or_null("longBusinessSummary"),
            ceo: ceo_name(&info.company_officers()),
            city: info.get_or_null("city"),
            country: info.get_or_null("country"),
        }
    }
}

/// `"<low> - <high>"`, with `N/A` standing in for a missing bound.
pub fn format_range(low: Option<&Value>, high: Option<&Value>) -> String {
    format!("{} - {}", display_bound(low), display_bound(high))
}

fn display_bound(bound: Option<&Value>) -> String {
    match bound {
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => MISSING_BOUND.to_string(),
    }
}

/// Name of the first officer whose title mentions "CEO" (case-sensitive).
pub fn ceo_name(officers: &[Officer]) -> Option<String> {
    officers
        .iter()
        .find(|officer| officer.title.as_deref().is_some_and(|t| t.contains("CEO")))
        .and_then(|officer| officer.name.clone())
}
