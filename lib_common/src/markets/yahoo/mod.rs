//! # Yahoo Finance Accessor
//!
//! `YahooFinance` implements `StockDataProvider` on top of the public Yahoo
//! Finance JSON endpoints:
//!
//! | Data | Endpoint |
//! |---|---|
//! | info, holders, analysis, ESG, insiders | `v10/finance/quoteSummary/{symbol}` |
//! | history, dividends, splits | `v8/finance/chart/{symbol}` |
//! | news | `v1/finance/search` |
//! | statements | `ws/fundamentals-timeseries/v1/finance/timeseries/{symbol}` |
//! | options | `v7/finance/options/{symbol}` |
//!
//! Requests go through `apicall::ApiCallYahoo` (session cookie and crumb);
//! responses are reshaped by the pure functions in `parse`.

pub mod apicall;
pub mod parse;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};

use crate::markets::info::InfoDocument;
use crate::markets::provider::{OptionChain, StockDataProvider, UpstreamError};
use crate::markets::tabular::Table;

use self::apicall::ApiCallYahoo;
pub use self::apicall::YAHOO_QUERY_URL;

/// Summary modules merged into the info document. On key conflicts the
/// earlier module wins.
const INFO_MODULES: &str = "summaryDetail,financialData,defaultKeyStatistics,price,calendarEvents,assetProfile,quoteType";

const INCOME_KEYS: [&str; 17] = [
    "TotalRevenue",
    "CostOfRevenue",
    "GrossProfit",
    "OperatingExpense",
    "OperatingIncome",
    "NetIncome",
    "EBITDA",
    "BasicEPS",
    "DilutedEPS",
    "ResearchAndDevelopment",
    "SellingGeneralAndAdministration",
    "InterestExpense",
    "TaxProvision",
    "PretaxIncome",
    "NetIncomeCommonStockholders",
    "DilutedAverageShares",
    "BasicAverageShares",
];

const BALANCE_SHEET_KEYS: [&str; 15] = [
    "TotalAssets",
    "TotalLiabilitiesNetMinorityInterest",
    "StockholdersEquity",
    "CashAndCashEquivalents",
    "CurrentAssets",
    "CurrentLiabilities",
    "TotalDebt",
    "LongTermDebt",
    "NetPPE",
    "Inventory",
    "AccountsReceivable",
    "AccountsPayable",
    "RetainedEarnings",
    "WorkingCapital",
    "OrdinarySharesNumber",
];

const CASH_FLOW_KEYS: [&str; 11] = [
    "OperatingCashFlow",
    "InvestingCashFlow",
    "FinancingCashFlow",
    "FreeCashFlow",
    "CapitalExpenditure",
    "RepurchaseOfCapitalStock",
    "CashDividendsPaid",
    "EndCashPosition",
    "ChangeInWorkingCapital",
    "DepreciationAndAmortization",
    "StockBasedCompensation",
];

const STATEMENT_PREFIX: &str = "annual";

/// Earliest period the fundamentals endpoint is asked for (1985-08-23).
const TIMESERIES_START: i64 = 493_590_046;

/// Stock data accessor backed by Yahoo Finance.
pub struct YahooFinance {
    api: ApiCallYahoo,
}

const QUOTE_SUMMARY_PATH: &str = "v10/finance/quoteSummary";
const CHART_PATH: &str = "v8/finance/chart";
const TIMESERIES_PATH: &str = "ws/fundamentals-timeseries/v1/finance/timeseries";
const OPTIONS_PATH: &str = "v7/finance/options";

impl YahooFinance {
    /// Creates an accessor talking to `query_url` (normally `YAHOO_QUERY_URL`).
    pub fn new(query_url: &str) -> Result<Self, UpstreamError> {
        Ok(Self {
            api: ApiCallYahoo::new(query_url)?,
        })
    }

    async fn quote_summary(
        &self,
        symbol: &str,
        modules: &str,
    ) -> Result<Map<String, Value>, UpstreamError> {
        let url = self.api.symbol_url(QUOTE_SUMMARY_PATH, symbol)?;
        let doc = self
            .api
            .fetch_json(&url, &[("modules", modules)], true)
            .await?;
        parse::quote_summary_modules(&doc)
    }

    /// Fetches one summary module and reshapes it with `to_table`.
    async fn module_table(
        &self,
        symbol: &str,
        module: &str,
        to_table: fn(&Map<String, Value>) -> Table,
    ) -> Result<Table, UpstreamError> {
        let modules = self.quote_summary(symbol, module).await?;
        Ok(to_table(parse::summary_module(&modules, module)?))
    }

    async fn chart(&self, symbol: &str, range: &str, interval: &str) -> Result<Value, UpstreamError> {
        let url = self.api.symbol_url(CHART_PATH, symbol)?;
        let doc = self
            .api
            .fetch_json(
                &url,
                &[("range", range), ("interval", interval), ("events", "div,split")],
                false,
            )
            .await?;
        parse::parse_chart(&doc).cloned()
    }

    async fn statement(&self, symbol: &str, keys: &[&str]) -> Result<Table, UpstreamError> {
        let types = keys
            .iter()
            .map(|k| format!("{}{}", STATEMENT_PREFIX, k))
            .collect::<Vec<_>>()
            .join(",");
        let period1 = TIMESERIES_START.to_string();
        let period2 = Utc::now().timestamp().to_string();
        let url = self.api.symbol_url(TIMESERIES_PATH, symbol)?;

        let doc = self
            .api
            .fetch_json(
                &url,
                &[
                    ("symbol", symbol),
                    ("type", types.as_str()),
                    ("period1", period1.as_str()),
                    ("period2", period2.as_str()),
                ],
                false,
            )
            .await?;
        parse::parse_timeseries(&doc, STATEMENT_PREFIX, keys)
    }

    async fn options_doc(&self, symbol: &str, date: Option<i64>) -> Result<Value, UpstreamError> {
        let date = date.map(|d| d.to_string());
        let query: Vec<(&str, &str)> = date.iter().map(|d| ("date", d.as_str())).collect();

        let url = self.api.symbol_url(OPTIONS_PATH, symbol)?;
        self.api.fetch_json(&url, &query, true).await
    }
}

#[async_trait]
impl StockDataProvider for YahooFinance {
    async fn info(&self, symbol: &str) -> Result<InfoDocument, UpstreamError> {
        let modules = self.quote_summary(symbol, INFO_MODULES).await?;
        Ok(InfoDocument::from_modules(&modules))
    }

    async fn history(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Table, UpstreamError> {
        let chart = self.chart(symbol, period, interval).await?;
        Ok(parse::history_table(&chart))
    }

    async fn news(&self, symbol: &str) -> Result<Vec<Value>, UpstreamError> {
        let doc = self
            .api
            .fetch_json(
                "v1/finance/search",
                &[("q", symbol), ("quotesCount", "0"), ("newsCount", "20")],
                false,
            )
            .await?;
        Ok(parse::parse_news(&doc))
    }

    async fn income_stmt(&self, symbol: &str) -> Result<Table, UpstreamError> {
        self.statement(symbol, &INCOME_KEYS).await
    }

    async fn balance_sheet(&self, symbol: &str) -> Result<Table, UpstreamError> {
        self.statement(symbol, &BALANCE_SHEET_KEYS).await
    }

    async fn cash_flow(&self, symbol: &str) -> Result<Table, UpstreamError> {
        self.statement(symbol, &CASH_FLOW_KEYS).await
    }

    async fn institutional_holders(&self, symbol: &str) -> Result<Table, UpstreamError> {
        self.module_table(symbol, "institutionOwnership", parse::institutional_holders_table)
            .await
    }

    async fn major_holders(&self, symbol: &str) -> Result<Table, UpstreamError> {
        self.module_table(symbol, "majorHoldersBreakdown", parse::major_holders_table)
            .await
    }

    async fn recommendations(&self, symbol: &str) -> Result<Table, UpstreamError> {
        self.module_table(symbol, "recommendationTrend", parse::recommendations_table)
            .await
    }

    async fn earnings_dates(&self, symbol: &str) -> Result<Table, UpstreamError> {
        let modules = self
            .quote_summary(symbol, "earningsHistory,calendarEvents")
            .await?;
        Ok(parse::earnings_dates_table(&modules))
    }

    async fn dividends(&self, symbol: &str) -> Result<Table, UpstreamError> {
        let chart = self.chart(symbol, "max", "1d").await?;
        Ok(parse::dividends_table(&chart))
    }

    async fn splits(&self, symbol: &str) -> Result<Table, UpstreamError> {
        let chart = self.chart(symbol, "max", "1d").await?;
        Ok(parse::splits_table(&chart))
    }

    async fn sustainability(&self, symbol: &str) -> Result<Table, UpstreamError> {
        self.module_table(symbol, "esgScores", parse::sustainability_table)
            .await
    }

    async fn options(&self, symbol: &str) -> Result<Vec<String>, UpstreamError> {
        let doc = self.options_doc(symbol, None).await?;
        parse::parse_expirations(&doc)
    }

    async fn option_chain(&self, symbol: &str, date: &str) -> Result<OptionChain, UpstreamError> {
        let epoch = parse::expiration_epoch(date)?;
        let doc = self.options_doc(symbol, Some(epoch)).await?;
        parse::parse_option_chain(&doc)
    }

    async fn insider_transactions(&self, symbol: &str) -> Result<Table, UpstreamError> {
        self.module_table(symbol, "insiderTransactions", parse::insider_table)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_key_lists_have_no_duplicates() {
        for keys in [&INCOME_KEYS[..], &BALANCE_SHEET_KEYS[..], &CASH_FLOW_KEYS[..]] {
            let mut sorted = keys.to_vec();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), keys.len());
        }
    }

    #[test]
    fn symbol_cannot_inject_query_or_path() {
        let yahoo = YahooFinance::new(YAHOO_QUERY_URL).unwrap();

        let url = yahoo.api.symbol_url(QUOTE_SUMMARY_PATH, "AAPL?modules=x").unwrap();
        assert_eq!(
            url,
            "https://query2.finance.yahoo.com/v10/finance/quoteSummary/AAPL%3Fmodules=x"
        );

        let url = yahoo.api.symbol_url(CHART_PATH, "..").unwrap();
        assert!(url.starts_with("https://query2.finance.yahoo.com/v8/finance/chart"));

        let url = yahoo.api.symbol_url(OPTIONS_PATH, "BRK-B").unwrap();
        assert_eq!(url, "https://query2.finance.yahoo.com/v7/finance/options/BRK-B");
    }

    #[test]
    fn rejects_invalid_query_url() {
        assert!(matches!(
            YahooFinance::new("query2.finance.yahoo.com"),
            Err(UpstreamError::InvalidUrl(_))
        ));
    }
}
