//! # Yahoo Finance Response Parsers
//!
//! Pure functions turning Yahoo Finance JSON documents into `Table`s, lists and
//! summary modules. None of them perform I/O, so they are tested directly
//! against fixture documents.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate};
use serde_json::{Map, Value};

use crate::markets::info::unwrap_raw;
use crate::markets::provider::{OptionChain, UpstreamError};
use crate::markets::tabular::{timestamp_cell, timestamp_value, Table};

pub const HISTORY_COLUMNS: [&str; 7] = [
    "Open",
    "High",
    "Low",
    "Close",
    "Volume",
    "Dividends",
    "Stock Splits",
];

pub const INSTITUTIONAL_HOLDER_COLUMNS: [&str; 6] = [
    "Date Reported",
    "Holder",
    "pctHeld",
    "Shares",
    "Value",
    "pctChange",
];

const MAJOR_HOLDER_KEYS: [&str; 4] = [
    "insidersPercentHeld",
    "institutionsPercentHeld",
    "institutionsFloatPercentHeld",
    "institutionsCount",
];

pub const RECOMMENDATION_COLUMNS: [&str; 6] =
    ["period", "strongBuy", "buy", "hold", "sell", "strongSell"];

pub const EARNINGS_COLUMNS: [&str; 3] = ["EPS Estimate", "Reported EPS", "Surprise(%)"];

/// Insider table columns, each with the transaction field it reads.
const INSIDER_COLUMNS: [(&str, &str); 9] = [
    ("Shares", "shares"),
    ("Value", "value"),
    ("URL", "filerUrl"),
    ("Text", "transactionText"),
    ("Insider", "filerName"),
    ("Position", "filerRelation"),
    ("Transaction", "moneyText"),
    ("Start Date", "startDate"),
    ("Ownership", "ownership"),
];

pub const OPTION_COLUMNS: [&str; 14] = [
    "contractSymbol",
    "lastTradeDate",
    "strike",
    "lastPrice",
    "bid",
    "ask",
    "change",
    "percentChange",
    "volume",
    "openInterest",
    "impliedVolatility",
    "inTheMoney",
    "contractSize",
    "currency",
];

/// Returns `{root}.result[0]`, or the provider's error description as `NoData`.
fn first_result<'a>(doc: &'a Value, root: &str) -> Result<&'a Value, UpstreamError> {
    let envelope = doc
        .get(root)
        .ok_or_else(|| UpstreamError::Decode(format!("missing '{}' envelope", root)))?;

    if let Some(description) = envelope
        .get("error")
        .and_then(|e| e.get("description"))
        .and_then(Value::as_str)
    {
        return Err(UpstreamError::NoData(description.to_string()));
    }

    envelope
        .get("result")
        .and_then(Value::as_array)
        .and_then(|results| results.first())
        .ok_or_else(|| UpstreamError::NoData(format!("empty '{}' result", root)))
}

/// Unwrapped `quoteSummary` modules, keyed by module name.
pub fn quote_summary_modules(doc: &Value) -> Result<Map<String, Value>, UpstreamError> {
    match unwrap_raw(first_result(doc, "quoteSummary")?.clone()) {
        Value::Object(modules) => Ok(modules),
        _ => Err(UpstreamError::Decode("quoteSummary result is not an object".into())),
    }
}

/// Picks one module out of `quote_summary_modules`' output.
pub fn summary_module<'a>(
    modules: &'a Map<String, Value>,
    name: &str,
) -> Result<&'a Map<String, Value>, UpstreamError> {
    modules
        .get(name)
        .and_then(Value::as_object)
        .ok_or_else(|| UpstreamError::NoData(format!("module '{}' not available", name)))
}

/// The `chart.result[0]` object of a chart response.
pub fn parse_chart(doc: &Value) -> Result<&Value, UpstreamError> {
    first_result(doc, "chart")
}

/// Daily bars indexed by `Date`, with the dividend and split events of the
/// same calendar day folded in (0 when none).
pub fn history_table(chart: &Value) -> Table {
    let mut table = Table::new(Some("Date"), HISTORY_COLUMNS);

    let timestamps = chart
        .get("timestamp")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();
    let quote = chart.pointer("/indicators/quote/0");
    let dividends = events_by_day(chart, "dividends", dividend_amount);
    let splits = events_by_day(chart, "splits", split_ratio);

    let series = |name: &str, i: usize| -> Value {
        quote
            .and_then(|q| q.get(name))
            .and_then(|s| s.get(i))
            .cloned()
            .unwrap_or(Value::Null)
    };

    for (i, ts) in timestamps.iter().enumerate() {
        let Some(ts) = ts.as_i64() else { continue };
        let day = day_key(ts);

        table.push_row(
            timestamp_value(ts),
            vec![
                series("open", i),
                series("high", i),
                series("low", i),
                series("close", i),
                series("volume", i),
                day.as_ref()
                    .and_then(|d| dividends.get(d))
                    .cloned()
                    .unwrap_or(Value::from(0.0)),
                day.as_ref()
                    .and_then(|d| splits.get(d))
                    .cloned()
                    .unwrap_or(Value::from(0.0)),
            ],
        );
    }

    table
}

/// Dividend payments over the chart range, oldest first.
pub fn dividends_table(chart: &Value) -> Table {
    event_table(chart, "dividends", "Dividends", dividend_amount)
}

/// Stock splits over the chart range as `numerator / denominator`, oldest first.
pub fn splits_table(chart: &Value) -> Table {
    event_table(chart, "splits", "Stock Splits", split_ratio)
}

fn event_table(
    chart: &Value,
    kind: &str,
    column: &str,
    value_of: fn(&Value) -> Option<Value>,
) -> Table {
    let mut table = Table::new(Some("Date"), [column]);

    let mut events: Vec<(i64, Value)> = chart
        .pointer(&format!("/events/{}", kind))
        .and_then(Value::as_object)
        .map(|events| {
            events
                .values()
                .filter_map(|event| Some((event.get("date")?.as_i64()?, value_of(event)?)))
                .collect()
        })
        .unwrap_or_default();
    events.sort_by_key(|(date, _)| *date);

    for (date, value) in events {
        table.push_row(timestamp_value(date), vec![value]);
    }
    table
}

fn events_by_day(
    chart: &Value,
    kind: &str,
    value_of: fn(&Value) -> Option<Value>,
) -> BTreeMap<String, Value> {
    chart
        .pointer(&format!("/events/{}", kind))
        .and_then(Value::as_object)
        .map(|events| {
            events
                .values()
                .filter_map(|event| {
                    let day = day_key(event.get("date")?.as_i64()?)?;
                    Some((day, value_of(event)?))
                })
                .collect()
        })
        .unwrap_or_default()
}

fn dividend_amount(event: &Value) -> Option<Value> {
    event.get("amount").cloned()
}

fn split_ratio(event: &Value) -> Option<Value> {
    let numerator = event.get("numerator")?.as_f64()?;
    let denominator = event.get("denominator")?.as_f64()?;
    if denominator == 0.0 {
        return None;
    }
    Some(Value::from(numerator / denominator))
}

fn day_key(epoch_secs: i64) -> Option<String> {
    DateTime::from_timestamp(epoch_secs, 0).map(|dt| dt.format("%Y-%m-%d").to_string())
}

/// News entries of a search response; empty when the provider has none.
pub fn parse_news(doc: &Value) -> Vec<Value> {
    doc.get("news")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default()
}

/// Annual fundamentals as a table with one column per fiscal period end
/// (newest first) and one row per line item, in `keys` order. Items the
/// provider has no data for are left out.
pub fn parse_timeseries(doc: &Value, prefix: &str, keys: &[&str]) -> Result<Table, UpstreamError> {
    let results = doc
        .pointer("/timeseries/result")
        .and_then(Value::as_array)
        .ok_or_else(|| UpstreamError::Decode("missing 'timeseries.result'".into()))?;

    // line item -> (period end -> reported value)
    let mut items: BTreeMap<String, BTreeMap<String, Value>> = BTreeMap::new();
    for result in results {
        let Some(type_name) = result.pointer("/meta/type/0").and_then(Value::as_str) else {
            continue;
        };
        let Some(points) = result.get(type_name).and_then(Value::as_array) else {
            continue;
        };
        let item = type_name.strip_prefix(prefix).unwrap_or(type_name);

        let values = items.entry(item.to_string()).or_default();
        for point in points.iter().filter(|p| !p.is_null()) {
            let Some(as_of) = point.get("asOfDate").and_then(Value::as_str) else {
                continue;
            };
            let reported = point
                .pointer("/reportedValue/raw")
                .cloned()
                .unwrap_or(Value::Null);
            values.insert(as_of.to_string(), reported);
        }
    }

    let mut periods: Vec<&String> = items.values().flat_map(|v| v.keys()).collect();
    periods.sort_unstable_by(|a, b| b.cmp(a));
    periods.dedup();

    let mut table = Table::new(None, periods.iter().map(|p| p.as_str()));
    for key in keys {
        let Some(values) = items.get(*key).filter(|v| !v.is_empty()) else {
            continue;
        };
        let row = periods
            .iter()
            .map(|p| values.get(*p).cloned().unwrap_or(Value::Null))
            .collect();
        table.push_row(Value::from(*key), row);
    }

    Ok(table)
}

/// `institutionOwnership` module as the institutional holders table.
pub fn institutional_holders_table(module: &Map<String, Value>) -> Table {
    let mut table = Table::new(None, INSTITUTIONAL_HOLDER_COLUMNS);

    for holder in list_field(module, "ownershipList") {
        table.push_positional(vec![
            timestamp_cell(holder.get("reportDate")),
            field(holder, "organization"),
            field(holder, "pctHeld"),
            field(holder, "position"),
            field(holder, "value"),
            field(holder, "pctChange"),
        ]);
    }
    table
}

/// `majorHoldersBreakdown` module as a `Breakdown` -> `Value` table.
pub fn major_holders_table(module: &Map<String, Value>) -> Table {
    let mut table = Table::new(Some("Breakdown"), ["Value"]);

    for key in MAJOR_HOLDER_KEYS {
        if let Some(value) = module.get(key).filter(|v| !v.is_null()) {
            table.push_row(Value::from(key), vec![value.clone()]);
        }
    }
    table
}

/// `recommendationTrend` module, one row per period.
pub fn recommendations_table(module: &Map<String, Value>) -> Table {
    let mut table = Table::new(None, RECOMMENDATION_COLUMNS);

    for trend in list_field(module, "trend") {
        table.push_positional(
            RECOMMENDATION_COLUMNS
                .iter()
                .map(|column| field(trend, column))
                .collect(),
        );
    }
    table
}

/// Past (`earningsHistory`) and upcoming (`calendarEvents`) earnings, newest
/// first. The surprise is expressed in percent.
pub fn earnings_dates_table(modules: &Map<String, Value>) -> Table {
    let mut table = Table::new(Some("Earnings Date"), EARNINGS_COLUMNS);

    if let Some(history) = modules.get("earningsHistory").and_then(Value::as_object) {
        for entry in list_field(history, "history") {
            let Some(quarter) = entry.get("quarter").and_then(Value::as_i64) else {
                continue;
            };
            let surprise = entry
                .get("surprisePercent")
                .and_then(Value::as_f64)
                .map(|s| Value::from(s * 100.0))
                .unwrap_or(Value::Null);
            table.push_row(
                Value::from(quarter),
                vec![field(entry, "epsEstimate"), field(entry, "epsActual"), surprise],
            );
        }
    }

    if let Some(earnings) = modules
        .get("calendarEvents")
        .and_then(|c| c.get("earnings"))
    {
        let estimate = earnings.get("earningsAverage").cloned().unwrap_or(Value::Null);
        let upcoming = earnings
            .get("earningsDate")
            .and_then(Value::as_array)
            .and_then(|dates| dates.first())
            .and_then(Value::as_i64);
        if let Some(date) = upcoming {
            table.push_row(Value::from(date), vec![estimate, Value::Null, Value::Null]);
        }
    }

    table.sort_by_label(true);

    // Labels are sorted as epoch seconds, then rendered
    let mut rendered = Table::new(table.index_name(), table.columns().iter().map(String::as_str));
    for row in table.rows() {
        rendered.push_row(timestamp_cell(Some(&row.label)), row.values.clone());
    }
    rendered
}

/// `esgScores` module as a single `esgScores` column keyed by score name.
pub fn sustainability_table(module: &Map<String, Value>) -> Table {
    let mut table = Table::new(None, ["esgScores"]);

    for (key, value) in module {
        if key == "maxAge" {
            continue;
        }
        table.push_row(Value::from(key.as_str()), vec![value.clone()]);
    }
    table
}

/// `insiderTransactions` module, one row per transaction.
pub fn insider_table(module: &Map<String, Value>) -> Table {
    let mut table = Table::new(None, INSIDER_COLUMNS.iter().map(|(column, _)| *column));

    for transaction in list_field(module, "transactions") {
        table.push_positional(
            INSIDER_COLUMNS
                .iter()
                .map(|(column, source)| match *column {
                    "Start Date" => timestamp_cell(transaction.get(*source)),
                    _ => field(transaction, source),
                })
                .collect(),
        );
    }
    table
}

/// Expiration dates of an options response, as `YYYY-MM-DD`.
pub fn parse_expirations(doc: &Value) -> Result<Vec<String>, UpstreamError> {
    let result = first_result(doc, "optionChain")?;

    Ok(result
        .get("expirationDates")
        .and_then(Value::as_array)
        .map(|dates| {
            dates
                .iter()
                .filter_map(Value::as_i64)
                .filter_map(day_key)
                .collect()
        })
        .unwrap_or_default())
}

/// Calls and puts of an options response for a single expiration.
pub fn parse_option_chain(doc: &Value) -> Result<OptionChain, UpstreamError> {
    let result = first_result(doc, "optionChain")?;
    let chain = result
        .pointer("/options/0")
        .ok_or_else(|| UpstreamError::NoData("no option chain for this expiration".into()))?;

    Ok(OptionChain {
        calls: option_legs(chain.get("calls")),
        puts: option_legs(chain.get("puts")),
    })
}

fn option_legs(legs: Option<&Value>) -> Table {
    let mut table = Table::new(None, OPTION_COLUMNS);

    for leg in legs.and_then(Value::as_array).into_iter().flatten() {
        let leg = unwrap_raw(leg.clone());
        table.push_positional(
            OPTION_COLUMNS
                .iter()
                .map(|column| match *column {
                    "lastTradeDate" => timestamp_cell(leg.get(*column)),
                    _ => leg.get(*column).cloned().unwrap_or(Value::Null),
                })
                .collect(),
        );
    }
    table
}

/// Converts a `YYYY-MM-DD` expiration date into the epoch seconds of its
/// midnight UTC, the form the options endpoint expects.
pub fn expiration_epoch(date: &str) -> Result<i64, UpstreamError> {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|e| UpstreamError::Decode(format!("invalid expiration date '{}': {}", date, e)))?;
    day.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| UpstreamError::Decode(format!("invalid expiration date '{}'", date)))
}

fn list_field<'a>(module: &'a Map<String, Value>, name: &str) -> impl Iterator<Item = &'a Value> {
    module
        .get(name)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
}

fn field(object: &Value, name: &str) -> Value {
    object.get(name).cloned().unwrap_or(Value::Null)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn chart_doc() -> Value {
        json!({
            "chart": {
                "result": [{
                    "meta": {"symbol": "AAPL", "currency": "USD"},
                    "timestamp": [1704205800, 1704292200, 1704378600],
                    "events": {
                        "dividends": {
                            "1704292200": {"amount": 0.24, "date": 1704292200}
                        },
                        "splits": {
                            "1704378600": {"date": 1704378600, "numerator": 4, "denominator": 1, "splitRatio": "4:1"}
                        }
                    },
                    "indicators": {
                        "quote": [{
                            "open": [187.15, 184.22, 182.15],
                            "high": [188.44, 185.88, 183.09],
                            "low": [183.89, 183.43, 180.88],
                            "close": [185.64, 184.25, 181.91],
                            "volume": [82488700, 58414500, 71983600]
                        }]
                    }
                }],
                "error": null
            }
        })
    }

    #[test]
    fn history_rows_carry_bars_and_events() {
        let doc = chart_doc();
        let table = history_table(parse_chart(&doc).unwrap());

        assert_eq!(table.len(), 3);
        assert_eq!(table.index_name(), Some("Date"));

        let records = table.reset_index().to_records();
        let keys: Vec<&String> = records[0].keys().collect();
        assert_eq!(
            keys,
            ["Date", "Open", "High", "Low", "Close", "Volume", "Dividends", "Stock Splits"]
        );
        assert_eq!(records[0]["Date"], json!("2024-01-02T14:30:00Z"));
        assert_eq!(records[0]["Close"], json!(185.64));
        assert_eq!(records[0]["Dividends"], json!(0.0));
        assert_eq!(records[1]["Dividends"], json!(0.24));
        assert_eq!(records[2]["Stock Splits"], json!(4.0));
    }

    #[test]
    fn chart_error_is_no_data() {
        let doc = json!({"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}});
        let err = parse_chart(&doc).unwrap_err();
        assert!(matches!(err, UpstreamError::NoData(msg) if msg.contains("delisted")));
    }

    #[test]
    fn dividend_and_split_series() {
        let doc = chart_doc();
        let chart = parse_chart(&doc).unwrap();

        let dividends = dividends_table(chart).reset_index().to_records();
        assert_eq!(dividends.len(), 1);
        assert_eq!(dividends[0]["Date"], json!("2024-01-03T14:30:00Z"));
        assert_eq!(dividends[0]["Dividends"], json!(0.24));

        let splits = splits_table(chart).reset_index().to_records();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0]["Stock Splits"], json!(4.0));
    }

    #[test]
    fn chart_without_events_has_empty_series() {
        let doc = json!({"chart": {"result": [{"timestamp": [], "indicators": {"quote": [{}]}}], "error": null}});
        let chart = parse_chart(&doc).unwrap();

        assert!(dividends_table(chart).is_empty());
        assert!(splits_table(chart).is_empty());
        assert!(history_table(chart).is_empty());
    }

    #[test]
    fn news_list_defaults_to_empty() {
        let doc = json!({"count": 1, "news": [{"uuid": "a1", "title": "Apple ships"}]});
        assert_eq!(parse_news(&doc).len(), 1);
        assert!(parse_news(&json!({"count": 0, "quotes": []})).is_empty());
    }

    #[test]
    fn timeseries_columns_are_newest_first() {
        let doc = json!({
            "timeseries": {
                "result": [
                    {
                        "meta": {"symbol": ["AAPL"], "type": ["annualNetIncome"]},
                        "timestamp": [1664496000, 1696032000],
                        "annualNetIncome": [
                            {"asOfDate": "2022-09-30", "reportedValue": {"raw": 99803000000u64, "fmt": "99.8B"}},
                            {"asOfDate": "2023-09-30", "reportedValue": {"raw": 96995000000u64, "fmt": "97B"}}
                        ]
                    },
                    {
                        "meta": {"symbol": ["AAPL"], "type": ["annualTotalRevenue"]},
                        "annualTotalRevenue": [
                            null,
                            {"asOfDate": "2023-09-30", "reportedValue": {"raw": 383285000000u64, "fmt": "383.29B"}}
                        ]
                    },
                    {"meta": {"symbol": ["AAPL"], "type": ["annualEBITDA"]}}
                ],
                "error": null
            }
        });

        let table = parse_timeseries(&doc, "annual", &["TotalRevenue", "NetIncome", "EBITDA"]).unwrap();
        assert_eq!(table.columns(), ["2023-09-30", "2022-09-30"]);

        let labels: Vec<&Value> = table.rows().iter().map(|r| &r.label).collect();
        assert_eq!(labels, [&json!("TotalRevenue"), &json!("NetIncome")]);

        let map = table.to_column_map();
        assert_eq!(map["2023-09-30"]["TotalRevenue"], json!(383285000000u64));
        assert_eq!(map["2022-09-30"]["TotalRevenue"], Value::Null);
        assert_eq!(map["2022-09-30"]["NetIncome"], json!(99803000000u64));
    }

    #[test]
    fn quote_summary_error_is_no_data() {
        let doc = json!({"quoteSummary": {"result": null, "error": {"code": "Not Found", "description": "Quote not found for symbol: ZZZZ"}}});
        assert!(matches!(quote_summary_modules(&doc), Err(UpstreamError::NoData(_))));
    }

    #[test]
    fn missing_module_is_no_data() {
        let doc = json!({"quoteSummary": {"result": [{"price": {"maxAge": 1}}], "error": null}});
        let modules = quote_summary_modules(&doc).unwrap();

        assert!(summary_module(&modules, "price").is_ok());
        assert!(matches!(
            summary_module(&modules, "esgScores"),
            Err(UpstreamError::NoData(_))
        ));
    }

    #[test]
    fn holders_tables() {
        let doc = json!({"quoteSummary": {"result": [{
            "institutionOwnership": {
                "maxAge": 1,
                "ownershipList": [{
                    "maxAge": 1,
                    "reportDate": {"raw": 1711843200, "fmt": "2024-03-31"},
                    "organization": "Vanguard Group Inc",
                    "pctHeld": {"raw": 0.0876, "fmt": "8.76%"},
                    "position": {"raw": 1341350388u64, "fmt": "1.34B"},
                    "value": {"raw": 230584000000u64, "fmt": "230.58B"},
                    "pctChange": {"raw": 0.0119, "fmt": "1.19%"}
                }]
            },
            "majorHoldersBreakdown": {
                "maxAge": 1,
                "insidersPercentHeld": {"raw": 0.0272, "fmt": "2.72%"},
                "institutionsPercentHeld": {"raw": 0.6148, "fmt": "61.48%"},
                "institutionsFloatPercentHeld": {"raw": 0.632, "fmt": "63.20%"},
                "institutionsCount": {"raw": 6476, "fmt": "6.48k"}
            }
        }], "error": null}});
        let modules = quote_summary_modules(&doc).unwrap();

        let institutional =
            institutional_holders_table(summary_module(&modules, "institutionOwnership").unwrap())
                .to_column_map();
        assert_eq!(institutional["Holder"]["0"], json!("Vanguard Group Inc"));
        assert_eq!(institutional["Date Reported"]["0"], json!("2024-03-31T00:00:00Z"));
        assert_eq!(institutional["Shares"]["0"], json!(1341350388u64));

        let major = major_holders_table(summary_module(&modules, "majorHoldersBreakdown").unwrap())
            .to_column_map();
        assert_eq!(major["Value"]["institutionsCount"], json!(6476));
        assert_eq!(major["Value"].as_object().unwrap().len(), 4);
    }

    #[test]
    fn recommendations_keep_period_order() {
        let module = json!({
            "trend": [
                {"period": "0m", "strongBuy": 11, "buy": 21, "hold": 6, "sell": 0, "strongSell": 0},
                {"period": "-1m", "strongBuy": 10, "buy": 20, "hold": 7, "sell": 1, "strongSell": 0}
            ],
            "maxAge": 86400
        });

        let records = recommendations_table(module.as_object().unwrap())
            .reset_index()
            .to_records();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1]["index"], json!(1));
        assert_eq!(records[1]["period"], json!("-1m"));
        assert_eq!(records[0]["strongBuy"], json!(11));
    }

    #[test]
    fn earnings_dates_are_newest_first_with_percent_surprise() {
        let doc = json!({"quoteSummary": {"result": [{
            "earningsHistory": {"history": [
                {"epsActual": {"raw": 1.53}, "epsEstimate": {"raw": 1.5}, "surprisePercent": {"raw": 0.02}, "quarter": {"raw": 1688083200}},
                {"epsActual": {"raw": 2.18}, "epsEstimate": {"raw": 2.1}, "surprisePercent": {"raw": 0.25}, "quarter": {"raw": 1703980800}}
            ]},
            "calendarEvents": {"earnings": {
                "earningsDate": [{"raw": 1714680000, "fmt": "2024-05-02"}],
                "earningsAverage": {"raw": 1.5}
            }}
        }], "error": null}});
        let modules = quote_summary_modules(&doc).unwrap();

        let records = earnings_dates_table(&modules).reset_index().to_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0]["Earnings Date"], json!("2024-05-02T20:00:00Z"));
        assert_eq!(records[0]["Reported EPS"], Value::Null);
        assert_eq!(records[1]["Earnings Date"], json!("2023-12-31T00:00:00Z"));
        assert_eq!(records[1]["Reported EPS"], json!(2.18));
        assert_eq!(records[1]["Surprise(%)"], json!(25.0));
        assert_eq!(records[2]["EPS Estimate"], json!(1.5));
    }

    #[test]
    fn sustainability_skips_max_age() {
        let module = json!({"maxAge": 86400, "totalEsg": 17.2, "environmentScore": 0.6, "peerGroup": "Technology Hardware"});

        let map = sustainability_table(module.as_object().unwrap()).to_column_map();
        let scores = map["esgScores"].as_object().unwrap();
        assert_eq!(scores.len(), 3);
        assert_eq!(scores["totalEsg"], json!(17.2));
        assert!(!scores.contains_key("maxAge"));
    }

    #[test]
    fn insider_transactions_are_renamed() {
        let doc = json!({"quoteSummary": {"result": [{"insiderTransactions": {"transactions": [{
            "shares": {"raw": 100000, "fmt": "100k"},
            "value": {"raw": 18000000, "fmt": "18M"},
            "filerUrl": "",
            "transactionText": "Sale at price 180.00 per share.",
            "filerName": "COOK TIMOTHY D",
            "filerRelation": "Chief Executive Officer",
            "moneyText": "",
            "startDate": {"raw": 1712102400, "fmt": "2024-04-03"},
            "ownership": "D",
            "maxAge": 1
        }]}}], "error": null}});
        let modules = quote_summary_modules(&doc).unwrap();

        let records = insider_table(summary_module(&modules, "insiderTransactions").unwrap())
            .reset_index()
            .to_records();
        assert_eq!(records[0]["Insider"], json!("COOK TIMOTHY D"));
        assert_eq!(records[0]["Shares"], json!(100000));
        assert_eq!(records[0]["Start Date"], json!("2024-04-03T00:00:00Z"));
        assert_eq!(records[0]["Ownership"], json!("D"));
        assert!(!records[0].contains_key("maxAge"));
    }

    fn options_doc() -> Value {
        json!({"optionChain": {"result": [{
            "underlyingSymbol": "AAPL",
            "expirationDates": [1716508800, 1717113600],
            "options": [{
                "expirationDate": 1716508800,
                "calls": [{
                    "contractSymbol": "AAPL240524C00190000",
                    "strike": 190.0,
                    "currency": "USD",
                    "lastPrice": 1.25,
                    "change": -0.3,
                    "percentChange": -19.35,
                    "volume": 1520,
                    "openInterest": 10233,
                    "bid": 1.2,
                    "ask": 1.3,
                    "contractSize": "REGULAR",
                    "expiration": 1716508800,
                    "lastTradeDate": 1716234000,
                    "impliedVolatility": 0.21,
                    "inTheMoney": false
                }],
                "puts": []
            }]
        }], "error": null}})
    }

    #[test]
    fn expirations_render_as_dates() {
        assert_eq!(
            parse_expirations(&options_doc()).unwrap(),
            ["2024-05-24", "2024-05-31"]
        );
    }

    #[test]
    fn option_chain_legs() {
        let chain = parse_option_chain(&options_doc()).unwrap();

        assert!(chain.puts.is_empty());
        let calls = chain.calls.to_records();
        let keys: Vec<&String> = calls[0].keys().collect();
        assert_eq!(keys, OPTION_COLUMNS);
        assert_eq!(calls[0]["strike"], json!(190.0));
        assert_eq!(calls[0]["lastTradeDate"], json!("2024-05-20T19:40:00Z"));
    }

    #[test]
    fn expiration_dates_map_to_midnight_utc() {
        assert_eq!(expiration_epoch("2024-05-24").unwrap(), 1716508800);
        assert!(matches!(expiration_epoch("24/05/2024"), Err(UpstreamError::Decode(_))));
    }
}
