//! # Stock Data Live Test
//!
//! Hits the real Yahoo Finance endpoints through lib_common and prints what
//! comes back for one symbol. Run by hand; it needs network access.

use clap::Parser;
use lib_common::markets::yahoo::YAHOO_QUERY_URL;
use lib_common::{StockDataProvider, YahooFinance};

#[derive(Parser, Debug)]
#[clap(about = "Live smoke test for the Yahoo Finance accessor")]
struct Args {
    /// Ticker symbol to query.
    #[clap(default_value = "AAPL")]
    symbol: String,
}

/// Executes the live fetches.
///
/// // Statement: Exits with status 1 on the first failed call.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let args = Args::parse();
    let provider = YahooFinance::new(YAHOO_QUERY_URL)?;

    println!("[*] Requesting info for {} from Yahoo Finance...", args.symbol);

    match provider.info(&args.symbol).await {
        Ok(info) => {
            // // Statement: Success - Print a few well-known fields
            println!("\n[SUCCESS] Info received:");
            println!("-----------------------------------------------");
            for key in ["longName", "previousClose", "dayLow", "dayHigh", "marketCap", "trailingPE"] {
                println!("{:>16}: {}", key, info.get_or_null(key));
            }
            println!("-----------------------------------------------");
        }
        Err(e) => {
            eprintln!("\n[ERROR] Info retrieval failed:");
            eprintln!(">>> {}", e);
            std::process::exit(1);
        }
    }

    match provider.history(&args.symbol, "5d", "1d").await {
        Ok(table) => {
            // // Statement: Show the flattened daily bars as the gateway would
            let records = table.reset_index().to_records();
            println!("\n[SUCCESS] {} daily bars received:", records.len());
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Err(e) => {
            eprintln!("\n[ERROR] History retrieval failed:");
            eprintln!(">>> {}", e);
            std::process::exit(1);
        }
    }

    match provider.options(&args.symbol).await {
        Ok(dates) => println!("\n[INFO] {} option expirations, first: {:?}", dates.len(), dates.first()),
        Err(e) => {
            eprintln!("\n[ERROR] Options retrieval failed:");
            eprintln!(">>> {}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
