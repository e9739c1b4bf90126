/// Chart timeframe tokens accepted by the historical route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timeframe {
    OneDay,
    OneWeek,
    OneMonth,
    ThreeMonths,
    OneYear,
    ThreeYears,
    FiveYears,
    All,
}

impl Timeframe {
    /// Recognizes the exact, case-sensitive tokens `1D 1W 1M 3M 1YR 3YR 5YR ALL`.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "1D" => Some(Timeframe::OneDay),
            "1W" => Some(Timeframe::OneWeek),
            "1M" => Some(Timeframe::OneMonth),
            "3M" => Some(Timeframe::ThreeMonths),
            "1YR" => Some(Timeframe::OneYear),
            "3YR" => Some(Timeframe::ThreeYears),
            "5YR" => Some(Timeframe::FiveYears),
            "ALL" => Some(Timeframe::All),
            _ => None,
        }
    }

    /// Upstream period string.
    pub fn period(self) -> &'static str {
        match self {
            Timeframe::OneDay => "1d",
            Timeframe::OneWeek => "5d",
            Timeframe::OneMonth => "1mo",
            Timeframe::ThreeMonths => "3mo",
            Timeframe::OneYear => "1y",
            Timeframe::ThreeYears => "3y",
            Timeframe::FiveYears => "5y",
            Timeframe::All => "max",
        }
    }
}

/// Period for a timeframe token; unknown tokens fall back to one year.
pub fn period_for(token: &str) -> &'static str {
    Timeframe::from_token(token)
        .unwrap_or(Timeframe::OneYear)
        .period()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_every_token() {
        let cases = [
            ("1D", "1d"),
            ("1W", "5d"),
            ("1M", "1mo"),
            ("3M", "3mo"),
            ("1YR", "1y"),
            ("3YR", "3y"),
            ("5YR", "5y"),
            ("ALL", "max"),
        ];
        for (token, period) in cases {
            assert_eq!(period_for(token), period, "token {}", token);
        }
    }

    #[test]
    fn unknown_tokens_default_to_one_year() {
        assert_eq!(period_for("2W"), "1y");
        assert_eq!(period_for("1d"), "1y");
        assert_eq!(period_for(""), "1y");
    }
}
