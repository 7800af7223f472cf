/// Suffixes of normalized tickers that mark a USD or stablecoin quoted pair,
/// or a perpetual contract. Longer suffixes come first.
pub const CRYPTO_PAIR_SUFFIXES: [&str; 7] = ["FDUSD", "USDT", "USDC", "BUSD", "TUSD", "PERP", "USD"];

/// Shortest base left after a pair suffix for the ticker to count as a pair.
/// Keeps five-letter equities such as `ABUSD` out.
pub const CRYPTO_PAIR_MIN_BASE_LEN: usize = 3;

/// Base tickers treated as crypto assets.
/// Symbols shared with listed equities (STX, SAND, OP) are left out.
pub const KNOWN_CRYPTO_TICKERS: [&str; 47] = [
    "BTC", "ETH", "XRP", "LTC", "BCH", "ADA", "DOT", "LINK", "XLM", "DOGE", "UNI", "SOL", "AVAX",
    "MATIC", "POL", "ATOM", "ALGO", "VET", "FIL", "TRX", "ETC", "XMR", "AAVE", "MKR", "COMP",
    "SNX", "YFI", "SUSHI", "CRV", "BNB", "SHIB", "NEAR", "ICP", "ARB", "SUI", "HBAR", "INJ", "TIA",
    "GRT", "MANA", "AXS", "LDO", "PEPE", "USDT", "USDC", "DAI", "WBTC",
];

/// Widely held exchange traded funds recognized by ticker alone.
pub const KNOWN_ETF_TICKERS: [&str; 20] = [
    "SPY", "QQQ", "VOO", "VTI", "IWM", "DIA", "VEA", "VWO", "AGG", "BND", "GLD", "SLV", "TLT",
    "ARKK", "SCHD", "VGT", "XLF", "XLK", "EEM", "IVV",
];
