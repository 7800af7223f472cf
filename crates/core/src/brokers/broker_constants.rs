/// Quote currencies stripped from combined exchange pair symbols.
/// Longer codes come first so `FDUSD` wins over `USD`.
pub const QUOTE_CURRENCY_SUFFIXES: [&str; 10] = [
    "FDUSD", "USDT", "USDC", "BUSD", "TUSD", "USD", "EUR", "BTC", "ETH", "BNB",
];

/// First cell of a row that opens an Interactive Brokers trades section, and
/// the section name on every row of a native statement.
pub const IBKR_TRADES_MARKER: &str = "trades";

/// Second cell of a native statement row holding the section's columns.
pub const IBKR_HEADER_ROW: &str = "header";

/// Second cell of a native statement row holding one record.
pub const IBKR_DATA_ROW: &str = "data";

/// Data discriminator of an executed trade; other values are subtotals or
/// per-fill detail already counted in the order row.
pub const IBKR_ORDER_DISCRIMINATOR: &str = "order";

/// First-cell prefixes that close an Interactive Brokers trades section.
pub const IBKR_SECTION_TERMINATORS: [&str; 3] = ["total", "summary", "notes"];
