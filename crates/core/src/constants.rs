/// Broker source tag used for holdings entered or uploaded by hand
pub const MANUAL_BROKER_SOURCE: &str = "manual";

/// Number of leading lines inspected when auto-detecting the delimiter
pub const DELIMITER_SNIFF_LINES: usize = 10;

/// Candidate delimiters for auto-detection, in tie-break order
pub const CANDIDATE_DELIMITERS: [char; 3] = [',', ';', '\t'];
