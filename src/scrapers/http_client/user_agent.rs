//! User agent selection for status lookups.

pub const USER_AGENT: &str = concat!("casepoll/", env!("CARGO_PKG_VERSION"));

/// Browser user agents used when the operator asks to impersonate a browser.
pub const BROWSER_USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:133.0) Gecko/20100101 Firefox/133.0",
];

/// Pick a browser user agent, varying between process runs.
pub fn browser_user_agent() -> &'static str {
    let seed = std::process::id() as usize;
    BROWSER_USER_AGENTS[seed % BROWSER_USER_AGENTS.len()]
}

/// Resolve the configured user agent.
/// - None => crate user agent
/// - "impersonate" => a browser user agent
/// - other => used verbatim
pub fn resolve_user_agent(config: Option<&str>) -> String {
    match config {
        None => USER_AGENT.to_string(),
        Some("impersonate") => browser_user_agent().to_string(),
        Some(custom) => custom.to_string(),
    }
}
