//! User agent selection.

/// Agent sent unless configured otherwise.
pub const DEFAULT_USER_AGENT: &str = "waybacktweets/0.1 (archive research; +https://web.archive.org/)";

/// Desktop browser agents used when `user_agent = "impersonate"`.
const BROWSER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:133.0) Gecko/20100101 Firefox/133.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/18.1 Safari/605.1.15",
];

/// Which agent to present to the archive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAgent {
    Default,
    /// One of a few real browser agents, fixed for the life of the process.
    Browser,
    Custom(String),
}

impl UserAgent {
    /// Interpret the `user_agent` setting. Blank values mean the default.
    pub fn from_setting(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") => Self::Default,
            Some(v) if v.eq_ignore_ascii_case("impersonate") => Self::Browser,
            Some(v) => Self::Custom(v.to_string()),
        }
    }

    pub fn header_value(&self) -> &str {
        match self {
            Self::Default => DEFAULT_USER_AGENT,
            Self::Browser => BROWSER_AGENTS[std::process::id() as usize % BROWSER_AGENTS.len()],
            Self::Custom(agent) => agent,
        }
    }
}
