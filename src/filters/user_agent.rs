use std::sync::LazyLock;

use regex::Regex;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Browser {
    pub family: String,
    pub major: Option<u32>,
}

pub trait UserAgentParser: Send + Sync {
    fn parse(&self, user_agent: &str) -> Option<Browser>;
}

/// Family/major-version extraction for the browsers the inbound filters
/// care about. Rules are tried in order; the first match wins.
pub struct BuiltinParser;

static RULES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"Edge?/(\d+)", "Edge"),
        (r"OPR/(\d+)", "Opera"),
        (r"Opera.*Version/(\d+)", "Opera"),
        (r"Opera[/ ](\d+)", "Opera"),
        (r"MSIE (\d+)", "IE"),
        (r"Trident/.*rv:(\d+)", "IE"),
        (r"Firefox/(\d+)", "Firefox"),
        (r"Android.*Chrome/(\d+).*Mobile", "Chrome Mobile"),
        (r"Chrome/(\d+)", "Chrome"),
        (r"Android (\d+)[^;]*;.*Version/[\d.]+.*Safari", "Android"),
        (r"(?:iPhone|iPad|iPod).*Version/(\d+).*Mobile.*Safari", "Mobile Safari"),
        (r"Version/(\d+).*Safari/", "Safari"),
    ]
    .into_iter()
    .map(|(pattern, family)| (Regex::new(pattern).unwrap(), family))
    .collect()
});

impl UserAgentParser for BuiltinParser {
    fn parse(&self, user_agent: &str) -> Option<Browser> {
        RULES.iter().find_map(|(re, family)| {
            re.captures(user_agent).map(|caps| Browser {
                family: family.to_string(),
                major: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            })
        })
    }
}
