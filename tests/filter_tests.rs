use std::collections::BTreeSet;

use chrono::Utc;
use serde_json::{json, Value};
use uuid::Uuid;

use projectconf::filters::legacy_browsers::{self, EnableRequest, Subfilter};
use projectconf::filters::user_agent::{Browser, BuiltinParser, UserAgentParser};
use projectconf::filters::FilterState;
use projectconf::models::{Project, ProjectStatus};
use projectconf::options::MemoryOptionStore;

const IE8: &str = "Mozilla/4.0 (compatible; MSIE 8.0; Windows NT 6.1; Trident/4.0)";
const IE9: &str = "Mozilla/5.0 (compatible; MSIE 9.0; Windows NT 6.1; Trident/5.0)";
const IE11: &str = "Mozilla/5.0 (Windows NT 6.3; Trident/7.0; rv:11.0) like Gecko";
const SAFARI5: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_6_8) AppleWebKit/534.57.2 (KHTML, like Gecko) Version/5.1.7 Safari/534.57.2";
const OPERA12: &str = "Opera/9.80 (Windows NT 6.1) Presto/2.12.388 Version/12.16";
const ANDROID2: &str = "Mozilla/5.0 (Linux; U; Android 2.3.5; en-us; HTC Vision Build/GRI40) AppleWebKit/533.1 (KHTML, like Gecko) Version/4.0 Mobile Safari/533.1";
const CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

fn project() -> Project {
    Project {
        id: Uuid::now_v7(),
        organization_id: Uuid::now_v7(),
        team_id: Uuid::now_v7(),
        slug: "web".to_string(),
        name: "Web".to_string(),
        forced_color: None,
        public: false,
        status: ProjectStatus::Visible,
        first_event: None,
        date_added: Utc::now(),
    }
}

fn event(user_agent: &str) -> Value {
    json!({
        "platform": "javascript",
        "sentry.interfaces.Http": {
            "url": "http://example.com",
            "headers": [["Accept", "*/*"], ["User-Agent", user_agent]],
        },
    })
}

fn subset(ids: &[&str]) -> FilterState {
    FilterState::Subset(ids.iter().map(|s| s.to_string()).collect::<BTreeSet<_>>())
}

// ── User agent parsing ──────────────────────────────────────────

#[test]
fn parses_browser_families() {
    let parser = BuiltinParser;
    let cases = [
        (IE8, "IE", 8),
        (IE11, "IE", 11),
        (SAFARI5, "Safari", 5),
        (OPERA12, "Opera", 12),
        (ANDROID2, "Android", 2),
        (CHROME, "Chrome", 120),
    ];
    for (ua, family, major) in cases {
        assert_eq!(
            parser.parse(ua),
            Some(Browser {
                family: family.to_string(),
                major: Some(major),
            }),
            "{ua}"
        );
    }
    assert_eq!(parser.parse("curl/8.0"), None);
}

// ── Filtering ───────────────────────────────────────────────────

#[test]
fn filter_off_keeps_everything() {
    assert!(!legacy_browsers::test_event(&FilterState::Off, &event(IE8), &BuiltinParser));
}

#[test]
fn filter_all_uses_default_minimum_versions() {
    let parser = BuiltinParser;
    assert!(legacy_browsers::test_event(&FilterState::All, &event(IE9), &parser));
    assert!(legacy_browsers::test_event(&FilterState::All, &event(SAFARI5), &parser));
    assert!(legacy_browsers::test_event(&FilterState::All, &event(ANDROID2), &parser));
    assert!(!legacy_browsers::test_event(&FilterState::All, &event(IE11), &parser));
    assert!(!legacy_browsers::test_event(&FilterState::All, &event(CHROME), &parser));
}

#[test]
fn subfilters_only_match_their_browsers() {
    let parser = BuiltinParser;
    let state = subset(&["ie9"]);
    assert!(legacy_browsers::test_event(&state, &event(IE9), &parser));
    assert!(!legacy_browsers::test_event(&state, &event(IE8), &parser));

    let state = subset(&["ie_pre_9", "opera_pre_15", "unknown"]);
    assert!(legacy_browsers::test_event(&state, &event(IE8), &parser));
    assert!(legacy_browsers::test_event(&state, &event(OPERA12), &parser));
    assert!(!legacy_browsers::test_event(&state, &event(SAFARI5), &parser));
}

#[test]
fn only_javascript_events_with_user_agent_are_filtered() {
    let parser = BuiltinParser;
    let mut python = event(IE8);
    python["platform"] = json!("python");
    assert!(!legacy_browsers::test_event(&FilterState::All, &python, &parser));

    let no_headers = json!({ "platform": "javascript" });
    assert!(!legacy_browsers::test_event(&FilterState::All, &no_headers, &parser));

    let map_headers = json!({
        "platform": "javascript",
        "sentry.interfaces.Http": { "headers": { "user-agent": IE8 } },
    });
    assert!(legacy_browsers::test_event(&FilterState::All, &map_headers, &parser));
}

#[test]
fn subfilter_ids_round_trip() {
    for subfilter in Subfilter::ALL {
        assert_eq!(Subfilter::from_id(subfilter.id()), Some(subfilter));
    }
    assert_eq!(Subfilter::from_id("netscape"), None);
}

// ── Stored configuration ────────────────────────────────────────

#[tokio::test]
async fn enable_and_read_back() {
    let store = MemoryOptionStore::new();
    let project = project();

    assert_eq!(
        legacy_browsers::is_enabled(&project, &store).await.unwrap(),
        FilterState::Off
    );

    let state = legacy_browsers::enable(
        &project,
        &store,
        &EnableRequest {
            active: None,
            subfilters: Some(vec!["safari_pre_6".to_string(), "ie9".to_string()]),
        },
    )
    .await
    .unwrap();
    assert_eq!(state, subset(&["ie9", "safari_pre_6"]));
    assert_eq!(
        legacy_browsers::is_enabled(&project, &store).await.unwrap(),
        state
    );
    assert!(legacy_browsers::test(&project, &store, &event(IE9), &BuiltinParser)
        .await
        .unwrap());

    // `active` wins over subfilters.
    let state = legacy_browsers::enable(
        &project,
        &store,
        &EnableRequest {
            active: Some(false),
            subfilters: Some(vec!["ie9".to_string()]),
        },
    )
    .await
    .unwrap();
    assert_eq!(state, FilterState::Off);

    let err = legacy_browsers::enable(
        &project,
        &store,
        &EnableRequest {
            active: None,
            subfilters: Some(vec!["netscape".to_string()]),
        },
    )
    .await;
    assert!(err.is_err());
}
