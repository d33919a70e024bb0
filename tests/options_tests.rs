use std::sync::Arc;

use chrono::Utc;
use serde_json::{json, Map, Value};
use uuid::Uuid;

use projectconf::locks::{LockManager, MemoryLockBackend};
use projectconf::models::{Project, ProjectStatus};
use projectconf::options::normalize::{clean_newline_inputs, join_lines, textarea_entries};
use projectconf::options::{ConfigSchema, MemoryOptionStore, OptionError, OptionStore};
use projectconf::project::SECURITY_TOKEN_KEY;

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

// ── Normalization ───────────────────────────────────────────────

#[test]
fn newline_inputs_are_lowercased_trimmed_and_compacted() {
    assert_eq!(
        clean_newline_inputs("  Foo.com\n\n\tBAR.org \n"),
        vec!["foo.com", "bar.org"]
    );
    assert!(clean_newline_inputs("\n \n").is_empty());
}

#[test]
fn textarea_entries_accept_lists() {
    let value = json!(["  Card ", "", "Token\nSecret"]);
    assert_eq!(textarea_entries(&value, false), vec!["Card", "Token", "Secret"]);
    assert_eq!(join_lines(&json!(["a", "b"])), "a\nb");
}

// ── Schema ──────────────────────────────────────────────────────

#[test]
fn unknown_option_is_rejected() {
    let schema = ConfigSchema::project();
    let err = schema.clean("foo:bar", json!(1)).unwrap_err();
    assert_eq!(err, OptionError::Unknown("foo:bar".to_string()));
    assert_eq!(err.to_string(), "Unknown option: foo:bar");
}

#[test]
fn boolean_options_are_coerced() {
    let schema = ConfigSchema::project();
    assert_eq!(schema.clean("sentry:scrub_data", json!("off")).unwrap(), json!(false));
    assert_eq!(schema.clean("sentry:scrub_ip_address", json!(1)).unwrap(), json!(true));
    assert!(schema.clean("sentry:scrub_data", json!("maybe")).is_err());
}

#[test]
fn branding_is_stored_as_flag() {
    let schema = ConfigSchema::project();
    assert_eq!(schema.clean("feedback:branding", json!(false)).unwrap(), json!("0"));
    assert_eq!(schema.clean("feedback:branding", json!(true)).unwrap(), json!("1"));
}

#[test]
fn resolve_age_must_be_an_allowed_value() {
    let schema = ConfigSchema::project();
    assert_eq!(schema.clean("sentry:resolve_age", json!("24")).unwrap(), json!(24));
    assert!(schema.clean("sentry:resolve_age", json!(13)).is_err());
    assert!(schema.clean("sentry:resolve_age", json!(500)).is_err());
    assert!(schema.clean("sentry:resolve_age", json!("soon")).is_err());
}

#[test]
fn origins_are_normalized_then_validated() {
    let schema = ConfigSchema::project();
    let cleaned = schema
        .clean("sentry:origins", json!("https://Example.com\n*.foo.org\n*"))
        .unwrap();
    assert_eq!(cleaned, json!(["https://example.com", "*.foo.org", "*"]));

    let err = schema
        .clean("sentry:origins", json!("has space.com"))
        .unwrap_err();
    assert!(matches!(err, OptionError::Invalid { .. }));
}

#[test]
fn blacklisted_ips_accept_addresses_and_networks() {
    let schema = ConfigSchema::project();
    let cleaned = schema
        .clean("sentry:blacklisted_ips", json!("10.0.0.1\n192.168.0.0/24\n::1"))
        .unwrap();
    assert_eq!(cleaned, json!(["10.0.0.1", "192.168.0.0/24", "::1"]));

    let err = schema
        .clean("sentry:blacklisted_ips", json!("10.0.0.300"))
        .unwrap_err();
    assert!(err.to_string().starts_with("sentry:blacklisted_ips:"));
}

#[test]
fn subject_prefix_is_limited() {
    let schema = ConfigSchema::project();
    assert!(schema.clean("mail:subject_prefix", json!("[web] ")).is_ok());
    assert!(schema
        .clean("mail:subject_prefix", Value::String("x".repeat(201)))
        .is_err());
}

#[test]
fn clean_all_reports_every_failure() {
    let schema = ConfigSchema::project();
    let mut input = Map::new();
    input.insert("sentry:scrub_data".to_string(), json!(true));
    input.insert("nope".to_string(), json!(1));
    input.insert("sentry:resolve_age".to_string(), json!(-1));

    let errors = schema.clean_all(&input).unwrap_err();
    assert_eq!(errors.len(), 2);
}

#[test]
fn read_options_fill_defaults() {
    let schema = ConfigSchema::project();
    let mut stored = std::collections::HashMap::new();
    stored.insert("sentry:origins".to_string(), json!(["a.com", "b.com"]));
    stored.insert("feedback:branding".to_string(), json!("0"));

    let options = schema.read_options(&stored);
    assert_eq!(options["sentry:origins"], "a.com\nb.com");
    assert_eq!(options["feedback:branding"], false);
    assert_eq!(options["sentry:scrub_defaults"], true);
    assert_eq!(options["sentry:safe_fields"], json!([]));
    assert_eq!(options["mail:subject_prefix"], Value::Null);
    assert_eq!(options.len(), schema.fields().len());
}

// ── Option store ────────────────────────────────────────────────

#[tokio::test]
async fn option_store_round_trip() {
    let store = MemoryOptionStore::new();
    let project = project();

    assert_eq!(
        project.get_option_or(&store, "sentry:scrub_data", json!(true)).await.unwrap(),
        json!(true)
    );

    project
        .update_option(&store, "sentry:scrub_data", &json!(false))
        .await
        .unwrap();
    assert_eq!(
        project.get_option(&store, "sentry:scrub_data").await.unwrap(),
        Some(json!(false))
    );

    project.delete_option(&store, "sentry:scrub_data").await.unwrap();
    assert!(store.get_all(project.id).await.unwrap().is_empty());
}

// ── Security token ──────────────────────────────────────────────

#[tokio::test]
async fn security_token_generated_once_under_concurrency() {
    let store = Arc::new(MemoryOptionStore::new());
    let locks = LockManager::new(Arc::new(MemoryLockBackend::new()));
    let project = Arc::new(project());

    let mut handles = Vec::new();
    for _ in 0..8 {
        let (store, locks, project) = (store.clone(), locks.clone(), project.clone());
        handles.push(tokio::spawn(async move {
            project.get_security_token(store.as_ref(), &locks).await
        }));
    }

    let mut tokens = Vec::new();
    for handle in handles {
        tokens.push(handle.await.unwrap().unwrap());
    }

    let stored = project
        .get_option(store.as_ref(), SECURITY_TOKEN_KEY)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(tokens.len(), 8);
    assert!(tokens.iter().all(|t| *t == stored));
    assert_eq!(stored.as_str().unwrap().len(), 32);
}

#[tokio::test]
async fn security_token_waits_for_short_held_lock() {
    let store = MemoryOptionStore::new();
    let locks = LockManager::new(Arc::new(MemoryLockBackend::new()));
    let project = project();

    let guard = locks
        .get(
            format!("{SECURITY_TOKEN_KEY}:{}", project.id),
            std::time::Duration::from_secs(5),
        )
        .acquire()
        .await
        .unwrap();

    let holder = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        guard.release().await;
    });

    let token = project.get_security_token(&store, &locks).await.unwrap();
    holder.await.unwrap();
    assert_eq!(token.len(), 32);
}

#[tokio::test]
async fn security_token_busy_lock_is_unavailable() {
    let store = MemoryOptionStore::new();
    let locks = LockManager::new(Arc::new(MemoryLockBackend::new()));
    let project = project();

    let guard = locks
        .get(
            format!("{SECURITY_TOKEN_KEY}:{}", project.id),
            std::time::Duration::from_secs(5),
        )
        .acquire()
        .await
        .unwrap();

    let err = project.get_security_token(&store, &locks).await.unwrap_err();
    assert!(matches!(err, projectconf::error::AppError::Unavailable(_)));

    guard.release().await;
    assert!(project.get_security_token(&store, &locks).await.is_ok());
}
