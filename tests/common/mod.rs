#![allow(dead_code)]

use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use projectconf::auth::jwt::{self, Claims};
use projectconf::config::{Config, DigestConfig};
use projectconf::db;
use projectconf::db::projects::NewProject;
use projectconf::models::{Organization, Project, Team, User};
use projectconf::state::SharedState;

pub const JWT_SECRET: &str = "test-jwt-secret-that-is-long-enough";
pub const INTERNAL_PROJECT_SLUG: &str = "internal";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
    pub state: SharedState,
}

/// An organization with one team and an owner who belongs to it.
pub struct Fixture {
    pub owner: User,
    pub owner_token: String,
    pub organization: Organization,
    pub team: Team,
    pub project: Project,
}

impl Fixture {
    pub fn project_path(&self) -> String {
        format!(
            "/api/0/projects/{}/{}/",
            self.organization.slug, self.project.slug
        )
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn token_for(&self, user_id: Uuid, scopes: Option<Vec<String>>) -> String {
        jwt::encode_token(&Claims::new(user_id, scopes), JWT_SECRET).unwrap()
    }

    pub async fn create_user(&self, email: &str) -> User {
        db::users::create(&self.pool, email, email).await.unwrap()
    }

    /// Add `user` to the organization with `role`, and to `team` when given.
    pub async fn add_member(
        &self,
        organization: &Organization,
        user: &User,
        role: &str,
        team: Option<&Team>,
    ) {
        let member = db::organizations::add_member(&self.pool, organization.id, user.id, role)
            .await
            .unwrap();
        if let Some(team) = team {
            db::teams::add_member(&self.pool, member.id, team.id)
                .await
                .unwrap();
        }
    }

    pub async fn create_project(
        &self,
        organization: &Organization,
        team: &Team,
        slug: &str,
    ) -> Project {
        db::projects::create(
            &self.pool,
            &NewProject {
                organization_id: organization.id,
                team_id: team.id,
                name: slug,
                slug,
            },
        )
        .await
        .unwrap()
    }

    /// Seed an organization `acme` with team `core`, owner `owner@test.com`
    /// and project `web`.
    pub async fn seed(&self) -> Fixture {
        let owner = self.create_user("owner@test.com").await;
        let organization = db::organizations::create(&self.pool, "Acme", "acme")
            .await
            .unwrap();
        let team = db::teams::create(&self.pool, organization.id, "Core", "core")
            .await
            .unwrap();
        self.add_member(&organization, &owner, "owner", Some(&team))
            .await;
        let project = self.create_project(&organization, &team, "web").await;
        let owner_token = self.token_for(owner.id, None);

        Fixture {
            owner,
            owner_token,
            organization,
            team,
            project,
        }
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated PUT request with JSON body.
    pub async fn put_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .put(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("put request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

fn admin_url(base_url: &str) -> String {
    base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.to_string())
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!("projectconf_test_{}", Uuid::now_v7().simple());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: JWT_SECRET.to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        log_level: "warn".to_string(),
        internal_projects: vec![INTERNAL_PROJECT_SLUG.to_string()],
        digests: DigestConfig::default(),
        deletion_delay_secs: 3600,
        worker_count: 1,
    };

    let state = projectconf::build_state(pool.clone(), config);
    let app = projectconf::build_app(state.clone());

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
        state,
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set for tests");

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url(&base_url))
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
