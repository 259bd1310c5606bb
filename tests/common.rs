use sports_booking_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::models::{auth::Claims, ledger::SkillLevel, member::{Member, ROLE_ADMIN}},
    domain::ports::MemberDirectory,
    domain::services::attendance_service::NewEventParams,
    infra::repositories::{
        sqlite_member_repo::SqliteMemberRepo,
        sqlite_occurrence_repo::SqliteOccurrenceRepo,
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::Arc;
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use std::str::FromStr;
use serde_json::Value;

pub const JWT_SECRET: &str = "test-jwt-secret";
pub const WEBHOOK_SECRET: &str = "test-webhook-secret";

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

#[allow(dead_code)]
impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret: JWT_SECRET.to_string(),
            webhook_secret: WEBHOOK_SECRET.to_string(),
            payment_link_base_url: "https://pay.example.com/checkout".to_string(),
            default_capacity: 20,
            upcoming_limit: 10,
            calendar_timezone: chrono_tz::Europe::Stockholm,
            calendar: None,
        };

        let state = Arc::new(AppState::new(
            config.clone(),
            Arc::new(SqliteOccurrenceRepo::new(pool.clone(), config.calendar_timezone)),
            Arc::new(SqliteMemberRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn seed_member(&self, name: &str, level: SkillLevel) -> Member {
        let member = Member::new(&format!("{}@example.com", name.to_lowercase()), name, level);
        self.state.member_directory.upsert(&member).await.expect("Failed to seed member")
    }

    pub async fn seed_admin(&self, name: &str) -> Member {
        let mut admin = Member::new(&format!("{}@example.com", name.to_lowercase()), name, SkillLevel::Advanced);
        admin.role = ROLE_ADMIN.to_string();
        self.state.member_directory.upsert(&admin).await.expect("Failed to seed admin")
    }

    /// Creates an occurrence `days_ahead` days from now at 18:00 UTC and returns its key.
    pub async fn seed_event(&self, days_ahead: i64, capacity: u32, price: u32, level: SkillLevel) -> String {
        let day = (Utc::now() + Duration::days(days_ahead)).date_naive();
        let start_time = Utc.from_utc_datetime(&day.and_hms_opt(18, 0, 0).unwrap());

        let entry = self.state.attendance.create_occurrence(NewEventParams {
            summary: "Training".to_string(),
            location: "Main hall".to_string(),
            start_time,
            end_time: start_time + Duration::hours(2),
            capacity: Some(capacity),
            price,
            required_level: level,
        }).await.expect("Failed to seed event");

        entry.record.id
    }

    pub async fn raw_description(&self, key: &str) -> String {
        sqlx::query_scalar::<_, String>("SELECT description FROM occurrences WHERE event_key = ?")
            .bind(key)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn set_raw_description(&self, key: &str, text: &str) {
        sqlx::query("UPDATE occurrences SET description = ? WHERE event_key = ?")
            .bind(text)
            .bind(key)
            .execute(&self.pool)
            .await
            .unwrap();
    }

    pub async fn request(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        tower::ServiceExt::oneshot(self.router.clone(), builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

pub fn token_for(email: &str, name: &str) -> String {
    token_with_secret(email, name, JWT_SECRET)
}

pub fn token_with_secret(email: &str, name: &str, secret: &str) -> String {
    let claims = Claims {
        sub: Uuid::new_v4().to_string(),
        email: email.to_string(),
        name: name.to_string(),
        exp: (Utc::now() + Duration::hours(1)).timestamp() as usize,
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes())).unwrap()
}

#[allow(dead_code)]
pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}
