use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::domain::ports::{LedgerStore, MemberDirectory};
use crate::state::AppState;
use crate::infra::calendar::google_calendar_store::GoogleCalendarStore;
use crate::infra::repositories::{
    postgres_member_repo::PostgresMemberRepo, postgres_occurrence_repo::PostgresOccurrenceRepo,
    sqlite_member_repo::SqliteMemberRepo, sqlite_occurrence_repo::SqliteOccurrenceRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let (db_store, member_directory): (Arc<dyn LedgerStore>, Arc<dyn MemberDirectory>) =
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            info!("Initializing PostgreSQL connection...");

            let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
            opts = opts.log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect_with(opts)
                .await
                .expect("Failed to connect to Postgres");

            run_postgres_migrations(&pool).await;

            (
                Arc::new(PostgresOccurrenceRepo::new(pool.clone(), config.calendar_timezone)),
                Arc::new(PostgresMemberRepo::new(pool)),
            )
        } else {
            info!("Initializing SQLite connection with WAL Mode...");

            let opts = SqliteConnectOptions::from_str(database_url)
                .expect("Invalid SQLite connection string")
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5))
                .log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(opts)
                .await
                .expect("Failed to connect to SQLite");

            run_sqlite_migrations(&pool).await;

            (
                Arc::new(SqliteOccurrenceRepo::new(pool.clone(), config.calendar_timezone)),
                Arc::new(SqliteMemberRepo::new(pool)),
            )
        };

    let ledger_store: Arc<dyn LedgerStore> = match &config.calendar {
        Some(calendar) => {
            info!("Event records are kept in calendar {}", calendar.calendar_id);
            Arc::new(GoogleCalendarStore::new(calendar, config.calendar_timezone))
        }
        None => {
            info!("Event records are kept in the database");
            db_store
        }
    };

    AppState::new(config.clone(), ledger_store, member_directory)
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
