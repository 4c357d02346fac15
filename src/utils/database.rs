use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use std::{str::FromStr, time::Duration};

#[derive(Clone)]
pub struct DatabaseConnection {
    pub pool: SqlitePool,
}

pub async fn connect(database_url: &str) -> DatabaseConnection {
    // WAL plus a busy timeout so concurrent order submissions queue on the
    // write lock instead of erroring out.
    let options = SqliteConnectOptions::from_str(database_url)
        .unwrap_or_else(|e| {
            tracing::error!("{:}", e);
            panic!("Invalid database url {}", database_url)
        })
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    DatabaseConnection {
        pool: SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .unwrap_or_else(|e| {
                tracing::error!("{:}", e);
                panic!("Error connecting to database {}", database_url)
            }),
    }
}

pub async fn migrate(db_conn: DatabaseConnection) {
    match sqlx::migrate!().run(&db_conn.pool).await {
        Ok(_) => (),
        Err(err) => {
            tracing::error!("{}", err);
            panic!("Failed to run database migrations");
        }
    }
}
