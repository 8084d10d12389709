use crate::config::DatabaseConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::message::RECENT_LIMIT;
use crate::models::{MessageFilter, MessageRow, NewMessage, User};
use crate::store::EneStore;
use async_trait::async_trait;
use deadpool_postgres::{Config, Object, Pool, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tokio_postgres::Row;
use tracing::{error, info, warn};

const MESSAGE_COLUMNS: &str = "id, contents, sender, receiver, datetime";
const USER_COLUMNS: &str = "userid, name, imageurl, department, profile";

/// PostgreSQL への接続プールを握るリポジトリ層。
/// プロセス起動時に一度だけ構築し、`Arc<dyn EneStore>` として各ハンドラへ渡す。
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// 接続プールを構築し、起動時に疎通確認まで実施する。
    /// ここで失敗した場合、呼び出し側はプロセスを終了させる。
    pub async fn new(config: DatabaseConfig) -> ApiResult<Self> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let pool = Self::create_pool(config)?;

        // Test the connection pool
        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    /// Deadpool 用の `Config` を組み立ててプールを生成する内部関数。
    /// `connect_timeout` は接続確立のみに効き、個々のクエリには掛からない。
    fn create_pool(config: DatabaseConfig) -> ApiResult<Pool> {
        let mut pg_config = Config::new();

        // Set connection parameters
        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);
        pg_config.connect_timeout = Some(config.connection_timeout);

        // Configure SSL mode
        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => deadpool_postgres::SslMode::Disable,
            "prefer" => deadpool_postgres::SslMode::Prefer,
            "require" => deadpool_postgres::SslMode::Require,
            other => {
                warn!("Unknown SSL mode '{}', defaulting to 'prefer'", other);
                deadpool_postgres::SslMode::Prefer
            }
        });

        // Configure connection pool
        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        pg_config.pool = Some(deadpool_postgres::PoolConfig::new(config.max_connections as usize));

        let tls_connector = TlsConnector::builder()
            .build()
            .map_err(|e| {
                error!("Failed to create TLS connector: {}", e);
                ApiError::Database(format!("TLS connector creation failed: {}", e))
            })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| {
                error!("Failed to create connection pool: {}", e);
                ApiError::Database(format!("Connection pool creation failed: {}", e))
            })
    }

    /// プールから接続を借りる小さなラッパー。
    async fn get_connection(&self) -> ApiResult<Object> {
        self.pool.get().await.map_err(ApiError::from)
    }

    /// `SELECT 1` を投げて、プール全体が機能するかを確認する。
    pub async fn test_connection(&self) -> ApiResult<()> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[])
            .await
            .map_err(|e| {
                error!("Database connection test failed: {}", e);
                ApiError::Database(format!("Connection test failed: {}", e))
            })?;

        info!("Database connection test successful");
        Ok(())
    }

    /// 開発環境向けにテーブルを CREATE する簡易マイグレーター。
    /// `ene_empathy` には一意制約も外部キーも付けない。
    /// 重複防止はトグル処理の存在確認に任せている。
    pub async fn migrate(&self) -> ApiResult<()> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        let statements = [
            (
                "users table",
                r#"
                CREATE TABLE IF NOT EXISTS ene_users (
                    userid BIGINT PRIMARY KEY,
                    name VARCHAR(255) NOT NULL,
                    imageurl TEXT,
                    department VARCHAR(255),
                    profile TEXT
                )
                "#,
            ),
            (
                "messages table",
                r#"
                CREATE TABLE IF NOT EXISTS ene_messages (
                    id BIGSERIAL PRIMARY KEY,
                    contents TEXT NOT NULL,
                    sender BIGINT NOT NULL,
                    receiver BIGINT NOT NULL,
                    datetime VARCHAR(14) NOT NULL
                )
                "#,
            ),
            (
                "messages datetime index",
                "CREATE INDEX IF NOT EXISTS idx_ene_messages_datetime ON ene_messages(datetime DESC)",
            ),
            (
                "messages sender index",
                "CREATE INDEX IF NOT EXISTS idx_ene_messages_sender ON ene_messages(sender)",
            ),
            (
                "messages receiver index",
                "CREATE INDEX IF NOT EXISTS idx_ene_messages_receiver ON ene_messages(receiver)",
            ),
            (
                "empathy table",
                r#"
                CREATE TABLE IF NOT EXISTS ene_empathy (
                    id BIGINT NOT NULL,
                    empathyuser BIGINT NOT NULL,
                    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )
                "#,
            ),
            (
                "empathy pair index",
                "CREATE INDEX IF NOT EXISTS idx_ene_empathy_pair ON ene_empathy(id, empathyuser)",
            ),
        ];

        for (name, sql) in statements {
            client.execute(sql, &[])
                .await
                .map_err(|e| {
                    error!("Failed to create {}: {}", name, e);
                    ApiError::Database(format!("Migration of {} failed: {}", name, e))
                })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }
}

fn message_from_row(row: &Row) -> MessageRow {
    MessageRow {
        id: row.get(0),
        contents: row.get(1),
        sender: row.get(2),
        receiver: row.get(3),
        datetime: row.get(4),
    }
}

fn user_from_row(row: &Row) -> User {
    User {
        userid: row.get(0),
        name: row.get(1),
        imageurl: row.get(2),
        department: row.get(3),
        profile: row.get(4),
    }
}

#[async_trait]
impl EneStore for Database {
    async fn ping(&self) -> ApiResult<()> {
        let client = self.get_connection().await?;
        client.execute("SELECT 1", &[]).await?;
        Ok(())
    }

    /// フィルタごとに SQL を切り替える。ID 指定以外は新しい順に最大 100 件。
    async fn list_messages(&self, filter: MessageFilter) -> ApiResult<Vec<MessageRow>> {
        let client = self.get_connection().await?;

        let rows = match filter {
            MessageFilter::ById(id) => {
                let query = format!("SELECT {} FROM ene_messages WHERE id = $1", MESSAGE_COLUMNS);
                client.query(&query, &[&id]).await?
            }
            MessageFilter::BySender(sender) => {
                let query = format!(
                    "SELECT {} FROM ene_messages WHERE sender = $1 ORDER BY datetime DESC LIMIT $2",
                    MESSAGE_COLUMNS
                );
                client.query(&query, &[&sender, &RECENT_LIMIT]).await?
            }
            MessageFilter::ByReceiver(receiver) => {
                let query = format!(
                    "SELECT {} FROM ene_messages WHERE receiver = $1 ORDER BY datetime DESC LIMIT $2",
                    MESSAGE_COLUMNS
                );
                client.query(&query, &[&receiver, &RECENT_LIMIT]).await?
            }
            MessageFilter::OutOfRange { .. } => return Ok(Vec::new()),
            MessageFilter::Recent => {
                let query = format!(
                    "SELECT {} FROM ene_messages ORDER BY datetime DESC LIMIT $1",
                    MESSAGE_COLUMNS
                );
                client.query(&query, &[&RECENT_LIMIT]).await?
            }
        };

        Ok(rows.iter().map(message_from_row).collect())
    }

    /// `RETURNING id` で採番された ID を受け取る。
    async fn insert_message(&self, message: &NewMessage) -> ApiResult<i64> {
        let client = self.get_connection().await?;
        let query = r#"
            INSERT INTO ene_messages (contents, sender, receiver, datetime)
            VALUES ($1, $2, $3, $4)
            RETURNING id
        "#;

        let row = client
            .query_one(
                query,
                &[&message.contents, &message.sender, &message.receiver, &message.datetime],
            )
            .await?;

        let id: i64 = row.get(0);
        info!("Inserted message with id: {}", id);
        Ok(id)
    }

    async fn delete_message(&self, id: i64) -> ApiResult<u64> {
        let client = self.get_connection().await?;
        let affected = client
            .execute("DELETE FROM ene_messages WHERE id = $1", &[&id])
            .await?;
        Ok(affected)
    }

    async fn find_user(&self, userid: i64) -> ApiResult<Option<User>> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM ene_users WHERE userid = $1 LIMIT 1", USER_COLUMNS);

        let row = client.query_opt(&query, &[&userid]).await?;
        Ok(row.as_ref().map(user_from_row))
    }

    async fn list_users(&self) -> ApiResult<Vec<User>> {
        let client = self.get_connection().await?;
        let query = format!("SELECT {} FROM ene_users ORDER BY userid", USER_COLUMNS);

        let rows = client.query(&query, &[]).await?;
        Ok(rows.iter().map(user_from_row).collect())
    }

    async fn empathizers(&self, message_id: i64) -> ApiResult<Vec<i64>> {
        let client = self.get_connection().await?;
        let rows = client
            .query(
                "SELECT empathyuser FROM ene_empathy WHERE id = $1 ORDER BY created_at",
                &[&message_id],
            )
            .await?;
        Ok(rows.iter().map(|row| row.get(0)).collect())
    }

    async fn has_empathy(&self, message_id: i64, userid: i64) -> ApiResult<bool> {
        let client = self.get_connection().await?;
        let row = client
            .query_opt(
                "SELECT 1 FROM ene_empathy WHERE id = $1 AND empathyuser = $2 LIMIT 1",
                &[&message_id, &userid],
            )
            .await?;
        Ok(row.is_some())
    }

    async fn count_empathy(&self, message_id: i64) -> ApiResult<i64> {
        let client = self.get_connection().await?;
        let row = client
            .query_one("SELECT COUNT(*) FROM ene_empathy WHERE id = $1", &[&message_id])
            .await?;
        Ok(row.get(0))
    }

    async fn insert_empathy(&self, message_id: i64, userid: i64) -> ApiResult<u64> {
        let client = self.get_connection().await?;
        let affected = client
            .execute(
                "INSERT INTO ene_empathy (id, empathyuser) VALUES ($1, $2)",
                &[&message_id, &userid],
            )
            .await?;
        Ok(affected)
    }

    async fn delete_empathy(&self, message_id: i64, userid: i64) -> ApiResult<u64> {
        let client = self.get_connection().await?;
        let affected = client
            .execute(
                "DELETE FROM ene_empathy WHERE id = $1 AND empathyuser = $2",
                &[&message_id, &userid],
            )
            .await?;
        Ok(affected)
    }
}
