use once_cell::sync::OnceCell;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

static DB_CONN: OnceCell<DatabaseConnection> = OnceCell::new();

/// Минимальная схема: таблицы агрегатов, уникальный индекс плана и представление тиров
const SCHEMA: &[(&str, &str)] = &[
    (
        "a001_medical_representative",
        r#"
        CREATE TABLE IF NOT EXISTS a001_medical_representative (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            headquarter TEXT NOT NULL,
            region TEXT,
            manager_name TEXT,
            email TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "a002_customer",
        r#"
        CREATE TABLE IF NOT EXISTS a002_customer (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            mr_id TEXT NOT NULL REFERENCES a001_medical_representative(id),
            area_name TEXT NOT NULL,
            customer_type TEXT NOT NULL,
            specialty TEXT,
            tier TEXT NOT NULL DEFAULT 'Unclassified',
            sales_last_3m REAL NOT NULL DEFAULT 0,
            last_visit_date TEXT,
            visit_frequency INTEGER,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "idx_a002_customer_mr",
        "CREATE INDEX IF NOT EXISTS idx_a002_customer_mr ON a002_customer (mr_id);",
    ),
    (
        "a003_monthly_tour_plan",
        r#"
        CREATE TABLE IF NOT EXISTS a003_monthly_tour_plan (
            id TEXT PRIMARY KEY NOT NULL,
            code TEXT NOT NULL DEFAULT '',
            description TEXT NOT NULL,
            comment TEXT,
            mr_id TEXT NOT NULL REFERENCES a001_medical_representative(id),
            year INTEGER NOT NULL,
            month INTEGER NOT NULL,
            status TEXT NOT NULL DEFAULT 'Draft',
            plan_json TEXT NOT NULL,
            thread_id TEXT,
            revision INTEGER NOT NULL DEFAULT 1,
            provider TEXT NOT NULL DEFAULT '',
            model_name TEXT NOT NULL DEFAULT '',
            tokens_used INTEGER,
            augmented_customers INTEGER NOT NULL DEFAULT 0,
            augmented_areas INTEGER NOT NULL DEFAULT 0,
            generated_at TEXT,
            is_deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT,
            updated_at TEXT,
            version INTEGER NOT NULL DEFAULT 0
        );
        "#,
    ),
    (
        "idx_a003_monthly_tour_plan_period",
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_a003_monthly_tour_plan_period
            ON a003_monthly_tour_plan (mr_id, year, month);
        "#,
    ),
    (
        "v_customer_tiers",
        r#"
        CREATE VIEW IF NOT EXISTS v_customer_tiers AS
        SELECT
            c.id AS customer_id,
            c.code AS customer_code,
            c.description AS customer_name,
            c.mr_id AS mr_id,
            mr.code AS mr_code,
            mr.description AS mr_name,
            c.area_name AS area_name,
            c.customer_type AS customer_type,
            c.specialty AS specialty,
            c.tier AS tier,
            c.sales_last_3m AS sales_last_3m,
            c.last_visit_date AS last_visit_date,
            CAST(COALESCE(
                c.visit_frequency,
                CASE c.tier
                    WHEN 'Performer' THEN 4
                    WHEN 'Developer' THEN 2
                    ELSE 1
                END
            ) AS INTEGER) AS recommended_visits
        FROM a002_customer c
        JOIN a001_medical_representative mr ON mr.id = c.mr_id
        WHERE c.is_deleted = 0 AND mr.is_deleted = 0;
        "#,
    ),
];

/// Открыть SQLite-файл (создаётся при отсутствии) и применить схему
pub async fn connect(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);
    let conn = Database::connect(&db_url).await?;

    bootstrap_schema(&conn).await?;
    Ok(conn)
}

/// Создать таблицы, индексы и представления, если их ещё нет
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    for (name, sql) in SCHEMA {
        tracing::debug!("Ensuring schema object {}", name);
        conn.execute(Statement::from_string(DatabaseBackend::Sqlite, sql.to_string()))
            .await
            .map_err(|e| anyhow::anyhow!("Failed to create {}: {}", name, e))?;
    }
    Ok(())
}

pub async fn initialize_database(db_path: &Path) -> anyhow::Result<()> {
    let conn = connect(db_path).await?;
    tracing::info!("Database ready at {}", db_path.display());

    DB_CONN
        .set(conn)
        .map_err(|_| anyhow::anyhow!("Failed to set DB_CONN"))?;
    Ok(())
}

pub fn get_connection() -> &'static DatabaseConnection {
    DB_CONN
        .get()
        .expect("Database connection has not been initialized")
}


#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::FromQueryResult;

    #[derive(Debug, FromQueryResult)]
    struct NameRow {
        name: String,
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let (_dir, conn) = test_support::temp_database().await;
        // второй прогон не должен падать
        bootstrap_schema(&conn).await.unwrap();

        let rows = NameRow::find_by_statement(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type IN ('table', 'view') ORDER BY name".to_string(),
        ))
        .all(&conn)
        .await
        .unwrap();
        let names: Vec<String> = rows.into_iter().map(|r| r.name).collect();
        assert!(names.contains(&"a001_medical_representative".to_string()));
        assert!(names.contains(&"a003_monthly_tour_plan".to_string()));
        assert!(names.contains(&"v_customer_tiers".to_string()));
    }
}
