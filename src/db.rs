use anyhow::Context;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};
use std::path::PathBuf;
use tokio::fs;

use crate::error::AppResult;

/// Create a SeaORM connection.
pub async fn create_orm_conn(database_url: &str) -> AppResult<DatabaseConnection> {
    let conn = Database::connect(database_url).await?;
    Ok(conn)
}

/// Minimal migration runner that executes the SQL files in `dir` in filename
/// order. Each file holds plain DDL only.
pub async fn run_migrations(conn: &DatabaseConnection, dir: &str) -> AppResult<()> {
    let mut entries = fs::read_dir(dir)
        .await
        .with_context(|| format!("reading migrations directory {dir}"))?;
    let mut files: Vec<PathBuf> = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("reading migrations directory {dir}"))?
    {
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    let backend = conn.get_database_backend();
    for file in files {
        let sql = fs::read_to_string(&file)
            .await
            .with_context(|| format!("reading migration {}", file.display()))?;
        // Postgres prepared statements cannot contain multiple commands,
        // so split the migration file and run each statement individually.
        for stmt in sql.split(';') {
            let stmt = stmt.trim();
            if stmt.is_empty() {
                continue;
            }
            let statement = format!("{stmt};");
            conn.execute(Statement::from_string(backend, statement))
                .await?;
        }
    }

    Ok(())
}
