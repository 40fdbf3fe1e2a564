#![allow(dead_code, unused_imports)]

pub use schemadiff::prelude::*;
pub use std::path::{Path, PathBuf};
pub use tempfile::{tempdir, TempDir};
pub use testcontainers::runners::AsyncRunner;
pub use testcontainers::ContainerAsync;
pub use testcontainers_modules::mysql::Mysql;

/// Starts a MySQL container and returns a root URL without a default database.
pub async fn setup_mysql() -> (ContainerAsync<Mysql>, String) {
    let container = Mysql::default().start().await.unwrap();
    let port = container.get_host_port_ipv4(3306).await.unwrap();
    let url = format!("mysql://root@127.0.0.1:{port}");
    (container, url)
}

/// Runs each statement through the text protocol; CREATE TRIGGER and
/// CREATE FUNCTION cannot be prepared.
pub async fn execute_all(url: &str, statements: &[&str]) {
    let pool = sqlx::MySqlPool::connect(url).await.unwrap();
    for statement in statements {
        sqlx::raw_sql(statement).execute(&pool).await.unwrap();
    }
    pool.close().await;
}

pub struct SnapshotBuilder {
    snapshot: Snapshot,
}

impl SnapshotBuilder {
    pub fn new(schema: &str) -> Self {
        Self {
            snapshot: Snapshot::new(schema),
        }
    }

    pub fn table(mut self, name: &str, columns: &[&str], indexes: &[&str]) -> Self {
        self.snapshot.tables.push(name.to_string());
        self.snapshot.tables.sort();
        self.snapshot
            .columns
            .insert(name.to_string(), to_names(columns));
        self.snapshot
            .indexes
            .insert(name.to_string(), to_names(indexes));
        self
    }

    pub fn triggers(mut self, names: &[&str]) -> Self {
        self.snapshot.triggers = to_names(names);
        self
    }

    pub fn functions(mut self, names: &[&str]) -> Self {
        self.snapshot.functions = to_names(names);
        self
    }

    pub fn build(self) -> Snapshot {
        self.snapshot
    }

    /// Writes the snapshot into `dir` and returns its path.
    pub fn write(self, dir: &Path, file_name: &str) -> PathBuf {
        let path = dir.join(file_name);
        self.snapshot.write_to(&path).unwrap();
        path
    }
}

pub fn to_names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn shop(schema: &str) -> SnapshotBuilder {
    SnapshotBuilder::new(schema)
        .table("orders", &["id", "total", "user_id"], &["PRIMARY", "idx_user"])
        .table("users", &["id", "name"], &["PRIMARY"])
        .triggers(&["orders_audit"])
        .functions(&["order_total"])
}
