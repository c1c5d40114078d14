use crate::database::sqlite::{SqliteDatabase, SqliteRepository, sqlite_connection};
use crate::database::test::TestFactory;
use crate::database::{Connection, Database, Repository};
use std::sync::Arc;

pub struct SqliteTestFactory;

impl TestFactory for SqliteTestFactory {
	async fn connection() -> Box<dyn Connection> {
		Self::database()
			.await
			.connection()
			.await
			.expect("Failed to connect to database")
	}

	async fn database() -> Arc<dyn Database> {
		let database = SqliteDatabase::connect("sqlite::memory:")
			.await
			.expect("Failed to create in-memory SQLite database");
		database.migrate().await.expect("Failed to migrate database");

		Arc::new(database)
	}

	fn repository() -> Arc<dyn Repository> {
		Arc::new(SqliteRepository)
	}
}

/// Runs raw SQL against the database, e.g. to install triggers that make statements fail.
pub async fn execute(database: &dyn Database, sql: &str) {
	let mut connection = database.connection().await.expect("Failed to connect to database");
	let connection = sqlite_connection(connection.as_mut()).expect("Not a SQLite connection");
	sqlx::raw_sql(sql)
		.execute(&mut *connection)
		.await
		.expect("Failed to execute SQL");
}
