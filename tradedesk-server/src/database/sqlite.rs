use crate::chat_message::repository::ChatMessageRepository;
use crate::chat_room::repository::ChatRoomRepository;
use crate::database::error::{DatabaseError, IntoDatabaseResult};
use crate::database::{Connection, Database, Repository};
use anyhow::anyhow;
use async_trait::async_trait;
use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqliteConnection, SqlitePool, migrate};
use std::any::Any;
use std::ops::DerefMut;
use std::str::FromStr;
use tracing::debug;

mod chat_message;
mod chat_room;
#[cfg(test)]
pub mod test_utils;

#[derive(Clone)]
pub struct SqliteDatabase {
	pool: SqlitePool,
}

impl SqliteDatabase {
	pub async fn connect(database_url: &str) -> Result<Self, DatabaseError> {
		let options = SqliteConnectOptions::from_str(database_url)
			.connection_error("Invalid database URL")?
			.create_if_missing(true);

		// Every connection to an in-memory database sees its own empty database,
		// so the pool must never open a second one or drop the first.
		let in_memory = database_url.contains(":memory:");
		let pool_options = if in_memory {
			SqlitePoolOptions::new()
				.max_connections(1)
				.min_connections(1)
				.idle_timeout(None)
				.max_lifetime(None)
		} else {
			SqlitePoolOptions::new()
		};

		let pool = pool_options
			.connect_with(options)
			.await
			.connection_error("Failed to connect to database")?;
		debug!(in_memory, "Connected to SQLite database");

		Ok(Self { pool })
	}
}

#[async_trait]
impl Database for SqliteDatabase {
	async fn migrate(&self) -> Result<(), DatabaseError> {
		migrate!().run(&self.pool).await.map_err(Into::into)
	}

	async fn connection(&self) -> Result<Box<dyn Connection>, DatabaseError> {
		self.pool
			.acquire()
			.await
			.map(|connection| Box::new(connection) as Box<dyn Connection>)
			.map_err(Into::into)
	}
}

impl Connection for SqliteConnection {}
impl Connection for PoolConnection<Sqlite> {}

#[derive(Default, Clone, Copy)]
pub struct SqliteRepository;

impl Repository for SqliteRepository {
	fn chat_room(&self) -> &dyn ChatRoomRepository {
		self
	}

	fn chat_message(&self) -> &dyn ChatMessageRepository {
		self
	}
}

fn sqlite_connection(connection: &mut dyn Connection) -> Result<&mut SqliteConnection, DatabaseError> {
	let type_name = connection.type_name();

	let connection: &mut dyn Any = connection;

	if connection.is::<PoolConnection<Sqlite>>() {
		return connection
			.downcast_mut::<PoolConnection<Sqlite>>()
			.map(DerefMut::deref_mut)
			.ok_or_else(|| DatabaseError::DatabaseMismatch(anyhow!("Failed to downcast {type_name}")));
	}

	connection
		.downcast_mut::<SqliteConnection>()
		.ok_or_else(|| DatabaseError::DatabaseMismatch(anyhow!("Expected SQLite connection, got {type_name}")))
}
