use crate::chat_store::ChatStore;
use crate::configuration::Configuration;
use crate::database::Database;
use crate::database::error::DatabaseError;
use crate::database::sqlite::{SqliteDatabase, SqliteRepository};
use crate::realtime::ChangeFeed;
use crate::support::unread_window::UnreadWindow;
use crate::utils::time_source::TimeSource;
use axum::extract::FromRef;
use std::sync::Arc;

#[derive(Clone, FromRef)]
pub struct ApplicationContext {
	pub configuration: Configuration,
	pub time_source: TimeSource,
	pub chat_store: ChatStore,
	pub unread_window: UnreadWindow,
}

impl ApplicationContext {
	/// Connects to the configured database and brings its schema up to date.
	pub async fn new(configuration: Configuration, time_source: TimeSource) -> Result<ApplicationContext, DatabaseError> {
		let database = Arc::new(SqliteDatabase::connect(&configuration.database_url).await?);
		database.migrate().await?;

		let chat_store = ChatStore::new(
			database,
			Arc::new(SqliteRepository),
			ChangeFeed::new(configuration.change_feed_capacity),
		);
		let unread_window = UnreadWindow::new(configuration.unread_window);

		Ok(Self {
			configuration,
			time_source,
			chat_store,
			unread_window,
		})
	}
}
