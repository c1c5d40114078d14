use crate::backend::BackendError;
use crate::configuration::ConfigurationError;
use crate::database::error::DatabaseError;
use crate::session::SessionError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TradedeskError {
	#[error("Failed to load configuration: {0}")]
	Configuration(#[from] ConfigurationError),
	#[error("Invalid log filters: {0}")]
	LogFilters(#[from] tracing_subscriber::filter::ParseError),
	#[error("Database error: {0}")]
	Database(#[from] DatabaseError),
	#[error("Failed to load session: {0}")]
	Session(#[from] SessionError),
	#[error("Backend request failed: {0}")]
	Backend(#[from] BackendError),
	#[error("IO error while serving requests: {0}")]
	Server(#[from] std::io::Error),
}
