use crate::context::ApplicationContext;
use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

mod realtime_socket;
pub mod rest_api;

pub async fn run_server(application_context: ApplicationContext) -> std::io::Result<()> {
	let listener = TcpListener::bind(application_context.configuration.address).await?;
	info!(address = %listener.local_addr()?, "Listening");

	axum::serve(listener, create_router(application_context)).await
}

pub fn create_router(application_context: ApplicationContext) -> Router {
	let api = rest_api::routes().route("/realtime", get(realtime_socket::realtime_changes));

	Router::new()
		.nest("/api", api)
		.layer(TraceLayer::new_for_http())
		.layer(CorsLayer::permissive())
		.with_state(application_context)
}
