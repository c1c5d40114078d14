use axum::Router;
use reqwest::{Method, RequestBuilder};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub struct TestClient {
	server: JoinHandle<()>,
	client: reqwest::Client,
	server_address: SocketAddr,
}

impl TestClient {
	pub async fn new(router: Router) -> anyhow::Result<Self> {
		// NOTE: port 0 assigns a random available port
		let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).await?;
		let server_address = listener.local_addr()?;
		let server = tokio::spawn(async move {
			axum::serve(listener, router).await.expect("Test server failed");
		});

		let client = reqwest::Client::builder()
			.connect_timeout(Duration::from_secs(10))
			.build()?;

		Ok(Self {
			server,
			client,
			server_address,
		})
	}

	pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
		let base_address = self.server_address;
		let path = path.trim_start_matches('/');
		self.client.request(method, format!("http://{base_address}/{path}"))
	}

	pub fn get(&self, path: &str) -> RequestBuilder {
		self.request(Method::GET, path)
	}

	pub fn post(&self, path: &str) -> RequestBuilder {
		self.request(Method::POST, path)
	}

	pub fn put(&self, path: &str) -> RequestBuilder {
		self.request(Method::PUT, path)
	}

	pub fn websocket_url(&self, path_and_query: &str) -> String {
		let path_and_query = path_and_query.trim_start_matches('/');
		format!("ws://{}/{path_and_query}", self.server_address)
	}
}

impl Drop for TestClient {
	fn drop(&mut self) {
		self.server.abort();
	}
}
