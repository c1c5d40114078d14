use crate::chat_message::model::{NewChatMessage, SenderType};
use crate::server::rest_api::identity::{ADMIN_ID_HEADER, USER_EMAIL_HEADER, USER_ID_HEADER};
use crate::server_tests::start_test_server;
use crate::server_tests::test_client::TestClient;
use crate::support::console;
use crate::support::widget::{self, ChatUser};
use crate::types::uuid::Uuid;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, StatusCode};

type ChangeStream = std::pin::Pin<Box<dyn Stream<Item = Value> + Send>>;

#[tokio::test]
async fn admin_should_receive_inserted_messages() {
	let (client, context) = start_test_server().await;
	let user = user();
	let room = widget::open_room(&context.chat_store, &user, context.time_source.now())
		.await
		.expect("Failed to open room");
	let mut changes = connect(
		&client,
		"/api/realtime?table=chat_messages&event=INSERT",
		&[(ADMIN_ID_HEADER, Uuid::new_v4().to_string())],
	)
	.await
	.expect("Failed to connect");

	let sent = widget::send_user_message(&context.chat_store, &user, room.id, "Hello", context.time_source.now())
		.await
		.expect("Failed to send message");

	let change = next_change(&mut changes).await;
	assert_eq!("INSERT", change["event"]);
	assert_eq!("chat_messages", change["table"]);
	assert_eq!(sent.message.id.to_string(), change["new"]["id"]);
	assert_eq!("Hello", change["new"]["message"]);
	assert_eq!(Value::Null, change["old"]);
}

#[tokio::test]
async fn room_updates_should_carry_the_old_row() {
	let (client, context) = start_test_server().await;
	let user = user();
	let room = widget::open_room(&context.chat_store, &user, context.time_source.now())
		.await
		.expect("Failed to open room");
	let mut changes = connect(
		&client,
		&format!("/api/realtime?table=chat_rooms&room_id={}", room.id),
		&[(ADMIN_ID_HEADER, Uuid::new_v4().to_string())],
	)
	.await
	.expect("Failed to connect");

	console::reply_to_room(
		&context.chat_store,
		Uuid::new_v4(),
		room.id,
		"Welcome",
		context.time_source.now(),
	)
	.await
	.expect("Failed to reply");

	let change = next_change(&mut changes).await;
	assert_eq!("UPDATE", change["event"]);
	assert_eq!("pending", change["old"]["status"]);
	assert_eq!("open", change["new"]["status"]);
}

#[tokio::test]
async fn user_should_receive_replies_in_their_room() {
	let (client, context) = start_test_server().await;
	let user = user();
	let room = widget::open_room(&context.chat_store, &user, context.time_source.now())
		.await
		.expect("Failed to open room");
	let mut changes = connect(
		&client,
		&format!("/api/realtime?table=chat_messages&event=INSERT&room_id={}", room.id),
		&user_headers(&user),
	)
	.await
	.expect("Failed to connect");

	context
		.chat_store
		.insert_message(&NewChatMessage {
			room_id: room.id,
			sender_id: Uuid::new_v4(),
			sender_type: SenderType::Admin,
			message: "How can I help?".to_string(),
			created_at: context.time_source.now(),
		})
		.await
		.expect("Failed to insert reply");

	let change = next_change(&mut changes).await;
	assert_eq!("How can I help?", change["new"]["message"]);
	assert_eq!(Value::Bool(true), change["new"]["is_read"]);
}

#[tokio::test]
async fn user_should_not_watch_everything() {
	let (client, _) = start_test_server().await;

	let result = connect(&client, "/api/realtime?table=chat_messages", &user_headers(&user())).await;

	assert_http_status(StatusCode::FORBIDDEN, result);
}

#[tokio::test]
async fn user_should_not_watch_foreign_rooms() {
	let (client, context) = start_test_server().await;
	let owner = user();
	let room = widget::open_room(&context.chat_store, &owner, context.time_source.now())
		.await
		.expect("Failed to open room");

	let result = connect(
		&client,
		&format!("/api/realtime?room_id={}", room.id),
		&user_headers(&user()),
	)
	.await;

	assert_http_status(StatusCode::NOT_FOUND, result);
}

#[tokio::test]
async fn anonymous_subscribers_should_be_rejected() {
	let (client, _) = start_test_server().await;

	let result = connect(&client, "/api/realtime", &[]).await;

	assert_http_status(StatusCode::UNAUTHORIZED, result);
}

async fn connect(
	client: &TestClient,
	path_and_query: &str,
	headers: &[(&'static str, String)],
) -> Result<ChangeStream, tungstenite::Error> {
	let mut request = client
		.websocket_url(path_and_query)
		.into_client_request()
		.expect("Invalid websocket request");
	for (name, value) in headers {
		request
			.headers_mut()
			.insert(*name, HeaderValue::from_str(value).expect("Invalid header value"));
	}

	let (websocket, _response) = tokio_tungstenite::connect_async(request).await?;
	let changes = websocket.filter_map(|message| async move {
		let message = message.expect("Websocket failed");
		let text = message.to_text().ok()?;
		if text.is_empty() {
			return None;
		}
		Some(serde_json::from_str::<Value>(text).expect("Malformed change"))
	});
	Ok(Box::pin(changes))
}

async fn next_change(changes: &mut ChangeStream) -> Value {
	timeout(Duration::from_secs(5), changes.next())
		.await
		.expect("Timed out waiting for change")
		.expect("Websocket closed")
}

fn assert_http_status(expected: StatusCode, result: Result<ChangeStream, tungstenite::Error>) {
	match result {
		Err(tungstenite::Error::Http(response)) => assert_eq!(expected, response.status()),
		Err(error) => panic!("Unexpected error: {error}"),
		Ok(_) => panic!("Websocket connection should have been rejected"),
	}
}

fn user_headers(user: &ChatUser) -> Vec<(&'static str, String)> {
	vec![(USER_ID_HEADER, user.id.to_string()), (USER_EMAIL_HEADER, user.email.clone())]
}

fn user() -> ChatUser {
	ChatUser {
		id: Uuid::new_v4(),
		email: "user@example.com".to_string(),
	}
}
