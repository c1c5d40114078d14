use crate::backend::ApiResponse;
use crate::chat_message::model::{ChatMessage, NewChatMessage, SenderType};
use crate::chat_room::model::{ChatRoom, RoomStatus};
use crate::server::rest_api::identity::{ADMIN_ID_HEADER, USER_EMAIL_HEADER, USER_ID_HEADER};
use crate::server_tests::start_test_server;
use crate::server_tests::test_client::TestClient;
use crate::support::SentMessage;
use crate::support::console::{RoomSummary, SelectedRoom};
use crate::types::date_time::DateTime;
use crate::types::uuid::Uuid;
use chrono::TimeDelta;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn opening_the_support_room_should_create_a_pending_room() {
	let (client, _) = start_test_server().await;
	let user = Uuid::new_v4();

	let response = as_user(client.post("/api/support/room"), user)
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::OK, response.status());
	let opened = data::<serde_json::Value>(response).await;
	let room: ChatRoom = serde_json::from_value(opened["room"].clone()).expect("Malformed room");
	assert_eq!(RoomStatus::Pending, room.status);
	assert_eq!(user, room.user_id);
	assert_eq!(json!([]), opened["messages"]);
}

#[tokio::test]
async fn support_endpoints_should_require_an_identity() {
	let (client, _) = start_test_server().await;

	let response = client.post("/api/support/room").send().await.expect("Request failed.");

	assert_eq!(StatusCode::UNAUTHORIZED, response.status());
	let envelope = response
		.json::<ApiResponse<serde_json::Value>>()
		.await
		.expect("Malformed envelope");
	assert!(!envelope.success);
	assert_eq!(Some("User identity missing.".to_string()), envelope.message);
}

#[tokio::test]
async fn sending_a_message_should_open_the_room() {
	let (client, _) = start_test_server().await;
	let user = Uuid::new_v4();
	let room = open_room(&client, user).await;

	let response = as_user(client.post(&format!("/api/support/room/{}/messages", room.id)), user)
		.json(&json!({"message": "  I can't withdraw  "}))
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::CREATED, response.status());
	let SentMessage { message, room } = data(response).await;
	assert_eq!("I can't withdraw", message.message);
	assert_eq!(SenderType::User, message.sender_type);
	assert!(!message.is_read);
	assert_eq!(RoomStatus::Open, room.status);

	let reopened = open_room(&client, user).await;
	assert_eq!(room.id, reopened.id);
}

#[tokio::test]
async fn blank_messages_should_be_rejected() {
	let (client, _) = start_test_server().await;
	let user = Uuid::new_v4();
	let room = open_room(&client, user).await;

	let response = as_user(client.post(&format!("/api/support/room/{}/messages", room.id)), user)
		.json(&json!({"message": "   "}))
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::BAD_REQUEST, response.status());
	let envelope = response
		.json::<ApiResponse<serde_json::Value>>()
		.await
		.expect("Malformed envelope");
	assert_eq!(Some("Chat messages must not be empty!".to_string()), envelope.message);
}

#[tokio::test]
async fn users_should_not_write_into_foreign_rooms() {
	let (client, _) = start_test_server().await;
	let room = open_room(&client, Uuid::new_v4()).await;

	let response = as_user(client.post(&format!("/api/support/room/{}/messages", room.id)), Uuid::new_v4())
		.json(&json!({"message": "Hello"}))
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::NOT_FOUND, response.status());
}

#[tokio::test]
async fn admin_should_see_and_clear_unread_badges() {
	let (client, _) = start_test_server().await;
	let admin = Uuid::new_v4();
	let user = Uuid::new_v4();
	let room = open_room(&client, user).await;
	send_user_message(&client, user, room.id, "first").await;
	send_user_message(&client, user, room.id, "second").await;

	let rooms = list_rooms(&client, admin).await;
	assert_eq!(vec![(room.id, 2)], badges(&rooms));

	let response = as_admin(client.post(&format!("/api/admin/support/rooms/{}/select", room.id)), admin)
		.send()
		.await
		.expect("Request failed.");
	assert_eq!(StatusCode::OK, response.status());
	let selected: SelectedRoom = data(response).await;
	assert_eq!(2, selected.marked_read);
	assert!(selected.messages.iter().all(|message| message.is_read));

	let rooms = list_rooms(&client, admin).await;
	assert_eq!(vec![(room.id, 0)], badges(&rooms));
}

#[tokio::test]
async fn admin_replies_should_be_read_and_assign_the_admin() {
	let (client, _) = start_test_server().await;
	let admin = Uuid::new_v4();
	let user = Uuid::new_v4();
	let room = open_room(&client, user).await;

	let response = as_admin(client.post(&format!("/api/admin/support/rooms/{}/replies", room.id)), admin)
		.json(&json!({"message": "Welcome!"}))
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::CREATED, response.status());
	let SentMessage { message, room } = data(response).await;
	assert!(message.is_read);
	assert_eq!(SenderType::Admin, message.sender_type);
	assert_eq!(admin, message.sender_id);
	assert_eq!(Some(admin), room.admin_id);
	assert_eq!(RoomStatus::Open, room.status);
}

#[tokio::test]
async fn admin_endpoints_should_require_an_admin_identity() {
	let (client, _) = start_test_server().await;

	let response = as_user(client.get("/api/admin/support/rooms"), Uuid::new_v4())
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::UNAUTHORIZED, response.status());
}

#[tokio::test]
async fn malformed_room_ids_should_be_rejected_with_an_envelope() {
	let (client, _) = start_test_server().await;

	let response = as_admin(client.post("/api/admin/support/rooms/not-a-uuid/select"), Uuid::new_v4())
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::BAD_REQUEST, response.status());
	assert_failure_envelope(response).await;
}

#[tokio::test]
async fn malformed_bodies_should_be_rejected_with_an_envelope() {
	let (client, _) = start_test_server().await;
	let user = Uuid::new_v4();
	let room = open_room(&client, user).await;

	let response = as_user(client.post(&format!("/api/support/room/{}/messages", room.id)), user)
		.header(reqwest::header::CONTENT_TYPE, "application/json")
		.body("{\"message\": ")
		.send()
		.await
		.expect("Request failed.");

	assert_eq!(StatusCode::BAD_REQUEST, response.status());
	assert_failure_envelope(response).await;
}

#[tokio::test]
async fn closed_rooms_should_reject_messages() {
	let (client, _) = start_test_server().await;
	let admin = Uuid::new_v4();
	let user = Uuid::new_v4();
	let room = open_room(&client, user).await;

	let response = as_admin(client.put(&format!("/api/admin/support/rooms/{}/status", room.id)), admin)
		.json(&json!({"status": "closed"}))
		.send()
		.await
		.expect("Request failed.");
	assert_eq!(StatusCode::OK, response.status());
	let closed: ChatRoom = data(response).await;
	assert_eq!(RoomStatus::Closed, closed.status);

	let response = as_user(client.post(&format!("/api/support/room/{}/messages", room.id)), user)
		.json(&json!({"message": "Hello?"}))
		.send()
		.await
		.expect("Request failed.");
	assert_eq!(StatusCode::CONFLICT, response.status());

	let response = as_admin(client.put(&format!("/api/admin/support/rooms/{}/status", room.id)), admin)
		.json(&json!({"status": "open"}))
		.send()
		.await
		.expect("Request failed.");
	assert_eq!(StatusCode::BAD_REQUEST, response.status());
}

#[tokio::test]
async fn unread_counter_should_only_count_recent_user_messages() {
	let (client, context) = start_test_server().await;
	let admin = Uuid::new_v4();
	let user = Uuid::new_v4();
	let room = open_room(&client, user).await;
	let now = context.time_source.now();
	let stale = insert_user_message(&context.chat_store, &room, DateTime::from(*now - TimeDelta::days(4))).await;
	insert_user_message(&context.chat_store, &room, now).await;

	let count = unread_count(&client, admin).await;
	assert_eq!(1, count);

	let response = as_admin(client.post("/api/admin/support/unread/mark-old-read"), admin)
		.send()
		.await
		.expect("Request failed.");
	assert_eq!(StatusCode::OK, response.status());
	let marked = data::<serde_json::Value>(response).await;
	assert_eq!(json!({"marked": 1, "count": 1}), marked);

	let messages = context.chat_store.messages(room.id).await.expect("Failed to list messages");
	let stale = messages
		.iter()
		.find(|message| message.id == stale.id)
		.expect("Missing stale message");
	assert!(stale.is_read);

	context.time_source.advance_time(Duration::from_secs(4 * 24 * 60 * 60));
	assert_eq!(0, unread_count(&client, admin).await);
}

async fn open_room(client: &TestClient, user: Uuid) -> ChatRoom {
	let response = as_user(client.post("/api/support/room"), user)
		.send()
		.await
		.expect("Request failed.");
	assert_eq!(StatusCode::OK, response.status());

	let opened = data::<serde_json::Value>(response).await;
	serde_json::from_value(opened["room"].clone()).expect("Malformed room")
}

async fn send_user_message(client: &TestClient, user: Uuid, room_id: Uuid, message: &str) -> ChatMessage {
	let response = as_user(client.post(&format!("/api/support/room/{room_id}/messages")), user)
		.json(&json!({ "message": message }))
		.send()
		.await
		.expect("Request failed.");
	assert_eq!(StatusCode::CREATED, response.status());

	data::<SentMessage>(response).await.message
}

async fn insert_user_message(
	chat_store: &crate::chat_store::ChatStore,
	room: &ChatRoom,
	created_at: DateTime,
) -> ChatMessage {
	chat_store
		.insert_message(&NewChatMessage {
			room_id: room.id,
			sender_id: room.user_id,
			sender_type: SenderType::User,
			message: "Hello".to_string(),
			created_at,
		})
		.await
		.expect("Failed to insert message")
}

async fn list_rooms(client: &TestClient, admin: Uuid) -> Vec<RoomSummary> {
	let response = as_admin(client.get("/api/admin/support/rooms"), admin)
		.send()
		.await
		.expect("Request failed.");
	assert_eq!(StatusCode::OK, response.status());

	data(response).await
}

async fn unread_count(client: &TestClient, admin: Uuid) -> u64 {
	let response = as_admin(client.get("/api/admin/support/unread"), admin)
		.send()
		.await
		.expect("Request failed.");
	assert_eq!(StatusCode::OK, response.status());

	let count = data::<serde_json::Value>(response).await;
	count["count"].as_u64().expect("Missing count")
}

fn badges(rooms: &[RoomSummary]) -> Vec<(Uuid, u64)> {
	rooms
		.iter()
		.map(|summary| (summary.room.id, summary.unread_count))
		.collect()
}

async fn data<T: DeserializeOwned>(response: reqwest::Response) -> T {
	let envelope = response.json::<ApiResponse<T>>().await.expect("Malformed envelope");
	assert!(envelope.success, "Unsuccessful response: {:?}", envelope.message);
	envelope.data.expect("Response without data")
}

fn as_user(request: RequestBuilder, user: Uuid) -> RequestBuilder {
	request
		.header(USER_ID_HEADER, user.to_string())
		.header(USER_EMAIL_HEADER, "user@example.com")
}

fn as_admin(request: RequestBuilder, admin: Uuid) -> RequestBuilder {
	request.header(ADMIN_ID_HEADER, admin.to_string())
}

async fn assert_failure_envelope(response: reqwest::Response) {
	let envelope = response
		.json::<ApiResponse<serde_json::Value>>()
		.await
		.expect("Malformed envelope");
	assert!(!envelope.success);
	assert!(envelope.message.is_some_and(|message| !message.is_empty()));
}
