use crate::context::ApplicationContext;
use axum::Router;
use axum::routing::{get, post, put};

mod admin;
pub mod error;
pub mod extract;
pub mod identity;
mod models;
pub mod response;
mod support;

pub fn routes() -> Router<ApplicationContext> {
	Router::new()
		.route("/support/room", post(support::open_room))
		.route("/support/room/{room_id}/messages", post(support::send_message))
		.route("/admin/support/rooms", get(admin::list_rooms))
		.route("/admin/support/rooms/{room_id}/select", post(admin::select_room))
		.route("/admin/support/rooms/{room_id}/replies", post(admin::send_reply))
		.route("/admin/support/rooms/{room_id}/status", put(admin::change_status))
		.route("/admin/support/unread", get(admin::unread_count))
		.route("/admin/support/unread/mark-old-read", post(admin::mark_old_messages_read))
}
