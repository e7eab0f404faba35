use crate::modules::context::status::ServerStatus;
use poem::{handler, web::Json, IntoResponse};

#[handler]
pub async fn get_status() -> impl IntoResponse {
    Json(ServerStatus::get())
}
