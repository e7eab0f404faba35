use crate::modules::common::auth::ClientContext;
use crate::modules::mail::payload::StarState;
use crate::modules::mail::MAILBOX;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct StarredApi;

#[OpenApi(prefix_path = "/api", tag = "ApiTags::Starred")]
impl StarredApi {
    /// Flips the star on every view the caller has of the mail.
    #[oai(path = "/starred/:id", method = "post", operation_id = "toggle_star")]
    async fn toggle_star(&self, id: Path<u64>, context: ClientContext) -> ApiResult<Json<StarState>> {
        let starred = MAILBOX.toggle_star(&context.username, id.0).await?;
        Ok(Json(StarState { starred }))
    }

    #[oai(path = "/starred/:id", method = "get", operation_id = "get_star")]
    async fn get_star(&self, id: Path<u64>, context: ClientContext) -> ApiResult<Json<StarState>> {
        let starred = MAILBOX.is_starred(&context.username, id.0).await?;
        Ok(Json(StarState { starred }))
    }
}
