use crate::modules::common::auth::ClientContext;
use crate::modules::mail::payload::EmptyTrashResult;
use crate::modules::mail::MAILBOX;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::NoContent;
use crate::modules::rest::ApiResult;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct TrashApi;

#[OpenApi(prefix_path = "/api", tag = "ApiTags::Trash")]
impl TrashApi {
    /// Permanently deletes every mail in the caller's trash.
    #[oai(path = "/trash/empty", method = "delete", operation_id = "empty_trash")]
    async fn empty_trash(&self, context: ClientContext) -> ApiResult<Json<EmptyTrashResult>> {
        let deleted = MAILBOX.empty_trash(&context.username).await?;
        Ok(Json(EmptyTrashResult { deleted }))
    }

    /// Moves a mail to trash, remembering the folders it occupied.
    #[oai(path = "/trash/:id", method = "post", operation_id = "move_to_trash")]
    async fn move_to_trash(&self, id: Path<u64>, context: ClientContext) -> ApiResult<NoContent> {
        MAILBOX.move_to_trash(&context.username, id.0).await?;
        Ok(NoContent::Done)
    }

    /// Deletes a trashed mail for good. The mail record goes once no user holds a view of it.
    #[oai(path = "/trash/:id", method = "delete", operation_id = "delete_from_trash")]
    async fn delete_from_trash(
        &self,
        id: Path<u64>,
        context: ClientContext,
    ) -> ApiResult<NoContent> {
        MAILBOX.permanently_delete(&context.username, id.0).await?;
        Ok(NoContent::Done)
    }

    /// Puts a trashed mail back where it was.
    #[oai(path = "/trash/:id/restore", method = "post", operation_id = "restore_from_trash")]
    async fn restore_from_trash(
        &self,
        id: Path<u64>,
        context: ClientContext,
    ) -> ApiResult<NoContent> {
        MAILBOX.restore(&context.username, id.0).await?;
        Ok(NoContent::Done)
    }
}
