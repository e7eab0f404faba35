use crate::modules::common::auth::ClientContext;
use crate::modules::mail::MAILBOX;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::NoContent;
use crate::modules::rest::ApiResult;
use poem_openapi::param::Path;
use poem_openapi::OpenApi;

pub struct SpamApi;

#[OpenApi(prefix_path = "/api", tag = "ApiTags::Spam")]
impl SpamApi {
    /// Reports a mail as spam and blacklists the URLs it contains.
    #[oai(path = "/spam/:id", method = "post", operation_id = "mark_spam")]
    async fn mark_spam(&self, id: Path<u64>, context: ClientContext) -> ApiResult<NoContent> {
        MAILBOX.mark_spam(&context.username, id.0).await?;
        Ok(NoContent::Done)
    }

    /// Moves a mail out of spam and lifts the blacklist entries for its URLs.
    #[oai(path = "/spam/:id/unspam", method = "post", operation_id = "unmark_spam")]
    async fn unmark_spam(&self, id: Path<u64>, context: ClientContext) -> ApiResult<NoContent> {
        MAILBOX.unmark_spam(&context.username, id.0).await?;
        Ok(NoContent::Done)
    }
}
