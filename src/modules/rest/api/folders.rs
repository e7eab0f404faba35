use crate::modules::common::auth::ClientContext;
use crate::modules::common::paginated::parse_page;
use crate::modules::mail::listing::FolderListing;
use crate::modules::mail::payload::MailPage;
use crate::modules::mail::MAILBOX;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use poem_openapi::param::Query;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

async fn page_of(
    context: &ClientContext,
    listing: FolderListing,
    page: Option<String>,
) -> ApiResult<Json<MailPage>> {
    let page = parse_page(page.as_deref());
    Ok(Json(MAILBOX.list(&context.username, listing, page).await?))
}

/// Folder listings. Each takes a zero-based `page` and returns 30 mails per page, newest first.
pub struct FoldersApi;

#[OpenApi(prefix_path = "/api", tag = "ApiTags::Folders")]
impl FoldersApi {
    #[oai(path = "/inbox", method = "get", operation_id = "list_inbox")]
    async fn list_inbox(
        &self,
        page: Query<Option<String>>,
        context: ClientContext,
    ) -> ApiResult<Json<MailPage>> {
        page_of(&context, FolderListing::Inbox, page.0).await
    }

    #[oai(path = "/sent", method = "get", operation_id = "list_sent")]
    async fn list_sent(
        &self,
        page: Query<Option<String>>,
        context: ClientContext,
    ) -> ApiResult<Json<MailPage>> {
        page_of(&context, FolderListing::Sent, page.0).await
    }

    #[oai(path = "/drafts", method = "get", operation_id = "list_drafts")]
    async fn list_drafts(
        &self,
        page: Query<Option<String>>,
        context: ClientContext,
    ) -> ApiResult<Json<MailPage>> {
        page_of(&context, FolderListing::Drafts, page.0).await
    }

    #[oai(path = "/spam", method = "get", operation_id = "list_spam")]
    async fn list_spam(
        &self,
        page: Query<Option<String>>,
        context: ClientContext,
    ) -> ApiResult<Json<MailPage>> {
        page_of(&context, FolderListing::Spam, page.0).await
    }

    /// Trashed mails, each carrying `deletedAt`.
    #[oai(path = "/trash", method = "get", operation_id = "list_trash")]
    async fn list_trash(
        &self,
        page: Query<Option<String>>,
        context: ClientContext,
    ) -> ApiResult<Json<MailPage>> {
        page_of(&context, FolderListing::Trash, page.0).await
    }

    /// Starred mails from every folder except trash.
    #[oai(path = "/starred", method = "get", operation_id = "list_starred")]
    async fn list_starred(
        &self,
        page: Query<Option<String>>,
        context: ClientContext,
    ) -> ApiResult<Json<MailPage>> {
        page_of(&context, FolderListing::Starred, page.0).await
    }
}
