use crate::modules::common::auth::ClientContext;
use crate::modules::mail::payload::{SearchParams, SearchResults};
use crate::modules::mail::MAILBOX;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::ApiResult;
use poem_openapi::param::Query;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct SearchApi;

#[OpenApi(prefix_path = "/api", tag = "ApiTags::Search")]
impl SearchApi {
    /// Searches the caller's mail.
    ///
    /// `q` runs the quick search (every term must match). Otherwise `subject`, `from`,
    /// `to` and `content` are matched field by field over inbox, sent, drafts and spam.
    /// At least one parameter is required.
    #[oai(path = "/search", method = "get", operation_id = "search")]
    async fn search(
        &self,
        q: Query<Option<String>>,
        subject: Query<Option<String>>,
        from: Query<Option<String>>,
        to: Query<Option<String>>,
        content: Query<Option<String>>,
        context: ClientContext,
    ) -> ApiResult<Json<SearchResults>> {
        let params = SearchParams {
            q: q.0,
            subject: subject.0,
            from: from.0,
            to: to.0,
            content: content.0,
        };
        Ok(Json(MAILBOX.find(&context.username, params).await?))
    }
}
