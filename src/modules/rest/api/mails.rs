// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::auth::ClientContext;
use crate::modules::common::paginated::parse_page;
use crate::modules::mail::attachment::store_uploads;
use crate::modules::mail::listing::FolderListing;
use crate::modules::mail::payload::{
    ComposeForm, ComposeRequest, MailItem, MailPage, UpdateMailRequest,
};
use crate::modules::mail::MAILBOX;
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::{MailCreated, NoContent};
use crate::modules::rest::ApiResult;
use poem_openapi::param::{Path, Query};
use poem_openapi::payload::Json;
use poem_openapi::{ApiRequest, OpenApi};

/// A new mail, either as JSON or as a form carrying attachments.
#[derive(ApiRequest)]
pub enum ComposePayload {
    Json(Json<ComposeRequest>),
    Form(ComposeForm),
}

pub struct MailsApi;

#[OpenApi(prefix_path = "/api", tag = "ApiTags::Mails")]
impl MailsApi {
    /// Composes a mail.
    ///
    /// With `status: sent` the mail is delivered at once; the recipient copy lands in
    /// spam when any URL in it is blacklisted. Without a status it is saved as a draft.
    #[oai(path = "/mails", method = "post", operation_id = "compose_mail")]
    async fn compose_mail(
        &self,
        payload: ComposePayload,
        context: ClientContext,
    ) -> ApiResult<MailCreated> {
        let (request, attachments) = match payload {
            ComposePayload::Json(json) => (json.0, Vec::new()),
            ComposePayload::Form(form) => {
                let (request, uploads) = form.into_parts()?;
                (request, store_uploads(uploads).await?)
            }
        };
        let item = MAILBOX
            .compose(&context.username, request, attachments)
            .await?;
        let location = format!("/api/mails/{}", item.id);
        Ok(MailCreated::Created(Json(item), location))
    }

    /// Inbox, sent and drafts merged, newest first.
    #[oai(path = "/mails/all", method = "get", operation_id = "list_all_mails")]
    async fn list_all_mails(
        &self,
        /// Zero-based page index.
        page: Query<Option<String>>,
        context: ClientContext,
    ) -> ApiResult<Json<MailPage>> {
        let page = parse_page(page.0.as_deref());
        Ok(Json(
            MAILBOX
                .list(&context.username, FolderListing::All, page)
                .await?,
        ))
    }

    /// Quick search over inbox, sent and drafts; every term must match.
    #[oai(
        path = "/mails/search/:query",
        method = "get",
        operation_id = "search_mails"
    )]
    async fn search_mails(
        &self,
        query: Path<String>,
        context: ClientContext,
    ) -> ApiResult<Json<Vec<MailItem>>> {
        Ok(Json(MAILBOX.search(&context.username, &query.0).await?))
    }

    /// Returns a mail as the caller sees it, marking it read for the recipient.
    #[oai(path = "/mails/:id", method = "get", operation_id = "get_mail")]
    async fn get_mail(&self, id: Path<u64>, context: ClientContext) -> ApiResult<Json<MailItem>> {
        Ok(Json(MAILBOX.get(&context.username, id.0).await?))
    }

    /// Edits a draft. Setting `status: sent` delivers it.
    #[oai(path = "/mails/:id", method = "patch", operation_id = "update_mail")]
    async fn update_mail(
        &self,
        id: Path<u64>,
        payload: Json<UpdateMailRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<MailItem>> {
        Ok(Json(
            MAILBOX
                .update_draft(&context.username, id.0, payload.0)
                .await?,
        ))
    }

    /// Moves a mail to the caller's trash.
    #[oai(path = "/mails/:id", method = "delete", operation_id = "delete_mail")]
    async fn delete_mail(&self, id: Path<u64>, context: ClientContext) -> ApiResult<NoContent> {
        MAILBOX.move_to_trash(&context.username, id.0).await?;
        Ok(NoContent::Done)
    }
}
