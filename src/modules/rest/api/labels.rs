// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use crate::modules::common::auth::ClientContext;
use crate::modules::label::entity::Label;
use crate::modules::label::payload::{
    CreateLabelRequest, LabelDetail, LabelMailRequest, LabelMembership, LabelNode,
    UpdateLabelRequest,
};
use crate::modules::rest::api::ApiTags;
use crate::modules::rest::response::{LabelCreated, NoContent};
use crate::modules::rest::ApiResult;
use poem_openapi::param::Path;
use poem_openapi::payload::Json;
use poem_openapi::OpenApi;

pub struct LabelsApi;

#[OpenApi(prefix_path = "/api", tag = "ApiTags::Labels")]
impl LabelsApi {
    /// Lists the caller's labels ordered by name.
    #[oai(path = "/labels", method = "get", operation_id = "list_labels")]
    async fn list_labels(&self, context: ClientContext) -> ApiResult<Json<Vec<Label>>> {
        Ok(Json(Label::list(&context.username).await?))
    }

    /// The caller's labels as nested nodes.
    #[oai(path = "/labels/tree", method = "get", operation_id = "label_tree")]
    async fn label_tree(&self, context: ClientContext) -> ApiResult<Json<Vec<LabelNode>>> {
        Ok(Json(Label::tree(&context.username).await?))
    }

    /// Creates a label. Names are unique per user regardless of case.
    #[oai(path = "/labels", method = "post", operation_id = "create_label")]
    async fn create_label(
        &self,
        payload: Json<CreateLabelRequest>,
        context: ClientContext,
    ) -> ApiResult<LabelCreated> {
        let label = Label::create(&context.username, payload.0).await?;
        let location = format!("/api/labels/{}", label.id);
        Ok(LabelCreated::Created(Json(label), location))
    }

    /// Returns a label with its mails.
    #[oai(path = "/labels/:id", method = "get", operation_id = "get_label")]
    async fn get_label(&self, id: Path<u64>, context: ClientContext) -> ApiResult<Json<LabelDetail>> {
        Ok(Json(Label::with_mails(&context.username, id.0).await?))
    }

    /// Renames, recolors or moves a label. Moving a label under its own descendant is rejected.
    #[oai(path = "/labels/:id", method = "patch", operation_id = "update_label")]
    async fn update_label(
        &self,
        id: Path<u64>,
        payload: Json<UpdateLabelRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<Label>> {
        Ok(Json(
            Label::update(&context.username, id.0, payload.0).await?,
        ))
    }

    /// Deletes a label together with all of its descendants.
    #[oai(path = "/labels/:id", method = "delete", operation_id = "delete_label")]
    async fn delete_label(&self, id: Path<u64>, context: ClientContext) -> ApiResult<NoContent> {
        Label::delete(&context.username, id.0).await?;
        Ok(NoContent::Done)
    }

    #[oai(path = "/labels/:id/mails", method = "post", operation_id = "add_mail_to_label")]
    async fn add_mail_to_label(
        &self,
        id: Path<u64>,
        payload: Json<LabelMailRequest>,
        context: ClientContext,
    ) -> ApiResult<Json<LabelMembership>> {
        let added = Label::add_mail(&context.username, id.0, payload.0.mail_id).await?;
        Ok(Json(LabelMembership { added }))
    }

    #[oai(
        path = "/labels/:id/:mail_id",
        method = "delete",
        operation_id = "remove_mail_from_label"
    )]
    async fn remove_mail_from_label(
        &self,
        id: Path<u64>,
        mail_id: Path<u64>,
        context: ClientContext,
    ) -> ApiResult<NoContent> {
        Label::remove_mail(&context.username, id.0, mail_id.0).await?;
        Ok(NoContent::Done)
    }
}
