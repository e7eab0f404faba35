// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use folders::FoldersApi;
use labels::LabelsApi;
use mails::MailsApi;
use poem_openapi::{OpenApiService, Tags};
use search::SearchApi;
use spam::SpamApi;
use starred::StarredApi;
use trash::TrashApi;
use users::{TokensApi, UsersApi};

use crate::webmail_version;

pub mod folders;
pub mod labels;
pub mod mails;
pub mod search;
pub mod spam;
pub mod starred;
pub mod trash;
pub mod users;

#[derive(Tags)]
pub enum ApiTags {
    Users,
    Tokens,
    Mails,
    Folders,
    Trash,
    Spam,
    Starred,
    Labels,
    Search,
}

type WebmailOpenApi = (
    UsersApi,
    TokensApi,
    MailsApi,
    FoldersApi,
    TrashApi,
    SpamApi,
    StarredApi,
    LabelsApi,
    SearchApi,
);

pub fn create_openapi_service() -> OpenApiService<WebmailOpenApi, ()> {
    OpenApiService::new(
        (
            UsersApi,
            TokensApi,
            MailsApi,
            FoldersApi,
            TrashApi,
            SpamApi,
            StarredApi,
            LabelsApi,
            SearchApi,
        ),
        "WebmailApi",
        webmail_version!(),
    )
}
