use poem_openapi::payload::Json;
use poem_openapi::ApiResponse;

use crate::modules::label::entity::Label;
use crate::modules::mail::payload::MailItem;
use crate::modules::token::payload::TokenResponse;
use crate::modules::user::payload::UserProfile;

/// The operation succeeded and there is nothing to return.
#[derive(ApiResponse)]
pub enum NoContent {
    #[oai(status = 204)]
    Done,
}

#[derive(ApiResponse)]
pub enum UserCreated {
    #[oai(status = 201)]
    Created(Json<UserProfile>, #[oai(header = "Location")] String),
}

#[derive(ApiResponse)]
pub enum TokenIssued {
    #[oai(status = 201)]
    Created(Json<TokenResponse>),
}

#[derive(ApiResponse)]
pub enum MailCreated {
    #[oai(status = 201)]
    Created(Json<MailItem>, #[oai(header = "Location")] String),
}

#[derive(ApiResponse)]
pub enum LabelCreated {
    #[oai(status = 201)]
    Created(Json<Label>, #[oai(header = "Location")] String),
}
