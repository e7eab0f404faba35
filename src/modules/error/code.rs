// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

use poem::http::StatusCode;
use poem_openapi::Enum;

#[derive(Copy, Clone, Debug, Enum, Eq, PartialEq)]
#[repr(u32)]
pub enum ErrorCode {
    // Client-side errors (10000–10999)
    InvalidParameter = 10000,
    DuplicateName = 10010,
    CircularReference = 10020,
    PayloadTooLarge = 10030,
    RequestTimeout = 10040,
    MethodNotAllowed = 10050,

    // Authentication and authorization errors (20000–20999)
    PermissionDenied = 20000,
    Forbidden = 20010,

    // Resource errors (30000–30999)
    ResourceNotFound = 30000,
    AlreadyExists = 30010,

    // Blacklist service errors (40000–40999)
    NetworkError = 40000,
    ConnectionTimeout = 40010,
    BlacklistProtocolError = 40020,

    // Internal system errors (70000–70999)
    InternalError = 70000,
    UnhandledPoemError = 70010,
}

impl ErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidParameter
            | ErrorCode::DuplicateName
            | ErrorCode::CircularReference => StatusCode::BAD_REQUEST,
            ErrorCode::PermissionDenied => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::ResourceNotFound => StatusCode::NOT_FOUND,
            ErrorCode::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            ErrorCode::AlreadyExists => StatusCode::CONFLICT,
            ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::NetworkError
            | ErrorCode::ConnectionTimeout
            | ErrorCode::BlacklistProtocolError
            | ErrorCode::InternalError
            | ErrorCode::UnhandledPoemError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors_map_to_4xx() {
        assert_eq!(ErrorCode::InvalidParameter.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::DuplicateName.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::CircularReference.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ErrorCode::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::ResourceNotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::AlreadyExists.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_blacklist_failures_are_server_errors() {
        for code in [
            ErrorCode::NetworkError,
            ErrorCode::ConnectionTimeout,
            ErrorCode::BlacklistProtocolError,
        ] {
            assert!(code.status().is_server_error());
        }
    }
}
