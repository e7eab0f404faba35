// Copyright © 2025 rustmailer.com
// Licensed under RustMailer License Agreement v1.0
// Unauthorized copying, modification, or distribution is prohibited.

pub mod blacklist;
pub mod common;
pub mod context;
pub mod database;
pub mod error;
pub mod label;
pub mod logger;
pub mod mail;
pub mod metrics;
pub mod rest;
pub mod settings;
pub mod token;
pub mod user;
pub mod utils;
