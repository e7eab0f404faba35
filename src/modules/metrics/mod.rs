use std::sync::LazyLock;

use crate::webmail_version;
use crate::{
    modules::{context::Initialize, error::WebmailResult},
    utc_now,
};
use prometheus::{
    register_gauge, register_gauge_vec, register_histogram_vec, register_int_counter_vec, Gauge,
    GaugeVec, HistogramVec, IntCounterVec,
};

pub mod endpoint;

pub const SUCCESS: &str = "success";
pub const FAILURE: &str = "failure";

pub const CHECK: &str = "check";
pub const ADD: &str = "add";
pub const REMOVE: &str = "remove";

// Metric name constants
pub const METRIC_REQUEST_DURATION_BY_STATUS: &str = "webmail_request_duration_seconds_by_status";
pub const METRIC_REQUEST_DURATION_BY_METHOD_AND_OPERATION: &str =
    "webmail_request_duration_seconds_by_method_and_operation";
pub const METRIC_REQUEST_TOTAL_BY_METHOD_AND_OPERATION: &str =
    "webmail_request_total_by_method_and_operation";
pub const METRIC_MAIL_DELIVERY_TOTAL: &str = "webmail_mail_delivery_total";
pub const METRIC_BLACKLIST_COMMANDS_TOTAL: &str = "webmail_blacklist_commands_total";
pub const METRIC_BUILD_INFO: &str = "webmail_build_info";
pub const METRIC_START_TIMESTAMP: &str = "webmail_start_timestamp";

pub static WEBMAIL_BUILD_INFO: LazyLock<GaugeVec> = LazyLock::new(|| {
    register_gauge_vec!(
        METRIC_BUILD_INFO,
        "Build information including version and commit hash",
        &["version", "commit"]
    )
    .expect("Failed to register webmail_build_info")
});

pub static WEBMAIL_START_TIMESTAMP: LazyLock<Gauge> = LazyLock::new(|| {
    register_gauge!(
        METRIC_START_TIMESTAMP,
        "Unix timestamp when the webmail server started"
    )
    .expect("Failed to register webmail_start_timestamp")
});

pub static WEBMAIL_REQUEST_DURATION_BY_STATUS: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec!(
        METRIC_REQUEST_DURATION_BY_STATUS,
        "Distribution of HTTP request durations, measured in seconds, grouped by response status code",
        &["status"]
    )
    .expect("Failed to register request_duration_seconds_by_status")
});

pub static WEBMAIL_REQUEST_DURATION_BY_METHOD_AND_OPERATION: LazyLock<HistogramVec> =
    LazyLock::new(|| {
        register_histogram_vec!(
            METRIC_REQUEST_DURATION_BY_METHOD_AND_OPERATION,
            "Distribution of HTTP request durations, measured in seconds, grouped by method, operation ID, and status code",
            &["method", "operation_id", "status"]
        )
        .expect("Failed to register request_duration_seconds_by_method_and_operation")
    });

pub static WEBMAIL_REQUEST_TOTAL_BY_METHOD_AND_OPERATION: LazyLock<IntCounterVec> =
    LazyLock::new(|| {
        register_int_counter_vec!(
            METRIC_REQUEST_TOTAL_BY_METHOD_AND_OPERATION,
            "Total number of HTTP requests, grouped by method, operation ID, and status code",
            &["method", "operation_id", "status"]
        )
        .expect("Failed to register request_total_by_method_and_operation")
    });

/// Mail views created by delivery, grouped by the folder they landed in.
pub static WEBMAIL_MAIL_DELIVERY_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        METRIC_MAIL_DELIVERY_TOTAL,
        "Total number of mail views created by delivery, grouped by folder",
        &["folder"]
    )
    .expect("Failed to register webmail_mail_delivery_total")
});

pub static WEBMAIL_BLACKLIST_COMMANDS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec!(
        METRIC_BLACKLIST_COMMANDS_TOTAL,
        "Total number of blacklist service commands, grouped by command and result",
        &["command", "result"]
    )
    .expect("Failed to register webmail_blacklist_commands_total")
});

pub struct MetricsService;

impl Initialize for MetricsService {
    async fn initialize() -> WebmailResult<()> {
        let now = utc_now!();
        WEBMAIL_START_TIMESTAMP.set(now as f64);
        let version = webmail_version!();
        let commit = env!("GIT_HASH");
        WEBMAIL_BUILD_INFO
            .with_label_values(&[version, commit])
            .set(1.0);
        Ok(())
    }
}
