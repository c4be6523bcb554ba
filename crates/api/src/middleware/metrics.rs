//! Prometheus metrics middleware and reminder counters.

use axum::{
    body::Body,
    extract::MatchedPath,
    http::{header, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use domain::services::{Channel, SmsCommand};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Records `http_requests_total` and `http_request_duration_seconds`.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = method_to_str(req.method());
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(req).await;

    counter!(
        "http_requests_total",
        "method" => method,
        "path" => path.clone(),
        "status" => response.status().as_u16().to_string()
    )
    .increment(1);

    histogram!(
        "http_request_duration_seconds",
        "method" => method,
        "path" => path
    )
    .record(start.elapsed().as_secs_f64());

    response
}

fn method_to_str(method: &Method) -> &'static str {
    match *method {
        Method::GET => "GET",
        Method::POST => "POST",
        Method::PUT => "PUT",
        Method::DELETE => "DELETE",
        Method::HEAD => "HEAD",
        _ => "OTHER",
    }
}

pub fn record_reminder_sent(channel: Channel) {
    counter!("reminders_sent_total", "channel" => channel.as_str()).increment(1);
}

pub fn record_reminder_failed(channel: Channel) {
    counter!("reminders_failed_total", "channel" => channel.as_str()).increment(1);
}

pub fn record_reminder_batch(duration_secs: f64, marked: u64) {
    histogram!("reminder_batch_duration_seconds").record(duration_secs);
    counter!("reminders_marked_total").increment(marked);
}

pub fn record_inbound_sms(command: SmsCommand) {
    let label = match command {
        SmsCommand::Yes => "yes",
        SmsCommand::No => "no",
        SmsCommand::Stop => "stop",
        SmsCommand::Unrecognized => "unrecognized",
    };
    counter!("inbound_sms_total", "command" => label).increment(1);
}

/// Handler for /metrics endpoint that returns Prometheus text format.
pub async fn metrics_handler() -> impl IntoResponse {
    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            "Metrics not initialized".to_string(),
        ),
    }
}

/// Installs the global Prometheus recorder. Later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0])?
        .install_recorder()?;

    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_to_str() {
        assert_eq!(method_to_str(&Method::GET), "GET");
        assert_eq!(method_to_str(&Method::POST), "POST");
        assert_eq!(method_to_str(&Method::PATCH), "OTHER");
    }

    #[test]
    fn test_counters_without_recorder_are_noops() {
        record_reminder_sent(Channel::Email);
        record_reminder_failed(Channel::Sms);
        record_reminder_batch(0.5, 3);
        record_inbound_sms(SmsCommand::Stop);
    }
}
