//! Inbound SMS webhook.

use axum::{
    extract::{rejection::FormRejection, State},
    http::header,
    response::IntoResponse,
    Form,
};
use tracing::debug;

use crate::app::AppState;
use crate::services::InboundSms;

/// Always answers 200 with a plain-text reply for the sender.
///
/// An unparseable form is handled as a message with no sender.
pub async fn inbound_sms(
    State(state): State<AppState>,
    form: Result<Form<InboundSms>, FormRejection>,
) -> impl IntoResponse {
    let sms = match form {
        Ok(Form(sms)) => sms,
        Err(rejection) => {
            debug!(error = %rejection, "Unparseable inbound SMS form");
            InboundSms::default()
        }
    };

    let reply = state.inbound_sms.handle(&sms).await;
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], reply)
}
