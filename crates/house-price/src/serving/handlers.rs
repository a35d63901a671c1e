//! HTTP request handlers.

use axum::extract::{Form, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use tracing::debug;

use crate::encoding::EncodeError;

use super::form::PredictionForm;
use super::page::{form_page, unavailable_page, Notice};
use super::AppState;

/// `GET /`: the empty form, or the blocking error page.
pub async fn show_form(State(state): State<AppState>) -> Response {
    match state.cache.get_or_load() {
        Ok(model) => {
            let values = PredictionForm::initial(&model);
            Html(form_page(&model, &values, &Notice::None)).into_response()
        }
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, Html(unavailable_page(&e))).into_response(),
    }
}

/// `POST /`: validate the submission and show the estimate.
pub async fn predict(State(state): State<AppState>, Form(values): Form<PredictionForm>) -> Response {
    let model = match state.cache.get_or_load() {
        Ok(model) => model,
        Err(e) => {
            return (StatusCode::SERVICE_UNAVAILABLE, Html(unavailable_page(&e))).into_response()
        }
    };

    let house = match values.parse() {
        Ok(house) => house,
        Err(e) => {
            debug!(error = %e, "rejected form");
            let page = form_page(&model, &values, &Notice::Invalid(e.to_string()));
            return (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response();
        }
    };

    match model.predict(&house) {
        Ok(price) => {
            debug!(price, "prediction served");
            Html(form_page(&model, &values, &Notice::Estimate(price))).into_response()
        }
        Err(e @ EncodeError::UnknownCategory { .. }) => {
            debug!(error = %e, "rejected form");
            let page = form_page(&model, &values, &Notice::Invalid(e.to_string()));
            (StatusCode::UNPROCESSABLE_ENTITY, Html(page)).into_response()
        }
        Err(e) => {
            let page = form_page(&model, &values, &Notice::Invalid(e.to_string()));
            (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
        }
    }
}
