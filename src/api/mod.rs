use axum::{
    Router,
    extract::{
        Form, Json, Query, State,
        rejection::{FormRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::config::{Config, ServerConfig};
use crate::error::{FlowError, ValidationError};
use crate::flows::{
    self, AssessmentSource, BillNegotiation, CashFlowAdvisor, EnvelopeBudget, FinancialEducation,
    FormFlow, IncomeModel, TaxOptimizer, viability,
};
use crate::forms::FormData;
use crate::narrative::{self, NarrativeGenerator};

pub const VALIDATION_MESSAGE: &str = "Validation failed. Please check your inputs.";
pub const UNEXPECTED_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Shared by every handler. Immutable once the server starts.
pub struct AppState {
    narrator: Arc<dyn NarrativeGenerator>,
    timeout: Duration,
}

impl AppState {
    pub fn new(narrator: Arc<dyn NarrativeGenerator>, timeout: Duration) -> Self {
        Self { narrator, timeout }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(narrative::build_narrator(&config.llm), config.llm.timeout())
    }
}

/// Response envelope for every form endpoint.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormState<T> {
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    output: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    errors: Option<BTreeMap<String, Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    issues: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    assessment_source: Option<AssessmentSource>,
}

impl<T> FormState<T> {
    fn message(message: &str) -> Self {
        Self {
            message: message.to_string(),
            output: None,
            errors: None,
            issues: None,
            fields: None,
            assessment_source: None,
        }
    }

    fn with_output(message: &str, output: T) -> Self {
        Self {
            output: Some(output),
            ..Self::message(message)
        }
    }

    fn invalid(message: &str, err: ValidationError, form: &FormData) -> Self {
        Self {
            errors: Some(err.field_errors),
            issues: (!err.form_errors.is_empty()).then_some(err.form_errors),
            fields: Some(form.iter().map(|(k, v)| (k.clone(), v.clone())).collect()),
            ..Self::message(message)
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route(
            "/api/viability",
            get(viability_get_handler).post(viability_post_handler),
        )
        .route("/api/tax", post(form_flow_handler::<TaxOptimizer>))
        .route("/api/negotiate", post(form_flow_handler::<BillNegotiation>))
        .route("/api/cash-flow", post(form_flow_handler::<CashFlowAdvisor>))
        .route("/api/budget", post(form_flow_handler::<EnvelopeBudget>))
        .route("/api/income-model", post(form_flow_handler::<IncomeModel>))
        .route("/api/education", post(form_flow_handler::<FinancialEducation>))
        .fallback(not_found_handler)
        .with_state(Arc::new(state))
}

pub async fn run_http_server(server: &ServerConfig, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = TcpListener::bind((server.host.as_str(), server.port)).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "thrive HTTP API listening");
    info!("local access: http://127.0.0.1:{}/api/health", addr.port());

    axum::serve(listener, app).await
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn viability_get_handler(
    State(state): State<Arc<AppState>>,
    query: Result<Query<FormData>, QueryRejection>,
) -> Response {
    match query {
        Ok(Query(form)) => viability_handler_impl(&state, form).await,
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn viability_post_handler(
    State(state): State<Arc<AppState>>,
    form: Result<Form<FormData>, FormRejection>,
) -> Response {
    match form {
        Ok(Form(form)) => viability_handler_impl(&state, form).await,
        Err(rejection) => error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    }
}

async fn viability_handler_impl(state: &AppState, form: FormData) -> Response {
    let input = match viability::parse_form(&form) {
        Ok(input) => input,
        Err(err) => {
            let body = FormState::<()>::invalid(VALIDATION_MESSAGE, err, &form);
            return json_response(StatusCode::BAD_REQUEST, body);
        }
    };

    match viability::assess(state.narrator.as_ref(), state.timeout, &input).await {
        Ok(report) => {
            let message = report.message();
            let body = FormState {
                assessment_source: Some(report.assessment_source),
                ..FormState::with_output(message, report.output)
            };
            json_response(StatusCode::OK, body)
        }
        Err(err) => internal_error("income-viability", &err),
    }
}

async fn form_flow_handler<F: FormFlow>(
    State(state): State<Arc<AppState>>,
    form: Result<Form<FormData>, FormRejection>,
) -> Response {
    let form = match form {
        Ok(Form(form)) => form,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, &rejection.body_text()),
    };

    let input = match F::parse_form(&form) {
        Ok(input) => input,
        Err(err) => {
            let body = FormState::<()>::invalid(F::VALIDATION_MESSAGE, err, &form);
            return json_response(StatusCode::BAD_REQUEST, body);
        }
    };

    match flows::run::<F>(state.narrator.as_ref(), state.timeout, &input).await {
        Ok(output) => json_response(
            StatusCode::OK,
            FormState::with_output(F::SUCCESS_MESSAGE, output),
        ),
        Err(FlowError::Generation(err)) => {
            warn!(flow = F::NAME, error = %err, "flow produced no usable output");
            json_response(
                StatusCode::BAD_GATEWAY,
                FormState::<()>::message(F::FAILURE_MESSAGE),
            )
        }
        Err(err) => internal_error(F::NAME, &err),
    }
}

fn internal_error(flow: &str, err: &FlowError) -> Response {
    error!(flow, error = %err, "request failed");
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        FormState::<()>::message(UNEXPECTED_MESSAGE),
    )
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
