pub mod client;

pub use client::{DEFAULT_SYNTHESIS_URL, HttpSynthesisClient, SynthesisClient, SynthesisError};

use axum::extract::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
};
use qstate::api::{Diagnostic, QubitCount, StateError};
use qstate::circuit::{Circuit, CircuitDiagram, describe_steps};
use qstate::histogram::HistogramModel;
use qstate::samples::{Sample, basis_states, random_sample, samples};
use qstate::sphere::SphereScene;
use qstate::state::StateVector;
use qstate::{Conversion, Theme, convert, render_circuit_svg};
use qstate_types::BackendGate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub struct AppState<C> {
    client: C,
    /// One permit: a single conversion may wait on the service at a time.
    in_flight: Arc<Semaphore>,
}

/// Qubit counts arrive either as JSON numbers or as the raw text of an input box.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum QubitField {
    Number(i64),
    Fraction(f64),
    Text(String),
}

impl QubitField {
    pub fn resolve(&self) -> Result<QubitCount, StateError> {
        match self {
            QubitField::Number(n) => usize::try_from(*n)
                .map_err(|_| StateError::InvalidQubitCount(n.to_string()))
                .and_then(QubitCount::new),
            QubitField::Fraction(x) => Err(StateError::InvalidQubitCount(x.to_string())),
            QubitField::Text(text) => QubitCount::parse(text),
        }
    }
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ConvertRequest {
    pub num_qubits: QubitField,
    pub wavefunction: String,
    #[serde(default)]
    pub theme: Theme,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CircuitRequest {
    pub num_qubits: QubitField,
    pub gates: Vec<BackendGate>,
    #[serde(default)]
    pub theme: Theme,
}

/// The part of a conversion computed without the remote service.
#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct VectorView {
    pub num_qubits: usize,
    pub vector: StateVector,
    pub vector_text: String,
    pub normalization_sum: f64,
    pub diagnostics: Vec<Diagnostic>,
    pub messages: Vec<String>,
    pub sphere: SphereScene,
}

impl From<&Conversion> for VectorView {
    fn from(c: &Conversion) -> Self {
        Self {
            num_qubits: c.qubits.get(),
            vector: c.vector.clone(),
            vector_text: c.vector_text(),
            normalization_sum: c.normalization_sum,
            diagnostics: c.diagnostics.clone(),
            messages: c.messages(),
            sphere: c.sphere(),
        }
    }
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CircuitView {
    pub circuit: CircuitDiagram,
    pub svg: String,
    pub steps: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisView {
    #[serde(flatten)]
    pub circuit: CircuitView,
    pub histogram: HistogramModel,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub enum SynthesisOutcome {
    Ok(SynthesisView),
    Error(String),
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ConvertResponse {
    #[serde(flatten)]
    pub local: VectorView,
    pub synthesis: SynthesisOutcome,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SamplesResponse {
    pub num_qubits: usize,
    pub samples: Vec<Sample>,
    pub basis_states: Vec<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    InvalidInput(#[from] StateError),

    #[error("a conversion is already in progress")]
    Busy,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::Busy => StatusCode::CONFLICT,
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

fn circuit_view(circuit: Circuit, gates: &[BackendGate], theme: Theme) -> CircuitView {
    let diagram = circuit.layout();
    CircuitView {
        svg: render_circuit_svg(&diagram, theme),
        circuit: diagram,
        steps: describe_steps(gates),
    }
}

pub fn router<C: SynthesisClient>(client: C) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let state = Arc::new(AppState {
        client,
        in_flight: Arc::new(Semaphore::new(1)),
    });

    Router::new()
        .route("/api/convert", post(convert_wavefunction::<C>))
        .route("/api/vector", post(vector_only))
        .route("/api/circuit", post(layout_circuit))
        .route("/api/samples/{n}", get(list_samples))
        .route("/api/health", get(health))
        .route("/api/schema", get(schema))
        .layer(
            TraceLayer::new_for_http().make_span_with(|req: &Request| {
                tracing::debug_span!("request", method = %req.method(), uri = %req.uri())
            }),
        )
        .with_state(state)
        .layer(cors)
}

async fn health() -> &'static str {
    "ok"
}

async fn schema() -> Json<serde_json::Value> {
    Json(qstate_types::contract_schema())
}

async fn convert_wavefunction<C: SynthesisClient>(
    State(state): State<Arc<AppState<C>>>,
    Json(body): Json<ConvertRequest>,
) -> Result<Json<ConvertResponse>, ApiError> {
    let qubits = body.num_qubits.resolve()?;
    let conversion = convert(qubits, &body.wavefunction);
    let local = VectorView::from(&conversion);

    // held until the service call resolves, whichever way it goes
    let _permit = state
        .in_flight
        .clone()
        .try_acquire_owned()
        .map_err(|_| ApiError::Busy)?;

    let request = conversion.synthesis_request();
    let synthesis = match state.client.prepare_state(&request).await {
        Ok(response) => match Circuit::from_response(&response) {
            Ok(circuit) => {
                info!(
                    gates = response.gate_sequence.len(),
                    achieved_qubits = response.num_qubits,
                    "state preparation succeeded"
                );
                SynthesisOutcome::Ok(SynthesisView {
                    circuit: circuit_view(circuit, &response.gate_sequence, body.theme),
                    histogram: HistogramModel::new(&response.counts, body.theme),
                })
            }
            Err(e) => {
                warn!(achieved_qubits = response.num_qubits, "service reported an unusable width");
                SynthesisOutcome::Error(format!("Backend error: {}", e))
            }
        },
        Err(e) => {
            warn!(error = %e, "state preparation failed");
            SynthesisOutcome::Error(format!("Backend error: {}", e))
        }
    };

    Ok(Json(ConvertResponse { local, synthesis }))
}

async fn vector_only(
    Json(body): Json<ConvertRequest>,
) -> Result<Json<VectorView>, ApiError> {
    let qubits = body.num_qubits.resolve()?;
    Ok(Json(VectorView::from(&convert(qubits, &body.wavefunction))))
}

async fn layout_circuit(
    Json(body): Json<CircuitRequest>,
) -> Result<Json<CircuitView>, ApiError> {
    let qubits = body.num_qubits.resolve()?;
    let circuit = Circuit::from_backend_gates(qubits, &body.gates);
    Ok(Json(circuit_view(circuit, &body.gates, body.theme)))
}

async fn list_samples(
    Path(n): Path<String>,
) -> Result<Json<SamplesResponse>, ApiError> {
    let qubits = QubitCount::parse(&n)?;
    let mut list = samples(qubits);
    list.push(random_sample(qubits, &mut rand::thread_rng()));
    Ok(Json(SamplesResponse {
        num_qubits: qubits.get(),
        samples: list,
        basis_states: basis_states(qubits),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, header};
    use qstate_types::{SynthesisRequest, SynthesisResponse};
    use std::collections::BTreeMap;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    #[derive(Clone)]
    struct StubClient {
        result: Result<SynthesisResponse, SynthesisError>,
        entered: Option<Arc<Notify>>,
        release: Option<Arc<Notify>>,
    }

    impl StubClient {
        fn answering(result: Result<SynthesisResponse, SynthesisError>) -> Self {
            Self {
                result,
                entered: None,
                release: None,
            }
        }
    }

    impl SynthesisClient for StubClient {
        async fn prepare_state(
            &self,
            _request: &SynthesisRequest,
        ) -> Result<SynthesisResponse, SynthesisError> {
            if let Some(entered) = &self.entered {
                entered.notify_one();
            }
            if let Some(release) = &self.release {
                release.notified().await;
            }
            self.result.clone()
        }
    }

    fn bell_response() -> SynthesisResponse {
        let ry = BackendGate {
            step: 1,
            gate: "RY".to_string(),
            qubits: vec![0],
            angle: Some(std::f64::consts::FRAC_PI_2),
            ..Default::default()
        };
        let cnot = BackendGate {
            step: 2,
            gate: "CNOT".to_string(),
            control: Some(0),
            target: Some(1),
            ..Default::default()
        };
        SynthesisResponse {
            num_qubits: 2,
            gate_sequence: vec![ry, cnot],
            counts: BTreeMap::from([("00".to_string(), 512), ("11".to_string(), 488)]),
        }
    }

    fn post_json(uri: &str, body: serde_json::Value) -> axum::http::Request<Body> {
        axum::http::Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn convert_returns_vector_and_circuit() {
        let app = router(StubClient::answering(Ok(bell_response())));
        let response = app
            .oneshot(post_json(
                "/api/convert",
                serde_json::json!({ "numQubits": 2, "wavefunction": "(0.707)|00> + (0.707)|11>" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["vectorText"], "[0.707, 0, 0, 0.707]");
        assert_eq!(json["diagnostics"].as_array().unwrap().len(), 0);
        let ok = &json["synthesis"]["ok"];
        assert_eq!(ok["circuit"]["columns"].as_array().unwrap().len(), 2);
        assert_eq!(ok["histogram"]["labels"][1], "11");
        assert!(ok["steps"].as_str().unwrap().contains("Apply CNOT (control q0 → target q1)"));
        assert!(ok["svg"].as_str().unwrap().starts_with("<svg"));
    }

    #[tokio::test]
    async fn service_failure_is_a_distinct_message() {
        let app = router(StubClient::answering(Err(SynthesisError::Network(
            "connection refused".to_string(),
        ))));
        let response = app
            .oneshot(post_json(
                "/api/convert",
                serde_json::json!({ "numQubits": "1", "wavefunction": "(1)|0>" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(
            json["synthesis"]["error"],
            "Backend error: network error: connection refused"
        );
        assert_eq!(json["vectorText"], "[1, 0]");
    }

    #[tokio::test]
    async fn invalid_qubit_count_is_rejected() {
        let app = router(StubClient::answering(Ok(bell_response())));
        for n in [serde_json::json!(0), serde_json::json!(6), serde_json::json!("two")] {
            let response = app
                .clone()
                .oneshot(post_json(
                    "/api/convert",
                    serde_json::json!({ "numQubits": n, "wavefunction": "(1)|0>" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[tokio::test]
    async fn fractional_qubit_count_is_a_bad_request() {
        let app = router(StubClient::answering(Ok(bell_response())));
        let response = app
            .oneshot(post_json(
                "/api/vector",
                serde_json::json!({ "numQubits": 2.5, "wavefunction": "(1)|00>" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().contains("'2.5'"));
    }

    #[tokio::test]
    async fn unusable_achieved_width_is_a_service_error() {
        for achieved in [0, 40] {
            let mut response = bell_response();
            response.num_qubits = achieved;
            response.gate_sequence = vec![BackendGate {
                step: 1,
                gate: "H".to_string(),
                qubits: vec![0],
                ..Default::default()
            }];
            let app = router(StubClient::answering(Ok(response)));
            let response = app
                .oneshot(post_json(
                    "/api/convert",
                    serde_json::json!({ "numQubits": 1, "wavefunction": "(1)|0>" }),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let json = json_body(response).await;
            assert!(json["synthesis"]["ok"].is_null());
            assert_eq!(
                json["synthesis"]["error"],
                format!(
                    "Backend error: Enter a valid number of qubits (between 1 and 5), got '{}'",
                    achieved
                )
            );
            assert_eq!(json["vectorText"], "[1, 0]");
        }
    }

    #[tokio::test]
    async fn second_conversion_while_one_is_pending_conflicts() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let app = router(StubClient {
            result: Ok(bell_response()),
            entered: Some(entered.clone()),
            release: Some(release.clone()),
        });
        let body = serde_json::json!({ "numQubits": 2, "wavefunction": "(1)|00>" });

        let first = tokio::spawn(app.clone().oneshot(post_json("/api/convert", body.clone())));
        entered.notified().await;

        let second = app
            .clone()
            .oneshot(post_json("/api/convert", body.clone()))
            .await
            .unwrap();
        assert_eq!(second.status(), StatusCode::CONFLICT);

        release.notify_one();
        let first = first.await.unwrap().unwrap();
        assert_eq!(first.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn vector_endpoint_reports_diagnostics() {
        let app = router(StubClient::answering(Ok(bell_response())));
        let response = app
            .oneshot(post_json(
                "/api/vector",
                serde_json::json!({ "numQubits": 2, "wavefunction": "(2)|00>" }),
            ))
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["vectorText"], "[0, 0, 0, 0]");
        assert_eq!(json["diagnostics"][0]["kind"], "normalization");
        assert_eq!(json["sphere"]["points"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn circuit_endpoint_lays_out_gates() {
        let app = router(StubClient::answering(Ok(bell_response())));
        let response = app
            .oneshot(post_json(
                "/api/circuit",
                serde_json::json!({
                    "numQubits": 2,
                    "theme": "dark",
                    "gates": [{ "step": 1, "gate": "H", "qubits": [0] }]
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["circuit"]["width"], 240.0);
        assert!(json["svg"].as_str().unwrap().contains("#d0d9e9ff"));
    }

    #[tokio::test]
    async fn samples_endpoint() {
        let app = router(StubClient::answering(Ok(bell_response())));
        let response = app
            .clone()
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/samples/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let json = json_body(response).await;
        let samples = json["samples"].as_array().unwrap();
        assert_eq!(samples.len(), 5);
        assert_eq!(samples[4]["name"], "Random Normalized State");
        assert_eq!(json["basisStates"][3], "11");

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/samples/9")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn schema_endpoint_describes_the_contract() {
        let app = router(StubClient::answering(Ok(bell_response())));
        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/api/schema")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json["response"].is_object());
        assert!(json["request"].to_string().contains("amplitudes"));
    }
}
