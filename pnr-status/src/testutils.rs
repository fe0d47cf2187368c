use crate::crypto;
use crate::upstream::StatusProvider;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// Answered as "not found" by the fake enquiry endpoint.
pub const UNKNOWN_PNR: &str = "0000000000";

/// Serves `router` on an ephemeral local port.
pub async fn spawn_server(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to address");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    addr
}

/// An address nothing listens on.
pub async fn unused_addr() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

/// Serves the gateway router for `provider` and returns its base URL.
pub async fn spawn_gateway(provider: Arc<dyn StatusProvider>) -> String {
    let addr = spawn_server(crate::api::router(provider)).await;
    format!("http://{addr}")
}

pub fn enquiry_fixture() -> Value {
    json!({
        "trainNo": "12301",
        "trainName": "Rajdhani Express",
        "boardingPoint": "NDLS",
        "reservationUpTo": "HWH",
        "dateOfJourney": "2024-01-01",
        "journeyClass": "3A",
        "quota": "GN",
        "passengerList": [{
            "passengerSerialNumber": 1,
            "currentStatusDetails": "CNF/B1/23",
            "bookingStatusDetails": "CNF/WL/5",
        }]
    })
}

#[derive(Clone, Debug)]
pub struct SeenEnquiry {
    pub pnr: String,
    pub user_agent: Option<String>,
    pub accept: Option<String>,
    pub referer: Option<String>,
}

#[derive(Clone, Default)]
struct Seen {
    enquiry: Arc<Mutex<Option<SeenEnquiry>>>,
    partner_body: Arc<Mutex<Option<String>>>,
}

/// Local stand-in for both upstream providers.
///
/// - `GET /enquiry/PNR/GetPnrStatus/{pnr}`: enquiry fixture, or a not found
///   body for [`UNKNOWN_PNR`]
/// - `POST /Train/PnrchkStatus`: decrypts `pnrNumber` and echoes it back
/// - `GET /status/{code}/{pnr}`: empty response with that status
/// - `GET /garbage/{pnr}`: 200 with a non-JSON body
/// - `GET /slow/{pnr}`: enquiry fixture after two seconds
/// - `GET /huge/{pnr}`: 200 with a body larger than the upstream body limit
pub struct FakeUpstream {
    addr: SocketAddr,
    seen: Seen,
}

impl FakeUpstream {
    pub async fn start() -> Self {
        let seen = Seen::default();
        let router = Router::new()
            .route("/enquiry/PNR/GetPnrStatus/{pnr}", get(enquiry))
            .route("/Train/PnrchkStatus", post(partner))
            .route("/status/{code}/{pnr}", get(status))
            .route("/garbage/{pnr}", get(garbage))
            .route("/slow/{pnr}", get(slow))
            .route("/huge/{pnr}", get(huge))
            .with_state(seen.clone());

        let addr = spawn_server(router).await;
        FakeUpstream { addr, seen }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn enquiry_url(&self) -> String {
        format!("{}/enquiry/PNR/GetPnrStatus/", self.base_url())
    }

    pub fn partner_url(&self) -> String {
        format!("{}/Train/PnrchkStatus", self.base_url())
    }

    pub fn last_enquiry(&self) -> Option<SeenEnquiry> {
        self.seen.enquiry.lock().unwrap().clone()
    }

    pub fn last_partner_body(&self) -> Option<String> {
        self.seen.partner_body.lock().unwrap().clone()
    }
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn enquiry(
    State(seen): State<Seen>,
    Path(pnr): Path<String>,
    headers: HeaderMap,
) -> Json<Value> {
    *seen.enquiry.lock().unwrap() = Some(SeenEnquiry {
        pnr: pnr.clone(),
        user_agent: header(&headers, "user-agent"),
        accept: header(&headers, "accept"),
        referer: header(&headers, "referer"),
    });

    if pnr == UNKNOWN_PNR {
        return Json(json!({
            "error": true,
            "errorMessage": "FLUSHED PNR / PNR NOT YET GENERATED"
        }));
    }
    Json(enquiry_fixture())
}

async fn partner(State(seen): State<Seen>, Json(body): Json<Value>) -> Response {
    let encrypted = body["pnrNumber"].as_str().unwrap_or_default().to_string();
    *seen.partner_body.lock().unwrap() = Some(encrypted.clone());

    match crypto::decrypt(&encrypted) {
        Ok(pnr) => Json(json!({
            "pnrNumber": pnr,
            "trainNumber": "12301",
            "trainName": "Rajdhani Express",
            "passengerList": [{"currentStatus": "CNF"}],
        }))
        .into_response(),
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn status(Path((code, _pnr)): Path<(u16, String)>) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

async fn garbage(Path(_pnr): Path<String>) -> &'static str {
    "<html>Service temporarily unavailable</html>"
}

async fn huge(Path(_pnr): Path<String>) -> String {
    " ".repeat(crate::upstream::MAX_UPSTREAM_BODY_BYTES + 1)
}

async fn slow(Path(_pnr): Path<String>) -> Json<Value> {
    tokio::time::sleep(Duration::from_secs(2)).await;
    Json(enquiry_fixture())
}
