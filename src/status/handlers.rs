//! Status page handlers.

use axum::{extract::State, http::header, response::IntoResponse, Json};
use serde::Serialize;

use crate::status::server::StatusState;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct AdvertisedPort {
    pub port: u16,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PortListing {
    pub ports: Vec<AdvertisedPort>,
}

/// Format one advertised endpoint, e.g. `tcp://tcp-echo.fly.dev:8080`.
pub fn endpoint_url(scheme: &str, host: &str, port: u16) -> String {
    format!("{scheme}://{host}:{port}")
}

/// Render the plain-text landing page.
pub fn render_listing(scheme: &str, host: &str, ports: &[u16]) -> String {
    let mut out = String::from(
        "Hello!\n\
         \n\
         I'm a raw TCP echo service. Whatever you send to me will be sent right back to you.\n\
         \n\
         I'm listening on a bunch of ports. Even numbered ports return data as is. \
         Odd numbered ports SHOUT the data back at you.\n\
         \n\
         Give these a try:\n",
    );
    for &port in ports {
        out.push_str(" - ");
        out.push_str(&endpoint_url(scheme, host, port));
        out.push('\n');
    }
    out
}

pub async fn get_index(State(state): State<StatusState>) -> impl IntoResponse {
    let body = render_listing(&state.scheme, &state.public_host, &state.ports);
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body)
}

pub async fn get_ports(State(state): State<StatusState>) -> Json<PortListing> {
    let ports = state
        .ports
        .iter()
        .map(|&port| AdvertisedPort {
            port,
            url: endpoint_url(&state.scheme, &state.public_host, port),
        })
        .collect();
    Json(PortListing { ports })
}
