// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Blocking HTTP transport for the sync engine.
//!
//! The remote contract is two endpoints:
//!
//! - `POST {base}/push` with `{clientId, operations}` -> `{success}`
//! - `GET {base}/pull?clientId=...&since=...` -> array of operations,
//!   each carrying a server-assigned `seqNo`
//!
//! Timeouts live here, not in the engine; a failed request surfaces as a
//! transport error and the engine leaves it for the next cycle.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use spaced_core::{Operation, PushAck, SequencedOperation, Transport};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Serialize)]
struct PushRequest<'a> {
    #[serde(rename = "clientId")]
    client_id: &'a str,
    operations: &'a [Operation],
}

#[derive(Deserialize)]
struct PushResponse {
    success: bool,
}

/// HTTP implementation of the sync [`Transport`].
pub struct HttpTransport {
    base_url: String,
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Creates a transport against a server base URL.
    pub fn new(base_url: impl Into<String>) -> spaced_core::Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| spaced_core::Error::Transport(err.to_string()))?;

        Ok(HttpTransport { base_url: base_url.into().trim_end_matches('/').to_string(), http })
    }

    /// Returns the configured base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Transport for HttpTransport {
    /// Reachability is learned from request outcomes; a failed push or
    /// pull is logged by the engine and retried on the next cycle.
    fn is_online(&self) -> bool {
        true
    }

    fn push(&self, client_id: &str, ops: &[Operation]) -> spaced_core::Result<PushAck> {
        let response = self
            .http
            .post(format!("{}/push", self.base_url))
            .json(&PushRequest { client_id, operations: ops })
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| spaced_core::Error::Transport(err.to_string()))?;

        let ack: PushResponse =
            response.json().map_err(|err| spaced_core::Error::Transport(err.to_string()))?;
        Ok(PushAck { success: ack.success })
    }

    fn pull(&self, client_id: &str, since_seq_no: u64) -> spaced_core::Result<Vec<SequencedOperation>> {
        let response = self
            .http
            .get(format!("{}/pull", self.base_url))
            .query(&[("clientId", client_id), ("since", &since_seq_no.to_string())])
            .send()
            .and_then(reqwest::blocking::Response::error_for_status)
            .map_err(|err| spaced_core::Error::Transport(err.to_string()))?;

        response.json().map_err(|err| spaced_core::Error::Transport(err.to_string()))
    }
}
