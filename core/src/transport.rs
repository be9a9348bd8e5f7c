//! Executing plain-data requests over the network.
//!
//! The dispatcher only ever sees [`Transport`]; swapping in a closure or a
//! recording fake is how the pipeline is tested without a server.

use std::time::Duration;

use crate::error::{ApiError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one HTTP exchange.
///
/// Implementations must return every status code as data; classifying
/// statuses is the normalizer's job.
pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

impl<F> Transport for F
where
    F: Fn(&HttpRequest) -> Result<HttpResponse> + Send + Sync,
{
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        self(request)
    }
}

/// Blocking transport backed by a pooled `ureq` agent.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport").finish_non_exhaustive()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        Self::with_timeout(None)
    }

    /// `timeout` bounds each whole exchange; `None` waits indefinitely.
    pub fn with_timeout(timeout: Option<Duration>) -> Self {
        // 4xx/5xx must come back as responses, not errors.
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(timeout)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.full_url();
        let body = request.body.as_deref();

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(&url), &request.headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(&url), &request.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(&url), &request.headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
            HttpMethod::Patch => {
                let builder = with_headers(self.agent.patch(&url), &request.headers);
                match body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        // ureq caps bodies at 10 MiB unless told otherwise; large collections exceed that.
        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_are_transports() {
        let transport = |request: &HttpRequest| -> Result<HttpResponse> {
            Ok(HttpResponse {
                status: 200,
                headers: Vec::new(),
                body: format!("\"{}\"", request.method),
            })
        };
        let request = HttpRequest {
            method: HttpMethod::Delete,
            url: "http://localhost/api/v3/x".to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        };
        let response = transport.execute(&request).unwrap();
        assert_eq!(response.body, "\"DELETE\"");
    }

    /// Serve one canned HTTP/1.1 response on a random port.
    fn serve_once(status_line: &'static str, body: String) -> String {
        use std::io::{BufRead, BufReader, Write};

        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut line = String::new();
            loop {
                line.clear();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
            }
            let mut stream = reader.into_inner();
            write!(
                stream,
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(body.as_bytes()).unwrap();
            stream.flush().unwrap();
        });
        format!("http://{addr}/api/v3/work_packages")
    }

    #[test]
    fn bodies_over_ten_mebibytes_are_read_whole() {
        let body = format!("[\"{}\"]", "a".repeat(11 * 1024 * 1024));
        let url = serve_once("HTTP/1.1 200 OK", body.clone());
        let request = HttpRequest {
            method: HttpMethod::Get,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        };

        let response = UreqTransport::new().execute(&request).unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.body.len(), body.len());
        assert!(crate::normalize::normalize(&response).unwrap().as_value().is_some());
    }

    #[test]
    fn error_statuses_come_back_as_responses() {
        let url = serve_once("HTTP/1.1 422 Unprocessable Entity", r#"{"message":"bad"}"#.to_string());
        let request = HttpRequest {
            method: HttpMethod::Get,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        };

        let response = UreqTransport::new().execute(&request).unwrap();
        assert_eq!(response.status, 422);
        assert_eq!(response.body, r#"{"message":"bad"}"#);
        assert!(response.is_json());
    }

    #[test]
    fn unreachable_host_is_transport_error() {
        let transport = UreqTransport::with_timeout(Some(Duration::from_secs(2)));
        let request = HttpRequest {
            method: HttpMethod::Get,
            url: "http://127.0.0.1:9/api/v3/statuses".to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
        };
        let err = transport.execute(&request).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
