//! HTTP client for the repository publish API.
//!
//! Endpoints, relative to the configured base URL:
//! - `POST publish/dataset` with a [`DatasetSubmission`] body
//! - `POST publish/model` with a [`ModelSubmission`] body
//! - `GET status/{source_id}`, the id percent-encoded as one path segment
//!
//! Each returns a JSON object of status fields. Non-object responses are
//! wrapped as `{"response": ...}`.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use url::Url;

use super::{DatasetSubmission, ModelSubmission, PublishResult, Repository};
use crate::error::PackError;

/// Default timeout for one repository call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Repository reached over HTTP with an optional bearer token.
pub struct HttpRepository {
    base_url: Url,
    token: Option<String>,
    agent: ureq::Agent,
}

impl HttpRepository {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, PackError> {
        let invalid = |message: String| PackError::Remote {
            endpoint: base_url.to_string(),
            message,
        };
        let parsed =
            Url::parse(base_url).map_err(|source| invalid(format!("invalid base URL: {source}")))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("base URL cannot hold a path".to_string()));
        }

        let config = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build();

        Ok(Self {
            base_url: parsed,
            token,
            agent: config.into(),
        })
    }

    /// Append path segments to the base URL, encoding each one.
    fn endpoint(&self, segments: &[&str]) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url.into()
    }

    fn authorization(&self) -> Option<String> {
        self.token.as_deref().map(|token| format!("Bearer {token}"))
    }

    fn post_json<B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<PublishResult, PackError> {
        let endpoint = self.endpoint(segments);
        let mut request = self.agent.post(endpoint.as_str());
        if let Some(value) = self.authorization() {
            request = request.header("Authorization", &value);
        }

        let mut response = request
            .send_json(body)
            .map_err(|source| remote_error(&endpoint, source))?;
        let value = response
            .body_mut()
            .read_json::<Value>()
            .map_err(|source| remote_error(&endpoint, source))?;
        Ok(into_result(value))
    }

    fn get_json(&self, segments: &[&str]) -> Result<PublishResult, PackError> {
        let endpoint = self.endpoint(segments);
        let mut request = self.agent.get(endpoint.as_str());
        if let Some(value) = self.authorization() {
            request = request.header("Authorization", &value);
        }

        let mut response = request
            .call()
            .map_err(|source| remote_error(&endpoint, source))?;
        let value = response
            .body_mut()
            .read_json::<Value>()
            .map_err(|source| remote_error(&endpoint, source))?;
        Ok(into_result(value))
    }
}

impl Repository for HttpRepository {
    fn publish_dataset(
        &mut self,
        submission: &DatasetSubmission,
    ) -> Result<PublishResult, PackError> {
        self.post_json(&["publish", "dataset"], submission)
    }

    fn publish_model(&mut self, submission: &ModelSubmission) -> Result<PublishResult, PackError> {
        self.post_json(&["publish", "model"], submission)
    }

    fn check_status(&mut self, source_id: &str) -> Result<PublishResult, PackError> {
        self.get_json(&["status", source_id])
    }
}

fn remote_error(endpoint: &str, source: ureq::Error) -> PackError {
    PackError::Remote {
        endpoint: endpoint.to_string(),
        message: source.to_string(),
    }
}

fn into_result(value: Value) -> PublishResult {
    match value {
        Value::Object(map) => map,
        other => {
            let mut map = PublishResult::new();
            map.insert("response".to_string(), other);
            map
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Metadata;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve one request with `response` as a JSON body and hand back the
    /// request line, headers and body as text.
    fn serve_once(response: Value) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}/api/", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut head = String::new();
            let mut content_length = 0;
            let mut chunked = false;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                    if name.eq_ignore_ascii_case("transfer-encoding") {
                        chunked = value.trim().eq_ignore_ascii_case("chunked");
                    }
                }
                head.push_str(&line);
            }

            let mut body = vec![0; content_length];
            reader.read_exact(&mut body).unwrap();
            while chunked {
                let mut size = String::new();
                reader.read_line(&mut size).unwrap();
                let size = usize::from_str_radix(size.trim(), 16).unwrap();
                let mut chunk = vec![0; size + 2];
                reader.read_exact(&mut chunk).unwrap();
                body.extend_from_slice(&chunk[..size]);
                chunked = size > 0;
            }

            let payload = response.to_string();
            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                payload.len(),
                payload
            )
            .unwrap();
            stream.flush().unwrap();

            head + "\r\n" + &String::from_utf8(body).unwrap()
        });

        (base, handle)
    }

    #[test]
    fn endpoints_join_without_double_slash() {
        let repo =
            HttpRepository::new("https://repo.example.org/api/", None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            repo.endpoint(&["publish", "dataset"]),
            "https://repo.example.org/api/publish/dataset"
        );
    }

    #[test]
    fn source_id_is_encoded_as_a_path_segment() {
        let repo = HttpRepository::new("https://repo.example.org/api", None, DEFAULT_TIMEOUT).unwrap();
        assert_eq!(
            repo.endpoint(&["status", "my set/v1 1"]),
            "https://repo.example.org/api/status/my%20set%2Fv1%201"
        );
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        for base in ["repo.example.org", "mailto:ops@example.org"] {
            assert!(
                matches!(
                    HttpRepository::new(base, None, DEFAULT_TIMEOUT),
                    Err(PackError::Remote { .. })
                ),
                "accepted {base}"
            );
        }
    }

    #[test]
    fn non_object_responses_are_wrapped() {
        let result = into_result(json!("accepted"));
        assert_eq!(result["response"], "accepted");

        let result = into_result(json!({"source_id": "abc", "success": true}));
        assert_eq!(result["source_id"], "abc");
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn dataset_publish_posts_submission_with_token() {
        let (base, server) = serve_once(json!({"source_id": "_test_v1.1", "success": true}));
        let mut repo =
            HttpRepository::new(&base, Some("secret".to_string()), DEFAULT_TIMEOUT).unwrap();

        let submission = DatasetSubmission {
            metadata: Metadata {
                inputs: vec!["Temp (K)".to_string()],
                input_units: vec!["K".to_string()],
                outputs: None,
                output_units: None,
            },
            source_url: "https://files.example.org/stage/1.json".to_string(),
            title: "Yield study".to_string(),
            authors: vec!["Ada Lovelace".to_string()],
            update: false,
        };
        let result = repo.publish_dataset(&submission).unwrap();
        assert_eq!(result["source_id"], "_test_v1.1");

        let request = server.join().unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        assert!(head.starts_with("POST /api/publish/dataset HTTP/1.1"), "{head}");
        assert!(
            head.lines()
                .any(|line| line.eq_ignore_ascii_case("authorization: Bearer secret")),
            "{head}"
        );

        let sent: DatasetSubmission = serde_json::from_str(body).unwrap();
        assert_eq!(sent, submission);
    }

    #[test]
    fn status_check_gets_encoded_source_id() {
        let (base, server) = serve_once(json!("pending"));
        let mut repo = HttpRepository::new(&base, None, DEFAULT_TIMEOUT).unwrap();

        let result = repo.check_status("my set").unwrap();
        assert_eq!(result["response"], "pending");

        let request = server.join().unwrap();
        assert!(request.starts_with("GET /api/status/my%20set HTTP/1.1"), "{request}");
    }
}
