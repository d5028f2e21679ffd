use crate::error::Result;
use molbench::engine::inference::{
    InferenceClient, InferenceError, Iteration, Pooling, Readiness,
};
use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, trace};

#[derive(Deserialize)]
struct IterationResponse {
    iteration: u64,
}

#[derive(Serialize)]
struct SimilarsRequest<'a> {
    smiles: &'a str,
    num_requested: usize,
    radius: f64,
    force_unique: bool,
    sanitize: bool,
}

#[derive(Deserialize)]
struct SimilarsResponse {
    generated: Vec<String>,
}

#[derive(Serialize)]
struct EmbeddingsRequest<'a> {
    smiles: &'a [String],
    pooling: Pooling,
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    embeddings: Vec<Vec<f32>>,
}

/// JSON-over-HTTP client for the model inference service.
pub struct HttpInferenceClient {
    client: Client,
    base_url: String,
}

impl HttpInferenceClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn decode<T: DeserializeOwned>(
        endpoint: &str,
        response: reqwest::Result<Response>,
    ) -> std::result::Result<T, InferenceError> {
        let response = response
            .and_then(Response::error_for_status)
            .map_err(|e| map_error(endpoint, e))?;
        response.json::<T>().map_err(|e| map_error(endpoint, e))
    }
}

fn map_error(endpoint: &str, err: reqwest::Error) -> InferenceError {
    if let Some(status) = err.status() {
        InferenceError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
        }
    } else if err.is_decode() {
        InferenceError::Malformed {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        }
    } else {
        InferenceError::Request {
            endpoint: endpoint.to_string(),
            reason: err.to_string(),
        }
    }
}

impl InferenceClient for HttpInferenceClient {
    fn probe_iteration(&self) -> Readiness {
        let endpoint = self.endpoint("iteration");
        match Self::decode::<IterationResponse>(&endpoint, self.client.get(&endpoint).send()) {
            Ok(body) => Readiness::Ready(Iteration(body.iteration)),
            Err(e) => Readiness::Unavailable(e.to_string()),
        }
    }

    fn find_similars(
        &self,
        smiles: &str,
        num_requested: usize,
        radius: f64,
    ) -> std::result::Result<Vec<String>, InferenceError> {
        let endpoint = self.endpoint("similars");
        let request = SimilarsRequest {
            smiles,
            num_requested,
            radius,
            force_unique: false,
            sanitize: true,
        };
        trace!("POST {} for '{}' (n={}, radius={})", endpoint, smiles, num_requested, radius);
        let body: SimilarsResponse =
            Self::decode(&endpoint, self.client.post(&endpoint).json(&request).send())?;
        Ok(body.generated)
    }

    fn embed(
        &self,
        smiles: &[String],
        pooling: Pooling,
    ) -> std::result::Result<Vec<Vec<f32>>, InferenceError> {
        let endpoint = self.endpoint("embeddings");
        debug!("Requesting {:?} embeddings for {} molecules.", pooling, smiles.len());
        let request = EmbeddingsRequest { smiles, pooling };
        let body: EmbeddingsResponse =
            Self::decode(&endpoint, self.client.post(&endpoint).json(&request).send())?;
        Ok(body.embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::sync::mpsc::{self, Receiver};
    use std::thread;

    /// Serves exactly one HTTP response and hands the raw request back to the test.
    fn serve_once(status: &str, body: &str) -> (String, Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(header_end) = text.find("\r\n\r\n") {
                    let content_length = text[..header_end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())
                                .flatten()
                        })
                        .unwrap_or(0);
                    if raw.len() >= header_end + 4 + content_length {
                        break;
                    }
                }
            }
            stream.write_all(response.as_bytes()).unwrap();
            tx.send(String::from_utf8_lossy(&raw).into_owned()).unwrap();
        });

        (url, rx)
    }

    fn client(url: &str) -> HttpInferenceClient {
        HttpInferenceClient::new(url, Duration::from_secs(5)).unwrap()
    }

    fn request_body(raw: &str) -> serde_json::Value {
        let (_, body) = raw.split_once("\r\n\r\n").unwrap();
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn probe_reads_the_iteration() {
        let (url, rx) = serve_once("200 OK", r#"{"iteration": 42}"#);
        assert_eq!(client(&url).probe_iteration(), Readiness::Ready(Iteration(42)));
        assert!(rx.recv().unwrap().starts_with("GET /iteration"));
    }

    #[test]
    fn probe_reports_server_errors_as_unavailable() {
        let (url, _rx) = serve_once("503 Service Unavailable", "{}");
        assert!(matches!(client(&url).probe_iteration(), Readiness::Unavailable(_)));
    }

    #[test]
    fn probe_reports_refused_connections_as_unavailable() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);
        assert!(matches!(client(&url).probe_iteration(), Readiness::Unavailable(_)));
    }

    #[test]
    fn find_similars_sends_sampling_request() {
        let (url, rx) = serve_once("200 OK", r#"{"generated": ["CCO", "CCN"]}"#);
        let generated = client(&format!("{}/", url)).find_similars("CCC", 2, 1.0).unwrap();
        assert_eq!(generated, vec!["CCO".to_string(), "CCN".to_string()]);

        let raw = rx.recv().unwrap();
        assert!(raw.starts_with("POST /similars"));
        let body = request_body(&raw);
        assert_eq!(body["smiles"], "CCC");
        assert_eq!(body["num_requested"], 2);
        assert_eq!(body["radius"], 1.0);
        assert_eq!(body["force_unique"], false);
        assert_eq!(body["sanitize"], true);
    }

    #[test]
    fn embed_sends_pooling_mode() {
        let (url, rx) = serve_once("200 OK", r#"{"embeddings": [[0.5, 1.0], [2.0, 3.0]]}"#);
        let smiles = vec!["C".to_string(), "CC".to_string()];
        let embeddings = client(&url).embed(&smiles, Pooling::Flatten).unwrap();
        assert_eq!(embeddings, vec![vec![0.5, 1.0], vec![2.0, 3.0]]);

        let body = request_body(&rx.recv().unwrap());
        assert_eq!(body["pooling"], "flatten");
        assert_eq!(body["smiles"], serde_json::json!(["C", "CC"]));
    }

    #[test]
    fn http_status_and_bad_payloads_map_to_inference_errors() {
        let (url, _rx) = serve_once("500 Internal Server Error", "{}");
        let err = client(&url).find_similars("C", 1, 1.0).unwrap_err();
        assert!(matches!(err, InferenceError::Status { status: 500, .. }));

        let (url, _rx) = serve_once("200 OK", r#"{"vectors": []}"#);
        let err = client(&url).embed(&["C".to_string()], Pooling::Mean).unwrap_err();
        assert!(matches!(err, InferenceError::Malformed { .. }));
    }
}
