//! Device list client
//!
//! `SensorClient` is the seam between the poll pipeline and the network.
//! `HttpSensorClient` talks to the cloud API; `FakeSensorClient` hands out
//! canned responses in tests.

use crate::config::PollerConfig;
use crate::device::{parse_devices, Device};
use crate::error::PollerError;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

/// Source of device lists
pub trait SensorClient {
    /// Fetch every device visible to the configured token
    fn fetch_devices(&self) -> Result<Vec<Device>, PollerError>;
}

/// Blocking HTTP client for the device list endpoint
pub struct HttpSensorClient {
    endpoint: String,
    api_token: String,
    timeout_secs: u64,
    client: reqwest::blocking::Client,
}

impl HttpSensorClient {
    pub fn new(config: &PollerConfig) -> Result<Self, PollerError> {
        let timeout_secs = config.effective_timeout_secs();
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .user_agent(concat!("remoctl/", env!("CARGO_PKG_VERSION")));
        // A local endpoint (mock hub, tests) must never go through $HTTP_PROXY
        if is_loopback(&config.endpoint) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| PollerError::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_token: config.api_token.clone(),
            timeout_secs,
            client,
        })
    }
}

fn is_loopback(endpoint: &str) -> bool {
    reqwest::Url::parse(endpoint)
        .ok()
        .and_then(|url| url.host_str().map(str::to_string))
        .map(|host| {
            host == "localhost"
                || host
                    .parse::<std::net::IpAddr>()
                    .map(|ip| ip.is_loopback())
                    .unwrap_or(false)
        })
        .unwrap_or(false)
}

impl SensorClient for HttpSensorClient {
    fn fetch_devices(&self) -> Result<Vec<Device>, PollerError> {
        info!("Fetching devices from {}", self.endpoint);

        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.api_token)
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    PollerError::Timeout(self.timeout_secs)
                } else {
                    PollerError::Http(format!("Request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollerError::Http(format!("HTTP {} from {}", status, self.endpoint)));
        }

        let body = response
            .text()
            .map_err(|e| PollerError::Http(format!("Failed to read response: {}", e)))?;
        debug!("Received {} bytes", body.len());

        let devices = parse_devices(&body)?;
        info!("Found {} device(s)", devices.len());
        Ok(devices)
    }
}

/// Fake client for testing
pub struct FakeSensorClient {
    responses: Mutex<Vec<Result<String, PollerError>>>,
    call_count: Mutex<usize>,
}

impl FakeSensorClient {
    /// Responses are response bodies (decoded like real ones) or errors,
    /// handed out in order. The last one repeats.
    pub fn new(responses: Vec<Result<String, PollerError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            call_count: Mutex::new(0),
        }
    }

    /// Always answer with this body
    pub fn with_body(body: impl Into<String>) -> Self {
        Self::new(vec![Ok(body.into())])
    }

    /// Always fail with this error
    pub fn always_error(error: PollerError) -> Self {
        Self::new(vec![Err(error)])
    }

    pub fn call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl SensorClient for FakeSensorClient {
    fn fetch_devices(&self) -> Result<Vec<Device>, PollerError> {
        *self.call_count.lock().unwrap() += 1;

        let mut responses = self.responses.lock().unwrap();
        let next = match responses.len() {
            0 => return Err(PollerError::Http("No canned response".to_string())),
            1 => match &responses[0] {
                Ok(body) => Ok(body.clone()),
                Err(e) => Err(clone_error(e)),
            },
            _ => responses.remove(0),
        };
        parse_devices(&next?)
    }
}

// io::Error isn't Clone, so the fake rebuilds errors by hand
fn clone_error(e: &PollerError) -> PollerError {
    match e {
        PollerError::Config(m) => PollerError::Config(m.clone()),
        PollerError::Http(m) => PollerError::Http(m.clone()),
        PollerError::Timeout(s) => PollerError::Timeout(*s),
        PollerError::Decode(m) => PollerError::Decode(m.clone()),
        PollerError::NoDevices => PollerError::NoDevices,
        PollerError::DeviceNotFound(m) => PollerError::DeviceNotFound(m.clone()),
        PollerError::Io(io) => PollerError::Io(std::io::Error::new(io.kind(), io.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BODY: &str = r#"[{"id":"d1","name":"Hall"}]"#;

    #[test]
    fn test_fake_client_with_body() {
        let client = FakeSensorClient::with_body(BODY);

        let devices = client.fetch_devices().unwrap();
        assert_eq!(devices[0].name, "Hall");
        assert_eq!(client.call_count(), 1);

        // Same body again
        assert!(client.fetch_devices().is_ok());
        assert_eq!(client.call_count(), 2);
    }

    #[test]
    fn test_fake_client_always_error() {
        let client = FakeSensorClient::always_error(PollerError::Timeout(10));
        assert!(matches!(client.fetch_devices(), Err(PollerError::Timeout(10))));
        assert!(matches!(client.fetch_devices(), Err(PollerError::Timeout(10))));
        assert_eq!(client.call_count(), 2);
    }

    #[test]
    fn test_fake_client_sequence() {
        let client = FakeSensorClient::new(vec![
            Err(PollerError::Http("HTTP 503".to_string())),
            Ok("not json".to_string()),
            Ok(BODY.to_string()),
        ]);

        assert!(matches!(client.fetch_devices(), Err(PollerError::Http(_))));
        assert!(matches!(client.fetch_devices(), Err(PollerError::Decode(_))));
        assert_eq!(client.fetch_devices().unwrap().len(), 1);
        assert_eq!(client.call_count(), 3);
    }

    #[test]
    fn test_fake_client_empty() {
        let client = FakeSensorClient::new(vec![]);
        assert!(client.fetch_devices().is_err());
    }

    #[test]
    fn test_http_client_builds_from_config() {
        let config = PollerConfig::from_env_with(|key| {
            (key == "REMO_API_KEY").then(|| "token".to_string())
        })
        .unwrap();
        assert!(HttpSensorClient::new(&config).is_ok());
    }

    #[test]
    fn test_is_loopback() {
        assert!(is_loopback("http://127.0.0.1:8080/1/devices"));
        assert!(is_loopback("http://localhost/1/devices"));
        assert!(!is_loopback("https://api.nature.global/1/devices"));
        assert!(!is_loopback("not a url"));
    }

    // One-shot HTTP server on loopback. Sends the raw request head back
    // through the channel, then answers with `response` (or holds the
    // connection open without answering when `response` is None).
    fn serve_once(response: Option<String>) -> (String, std::sync::mpsc::Receiver<String>) {
        use std::io::{Read, Write};
        use std::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = std::sync::mpsc::channel();

        std::thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut head: Vec<u8> = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&head).into_owned());

            match response {
                Some(resp) => {
                    let _ = stream.write_all(resp.as_bytes());
                    let _ = stream.flush();
                }
                None => std::thread::sleep(Duration::from_secs(3)),
            }
        });

        (format!("http://{}/1/devices", addr), rx)
    }

    fn http_response(status: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
    }

    fn client_for(endpoint: String, timeout_secs: u64) -> HttpSensorClient {
        let mut config = PollerConfig::from_env_with(|key| {
            (key == "REMO_API_KEY").then(|| "s3cret-token".to_string())
        })
        .unwrap();
        config.endpoint = endpoint;
        config.timeout_secs = timeout_secs;
        HttpSensorClient::new(&config).unwrap()
    }

    #[test]
    fn test_http_sends_bearer_token_and_decodes() {
        let (endpoint, rx) = serve_once(Some(http_response("200 OK", BODY)));
        let client = client_for(endpoint, 5);

        let devices = client.fetch_devices().unwrap();
        assert_eq!(devices.len(), 1);
        assert_eq!(devices[0].name, "Hall");

        let head = rx.recv().unwrap().to_lowercase();
        assert!(head.starts_with("get /1/devices "));
        assert!(head.contains("authorization: bearer s3cret-token\r\n"));
    }

    #[test]
    fn test_http_error_status_carries_code() {
        let (endpoint, _rx) = serve_once(Some(http_response(
            "401 Unauthorized",
            r#"{"code":401001,"message":"Unauthorized"}"#,
        )));
        let client = client_for(endpoint, 5);

        match client.fetch_devices() {
            Err(PollerError::Http(msg)) => assert!(msg.contains("401"), "{}", msg),
            other => panic!("expected Http error, got {:?}", other),
        }
    }

    #[test]
    fn test_http_non_array_body_is_decode_error() {
        let (endpoint, _rx) = serve_once(Some(http_response("200 OK", r#"{"devices":[]}"#)));
        let client = client_for(endpoint, 5);

        assert!(matches!(client.fetch_devices(), Err(PollerError::Decode(_))));
    }

    #[test]
    fn test_http_silent_server_times_out() {
        let (endpoint, _rx) = serve_once(None);
        let client = client_for(endpoint, 1);

        assert!(matches!(client.fetch_devices(), Err(PollerError::Timeout(1))));
    }
}
