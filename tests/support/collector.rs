use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto::Builder;
use prost::Message;
use remote_write_sender::proto::prometheus::WriteRequest;
use tokio::net::TcpListener;
use url::Url;

/// A remote-write request as seen by the collector.
#[derive(Debug, Clone)]
pub struct Received {
    pub path: String,
    pub headers: HashMap<String, String>,
    pub request: WriteRequest,
}

/// How the collector answers each request.
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Accept,
    /// Answer the n-th request (1-based) with the given status, accept the rest.
    FailOn(usize, StatusCode),
    /// Hold every response back for this long.
    Delay(Duration),
    /// Answer every request with the given status and [`verbose_reply`] as body.
    RejectVerbose(StatusCode),
}

/// 1500 multi-byte characters, with a `#` marker every 100.
pub fn verbose_reply() -> String {
    ['é', 'ü', 'ß', '日', 'ø']
        .iter()
        .cycle()
        .take(1500)
        .enumerate()
        .map(|(i, c)| if i % 100 == 0 { '#' } else { *c })
        .collect()
}

struct State {
    behavior: Behavior,
    requests: AtomicUsize,
    received: Mutex<Vec<Received>>,
}

pub struct Collector {
    pub url: Url,
    state: Arc<State>,
}

impl Collector {
    pub async fn start(behavior: Behavior) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind collector listener");
        let port = listener.local_addr().unwrap().port();

        let state = Arc::new(State {
            behavior,
            requests: AtomicUsize::new(0),
            received: Mutex::new(Vec::new()),
        });

        let server_state = Arc::clone(&state);
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener
                    .accept()
                    .await
                    .expect("failed to accept connection");
                let state = Arc::clone(&server_state);
                tokio::spawn(async move {
                    let service = service_fn(move |req| handle(req, Arc::clone(&state)));
                    let _ = Builder::new(TokioExecutor::new())
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            url: Url::parse(&format!("http://127.0.0.1:{port}/api/v1/write")).unwrap(),
            state,
        }
    }

    /// Number of requests that reached the collector, accepted or not.
    pub fn request_count(&self) -> usize {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Requests that were answered with a 2xx.
    pub fn accepted(&self) -> Vec<Received> {
        self.state.received.lock().unwrap().clone()
    }
}

async fn handle<B>(req: Request<B>, state: Arc<State>) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: hyper::body::Body<Data = Bytes> + Send + 'static,
{
    if req.method() != Method::POST {
        return Ok(response(StatusCode::METHOD_NOT_ALLOWED, ""));
    }

    let call = state.requests.fetch_add(1, Ordering::SeqCst) + 1;
    let path = req.uri().path().to_owned();
    let headers = req
        .headers()
        .iter()
        .filter_map(|(k, v)| Some((k.as_str().to_owned(), v.to_str().ok()?.to_owned())))
        .collect();

    let body = req
        .collect()
        .await
        .map(|c| c.to_bytes())
        .unwrap_or_default();

    match state.behavior {
        Behavior::FailOn(n, status) if n == call => {
            return Ok(response(status, "out of order sample"));
        }
        Behavior::Delay(delay) => tokio::time::sleep(delay).await,
        Behavior::RejectVerbose(status) => return Ok(response(status, verbose_reply())),
        _ => {}
    }

    let request = match snap::raw::Decoder::new()
        .decompress_vec(&body)
        .ok()
        .and_then(|raw| WriteRequest::decode(raw.as_slice()).ok())
    {
        Some(r) => r,
        None => return Ok(response(StatusCode::BAD_REQUEST, "undecodable body")),
    };

    state.received.lock().unwrap().push(Received {
        path,
        headers,
        request,
    });

    Ok(response(StatusCode::NO_CONTENT, ""))
}

fn response(status: StatusCode, body: impl Into<Bytes>) -> Response<Full<Bytes>> {
    Response::builder()
        .status(status)
        .body(Full::new(body.into()))
        .unwrap()
}
