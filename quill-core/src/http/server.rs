//! Async HTTP/1.1 transport using hyper
//!
//! Accepts connections on a tokio listener, serves each one on its own task,
//! and hands every request to [`App::handle`]. The app is shared read-only
//! between tasks.
//!
//! # Example
//!
//! ```no_run
//! use quill_core::app::App;
//! use quill_core::http::Server;
//!
//! # async fn example() -> quill_core::Result<()> {
//! let app = App::new();
//! let server = Server::new(app).with_addr("127.0.0.1:3000".parse().unwrap()).bind().await?;
//! println!("listening on {}", server.local_addr()?);
//! server.run().await
//! # }
//! ```

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{body::Incoming, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;

use super::{HttpResponse, ParseError, ParseResult, RawRequest, Status};
use crate::app::App;
use crate::logging;

/// Server builder; [`Server::bind`] opens the listener
pub struct Server {
    app: Arc<App>,
    addr: Option<SocketAddr>,
}

impl Server {
    /// Serve `app`, freezing it first
    pub fn new(app: App) -> Self {
        Self::from_shared(app.into_shared())
    }

    pub fn from_shared(app: Arc<App>) -> Self {
        Self { app, addr: None }
    }

    /// Listen on `addr` instead of the configured host and port
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = Some(addr);
        self
    }

    /// Open the listener
    ///
    /// Installs the configured logger unless the process already has one.
    pub async fn bind(self) -> crate::Result<BoundServer> {
        if let Err(err) = logging::init_logging(&self.app.config().logging) {
            log::debug!("Keeping existing logger: {}", err);
        }

        let addr = match self.addr {
            Some(addr) => addr,
            None => self.app.config().server.socket_addr()?,
        };
        let listener = TcpListener::bind(addr).await?;
        log::info!("Listening on http://{}", listener.local_addr()?);

        let max_body_size = self.app.config().server.max_body_size;
        Ok(BoundServer { listener, app: self.app, max_body_size })
    }

    /// Bind and serve until the process stops
    pub async fn run(self) -> crate::Result<()> {
        self.bind().await?.run().await
    }
}

/// A server with an open listener
pub struct BoundServer {
    listener: TcpListener,
    app: Arc<App>,
    max_body_size: usize,
}

impl BoundServer {
    pub fn local_addr(&self) -> crate::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> crate::Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves
    ///
    /// Connections already accepted keep running on their own tasks.
    pub async fn run_until<F>(self, shutdown: F) -> crate::Result<()>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("Server shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, remote) = match accepted {
                        Ok(conn) => conn,
                        Err(err) => {
                            log::warn!("Failed to accept connection: {}", err);
                            continue;
                        }
                    };
                    self.spawn_connection(stream, remote);
                }
            }
        }
    }

    fn spawn_connection(&self, stream: tokio::net::TcpStream, remote: SocketAddr) {
        let app = Arc::clone(&self.app);
        let limit = self.max_body_size;

        tokio::task::spawn(async move {
            let service = service_fn(move |req| {
                let app = Arc::clone(&app);
                async move { Ok::<_, Infallible>(serve(app, req, remote, limit).await) }
            });

            if let Err(err) = http1::Builder::new().serve_connection(TokioIo::new(stream), service).await {
                log::debug!("Error serving connection from {}: {}", remote, err);
            }
        });
    }
}

async fn serve(app: Arc<App>, req: Request<Incoming>, remote: SocketAddr, limit: usize) -> Response<Full<Bytes>> {
    let raw = match convert_request(req, remote, limit).await {
        Ok(raw) => raw,
        Err(ParseError::BodyTooLarge(limit)) => {
            log::warn!("Rejected body from {} over {} bytes", remote, limit);
            return plain(Status::PAYLOAD_TOO_LARGE);
        }
        Err(err) => {
            log::warn!("Rejected request from {}: {}", remote, err);
            return plain(Status::BAD_REQUEST);
        }
    };

    convert_response(app.handle(raw))
}

/// Convert a hyper request into the framework's raw request source
async fn convert_request(req: Request<Incoming>, remote: SocketAddr, limit: usize) -> ParseResult<RawRequest> {
    let (parts, body) = req.into_parts();

    let body = Limited::new(body, limit)
        .collect()
        .await
        .map_err(|err| {
            if err.downcast_ref::<LengthLimitError>().is_some() {
                ParseError::BodyTooLarge(limit)
            } else {
                ParseError::InvalidRequest(err.to_string())
            }
        })?
        .to_bytes();

    let target = parts.uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let mut raw = RawRequest::new(parts.method.as_str(), target)
        .with_remote_addr(remote)
        .with_body(body.to_vec());

    for (name, value) in parts.headers.iter() {
        match value.to_str() {
            Ok(value) => raw.headers.append(name.as_str(), value),
            Err(_) => log::debug!("Dropping non-ASCII header {}", name),
        }
    }

    Ok(raw)
}

/// Convert a handled response into a hyper response, keeping repeated headers
fn convert_response(mut response: HttpResponse) -> Response<Full<Bytes>> {
    response.finalize();

    let mut builder = Response::builder().status(response.status().code());
    for (name, value) in response.header_lines() {
        builder = builder.header(name, value);
    }

    let body = Bytes::from(response.body_bytes().into_owned());
    builder.body(Full::new(body)).unwrap_or_else(|err| {
        log::error!("Invalid response could not be sent: {}", err);
        plain(Status::INTERNAL_SERVER_ERROR)
    })
}

fn plain(status: Status) -> Response<Full<Bytes>> {
    let mut response = Response::new(Full::new(Bytes::from(status.to_string())));
    *response.status_mut() = StatusCode::from_u16(status.code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    response
}
