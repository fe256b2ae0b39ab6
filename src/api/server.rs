// Minimal HTTP/1.1 front for the router
//
// One request per connection, JSON in and out, `Connection: close`.
// Good enough for the storefront demo and for poking at with curl.

use crate::api::{ApiRequest, ApiResponse, Router};
use crate::error::{Result, TryOnError};
use std::collections::HashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

const MAX_REQUEST_BYTES: usize = 64 * 1024;
const READ_TIMEOUT: Duration = Duration::from_secs(5);

pub struct ApiServer {
    listener: TcpListener,
    router: Router,
}

impl ApiServer {
    pub async fn bind(addr: &str, router: Router) -> Result<Self> {
        let addr: SocketAddr = addr
            .parse()
            .map_err(|_| TryOnError::Config(format!("'{}' is not host:port", addr)))?;
        let listener = TcpListener::bind(addr).await?;
        Ok(Self { listener, router })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until the process exits
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Serve until `shutdown` resolves. Requests already accepted finish on their own.
    pub async fn run_until(self, shutdown: impl Future<Output = ()>) -> Result<()> {
        log::info!("api listening on http://{}", self.local_addr()?);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    log::info!("api shutting down");
                    return Ok(());
                }
                accepted = self.listener.accept() => {
                    let (stream, peer) = accepted?;
                    let router = self.router.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &router).await {
                            log::warn!("request from {} dropped: {}", peer, e);
                        }
                    });
                }
            }
        }
    }
}

async fn handle_connection(mut stream: TcpStream, router: &Router) -> Result<()> {
    let request = match tokio::time::timeout(READ_TIMEOUT, read_request(&mut stream)).await {
        Ok(Ok(request)) => request,
        Ok(Err(e)) => {
            let response = ApiResponse::failure(400, "Bad request");
            write_response(&mut stream, &response).await?;
            return Err(e);
        }
        Err(_) => return Err(TryOnError::InvalidRequest("read timed out".to_string())),
    };

    let response = router.handle(&request).await;
    write_response(&mut stream, &response).await
}

async fn read_request(stream: &mut TcpStream) -> Result<ApiRequest> {
    let mut buf = [0u8; 4096];
    let mut data = Vec::new();

    let header_end = loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Err(TryOnError::InvalidRequest(
                "connection closed mid-request".to_string(),
            ));
        }
        data.extend_from_slice(&buf[..n]);
        if data.len() > MAX_REQUEST_BYTES {
            return Err(TryOnError::InvalidRequest("request too large".to_string()));
        }
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines
        .next()
        .ok_or_else(|| TryOnError::InvalidRequest("empty request".to_string()))?;
    let mut parts = request_line.split_whitespace();
    let method = parts
        .next()
        .ok_or_else(|| TryOnError::InvalidRequest("missing method".to_string()))?;
    let target = parts
        .next()
        .ok_or_else(|| TryOnError::InvalidRequest("missing path".to_string()))?;

    let mut headers = HashMap::new();
    for line in lines {
        if let Some((k, v)) = line.split_once(':') {
            headers.insert(k.trim().to_lowercase(), v.trim().to_string());
        }
    }

    let content_length = match headers.get("content-length") {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| TryOnError::InvalidRequest("bad content-length".to_string()))?,
        None => 0,
    };
    if header_end + 4 + content_length > MAX_REQUEST_BYTES {
        return Err(TryOnError::InvalidRequest("request too large".to_string()));
    }

    let mut body = data.split_off(header_end + 4);
    while body.len() < content_length {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            return Err(TryOnError::InvalidRequest(
                "connection closed mid-body".to_string(),
            ));
        }
        body.extend_from_slice(&buf[..n]);
    }
    body.truncate(content_length);

    let body = if body.is_empty() {
        None
    } else {
        Some(String::from_utf8_lossy(&body).into_owned())
    };

    Ok(ApiRequest::new(method, target, body))
}

async fn write_response(stream: &mut TcpStream, response: &ApiResponse) -> Result<()> {
    let status_line = match response.status {
        200 => "HTTP/1.1 200 OK",
        400 => "HTTP/1.1 400 Bad Request",
        404 => "HTTP/1.1 404 Not Found",
        405 => "HTTP/1.1 405 Method Not Allowed",
        _ => "HTTP/1.1 500 Internal Server Error",
    };
    let body = serde_json::to_vec(&response.body)?;
    let header = format!(
        "{}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nCache-Control: no-store\r\nConnection: close\r\n\r\n",
        status_line,
        body.len()
    );

    stream.write_all(header.as_bytes()).await?;
    stream.write_all(&body).await?;
    stream.shutdown().await?;
    Ok(())
}
