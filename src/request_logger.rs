use rocket::fairing::{Fairing, Info, Kind};
use rocket::{Data, Request, Response};
use std::time::Instant;

/// Fairing emitting one log line per HTTP request with status and latency.
pub struct RequestLogger;

struct RequestStart(Instant);

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        request.local_cache(|| RequestStart(Instant::now()));
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let uri = request.uri().path().as_str();
        // The generated API docs are chatty and uninteresting.
        if uri.starts_with("/api/docs") {
            return;
        }

        let RequestStart(started) = request.local_cache(|| RequestStart(Instant::now()));
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

        log::info!(
            "{} {} -> {} ({:.2}ms)",
            request.method(),
            uri,
            response.status().code,
            elapsed_ms
        );
    }
}
