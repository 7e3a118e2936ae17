//! Request bridge between the HTTP server task and the control loop.
//!
//! The HTTP server calls its handlers on its own task, while relay state is
//! owned by the single-threaded control loop.  Handlers therefore only
//! forward the request target and wait for the reply; the loop drains the
//! queue once per iteration.
//!
//! ```text
//! ┌──────────────┐  RequestMsg   ┌──────────────┐
//! │  HTTP task   │─────────────▶│ Control Loop │
//! │  (blocking)  │◀─────────────│  (sync)      │
//! └──────────────┘  ResponseMsg  └──────────────┘
//! ```

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use log::warn;

use crate::app::ports::{EventSink, RelayOutputPort};
use crate::app::service::ChannelController;
use crate::error::CommsError;

use super::router::{RequestHandler, Response};

/// Longest request target forwarded to the control loop.
pub const MAX_URI_LEN: usize = 128;

/// Inbound request, delivered to the control loop.
pub struct RequestMsg {
    /// Matches the reply to the waiting handler.
    pub id: u32,
    pub uri: heapless::String<MAX_URI_LEN>,
}

/// Reply from the control loop, delivered to the HTTP task.
pub struct ResponseMsg {
    pub id: u32,
    pub response: Response,
}

const REQUEST_DEPTH: usize = 4;
const RESPONSE_DEPTH: usize = 4;

/// HTTP task → control loop.
pub static REQUEST_CHANNEL: Channel<CriticalSectionRawMutex, RequestMsg, REQUEST_DEPTH> =
    Channel::new();

/// Control loop → HTTP task.
pub static RESPONSE_CHANNEL: Channel<CriticalSectionRawMutex, ResponseMsg, RESPONSE_DEPTH> =
    Channel::new();

static NEXT_ID: AtomicU32 = AtomicU32::new(1);

/// Queue `uri` for the control loop without waiting.  Returns the request id.
pub fn submit(uri: &str) -> Result<u32, CommsError> {
    let mut target = heapless::String::new();
    if target.push_str(uri).is_err() {
        warn!("HTTP: request target too long ({} bytes)", uri.len());
        return Err(CommsError::RequestTooLong);
    }

    let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    REQUEST_CHANNEL
        .try_send(RequestMsg { id, uri: target })
        .map_err(|_| {
            warn!("HTTP: request queue full, dropping '{}'", uri);
            CommsError::RequestQueueFull
        })?;
    Ok(id)
}

/// Block the calling task until the reply for `id` arrives.
///
/// Assumes a single waiter: the ESP-IDF httpd runs every handler on one
/// task, so at most one request is in flight.  A reply for another id is
/// stale (its waiter is gone) and is dropped, never redelivered.
pub fn wait_response(id: u32) -> Response {
    futures_lite::future::block_on(async {
        loop {
            let msg = RESPONSE_CHANNEL.receive().await;
            if msg.id == id {
                return msg.response;
            }
            warn!("HTTP: discarding reply {} (waiting for {})", msg.id, id);
        }
    })
}

/// Forward one request and wait for its reply.  Called from HTTP handlers.
pub fn forward(uri: &str) -> Response {
    match submit(uri) {
        Ok(id) => wait_response(id),
        Err(CommsError::RequestTooLong) => Response::text(414, "URI too long"),
        Err(_) => Response::unavailable(),
    }
}

/// Serve every queued request.  Called from the control loop; returns the
/// number of requests handled.
pub fn serve_pending(
    handler: &RequestHandler,
    controller: &mut ChannelController,
    out: &mut impl RelayOutputPort,
    sink: &mut impl EventSink,
    now_ms: u64,
) -> usize {
    let mut served = 0;
    while let Ok(req) = REQUEST_CHANNEL.try_receive() {
        let response = handler.handle(&req.uri, controller, out, sink, now_ms);
        if RESPONSE_CHANNEL
            .try_send(ResponseMsg {
                id: req.id,
                response,
            })
            .is_err()
        {
            warn!("HTTP: response queue full, reply {} lost", req.id);
        }
        served += 1;
    }
    served
}
