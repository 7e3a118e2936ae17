//! HTTP request routing.
//!
//! Maps a request target onto a controller operation and builds the reply.
//! Transport-agnostic: the ESP-IDF HTTP server hands the URI over through
//! [`super::channels`], tests call [`RequestHandler::handle`] directly.
//!
//! | Path       | Action                        | Reply                     |
//! |------------|-------------------------------|---------------------------|
//! | `/up`      | raise `blinds` (default all)  | 200 `OK` / 400            |
//! | `/down`    | lower `blinds` (default all)  | 200 `OK` / 400            |
//! | `/stop`    | stop `blinds` (default all)   | 200 `OK` / 400            |
//! | `/version` | -                             | 200 `<hostname> <version>`|
//! | `/status`  | -                             | 200 JSON relay state      |
//! | other      | -                             | 404                       |

use heapless::Vec;
use log::{info, warn};
use serde::Serialize;

use crate::app::commands::AppCommand;
use crate::app::ports::{EventSink, RelayOutputPort};
use crate::app::service::ChannelController;
use crate::channel::{ChannelSet, Direction, MAX_CHANNELS};
use crate::config::SystemConfig;
use crate::selector;

use super::query;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";

/// Query parameter naming the channels a command applies to.
pub const SELECTOR_PARAM: &str = "blinds";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Drive(Direction),
    Stop,
    Version,
    Status,
    NotFound,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path {
            "/up" => Self::Drive(Direction::Raise),
            "/down" => Self::Drive(Direction::Lower),
            "/stop" => Self::Stop,
            "/version" => Self::Version,
            "/status" => Self::Status,
            _ => Self::NotFound,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    pub fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            content_type: TEXT_PLAIN,
            body: body.into(),
        }
    }

    pub fn ok() -> Self {
        Self::text(200, "OK")
    }

    pub fn malformed_mask() -> Self {
        Self::text(400, "Malformed mask")
    }

    pub fn not_found() -> Self {
        Self::text(404, "Not found")
    }

    /// Reply when the control loop could not take the request.
    pub fn unavailable() -> Self {
        Self::text(503, "Busy")
    }
}

/// Body of `/status`.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub raising: Vec<u8, { MAX_CHANNELS as usize }>,
    pub lowering: Vec<u8, { MAX_CHANNELS as usize }>,
    pub pending_stops: usize,
}

impl StatusReport {
    pub fn capture(controller: &ChannelController) -> Self {
        let state = controller.state();
        Self {
            raising: numbers(state.raising),
            lowering: numbers(state.lowering),
            pending_stops: controller.scheduler().len(),
        }
    }
}

fn numbers(set: ChannelSet) -> Vec<u8, { MAX_CHANNELS as usize }> {
    set.iter().map(|c| c.number()).collect()
}

pub struct RequestHandler {
    hostname: heapless::String<24>,
}

impl RequestHandler {
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            hostname: config.hostname.clone(),
        }
    }

    /// Serve one request against the controller.
    pub fn handle(
        &self,
        uri: &str,
        controller: &mut ChannelController,
        out: &mut impl RelayOutputPort,
        sink: &mut impl EventSink,
        now_ms: u64,
    ) -> Response {
        let (path, query) = query::split_target(uri);

        let command = match Route::from_path(path) {
            Route::Drive(direction) => match Self::selected(query, controller) {
                Some(mask) => AppCommand::drive(direction, mask),
                None => return Response::malformed_mask(),
            },
            Route::Stop => match Self::selected(query, controller) {
                Some(mask) => AppCommand::Stop(mask),
                None => return Response::malformed_mask(),
            },
            Route::Version => return self.version(),
            Route::Status => return Self::status(controller),
            Route::NotFound => {
                warn!("HTTP: no route for '{}'", path);
                return Response::not_found();
            }
        };

        info!("HTTP: {} -> {:?} [{}]", path, command, command.mask());
        controller.handle_command(command, now_ms, out, sink);
        Response::ok()
    }

    /// Channels named by the `blinds` parameter, or every configured channel
    /// when it is absent.  `None` when the selector does not parse.
    fn selected(query: &str, controller: &ChannelController) -> Option<ChannelSet> {
        match query::param(query, SELECTOR_PARAM) {
            None => Some(controller.all_channels()),
            Some(Ok(text)) => selector::parse(&text, controller.channel_count()).ok(),
            Some(Err(())) => {
                warn!("HTTP: undecodable '{}' parameter", SELECTOR_PARAM);
                None
            }
        }
    }

    fn version(&self) -> Response {
        let body = format!("{} {}", self.hostname, env!("CARGO_PKG_VERSION"));
        Response::text(200, &body)
    }

    fn status(controller: &ChannelController) -> Response {
        match serde_json::to_string(&StatusReport::capture(controller)) {
            Ok(body) => Response {
                status: 200,
                content_type: APPLICATION_JSON,
                body,
            },
            Err(e) => {
                warn!("HTTP: status report not serialised: {}", e);
                Response::text(500, "Internal error")
            }
        }
    }
}
