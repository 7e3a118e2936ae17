//! ESP-IDF HTTP server adapter.
//!
//! Registers one GET handler per route.  Handlers run on the server's own
//! task and never touch relay state: they forward the request target to the
//! control loop through [`crate::api::channels`] and write back whatever
//! reply comes out of the [`RequestHandler`](crate::api::router::RequestHandler).

use anyhow::Result;
use esp_idf_svc::http::Method;
use esp_idf_svc::http::server::{Configuration, EspHttpServer};
use esp_idf_svc::io::Write;
use log::info;

use crate::api::channels;

/// Paths served; anything else gets the server's own 404.
pub const ROUTES: [&str; 5] = ["/up", "/down", "/stop", "/version", "/status"];

pub struct HttpServer {
    // Dropping the server stops it.
    _server: EspHttpServer<'static>,
}

impl HttpServer {
    pub fn start(port: u16) -> Result<Self> {
        let config = Configuration {
            http_port: port,
            ..Default::default()
        };
        let mut server = EspHttpServer::new(&config)?;

        for route in ROUTES {
            server.fn_handler(route, Method::Get, |req| -> Result<()> {
                let response = channels::forward(req.uri());
                let mut resp = req.into_response(
                    response.status,
                    None,
                    &[("Content-Type", response.content_type)],
                )?;
                resp.write_all(response.body.as_bytes())?;
                Ok(())
            })?;
        }

        info!("HTTP: listening on port {} ({} routes)", port, ROUTES.len());
        Ok(Self { _server: server })
    }
}
