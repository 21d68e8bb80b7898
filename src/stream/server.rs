// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Context as _;
use futures::future::Future;
use http::header::CONTENT_TYPE;
use http::Response;
use hyper::Body;
use tracing::{debug, info, info_span};
use tracing_futures::Instrument;
use warp::{Filter, Rejection, Reply};

use std::net::SocketAddr;
use std::sync::Arc;

use super::mjpeg;
use super::session::{ClientSession, StreamContext};
use super::settings::StreamSettings;

/// A single route answering `GET` on any path with a fresh MJPEG stream.
pub(crate) fn routes(
    context: Arc<StreamContext>,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::get().map(move || {
        let session = ClientSession::accept(&context);
        debug!(client = session.id(), "starting MJPEG response");
        Response::builder()
            .status(200)
            .header(CONTENT_TYPE, mjpeg::content_type())
            .body(Body::wrap_stream(session.into_stream()))
    })
}

/// Bind the stream server, returning the bound address and the future that runs it.
///
/// Dropping the future closes the listening socket and every open stream.
pub(crate) fn bind(
    settings: &StreamSettings,
    context: Arc<StreamContext>,
) -> anyhow::Result<(SocketAddr, impl Future<Output = ()>)> {
    let address = SocketAddr::from(settings);
    let (bound, server) = warp::serve(routes(context))
        .try_bind_ephemeral(address)
        .with_context(|| format!("Unable to start stream server on {}", address))?;
    info!(address = %bound, "serving MJPEG stream");
    Ok((bound, server.instrument(info_span!("http_server"))))
}
