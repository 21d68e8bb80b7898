// SPDX-License-Identifier: GPL-3.0-or-later
mod jpeg;
mod mjpeg;
mod server;
mod session;
mod settings;

pub(crate) use server::bind;
pub(crate) use session::StreamContext;
pub(crate) use settings::StreamSettings;
