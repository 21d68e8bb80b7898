// SPDX-License-Identifier: GPL-3.0-or-later
mod annotate;
mod color_map;
mod composite;
mod font;
mod normalize;
pub(crate) mod resize;
mod settings;

pub(crate) use annotate::Annotator;
pub(crate) use color_map::{colorize, with_alpha};
pub(crate) use composite::{blend_onto, Placement};
pub(crate) use normalize::normalize;
pub(crate) use settings::RenderSettings;

#[cfg(test)]
pub(crate) use color_map::hot;
