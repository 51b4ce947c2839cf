/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Render a commit DAG into text.
//!
//! The caller feeds commits in display order (children before parents) to a
//! [`Renderer`], together with the typed edges from each commit to the
//! ancestors it should be drawn connected to. [`GraphRowRenderer`] assigns a
//! column to every commit and produces structured [`GraphRow`]s; wrapping it
//! with [`AsciiRenderer`] turns those rows into ASCII art:
//!
//! ```text
//! o    m
//! |\
//! o |  p
//!   |
//!   o  q
//! ```
//!
//! Edges come in three kinds: [`Ancestor::Parent`] is drawn solid,
//! [`Ancestor::Ancestor`] is drawn dashed (it stands in for omitted
//! commits), and [`Ancestor::Anonymous`] terminates in a `~`.

mod ascii;
mod column;
mod output;
mod pad;
mod render;

pub use ascii::AsciiRenderer;
pub use output::OutputRendererBuilder;
pub use output::OutputRendererOptions;
pub use render::Ancestor;
pub use render::GraphRow;
pub use render::GraphRowRenderer;
pub use render::LinkLine;
pub use render::NodeLine;
pub use render::PadLine;
pub use render::Renderer;
pub use render::RowOptions;
