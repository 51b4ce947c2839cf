/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use std::marker::PhantomData;

use crate::ascii::AsciiRenderer;
use crate::render::GraphRow;
use crate::render::Renderer;

/// Options for output renderers.
#[derive(Clone, Debug)]
pub struct OutputRendererOptions {
    /// Minimum number of output lines per row.
    pub min_row_height: usize,
}

impl Default for OutputRendererOptions {
    fn default() -> Self {
        OutputRendererOptions { min_row_height: 2 }
    }
}

/// Builder for output renderers wrapping a row renderer.
pub struct OutputRendererBuilder<N, R>
where
    R: Renderer<N, Output = GraphRow<N>> + Sized,
{
    inner: R,
    options: OutputRendererOptions,
    _phantom: PhantomData<N>,
}

impl<N, R> OutputRendererBuilder<N, R>
where
    R: Renderer<N, Output = GraphRow<N>> + Sized,
{
    pub(crate) fn new(inner: R) -> Self {
        OutputRendererBuilder {
            inner,
            options: OutputRendererOptions::default(),
            _phantom: PhantomData,
        }
    }

    pub fn with_min_row_height(mut self, min_row_height: usize) -> Self {
        self.options.min_row_height = min_row_height;
        self
    }

    pub fn build_ascii(self) -> AsciiRenderer<N, R> {
        AsciiRenderer::new(self.inner, self.options)
    }
}
