/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

/// Pad the message lines out to a minimum count with empty lines.
pub(crate) fn pad_lines<'a>(
    lines: std::str::Lines<'a>,
    min_height: usize,
) -> impl Iterator<Item = &'a str> {
    let lines: Vec<&str> = lines.collect();
    let pad = min_height.saturating_sub(lines.len());
    lines.into_iter().chain(std::iter::repeat("").take(pad))
}
