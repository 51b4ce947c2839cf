/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Rendering surface: walks the graph in display order, classifies each
//! commit's edges, and feeds them to a `renderdag` renderer.

use renderdag::Ancestor;
use renderdag::GraphRow;
use renderdag::GraphRowRenderer;
use renderdag::Renderer;

use crate::commit::CommitInfo;
use crate::dag::Dag;
use crate::errors::Result;
use crate::hash::Hash;
use crate::set::Set;

/// One step of the rendering walk.
#[derive(Clone, Debug)]
pub enum RenderStep {
    /// Reserve a column for a commit rendered later (the public trunk).
    Reserve(Hash),
    /// Render one commit with its classified edges.
    Row(CommitInfo, Vec<Ancestor<Hash>>),
}

/// The glyph used for a commit in text output: `@` for the working parent,
/// `x` for obsolete commits, `o` otherwise.
pub fn glyph(info: &CommitInfo) -> &'static str {
    if info.is_dot {
        "@"
    } else if info.is_obsolete() {
        "x"
    } else {
        "o"
    }
}

impl Dag {
    /// Walk `set` (default: [`Dag::subset_for_rendering`]) in display order,
    /// yielding reservation and row steps for a renderer.
    ///
    /// Edges are classified per commit: parents inside the render set are
    /// solid (dashed when the commit's synthetic `ancestors` list claims
    /// them); parents known to the graph but outside the render set become
    /// dashed edges to their closest visible ancestors; parents outside the
    /// graph collapse into a single anonymous edge.
    pub fn dag_walker_for_rendering(
        &self,
        set: Option<&Set>,
    ) -> Result<std::vec::IntoIter<RenderStep>> {
        let subset = match set {
            Some(set) => self.present(set),
            None => self.subset_for_rendering(None, true),
        };
        let order = self.sort_desc(Some(&subset))?;

        let mut steps: Vec<RenderStep> = Vec::new();
        if let Some(first_public) = order
            .iter()
            .find(|h| self.get(h).is_some_and(|c| c.phase == crate::Phase::Public))
        {
            steps.push(RenderStep::Reserve(first_public.clone()));
        }

        for hash in &order {
            let Some(info) = self.get(hash) else {
                continue;
            };
            let synthetic: &[Hash] = info.ancestors.as_deref().unwrap_or(&[]);
            let mut edges: Vec<Ancestor<Hash>> = Vec::new();
            let mut indirect: Vec<Hash> = Vec::new();
            let mut missing = false;
            for parent in &info.parents {
                if subset.contains(parent) {
                    if synthetic.contains(parent) {
                        edges.push(Ancestor::Ancestor(parent.clone()));
                    } else {
                        edges.push(Ancestor::Parent(parent.clone()));
                    }
                } else if self.contains(parent) {
                    indirect.push(parent.clone());
                } else {
                    missing = true;
                }
            }
            if !indirect.is_empty() {
                let visible = self
                    .ancestors(&indirect.into_iter().collect(), None)
                    .intersect(&subset);
                let targets = self.commits().heads(&self.ancestors(&visible, None));
                for target in targets.iter() {
                    if edges.iter().any(|e| e.id() == Some(target)) {
                        continue;
                    }
                    edges.push(Ancestor::Ancestor(target.clone()));
                }
            }
            if missing && synthetic.is_empty() {
                edges.push(Ancestor::Anonymous);
            }
            if edges.is_empty() && !info.parents.is_empty() {
                // Keep commits with unresolvable parents from posing as roots.
                edges.push(Ancestor::Anonymous);
            }
            steps.push(RenderStep::Row(info.clone(), edges));
        }
        Ok(steps.into_iter())
    }

    /// Render `set` to `(commit, row)` pairs, the single rendering surface
    /// consumed by collaborators. Memoised per input set.
    pub fn render_to_rows(&self, set: Option<&Set>) -> Result<Vec<(CommitInfo, GraphRow<Hash>)>> {
        if let Some(rows) = self.cached_render_rows(set) {
            return Ok(rows);
        }
        let mut renderer: GraphRowRenderer<Hash> = GraphRowRenderer::new();
        let mut rows: Vec<(CommitInfo, GraphRow<Hash>)> = Vec::new();
        for step in self.dag_walker_for_rendering(set)? {
            match step {
                RenderStep::Reserve(hash) => renderer.reserve(hash),
                RenderStep::Row(info, parents) => {
                    let row = renderer.next_row(
                        info.hash.clone(),
                        parents,
                        glyph(&info).to_string(),
                        String::new(),
                    );
                    rows.push((info, row));
                }
            }
        }
        self.store_render_rows(set, &rows);
        Ok(rows)
    }

    /// Debug rendering: the graph as ASCII art, without a trailing newline.
    pub fn render_ascii(&self, set: Option<&Set>) -> Result<String> {
        let mut renderer = GraphRowRenderer::new().output().build_ascii();
        let mut out = String::new();
        for step in self.dag_walker_for_rendering(set)? {
            match step {
                RenderStep::Reserve(hash) => renderer.reserve(hash),
                RenderStep::Row(info, parents) => {
                    let row = renderer.next_row(
                        info.hash.clone(),
                        parents,
                        glyph(&info).to_string(),
                        info.hash.to_string(),
                    );
                    out.push_str(&row);
                }
            }
        }
        Ok(out.trim_end().to_string())
    }
}
