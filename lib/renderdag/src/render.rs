/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 *
 * This source code is licensed under the MIT license found in the
 * LICENSE file in the root directory of this source tree.
 */

use bitflags::bitflags;
#[cfg(feature = "serialize")]
use serde::Serialize;

use crate::column::Column;
use crate::output::OutputRendererBuilder;

/// An edge from a node to one of its ancestors.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub enum Ancestor<N> {
    /// The ancestor is a direct parent, drawn as a solid edge.
    Parent(N),
    /// The ancestor stands in for omitted commits, drawn as a dashed edge.
    Ancestor(N),
    /// The parent is outside the known graph, drawn as `~`.
    Anonymous,
}

impl<N> Ancestor<N> {
    /// The target of the edge, if it has one.
    pub fn id(&self) -> Option<&N> {
        match self {
            Ancestor::Parent(n) | Ancestor::Ancestor(n) => Some(n),
            Ancestor::Anonymous => None,
        }
    }
}

/// One cell of the row that contains the node glyph.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub enum NodeLine {
    Blank,
    Ancestor,
    Parent,
    Node,
}

/// One cell of a padding row between node rows.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub enum PadLine {
    Blank,
    Ancestor,
    Parent,
}

bitflags! {
    /// What passes through one column of the link row drawn underneath a
    /// node: ongoing vertical edges, horizontal connections from the node
    /// to its parents' columns, and the fork/merge corners where those
    /// connections bend.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct LinkLine: u16 {
        const HORIZ_PARENT = 0b0000_0000_0000_0001;
        const HORIZ_ANCESTOR = 0b0000_0000_0000_0010;
        const VERT_PARENT = 0b0000_0000_0000_0100;
        const VERT_ANCESTOR = 0b0000_0000_0000_1000;
        const LEFT_FORK_PARENT = 0b0000_0000_0001_0000;
        const LEFT_FORK_ANCESTOR = 0b0000_0000_0010_0000;
        const RIGHT_FORK_PARENT = 0b0000_0000_0100_0000;
        const RIGHT_FORK_ANCESTOR = 0b0000_0000_1000_0000;
        const LEFT_MERGE_PARENT = 0b0000_0001_0000_0000;
        const LEFT_MERGE_ANCESTOR = 0b0000_0010_0000_0000;
        const RIGHT_MERGE_PARENT = 0b0000_0100_0000_0000;
        const RIGHT_MERGE_ANCESTOR = 0b0000_1000_0000_0000;
        /// The column occupied by the current node.
        const CHILD = 0b0001_0000_0000_0000;

        const HORIZONTAL = Self::HORIZ_PARENT.bits() | Self::HORIZ_ANCESTOR.bits();
        const VERTICAL = Self::VERT_PARENT.bits() | Self::VERT_ANCESTOR.bits();
        const LEFT_FORK = Self::LEFT_FORK_PARENT.bits() | Self::LEFT_FORK_ANCESTOR.bits();
        const RIGHT_FORK = Self::RIGHT_FORK_PARENT.bits() | Self::RIGHT_FORK_ANCESTOR.bits();
        const ANY_FORK = Self::LEFT_FORK.bits() | Self::RIGHT_FORK.bits();
        const LEFT_MERGE = Self::LEFT_MERGE_PARENT.bits() | Self::LEFT_MERGE_ANCESTOR.bits();
        const RIGHT_MERGE = Self::RIGHT_MERGE_PARENT.bits() | Self::RIGHT_MERGE_ANCESTOR.bits();
        const ANY_MERGE = Self::LEFT_MERGE.bits() | Self::RIGHT_MERGE.bits();
        const ANY_FORK_OR_MERGE = Self::ANY_FORK.bits() | Self::ANY_MERGE.bits();
    }
}

#[cfg(feature = "serialize")]
impl Serialize for LinkLine {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u16(self.bits())
    }
}

/// Options for rendering a single row.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RowOptions {
    /// Pin this node to the last (right-most) column, where the trunk is
    /// drawn.
    pub force_last_column: bool,
}

/// All the information needed to render one row of the graph.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize))]
pub struct GraphRow<N> {
    /// The node this row is about.
    pub node: N,
    /// The glyph to draw in the node's column (e.g. `o`).
    pub glyph: String,
    /// The message to draw next to the graph.
    pub message: String,
    /// True if the node has more than one parent edge.
    pub merge: bool,
    /// The row containing the node glyph.
    pub node_line: Vec<NodeLine>,
    /// An optional row connecting the node to parent columns.
    pub link_line: Option<Vec<LinkLine>>,
    /// An optional row terminating anonymous parent edges with `~`.
    /// `true` marks the columns that terminate.
    pub term_line: Option<Vec<bool>>,
    /// The padding row repeated until the next node row.
    pub pad_lines: Vec<PadLine>,
}

/// Renders a stream of nodes, in display order, into rows.
pub trait Renderer<N> {
    type Output;

    /// Current width of the graph, in columns, including the columns the
    /// given node and parents would occupy.
    fn width(&self, node: Option<&N>, parents: Option<&Vec<Ancestor<N>>>) -> u64;

    /// Reserve a column at the right edge for a node that will be rendered
    /// later. Used to keep the public trunk in a stable column.
    fn reserve(&mut self, node: N);

    /// Render the next row.
    fn next_row(
        &mut self,
        node: N,
        parents: Vec<Ancestor<N>>,
        glyph: String,
        message: String,
    ) -> Self::Output
    where
        Self: Sized,
    {
        self.next_row_with_options(node, parents, glyph, message, RowOptions::default())
    }

    /// Render the next row with explicit options.
    fn next_row_with_options(
        &mut self,
        node: N,
        parents: Vec<Ancestor<N>>,
        glyph: String,
        message: String,
        options: RowOptions,
    ) -> Self::Output;
}

/// Column-allocating renderer producing [`GraphRow`]s.
///
/// Each node occupies exactly one column for its row. The column then either
/// carries the edge to the node's first parent, or is released once the row
/// has been emitted. Edges to the same target share a single column: when a
/// second column would start targeting a node that already has one, the
/// leftmost column wins and the other merges into it on the link row.
pub struct GraphRowRenderer<N> {
    columns: Vec<Column<N>>,
}

impl<N> Default for GraphRowRenderer<N> {
    fn default() -> Self {
        GraphRowRenderer {
            columns: Vec::new(),
        }
    }
}

struct Edge<N> {
    target: N,
    dashed: bool,
}

fn vert(dashed: bool) -> LinkLine {
    if dashed {
        LinkLine::VERT_ANCESTOR
    } else {
        LinkLine::VERT_PARENT
    }
}

fn horiz(dashed: bool) -> LinkLine {
    if dashed {
        LinkLine::HORIZ_ANCESTOR
    } else {
        LinkLine::HORIZ_PARENT
    }
}

fn left_fork(dashed: bool) -> LinkLine {
    if dashed {
        LinkLine::LEFT_FORK_ANCESTOR
    } else {
        LinkLine::LEFT_FORK_PARENT
    }
}

fn right_fork(dashed: bool) -> LinkLine {
    if dashed {
        LinkLine::RIGHT_FORK_ANCESTOR
    } else {
        LinkLine::RIGHT_FORK_PARENT
    }
}

fn left_merge(dashed: bool) -> LinkLine {
    if dashed {
        LinkLine::LEFT_MERGE_ANCESTOR
    } else {
        LinkLine::LEFT_MERGE_PARENT
    }
}

fn right_merge(dashed: bool) -> LinkLine {
    if dashed {
        LinkLine::RIGHT_MERGE_ANCESTOR
    } else {
        LinkLine::RIGHT_MERGE_PARENT
    }
}

impl<N: Clone + Eq> GraphRowRenderer<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an output renderer on top of this one.
    pub fn output(self) -> OutputRendererBuilder<N, Self> {
        OutputRendererBuilder::new(self)
    }

    fn find(&self, node: &N) -> Option<usize> {
        self.columns.iter().position(|c| c.matches(node))
    }

    fn first_empty(&self) -> Option<usize> {
        self.columns.iter().position(|c| matches!(c, Column::Empty))
    }

    /// Where a brand-new column goes: just before the block of reserved
    /// columns at the right edge, so the trunk keeps its position.
    fn insertion_index(&self) -> usize {
        let mut index = self.columns.len();
        while index > 0 && matches!(self.columns[index - 1], Column::Reserved(_)) {
            index -= 1;
        }
        index
    }

    /// Allocate a column without disturbing already assigned indices.
    fn spare_column(&mut self, link: &mut Vec<LinkLine>, node_line: &mut Vec<NodeLine>, term: &mut Vec<bool>) -> usize {
        match self.first_empty() {
            Some(index) => index,
            None => {
                self.columns.push(Column::Empty);
                link.push(LinkLine::empty());
                node_line.push(NodeLine::Blank);
                term.push(false);
                self.columns.len() - 1
            }
        }
    }
}

impl<N: Clone + Eq> Renderer<N> for GraphRowRenderer<N> {
    type Output = GraphRow<N>;

    fn width(&self, node: Option<&N>, parents: Option<&Vec<Ancestor<N>>>) -> u64 {
        let mut width = self.columns.len();
        if let Some(node) = node {
            if self.find(node).is_none() {
                width += 1;
            }
        }
        if let Some(parents) = parents {
            let new = parents
                .iter()
                .filter(|p| p.id().map_or(true, |id| self.find(id).is_none()))
                .count();
            width += new.saturating_sub(1);
        }
        width as u64
    }

    fn reserve(&mut self, node: N) {
        if self.find(&node).is_none() {
            self.columns.push(Column::Reserved(node));
        }
    }

    fn next_row_with_options(
        &mut self,
        node: N,
        parents: Vec<Ancestor<N>>,
        glyph: String,
        message: String,
        options: RowOptions,
    ) -> GraphRow<N> {
        // Free columns released by the previous row and drop trailing space.
        for column in self.columns.iter_mut() {
            if matches!(column, Column::Blocked) {
                *column = Column::Empty;
            }
        }
        while matches!(self.columns.last(), Some(Column::Empty)) {
            self.columns.pop();
        }

        // Deduplicate edges; a solid edge to a target wins over a dashed one.
        let mut edges: Vec<Edge<N>> = Vec::new();
        let mut anonymous = 0usize;
        for parent in &parents {
            match parent {
                Ancestor::Anonymous => anonymous += 1,
                Ancestor::Parent(p) => match edges.iter_mut().find(|e| &e.target == p) {
                    Some(edge) => edge.dashed = false,
                    None => edges.push(Edge {
                        target: p.clone(),
                        dashed: false,
                    }),
                },
                Ancestor::Ancestor(p) => {
                    if !edges.iter().any(|e| &e.target == p) {
                        edges.push(Edge {
                            target: p.clone(),
                            dashed: true,
                        });
                    }
                }
            }
        }

        // The node's own column.
        if options.force_last_column {
            self.columns.push(Column::Reserved(node.clone()));
        }
        let mut node_index = if options.force_last_column {
            self.columns.len() - 1
        } else {
            match self.find(&node) {
                Some(index) => index,
                None => match self.first_empty() {
                    Some(index) => index,
                    None => {
                        let index = self.insertion_index();
                        self.columns.insert(index, Column::Empty);
                        index
                    }
                },
            }
        };
        // Consume the column; it either carries the first parent edge below
        // or is released at the end of the row.
        self.columns[node_index] = Column::Blocked;

        // Retire any other column that was waiting for this node.
        for index in 0..self.columns.len() {
            if index != node_index && self.columns[index].matches(&node) {
                self.columns[index] = Column::Blocked;
            }
        }

        // Work out how many fresh columns the edges below will take, and
        // insert them all up front so the layout never shifts an index it
        // has already handed out.
        let mut needed = 0usize;
        {
            let mut node_column_free = true;
            for edge in &edges {
                let existing = (0..self.columns.len())
                    .find(|&i| i != node_index && self.columns[i].matches(&edge.target));
                match existing {
                    Some(target) => {
                        if node_column_free
                            && node_index < target
                            && !matches!(self.columns[target], Column::Reserved(_))
                        {
                            node_column_free = false;
                        }
                    }
                    None => {
                        if node_column_free {
                            node_column_free = false;
                        } else {
                            needed += 1;
                        }
                    }
                }
            }
            for _ in 0..anonymous {
                if node_column_free {
                    node_column_free = false;
                } else {
                    needed += 1;
                }
            }
        }
        let empties = self
            .columns
            .iter()
            .filter(|c| matches!(c, Column::Empty))
            .count();
        if needed > empties {
            let insert_at = self.insertion_index();
            for _ in 0..needed - empties {
                self.columns.insert(insert_at, Column::Empty);
            }
            if node_index >= insert_at {
                node_index += needed - empties;
            }
        }

        // Node line, snapshotted before parent edges are assigned: columns
        // created for parents on this row stay blank until the link row.
        let mut node_line: Vec<NodeLine> = self
            .columns
            .iter()
            .map(|c| match c {
                Column::Parent(_) => NodeLine::Parent,
                Column::Ancestor(_) => NodeLine::Ancestor,
                _ => NodeLine::Blank,
            })
            .collect();
        node_line[node_index] = NodeLine::Node;

        // Link flags start out with the pass-through edges.
        let mut link: Vec<LinkLine> = self
            .columns
            .iter()
            .map(|c| match c {
                Column::Parent(_) => LinkLine::VERT_PARENT,
                Column::Ancestor(_) => LinkLine::VERT_ANCESTOR,
                _ => LinkLine::empty(),
            })
            .collect();
        link[node_index] |= LinkLine::CHILD;

        let mut term: Vec<bool> = vec![false; self.columns.len()];
        let mut need_link = false;
        let mut has_term = false;
        let mut node_column_used = false;

        for edge in &edges {
            let column = if edge.dashed {
                Column::Ancestor(edge.target.clone())
            } else {
                Column::Parent(edge.target.clone())
            };
            let existing = (0..self.columns.len())
                .find(|&i| i != node_index && self.columns[i].matches(&edge.target));
            match existing {
                Some(target)
                    if !node_column_used
                        && node_index < target
                        && !matches!(self.columns[target], Column::Reserved(_)) =>
                {
                    // Fold the existing column into the node's column so the
                    // shared edge continues from the leftmost position.
                    let dashed = edge.dashed && matches!(self.columns[target], Column::Ancestor(_));
                    self.columns[node_index] = if dashed {
                        Column::Ancestor(edge.target.clone())
                    } else {
                        Column::Parent(edge.target.clone())
                    };
                    self.columns[target] = Column::Blocked;
                    link[node_index] |= right_fork(dashed) | vert(dashed);
                    link[target].remove(LinkLine::VERTICAL);
                    link[target] |= left_merge(dashed);
                    for i in node_index + 1..target {
                        link[i] |= horiz(dashed);
                    }
                    node_column_used = true;
                    need_link = true;
                }
                Some(target) => {
                    // Join the existing column.
                    match &self.columns[target] {
                        Column::Reserved(_) => self.columns[target] = column,
                        Column::Ancestor(_) if !edge.dashed => self.columns[target] = column,
                        _ => {}
                    }
                    let far = target.abs_diff(node_index) > 1;
                    if far {
                        link[target].remove(LinkLine::VERTICAL);
                        link[node_index] |= horiz(edge.dashed);
                    }
                    if target > node_index {
                        link[node_index] |= right_merge(edge.dashed);
                        link[target] |= left_fork(edge.dashed);
                        for i in node_index + 1..target {
                            link[i] |= horiz(edge.dashed);
                        }
                    } else {
                        link[node_index] |= left_merge(edge.dashed);
                        link[target] |= right_fork(edge.dashed);
                        for i in target + 1..node_index {
                            link[i] |= horiz(edge.dashed);
                        }
                    }
                    need_link = true;
                }
                None => {
                    if !node_column_used {
                        // Continue straight down from the node.
                        self.columns[node_index] = column;
                        link[node_index] |= vert(edge.dashed);
                        node_column_used = true;
                    } else {
                        let target = self.spare_column(&mut link, &mut node_line, &mut term);
                        self.columns[target] = column;
                        let far = target.abs_diff(node_index) > 1;
                        if far {
                            link[node_index] |= horiz(edge.dashed);
                        }
                        if target > node_index {
                            link[node_index] |= right_merge(edge.dashed);
                            link[target] |= left_fork(edge.dashed);
                            for i in node_index + 1..target {
                                link[i] |= horiz(edge.dashed);
                            }
                        } else {
                            link[node_index] |= left_merge(edge.dashed);
                            link[target] |= right_fork(edge.dashed);
                            for i in target + 1..node_index {
                                link[i] |= horiz(edge.dashed);
                            }
                        }
                        need_link = true;
                    }
                }
            }
        }

        // Anonymous parents occupy a column for exactly one row, then
        // terminate with a `~`.
        for _ in 0..anonymous {
            let index = if !node_column_used {
                node_column_used = true;
                node_index
            } else {
                let index = self.spare_column(&mut link, &mut node_line, &mut term);
                if index.abs_diff(node_index) > 1 {
                    link[node_index] |= horiz(false);
                }
                if index > node_index {
                    link[node_index] |= right_merge(false);
                    link[index] |= left_fork(false);
                    for i in node_index + 1..index {
                        link[i] |= horiz(false);
                    }
                } else {
                    link[node_index] |= left_merge(false);
                    link[index] |= right_fork(false);
                    for i in index + 1..node_index {
                        link[i] |= horiz(false);
                    }
                }
                need_link = true;
                index
            };
            self.columns[index] = Column::Blocked;
            term[index] = true;
            has_term = true;
        }

        let pad_lines: Vec<PadLine> = self
            .columns
            .iter()
            .map(|c| match c {
                Column::Parent(_) => PadLine::Parent,
                Column::Ancestor(_) => PadLine::Ancestor,
                _ => PadLine::Blank,
            })
            .collect();

        GraphRow {
            node,
            glyph,
            message,
            merge: parents.len() > 1,
            node_line,
            link_line: if need_link { Some(link) } else { None },
            term_line: if has_term { Some(term) } else { None },
            pad_lines,
        }
    }
}
