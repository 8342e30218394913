// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Reading-order sorter.
//
// Objects are first arranged in rows: sorted by top edge, a row collects
// every object whose top lies within the row tolerance of the row's first
// object, and each row reads left to right. Blocks are then grown greedily:
// a block starts at the first pending object and absorbs any pending object whose addition keeps the
// enlarged block clear of every other pending object. Grouping repeats one
// level up until the number of blocks stops falling, and the resulting tree
// is flattened depth-first.

use tracing::{debug, instrument};

use crate::geometry::{BoundingBox, Tolerance};
use crate::segment::Segment;

/// A node of the grouping tree.
#[derive(Debug, Clone)]
enum Node {
    Leaf(Segment),
    Block(Block),
}

impl Node {
    fn bbox(&self) -> BoundingBox {
        match self {
            Node::Leaf(segment) => segment.bbox,
            Node::Block(block) => block.bbox,
        }
    }
}

/// Union of its children's boxes plus the children in absorption order.
#[derive(Debug, Clone)]
struct Block {
    bbox: BoundingBox,
    children: Vec<Node>,
}

impl Block {
    fn new(first: Node) -> Self {
        Self {
            bbox: first.bbox(),
            children: vec![first],
        }
    }

    fn absorb(&mut self, node: Node) {
        self.bbox.merge(&node.bbox());
        self.children.push(node);
    }
}

/// Put `segments` into reading order: a permutation of the input.
///
/// Objects whose top edges lie within `row_tolerance` of a row's first object
/// share that row, so a column starting a few pixels higher than its left
/// neighbour is still read second.
#[instrument(skip(segments), fields(count = segments.len(), row_tolerance = row_tolerance.pixels()))]
pub fn sort_reading_order(segments: Vec<Segment>, row_tolerance: Tolerance) -> Vec<Segment> {
    let expected = segments.len();
    let mut level: Vec<Node> = segments.into_iter().map(Node::Leaf).collect();
    arrange_rows(&mut level, row_tolerance);

    let mut rounds = 0usize;
    while level.len() > 1 {
        let before = level.len();
        let grouped = group_level(level);
        rounds += 1;
        if grouped.len() >= before {
            // Nothing merged: every block holds exactly one node.
            level = grouped.into_iter().flat_map(unwrap_single).collect();
            break;
        }
        debug!(round = rounds, before, after = grouped.len(), "Blocks grouped");
        level = grouped;
        arrange_rows(&mut level, row_tolerance);
    }

    let ordered = flatten(level);
    assert_eq!(
        ordered.len(),
        expected,
        "reading-order flatten lost or duplicated segments"
    );
    ordered
}

/// Sort by top edge, then reorder each row band by left edge.
///
/// Rows are anchored at their first object, so membership does not drift down
/// the page through a chain of slightly lower neighbours.
fn arrange_rows(level: &mut [Node], tolerance: Tolerance) {
    level.sort_by_key(Node::bbox);
    let mut start = 0;
    while start < level.len() {
        let anchor = level[start].bbox().y1();
        let end = level[start..]
            .iter()
            .position(|node| !tolerance.near(anchor, node.bbox().y1()))
            .map_or(level.len(), |offset| start + offset);
        level[start..end].sort_by_key(|node| {
            let b = node.bbox();
            (b.x1(), b)
        });
        start = end;
    }
}

/// One grouping round over a level arranged in rows.
fn group_level(level: Vec<Node>) -> Vec<Node> {
    let mut pool = level;
    let mut blocks = Vec::new();

    while !pool.is_empty() {
        let mut block = Block::new(pool.remove(0));
        while let Some(index) = find_absorbable(&block, &pool) {
            block.absorb(pool.remove(index));
        }
        blocks.push(Node::Block(block));
    }
    blocks
}

/// First pending node whose union with `block` overlaps no other pending node.
fn find_absorbable(block: &Block, pool: &[Node]) -> Option<usize> {
    (0..pool.len()).find(|&i| {
        let enlarged = block.bbox.union(&pool[i].bbox());
        pool.iter()
            .enumerate()
            .all(|(j, other)| j == i || !enlarged.intersects(&other.bbox()))
    })
}

fn unwrap_single(node: Node) -> Vec<Node> {
    match node {
        Node::Block(block) => block.children,
        leaf => vec![leaf],
    }
}

/// Depth-first flatten with an explicit stack.
fn flatten(roots: Vec<Node>) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut stack: Vec<Node> = roots.into_iter().rev().collect();
    while let Some(node) = stack.pop() {
        match node {
            Node::Leaf(segment) => out.push(segment),
            Node::Block(block) => stack.extend(block.children.into_iter().rev()),
        }
    }
    out
}
