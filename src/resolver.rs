//! Resolution of a single line of cells into move instructions.
//!
//! A line is always given in the direction of movement: tiles travel toward index 0.
//! Resolution runs in three passes:
//! 1. [`condense`] removes the gaps between tiles,
//! 2. [`collapse`] merges adjacent equal tiles, each tile taking part in at most one merge,
//! 3. [`convert`] turns the remaining tokens into [`MoveOrder`]s for the presentation layer.

use crate::board::Cell;

/// Intermediate per-line result. The index of a token in its buffer is the destination
/// of the tile it describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionToken {
    /// Tile stays where it is.
    NoAction { source: usize, value: u32 },
    /// Tile slides without merging.
    Move { source: usize, value: u32 },
    /// An unmoved tile absorbs the tile at `source`.
    SingleCombine { source: usize, value: u32 },
    /// Two tiles, at least one of which has moved, combine into one.
    DoubleCombine {
        first: usize,
        second: usize,
        value: u32,
    },
}

impl ActionToken {
    pub fn value(&self) -> u32 {
        match *self {
            ActionToken::NoAction { value, .. }
            | ActionToken::Move { value, .. }
            | ActionToken::SingleCombine { value, .. }
            | ActionToken::DoubleCombine { value, .. } => value,
        }
    }

    pub fn source(&self) -> usize {
        match *self {
            ActionToken::NoAction { source, .. }
            | ActionToken::Move { source, .. }
            | ActionToken::SingleCombine { source, .. } => source,
            ActionToken::DoubleCombine { first, .. } => first,
        }
    }
}

/// Line-local instruction describing how one or two tiles end up at `destination`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOrder {
    Single {
        source: usize,
        destination: usize,
        value: u32,
        was_merge: bool,
    },
    Double {
        first: usize,
        second: usize,
        destination: usize,
        value: u32,
    },
}

impl MoveOrder {
    pub fn destination(&self) -> usize {
        match *self {
            MoveOrder::Single { destination, .. } | MoveOrder::Double { destination, .. } => {
                destination
            }
        }
    }

    pub fn value(&self) -> u32 {
        match *self {
            MoveOrder::Single { value, .. } | MoveOrder::Double { value, .. } => value,
        }
    }

    /// Points earned by applying this order.
    pub fn score(&self) -> u64 {
        match *self {
            MoveOrder::Single {
                value,
                was_merge: true,
                ..
            }
            | MoveOrder::Double { value, .. } => u64::from(value),
            MoveOrder::Single { .. } => 0,
        }
    }
}

/// Drop the empty cells of `line`, tagging every tile that had to shift as a `Move`.
///
/// `[2, _, _, 4]` becomes `[NoAction(0, 2), Move(3, 4)]`.
pub fn condense(line: &[Cell]) -> Vec<ActionToken> {
    let mut tokens = Vec::with_capacity(line.len());

    for (source, cell) in line.iter().enumerate() {
        let Cell::Tile(value) = *cell else {
            continue;
        };

        if tokens.len() == source {
            tokens.push(ActionToken::NoAction { source, value });
        } else {
            tokens.push(ActionToken::Move { source, value });
        }
    }

    tokens
}

/// Value of the tile produced by merging `a` and `b`.
///
/// # Panics
/// Panics if the merged value does not fit a tile.
fn merged_value(a: u32, b: u32) -> u32 {
    a.checked_add(b)
        .unwrap_or_else(|| panic!("merging {a} and {b} overflows the tile value"))
}

/// A `NoAction` tile at `index` of the input is still in place if nothing before it
/// shrank the output and it was never shifted by [`condense`].
fn still_quiescent(index: usize, output_len: usize, source: usize) -> bool {
    index == output_len && source == index
}

/// Merge adjacent tokens of equal value, front to back. A tile merges at most once, so
/// `[2, 2, 2, 2]` yields two 4s, and `[2, 2, 2]` yields `[4, 2]`.
///
/// # Panics
/// Panics if `tokens` contains a combine token; only the output of [`condense`] is valid input.
pub fn collapse(tokens: &[ActionToken]) -> Vec<ActionToken> {
    let mut out = Vec::with_capacity(tokens.len());
    let mut skip_next = false;

    for (idx, token) in tokens.iter().enumerate() {
        if skip_next {
            skip_next = false;
            continue;
        }

        // The last token has nothing to look ahead to.
        let next = tokens.get(idx + 1).filter(|next| next.value() == token.value());

        match (*token, next) {
            (ActionToken::SingleCombine { .. } | ActionToken::DoubleCombine { .. }, _) => {
                panic!("collapse received an already combined token: {token:?}")
            }
            (ActionToken::NoAction { source, value }, Some(next))
                if still_quiescent(idx, out.len(), source) =>
            {
                skip_next = true;
                out.push(ActionToken::SingleCombine {
                    source: next.source(),
                    value: merged_value(value, next.value()),
                });
            }
            (_, Some(next)) => {
                skip_next = true;
                out.push(ActionToken::DoubleCombine {
                    first: token.source(),
                    second: next.source(),
                    value: merged_value(token.value(), next.value()),
                });
            }
            (ActionToken::NoAction { source, value }, None)
                if !still_quiescent(idx, out.len(), source) =>
            {
                out.push(ActionToken::Move { source, value });
            }
            (ActionToken::NoAction { .. } | ActionToken::Move { .. }, None) => out.push(*token),
        }
    }

    out
}

/// Turn collapsed tokens into orders; a token's index is its destination.
/// `NoAction` tokens produce nothing.
pub fn convert(tokens: &[ActionToken]) -> Vec<MoveOrder> {
    tokens
        .iter()
        .enumerate()
        .filter_map(|(destination, token)| match *token {
            ActionToken::NoAction { .. } => None,
            ActionToken::Move { source, value } => Some(MoveOrder::Single {
                source,
                destination,
                value,
                was_merge: false,
            }),
            ActionToken::SingleCombine { source, value } => Some(MoveOrder::Single {
                source,
                destination,
                value,
                was_merge: true,
            }),
            ActionToken::DoubleCombine {
                first,
                second,
                value,
            } => Some(MoveOrder::Double {
                first,
                second,
                destination,
                value,
            }),
        })
        .collect()
}

/// Compute the orders that slide `line` toward index 0.
/// An empty result means the line does not change.
pub fn merge(line: &[Cell]) -> Vec<MoveOrder> {
    let orders = convert(&collapse(&condense(line)));
    log::trace!("merge {line:?} -> {orders:?}");
    orders
}
