//! Ratcliff/Obershelp block matching over arbitrary sequences.
//!
//! [`BlockMatcher`] indexes one sequence (`b`) once; any number of `a`
//! sequences can then be compared against it.  The decomposition finds the
//! longest common contiguous block, then recurses on the fragments to its
//! left and right.  Ties prefer the block that starts earliest in `a`, then
//! earliest in `b`.
//!
//! From the matching blocks it derives a similarity [`ratio`] and an edit
//! script of [`Opcode`]s.
//!
//! [`ratio`]: BlockMatcher::ratio

use std::collections::HashMap;
use std::hash::Hash;

/// A run of `size` equal elements at `a[a_start..]` and `b[b_start..]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub a_start: usize,
    pub b_start: usize,
    pub size: usize,
}

/// Edit operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    /// `a[a_range] == b[b_range]`.
    Equal,
    /// `a[a_range]` should be replaced by `b[b_range]`.
    Replace,
    /// `a[a_range]` has no counterpart; `b_range` is empty.
    Delete,
    /// `b[b_range]` has no counterpart; `a_range` is empty.
    Insert,
}

/// One step of the edit script turning `a` into `b`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opcode {
    pub tag: Tag,
    pub a_range: std::ops::Range<usize>,
    pub b_range: std::ops::Range<usize>,
}

/// Block matcher with the `b` side pre-indexed.
pub struct BlockMatcher<T> {
    b: Vec<T>,
    /// Positions of every element of `b`, ascending.
    b_index: HashMap<T, Vec<usize>>,
}

impl<T: Eq + Hash + Clone> BlockMatcher<T> {
    pub fn new(b: Vec<T>) -> Self {
        let mut b_index: HashMap<T, Vec<usize>> = HashMap::new();
        for (j, item) in b.iter().enumerate() {
            b_index.entry(item.clone()).or_default().push(j);
        }
        Self { b, b_index }
    }

    pub fn b(&self) -> &[T] {
        &self.b
    }

    /// Longest common block within `a[a_lo..a_hi]` × `b[b_lo..b_hi]`.
    ///
    /// `scratch` must be all zeros on entry and is left zeroed.
    fn longest_match(
        &self,
        a: &[T],
        (a_lo, a_hi): (usize, usize),
        (b_lo, b_hi): (usize, usize),
        scratch: &mut Scratch,
    ) -> Block {
        let mut best = Block {
            a_start: a_lo,
            b_start: b_lo,
            size: 0,
        };

        // lengths[j + 1] = length of the common run ending at a[i - 1], b[j].
        for i in a_lo..a_hi {
            if let Some(positions) = self.b_index.get(&a[i]) {
                for &j in positions {
                    if j < b_lo {
                        continue;
                    }
                    if j >= b_hi {
                        break;
                    }
                    let k = scratch.lengths[j] + 1;
                    scratch.next[j + 1] = k;
                    scratch.touched_next.push(j + 1);
                    if k > best.size {
                        best = Block {
                            a_start: i + 1 - k,
                            b_start: j + 1 - k,
                            size: k,
                        };
                    }
                }
            }
            scratch.advance();
        }
        scratch.clear();
        best
    }

    /// Non-overlapping matching blocks in ascending order, adjacent blocks
    /// merged, terminated by a zero-size sentinel at `(a.len(), b.len())`.
    pub fn matching_blocks(&self, a: &[T]) -> Vec<Block> {
        let (la, lb) = (a.len(), self.b.len());
        let mut scratch = Scratch::new(lb);
        let mut found = Vec::new();
        let mut queue = vec![((0, la), (0, lb))];

        while let Some(((a_lo, a_hi), (b_lo, b_hi))) = queue.pop() {
            let block = self.longest_match(a, (a_lo, a_hi), (b_lo, b_hi), &mut scratch);
            if block.size == 0 {
                continue;
            }
            found.push(block);
            if a_lo < block.a_start && b_lo < block.b_start {
                queue.push(((a_lo, block.a_start), (b_lo, block.b_start)));
            }
            let (a_end, b_end) = (block.a_start + block.size, block.b_start + block.size);
            if a_end < a_hi && b_end < b_hi {
                queue.push(((a_end, a_hi), (b_end, b_hi)));
            }
        }
        found.sort_by_key(|b| (b.a_start, b.b_start));

        let mut merged: Vec<Block> = Vec::with_capacity(found.len() + 1);
        for block in found {
            match merged.last_mut() {
                Some(prev)
                    if prev.a_start + prev.size == block.a_start
                        && prev.b_start + prev.size == block.b_start =>
                {
                    prev.size += block.size;
                }
                _ => merged.push(block),
            }
        }
        merged.push(Block {
            a_start: la,
            b_start: lb,
            size: 0,
        });
        merged
    }

    /// `2 * M / (len(a) + len(b))` where `M` is the total size of the
    /// matching blocks.  Two empty sequences are identical (`1.0`).
    pub fn ratio(&self, a: &[T]) -> f64 {
        let total = a.len() + self.b.len();
        if total == 0 {
            return 1.0;
        }
        let matched: usize = self.matching_blocks(a).iter().map(|b| b.size).sum();
        2.0 * matched as f64 / total as f64
    }

    /// Edit script turning `a` into `b`, in source order.
    pub fn opcodes(&self, a: &[T]) -> Vec<Opcode> {
        let mut ops = Vec::new();
        let (mut i, mut j) = (0, 0);

        for block in self.matching_blocks(a) {
            let tag = match (i < block.a_start, j < block.b_start) {
                (true, true) => Some(Tag::Replace),
                (true, false) => Some(Tag::Delete),
                (false, true) => Some(Tag::Insert),
                (false, false) => None,
            };
            if let Some(tag) = tag {
                ops.push(Opcode {
                    tag,
                    a_range: i..block.a_start,
                    b_range: j..block.b_start,
                });
            }
            i = block.a_start + block.size;
            j = block.b_start + block.size;
            if block.size > 0 {
                ops.push(Opcode {
                    tag: Tag::Equal,
                    a_range: block.a_start..i,
                    b_range: block.b_start..j,
                });
            }
        }
        ops
    }
}

/// Two dynamic-programming rows plus the indices written to each, so a row
/// can be reset without scanning all of it.
struct Scratch {
    lengths: Vec<usize>,
    next: Vec<usize>,
    touched: Vec<usize>,
    touched_next: Vec<usize>,
}

impl Scratch {
    fn new(b_len: usize) -> Self {
        Self {
            lengths: vec![0; b_len + 1],
            next: vec![0; b_len + 1],
            touched: Vec::new(),
            touched_next: Vec::new(),
        }
    }

    /// Make `next` the current row and reset the old one.
    fn advance(&mut self) {
        for &j in &self.touched {
            self.lengths[j] = 0;
        }
        self.touched.clear();
        std::mem::swap(&mut self.lengths, &mut self.next);
        std::mem::swap(&mut self.touched, &mut self.touched_next);
    }

    fn clear(&mut self) {
        for &j in self.touched.iter().chain(&self.touched_next) {
            self.lengths[j] = 0;
            self.next[j] = 0;
        }
        self.touched.clear();
        self.touched_next.clear();
    }
}

/// Similarity ratio of two strings compared character by character.
pub fn char_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    BlockMatcher::new(b.chars().collect()).ratio(&a)
}
