//! Myers O(N·D) shortest edit script over lines, in linear space.
//!
//! Common prefix and suffix are peeled off first. The differing middle is
//! split at the middle snake of an optimal path, found by running the greedy
//! furthest-reaching search from both corners at once, and each half is solved
//! the same way. Only the two frontiers are ever held, so memory stays
//! `O(N + M)` whatever the distance.

use std::ops::{Index, IndexMut, Range};

use crate::DiffError;
use crate::op::{LineOp, LineOpKind};

/// Computes the minimal edit script turning `old` into `new`.
///
/// Within each run of changes every removal precedes every insertion.
pub fn edit_script<O, N>(old: &[O], new: &[N]) -> Vec<LineOp>
where
	O: AsRef<str>,
	N: AsRef<str>,
{
	// D never exceeds old.len() + new.len(), so an unbounded search cannot fail.
	edit_script_bounded(old, new, usize::MAX).unwrap_or_default()
}

/// Like [`edit_script`], but gives up once more than `max_cost` removed plus
/// inserted lines would be needed.
pub fn edit_script_bounded<O, N>(old: &[O], new: &[N], max_cost: usize) -> Result<Vec<LineOp>, DiffError>
where
	O: AsRef<str>,
	N: AsRef<str>,
{
	let old: Vec<&str> = old.iter().map(AsRef::as_ref).collect();
	let new: Vec<&str> = new.iter().map(AsRef::as_ref).collect();

	let mut search = Search::new(&old, &new);
	search.conquer(0..old.len(), 0..new.len(), max_cost)?;
	Ok(canonicalize(search.ops))
}

/// Furthest x reached on each diagonal `k = x - y`, indexed by signed `k`.
#[derive(Clone)]
struct Frontier {
	offset: isize,
	x: Vec<usize>,
}

impl Frontier {
	fn new(max_d: usize) -> Self {
		Self {
			offset: max_d as isize,
			x: vec![0; 2 * max_d + 1],
		}
	}
}

impl Index<isize> for Frontier {
	type Output = usize;

	fn index(&self, k: isize) -> &usize {
		&self.x[(k + self.offset) as usize]
	}
}

impl IndexMut<isize> for Frontier {
	fn index_mut(&mut self, k: isize) -> &mut usize {
		&mut self.x[(k + self.offset) as usize]
	}
}

/// Rounds needed from each corner to meet somewhere on an optimal path.
fn max_d(n: usize, m: usize) -> usize {
	(n + m + 1) / 2 + 1
}

struct Search<'a> {
	old: &'a [&'a str],
	new: &'a [&'a str],
	forward: Frontier,
	backward: Frontier,
	ops: Vec<LineOp>,
}

impl<'a> Search<'a> {
	fn new(old: &'a [&'a str], new: &'a [&'a str]) -> Self {
		let frontier = Frontier::new(max_d(old.len(), new.len()));
		Self {
			old,
			new,
			forward: frontier.clone(),
			backward: frontier,
			ops: Vec::with_capacity(old.len() + new.len()),
		}
	}

	/// Emits the script for `old[old_range]` against `new[new_range]`.
	///
	/// `max_cost` is only checked on the outermost region; the halves of an
	/// optimal split add up to its distance.
	fn conquer(&mut self, mut old_range: Range<usize>, mut new_range: Range<usize>, max_cost: usize) -> Result<(), DiffError> {
		let prefix = common_prefix(&self.old[old_range.clone()], &self.new[new_range.clone()]);
		self.keep(old_range.start..old_range.start + prefix);
		old_range.start += prefix;
		new_range.start += prefix;

		let suffix = common_suffix(&self.old[old_range.clone()], &self.new[new_range.clone()]);
		old_range.end -= suffix;
		new_range.end -= suffix;
		let tail = old_range.end..old_range.end + suffix;

		if old_range.is_empty() || new_range.is_empty() {
			if old_range.len() + new_range.len() > max_cost {
				return Err(DiffError::TooExpensive { limit: max_cost });
			}
			self.ops.extend(self.old[old_range].iter().map(|line| LineOp::removed(*line)));
			self.ops.extend(self.new[new_range].iter().map(|line| LineOp::inserted(*line)));
		} else {
			let (x, y) = self.middle_snake(old_range.clone(), new_range.clone(), max_cost)?;
			self.conquer(old_range.start..x, new_range.start..y, usize::MAX)?;
			self.conquer(x..old_range.end, y..new_range.end, usize::MAX)?;
		}

		self.keep(tail);
		Ok(())
	}

	fn keep(&mut self, range: Range<usize>) {
		self.ops.extend(self.old[range].iter().map(|line| LineOp::kept(*line)));
	}

	/// Finds a point on an optimal path through a region whose first and last
	/// lines differ on both sides. Returns absolute `(old, new)` indices.
	///
	/// Before round `d` the distance is known to be at least `2d - 1`, and at
	/// least `2d` once the forward half of the round found no overlap.
	fn middle_snake(&mut self, old_range: Range<usize>, new_range: Range<usize>, max_cost: usize) -> Result<(usize, usize), DiffError> {
		let (old, new) = (self.old, self.new);
		let old = &old[old_range.clone()];
		let new = &new[new_range.clone()];
		let (n, m) = (old.len(), new.len());
		let delta = n as isize - m as isize;
		let odd = delta & 1 == 1;
		let too_expensive = DiffError::TooExpensive { limit: max_cost };

		self.forward[1] = 0;
		self.backward[1] = 0;

		for d in 0..max_d(n, m) {
			if d > 0 && 2 * d - 1 > max_cost {
				return Err(too_expensive);
			}
			let di = d as isize;

			for k in (-di..=di).rev().step_by(2) {
				let mut x = if k == -di || (k != di && self.forward[k - 1] < self.forward[k + 1]) {
					self.forward[k + 1]
				} else {
					self.forward[k - 1] + 1
				};
				let mut y = (x as isize - k) as usize;
				let snake_start = (x, y);
				if x < n && y < m {
					let run = common_prefix(&old[x..], &new[y..]);
					x += run;
					y += run;
				}
				self.forward[k] = x;

				let inside = x <= n && y <= m;
				if odd && inside && (k - delta).abs() < di && x + self.backward[-(k - delta)] >= n {
					return Ok((old_range.start + snake_start.0, new_range.start + snake_start.1));
				}
			}

			if 2 * d > max_cost {
				return Err(too_expensive);
			}

			for k in (-di..=di).rev().step_by(2) {
				let mut x = if k == -di || (k != di && self.backward[k - 1] < self.backward[k + 1]) {
					self.backward[k + 1]
				} else {
					self.backward[k - 1] + 1
				};
				let mut y = (x as isize - k) as usize;
				if x < n && y < m {
					let run = common_suffix(&old[..n - x], &new[..m - y]);
					x += run;
					y += run;
				}
				self.backward[k] = x;

				let inside = x <= n && y <= m;
				if !odd && inside && (k - delta).abs() <= di && x + self.forward[-(k - delta)] >= n {
					return Ok((old_range.start + n - x, new_range.start + m - y));
				}
			}
		}

		// Unreachable for a region with both sides non-empty; splitting at
		// the end degrades to remove-all, insert-all.
		Ok((old_range.end, new_range.start))
	}
}

fn common_prefix(a: &[&str], b: &[&str]) -> usize {
	a.iter().zip(b).take_while(|(a, b)| a == b).count()
}

fn common_suffix(a: &[&str], b: &[&str]) -> usize {
	a.iter().rev().zip(b.iter().rev()).take_while(|(a, b)| a == b).count()
}

/// Moves insertions behind removals inside each change run, keeping the
/// relative order on each side.
fn canonicalize(ops: Vec<LineOp>) -> Vec<LineOp> {
	let mut out = Vec::with_capacity(ops.len());
	let mut inserted = Vec::new();
	for op in ops {
		match op.kind {
			LineOpKind::Removed => out.push(op),
			LineOpKind::Inserted => inserted.push(op),
			LineOpKind::Kept => {
				out.append(&mut inserted);
				out.push(op);
			}
		}
	}
	out.append(&mut inserted);
	out
}

#[cfg(test)]
mod tests;
