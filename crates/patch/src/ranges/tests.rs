use proptest::prelude::*;

use super::*;

fn lines(texts: &[&str]) -> Option<Vec<String>> {
	Some(texts.iter().map(|t| t.to_string()).collect())
}

fn starts(tracker: &RangeTracker) -> Vec<(usize, usize)> {
	tracker.ranges().iter().map(|r| (r.start_line, r.count)).collect()
}

#[test]
fn adds_stay_sorted() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(10, 2, None);
	tracker.add_range(3, 1, None);
	tracker.add_range(6, 2, None);
	assert_eq!(starts(&tracker), vec![(3, 1), (6, 2), (10, 2)]);
	assert_eq!(tracker.line_count(), 5);
}

#[test]
#[cfg(debug_assertions)]
#[should_panic(expected = "moves it before line 0")]
fn shift_below_zero_is_caught() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(2, 1, None);
	tracker.shift_at_or_after(0, -3);
}

#[test]
#[cfg(not(debug_assertions))]
fn shift_below_zero_is_refused() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(2, 1, None);
	tracker.add_range(5, 1, None);
	tracker.shift_at_or_after(0, -3);
	assert_eq!(starts(&tracker), vec![(2, 1), (5, 1)]);
}

#[test]
fn adjacent_adds_merge() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(4, 1, None);
	tracker.add_range(5, 1, None);
	tracker.add_range(6, 1, None);
	assert_eq!(starts(&tracker), vec![(4, 3)]);
}

#[test]
fn adjacent_text_ranges_concatenate() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(0, 1, lines(&["a"]));
	tracker.add_range(1, 2, lines(&["b", "c"]));
	assert_eq!(tracker.range_at(0).unwrap().text, lines(&["a", "b", "c"]));
}

#[test]
fn zero_count_is_ignored() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(2, 0, None);
	assert!(tracker.is_empty());
}

#[test]
fn delete_at_exact_start_only() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(2, 3, None);
	assert!(tracker.delete_range_at(3).is_none());
	let removed = tracker.delete_range_at(2).unwrap();
	assert_eq!(removed.count, 3);
	assert!(tracker.is_empty());
}

#[test]
fn delete_from_splits_tail() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(1, 1, None);
	tracker.add_range(5, 1, None);
	tracker.add_range(9, 1, None);
	let tail = tracker.delete_ranges_from(5);
	assert_eq!(tail.len(), 2);
	assert_eq!(starts(&tracker), vec![(1, 1)]);
}

#[test]
fn shift_from_is_strict() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(2, 1, None);
	tracker.add_range(6, 1, None);
	tracker.shift_from(2, 3);
	assert_eq!(starts(&tracker), vec![(2, 1), (9, 1)]);
	tracker.shift_from(2, -2);
	assert_eq!(starts(&tracker), vec![(2, 1), (7, 1)]);
}

#[test]
fn shift_at_or_after_includes_start() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(0, 2, None);
	tracker.add_range(4, 1, None);
	tracker.shift_at_or_after(0, 1);
	assert_eq!(starts(&tracker), vec![(1, 2), (5, 1)]);
}

#[test]
fn containing_lookup() {
	let mut tracker = RangeTracker::new();
	tracker.add_range(3, 2, lines(&["x", "y"]));
	assert!(tracker.range_containing(2).is_none());
	assert_eq!(tracker.range_containing(4).unwrap().start_line, 3);
	assert!(tracker.range_containing(5).is_none());
}

#[derive(Debug, Clone)]
enum Op {
	Add { start: usize, count: usize },
	DeleteAt { nth: usize },
	DeleteFrom { start: usize },
	Shift { start: usize, offset: isize, inclusive: bool },
}

fn arb_op() -> impl Strategy<Value = Op> {
	prop_oneof![
		(0usize..64, 1usize..4).prop_map(|(start, count)| Op::Add { start, count }),
		(0usize..8).prop_map(|nth| Op::DeleteAt { nth }),
		(0usize..64).prop_map(|start| Op::DeleteFrom { start }),
		(0usize..64, -4isize..5, any::<bool>()).prop_map(|(start, offset, inclusive)| Op::Shift { start, offset, inclusive }),
	]
}

fn overlaps(tracker: &RangeTracker, start: usize, count: usize) -> bool {
	tracker
		.ranges()
		.iter()
		.any(|r| start < r.end_line() && r.start_line < start + count)
}

/// Whether shifting the tail from `pos` by `offset` keeps it clear of the head.
fn shift_fits(tracker: &RangeTracker, pos: usize, offset: isize) -> bool {
	let Some(first) = tracker.ranges().get(pos) else {
		return true;
	};
	let floor = pos.checked_sub(1).map_or(0, |i| tracker.ranges()[i].end_line());
	first.start_line as isize + offset >= floor as isize
}

proptest! {
	/// Valid operation sequences keep the tracker sorted and non-overlapping,
	/// and shifts never change the number of tracked lines.
	#[test]
	fn prop_invariants_hold(ops in prop::collection::vec(arb_op(), 0..48)) {
		let mut tracker = RangeTracker::new();
		for op in ops {
			let before = tracker.line_count();
			match op {
				Op::Add { start, count } => {
					if overlaps(&tracker, start, count) {
						continue;
					}
					tracker.add_range(start, count, None);
					prop_assert_eq!(tracker.line_count(), before + count);
				}
				Op::DeleteAt { nth } => {
					let Some(start) = tracker.ranges().get(nth).map(|r| r.start_line) else {
						continue;
					};
					let removed = tracker.delete_range_at(start).map(|r| r.count).unwrap_or(0);
					prop_assert_eq!(tracker.line_count(), before - removed);
				}
				Op::DeleteFrom { start } => {
					let tail: usize = tracker.delete_ranges_from(start).iter().map(|r| r.count).sum();
					prop_assert_eq!(tracker.line_count(), before - tail);
					prop_assert!(tracker.ranges().iter().all(|r| r.start_line < start));
				}
				Op::Shift { start, offset, inclusive } => {
					let pos = if inclusive {
						tracker.ranges().partition_point(|r| r.start_line < start)
					} else {
						tracker.ranges().partition_point(|r| r.start_line <= start)
					};
					if !shift_fits(&tracker, pos, offset) {
						continue;
					}
					let expected: Vec<usize> = tracker
						.ranges()
						.iter()
						.enumerate()
						.map(|(i, r)| if i >= pos { (r.start_line as isize + offset) as usize } else { r.start_line })
						.collect();
					if inclusive {
						tracker.shift_at_or_after(start, offset);
					} else {
						tracker.shift_from(start, offset);
					}
					let actual: Vec<usize> = tracker.ranges().iter().map(|r| r.start_line).collect();
					prop_assert_eq!(actual, expected);
					prop_assert_eq!(tracker.line_count(), before);
				}
			}
			prop_assert!(tracker.is_consistent());
		}
	}
}
