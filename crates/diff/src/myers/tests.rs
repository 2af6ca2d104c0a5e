use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::lines::{edit_cost, source_lines, split_lines, target_lines};

/// Edit distance from an O(N·M) LCS table, for cross-checking minimality.
fn lcs_distance(old: &[String], new: &[String]) -> usize {
	let mut table = vec![vec![0usize; new.len() + 1]; old.len() + 1];
	for i in (0..old.len()).rev() {
		for j in (0..new.len()).rev() {
			table[i][j] = if old[i] == new[j] {
				table[i + 1][j + 1] + 1
			} else {
				table[i + 1][j].max(table[i][j + 1])
			};
		}
	}
	old.len() + new.len() - 2 * table[0][0]
}

#[test]
fn single_line_replacement() {
	let ops = edit_script(&["a", "b", "c"], &["a", "x", "c"]);
	assert_eq!(
		ops,
		vec![LineOp::kept("a"), LineOp::removed("b"), LineOp::inserted("x"), LineOp::kept("c")]
	);
}

#[test]
fn empty_old_is_all_inserted() {
	let ops = edit_script::<&str, &str>(&[], &["x", "y"]);
	assert_eq!(ops, vec![LineOp::inserted("x"), LineOp::inserted("y")]);
}

#[test]
fn empty_new_is_all_removed() {
	let ops = edit_script::<&str, &str>(&["x", "y"], &[]);
	assert_eq!(ops, vec![LineOp::removed("x"), LineOp::removed("y")]);
}

#[test]
fn identical_is_all_kept() {
	let lines = ["fn main() {", "}", ""];
	let ops = edit_script(&lines, &lines);
	assert!(ops.iter().all(|op| op.kind == LineOpKind::Kept));
	assert_eq!(ops.len(), 3);
}

#[test]
fn both_empty() {
	assert!(edit_script::<&str, &str>(&[], &[]).is_empty());
}

#[test]
fn trailing_newline_is_a_change() {
	let ops = edit_script(&split_lines("a"), &split_lines("a\n"));
	assert_eq!(ops, vec![LineOp::kept("a"), LineOp::inserted("")]);
}

#[test]
fn removals_precede_insertions_in_a_run() {
	let ops = edit_script(&["a", "b", "c", "d"], &["a", "x", "y", "d"]);
	let kinds: Vec<_> = ops.iter().map(|op| op.kind).collect();
	assert_eq!(
		kinds,
		vec![
			LineOpKind::Kept,
			LineOpKind::Removed,
			LineOpKind::Removed,
			LineOpKind::Inserted,
			LineOpKind::Inserted,
			LineOpKind::Kept,
		]
	);
}

#[test]
fn interleaved_changes_keep_shared_lines() {
	let old = ["a", "b", "c", "a", "b", "b", "a"];
	let new = ["c", "b", "a", "b", "a", "c"];
	let ops = edit_script(&old, &new);
	assert_eq!(edit_cost(&ops), 5);
	assert_eq!(source_lines(&ops), old);
	assert_eq!(target_lines(&ops), new);
}

#[test]
fn bounded_search_gives_up() {
	let err = edit_script_bounded(&["a", "b", "c"], &["x", "y", "z"], 4).unwrap_err();
	assert_eq!(err, DiffError::TooExpensive { limit: 4 });
	assert!(edit_script_bounded(&["a", "b", "c"], &["x", "y", "z"], 6).is_ok());
}

#[test]
fn bounded_search_on_empty_side() {
	assert!(edit_script_bounded::<&str, &str>(&[], &["x", "y"], 1).is_err());
	assert!(edit_script_bounded::<&str, &str>(&[], &["x", "y"], 2).is_ok());
}

#[test]
fn large_disjoint_inputs() {
	let old: Vec<String> = (0..3000).map(|i| format!("old {i}")).collect();
	let new: Vec<String> = (0..3000).map(|i| format!("new {i}")).collect();
	let ops = edit_script(&old, &new);
	assert_eq!(edit_cost(&ops), 6000);
	assert!(ops[..3000].iter().all(|op| op.kind == LineOpKind::Removed));
	assert!(ops[3000..].iter().all(|op| op.kind == LineOpKind::Inserted));
	assert_eq!(
		edit_script_bounded(&old, &new, 5999),
		Err(DiffError::TooExpensive { limit: 5999 })
	);
}

#[test]
fn scattered_edits_in_a_long_file() {
	let old: Vec<String> = (0..5000).map(|i| format!("line {i}")).collect();
	let new: Vec<String> = old
		.iter()
		.enumerate()
		.map(|(i, line)| if i % 50 == 7 { format!("{line} changed") } else { line.clone() })
		.collect();
	let ops = edit_script(&old, &new);
	assert_eq!(edit_cost(&ops), 200);
	assert_eq!(source_lines(&ops), old.iter().map(String::as_str).collect::<Vec<_>>());
	assert_eq!(target_lines(&ops), new.iter().map(String::as_str).collect::<Vec<_>>());
	assert_eq!(edit_script_bounded(&old, &new, 200).unwrap(), ops);
}

#[test]
fn ops_serialize_as_kind_and_text() {
	let json = serde_json::to_string(&LineOp::removed("b")).unwrap();
	assert_eq!(json, r#"{"kind":"removed","text":"b"}"#);
	let op: LineOp = serde_json::from_str(r#"{"kind":"inserted","text":"x"}"#).unwrap();
	assert_eq!(op, LineOp::inserted("x"));
}

fn arb_lines() -> impl Strategy<Value = Vec<String>> {
	prop::collection::vec("[abc]{0,1}", 0..24)
}

proptest! {
	/// Removing insertions yields the original; removing removals yields the target.
	#[test]
	fn prop_reconstruction(old in arb_lines(), new in arb_lines()) {
		let ops = edit_script(&old, &new);
		prop_assert_eq!(source_lines(&ops), old.iter().map(String::as_str).collect::<Vec<_>>());
		prop_assert_eq!(target_lines(&ops), new.iter().map(String::as_str).collect::<Vec<_>>());
	}

	/// The script length matches the LCS-derived edit distance.
	#[test]
	fn prop_minimal(old in arb_lines(), new in arb_lines()) {
		let ops = edit_script(&old, &new);
		prop_assert_eq!(edit_cost(&ops), lcs_distance(&old, &new));
	}

	/// No insertion is ever directly followed by a removal.
	#[test]
	fn prop_canonical_runs(old in arb_lines(), new in arb_lines()) {
		let ops = edit_script(&old, &new);
		for pair in ops.windows(2) {
			prop_assert!(!(pair[0].kind == LineOpKind::Inserted && pair[1].kind == LineOpKind::Removed));
		}
	}
}
