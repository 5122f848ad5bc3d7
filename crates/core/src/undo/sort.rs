//! Referential-integrity ordering of a batch.
//!
//! Inserts are ordered referents-first and deletes referrers-first. Each op
//! kind keeps the positions it occupied in the input; only the ops within a
//! kind are rearranged, and the rearrangement is stable. Updates are never
//! moved.

use crate::schema::Schema;

use super::op::{Op, OpKind};

/// Order a batch so that storage can satisfy its foreign-key constraints.
///
/// Ranks come from [`Schema::dependency_rank`]: a batch of one parent and
/// its direct join rows sorts all non-dependent inserts before dependent
/// ones, and all dependent deletes before non-dependent ones.
pub fn sort_dependencies(ops: Vec<Op>, schema: &Schema) -> Vec<Op> {
    let mut slots: Vec<Option<Op>> = ops.into_iter().map(Some).collect();
    reorder_kind(&mut slots, OpKind::Insert, schema, false);
    reorder_kind(&mut slots, OpKind::Delete, schema, true);
    slots.into_iter().flatten().collect()
}

fn reorder_kind(slots: &mut [Option<Op>], kind: OpKind, schema: &Schema, referrers_first: bool) {
    let positions: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, op)| op.as_ref().is_some_and(|op| op.kind() == kind))
        .map(|(i, _)| i)
        .collect();
    if positions.len() < 2 {
        return;
    }

    let mut ranked: Vec<(usize, Op)> = positions
        .iter()
        .filter_map(|&i| slots[i].take())
        .map(|op| (schema.dependency_rank(op.table(), op.payload()), op))
        .collect();
    if referrers_first {
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
    } else {
        ranked.sort_by(|a, b| a.0.cmp(&b.0));
    }

    for (slot, (_, op)) in positions.into_iter().zip(ranked) {
        slots[slot] = Some(op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::undo::op::{Columns, Record};
    use serde_json::{json, Value};

    fn columns(value: Value) -> Columns {
        match value {
            Value::Object(map) => map,
            _ => panic!("columns must be an object"),
        }
    }

    fn program(id: i64) -> Record {
        Record::new(id, columns(json!({"title": format!("Program {id}")})))
    }

    fn dance(id: i64) -> Record {
        Record::new(id, columns(json!({"title": format!("Dance {id}")})))
    }

    fn join_row(id: i64, program_id: i64, dance_id: i64) -> Record {
        Record::new(
            id,
            columns(json!({"program_id": program_id, "dance_id": dance_id, "position": 1})),
        )
    }

    fn labels(ops: &[Op]) -> Vec<String> {
        ops.iter()
            .map(|op| format!("{}:{}:{}", op.kind(), op.table(), op.id()))
            .collect()
    }

    #[test]
    fn inserts_put_referents_first() {
        let ops = vec![
            Op::insert("programs_dances", join_row(12, 5, 3)),
            Op::insert("programs", program(5)),
        ];
        let sorted = sort_dependencies(ops, &Schema::REPERTOIRE);
        assert_eq!(
            labels(&sorted),
            ["insert:programs:5", "insert:programs_dances:12"]
        );
    }

    #[test]
    fn deletes_put_referrers_first() {
        let ops = vec![
            Op::delete("programs", program(5)),
            Op::delete("programs_dances", join_row(12, 5, 3)),
            Op::delete("programs_dances", join_row(13, 5, 4)),
        ];
        let sorted = sort_dependencies(ops, &Schema::REPERTOIRE);
        assert_eq!(
            labels(&sorted),
            [
                "delete:programs_dances:12",
                "delete:programs_dances:13",
                "delete:programs:5",
            ]
        );
    }

    #[test]
    fn sort_is_stable_within_rank() {
        let ops = vec![
            Op::insert("programs_dances", join_row(14, 5, 1)),
            Op::insert("dances", dance(1)),
            Op::insert("programs_dances", join_row(12, 5, 2)),
            Op::insert("programs", program(5)),
        ];
        let sorted = sort_dependencies(ops, &Schema::REPERTOIRE);
        assert_eq!(
            labels(&sorted),
            [
                "insert:dances:1",
                "insert:programs:5",
                "insert:programs_dances:14",
                "insert:programs_dances:12",
            ]
        );
    }

    #[test]
    fn updates_and_kind_positions_are_preserved() {
        let update = Op::Update {
            table: "programs".to_string(),
            id: 5,
            before: columns(json!({"title": "Old"})),
            after: columns(json!({"title": "New"})),
        };
        let ops = vec![
            Op::insert("programs_dances", join_row(12, 5, 3)),
            update.clone(),
            Op::delete("programs", program(6)),
            Op::insert("dances", dance(3)),
            Op::delete("programs_dances", join_row(20, 6, 3)),
        ];
        let sorted = sort_dependencies(ops, &Schema::REPERTOIRE);
        assert_eq!(
            labels(&sorted),
            [
                "insert:dances:3",
                "update:programs:5",
                "delete:programs_dances:20",
                "insert:programs_dances:12",
                "delete:programs:6",
            ]
        );
        assert_eq!(sorted[1], update);
    }

    #[test]
    fn every_permutation_puts_non_dependent_inserts_first() {
        let base = vec![
            Op::insert("programs", program(5)),
            Op::insert("dances", dance(3)),
            Op::insert("programs_dances", join_row(12, 5, 3)),
            Op::insert("programs_dances", join_row(13, 5, 4)),
        ];
        for permutation in permutations(base.len()) {
            let ops: Vec<Op> = permutation.iter().map(|&i| base[i].clone()).collect();
            let sorted = sort_dependencies(ops, &Schema::REPERTOIRE);
            let first_dependent = sorted
                .iter()
                .position(|op| op.table() == "programs_dances")
                .unwrap();
            assert!(
                sorted[first_dependent..]
                    .iter()
                    .all(|op| op.table() == "programs_dances"),
                "non-dependent insert after dependent one in {:?}",
                labels(&sorted)
            );
        }
    }

    #[test]
    fn every_permutation_puts_dependent_deletes_first() {
        let base = vec![
            Op::delete("programs", program(5)),
            Op::delete("dances", dance(3)),
            Op::delete("programs_dances", join_row(12, 5, 3)),
            Op::delete("programs_dances", join_row(13, 5, 4)),
        ];
        for permutation in permutations(base.len()) {
            let ops: Vec<Op> = permutation.iter().map(|&i| base[i].clone()).collect();
            let sorted = sort_dependencies(ops, &Schema::REPERTOIRE);
            assert!(sorted[..2].iter().all(|op| op.table() == "programs_dances"));
            assert!(sorted[2..].iter().all(|op| op.table() != "programs_dances"));
        }
    }

    #[test]
    fn null_reference_counts_as_non_dependent() {
        let orphan = Record::new(
            30,
            columns(json!({"program_id": null, "dance_id": null, "position": 1})),
        );
        let ops = vec![
            Op::insert("programs_dances", join_row(12, 5, 3)),
            Op::insert("programs_dances", orphan),
        ];
        let sorted = sort_dependencies(ops, &Schema::REPERTOIRE);
        assert_eq!(sorted[0].id(), 30);
    }

    fn permutations(n: usize) -> Vec<Vec<usize>> {
        fn go(prefix: &mut Vec<usize>, rest: &mut Vec<usize>, out: &mut Vec<Vec<usize>>) {
            if rest.is_empty() {
                out.push(prefix.clone());
                return;
            }
            for i in 0..rest.len() {
                let item = rest.remove(i);
                prefix.push(item);
                go(prefix, rest, out);
                prefix.pop();
                rest.insert(i, item);
            }
        }
        let mut out = Vec::new();
        go(&mut Vec::new(), &mut (0..n).collect(), &mut out);
        out
    }
}
