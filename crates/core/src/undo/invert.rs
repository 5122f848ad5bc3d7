//! Op inversion.

use super::op::Op;

impl Op {
    /// The op that undoes this one.
    ///
    /// Inserts become deletes of the same record and vice versa; updates swap
    /// `before` and `after`.
    pub fn inverse(&self) -> Op {
        match self {
            Op::Insert { table, record } => Op::Delete {
                table: table.clone(),
                id: record.id,
                record: record.clone(),
            },
            Op::Delete { table, record, .. } => Op::Insert {
                table: table.clone(),
                record: record.clone(),
            },
            Op::Update {
                table,
                id,
                before,
                after,
            } => Op::Update {
                table: table.clone(),
                id: *id,
                before: after.clone(),
                after: before.clone(),
            },
        }
    }
}

/// Invert a batch element by element, keeping the input order.
pub fn invert(ops: &[Op]) -> Vec<Op> {
    ops.iter().map(Op::inverse).collect()
}
