//! Table schema used by the undo log.
//!
//! The undo log needs to know two things about a table that storage does
//! not tell it: which columns reference other rows (to order restores and
//! deletes around referential integrity) and whether a table is a primary
//! entity with its own detail route (to move the UI off a deleted record).
//!
//! Tables not described here fall back to the `_id` column-name convention
//! for foreign keys and are never treated as primary entities.

use serde_json::Value;

/// Column-name suffix treated as a foreign key for tables absent from the schema.
pub const FOREIGN_KEY_SUFFIX: &str = "_id";

/// A single foreign-key column and the table it points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub column: &'static str,
    pub references: &'static str,
}

/// Description of one table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSchema {
    pub name: &'static str,
    /// Every writable column, including `id`.
    pub columns: &'static [&'static str],
    pub foreign_keys: &'static [ForeignKey],
    /// List route for primary-entity tables; detail routes are `{list_route}/{id}`.
    pub list_route: Option<&'static str>,
}

impl TableSchema {
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(&column)
    }

    pub fn foreign_key(&self, column: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.column == column)
    }
}

/// A set of table descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub tables: &'static [TableSchema],
}

pub const DANCES: TableSchema = TableSchema {
    name: "dances",
    columns: &[
        "id",
        "title",
        "choreographer",
        "formation",
        "notes",
        "created_at",
        "updated_at",
    ],
    foreign_keys: &[],
    list_route: Some("/dances"),
};

pub const PROGRAMS: TableSchema = TableSchema {
    name: "programs",
    columns: &[
        "id",
        "title",
        "event_date",
        "venue",
        "notes",
        "created_at",
        "updated_at",
    ],
    foreign_keys: &[],
    list_route: Some("/programs"),
};

pub const PROGRAMS_DANCES: TableSchema = TableSchema {
    name: "programs_dances",
    columns: &["id", "program_id", "dance_id", "position", "created_at"],
    foreign_keys: &[
        ForeignKey {
            column: "program_id",
            references: "programs",
        },
        ForeignKey {
            column: "dance_id",
            references: "dances",
        },
    ],
    list_route: None,
};

impl Schema {
    /// The built-in schema for the repertoire tables.
    pub const REPERTOIRE: Schema = Schema {
        tables: &[DANCES, PROGRAMS, PROGRAMS_DANCES],
    };

    /// Look up a table description by name.
    pub fn table(&self, name: &str) -> Option<&'static TableSchema> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Whether `column` of `table` references another row.
    pub fn is_foreign_key(&self, table: &str, column: &str) -> bool {
        match self.table(table) {
            Some(t) => t.foreign_key(column).is_some(),
            None => column != "id" && column.ends_with(FOREIGN_KEY_SUFFIX),
        }
    }

    /// Whether a row payload references another row, i.e. carries a
    /// non-null value in at least one foreign-key column.
    pub fn is_dependent<'a, I>(&self, table: &str, payload: I) -> bool
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        payload
            .into_iter()
            .any(|(column, value)| !value.is_null() && self.is_foreign_key(table, column))
    }

    /// Ordering rank of a row payload with respect to referential integrity.
    ///
    /// Non-dependent payloads rank 0. A dependent payload ranks one above the
    /// deepest table it references, so a grandchild row outranks a child row.
    pub fn dependency_rank<'a, I>(&self, table: &str, payload: I) -> usize
    where
        I: IntoIterator<Item = (&'a String, &'a Value)>,
    {
        let mut rank = 0;
        for (column, value) in payload {
            if value.is_null() || !self.is_foreign_key(table, column) {
                continue;
            }
            let referenced_depth = self
                .table(table)
                .and_then(|t| t.foreign_key(column))
                .map(|fk| self.table_depth(fk.references, table, self.tables.len()))
                .unwrap_or(0);
            rank = rank.max(1 + referenced_depth);
        }
        rank
    }

    /// Length of the longest foreign-key chain below `table`.
    ///
    /// References back to `origin` and chains longer than the table count
    /// (cycles) are cut.
    fn table_depth(&self, table: &str, origin: &str, budget: usize) -> usize {
        if budget == 0 {
            return 0;
        }
        let Some(t) = self.table(table) else {
            return 0;
        };
        t.foreign_keys
            .iter()
            .filter(|fk| fk.references != table && fk.references != origin)
            .map(|fk| 1 + self.table_depth(fk.references, origin, budget - 1))
            .max()
            .unwrap_or(0)
    }

    /// List route of a primary-entity table.
    pub fn list_route(&self, table: &str) -> Option<&'static str> {
        self.table(table).and_then(|t| t.list_route)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::REPERTOIRE
    }
}
