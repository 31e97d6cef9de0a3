use indexmap::IndexMap;

use crate::{
    bind::{Bind, IntoBind},
    ident::{Ident, IntoIdent},
};

/// One `VALUES` row, fields kept in insertion order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Row {
    values: IndexMap<Ident, Bind>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field<K, V>(&mut self, column: K, value: V) -> &mut Self
    where
        K: IntoIdent,
        V: IntoBind,
    {
        self.values.insert(column.into_ident(), value.into_bind());
        self
    }

    pub fn columns(&self) -> impl Iterator<Item = &Ident> {
        self.values.keys()
    }

    pub fn get(&self, column: &Ident) -> Option<&Bind> {
        self.values.get(column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Same columns, in any order.
    pub(crate) fn same_shape(&self, other: &Row) -> bool {
        self.len() == other.len() && other.columns().all(|column| self.values.contains_key(column))
    }
}

pub trait IntoRow {
    fn into_row(self) -> Row;
}

impl IntoRow for Row {
    fn into_row(self) -> Row {
        self
    }
}

impl<F> IntoRow for F
where
    F: FnOnce(&mut Row),
{
    fn into_row(self) -> Row {
        let mut row = Row::new();
        self(&mut row);
        row
    }
}

impl<K, V> IntoRow for Vec<(K, V)>
where
    K: IntoIdent,
    V: IntoBind,
{
    fn into_row(self) -> Row {
        let mut row = Row::new();
        for (column, value) in self {
            row.field(column, value);
        }
        row
    }
}

impl<K, V, const N: usize> IntoRow for [(K, V); N]
where
    K: IntoIdent,
    V: IntoBind,
{
    fn into_row(self) -> Row {
        let mut row = Row::new();
        for (column, value) in self {
            row.field(column, value);
        }
        row
    }
}
