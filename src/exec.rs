//! Running built statements on mysql through sqlx.

use std::{hash::Hash, num::NonZeroUsize};

use futures_util::{
    StreamExt, TryStreamExt,
    future::{self, BoxFuture},
    stream::{self, BoxStream},
};
use indexmap::IndexMap;
use sqlx::{
    Arguments, Decode, Executor, MySql, MySqlPool, Row as _, Transaction, Type,
    mysql::{MySqlArguments, MySqlQueryResult, MySqlRow},
};

use crate::{
    Bind, Delete, Insert, IntoCondition, IntoBind, Prepared, Select, Update,
    error::{Error, Result},
};

type MySqlQuery<'q> = sqlx::query::Query<'q, MySql, MySqlArguments>;

impl Prepared {
    /// Encodes the bindings in placeholder order.
    pub fn arguments(&self) -> Result<MySqlArguments> {
        let mut arguments = MySqlArguments::default();
        for (index, bind) in self.bindings().iter().enumerate() {
            let added = match bind.clone() {
                Bind::Null => arguments.add(None::<String>),
                Bind::String(value) => arguments.add(value),
                Bind::Bool(value) => arguments.add(value),
                Bind::F32(value) => arguments.add(value),
                Bind::F64(value) => arguments.add(value),
                Bind::I8(value) => arguments.add(value),
                Bind::I16(value) => arguments.add(value),
                Bind::I32(value) => arguments.add(value),
                Bind::I64(value) => arguments.add(value),
                Bind::U8(value) => arguments.add(value),
                Bind::U16(value) => arguments.add(value),
                Bind::U32(value) => arguments.add(value),
                Bind::U64(value) => arguments.add(value),
                #[cfg(feature = "chrono")]
                Bind::NaiveDateTime(value) => arguments.add(value),
                #[cfg(feature = "chrono")]
                Bind::NaiveDate(value) => arguments.add(value),
                #[cfg(feature = "chrono")]
                Bind::DateTimeUtc(value) => arguments.add(value),
                #[cfg(feature = "time")]
                Bind::PrimitiveDateTime(value) => arguments.add(value),
                #[cfg(feature = "time")]
                Bind::OffsetDateTime(value) => arguments.add(value),
                #[cfg(feature = "time")]
                Bind::Date(value) => arguments.add(value),
                #[cfg(feature = "uuid")]
                Bind::Uuid(value) => arguments.add(value),
                #[cfg(feature = "json")]
                Bind::Json(value) => arguments.add(value),
            };
            added.map_err(|error| Error::Encode {
                index,
                message: error.to_string(),
            })?;
        }
        Ok(arguments)
    }

    fn query(&self) -> Result<MySqlQuery<'_>> {
        Ok(sqlx::query_with(self.sql(), self.arguments()?))
    }

    pub async fn execute<'c, E>(&self, executor: E) -> Result<MySqlQueryResult>
    where
        E: Executor<'c, Database = MySql>,
    {
        Ok(self.query()?.execute(executor).await?)
    }

    pub async fn fetch_all<'c, E>(&self, executor: E) -> Result<Vec<MySqlRow>>
    where
        E: Executor<'c, Database = MySql>,
    {
        Ok(self.query()?.fetch_all(executor).await?)
    }

    /// The first row, if any.
    pub async fn fetch_row<'c, E>(&self, executor: E) -> Result<Option<MySqlRow>>
    where
        E: Executor<'c, Database = MySql>,
    {
        Ok(self.query()?.fetch_optional(executor).await?)
    }

    /// The first column of the first row.
    pub async fn fetch_one<'c, E, T>(&self, executor: E) -> Result<Option<T>>
    where
        E: Executor<'c, Database = MySql>,
        T: for<'r> Decode<'r, MySql> + Type<MySql>,
    {
        match self.fetch_row(executor).await? {
            Some(row) => Ok(Some(row.try_get(0)?)),
            None => Ok(None),
        }
    }

    /// The first column of every row.
    pub async fn fetch_column<'c, E, T>(&self, executor: E) -> Result<Vec<T>>
    where
        E: Executor<'c, Database = MySql>,
        T: for<'r> Decode<'r, MySql> + Type<MySql>,
    {
        self.fetch_all(executor)
            .await?
            .iter()
            .map(|row| row.try_get(0).map_err(Error::from))
            .collect()
    }

    /// First column to second column, in row order. A repeated key keeps its
    /// first position and takes the latest value.
    pub async fn fetch_pairs<'c, E, K, V>(&self, executor: E) -> Result<IndexMap<K, V>>
    where
        E: Executor<'c, Database = MySql>,
        K: for<'r> Decode<'r, MySql> + Type<MySql> + Hash + Eq,
        V: for<'r> Decode<'r, MySql> + Type<MySql>,
    {
        let mut pairs = IndexMap::new();
        for row in self.fetch_all(executor).await? {
            pairs.insert(row.try_get(0)?, row.try_get(1)?);
        }
        Ok(pairs)
    }

    /// First column to the whole row, in row order. The key column stays in
    /// the row.
    pub async fn fetch_assoc<'c, E, K>(&self, executor: E) -> Result<IndexMap<K, MySqlRow>>
    where
        E: Executor<'c, Database = MySql>,
        K: for<'r> Decode<'r, MySql> + Type<MySql> + Hash + Eq,
    {
        let mut rows = IndexMap::new();
        for row in self.fetch_all(executor).await? {
            rows.insert(row.try_get(0)?, row);
        }
        Ok(rows)
    }

    /// Streams the rows in one pass over the cursor. Dropping the stream
    /// releases it.
    pub fn fetch_lazy<'e, 'c: 'e, E>(&'e self, executor: E) -> BoxStream<'e, Result<MySqlRow>>
    where
        E: 'e + Executor<'c, Database = MySql>,
    {
        match self.query() {
            Ok(query) => query.fetch(executor).map_err(Error::from).boxed(),
            Err(error) => stream::once(future::ready(Err(error))).boxed(),
        }
    }

    /// Same as [`Prepared::fetch_lazy`] in batches of `size` rows, the last
    /// batch may be shorter. On an error the rows read so far are sent as a
    /// last batch, then the error ends the stream.
    pub fn fetch_chunks<'e, 'c: 'e, E>(
        &'e self,
        executor: E,
        size: NonZeroUsize,
    ) -> BoxStream<'e, Result<Vec<MySqlRow>>>
    where
        E: 'e + Executor<'c, Database = MySql>,
    {
        chunked(self.fetch_lazy(executor), size)
    }
}

struct Chunks<'e, T> {
    rows: BoxStream<'e, Result<T>>,
    failed: Option<Error>,
    done: bool,
}

fn chunked<'e, T>(
    rows: BoxStream<'e, Result<T>>,
    size: NonZeroUsize,
) -> BoxStream<'e, Result<Vec<T>>>
where
    T: Send + 'e,
{
    let state = Chunks {
        rows,
        failed: None,
        done: false,
    };
    stream::unfold(state, move |mut state| async move {
        if state.done {
            return None;
        }
        let mut chunk = Vec::with_capacity(size.get());
        while state.failed.is_none() && chunk.len() < size.get() {
            match state.rows.next().await {
                Some(Ok(row)) => chunk.push(row),
                Some(Err(error)) => state.failed = Some(error),
                None => break,
            }
        }
        if chunk.is_empty() {
            state.done = true;
            return state.failed.take().map(|error| (Err(error), state));
        }
        if chunk.len() < size.get() && state.failed.is_none() {
            state.done = true;
        }
        Some((Ok(chunk), state))
    })
    .boxed()
}

impl Select {
    /// Renders this select once, ready for the streaming fetch modes:
    /// `select.prepare()?.fetch_lazy(&pool)`.
    pub fn prepare(&self) -> Result<Prepared> {
        Ok(Prepared::from_parts(self.to_sql()?, self.bindings()?))
    }

    pub async fn fetch_all<'c, E>(&self, executor: E) -> Result<Vec<MySqlRow>>
    where
        E: Executor<'c, Database = MySql>,
    {
        self.prepare()?.fetch_all(executor).await
    }

    pub async fn fetch_row<'c, E>(&self, executor: E) -> Result<Option<MySqlRow>>
    where
        E: Executor<'c, Database = MySql>,
    {
        self.prepare()?.fetch_row(executor).await
    }

    /// The first column of the first row, selecting only `field` when given.
    pub async fn fetch_one<'c, E, T>(&self, executor: E, field: Option<&str>) -> Result<Option<T>>
    where
        E: Executor<'c, Database = MySql>,
        T: for<'r> Decode<'r, MySql> + Type<MySql>,
    {
        match field {
            Some(field) => self.projected(field).prepare()?.fetch_one(executor).await,
            None => self.prepare()?.fetch_one(executor).await,
        }
    }

    /// The first column of every row, selecting only `field` when given.
    pub async fn fetch_column<'c, E, T>(&self, executor: E, field: Option<&str>) -> Result<Vec<T>>
    where
        E: Executor<'c, Database = MySql>,
        T: for<'r> Decode<'r, MySql> + Type<MySql>,
    {
        match field {
            Some(field) => self.projected(field).prepare()?.fetch_column(executor).await,
            None => self.prepare()?.fetch_column(executor).await,
        }
    }

    pub async fn fetch_pairs<'c, E, K, V>(&self, executor: E) -> Result<IndexMap<K, V>>
    where
        E: Executor<'c, Database = MySql>,
        K: for<'r> Decode<'r, MySql> + Type<MySql> + Hash + Eq,
        V: for<'r> Decode<'r, MySql> + Type<MySql>,
    {
        self.prepare()?.fetch_pairs(executor).await
    }

    pub async fn fetch_assoc<'c, E, K>(&self, executor: E) -> Result<IndexMap<K, MySqlRow>>
    where
        E: Executor<'c, Database = MySql>,
        K: for<'r> Decode<'r, MySql> + Type<MySql> + Hash + Eq,
    {
        self.prepare()?.fetch_assoc(executor).await
    }

    /// The first row matching this select and `condition`.
    pub async fn find<'c, E, C>(&self, executor: E, condition: C) -> Result<Option<MySqlRow>>
    where
        E: Executor<'c, Database = MySql>,
        C: IntoCondition,
    {
        self.filtered(condition).fetch_row(executor).await
    }

    /// Shorthand for `find` on the `id` column.
    pub async fn find_id<'c, E, V>(&self, executor: E, id: V) -> Result<Option<MySqlRow>>
    where
        E: Executor<'c, Database = MySql>,
        V: IntoBind,
    {
        self.find(executor, ("id", id.into_bind())).await
    }

    /// `count(*)`, or `count(distinct field)`, over the current conditions.
    pub async fn fetch_count<'c, E>(&self, executor: E, distinct: Option<&str>) -> Result<i64>
    where
        E: Executor<'c, Database = MySql>,
    {
        let count = self.counted(distinct).fetch_one(executor, None).await?;
        Ok(count.unwrap_or(0))
    }
}

impl Insert {
    /// Returns the generated id, or `None` when there was no row to insert.
    pub async fn execute<'c, E>(&self, executor: E) -> Result<Option<u64>>
    where
        E: Executor<'c, Database = MySql>,
    {
        let Some(prepared) = Prepared::new(self)? else {
            return Ok(None);
        };
        let result = prepared.execute(executor).await?;
        Ok(Some(result.last_insert_id()))
    }
}

impl Update {
    /// Returns the number of affected rows.
    pub async fn execute<'c, E>(&self, executor: E) -> Result<u64>
    where
        E: Executor<'c, Database = MySql>,
    {
        let prepared = Prepared::from_parts(self.to_sql()?, self.bindings()?);
        Ok(prepared.execute(executor).await?.rows_affected())
    }
}

impl Delete {
    /// Returns the number of affected rows.
    pub async fn execute<'c, E>(&self, executor: E) -> Result<u64>
    where
        E: Executor<'c, Database = MySql>,
    {
        let prepared = Prepared::from_parts(self.to_sql()?, self.bindings()?);
        Ok(prepared.execute(executor).await?.rows_affected())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOutcome {
    Committed,
    RolledBack,
}

/// A mysql pool with the transaction wrapper on top.
#[derive(Debug, Clone)]
pub struct Db {
    pool: MySqlPool,
}

impl Db {
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = MySqlPool::connect(url).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: MySqlPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Runs `handler` inside a transaction.
    ///
    /// `Ok(true)` commits. `Ok(false)` and `Err(_)` roll back, an error is
    /// logged and not returned. Errors from begin, commit or rollback are
    /// returned.
    ///
    /// ```ignore
    /// db.transaction(|tx| Box::pin(async move {
    ///     let mut update = quarry::update("accounts");
    ///     update.set("balance", 0).and_where(("id", 1));
    ///     Ok(update.execute(&mut **tx).await? == 1)
    /// }))
    /// .await?;
    /// ```
    pub async fn transaction<F>(&self, handler: F) -> Result<TxOutcome>
    where
        F: for<'t> FnOnce(&'t mut Transaction<'static, MySql>) -> BoxFuture<'t, Result<bool>>,
    {
        let mut tx = self.pool.begin().await?;
        let outcome = settle(handler(&mut tx).await);
        match outcome {
            TxOutcome::Committed => tx.commit().await?,
            TxOutcome::RolledBack => tx.rollback().await?,
        }
        Ok(outcome)
    }
}

fn settle(result: Result<bool>) -> TxOutcome {
    match result {
        Ok(true) => TxOutcome::Committed,
        Ok(false) => {
            tracing::debug!("transaction handler declined, rolling back");
            TxOutcome::RolledBack
        }
        Err(error) => {
            tracing::warn!(%error, "transaction handler failed, rolling back");
            TxOutcome::RolledBack
        }
    }
}
