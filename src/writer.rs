use std::fmt::Write;

use crate::{
    bind::Binds,
    error::{Error, Result},
    query::Query,
};

pub(crate) trait FormatWriter {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()>;
}

/// Appends the bindings in the same order `format_writer` emits placeholders.
pub(crate) trait PushBindings {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()>;
}

pub(crate) struct FormatContext<'a, W: Write> {
    pub(crate) writer: &'a mut W,
}

impl<'a, W: Write> FormatContext<'a, W> {
    pub fn new(writer: &'a mut W) -> Self {
        Self { writer }
    }

    pub(crate) fn write_placeholder(&mut self) -> Result<()> {
        self.writer.write_char('?')?;
        Ok(())
    }

    /// Writes `?, ?, ?` for a list. An empty list is written as `NULL`
    /// so `IN (NULL)` stays valid sql without binding anything.
    pub(crate) fn write_placeholders(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            self.writer.write_str("NULL")?;
            return Ok(());
        }
        for index in 0..count {
            if index > 0 {
                self.writer.write_str(", ")?;
            }
            self.write_placeholder()?;
        }
        Ok(())
    }

    pub(crate) fn write_joined<'i, I, T>(&mut self, items: I, separator: &str) -> Result<()>
    where
        I: IntoIterator<Item = &'i T>,
        T: FormatWriter + 'i,
    {
        for (index, item) in items.into_iter().enumerate() {
            if index > 0 {
                self.writer.write_str(separator)?;
            }
            item.format_writer(self)?;
        }
        Ok(())
    }

    /// Same as `write_joined` with every item wrapped in parentheses.
    pub(crate) fn write_grouped<'i, I, T>(&mut self, items: I, separator: &str) -> Result<()>
    where
        I: IntoIterator<Item = &'i T>,
        T: FormatWriter + 'i,
    {
        for (index, item) in items.into_iter().enumerate() {
            if index > 0 {
                self.writer.write_str(separator)?;
            }
            self.writer.write_char('(')?;
            item.format_writer(self)?;
            self.writer.write_char(')')?;
        }
        Ok(())
    }

    /// Writes the sql of an embedded query as is.
    pub(crate) fn write_subquery(&mut self, query: &dyn Query) -> Result<()> {
        let sql = query.to_sql()?.ok_or(Error::EmptySubquery)?;
        self.writer.write_str(&sql)?;
        Ok(())
    }
}

impl<T> FormatWriter for &T
where
    T: FormatWriter + ?Sized,
{
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        (**self).format_writer(context)
    }
}

pub(crate) fn to_string<T>(value: &T) -> Result<String>
where
    T: FormatWriter + ?Sized,
{
    let size_hint = 64;
    let mut str = String::with_capacity(size_hint);
    let mut context = FormatContext::new(&mut str);
    value.format_writer(&mut context)?;
    Ok(str)
}

pub(crate) fn collect_bindings<T>(value: &T) -> Result<Binds>
where
    T: PushBindings + ?Sized,
{
    let mut binds = Binds::None;
    value.push_bindings(&mut binds)?;
    Ok(binds)
}
