use std::fmt::Write;

use crate::{
    Binds,
    error::{Error, Result},
    ident::{Ident, IntoIdent},
    set::{IntoSet, SetExpr},
    writer::{FormatContext, FormatWriter, PushBindings},
};

use super::cond::{Condition, IntoCondition};

/// `CASE WHEN (...) THEN ? ... ELSE ? END AS alias`
///
/// A subquery branch is written without parentheses, which suits raw
/// expressions such as `raw("price * ?").arg(2)`.
#[derive(Debug, Clone)]
pub struct Case {
    alias: Ident,
    whens: Vec<(Condition, SetExpr)>,
    otherwise: Option<SetExpr>,
}

impl Case {
    pub fn new<T: IntoIdent>(alias: T) -> Self {
        Self {
            alias: alias.into_ident(),
            whens: Vec::new(),
            otherwise: None,
        }
    }

    pub fn when<C, V>(mut self, condition: C, then: V) -> Self
    where
        C: IntoCondition,
        V: IntoSet,
    {
        self.whens.push((condition.into_condition(), then.into_set()));
        self
    }

    pub fn otherwise<V: IntoSet>(mut self, value: V) -> Self {
        self.otherwise = Some(value.into_set());
        self
    }
}

impl FormatWriter for Case {
    fn format_writer<W: Write>(&self, context: &mut FormatContext<'_, W>) -> Result<()> {
        if self.whens.is_empty() {
            return Err(Error::EmptyCase {
                alias: self.alias.to_string(),
            });
        }
        context.writer.write_str("CASE")?;
        for (condition, then) in &self.whens {
            context.writer.write_str(" WHEN (")?;
            condition.format_writer(context)?;
            context.writer.write_str(") THEN ")?;
            then.format_writer(context)?;
        }
        if let Some(ref otherwise) = self.otherwise {
            context.writer.write_str(" ELSE ")?;
            otherwise.format_writer(context)?;
        }
        context.writer.write_str(" END AS ")?;
        self.alias.format_writer(context)
    }
}

impl PushBindings for Case {
    fn push_bindings(&self, binds: &mut Binds) -> Result<()> {
        for (condition, then) in &self.whens {
            condition.push_bindings(binds)?;
            then.push_bindings(binds)?;
        }
        if let Some(ref otherwise) = self.otherwise {
            otherwise.push_bindings(binds)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Bind,
        expr::{all, any},
        raw,
        tests::format_writer,
        writer::{collect_bindings, to_string},
    };

    use super::*;

    #[test]
    fn test_case() {
        let case = Case::new("tier")
            .when(("score", [90, 100]), "gold")
            .when(any().or(("vip", true)).or(all().field("score", 80)), raw("concat(label, ?)").arg("!"))
            .otherwise("none");
        assert_eq!(
            "CASE WHEN (score IN (?, ?)) THEN ? WHEN ((vip = ?) OR (score = ?)) THEN concat(label, ?) ELSE ? END AS tier",
            format_writer(&case)
        );
        assert_eq!(
            vec![
                Bind::String("90".into()),
                Bind::String("100".into()),
                Bind::String("gold".into()),
                Bind::Bool(true),
                Bind::I32(80),
                Bind::String("!".into()),
                Bind::String("none".into()),
            ],
            collect_bindings(&case).unwrap().into_vec()
        );
    }

    #[test]
    fn test_case_without_else() {
        let case = Case::new("big").when(("size >", raw("SELECT avg(size) FROM t")), 1);
        assert_eq!(
            "CASE WHEN (size > (SELECT avg(size) FROM t)) THEN ? END AS big",
            format_writer(&case)
        );
    }

    #[test]
    fn test_empty_case() {
        let case = Case::new("nothing").otherwise(1);
        assert!(matches!(to_string(&case), Err(Error::EmptyCase { .. })));
    }
}
