use crate::{Bind, Binds};

/// The largest row count mysql accepts, used when only an offset is given.
const NO_LIMIT: u64 = u64::MAX;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Paginator {
    maybe_limit: Option<u64>,
    maybe_offset: Option<u64>,
}

impl Paginator {
    pub(crate) fn limit(&mut self, limit: u64) {
        self.maybe_limit = Some(limit);
    }

    pub(crate) fn offset(&mut self, offset: u64) {
        self.maybe_offset = Some(offset);
    }

    /// Pages start at 1, a page of 0 is read as the first one.
    pub(crate) fn paginate(&mut self, page: u64, per_page: u64) {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        self.maybe_limit = Some(per_page);
        self.maybe_offset = Some(offset);
    }

    pub(crate) fn is_set(&self) -> bool {
        self.maybe_limit.is_some() || self.maybe_offset.is_some()
    }

    /// `LIMIT ? OFFSET ?` always binds both values, limit first.
    pub(crate) fn push_bindings(&self, binds: &mut Binds) {
        if !self.is_set() {
            return;
        }
        binds.push(Bind::U64(self.maybe_limit.unwrap_or(NO_LIMIT)));
        binds.push(Bind::U64(self.maybe_offset.unwrap_or(0)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bindings(paginator: Paginator) -> Vec<Bind> {
        let mut binds = Binds::None;
        paginator.push_bindings(&mut binds);
        binds.into_vec()
    }

    #[test]
    fn test_unset() {
        let paginator = Paginator::default();
        assert!(!paginator.is_set());
        assert!(bindings(paginator).is_empty());
    }

    #[test]
    fn test_limit_defaults_offset() {
        let mut paginator = Paginator::default();
        paginator.limit(10);
        assert_eq!(vec![Bind::U64(10), Bind::U64(0)], bindings(paginator));
    }

    #[test]
    fn test_offset_only() {
        let mut paginator = Paginator::default();
        paginator.offset(20);
        assert_eq!(vec![Bind::U64(NO_LIMIT), Bind::U64(20)], bindings(paginator));
    }

    #[test]
    fn test_paginate() {
        let mut paginator = Paginator::default();
        paginator.paginate(3, 15);
        assert_eq!(vec![Bind::U64(15), Bind::U64(30)], bindings(paginator));
        paginator.paginate(0, 15);
        assert_eq!(vec![Bind::U64(15), Bind::U64(0)], bindings(paginator));
    }
}
