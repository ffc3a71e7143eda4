//! Exception handler table.
//!
//! Each descriptor protects a half-open instruction range `[start, end)` and
//! names the instruction control transfers to when something inside it throws.
//! A `try` whose protected code is interrupted by an inlined `finally` copy
//! registers one descriptor per uninterrupted segment.

use std::fmt;

/// What a handler does with the in-flight exception.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandlerKind {
    /// Binds the exception and continues after `BeginCatch`.
    Catch,
    /// Runs the finally body and rethrows at `EndFinally`.
    Finally,
}

/// One entry of the exception table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExceptionHandler {
    pub kind: HandlerKind,
    /// First protected instruction.
    pub start: usize,
    /// One past the last protected instruction.
    pub end: usize,
    /// Where the handler code begins.
    pub handler: usize,
    /// Evaluation stack items (enumerators) to keep when entering the handler.
    pub stack_depth: u32,
    /// Dynamic scopes (`with`, `catch`) to keep when entering the handler.
    pub scope_depth: u32,
    /// Number of `try` statements enclosing the one that registered this
    /// descriptor. Catch and finally of one `try` share a level.
    pub nesting: u32,
}

impl ExceptionHandler {
    #[inline]
    pub fn covers(&self, ip: usize) -> bool {
        self.start <= ip && ip < self.end
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

impl fmt::Display for ExceptionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            HandlerKind::Catch => "catch",
            HandlerKind::Finally => "finally",
        };
        write!(
            f,
            "[{:04}, {:04}) -> {:04} {} (stack {}, scopes {}, level {})",
            self.start, self.end, self.handler, kind, self.stack_depth, self.scope_depth, self.nesting
        )
    }
}

/// Ordered list of handler descriptors.
///
/// Catch descriptors and finally descriptors of a `try` that also has a catch
/// are appended; finally-only descriptors are prepended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExceptionTable {
    handlers: Vec<ExceptionHandler>,
}

impl ExceptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, handler: ExceptionHandler) {
        self.handlers.push(handler);
    }

    pub fn prepend(&mut self, handler: ExceptionHandler) {
        self.handlers.insert(0, handler);
    }

    /// Prepends a batch, keeping the batch's own order.
    pub fn prepend_all(&mut self, handlers: impl IntoIterator<Item = ExceptionHandler>) {
        let front: Vec<_> = handlers.into_iter().collect();
        self.handlers.splice(0..0, front);
    }

    /// The handler that receives an exception raised at `ip`.
    ///
    /// The most deeply nested covering descriptor wins, so an inner `try`
    /// always sees the exception before an enclosing one, whatever their
    /// positions in the table. Within one level the narrowest range wins and
    /// remaining ties resolve in table order.
    pub fn handler_for(&self, ip: usize) -> Option<&ExceptionHandler> {
        let mut best: Option<&ExceptionHandler> = None;
        for handler in self.handlers.iter().filter(|h| h.covers(ip)) {
            let better = match best {
                None => true,
                Some(current) => {
                    handler.nesting > current.nesting
                        || (handler.nesting == current.nesting && handler.len() < current.len())
                }
            };
            if better {
                best = Some(handler);
            }
        }
        best
    }

    pub fn iter(&self) -> impl Iterator<Item = &ExceptionHandler> {
        self.handlers.iter()
    }

    pub fn as_slice(&self) -> &[ExceptionHandler] {
        &self.handlers
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(kind: HandlerKind, start: usize, end: usize, target: usize) -> ExceptionHandler {
        nested(kind, start, end, target, 0)
    }

    fn nested(kind: HandlerKind, start: usize, end: usize, target: usize, nesting: u32) -> ExceptionHandler {
        ExceptionHandler {
            kind,
            start,
            end,
            handler: target,
            stack_depth: 0,
            scope_depth: 0,
            nesting,
        }
    }

    #[test]
    fn prepend_goes_first() {
        let mut table = ExceptionTable::new();
        table.append(handler(HandlerKind::Catch, 0, 4, 10));
        table.prepend(handler(HandlerKind::Finally, 0, 8, 20));
        assert_eq!(table.as_slice()[0].handler, 20);
        assert_eq!(table.as_slice()[1].handler, 10);
    }

    #[test]
    fn prepend_all_keeps_batch_order() {
        let mut table = ExceptionTable::new();
        table.append(handler(HandlerKind::Catch, 0, 2, 9));
        table.prepend_all([
            handler(HandlerKind::Finally, 0, 1, 7),
            handler(HandlerKind::Finally, 3, 5, 7),
        ]);
        let starts: Vec<_> = table.iter().map(|h| h.start).collect();
        assert_eq!(starts, vec![0, 3, 0]);
    }

    #[test]
    fn innermost_range_wins() {
        let mut table = ExceptionTable::new();
        // Outer finally registered first, inner catch later.
        table.prepend(handler(HandlerKind::Finally, 0, 20, 30));
        table.append(nested(HandlerKind::Catch, 2, 6, 8, 1));

        assert_eq!(table.handler_for(3).map(|h| h.handler), Some(8));
        assert_eq!(table.handler_for(10).map(|h| h.handler), Some(30));
        assert!(table.handler_for(25).is_none());
    }

    #[test]
    fn ties_resolve_in_table_order() {
        let mut table = ExceptionTable::new();
        table.append(handler(HandlerKind::Catch, 0, 4, 10));
        table.append(handler(HandlerKind::Finally, 0, 4, 20));
        assert_eq!(table.handler_for(1).map(|h| h.handler), Some(10));
    }

    #[test]
    fn deeper_level_beats_earlier_equal_range() {
        let mut table = ExceptionTable::new();
        // A split outer finally can end up exactly as wide as the inner
        // catch and ahead of it in the table.
        table.append(nested(HandlerKind::Catch, 0, 4, 9, 1));
        table.prepend_all([
            handler(HandlerKind::Finally, 0, 4, 18),
            handler(HandlerKind::Finally, 8, 14, 18),
        ]);
        assert_eq!(table.handler_for(0).map(|h| h.kind), Some(HandlerKind::Catch));
        assert_eq!(table.handler_for(8).map(|h| h.kind), Some(HandlerKind::Finally));
    }

    #[test]
    fn deeper_level_beats_narrower_outer_segment() {
        let mut table = ExceptionTable::new();
        table.append(handler(HandlerKind::Catch, 2, 3, 20));
        table.append(nested(HandlerKind::Finally, 0, 6, 10, 1));
        assert_eq!(table.handler_for(2).map(|h| h.handler), Some(10));
    }

    #[test]
    fn end_is_exclusive() {
        let mut table = ExceptionTable::new();
        table.append(handler(HandlerKind::Catch, 2, 4, 10));
        assert!(table.handler_for(1).is_none());
        assert!(table.handler_for(2).is_some());
        assert!(table.handler_for(4).is_none());
    }
}
