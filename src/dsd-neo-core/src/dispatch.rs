// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Protocol dispatcher: an ordered, immutable-after-init table mapping a
//! detected sync-type identifier to a protocol handler. This is the only
//! coupling between the frame-sync layer and the protocol modules.

/// One entry in a [`DispatchTable`]: a name, a predicate over the
/// detected sync id, a handler, and an optional post-error-recovery
/// reset hook.
pub struct DispatchEntry<Sid, Opts, State> {
    pub name: &'static str,
    matches: Box<dyn Fn(Sid) -> bool + Send + Sync>,
    handle: Box<dyn Fn(&mut Opts, &mut State) + Send + Sync>,
    on_reset: Option<Box<dyn Fn(&mut Opts, &mut State) + Send + Sync>>,
}

impl<Sid, Opts, State> DispatchEntry<Sid, Opts, State> {
    pub fn new(
        name: &'static str,
        matches: impl Fn(Sid) -> bool + Send + Sync + 'static,
        handle: impl Fn(&mut Opts, &mut State) + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            matches: Box::new(matches),
            handle: Box::new(handle),
            on_reset: None,
        }
    }

    pub fn with_on_reset(
        mut self,
        on_reset: impl Fn(&mut Opts, &mut State) + Send + Sync + 'static,
    ) -> Self {
        self.on_reset = Some(Box::new(on_reset));
        self
    }
}

/// Ordered sequence of [`DispatchEntry`], traversed in order until the
/// first match. Built once and never mutated afterward.
pub struct DispatchTable<Sid, Opts, State> {
    entries: Vec<DispatchEntry<Sid, Opts, State>>,
}

impl<Sid: Copy, Opts, State> DispatchTable<Sid, Opts, State> {
    pub fn builder() -> DispatchTableBuilder<Sid, Opts, State> {
        DispatchTableBuilder { entries: Vec::new() }
    }

    /// Route `sync` to the first matching entry's handler. Returns the
    /// matched entry's name, or `None` if nothing matched.
    pub fn dispatch(&self, sync: Sid, opts: &mut Opts, state: &mut State) -> Option<&'static str> {
        for entry in &self.entries {
            if (entry.matches)(sync) {
                (entry.handle)(opts, state);
                return Some(entry.name);
            }
        }
        None
    }

    /// Invoke every entry's `on_reset`, called after protocol-level
    /// error recovery.
    pub fn reset_all(&self, opts: &mut Opts, state: &mut State) {
        for entry in &self.entries {
            if let Some(on_reset) = &entry.on_reset {
                on_reset(opts, state);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub struct DispatchTableBuilder<Sid, Opts, State> {
    entries: Vec<DispatchEntry<Sid, Opts, State>>,
}

impl<Sid: Copy, Opts, State> DispatchTableBuilder<Sid, Opts, State> {
    pub fn push(mut self, entry: DispatchEntry<Sid, Opts, State>) -> Self {
        self.entries.push(entry);
        self
    }

    pub fn build(self) -> DispatchTable<Sid, Opts, State> {
        DispatchTable {
            entries: self.entries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Clone, Copy, PartialEq, Eq)]
    enum TestSync {
        M17,
        Ysf,
        Unknown,
    }

    #[test]
    fn first_match_wins_and_is_the_only_handler_invoked() {
        let m17_hits = AtomicU32::new(0);
        let ysf_hits = AtomicU32::new(0);

        let table: DispatchTable<TestSync, (), AtomicU32> = DispatchTable::builder()
            .push(DispatchEntry::new(
                "m17",
                |s| matches!(s, TestSync::M17),
                |_, state: &mut AtomicU32| {
                    state.fetch_add(1, Ordering::SeqCst);
                },
            ))
            .push(DispatchEntry::new(
                "ysf",
                |s| matches!(s, TestSync::Ysf),
                |_, state: &mut AtomicU32| {
                    state.fetch_add(10, Ordering::SeqCst);
                },
            ))
            .build();

        let mut opts = ();
        let mut state = AtomicU32::new(0);
        let name = table.dispatch(TestSync::M17, &mut opts, &mut state);
        assert_eq!(name, Some("m17"));
        assert_eq!(state.load(Ordering::SeqCst), 1);

        let _ = (&m17_hits, &ysf_hits);
    }

    #[test]
    fn unmatched_sync_returns_none() {
        let table: DispatchTable<TestSync, (), ()> = DispatchTable::builder()
            .push(DispatchEntry::new("m17", |s| matches!(s, TestSync::M17), |_, _| {}))
            .build();

        let mut opts = ();
        let mut state = ();
        assert_eq!(table.dispatch(TestSync::Unknown, &mut opts, &mut state), None);
    }

    #[test]
    fn on_reset_runs_for_every_entry() {
        let table: DispatchTable<TestSync, (), AtomicU32> = DispatchTable::builder()
            .push(
                DispatchEntry::new("m17", |s| matches!(s, TestSync::M17), |_, _| {})
                    .with_on_reset(|_, state: &mut AtomicU32| {
                        state.fetch_add(1, Ordering::SeqCst);
                    }),
            )
            .push(
                DispatchEntry::new("ysf", |s| matches!(s, TestSync::Ysf), |_, _| {})
                    .with_on_reset(|_, state: &mut AtomicU32| {
                        state.fetch_add(1, Ordering::SeqCst);
                    }),
            )
            .build();

        let mut opts = ();
        let mut state = AtomicU32::new(0);
        table.reset_all(&mut opts, &mut state);
        assert_eq!(state.load(Ordering::SeqCst), 2);
    }
}
