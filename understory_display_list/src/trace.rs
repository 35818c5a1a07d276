// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability helpers for playback.
//!
//! A display list is opaque bytes, which makes "what did this frame actually
//! replay?" hard to answer. [`DisplayListData::draw_traced`] reports every
//! record to a [`PlaybackTrace`] sink before dispatching it, and
//! [`OpHistogram`] is a small recorder that tallies records per kind.
//!
//! Tracing is additive: [`DisplayListData::draw`] does not pay for it.
//!
//! [`DisplayListData::draw_traced`]: crate::DisplayListData::draw_traced
//! [`DisplayListData::draw`]: crate::DisplayListData::draw

use alloc::vec::Vec;

use hashbrown::HashMap;

use crate::catalog::OpKind;
use crate::data::RecordHeader;

/// A callback sink for playback tracing.
pub trait PlaybackTrace {
    /// Called for each record, in stream order, before it is dispatched.
    fn record(&mut self, header: &RecordHeader);
}

impl<F: FnMut(&RecordHeader)> PlaybackTrace for F {
    fn record(&mut self, header: &RecordHeader) {
        self(header);
    }
}

/// Per-kind totals collected by [`OpHistogram`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct KindStats {
    /// Number of records.
    pub count: usize,
    /// Total record bytes, headers and padding included.
    pub bytes: usize,
}

/// Tallies played-back records by kind.
#[derive(Clone, Debug, Default)]
pub struct OpHistogram {
    stats: HashMap<OpKind, KindStats>,
}

impl OpHistogram {
    /// Creates an empty histogram.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears all totals.
    pub fn clear(&mut self) {
        self.stats.clear();
    }

    /// Totals for `kind`; zero if it never occurred.
    #[must_use]
    pub fn get(&self, kind: OpKind) -> KindStats {
        self.stats.get(&kind).copied().unwrap_or_default()
    }

    /// Total number of records seen.
    #[must_use]
    pub fn total(&self) -> usize {
        self.stats.values().map(|s| s.count).sum()
    }

    /// Kinds that occurred, with their totals, in catalog order.
    #[must_use]
    pub fn sorted(&self) -> Vec<(OpKind, KindStats)> {
        let mut out: Vec<_> = self.stats.iter().map(|(k, s)| (*k, *s)).collect();
        out.sort_unstable_by_key(|(k, _)| *k);
        out
    }
}

impl PlaybackTrace for OpHistogram {
    fn record(&mut self, header: &RecordHeader) {
        let stats = self.stats.entry(header.kind).or_default();
        stats.count += 1;
        stats.bytes += header.len;
    }
}
