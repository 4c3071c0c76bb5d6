use super::*;

/// Running sum for one `(key, window)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateState {
    pub key: String,
    pub window: TimeWindow,
    pub total: Decimal,
    pub update_count: u64,
}

/// What `accumulate` did with an amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accumulated {
    /// First event for this `(key, window)`; a new entry was created.
    Opened,
    /// Added to an existing entry.
    Updated,
    /// The window was already evicted; the amount was dropped.
    Late,
}

/// In-memory aggregate store.
///
/// Windows are grouped per key in a `BTreeMap`, so a closure sweep for one
/// key visits only that key's windows, oldest first.
///
/// After a window is evicted the store keeps only the end of the newest
/// evicted window per key (`evicted_through`). Any later accumulate for a
/// window ending at or before that point is rejected as late, so evicted
/// entries are never resurrected and no tombstone per window is needed.
#[derive(Debug, Default)]
pub struct AggregateStore {
    windows: AHashMap<String, BTreeMap<TimeWindow, AggregateState>>,
    evicted_through: AHashMap<String, EventTime>,
    len: usize,
}

impl AggregateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the running total of `(key, window)`.
    ///
    /// Every addition is exact, so the final total does not depend on the
    /// order amounts arrive in. An addition that would overflow or round is
    /// refused and the entry is left unchanged.
    pub fn accumulate(
        &mut self,
        key: &str,
        window: TimeWindow,
        amount: Decimal,
    ) -> Result<Accumulated, AccumulationError> {
        if let Some(state) = self.windows.get_mut(key).and_then(|w| w.get_mut(&window)) {
            state.total = exact_sum(key, window, state.total, amount)?;
            state.update_count += 1;
            return Ok(Accumulated::Updated);
        }

        if self.is_evicted(key, &window) {
            return Ok(Accumulated::Late);
        }

        self.windows.entry(key.to_string()).or_default().insert(
            window,
            AggregateState {
                key: key.to_string(),
                window,
                total: amount,
                update_count: 1,
            },
        );
        self.len += 1;
        Ok(Accumulated::Opened)
    }

    /// Remove `(key, window)` and return its final state.
    pub fn evict(&mut self, key: &str, window: &TimeWindow) -> Option<AggregateState> {
        let per_key = self.windows.get_mut(key)?;
        let state = per_key.remove(window)?;
        if per_key.is_empty() {
            self.windows.remove(key);
        }
        self.len -= 1;
        self.mark_evicted(key, window.end);
        Some(state)
    }

    /// Remove every window of `key` whose end is at or before `bound`, oldest
    /// first.
    pub fn evict_closed(&mut self, key: &str, bound: EventTime) -> Vec<AggregateState> {
        let Some(per_key) = self.windows.get_mut(key) else {
            return Vec::new();
        };

        let mut closed = Vec::new();
        while let Some(entry) = per_key.first_entry() {
            if entry.key().end > bound {
                break;
            }
            closed.push(entry.remove());
        }
        if per_key.is_empty() {
            self.windows.remove(key);
        }

        if let Some(last) = closed.last() {
            let end = last.window.end;
            self.len -= closed.len();
            self.mark_evicted(key, end);
        }
        closed
    }

    /// Remove all outstanding entries, ordered by key and window start.
    pub fn drain(&mut self) -> Vec<AggregateState> {
        let mut keys: Vec<String> = self.windows.keys().cloned().collect();
        keys.sort();

        let mut drained = Vec::with_capacity(self.len);
        for key in keys {
            if let Some(per_key) = self.windows.remove(&key) {
                if let Some(end) = per_key.keys().next_back().map(|w| w.end) {
                    self.mark_evicted(&key, end);
                }
                drained.extend(per_key.into_values());
            }
        }
        self.len = 0;
        drained
    }

    pub fn get(&self, key: &str, window: &TimeWindow) -> Option<&AggregateState> {
        self.windows.get(key)?.get(window)
    }

    /// Outstanding windows for `key`, oldest first.
    pub fn windows_for(&self, key: &str) -> impl Iterator<Item = &TimeWindow> {
        self.windows.get(key).into_iter().flat_map(|w| w.keys())
    }

    /// Whether `(key, window)` is not outstanding and ends at or before the
    /// newest evicted window of `key`, so it can no longer be accumulated.
    pub fn is_evicted(&self, key: &str, window: &TimeWindow) -> bool {
        self.get(key, window).is_none()
            && self
                .evicted_through
                .get(key)
                .is_some_and(|&through| window.end <= through)
    }

    /// Number of outstanding `(key, window)` entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of keys with at least one outstanding window.
    pub fn key_count(&self) -> usize {
        self.windows.len()
    }

    fn mark_evicted(&mut self, key: &str, end: EventTime) {
        match self.evicted_through.get_mut(key) {
            Some(through) => *through = (*through).max(end),
            None => {
                self.evicted_through.insert(key.to_string(), end);
            }
        }
    }
}

/// `total + amount`, or an error if the result is not exactly representable.
///
/// `Decimal` addition rounds away low-order digits instead of failing once
/// the mantissa is exhausted. An exact sum always carries the larger of the
/// two operand scales, so a smaller result scale means digits were dropped.
fn exact_sum(
    key: &str,
    window: TimeWindow,
    total: Decimal,
    amount: Decimal,
) -> Result<Decimal, AccumulationError> {
    let sum = total
        .checked_add(amount)
        .ok_or_else(|| AccumulationError::Overflow {
            key: key.to_string(),
            window,
            total,
            amount,
        })?;
    if sum.scale() < total.scale().max(amount.scale()) {
        return Err(AccumulationError::Inexact {
            key: key.to_string(),
            window,
            total,
            amount,
        });
    }
    Ok(sum)
}
