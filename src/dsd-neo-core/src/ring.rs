// SPDX-FileCopyrightText: 2026 Stan Grams <sjg@haxx.space>
//
// SPDX-License-Identifier: BSD-2-Clause

//! Single-producer/single-consumer ring buffers carrying interleaved IQ
//! samples (input) and PCM16 samples (output), with blocking reads,
//! reservation-style writes, and backpressure.
//!
//! One sentinel slot is always kept free: a ring of `capacity` elements
//! can hold at most `capacity - 1` samples, and `used + free + 1 ==
//! capacity` always holds. Empty is `head == tail`; the reserved slot
//! disambiguates empty from full without a separate counter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::exitflag::ExitFlag;

/// How a producer write should wake waiting consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalMode {
    /// Always notify the consumer after committing.
    Always,
    /// Never notify (caller batches writes and signals separately).
    Never,
    /// Only notify when the ring transitioned from empty to non-empty.
    ///
    /// Reduces wakeup storms under steady flow: a consumer already awake
    /// and draining the ring doesn't need a notification for every write.
    OnEmptyTransition,
}

struct Inner<T> {
    buf: Vec<T>,
    /// Index of the next sample the consumer will read.
    head: usize,
    /// Index of the next slot the producer will write.
    tail: usize,
}

impl<T: Copy> Inner<T> {
    fn capacity(&self) -> usize {
        self.buf.len()
    }

    fn used(&self) -> usize {
        (self.tail + self.capacity() - self.head) % self.capacity()
    }

    fn free(&self) -> usize {
        self.capacity() - 1 - self.used()
    }

    fn is_empty(&self) -> bool {
        self.head == self.tail
    }
}

/// A bounded SPSC ring of `T`. Exactly one producer thread and one
/// consumer thread may operate on a given instance.
pub struct SpscRing<T> {
    state: Mutex<Inner<T>>,
    ready: Condvar,
    space: Condvar,
    producer_drops: AtomicU64,
    read_wait_count: AtomicU64,
    write_timeout_count: AtomicU64,
    exitflag: ExitFlag,
}

/// Sentinel returned by [`SpscRing::read_block`] when shutdown was
/// observed and no data remain.
pub const READ_EXIT: i64 = -1;

impl<T: Copy + Default> SpscRing<T> {
    /// Create a ring with room for `capacity - 1` samples. A power-of-two
    /// capacity is recommended but not required.
    pub fn new(capacity: usize, exitflag: ExitFlag) -> Self {
        assert!(capacity >= 2, "ring capacity must hold at least one sample");
        Self {
            state: Mutex::new(Inner {
                buf: vec![T::default(); capacity],
                head: 0,
                tail: 0,
            }),
            ready: Condvar::new(),
            space: Condvar::new(),
            producer_drops: AtomicU64::new(0),
            read_wait_count: AtomicU64::new(0),
            write_timeout_count: AtomicU64::new(0),
            exitflag,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    pub fn used(&self) -> usize {
        self.lock().used()
    }

    pub fn free(&self) -> usize {
        self.lock().free()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Reset the ring to empty. Safe only once a higher-level stop has
    /// quiesced both producer and consumer.
    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.head = 0;
        inner.tail = 0;
    }

    pub fn producer_drops(&self) -> u64 {
        self.producer_drops.load(Ordering::Relaxed)
    }

    pub fn read_wait_count(&self) -> u64 {
        self.read_wait_count.load(Ordering::Relaxed)
    }

    pub fn write_timeout_count(&self) -> u64 {
        self.write_timeout_count.load(Ordering::Relaxed)
    }

    /// Block until at least `min(min_needed, capacity - 1)` slots are
    /// free, then hand the caller direct mutable access to up to two
    /// contiguous regions spanning the wrap point. The caller reports
    /// back how many samples it actually produced via
    /// [`ReserveGuard::commit`]; until `commit` is called nothing is
    /// visible to the consumer.
    pub fn reserve(&self, min_needed: usize) -> ReserveGuard<'_, T> {
        let mut inner = self.lock();
        let want = min_needed.min(inner.capacity() - 1);
        while inner.free() < want && !self.exitflag.is_set() {
            self.write_timeout_count.fetch_add(1, Ordering::Relaxed);
            inner = self
                .space
                .wait_timeout(inner, Duration::from_millis(200))
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
        let granted = inner.free();
        ReserveGuard {
            ring: self,
            guard: Some(inner),
            granted,
        }
    }

    fn commit_locked(&self, inner: &mut Inner<T>, produced: usize) {
        inner.tail = (inner.tail + produced) % inner.capacity();
    }

    /// Convenience: copy `data` into the ring, looping over reserve/commit
    /// as needed. Blocks until all of `data` has been written or shutdown
    /// is observed. Returns the number of samples actually written (less
    /// than `data.len()` only when shutdown interrupted the write).
    pub fn write(&self, data: &[T], mode: SignalMode) -> usize {
        let mut written = 0;
        while written < data.len() {
            if self.exitflag.is_set() {
                break;
            }
            let remaining = &data[written..];
            let mut guard = self.reserve(remaining.len());
            if guard.granted() == 0 {
                // exitflag fired while waiting
                break;
            }
            let n = guard.granted().min(remaining.len());
            let (r1, r2) = guard.regions_mut();
            let n1 = n.min(r1.len());
            r1[..n1].copy_from_slice(&remaining[..n1]);
            if n1 < n {
                r2[..n - n1].copy_from_slice(&remaining[n1..n]);
            }
            guard.commit_with_mode(n, mode);
            written += n;
        }
        written
    }

    /// Non-blocking write: writes as much of `data` as currently fits,
    /// never blocks, and increments `producer_drops` by the number of
    /// samples that did not fit.
    pub fn try_write(&self, data: &[T], mode: SignalMode) -> usize {
        let mut inner = self.lock();
        let free = inner.free();
        let n = free.min(data.len());
        if n > 0 {
            let cap = inner.capacity();
            let tail = inner.tail;
            let n1 = (cap - tail).min(n);
            inner.buf[tail..tail + n1].copy_from_slice(&data[..n1]);
            if n1 < n {
                inner.buf[..n - n1].copy_from_slice(&data[n1..n]);
            }
            let was_empty = inner.is_empty();
            self.commit_locked(&mut inner, n);
            let should_signal = match mode {
                SignalMode::Always => true,
                SignalMode::Never => false,
                SignalMode::OnEmptyTransition => was_empty,
            };
            drop(inner);
            if should_signal {
                self.ready.notify_one();
            }
        } else {
            drop(inner);
        }
        if n < data.len() {
            self.producer_drops
                .fetch_add((data.len() - n) as u64, Ordering::Relaxed);
        }
        n
    }

    /// Block until at least one sample is available or shutdown is
    /// observed with nothing left to read. Copies up to `out.len()`
    /// samples and returns the count, or [`READ_EXIT`] on shutdown with
    /// an empty ring.
    pub fn read_block(&self, out: &mut [T]) -> i64 {
        let mut inner = self.lock();
        while inner.is_empty() {
            if self.exitflag.is_set() {
                return READ_EXIT;
            }
            self.read_wait_count.fetch_add(1, Ordering::Relaxed);
            inner = self
                .ready
                .wait_timeout(inner, Duration::from_millis(200))
                .unwrap_or_else(|e| e.into_inner())
                .0;
        }
        let used = inner.used();
        let n = used.min(out.len());
        let cap = inner.capacity();
        let head = inner.head;
        let n1 = (cap - head).min(n);
        out[..n1].copy_from_slice(&inner.buf[head..head + n1]);
        if n1 < n {
            out[n1..n].copy_from_slice(&inner.buf[..n - n1]);
        }
        inner.head = (head + n) % cap;
        drop(inner);
        self.space.notify_one();
        n as i64
    }

    /// Convenience: block for exactly one sample.
    pub fn read_one(&self, out: &mut T) -> bool {
        let mut buf = [*out];
        let n = self.read_block(&mut buf);
        if n > 0 {
            *out = buf[0];
            true
        } else {
            false
        }
    }
}

/// A pending reservation returned by [`SpscRing::reserve`]. Nothing is
/// visible to the consumer until [`ReserveGuard::commit`] is called.
pub struct ReserveGuard<'a, T: Copy> {
    ring: &'a SpscRing<T>,
    guard: Option<MutexGuard<'a, Inner<T>>>,
    granted: usize,
}

impl<'a, T: Copy + Default> ReserveGuard<'a, T> {
    pub fn granted(&self) -> usize {
        self.granted
    }

    /// Mutable access to the (first, second) contiguous regions. `second`
    /// is empty when no wrap is needed.
    pub fn regions_mut(&mut self) -> (&mut [T], &mut [T]) {
        let inner = self.guard.as_mut().expect("guard consumed");
        let cap = inner.capacity();
        let tail = inner.tail;
        let n1 = (cap - tail).min(self.granted);
        let n2 = self.granted - n1;
        let (a, b) = inner.buf.split_at_mut(tail);
        (&mut b[..n1], &mut a[..n2])
    }

    /// Publish `produced` samples (must be `<= granted`), always
    /// signaling the consumer.
    pub fn commit(self, produced: usize) {
        self.commit_with_mode(produced, SignalMode::Always)
    }

    /// Publish `produced` samples with an explicit signaling mode.
    pub fn commit_with_mode(mut self, produced: usize, mode: SignalMode) {
        assert!(produced <= self.granted, "commit exceeds granted reservation");
        let mut inner = self.guard.take().expect("guard consumed");
        let was_empty = inner.is_empty();
        self.ring.commit_locked(&mut inner, produced);
        drop(inner);
        let should_signal = match mode {
            SignalMode::Always => true,
            SignalMode::Never => false,
            SignalMode::OnEmptyTransition => was_empty && produced > 0,
        };
        if should_signal {
            self.ring.ready.notify_one();
        }
    }
}

impl<'a, T: Copy> Drop for ReserveGuard<'a, T> {
    fn drop(&mut self) {
        // Returning the reservation without committing just releases the
        // lock; no samples become visible and no signal is sent.
    }
}

/// Interleaved 16-bit signed I/Q samples, single producer (SDR thread),
/// single consumer (demod thread).
pub struct IqRing {
    ring: SpscRing<i16>,
}

impl IqRing {
    pub fn new(capacity: usize, exitflag: ExitFlag) -> Self {
        Self {
            ring: SpscRing::new(capacity, exitflag),
        }
    }

    pub fn used(&self) -> usize {
        self.ring.used()
    }
    pub fn free(&self) -> usize {
        self.ring.free()
    }
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
    pub fn clear(&self) {
        self.ring.clear()
    }
    pub fn reserve(&self, min_needed: usize) -> ReserveGuard<'_, i16> {
        self.ring.reserve(min_needed)
    }
    pub fn write(&self, data: &[i16], mode: SignalMode) -> usize {
        self.ring.write(data, mode)
    }
    pub fn try_write(&self, data: &[i16], mode: SignalMode) -> usize {
        self.ring.try_write(data, mode)
    }
    pub fn read_block(&self, out: &mut [i16]) -> i64 {
        self.ring.read_block(out)
    }
    pub fn read_one(&self, out: &mut i16) -> bool {
        self.ring.read_one(out)
    }
    pub fn producer_drops(&self) -> u64 {
        self.ring.producer_drops()
    }
}

/// Mono PCM16 at a declared sample rate, single producer (demod thread),
/// single consumer (audio thread).
pub struct PcmRing {
    ring: SpscRing<i16>,
    sample_rate_hz: u32,
}

impl PcmRing {
    pub fn new(capacity: usize, sample_rate_hz: u32, exitflag: ExitFlag) -> Self {
        Self {
            ring: SpscRing::new(capacity, exitflag),
            sample_rate_hz,
        }
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }
    pub fn used(&self) -> usize {
        self.ring.used()
    }
    pub fn free(&self) -> usize {
        self.ring.free()
    }
    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }
    pub fn clear(&self) {
        self.ring.clear()
    }
    pub fn reserve(&self, min_needed: usize) -> ReserveGuard<'_, i16> {
        self.ring.reserve(min_needed)
    }
    pub fn write(&self, data: &[i16], mode: SignalMode) -> usize {
        self.ring.write(data, mode)
    }
    pub fn try_write(&self, data: &[i16], mode: SignalMode) -> usize {
        self.ring.try_write(data, mode)
    }
    pub fn read_block(&self, out: &mut [i16]) -> i64 {
        self.ring.read_block(out)
    }
    pub fn read_one(&self, out: &mut i16) -> bool {
        self.ring.read_one(out)
    }
    pub fn write_timeout_count(&self) -> u64 {
        self.ring.write_timeout_count()
    }
}
