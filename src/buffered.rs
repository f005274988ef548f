// Copyright (c) 2024-present, the containment-index contributors
// This source code is licensed under both the Apache 2.0 and MIT License
// (found in the LICENSE-* files in the repository)

//! Buffered thread-safe wrapper — component G.
//!
//! Layers concurrent reads, batched writes and an explicit read lock over
//! any raw [`ContainmentIndex`]. `add` acquires only the read
//! side of the lock and records the entry in an add-buffer; a single
//! background worker periodically acquires the write side to fold the
//! buffer into the underlying index. Lock choice (`std::sync::{RwLock,
//! Mutex}`, no `parking_lot`) and cooperative shutdown (`StopSignal`) follow
//! `src/tree_inner.rs` / `src/stop_signal.rs`.
//!
//! A lazy iterator that holds a lock needs to be modeled explicitly rather
//! than hidden: [`BufferedIndex`] does not itself implement
//! [`ContainmentIndex`], because that trait's query methods return
//! iterators borrowed from `&self` alone, with no way to also carry a lock
//! guard without becoming self-referential. Instead, [`BufferedIndex::read_lock`]
//! returns a [`BufferedReadGuard`] — an explicit, named handle — whose own
//! query methods borrow *it*, so the borrow checker enforces "the caller
//! must hold the read lock while iterating" instead of merely documenting it.

use crate::error::{Error, Result};
use crate::index::{ContainmentIndex, IndexedEntry};
use crate::stop_signal::StopSignal;
use std::collections::HashSet;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, RwLock, RwLockReadGuard};
use std::thread::{self, JoinHandle};

/// A counting semaphore. `std` has no built-in one; this is the
/// straightforward `Mutex<usize>` + `Condvar` substitute.
struct Semaphore {
    count: Mutex<usize>,
    cond: Condvar,
}

impl Semaphore {
    fn new() -> Self {
        Self {
            count: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    fn release(&self, n: usize) {
        let mut count = self.count.lock().expect("semaphore mutex poisoned");
        *count += n;
        self.cond.notify_all();
    }

    /// `true` and decrements by `n` iff at least `n` permits were available.
    fn try_acquire(&self, n: usize) -> bool {
        let mut count = self.count.lock().expect("semaphore mutex poisoned");
        if *count >= n {
            *count -= n;
            true
        } else {
            false
        }
    }

    /// Blocks until at least `n` permits are available or `stop` is
    /// signaled. Returns `true` in the former case. Does not consume
    /// permits; the caller drains them explicitly once it holds the write
    /// lock on the underlying index, so "observe threshold reached" and
    /// "reset the counter" happen under the same lock as the buffer fold-in.
    fn wait_for_threshold_or_stop(&self, n: usize, stop: &StopSignal) -> bool {
        let mut count = self.count.lock().expect("semaphore mutex poisoned");
        while *count < n && !stop.is_stopped() {
            count = self.cond.wait(count).expect("semaphore mutex poisoned");
        }
        *count >= n
    }

    fn drain(&self) {
        let mut count = self.count.lock().expect("semaphore mutex poisoned");
        *count = 0;
    }

    /// Wakes a thread blocked in `wait_for_threshold_or_stop` without
    /// changing the permit count, so a stop signal takes effect promptly.
    fn wake(&self) {
        let _count = self.count.lock().expect("semaphore mutex poisoned");
        self.cond.notify_all();
    }
}

fn is_elements_subset<T: Eq + Hash>(a: &[T], b: &[T]) -> bool {
    let b: HashSet<&T> = b.iter().collect();
    a.iter().all(|e| b.contains(e))
}

struct BufferedIndexInner<T, E, I> {
    inner: RwLock<I>,
    buffer: Mutex<Vec<E>>,
    semaphore: Semaphore,
    flush_threshold: usize,
    stop_signal: StopSignal,
    _marker: PhantomData<T>,
}

/// A thread-safe containment index: many concurrent readers, one background
/// writer, an explicit read lock for lazy queries.
pub struct BufferedIndex<T, E, I> {
    shared: Arc<BufferedIndexInner<T, E, I>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl<T, E, I> BufferedIndex<T, E, I>
where
    T: Clone + Eq + Hash + Send + Sync + 'static,
    E: IndexedEntry<T> + Send + Sync + 'static,
    I: ContainmentIndex<T, E> + Send + Sync + 'static,
{
    /// Wraps `inner`. The background worker flushes the add-buffer into
    /// `inner` every time `flush_threshold` genuine insertions accumulate.
    pub fn new(inner: I, flush_threshold: usize) -> Self {
        let shared = Arc::new(BufferedIndexInner {
            inner: RwLock::new(inner),
            buffer: Mutex::new(Vec::new()),
            semaphore: Semaphore::new(),
            flush_threshold: flush_threshold.max(1),
            stop_signal: StopSignal::default(),
            _marker: PhantomData,
        });

        let worker = spawn_worker(Arc::clone(&shared));

        Self {
            shared,
            worker: Mutex::new(Some(worker)),
        }
    }

    /// Inserts `entry`. Visible to readers (via `contains`/`read_lock`) as
    /// soon as this call returns, whether or not it has been flushed to the
    /// underlying index yet.
    pub fn add(&self, entry: E) -> Result<bool> {
        let index = self.shared.inner.read()?;
        if index.contains(&entry) {
            return Ok(false);
        }

        let mut buffer = self.shared.buffer.lock()?;
        let is_new = !buffer.contains(&entry);
        if is_new {
            buffer.push(entry);
        }
        drop(buffer);
        drop(index);

        if is_new {
            self.shared.semaphore.release(1);
        }
        Ok(is_new)
    }

    /// Removes the entry equal to `entry`, from the buffer if it is still
    /// there, otherwise from the underlying index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvariantViolation`] if the buffer and the
    /// semaphore's permit count have diverged — this should never happen
    /// and indicates a bug.
    pub fn remove(&self, entry: &E) -> Result<bool> {
        let mut index = self.shared.inner.write()?;
        let mut buffer = self.shared.buffer.lock()?;

        if let Some(pos) = buffer.iter().position(|e| e == entry) {
            buffer.remove(pos);
            drop(buffer);
            if !self.shared.semaphore.try_acquire(1) {
                return Err(Error::InvariantViolation(
                    "add-buffer and semaphore permit count diverged".into(),
                ));
            }
            Ok(true)
        } else {
            drop(buffer);
            Ok(index.remove(entry))
        }
    }

    pub fn contains(&self, entry: &E) -> Result<bool> {
        let index = self.shared.inner.read()?;
        if index.contains(entry) {
            return Ok(true);
        }
        let buffer = self.shared.buffer.lock()?;
        Ok(buffer.contains(entry))
    }

    pub fn size(&self) -> Result<usize> {
        let index = self.shared.inner.read()?;
        let buffer = self.shared.buffer.lock()?;
        Ok(index.size() + buffer.len())
    }

    /// Acquires the read lock and returns a handle whose query methods
    /// (`subsets`, `supersets`, `iterate_all`, ...) are lazy and borrow the
    /// handle itself — so they only remain valid, and the lock only stays
    /// held, for as long as the returned [`BufferedReadGuard`] is alive.
    pub fn read_lock(&self) -> Result<BufferedReadGuard<'_, T, E, I>> {
        let index = self.shared.inner.read()?;
        let buffer = self.shared.buffer.lock()?;
        Ok(BufferedReadGuard {
            index,
            buffer,
            _marker: PhantomData,
        })
    }
}

impl<T, E, I> Drop for BufferedIndex<T, E, I> {
    fn drop(&mut self) {
        log::debug!("buffered index dropping, stopping flush worker");
        self.shared.stop_signal.send();
        self.shared.semaphore.wake();

        if let Ok(mut worker) = self.worker.lock() {
            if let Some(handle) = worker.take() {
                let _ = handle.join();
            }
        }

        // Final drain under the write lock: anything left in the buffer
        // after the worker has stopped is folded in here.
        if let Ok(mut buffer) = self.shared.buffer.lock() {
            if !buffer.is_empty() {
                if let Ok(mut index) = self.shared.inner.write() {
                    for entry in buffer.drain(..) {
                        let _ = index.add(entry);
                    }
                }
            }
        }
    }
}

fn spawn_worker<T, E, I>(shared: Arc<BufferedIndexInner<T, E, I>>) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
    E: Send + Sync + 'static,
    I: ContainmentIndex<T, E> + Send + Sync + 'static,
{
    thread::spawn(move || loop {
        let reached = shared
            .semaphore
            .wait_for_threshold_or_stop(shared.flush_threshold, &shared.stop_signal);
        if !reached {
            // Stopped with fewer than `flush_threshold` permits outstanding;
            // `Drop` performs the final drain.
            break;
        }

        if let Ok(mut index) = shared.inner.write() {
            let Ok(mut buffer) = shared.buffer.lock() else {
                break;
            };
            let drained: Vec<E> = std::mem::take(&mut *buffer);
            drop(buffer);
            shared.semaphore.drain();

            for entry in drained {
                let _ = index.add(entry);
            }
        }

        if shared.stop_signal.is_stopped() {
            break;
        }
    })
}

/// A held read lock over a [`BufferedIndex`], through which lazy queries can
/// be issued. Dropping this guard releases the lock; any iterator produced
/// by its methods borrows it and so cannot outlive it.
pub struct BufferedReadGuard<'a, T, E, I> {
    index: RwLockReadGuard<'a, I>,
    buffer: MutexGuard<'a, Vec<E>>,
    _marker: PhantomData<T>,
}

impl<'a, T, E, I> BufferedReadGuard<'a, T, E, I>
where
    T: Clone + Eq + Hash,
    E: IndexedEntry<T>,
    I: ContainmentIndex<T, E>,
{
    pub fn contains(&self, entry: &E) -> bool {
        self.index.contains(entry) || self.buffer.contains(entry)
    }

    pub fn size(&self) -> usize {
        self.index.size() + self.buffer.len()
    }

    pub fn iterate_all(&self) -> impl Iterator<Item = E> + '_ {
        self.index.iterate_all().chain(self.buffer.iter().cloned())
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidElement`] if `query` contains an element
    /// outside the universe.
    pub fn subsets(&self, query: &[T]) -> Result<impl Iterator<Item = E> + '_> {
        let from_inner = self.index.subsets(query)?;
        let from_buffer = self
            .buffer
            .iter()
            .filter(move |e| is_elements_subset(e.elements(), query))
            .cloned();
        Ok(from_inner.chain(from_buffer))
    }

    /// # Errors
    ///
    /// Returns [`Error::InvalidElement`] if `query` contains an element
    /// outside the universe.
    pub fn supersets(&self, query: &[T]) -> Result<impl Iterator<Item = E> + '_> {
        let from_inner = self.index.supersets(query)?;
        let from_buffer = self
            .buffer
            .iter()
            .filter(move |e| is_elements_subset(query, e.elements()))
            .cloned();
        Ok(from_inner.chain(from_buffer))
    }

    pub fn num_subsets(&self, query: &[T]) -> Result<usize> {
        Ok(self.subsets(query)?.count())
    }

    pub fn num_supersets(&self, query: &[T]) -> Result<usize> {
        Ok(self.supersets(query)?.count())
    }
}
