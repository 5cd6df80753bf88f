// SPDX-License-Identifier: Apache-2.0

use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

/// Capacity of freshly allocated pool buffers.
const BUFFER_SIZE: usize = 4096;

/// How many recycled buffers a [`VecPool`] retains before dropping extras.
const MAX_RETAINED: usize = 8;

/// A source of reusable byte buffers for parser and generator sessions.
///
/// Sessions take a buffer when they start and recycle it when they close or
/// are dropped, so long-running services can amortize allocation across
/// many documents. Implementations must tolerate concurrent take/recycle
/// from different threads. A pool is always an injected capability carried
/// in the session config; there is no process-wide pool.
pub trait BufferPool: Send + Sync {
    /// Borrow a buffer. It arrives empty but may carry reused capacity.
    fn take(&self) -> Vec<u8>;

    /// Return a buffer for later reuse. The pool may drop it instead.
    fn recycle(&self, buf: Vec<u8>);
}

/// The default pool: a mutex-guarded stack of recycled buffers.
pub struct VecPool {
    free: Mutex<Vec<Vec<u8>>>,
}

impl VecPool {
    pub fn new() -> Self {
        VecPool {
            free: Mutex::new(Vec::new()),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Vec<u8>>> {
        // A panic while holding the lock leaves only recycled buffers
        // behind, which are safe to keep handing out.
        match self.free.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for VecPool {
    fn default() -> Self {
        VecPool::new()
    }
}

impl BufferPool for VecPool {
    fn take(&self) -> Vec<u8> {
        self.lock()
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(BUFFER_SIZE))
    }

    fn recycle(&self, mut buf: Vec<u8>) {
        if buf.capacity() == 0 {
            return;
        }
        buf.clear();
        let mut free = self.lock();
        if free.len() < MAX_RETAINED {
            free.push(buf);
        }
    }
}

impl fmt::Debug for VecPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VecPool")
            .field("retained", &self.lock().len())
            .finish()
    }
}

/// Scoped ownership of a pooled buffer.
///
/// Recycles itself into its pool of origin on drop, so every exit path of
/// a session, including panics and early errors, returns the buffer.
pub(crate) struct PooledBuf {
    buf: Vec<u8>,
    pool: Arc<dyn BufferPool>,
}

impl PooledBuf {
    pub(crate) fn take_from(pool: &Arc<dyn BufferPool>) -> Self {
        PooledBuf {
            buf: pool.take(),
            pool: Arc::clone(pool),
        }
    }

    /// Return the buffer to the pool now instead of at drop time.
    ///
    /// Leaves a zero-capacity stand-in behind, which the drop-time
    /// recycle ignores.
    pub(crate) fn release(&mut self) {
        self.pool.recycle(std::mem::take(&mut self.buf));
    }
}

impl Drop for PooledBuf {
    fn drop(&mut self) {
        self.pool.recycle(std::mem::take(&mut self.buf));
    }
}

impl Deref for PooledBuf {
    type Target = Vec<u8>;

    fn deref(&self) -> &Vec<u8> {
        &self.buf
    }
}

impl DerefMut for PooledBuf {
    fn deref_mut(&mut self) -> &mut Vec<u8> {
        &mut self.buf
    }
}

impl fmt::Debug for PooledBuf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PooledBuf")
            .field("len", &self.buf.len())
            .field("capacity", &self.buf.capacity())
            .finish()
    }
}
