//! Thread-local pool of read buffers.

use std::cell::RefCell;

/// Buffers larger than this are dropped instead of pooled.
pub const MAX_POOLED_CAPACITY: usize = 1024 * 1024; // 1 MiB

/// Maximum number of buffers to keep per thread.
pub const MAX_POOL_SIZE: usize = 4;

/// A zero-filled scratch buffer of a fixed length, returned to the
/// thread-local pool on drop.
#[derive(Debug)]
pub struct ReadBuffer {
    data: Vec<u8>,
}

impl ReadBuffer {
    /// Takes a buffer from the thread-local pool (or allocates one) and
    /// sizes it to `len` bytes.
    pub fn take(len: usize) -> Self {
        let mut data = THREAD_BUFFER_POOL
            .with(|pool| pool.borrow_mut().pop())
            .unwrap_or_default();
        data.clear();
        data.resize(len, 0);
        Self { data }
    }

    /// Returns the whole buffer for reading into.
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns the first `n` bytes.
    pub fn filled(&self, n: usize) -> &[u8] {
        &self.data[..n]
    }
}

impl Drop for ReadBuffer {
    fn drop(&mut self) {
        if self.data.capacity() <= MAX_POOLED_CAPACITY {
            self.data.clear();
            THREAD_BUFFER_POOL.with(|pool| {
                let mut pool = pool.borrow_mut();
                if pool.len() < MAX_POOL_SIZE {
                    pool.push(std::mem::take(&mut self.data));
                }
            });
        }
    }
}

// Thread-local buffer pool
thread_local! {
    static THREAD_BUFFER_POOL: RefCell<Vec<Vec<u8>>> = const { RefCell::new(Vec::new()) };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_sizes_buffer() {
        let buf = ReadBuffer::take(4096);
        assert_eq!(buf.data.len(), 4096);
    }

    #[test]
    fn test_reused_buffer_is_zeroed_and_resized() {
        {
            let mut buf = ReadBuffer::take(16);
            buf.as_mut_slice().fill(0xFF);
        }

        let buf = ReadBuffer::take(8);
        assert_eq!(buf.data.len(), 8);
        assert!(buf.filled(8).iter().all(|&b| b == 0));
    }

    #[test]
    fn test_reuse_keeps_capacity() {
        {
            let _buf = ReadBuffer::take(1024);
        }
        let buf = ReadBuffer::take(4);
        assert!(buf.data.capacity() >= 4);
    }
}
