//! Shared backing arrays
//!
//! A [`PixelBuffer`] is the unit of storage identity: two rasters alias
//! exactly when their buffers are the same allocation. Cloning a buffer
//! clones the handle, not the pixels.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Element types a raster can be stored in.
pub trait Element: Copy + Default + Send + Sync + 'static {
    /// Widen to a 32-bit word.
    fn to_word(self) -> u32;
    /// Narrow from a 32-bit word, keeping the low bits.
    fn from_word(word: u32) -> Self;
}

impl Element for u32 {
    #[inline(always)]
    fn to_word(self) -> u32 {
        self
    }
    #[inline(always)]
    fn from_word(word: u32) -> Self {
        word
    }
}

impl Element for u16 {
    #[inline(always)]
    fn to_word(self) -> u32 {
        self as u32
    }
    #[inline(always)]
    fn from_word(word: u32) -> Self {
        word as u16
    }
}

impl Element for u8 {
    #[inline(always)]
    fn to_word(self) -> u32 {
        self as u32
    }
    #[inline(always)]
    fn from_word(word: u32) -> Self {
        word as u8
    }
}

/// Shared, lock-protected backing array.
pub struct PixelBuffer<T> {
    inner: Arc<RwLock<Vec<T>>>,
}

impl<T> Clone for PixelBuffer<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Element> PixelBuffer<T> {
    /// Allocate a zero-filled buffer of `len` elements.
    pub fn new(len: usize) -> Self {
        Self::from_vec(vec![T::default(); len])
    }

    /// Wrap an existing vector.
    pub fn from_vec(data: Vec<T>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(data)),
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check whether the buffer has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy the contents out.
    pub fn to_vec(&self) -> Vec<T> {
        self.read().clone()
    }

    /// Take the vector back if this is the last handle.
    pub fn into_vec(self) -> Option<Vec<T>> {
        Arc::try_unwrap(self.inner)
            .ok()
            .map(|lock| lock.into_inner().unwrap_or_else(PoisonError::into_inner))
    }

    /// Lock for reading.
    ///
    /// Pixel data stays valid after a panicking writer, so poisoning is
    /// ignored.
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<T>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Lock for writing.
    pub fn write(&self) -> RwLockWriteGuard<'_, Vec<T>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Identity of the underlying allocation.
    pub fn id(&self) -> StorageId {
        StorageId(Arc::as_ptr(&self.inner) as *const () as usize)
    }

    /// Check whether two handles share one allocation.
    pub fn same_buffer(&self, other: &PixelBuffer<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: Element> fmt::Debug for PixelBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelBuffer")
            .field("id", &self.id())
            .field("len", &self.len())
            .finish()
    }
}

/// Opaque identity of a backing allocation, comparable across element types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StorageId(usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clone_shares_storage() {
        let a = PixelBuffer::<u32>::new(4);
        let b = a.clone();
        assert!(a.same_buffer(&b));
        b.write()[2] = 7;
        assert_eq!(a.to_vec(), vec![0, 0, 7, 0]);
    }

    #[test]
    fn test_distinct_buffers() {
        let a = PixelBuffer::<u32>::new(4);
        let b = PixelBuffer::<u32>::new(4);
        assert!(!a.same_buffer(&b));
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_into_vec_needs_sole_handle() {
        let a = PixelBuffer::from_vec(vec![1u32, 2]);
        let b = a.clone();
        assert!(a.into_vec().is_none());
        assert_eq!(b.into_vec(), Some(vec![1, 2]));
    }

    #[test]
    fn test_element_narrowing() {
        assert_eq!(u16::from_word(0x1_2345), 0x2345);
        assert_eq!(u8::from_word(0x1FF), 0xFF);
    }
}
