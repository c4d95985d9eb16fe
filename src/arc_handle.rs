use crate::{
    error::{HandleError, Result},
    marker::*,
};
use log::{debug, trace};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::{
    any::type_name,
    cmp, fmt,
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem,
    sync::{Arc, Weak},
};

/// Content ordered thread-safe handle.
///
/// Equality, ordering and hashing read the shared object. Mutating it
/// through another handle while a clone is a key in a set or map breaks
/// that collection, the same way a key with interior mutability would.
pub type ArcHandleC<T> = ArcHandle<T, ByContent>;

/// Address ordered thread-safe handle.
pub type ArcHandleA<T> = ArcHandle<T, ByAddress>;

/// Weak counterpart of [ArcHandleC].
pub type ArcWeakC<T> = ArcWeak<T, ByContent>;

/// Weak counterpart of [ArcHandleA].
pub type ArcWeakA<T> = ArcWeak<T, ByAddress>;

/// Nullable handle sharing an implementation object in [Arc].
///
/// The thread-safe sibling of [RcHandle](crate::RcHandle). The object sits
/// behind a reader-writer lock and is dropped by whichever thread releases
/// the last handle.
pub struct ArcHandle<T, E>
where
    E: EqKind,
{
    pub(crate) _phantom: PhantomData<E>,
    pub(crate) inner: Option<Arc<RwLock<T>>>,
}

impl<T, E> ArcHandle<T, E>
where
    E: EqKind,
{
    /// Allocate a new implementation object.
    pub fn new(value: T) -> Self {
        Self::from_arc(Arc::new(RwLock::new(value)))
    }

    /// Build a handle referring to nothing.
    pub fn null() -> Self {
        Self {
            inner: None,
            _phantom: PhantomData,
        }
    }

    pub fn from_arc(arc: Arc<RwLock<T>>) -> Self {
        Self {
            inner: Some(arc),
            _phantom: PhantomData,
        }
    }

    pub fn into_arc(mut this: ArcHandle<T, E>) -> Option<Arc<RwLock<T>>> {
        this.inner.take()
    }

    pub fn is_null(&self) -> bool {
        self.inner.is_none()
    }

    pub fn is_valid(&self) -> bool {
        self.inner.is_some()
    }

    /// Make this handle share the implementation object of `other`.
    ///
    /// Assigning a handle to itself does nothing.
    pub fn assign(&mut self, other: &ArcHandle<T, E>) {
        if Self::ptr_eq(self, other) {
            return;
        }

        trace!("reassigning handle to {}", type_name::<T>());
        let previous = mem::replace(self, other.clone());
        drop(previous);
    }

    pub fn reset(&mut self) {
        drop(self.take());
    }

    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    pub fn replace(&mut self, value: T) -> Self {
        mem::replace(self, Self::new(value))
    }

    /// Lock the implementation object for reading without blocking.
    pub fn try_read(&self) -> Result<RwLockReadGuard<'_, T>> {
        let lock = self.inner.as_ref().ok_or(HandleError::Null)?;
        lock.try_read().ok_or(HandleError::BorrowConflict)
    }

    /// Lock the implementation object for writing without blocking.
    pub fn try_write(&self) -> Result<RwLockWriteGuard<'_, T>> {
        let lock = self.inner.as_ref().ok_or(HandleError::Null)?;
        lock.try_write().ok_or(HandleError::BorrowConflict)
    }

    /// Lock the implementation object for reading, blocking while a writer holds it.
    ///
    /// # Panic
    /// The method panics if the handle is null.
    pub fn read(&self) -> RwLockReadGuard<'_, T> {
        match &self.inner {
            Some(lock) => lock.read(),
            None => panic!("unable to read {}: {}", type_name::<T>(), HandleError::Null),
        }
    }

    /// Lock the implementation object for writing, blocking while it is held.
    ///
    /// # Panic
    /// The method panics if the handle is null.
    pub fn write(&self) -> RwLockWriteGuard<'_, T> {
        match &self.inner {
            Some(lock) => lock.write(),
            None => panic!("unable to write {}: {}", type_name::<T>(), HandleError::Null),
        }
    }

    /// Applies function `f` to the implementation object under a read lock.
    pub fn with<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&T) -> R,
    {
        let lock = self.inner.as_ref().ok_or(HandleError::Null)?;
        Ok(f(&*lock.read()))
    }

    /// Applies function `f` to the implementation object under a write lock.
    pub fn with_mut<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let lock = self.inner.as_ref().ok_or(HandleError::Null)?;
        Ok(f(&mut *lock.write()))
    }

    pub fn ptr_eq(this: &ArcHandle<T, E>, other: &ArcHandle<T, E>) -> bool {
        match (&this.inner, &other.inner) {
            (Some(lhs), Some(rhs)) => Arc::ptr_eq(lhs, rhs),
            (None, None) => true,
            _ => false,
        }
    }

    pub fn strong_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Arc::strong_count)
    }

    pub fn weak_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Arc::weak_count)
    }

    pub fn downgrade(&self) -> ArcWeak<T, E> {
        ArcWeak {
            inner: self.inner.as_ref().map(Arc::downgrade),
            _phantom: PhantomData,
        }
    }

    /// Take the implementation object out if this is its only handle.
    pub fn try_unwrap(mut self) -> Result<T, Self> {
        let Some(arc) = self.inner.take() else {
            return Err(self);
        };

        match Arc::try_unwrap(arc) {
            Ok(lock) => Ok(lock.into_inner()),
            Err(arc) => {
                debug!(
                    "refusing to unwrap {} shared by {} handles",
                    type_name::<T>(),
                    Arc::strong_count(&arc)
                );
                self.inner = Some(arc);
                Err(self)
            }
        }
    }

    /// Take the implementation object out.
    ///
    /// # Panic
    /// The method panics if the handle is null or strong count is not 1.
    pub fn unwrap(self) -> T {
        self.try_unwrap().unwrap_or_else(|this| {
            if this.is_null() {
                panic!("unable to unwrap a null handle")
            } else {
                panic!("unable to unwrap because strong count is greater than 1")
            }
        })
    }

    fn addr(&self) -> Option<*const ()> {
        self.inner.as_ref().map(|arc| Arc::as_ptr(arc) as *const ())
    }
}

impl<T, E> Drop for ArcHandle<T, E>
where
    E: EqKind,
{
    fn drop(&mut self) {
        // into_inner succeeds on exactly one thread
        if let Some(arc) = self.inner.take() {
            if let Some(lock) = Arc::into_inner(arc) {
                trace!("releasing {}", type_name::<T>());
                drop(lock);
            }
        }
    }
}

impl<T, E> Clone for ArcHandle<T, E>
where
    E: EqKind,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T, E> Default for ArcHandle<T, E>
where
    E: EqKind,
{
    fn default() -> Self {
        Self::null()
    }
}

impl<T, E> Debug for ArcHandle<T, E>
where
    T: Debug,
    E: EqKind,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.inner {
            None => f.write_str("Null"),
            Some(lock) => match lock.try_read() {
                Some(value) => f.debug_tuple("ArcHandle").field(&*value).finish(),
                None => f.write_str("ArcHandle(<locked>)"),
            },
        }
    }
}

/// Read-lock two distinct objects and apply `f` to them in argument order.
///
/// Locks are always taken in address order so that concurrent comparisons
/// of the same pair cannot wait on each other behind a parked writer.
fn read_both<T, R, F>(lhs: &Arc<RwLock<T>>, rhs: &Arc<RwLock<T>>, f: F) -> R
where
    F: FnOnce(&T, &T) -> R,
{
    if Arc::as_ptr(lhs) < Arc::as_ptr(rhs) {
        let lhs = lhs.read();
        let rhs = rhs.read();
        f(&*lhs, &*rhs)
    } else {
        let rhs = rhs.read();
        let lhs = lhs.read();
        f(&*lhs, &*rhs)
    }
}

impl<T> PartialEq<Self> for ArcHandle<T, ByContent>
where
    T: PartialEq<T>,
{
    fn eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (Some(lhs), Some(rhs)) => {
                Arc::ptr_eq(lhs, rhs) || read_both(lhs, rhs, |lhs, rhs| lhs == rhs)
            }
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T> Eq for ArcHandle<T, ByContent> where T: Eq {}

impl<T> PartialOrd<Self> for ArcHandle<T, ByContent>
where
    T: PartialOrd<T>,
{
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        match (&self.inner, &other.inner) {
            (Some(lhs), Some(rhs)) if Arc::ptr_eq(lhs, rhs) => Some(cmp::Ordering::Equal),
            (Some(lhs), Some(rhs)) => read_both(lhs, rhs, |lhs, rhs| lhs.partial_cmp(rhs)),
            (lhs, rhs) => lhs.is_some().partial_cmp(&rhs.is_some()),
        }
    }
}

impl<T> Ord for ArcHandle<T, ByContent>
where
    T: Ord,
{
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (&self.inner, &other.inner) {
            (Some(lhs), Some(rhs)) if Arc::ptr_eq(lhs, rhs) => cmp::Ordering::Equal,
            (Some(lhs), Some(rhs)) => read_both(lhs, rhs, |lhs, rhs| lhs.cmp(rhs)),
            (lhs, rhs) => lhs.is_some().cmp(&rhs.is_some()),
        }
    }
}

impl<T> Hash for ArcHandle<T, ByContent>
where
    T: Hash,
{
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        match &self.inner {
            Some(lock) => {
                state.write_u8(1);
                lock.read().hash(state);
            }
            None => state.write_u8(0),
        }
    }
}

impl<T> PartialEq<Self> for ArcHandle<T, ByAddress> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T> Eq for ArcHandle<T, ByAddress> {}

impl<T> PartialOrd<Self> for ArcHandle<T, ByAddress> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ArcHandle<T, ByAddress> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.addr().cmp(&other.addr())
    }
}

impl<T> Hash for ArcHandle<T, ByAddress> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.addr().hash(state);
    }
}

impl<T, E> From<T> for ArcHandle<T, E>
where
    E: EqKind,
{
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T, E> From<Option<T>> for ArcHandle<T, E>
where
    E: EqKind,
{
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Self::new)
    }
}

impl<T, E> From<Arc<RwLock<T>>> for ArcHandle<T, E>
where
    E: EqKind,
{
    fn from(arc: Arc<RwLock<T>>) -> Self {
        Self::from_arc(arc)
    }
}

/// Non-owning observer of an implementation object shared by [ArcHandle]s.
pub struct ArcWeak<T, E>
where
    E: EqKind,
{
    _phantom: PhantomData<E>,
    inner: Option<Weak<RwLock<T>>>,
}

impl<T, E> ArcWeak<T, E>
where
    E: EqKind,
{
    pub fn new() -> Self {
        Self {
            inner: None,
            _phantom: PhantomData,
        }
    }

    /// Obtain a strong handle, or a null one if the object was released.
    pub fn upgrade(&self) -> ArcHandle<T, E> {
        ArcHandle {
            inner: self.inner.as_ref().and_then(Weak::upgrade),
            _phantom: PhantomData,
        }
    }

    pub fn try_upgrade(&self) -> Result<ArcHandle<T, E>> {
        let weak = self.inner.as_ref().ok_or(HandleError::Null)?;
        weak.upgrade()
            .map(ArcHandle::from_arc)
            .ok_or(HandleError::Expired)
    }

    pub fn is_expired(&self) -> bool {
        self.strong_count() == 0
    }

    pub fn strong_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Weak::strong_count)
    }

    pub fn ptr_eq(this: &ArcWeak<T, E>, other: &ArcWeak<T, E>) -> bool {
        match (&this.inner, &other.inner) {
            (Some(lhs), Some(rhs)) => Weak::ptr_eq(lhs, rhs),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T, E> Clone for ArcWeak<T, E>
where
    E: EqKind,
{
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T, E> Default for ArcWeak<T, E>
where
    E: EqKind,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Debug for ArcWeak<T, E>
where
    E: EqKind,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str("(Weak)")
    }
}
