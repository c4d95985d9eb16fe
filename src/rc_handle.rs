use crate::{
    error::{HandleError, Result},
    marker::*,
};
use log::{debug, trace};
use std::{
    any::type_name,
    cell::{Ref, RefCell, RefMut},
    cmp, fmt,
    fmt::Debug,
    hash::{Hash, Hasher},
    marker::PhantomData,
    mem,
    rc::{Rc, Weak},
};

/// Content ordered single-threaded handle.
///
/// Equality, ordering and hashing borrow the shared object. Mutating it
/// through another handle while a clone is a key in a set or map breaks
/// that collection, the same way a key with interior mutability would.
pub type RcHandleC<T> = RcHandle<T, ByContent>;

/// Address ordered single-threaded handle.
pub type RcHandleA<T> = RcHandle<T, ByAddress>;

/// Weak counterpart of [RcHandleC].
pub type RcWeakC<T> = RcWeak<T, ByContent>;

/// Weak counterpart of [RcHandleA].
pub type RcWeakA<T> = RcWeak<T, ByAddress>;

/// Nullable handle sharing an implementation object in [Rc].
///
/// Cloning the handle shares the object. The object is dropped as soon as
/// the last handle referring to it goes away.
pub struct RcHandle<T, E>
where
    E: EqKind,
{
    pub(crate) _phantom: PhantomData<E>,
    pub(crate) inner: Option<Rc<RefCell<T>>>,
}

impl<T, E> RcHandle<T, E>
where
    E: EqKind,
{
    /// Allocate a new implementation object.
    pub fn new(value: T) -> Self {
        Self::from_rc(Rc::new(RefCell::new(value)))
    }

    /// Build a handle referring to nothing.
    pub fn null() -> Self {
        Self {
            inner: None,
            _phantom: PhantomData,
        }
    }

    pub fn from_rc(rc: Rc<RefCell<T>>) -> Self {
        Self {
            inner: Some(rc),
            _phantom: PhantomData,
        }
    }

    /// Give up the handle and return the shared cell, if any.
    pub fn into_rc(mut this: RcHandle<T, E>) -> Option<Rc<RefCell<T>>> {
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
    /// The object previously referred to is released right away if this was
    /// its last handle. Assigning a handle to itself does nothing.
    pub fn assign(&mut self, other: &RcHandle<T, E>) {
        if Self::ptr_eq(self, other) {
            return;
        }

        trace!("reassigning handle to {}", type_name::<T>());
        let previous = mem::replace(self, other.clone());
        drop(previous);
    }

    /// Drop the reference and become null.
    pub fn reset(&mut self) {
        drop(self.take());
    }

    /// Move the reference out, leaving a null handle behind.
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Point to a fresh implementation object and return the previous handle.
    pub fn replace(&mut self, value: T) -> Self {
        mem::replace(self, Self::new(value))
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, T>> {
        let cell = self.inner.as_ref().ok_or(HandleError::Null)?;
        cell.try_borrow().map_err(|_| HandleError::BorrowConflict)
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, T>> {
        let cell = self.inner.as_ref().ok_or(HandleError::Null)?;
        cell.try_borrow_mut().map_err(|_| HandleError::BorrowConflict)
    }

    /// Immutably borrow the implementation object.
    ///
    /// # Panic
    /// The method panics if the handle is null or the object is mutably borrowed.
    pub fn borrow(&self) -> Ref<'_, T> {
        match self.try_borrow() {
            Ok(guard) => guard,
            Err(err) => panic!("unable to borrow {}: {}", type_name::<T>(), err),
        }
    }

    /// Mutably borrow the implementation object.
    ///
    /// # Panic
    /// The method panics if the handle is null or the object is borrowed.
    pub fn borrow_mut(&self) -> RefMut<'_, T> {
        match self.try_borrow_mut() {
            Ok(guard) => guard,
            Err(err) => panic!("unable to mutably borrow {}: {}", type_name::<T>(), err),
        }
    }

    /// Applies function `f` to the implementation object.
    pub fn with<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&T) -> R,
    {
        let guard = self.try_borrow()?;
        Ok(f(&*guard))
    }

    /// Applies function `f` to the mutable implementation object.
    pub fn with_mut<R, F>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> R,
    {
        let mut guard = self.try_borrow_mut()?;
        Ok(f(&mut *guard))
    }

    /// Check whether both handles refer to the same object or are both null.
    pub fn ptr_eq(this: &RcHandle<T, E>, other: &RcHandle<T, E>) -> bool {
        match (&this.inner, &other.inner) {
            (Some(lhs), Some(rhs)) => Rc::ptr_eq(lhs, rhs),
            (None, None) => true,
            _ => false,
        }
    }

    /// Get strong count on the implementation object, zero when null.
    pub fn strong_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Rc::strong_count)
    }

    /// Get weak count on the implementation object, zero when null.
    pub fn weak_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Rc::weak_count)
    }

    pub fn downgrade(&self) -> RcWeak<T, E> {
        RcWeak {
            inner: self.inner.as_ref().map(Rc::downgrade),
            _phantom: PhantomData,
        }
    }

    /// Take the implementation object out if this is its only handle.
    pub fn try_unwrap(mut self) -> Result<T, Self> {
        let Some(rc) = self.inner.take() else {
            return Err(self);
        };

        match Rc::try_unwrap(rc) {
            Ok(cell) => Ok(cell.into_inner()),
            Err(rc) => {
                debug!(
                    "refusing to unwrap {} shared by {} handles",
                    type_name::<T>(),
                    Rc::strong_count(&rc)
                );
                self.inner = Some(rc);
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
        self.inner.as_ref().map(|rc| Rc::as_ptr(rc) as *const ())
    }
}

impl<T, E> Drop for RcHandle<T, E>
where
    E: EqKind,
{
    fn drop(&mut self) {
        if let Some(rc) = self.inner.take() {
            if let Some(cell) = Rc::into_inner(rc) {
                trace!("releasing {}", type_name::<T>());
                drop(cell);
            }
        }
    }
}

impl<T, E> Clone for RcHandle<T, E>
where
    E: EqKind,
{
    /// Share the implementation object and increase its reference count.
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _phantom: PhantomData,
        }
    }
}

impl<T, E> Default for RcHandle<T, E>
where
    E: EqKind,
{
    fn default() -> Self {
        Self::null()
    }
}

impl<T, E> Debug for RcHandle<T, E>
where
    T: Debug,
    E: EqKind,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match &self.inner {
            None => f.write_str("Null"),
            Some(cell) => match cell.try_borrow() {
                Ok(value) => f.debug_tuple("RcHandle").field(&*value).finish(),
                Err(_) => f.write_str("RcHandle(<borrowed>)"),
            },
        }
    }
}

impl<T> PartialEq<Self> for RcHandle<T, ByContent>
where
    T: PartialEq<T>,
{
    fn eq(&self, other: &Self) -> bool {
        match (&self.inner, &other.inner) {
            (Some(lhs), Some(rhs)) => Rc::ptr_eq(lhs, rhs) || *lhs.borrow() == *rhs.borrow(),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T> Eq for RcHandle<T, ByContent> where T: Eq {}

impl<T> PartialOrd<Self> for RcHandle<T, ByContent>
where
    T: PartialOrd<T>,
{
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        match (&self.inner, &other.inner) {
            (Some(lhs), Some(rhs)) if Rc::ptr_eq(lhs, rhs) => Some(cmp::Ordering::Equal),
            (Some(lhs), Some(rhs)) => lhs.borrow().partial_cmp(&*rhs.borrow()),
            (lhs, rhs) => lhs.is_some().partial_cmp(&rhs.is_some()),
        }
    }
}

impl<T> Ord for RcHandle<T, ByContent>
where
    T: Ord,
{
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        match (&self.inner, &other.inner) {
            (Some(lhs), Some(rhs)) if Rc::ptr_eq(lhs, rhs) => cmp::Ordering::Equal,
            (Some(lhs), Some(rhs)) => lhs.borrow().cmp(&*rhs.borrow()),
            (lhs, rhs) => lhs.is_some().cmp(&rhs.is_some()),
        }
    }
}

impl<T> Hash for RcHandle<T, ByContent>
where
    T: Hash,
{
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        match &self.inner {
            Some(cell) => {
                state.write_u8(1);
                cell.borrow().hash(state);
            }
            None => state.write_u8(0),
        }
    }
}

impl<T> PartialEq<Self> for RcHandle<T, ByAddress> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T> Eq for RcHandle<T, ByAddress> {}

impl<T> PartialOrd<Self> for RcHandle<T, ByAddress> {
    fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for RcHandle<T, ByAddress> {
    fn cmp(&self, other: &Self) -> cmp::Ordering {
        self.addr().cmp(&other.addr())
    }
}

impl<T> Hash for RcHandle<T, ByAddress> {
    fn hash<H>(&self, state: &mut H)
    where
        H: Hasher,
    {
        self.addr().hash(state);
    }
}

impl<T, E> From<T> for RcHandle<T, E>
where
    E: EqKind,
{
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T, E> From<Option<T>> for RcHandle<T, E>
where
    E: EqKind,
{
    fn from(value: Option<T>) -> Self {
        value.map_or_else(Self::null, Self::new)
    }
}

impl<T, E> From<Rc<RefCell<T>>> for RcHandle<T, E>
where
    E: EqKind,
{
    fn from(rc: Rc<RefCell<T>>) -> Self {
        Self::from_rc(rc)
    }
}

/// Non-owning observer of an implementation object shared by [RcHandle]s.
pub struct RcWeak<T, E>
where
    E: EqKind,
{
    _phantom: PhantomData<E>,
    inner: Option<Weak<RefCell<T>>>,
}

impl<T, E> RcWeak<T, E>
where
    E: EqKind,
{
    /// Build a weak handle observing nothing.
    pub fn new() -> Self {
        Self {
            inner: None,
            _phantom: PhantomData,
        }
    }

    /// Obtain a strong handle, or a null one if the object was released.
    pub fn upgrade(&self) -> RcHandle<T, E> {
        RcHandle {
            inner: self.inner.as_ref().and_then(Weak::upgrade),
            _phantom: PhantomData,
        }
    }

    pub fn try_upgrade(&self) -> Result<RcHandle<T, E>> {
        let weak = self.inner.as_ref().ok_or(HandleError::Null)?;
        weak.upgrade()
            .map(RcHandle::from_rc)
            .ok_or(HandleError::Expired)
    }

    pub fn is_expired(&self) -> bool {
        self.strong_count() == 0
    }

    pub fn strong_count(&self) -> usize {
        self.inner.as_ref().map_or(0, Weak::strong_count)
    }

    pub fn ptr_eq(this: &RcWeak<T, E>, other: &RcWeak<T, E>) -> bool {
        match (&this.inner, &other.inner) {
            (Some(lhs), Some(rhs)) => Weak::ptr_eq(lhs, rhs),
            (None, None) => true,
            _ => false,
        }
    }
}

impl<T, E> Clone for RcWeak<T, E>
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

impl<T, E> Default for RcWeak<T, E>
where
    E: EqKind,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> Debug for RcWeak<T, E>
where
    E: EqKind,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        f.write_str("(Weak)")
    }
}
