//! Implicitly shared, nullable handles to reference counted implementation objects.
//!
//! A handle is a small value referring to a hidden implementation object that
//! holds the actual state. It has the following features:
//!
//! - Cloning or assigning a handle shares the implementation object; the object
//!   itself is never copied.
//! - A default handle is null and refers to nothing.
//! - The implementation object is dropped right when the last handle referring
//!   to it goes away, not at some later time.
//! - Handles are compared either by object identity or by object content.
//!
//! The following table shows the handle types. The generic `T` denotes the
//! implementation object type.
//!
//! | threading \\ ordering | Content ordered               | Pointer address ordered       |
//! |---------------------- | ----------------------------- | ----------------------------- |
//! | Single thread ([Rc](std::rc::Rc))   | [RcHandleC<T>](RcHandleC)   | [RcHandleA<T>](RcHandleA)   |
//! | Thread-safe ([Arc](std::sync::Arc)) | [ArcHandleC<T>](ArcHandleC) | [ArcHandleA<T>](ArcHandleA) |
//!
//! # Wrapping an implementation object
//!
//! The public type is a thin wrapper around a handle. Its state lives in a
//! private implementation type.
//!
//! ```
//! use implshare::RcHandleA;
//!
//! struct TextureData {
//!     id: u32,
//!     width: u32,
//!     height: u32,
//! }
//!
//! #[derive(Clone, Default)]
//! pub struct Texture {
//!     data: RcHandleA<TextureData>,
//! }
//!
//! impl Texture {
//!     pub fn new(id: u32, width: u32, height: u32) -> Self {
//!         Self {
//!             data: RcHandleA::new(TextureData { id, width, height }),
//!         }
//!     }
//!
//!     pub fn id(&self) -> Option<u32> {
//!         self.data.with(|data| data.id).ok()
//!     }
//!
//!     pub fn resize(&self, width: u32, height: u32) {
//!         let mut data = self.data.borrow_mut();
//!         data.width = width;
//!         data.height = height;
//!     }
//!
//!     pub fn size(&self) -> (u32, u32) {
//!         let data = self.data.borrow();
//!         (data.width, data.height)
//!     }
//! }
//!
//! let a = Texture::new(1, 64, 64);
//! let b = a.clone(); // shares the same object
//! b.resize(128, 32);
//! assert_eq!(a.size(), (128, 32));
//!
//! let empty = Texture::default();
//! assert_eq!(empty.id(), None);
//! ```
//!
//! # Null state and assignment
//!
//! ```
//! use implshare::RcHandleA;
//!
//! let mut a: RcHandleA<String> = RcHandleA::default();
//! assert!(a.is_null());
//!
//! let b = RcHandleA::new(String::from("payload"));
//! a.assign(&b);
//! assert!(a.is_valid());
//! assert!(RcHandleA::ptr_eq(&a, &b));
//! assert_eq!(b.strong_count(), 2);
//!
//! // assigning a handle to itself changes nothing
//! let same = a.clone();
//! a.assign(&same);
//! assert_eq!(b.strong_count(), 3);
//!
//! a.reset();
//! assert!(a.is_null());
//! ```
//!
//! # Release
//!
//! The implementation object is released by the last handle. [RcHandle::try_unwrap]
//! recovers the object instead when only one handle is left.
//!
//! ```
//! use implshare::RcHandleC;
//!
//! let a = RcHandleC::new(vec![1, 2, 3]);
//! let b = a.clone();
//!
//! let a = a.try_unwrap().unwrap_err(); // still shared
//! drop(b);
//! assert_eq!(a.unwrap(), vec![1, 2, 3]);
//! ```
//!
//! # Ordering
//!
//! [RcHandleA] is ordered by object identity. Two distinct objects holding the
//! same value are different.
//!
//! ```
//! # use implshare::RcHandleA;
//! let own1 = RcHandleA::new('a');
//! let own2 = RcHandleA::new('a');
//! assert!(own1 != own2);
//! assert!(own1 == own1.clone());
//! ```
//!
//! [RcHandleC] is ordered by object content.
//!
//! ```
//! # use implshare::RcHandleC;
//! let own1 = RcHandleC::new('a');
//! let own2 = RcHandleC::new('a');
//! assert!(own1 == own2);
//! assert!(RcHandleC::null() < own1);
//! ```
//!
//! # Weak handles
//!
//! A weak handle observes an implementation object without keeping it alive.
//!
//! ```
//! # use implshare::{HandleError, RcHandleA};
//! let strong = RcHandleA::new(7u8);
//! let weak = strong.downgrade();
//! assert_eq!(*weak.upgrade().borrow(), 7);
//!
//! drop(strong);
//! assert!(weak.upgrade().is_null());
//! assert_eq!(weak.try_upgrade().unwrap_err(), HandleError::Expired);
//! ```
//!
//! # Threads
//!
//! [ArcHandle] shares the implementation object across threads behind a
//! reader-writer lock.
//!
//! ```
//! # use implshare::ArcHandleA;
//! let counter = ArcHandleA::new(0usize);
//!
//! let workers: Vec<_> = (0..4)
//!     .map(|_| {
//!         let counter = counter.clone();
//!         std::thread::spawn(move || {
//!             *counter.write() += 1;
//!         })
//!     })
//!     .collect();
//! workers.into_iter().for_each(|worker| worker.join().unwrap());
//!
//! assert_eq!(*counter.read(), 4);
//! ```

mod arc_handle;
mod error;
pub mod marker;
mod rc_handle;
#[cfg(feature = "serde")]
mod serde_impl;

pub use arc_handle::*;
pub use error::HandleError;
pub use rc_handle::*;
