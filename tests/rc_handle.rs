use implshare::{HandleError, RcHandleA, RcHandleC, RcWeakA};
use indexmap::IndexSet;
use std::{cell::Cell, rc::Rc};

struct Texture {
    id: u32,
    width: u32,
    drops: Rc<Cell<usize>>,
}

impl Drop for Texture {
    fn drop(&mut self) {
        self.drops.set(self.drops.get() + 1);
    }
}

fn texture(id: u32) -> (RcHandleA<Texture>, Rc<Cell<usize>>) {
    let drops = Rc::new(Cell::new(0));
    let handle = RcHandleA::new(Texture {
        id,
        width: 64,
        drops: drops.clone(),
    });
    (handle, drops)
}

#[test]
fn rc_handle_shared_mutation() {
    let (a, _) = texture(1);
    let b = a.clone();

    b.borrow_mut().width = 256;
    assert_eq!(a.borrow().width, 256);

    a.with_mut(|tex| tex.width = 32).unwrap();
    assert_eq!(b.with(|tex| tex.width), Ok(32));
    assert!(RcHandleA::ptr_eq(&a, &b));
}

#[test]
fn rc_handle_null() {
    let mut handle: RcHandleA<Texture> = RcHandleA::default();
    assert!(handle.is_null());
    assert!(!handle.is_valid());
    assert_eq!(handle.strong_count(), 0);
    assert_eq!(handle.with(|tex| tex.id), Err(HandleError::Null));
    assert!(matches!(handle.try_borrow_mut(), Err(HandleError::Null)));

    let (other, _) = texture(5);
    handle.assign(&other);
    assert!(handle.is_valid());
    assert_eq!(handle.borrow().id, 5);
}

#[test]
#[should_panic]
fn rc_handle_borrow_null() {
    let handle: RcHandleA<u8> = RcHandleA::null();
    let _ = handle.borrow();
}

#[test]
fn rc_handle_release_on_last_drop() {
    let (a, drops) = texture(1);
    let b = a.clone();
    let c = b.clone();
    assert_eq!(a.strong_count(), 3);

    drop(a);
    drop(c);
    assert_eq!(drops.get(), 0);
    assert_eq!(b.borrow().id, 1);
    assert_eq!(b.borrow().width, 64);

    drop(b);
    assert_eq!(drops.get(), 1);
}

#[test]
fn rc_handle_assign() {
    let (mut a, drops_a) = texture(1);
    let (b, drops_b) = texture(2);

    a.assign(&b);
    assert_eq!(drops_a.get(), 1);
    assert_eq!(a.borrow().id, 2);
    assert_eq!(b.strong_count(), 2);

    let null = RcHandleA::null();
    a.assign(&null);
    assert!(a.is_null());
    assert_eq!(b.strong_count(), 1);
    assert_eq!(drops_b.get(), 0);
}

#[test]
fn rc_handle_self_assign() {
    let (mut a, drops) = texture(1);
    let same = a.clone();

    a.assign(&same);
    assert_eq!(a.strong_count(), 2);
    assert_eq!(a.borrow().id, 1);
    assert_eq!(drops.get(), 0);

    let mut null: RcHandleA<Texture> = RcHandleA::null();
    null.assign(&RcHandleA::null());
    assert!(null.is_null());
}

#[test]
fn rc_handle_escape_scope() {
    fn load(drops: &Rc<Cell<usize>>) -> RcHandleA<Texture> {
        let local = RcHandleA::new(Texture {
            id: 9,
            width: 16,
            drops: drops.clone(),
        });
        local.clone()
    }

    let drops = Rc::new(Cell::new(0));
    let handle = load(&drops);
    assert_eq!(handle.strong_count(), 1);

    let mut list = Vec::new();
    for _ in 0..100 {
        list.push(handle.clone());
    }
    let set: IndexSet<_> = list.iter().cloned().collect();
    assert_eq!(set.len(), 1);
    assert_eq!(handle.strong_count(), 102);

    drop(list);
    drop(set);
    assert_eq!(drops.get(), 0);
    assert_eq!(handle.borrow().id, 9);

    drop(handle);
    assert_eq!(drops.get(), 1);
}

#[test]
fn rc_handle_borrow_conflict() {
    let (a, _) = texture(1);
    let b = a.clone();

    let guard = a.borrow_mut();
    assert!(matches!(b.try_borrow(), Err(HandleError::BorrowConflict)));
    assert_eq!(format!("{:?}", HandleError::BorrowConflict), "BorrowConflict");
    drop(guard);

    let guard = a.borrow();
    assert!(b.try_borrow().is_ok());
    assert!(matches!(b.try_borrow_mut(), Err(HandleError::BorrowConflict)));
    drop(guard);
}

#[test]
fn rc_handle_take_replace() {
    let (mut a, drops) = texture(1);

    let taken = a.take();
    assert!(a.is_null());
    assert_eq!(taken.borrow().id, 1);

    let previous = a.replace(Texture {
        id: 2,
        width: 8,
        drops: drops.clone(),
    });
    assert!(previous.is_null());
    assert_eq!(a.borrow().id, 2);

    a.reset();
    assert_eq!(drops.get(), 1);
    drop(taken);
    assert_eq!(drops.get(), 2);
}

#[test]
fn rc_handle_unwrap() {
    let a = RcHandleC::new(String::from("pixels"));
    let b = a.clone();

    let a = a.try_unwrap().unwrap_err();
    assert_eq!(a.strong_count(), 2);

    drop(b);
    assert_eq!(a.unwrap(), "pixels");

    let null: RcHandleC<String> = RcHandleC::null();
    assert!(null.try_unwrap().unwrap_err().is_null());
}

#[test]
fn rc_handle_a_cmp() {
    let own1 = RcHandleA::new('a');
    let own2 = RcHandleA::new('a');
    assert!(own1 != own2);
    assert_eq!(own1, own1.clone());
    assert_eq!(RcHandleA::<char>::null(), RcHandleA::null());
    assert!(RcHandleA::null() < own1);

    let set: IndexSet<_> = [own1.clone(), own2.clone(), own1.clone()]
        .into_iter()
        .collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn rc_handle_c_cmp() {
    let own1 = RcHandleC::new('a');
    let own2 = RcHandleC::new('a');
    let own3 = RcHandleC::new('b');
    assert_eq!(own1, own2);
    assert!(own1 < own3);
    assert!(RcHandleC::null() < own1);
    assert_eq!(RcHandleC::<char>::null(), RcHandleC::null());

    let mut sorted = vec![own3.clone(), RcHandleC::null(), own1.clone()];
    sorted.sort();
    assert!(sorted[0].is_null());
    assert_eq!(*sorted[1].borrow(), 'a');
    assert_eq!(*sorted[2].borrow(), 'b');

    let set: IndexSet<_> = [own1, own2, own3].into_iter().collect();
    assert_eq!(set.len(), 2);
}

#[test]
fn rc_handle_debug() {
    assert_eq!(format!("{:?}", RcHandleA::<u8>::null()), "Null");
    assert_eq!(format!("{:?}", RcHandleA::new(3u8)), "RcHandle(3)");

    let handle = RcHandleA::new(3u8);
    let _guard = handle.borrow_mut();
    assert_eq!(format!("{:?}", handle), "RcHandle(<borrowed>)");
}

#[test]
fn rc_weak() {
    let (strong, drops) = texture(4);
    let weak = strong.downgrade();
    assert_eq!(strong.weak_count(), 1);
    assert_eq!(weak.strong_count(), 1);
    assert!(!weak.is_expired());

    let upgraded = weak.try_upgrade().unwrap();
    assert_eq!(upgraded.borrow().id, 4);
    assert!(RcWeakA::ptr_eq(&weak, &upgraded.downgrade()));
    drop(upgraded);

    drop(strong);
    assert_eq!(drops.get(), 1);
    assert!(weak.is_expired());
    assert!(weak.upgrade().is_null());
    assert!(matches!(weak.try_upgrade(), Err(HandleError::Expired)));

    let empty: RcWeakA<Texture> = RcWeakA::default();
    assert!(matches!(empty.try_upgrade(), Err(HandleError::Null)));
    assert!(RcHandleA::<Texture>::null().downgrade().is_expired());
}
