use std::{
    cell::{Ref, RefCell},
    rc::{Rc, Weak},
};

use derive_ex::derive_ex;

use crate::{
    core::{BindKey, BindSource, Dirty, SinkBindings, Slot},
    signal::{SignalNode, ToSignal},
    ActionContext, Signal, SignalContext,
};


/// Writable reactive cell.
///
/// Cloning a `State` yields another handle to the same cell.
#[derive_ex(Clone, bound())]
pub struct State<T: 'static>(Rc<StateNode<T>>);

impl<T: 'static> State<T> {
    pub fn new(value: T) -> Self {
        Self(Rc::new_cyclic(|this| StateNode {
            this: this.clone(),
            sinks: RefCell::new(SinkBindings::new()),
            value: RefCell::new(value),
        }))
    }

    /// Borrows the value and records this cell as a dependency of `sc`.
    pub fn borrow<'a>(&'a self, sc: &mut SignalContext) -> Ref<'a, T> {
        self.0.bind(sc);
        self.0.value.borrow()
    }

    pub fn with<U>(&self, f: impl FnOnce(&T) -> U, sc: &mut SignalContext) -> U {
        f(&self.borrow(sc))
    }

    pub fn get(&self, sc: &mut SignalContext) -> T
    where
        T: Clone,
    {
        self.borrow(sc).clone()
    }

    /// Replaces the value. Dependants are marked dirty even if the value is equal.
    pub fn set(&self, value: T, ac: &mut ActionContext) {
        *self.0.value.borrow_mut() = value;
        self.0.notify(ac);
    }

    /// Replaces the value if it differs from the current one.
    pub fn set_dedup(&self, value: T, ac: &mut ActionContext)
    where
        T: PartialEq,
    {
        if *self.0.value.borrow() == value {
            return;
        }
        self.set(value, ac);
    }

    pub fn modify(&self, f: impl FnOnce(&mut T), ac: &mut ActionContext) {
        f(&mut self.0.value.borrow_mut());
        self.0.notify(ac);
    }

    pub fn to_signal(&self) -> Signal<T> {
        Signal::from_node(self.0.clone())
    }
}
impl<T: Default + 'static> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
impl<T: std::fmt::Debug> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Ok(value) = self.0.value.try_borrow() {
            f.debug_tuple("State").field(&*value).finish()
        } else {
            f.write_str("State(<borrowed>)")
        }
    }
}
impl<T> ToSignal for State<T> {
    type Value = T;
    fn to_signal(&self) -> Signal<Self::Value> {
        self.to_signal()
    }
}

struct StateNode<T: 'static> {
    this: Weak<Self>,
    sinks: RefCell<SinkBindings>,
    value: RefCell<T>,
}
impl<T: 'static> StateNode<T> {
    fn bind(&self, sc: &mut SignalContext) {
        if !sc.is_tracking() {
            return;
        }
        if let Some(this) = self.this.upgrade() {
            self.sinks.borrow_mut().bind(this, Slot(0), sc);
        }
    }
    fn notify(&self, _ac: &mut ActionContext) {
        self.sinks.borrow_mut().notify(Dirty::Dirty)
    }
}
impl<T: 'static> SignalNode for StateNode<T> {
    type Value = T;
    fn borrow<'a>(&'a self, sc: &mut SignalContext) -> Ref<'a, T> {
        self.bind(sc);
        self.value.borrow()
    }
}
impl<T: 'static> BindSource for StateNode<T> {
    fn check(self: Rc<Self>, _slot: Slot, key: BindKey) -> bool {
        self.sinks.borrow().is_dirty(key)
    }
    fn unbind(self: Rc<Self>, _slot: Slot, key: BindKey) {
        self.sinks.borrow_mut().unbind(key);
    }
}
