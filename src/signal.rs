use std::{
    cell::{Ref, RefCell},
    pin::Pin,
    rc::{Rc, Weak},
    task::{Context, Poll, Waker},
};

use derive_ex::derive_ex;
use futures::Stream;

use crate::{
    core::{cyclic_error, BindKey, BindSink, BindSource, Dirty, SinkBindings, Slot, SourceBinder},
    effect, SignalContext, Subscription,
};

#[cfg(test)]
mod tests;

/// Node of a reactive value.
pub trait SignalNode: 'static {
    type Value: 'static;
    fn borrow<'a>(&'a self, sc: &mut SignalContext) -> Ref<'a, Self::Value>;
}

/// Types that can be observed as a [`Signal`].
pub trait ToSignal {
    type Value: 'static;
    fn to_signal(&self) -> Signal<Self::Value>;
}

/// Reactive value that is recomputed lazily when one of its dependencies changes.
#[derive_ex(Clone, bound())]
pub struct Signal<T: 'static>(Rc<dyn SignalNode<Value = T>>);

impl<T: 'static> Signal<T> {
    pub fn new(f: impl Fn(&mut SignalContext) -> T + 'static) -> Self {
        Self::from_node(ComputedNode::new(f, None))
    }

    /// Create a signal that notifies its dependants only when the computed value is different from the previous one.
    pub fn new_dedup(f: impl Fn(&mut SignalContext) -> T + 'static) -> Self
    where
        T: PartialEq,
    {
        Self::from_node(ComputedNode::new(f, Some(|a: &T, b: &T| a == b)))
    }

    pub fn from_value(value: T) -> Self {
        Self::from_node(Rc::new(ConstantNode(RefCell::new(value))))
    }
    pub fn from_node(node: Rc<impl SignalNode<Value = T>>) -> Self {
        Self(node)
    }

    /// Borrows the current value, recomputing it first if a dependency changed.
    pub fn borrow<'a>(&'a self, sc: &mut SignalContext) -> Ref<'a, T> {
        self.0.borrow(sc)
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

    pub fn map<U: 'static>(&self, f: impl Fn(&T) -> U + 'static) -> Signal<U> {
        let this = self.clone();
        Signal::new(move |sc| f(&this.borrow(sc)))
    }
    pub fn dedup(&self) -> Signal<T>
    where
        T: Clone + PartialEq,
    {
        let this = self.clone();
        Signal::new_dedup(move |sc| this.get(sc))
    }

    /// Calls `f` with the current value now and whenever the value changes.
    pub fn subscribe(&self, mut f: impl FnMut(&T) + 'static) -> Subscription {
        let this = self.clone();
        effect(move |sc| f(&this.borrow(sc)))
    }

    /// Returns a stream that yields the current value and then each changed value.
    ///
    /// Intermediate values that are overwritten before the stream is polled are skipped.
    pub fn to_stream(&self) -> impl Stream<Item = T> + Unpin + 'static
    where
        T: Clone,
    {
        SignalStream::new(self.clone())
    }
}
impl<T> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Signal")
    }
}
impl<T: 'static> ToSignal for Signal<T> {
    type Value = T;
    fn to_signal(&self) -> Signal<Self::Value> {
        self.clone()
    }
}

struct ConstantNode<T>(RefCell<T>);

impl<T: 'static> SignalNode for ConstantNode<T> {
    type Value = T;
    fn borrow<'a>(&'a self, _sc: &mut SignalContext) -> Ref<'a, T> {
        self.0.borrow()
    }
}

struct ComputedNode<T, F> {
    this: Weak<Self>,
    sinks: RefCell<SinkBindings>,
    data: RefCell<ComputedData<T, F>>,
    eq: Option<fn(&T, &T) -> bool>,
}
struct ComputedData<T, F> {
    f: F,
    value: Option<T>,
    sb: SourceBinder,
}

impl<T, F> ComputedNode<T, F>
where
    T: 'static,
    F: Fn(&mut SignalContext) -> T + 'static,
{
    fn new(f: F, eq: Option<fn(&T, &T) -> bool>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            this: this.clone(),
            sinks: RefCell::new(SinkBindings::new()),
            data: RefCell::new(ComputedData {
                f,
                value: None,
                sb: SourceBinder::new(this, Slot(0)),
            }),
            eq,
        })
    }

    fn update(&self) {
        let Ok(mut data) = self.data.try_borrow_mut() else {
            cyclic_error()
        };
        let mut is_dirty = false;
        if data.sb.check() {
            let data = &mut *data;
            let f = &data.f;
            let value = data.sb.update(|sc| f(sc));
            is_dirty = match (&data.value, self.eq) {
                (Some(old), Some(eq)) => !eq(old, &value),
                _ => true,
            };
            if is_dirty {
                data.value = Some(value);
            }
        }
        drop(data);
        self.sinks.borrow_mut().update(is_dirty);
    }
}
impl<T, F> SignalNode for ComputedNode<T, F>
where
    T: 'static,
    F: Fn(&mut SignalContext) -> T + 'static,
{
    type Value = T;
    fn borrow<'a>(&'a self, sc: &mut SignalContext) -> Ref<'a, T> {
        self.update();
        if sc.is_tracking() {
            if let Some(this) = self.this.upgrade() {
                self.sinks.borrow_mut().bind(this, Slot(0), sc);
            }
        }
        let Ok(data) = self.data.try_borrow() else {
            cyclic_error()
        };
        Ref::map(data, |data| match &data.value {
            Some(value) => value,
            None => unreachable!("value is computed by `update`"),
        })
    }
}
impl<T, F> BindSource for ComputedNode<T, F>
where
    T: 'static,
    F: Fn(&mut SignalContext) -> T + 'static,
{
    fn check(self: Rc<Self>, _slot: Slot, key: BindKey) -> bool {
        self.update();
        self.sinks.borrow().is_dirty(key)
    }
    fn unbind(self: Rc<Self>, _slot: Slot, key: BindKey) {
        self.sinks.borrow_mut().unbind(key);
    }
}
impl<T, F> BindSink for ComputedNode<T, F>
where
    T: 'static,
    F: Fn(&mut SignalContext) -> T + 'static,
{
    fn notify(self: Rc<Self>, slot: Slot, dirty: Dirty) {
        let Ok(mut data) = self.data.try_borrow_mut() else {
            cyclic_error()
        };
        if data.sb.on_notify(slot, dirty) {
            drop(data);
            self.sinks.borrow_mut().notify(Dirty::MaybeDirty);
        }
    }
}

struct SignalStream<T: 'static>(Rc<SignalStreamNode<T>>);

struct SignalStreamNode<T: 'static> {
    signal: Signal<T>,
    data: RefCell<SignalStreamData>,
}
struct SignalStreamData {
    sb: SourceBinder,
    waker: Option<Waker>,
}

impl<T: Clone + 'static> SignalStream<T> {
    fn new(signal: Signal<T>) -> Self {
        Self(Rc::new_cyclic(|this| SignalStreamNode {
            signal,
            data: RefCell::new(SignalStreamData {
                sb: SourceBinder::new(this, Slot(0)),
                waker: None,
            }),
        }))
    }
}
impl<T: Clone + 'static> Stream for SignalStream<T> {
    type Item = T;
    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let node = &self.0;
        let mut data = node.data.borrow_mut();
        if data.sb.check() {
            let signal = &node.signal;
            let value = data.sb.update(|sc| signal.get(sc));
            Poll::Ready(Some(value))
        } else {
            data.waker = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}
impl<T: 'static> BindSink for SignalStreamNode<T> {
    fn notify(self: Rc<Self>, slot: Slot, dirty: Dirty) {
        let mut data = self.data.borrow_mut();
        if data.sb.on_notify(slot, dirty) {
            if let Some(waker) = data.waker.take() {
                waker.wake();
            }
        }
    }
}
