use std::{any::Any, mem::take, rc::Rc};

/// Keeps a reactive operation alive.
///
/// The operation is stopped when this value is dropped.
#[derive(Default)]
#[must_use]
pub struct Subscription(RawSubscription);

impl Subscription {
    pub fn empty() -> Self {
        Subscription(RawSubscription::Empty)
    }
    pub fn from_fn(f: impl FnOnce() + 'static) -> Self {
        Subscription(RawSubscription::Fn(Box::new(f)))
    }
    pub fn from_rc(rc: Rc<dyn Any>) -> Self {
        Subscription(RawSubscription::Rc(rc))
    }
}
impl Drop for Subscription {
    fn drop(&mut self) {
        if let RawSubscription::Fn(f) = take(&mut self.0) {
            f()
        }
    }
}
impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            RawSubscription::Empty => f.write_str("Subscription(Empty)"),
            RawSubscription::Fn(_) => f.write_str("Subscription(Fn)"),
            RawSubscription::Rc(_) => f.write_str("Subscription(Rc)"),
        }
    }
}

#[derive(Default)]
enum RawSubscription {
    #[default]
    Empty,
    Fn(Box<dyn FnOnce() + 'static>),
    Rc(#[allow(unused)] Rc<dyn Any>),
}
