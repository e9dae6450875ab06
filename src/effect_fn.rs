use std::{cell::RefCell, rc::Rc};

use crate::{
    core::{BindSink, Dirty, Slot, SourceBinder, Task},
    SignalContext, Subscription,
};

#[cfg(test)]
mod tests;

/// Run `f` now and again whenever a signal it read has changed.
///
/// Runs are queued as tasks of the [`Runtime`](crate::core::Runtime).
/// A run is skipped when every dependency turns out to be unchanged after recomputation.
/// Dropping the returned [`Subscription`] stops the effect.
pub fn effect(f: impl FnMut(&mut SignalContext) + 'static) -> Subscription {
    let node = EffectNode::new(f);
    node.schedule();
    Subscription::from_rc(node)
}

struct EffectData<F> {
    f: F,
    sb: SourceBinder,
}

struct EffectNode<F> {
    data: RefCell<EffectData<F>>,
}
impl<F> EffectNode<F>
where
    F: FnMut(&mut SignalContext) + 'static,
{
    fn new(f: F) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            data: RefCell::new(EffectData {
                f,
                sb: SourceBinder::new(this, Slot(0)),
            }),
        })
    }

    fn schedule(self: &Rc<Self>) {
        Task::from_weak_fn(Rc::downgrade(self), Self::run).schedule()
    }
    fn run(self: Rc<Self>) {
        let mut data = self.data.borrow_mut();
        let EffectData { f, sb } = &mut *data;
        if sb.check() {
            sb.update(f);
        }
    }
}

impl<F> BindSink for EffectNode<F>
where
    F: FnMut(&mut SignalContext) + 'static,
{
    fn notify(self: Rc<Self>, slot: Slot, dirty: Dirty) {
        let need_schedule = match self.data.try_borrow_mut() {
            Ok(mut d) => d.sb.on_notify(slot, dirty),
            Err(_) => false,
        };
        if need_schedule {
            self.schedule();
        }
    }
}
