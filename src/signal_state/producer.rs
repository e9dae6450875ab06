use std::{
    cell::RefCell,
    pin::Pin,
    rc::{Rc, Weak},
    task::{Context, Poll, Waker},
};

use futures::Stream;

use crate::{
    core::{waker_from_weak_fn, BindSink, Dirty, Slot, SourceBinder},
    spawn_action, ActionContext, State, Subscription,
};

pub(crate) struct ProducerNode<V: 'static, P, S> {
    this: Weak<Self>,
    field: &'static str,
    cell: State<V>,
    trigger: State<u64>,
    data: RefCell<ProducerData<P, S>>,
}

struct ProducerData<P, S> {
    producer: P,
    stream: Option<Pin<Box<S>>>,
    sb: SourceBinder,
    waker: Option<Waker>,
    invocations: u64,
}

impl<V, P, S> ProducerNode<V, P, S>
where
    V: 'static,
    P: FnMut() -> S + 'static,
    S: Stream<Item = V> + 'static,
{
    pub fn start(
        field: &'static str,
        cell: State<V>,
        trigger: State<u64>,
        producer: P,
    ) -> Subscription {
        let node = Rc::new_cyclic(|this| Self {
            this: this.clone(),
            field,
            cell,
            trigger,
            data: RefCell::new(ProducerData {
                producer,
                stream: None,
                sb: SourceBinder::new(this, Slot(0)),
                waker: None,
                invocations: 0,
            }),
        });
        node.schedule();
        Subscription::from_rc(node)
    }

    fn schedule(&self) {
        let this = self.this.clone();
        spawn_action(move |ac| {
            if let Some(this) = this.upgrade() {
                this.run(ac)
            }
        });
    }

    fn run(&self, ac: &mut ActionContext) {
        let mut d = self.data.borrow_mut();
        let d = &mut *d;
        if d.sb.check() {
            let trigger = &self.trigger;
            d.sb.update(|sc| trigger.get(sc));
            d.stream = None;
            d.invocations += 1;
            tracing::debug!(
                field = self.field,
                invocation = d.invocations,
                "producer started"
            );
            d.stream = Some(Box::pin((d.producer)()));
        }
        let waker = d
            .waker
            .get_or_insert_with(|| waker_from_weak_fn(self.this.clone(), |this, ac| this.run(ac)))
            .clone();
        let mut cx = Context::from_waker(&waker);
        while let Some(stream) = &mut d.stream {
            match stream.as_mut().poll_next(&mut cx) {
                Poll::Ready(Some(value)) => {
                    tracing::trace!(field = self.field, "producer emitted");
                    self.cell.set(value, ac);
                }
                Poll::Ready(None) => {
                    tracing::debug!(
                        field = self.field,
                        invocation = d.invocations,
                        "producer completed"
                    );
                    d.stream = None;
                }
                Poll::Pending => break,
            }
        }
    }
}

impl<V, P, S> BindSink for ProducerNode<V, P, S>
where
    V: 'static,
    P: FnMut() -> S + 'static,
    S: Stream<Item = V> + 'static,
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
