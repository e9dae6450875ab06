use std::{
    cell::RefCell,
    cmp::max,
    future::poll_fn,
    mem::{replace, swap, take},
    ops::{BitOr, BitOrAssign},
    rc::{Rc, Weak},
    sync::{Arc, Mutex, MutexGuard},
    task::{Context, Poll, Wake, Waker},
    thread::AccessError,
};

use derive_ex::derive_ex;
use parse_display::Display;
use slabmap::SlabMap;

#[cfg(test)]
mod tests;

thread_local! {
    static GLOBALS: RefCell<Globals> = RefCell::new(Globals::new());
}

struct Globals {
    is_runtime_exists: bool,
    unbinds: Vec<Vec<SourceBinding>>,
    actions: Vec<Action>,
    tasks: Vec<Task>,
    need_wake: bool,
    wakes: WakeTable,
}
impl Globals {
    fn new() -> Self {
        Self {
            is_runtime_exists: false,
            unbinds: Vec::new(),
            actions: Vec::new(),
            tasks: Vec::new(),
            need_wake: false,
            wakes: WakeTable::default(),
        }
    }
    fn with<T>(f: impl FnOnce(&mut Self) -> T) -> T {
        GLOBALS.with(|g| f(&mut g.borrow_mut()))
    }
    fn try_with<T>(f: impl FnOnce(&mut Self) -> T) -> Result<T, AccessError> {
        GLOBALS.try_with(|g| f(&mut g.borrow_mut()))
    }
    fn swap_vec<T>(f: impl FnOnce(&mut Self) -> &mut Vec<T>, values: &mut Vec<T>) -> bool {
        Self::with(|g| swap(f(g), values));
        !values.is_empty()
    }
    fn get_actions(actions: &mut Vec<Action>) -> bool {
        Self::with(|g| {
            g.apply_wake();
            swap(&mut g.actions, actions);
        });
        !actions.is_empty()
    }
    fn assert_exists(&self) {
        if !self.is_runtime_exists {
            panic!("`Runtime` is not created.");
        }
    }

    fn push_action(&mut self, action: Action) {
        self.assert_exists();
        self.actions.push(action);
        self.wake();
    }
    fn push_task(&mut self, task: Task) {
        self.tasks.push(task);
        self.wake();
    }
    fn apply_wake(&mut self) {
        let mut requests = self.wakes.requests.lock();
        for key in requests.wakes.drain(..) {
            if let Some(f) = self.wakes.actions.get(key) {
                let f = f.clone();
                self.actions.push(Action::new(move |ac| f(ac)));
            }
        }
        for key in requests.drops.drain(..) {
            self.wakes.actions.remove(key);
        }
    }
    fn wait_for_ready(&mut self, cx: &Context) -> Poll<()> {
        self.need_wake = false;
        if !self.actions.is_empty() || !self.tasks.is_empty() || !self.unbinds.is_empty() {
            return Poll::Ready(());
        }
        let mut requests = self.wakes.requests.lock();
        if !requests.drops.is_empty() || !requests.wakes.is_empty() {
            return Poll::Ready(());
        }
        requests.waker = Some(cx.waker().clone());
        self.need_wake = true;
        Poll::Pending
    }
    fn wake(&mut self) {
        if !self.need_wake {
            return;
        }
        self.need_wake = false;
        self.wakes.requests.lock().wake();
    }
}

/// Reactive runtime.
///
/// Owns the queues of scheduled actions (state changes) and tasks (effect re-runs) of the current thread.
#[derive_ex(Default)]
#[default(Self::new())]
pub struct Runtime {
    ac: ActionContext,
    actions_buffer: Vec<Action>,
    tasks_buffer: Vec<Task>,
    unbinds_buffer: Vec<Vec<SourceBinding>>,
}
impl Runtime {
    pub fn new() -> Self {
        if Globals::with(|g| replace(&mut g.is_runtime_exists, true)) {
            panic!("Only one `Runtime` can exist in the same thread at the same time.");
        };
        Self {
            ac: ActionContext::new(),
            actions_buffer: Vec::new(),
            tasks_buffer: Vec::new(),
            unbinds_buffer: Vec::new(),
        }
    }

    /// Returns the context used to change state.
    pub fn ac(&mut self) -> &mut ActionContext {
        &mut self.ac
    }

    /// Returns a context that reads state without tracking dependencies.
    pub fn sc(&mut self) -> SignalContext<'_> {
        self.apply_unbind();
        SignalContext::new()
    }

    /// Run every queued action, including those queued while running.
    ///
    /// Returns `false` if the queue was already empty.
    pub fn run_actions(&mut self) -> bool {
        let mut handled = false;
        let mut actions = take(&mut self.actions_buffer);
        while Globals::get_actions(&mut actions) {
            for action in actions.drain(..) {
                action.call(&mut self.ac);
                handled = true;
            }
        }
        self.actions_buffer = actions;
        handled
    }

    /// Run every queued task. Returns `false` if there was none.
    pub fn run_tasks(&mut self) -> bool {
        self.apply_unbind();
        let mut handled = false;
        let mut tasks = take(&mut self.tasks_buffer);
        while Globals::swap_vec(|g| &mut g.tasks, &mut tasks) {
            for task in tasks.drain(..) {
                task.run();
                handled = true;
            }
        }
        self.tasks_buffer = tasks;
        handled
    }

    fn apply_unbind(&mut self) -> bool {
        let mut handled = false;
        let mut unbinds = take(&mut self.unbinds_buffer);
        while Globals::swap_vec(|g| &mut g.unbinds, &mut unbinds) {
            for unbind in unbinds.drain(..) {
                for binding in unbind {
                    binding.unbind();
                }
                handled = true;
            }
        }
        self.unbinds_buffer = unbinds;
        handled
    }

    /// Repeat [`run_actions`](Self::run_actions) and [`run_tasks`](Self::run_tasks) until there is nothing left to do.
    pub fn update(&mut self) {
        loop {
            if self.run_actions() {
                continue;
            }
            if self.run_tasks() {
                continue;
            }
            if self.apply_unbind() {
                continue;
            }
            break;
        }
    }

    /// Resolves once [`update`](Self::update) has something to do.
    pub async fn wait_for_ready(&mut self) {
        poll_fn(|cx| Globals::with(|g| g.wait_for_ready(cx))).await
    }
}
impl Drop for Runtime {
    fn drop(&mut self) {
        let pending = Globals::with(|g| {
            g.is_runtime_exists = false;
            g.need_wake = false;
            (take(&mut g.actions), take(&mut g.tasks), take(&mut g.unbinds))
        });
        drop(pending);
    }
}

/// Write access to reactive state.
///
/// Only the [`Runtime`] and scheduled actions hand it out.
pub struct ActionContext {
    _private: (),
}
impl ActionContext {
    fn new() -> Self {
        Self { _private: () }
    }

    /// Returns a context that reads state without tracking dependencies.
    pub fn sc(&mut self) -> SignalContext<'_> {
        SignalContext::new()
    }
}

/// Read access to reactive state.
///
/// While a signal or effect is evaluated, the context records what it reads.
pub struct SignalContext<'s> {
    sink: Option<&'s mut Sink>,
}
impl<'s> SignalContext<'s> {
    fn new() -> Self {
        Self { sink: None }
    }

    /// Run `f` without recording dependencies.
    pub fn untrack<T>(&mut self, f: impl FnOnce(&mut SignalContext) -> T) -> T {
        f(&mut SignalContext::new())
    }

    /// Returns `true` if values read through this context are recorded as dependencies.
    pub fn is_tracking(&self) -> bool {
        self.sink.is_some()
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
pub enum Dirty {
    Clean,
    MaybeDirty,
    Dirty,
}
impl Dirty {
    pub fn from_is_dirty(is_dirty: bool) -> Self {
        if is_dirty {
            Dirty::Dirty
        } else {
            Dirty::Clean
        }
    }
    pub fn is_clean(self) -> bool {
        self == Dirty::Clean
    }
}
impl BitOr for Dirty {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        max(self, rhs)
    }
}
impl BitOrAssign for Dirty {
    fn bitor_assign(&mut self, rhs: Self) {
        *self = *self | rhs;
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct Slot(pub usize);

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct BindKey(usize);

/// Node that is notified when one of its sources changes.
pub trait BindSink: 'static {
    fn notify(self: Rc<Self>, slot: Slot, dirty: Dirty);
}

/// Node that other nodes can depend on.
pub trait BindSource: 'static {
    /// Bring the source up to date and return whether the binding `key` observed a change.
    fn check(self: Rc<Self>, slot: Slot, key: BindKey) -> bool;
    fn unbind(self: Rc<Self>, slot: Slot, key: BindKey);
}

struct SourceBinding {
    source: Rc<dyn BindSource>,
    slot: Slot,
    key: BindKey,
}
impl SourceBinding {
    fn is_same(&self, source: &Rc<dyn BindSource>, slot: Slot) -> bool {
        Rc::ptr_eq(&self.source, source) && self.slot == slot
    }
    fn check(&self) -> bool {
        self.source.clone().check(self.slot, self.key)
    }
    fn unbind(self) {
        self.source.unbind(self.slot, self.key);
    }
}

/// Dependencies recorded by a sink during its last evaluation.
#[derive(Default)]
pub struct SourceBindings(Vec<SourceBinding>);

impl SourceBindings {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn check(&self) -> bool {
        self.0.iter().any(|source| source.check())
    }

    /// Evaluate `f` while recording every source it reads.
    ///
    /// Sources that are no longer read are unbound after `f` returns.
    pub fn update<T>(
        &mut self,
        sink: Weak<dyn BindSink>,
        slot: Slot,
        f: impl FnOnce(&mut SignalContext) -> T,
    ) -> T {
        let mut sink = Sink {
            sink,
            slot,
            sources: take(self),
            sources_len: 0,
            stale: Vec::new(),
        };
        let ret = f(&mut SignalContext {
            sink: Some(&mut sink),
        });
        let Sink {
            sources,
            sources_len,
            stale,
            ..
        } = sink;
        *self = sources;
        let unused = self.0.split_off(sources_len);
        for binding in stale.into_iter().chain(unused) {
            binding.unbind();
        }
        ret
    }
    pub fn clear(&mut self) {
        for binding in self.0.drain(..) {
            binding.unbind();
        }
    }
}
impl Drop for SourceBindings {
    fn drop(&mut self) {
        if !self.0.is_empty() {
            let _ = Globals::try_with(|g| g.unbinds.push(take(&mut self.0)));
        }
    }
}

struct SinkBinding {
    sink: Weak<dyn BindSink>,
    slot: Slot,
    dirty: Dirty,
}

/// Dependents of a source.
#[derive(Default)]
pub struct SinkBindings(SlabMap<SinkBinding>);

impl SinkBindings {
    pub fn new() -> Self {
        Self(SlabMap::new())
    }

    /// Record `this` as a dependency of the evaluation that `sc` is tracking.
    pub fn bind(&mut self, this: Rc<dyn BindSource>, this_slot: Slot, sc: &mut SignalContext) {
        let Some(sink) = sc.sink.as_deref_mut() else {
            return;
        };
        if let Some(old) = sink.sources.0.get(sink.sources_len) {
            if old.is_same(&this, this_slot) {
                if let Some(binding) = self.0.get_mut(old.key.0) {
                    binding.dirty = Dirty::Clean;
                }
                sink.sources_len += 1;
                return;
            }
        }
        let key = BindKey(self.0.insert(SinkBinding {
            sink: sink.sink.clone(),
            slot: sink.slot,
            dirty: Dirty::Clean,
        }));
        sink.push(SourceBinding {
            source: this,
            slot: this_slot,
            key,
        });
    }
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
    pub fn is_dirty(&self, key: BindKey) -> bool {
        match self.0.get(key.0) {
            Some(binding) => !binding.dirty.is_clean(),
            None => true,
        }
    }
    pub fn unbind(&mut self, key: BindKey) {
        self.0.remove(key.0);
    }

    pub fn notify(&mut self, dirty: Dirty) {
        for binding in self.0.values_mut() {
            if binding.dirty.is_clean() {
                if let Some(sink) = binding.sink.upgrade() {
                    sink.notify(binding.slot, dirty);
                }
            }
            binding.dirty |= dirty;
        }
    }

    /// Resolve `MaybeDirty` bindings once the source knows whether its value changed.
    pub fn update(&mut self, is_dirty: bool) {
        for binding in self.0.values_mut() {
            if binding.dirty == Dirty::MaybeDirty {
                binding.dirty = Dirty::from_is_dirty(is_dirty);
            }
        }
    }
}

struct Sink {
    sink: Weak<dyn BindSink>,
    slot: Slot,
    sources: SourceBindings,
    sources_len: usize,
    stale: Vec<SourceBinding>,
}
impl Sink {
    fn push(&mut self, binding: SourceBinding) {
        let index = self.sources_len;
        self.sources_len += 1;
        if index < self.sources.0.len() {
            let old = replace(&mut self.sources.0[index], binding);
            self.stale.push(old);
        } else {
            self.sources.0.push(binding);
        }
    }
}

/// Sources and dirty state of a single-slot sink.
pub struct SourceBinder {
    sources: SourceBindings,
    dirty: Dirty,
    sink: Weak<dyn BindSink>,
    slot: Slot,
}
impl SourceBinder {
    pub fn new(sink: &Weak<impl BindSink>, slot: Slot) -> Self {
        let sink: Weak<dyn BindSink> = sink.clone();
        Self {
            sources: SourceBindings::new(),
            dirty: Dirty::Dirty,
            sink,
            slot,
        }
    }
    pub fn is_clean(&self) -> bool {
        self.dirty.is_clean()
    }

    /// Returns `true` if the sink has to be evaluated again.
    pub fn check(&mut self) -> bool {
        if self.dirty == Dirty::MaybeDirty {
            self.dirty = Dirty::from_is_dirty(self.sources.check());
        }
        self.dirty == Dirty::Dirty
    }
    pub fn update<T>(&mut self, f: impl FnOnce(&mut SignalContext) -> T) -> T {
        self.dirty = Dirty::Clean;
        self.sources.update(self.sink.clone(), self.slot, f)
    }
    pub fn clear(&mut self) {
        self.sources.clear();
        self.dirty = Dirty::Dirty;
    }

    /// Returns `true` if this is the first notification since the last evaluation.
    pub fn on_notify(&mut self, slot: Slot, dirty: Dirty) -> bool {
        let mut need_notify = false;
        if slot == self.slot {
            need_notify = self.dirty.is_clean();
            self.dirty |= dirty;
        }
        need_notify
    }
}

/// Spawns a new action.
///
/// Actions are the only place where state can be changed.
/// Effects that want to write state schedule an action instead of writing while they are being evaluated.
///
/// # Panics
///
/// Panics if no [`Runtime`] exists on the current thread.
pub fn spawn_action(f: impl FnOnce(&mut ActionContext) + 'static) {
    Action::new(f).schedule()
}

struct Action(Box<dyn FnOnce(&mut ActionContext)>);

impl Action {
    fn new(f: impl FnOnce(&mut ActionContext) + 'static) -> Self {
        Self(Box::new(f))
    }
    fn call(self, ac: &mut ActionContext) {
        (self.0)(ac)
    }
    fn schedule(self) {
        let _ = Globals::try_with(|g| g.push_action(self));
    }
}

/// Work performed by [`Runtime::run_tasks`], such as re-running an effect.
pub struct Task(Box<dyn FnOnce()>);

impl Task {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Box::new(f))
    }
    pub fn from_weak_fn<T: 'static>(this: Weak<T>, f: impl FnOnce(Rc<T>) + 'static) -> Self {
        Self::new(move || {
            if let Some(this) = this.upgrade() {
                f(this)
            }
        })
    }
    pub fn schedule(self) {
        let _ = Globals::try_with(|g| g.push_task(self));
    }
    fn run(self) {
        (self.0)()
    }
}

#[derive(Default)]
struct WakeTable {
    actions: SlabMap<Rc<dyn Fn(&mut ActionContext)>>,
    requests: WakeRequests,
}

/// Create a [`Waker`] that schedules `f` as an action each time it is woken.
///
/// The waker can be woken from any thread. `f` runs on the thread that created it,
/// during the next [`Runtime::run_actions`], as long as `this` is alive.
pub fn waker_from_weak_fn<T: 'static>(
    this: Weak<T>,
    f: impl Fn(Rc<T>, &mut ActionContext) + 'static,
) -> Waker {
    let action: Rc<dyn Fn(&mut ActionContext)> = Rc::new(move |ac| {
        if let Some(this) = this.upgrade() {
            f(this, ac)
        }
    });
    let key = Globals::with(|g| g.wakes.actions.insert(action));
    let requests = Globals::with(|g| g.wakes.requests.clone());
    Waker::from(Arc::new(RawWake { requests, key }))
}

#[derive(Clone, Default)]
struct WakeRequests(Arc<Mutex<RawWakeRequests>>);

impl WakeRequests {
    fn lock(&self) -> MutexGuard<RawWakeRequests> {
        self.0.lock().unwrap()
    }
}

#[derive(Default)]
struct RawWakeRequests {
    wakes: Vec<usize>,
    drops: Vec<usize>,
    waker: Option<Waker>,
}
impl RawWakeRequests {
    fn wake(&mut self) {
        if let Some(waker) = self.waker.take() {
            waker.wake();
        }
    }
}

struct RawWake {
    requests: WakeRequests,
    key: usize,
}
impl Wake for RawWake {
    fn wake(self: Arc<Self>) {
        self.wake_by_ref()
    }
    fn wake_by_ref(self: &Arc<Self>) {
        let mut requests = self.requests.lock();
        requests.wakes.push(self.key);
        requests.wake();
    }
}
impl Drop for RawWake {
    fn drop(&mut self) {
        self.requests.lock().drops.push(self.key);
    }
}

#[non_exhaustive]
#[derive(Display, Debug)]
#[display("detect cyclic dependency")]
pub struct CyclicError {}

impl std::error::Error for CyclicError {}

pub(crate) fn cyclic_error() -> ! {
    panic!("{}", CyclicError {})
}
