use std::{
    cell::{OnceCell, RefCell},
    collections::{HashMap, HashSet},
    rc::Rc,
};

use crate::{ActionContext, Signal, SignalContext, State, Subscription};

#[path = "signal_state/error.rs"]
mod error;
#[path = "signal_state/fields.rs"]
mod fields;
#[path = "signal_state/patch.rs"]
mod patch;
#[path = "signal_state/producer.rs"]
mod producer;


pub use error::{Result, SignalStateError};
pub use fields::{Field, FieldCells, FieldSet, StateFields};
pub use patch::{Connections, Patch, Producers};

use patch::Entry;

/// Reactive store of a record `T` that keeps every field in its own cell.
///
/// Fields are updated by [`patch`](Self::patch), by reactive sources registered with [`connect`](Self::connect),
/// and by asynchronous producers registered with [`connect_streams`](Self::connect_streams).
/// Every operation except [`initialize`](Self::initialize) fails with [`SignalStateError::NotInitialized`]
/// until the store is initialized.
///
/// Connections and producers live as long as the `SignalState`.
pub struct SignalState<T: StateFields> {
    fields: OnceCell<Fields<T>>,
    triggers: RefCell<HashMap<usize, State<u64>>>,
    connected: RefCell<HashSet<usize>>,
    subscriptions: RefCell<Vec<Subscription>>,
}

struct Fields<T: 'static> {
    cells: Rc<FieldCells<T>>,
    state: Signal<T>,
}

impl<T: StateFields> SignalState<T> {
    pub fn new() -> Self {
        Self {
            fields: OnceCell::new(),
            triggers: RefCell::new(HashMap::new()),
            connected: RefCell::new(HashSet::new()),
            subscriptions: RefCell::new(Vec::new()),
        }
    }

    /// Create one cell per field, seeded with `value`.
    pub fn initialize(&self, value: T) -> Result<()> {
        if self.is_initialized() {
            return Err(SignalStateError::AlreadyInitialized);
        }
        let cells = Rc::new(value.into_cells());
        let state = {
            let cells = cells.clone();
            Signal::new(move |sc| T::read_cells(&cells, sc))
        };
        let _ = self.fields.set(Fields { cells, state });
        tracing::debug!(fields = T::FIELD_NAMES.len(), "signal state initialized");
        Ok(())
    }
    pub fn is_initialized(&self) -> bool {
        self.fields.get().is_some()
    }

    fn fields(&self) -> Result<&Fields<T>> {
        self.fields.get().ok_or(SignalStateError::NotInitialized)
    }
    fn cells(&self) -> Result<&Rc<FieldCells<T>>> {
        Ok(&self.fields()?.cells)
    }

    /// Returns the whole state as a signal that depends on every field.
    pub fn state(&self) -> Result<Signal<T>> {
        Ok(self.fields()?.state.clone())
    }

    /// Reads the whole state without adding any dependency to `sc`.
    pub fn snapshot(&self, sc: &mut SignalContext) -> Result<T> {
        let cells = self.cells()?;
        Ok(sc.untrack(|sc| T::read_cells(cells, sc)))
    }

    /// Returns a signal of a single field.
    pub fn select<V: Clone + 'static>(&self, field: Field<T, V>) -> Result<Signal<V>> {
        Ok(self.cells()?.cell(field).to_signal())
    }
    pub fn select_map<V: 'static, P: 'static>(
        &self,
        field: Field<T, V>,
        f: impl Fn(&V) -> P + 'static,
    ) -> Result<Signal<P>> {
        let cell = self.cells()?.cell(field).clone();
        Ok(Signal::new(move |sc| cell.with(&f, sc)))
    }

    /// Returns a signal that combines several fields.
    pub fn select_many<F: FieldSet<T>>(&self, fields: F) -> Result<Signal<F::Values>> {
        let cells = self.cells()?.clone();
        Ok(Signal::new(move |sc| fields.read(&cells, sc)))
    }
    pub fn select_many_map<F: FieldSet<T>, P: 'static>(
        &self,
        fields: F,
        f: impl Fn(F::Values) -> P + 'static,
    ) -> Result<Signal<P>> {
        let cells = self.cells()?.clone();
        Ok(Signal::new(move |sc| f(fields.read(&cells, sc))))
    }

    /// Returns read-only views of the cells of `fields`.
    ///
    /// The result can be passed to [`Connections::with`] of another `SignalState`.
    pub fn pick<F: FieldSet<T>>(&self, fields: F) -> Result<F::Signals> {
        Ok(fields.signals(self.cells()?))
    }

    /// Keep fields equal to reactive sources.
    ///
    /// Each field can be connected only once, either by this method or by [`connect_streams`](Self::connect_streams).
    pub fn connect(&self, connections: Connections<T>) -> Result<()> {
        let cells: &FieldCells<T> = self.cells()?;
        self.check_connectable(&connections.entries)?;
        for Entry {
            index,
            name,
            connect,
        } in connections.entries
        {
            tracing::debug!(field = name, "field connected");
            self.connected.borrow_mut().insert(index);
            self.subscriptions.borrow_mut().push(connect(cells));
        }
        Ok(())
    }

    /// Feed fields with asynchronous producers and register a trigger for each of them.
    ///
    /// Producers are first called on the next action flush of the [`Runtime`](crate::core::Runtime).
    pub fn connect_streams(&self, producers: Producers<T>) -> Result<()> {
        let cells: &FieldCells<T> = self.cells()?;
        self.check_connectable(&producers.entries)?;
        for Entry {
            index,
            name,
            connect,
        } in producers.entries
        {
            tracing::debug!(field = name, "field connected to producer");
            let trigger = self
                .triggers
                .borrow_mut()
                .entry(index)
                .or_insert_with(|| State::new(0))
                .clone();
            self.connected.borrow_mut().insert(index);
            self.subscriptions.borrow_mut().push(connect(cells, trigger));
        }
        Ok(())
    }
    fn check_connectable<C>(&self, entries: &[Entry<C>]) -> Result<()> {
        let connected = self.connected.borrow();
        let mut indexes = HashSet::new();
        for entry in entries {
            if connected.contains(&entry.index) || !indexes.insert(entry.index) {
                return Err(SignalStateError::AlreadyConnected { field: entry.name });
            }
        }
        Ok(())
    }

    /// Call the producer of `field` again.
    ///
    /// The stream returned by the previous call is dropped, so its pending items never reach the field.
    pub fn trigger<V>(&self, field: Field<T, V>, ac: &mut ActionContext) -> Result<()> {
        self.fields()?;
        let trigger = self.triggers.borrow().get(&field.index()).cloned();
        let Some(trigger) = trigger else {
            return Err(SignalStateError::NoTrigger {
                field: field.name(),
            });
        };
        tracing::debug!(field = field.name(), "trigger");
        trigger.modify(|count| *count = count.wrapping_add(1), ac);
        Ok(())
    }

    /// Set the fields present in `patch` and leave the others untouched.
    ///
    /// A `T` converts into a patch of every field.
    pub fn patch(&self, patch: impl Into<Patch<T>>, ac: &mut ActionContext) -> Result<()> {
        let cells = self.cells()?;
        let patch = patch.into();
        tracing::trace!(fields = patch.len(), "patch");
        patch.apply(cells, ac);
        Ok(())
    }
}
impl<T: StateFields> Default for SignalState<T> {
    fn default() -> Self {
        Self::new()
    }
}
