use futures::Stream;

use crate::{effect, spawn_action, ActionContext, State, Subscription, ToSignal};

use super::{
    fields::{Field, FieldCells, StateFields},
    producer::ProducerNode,
};

type Write<T> = Box<dyn FnOnce(&FieldCells<T>, &mut ActionContext)>;

/// Partial update of a state `T`.
///
/// Fields that are not set keep their current value.
/// Writes are applied in the order they were added.
pub struct Patch<T> {
    writes: Vec<Write<T>>,
    len: usize,
}
impl<T: 'static> Patch<T> {
    pub fn new() -> Self {
        Self {
            writes: Vec::new(),
            len: 0,
        }
    }
    pub fn set<V: 'static>(mut self, field: Field<T, V>, value: V) -> Self {
        self.writes
            .push(Box::new(move |cells, ac| cells.set(field, value, ac)));
        self.len += 1;
        self
    }

    /// Number of fields written by this patch.
    pub fn len(&self) -> usize {
        self.len
    }
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn apply(self, cells: &FieldCells<T>, ac: &mut ActionContext) {
        for write in self.writes {
            write(cells, ac);
        }
    }
}
impl<T: 'static> Default for Patch<T> {
    fn default() -> Self {
        Self::new()
    }
}
impl<T: StateFields> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Self {
            writes: vec![Box::new(move |cells, ac| value.write_cells(cells, ac))],
            len: T::FIELD_NAMES.len(),
        }
    }
}

pub(crate) struct Entry<C> {
    pub index: usize,
    pub name: &'static str,
    pub connect: C,
}

type Connect<T> = Box<dyn FnOnce(&FieldCells<T>) -> Subscription>;

/// Fields of `T` mirrored from reactive sources.
pub struct Connections<T> {
    pub(crate) entries: Vec<Entry<Connect<T>>>,
}
impl<T: 'static> Connections<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Keep `field` equal to the value of `source`.
    pub fn with<V: Clone + 'static>(
        mut self,
        field: Field<T, V>,
        source: impl ToSignal<Value = V>,
    ) -> Self {
        let source = source.to_signal();
        self.entries.push(Entry {
            index: field.index(),
            name: field.name(),
            connect: Box::new(move |cells| {
                let cell = cells.cell(field).clone();
                effect(move |sc| {
                    let value = source.get(sc);
                    let cell = cell.clone();
                    spawn_action(move |ac| cell.set(value, ac));
                })
            }),
        });
        self
    }
}
impl<T: 'static> Default for Connections<T> {
    fn default() -> Self {
        Self::new()
    }
}

type Start<T> = Box<dyn FnOnce(&FieldCells<T>, State<u64>) -> Subscription>;

/// Fields of `T` fed by asynchronous producers.
pub struct Producers<T> {
    pub(crate) entries: Vec<Entry<Start<T>>>,
}
impl<T: 'static> Producers<T> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Feed `field` with the items of the stream returned by `producer`.
    ///
    /// `producer` is called once when connected and again on each trigger of `field`.
    /// The stream of the previous call is dropped at that point.
    pub fn with<V, S>(mut self, field: Field<T, V>, producer: impl FnMut() -> S + 'static) -> Self
    where
        V: 'static,
        S: Stream<Item = V> + 'static,
    {
        self.entries.push(Entry {
            index: field.index(),
            name: field.name(),
            connect: Box::new(move |cells, trigger| {
                let cell = cells.cell(field).clone();
                ProducerNode::start(field.name(), cell, trigger, producer)
            }),
        });
        self
    }
}
impl<T: 'static> Default for Producers<T> {
    fn default() -> Self {
        Self::new()
    }
}
