use std::{any::Any, fmt, marker::PhantomData};

use crate::{ActionContext, Signal, SignalContext, State};

/// Typed key of a field of `T` whose value type is `V`.
///
/// `#[derive(StateFields)]` generates one associated constant of this type per field.
pub struct Field<T, V> {
    index: usize,
    name: &'static str,
    _phantom: PhantomData<fn(&T) -> V>,
}
impl<T, V> Field<T, V> {
    /// Used by `#[derive(StateFields)]`. A key built by hand must match the index and type of its field.
    #[doc(hidden)]
    pub const fn new(index: usize, name: &'static str) -> Self {
        Self {
            index,
            name,
            _phantom: PhantomData,
        }
    }
    pub const fn index(&self) -> usize {
        self.index
    }
    pub const fn name(&self) -> &'static str {
        self.name
    }
}
impl<T, V> Clone for Field<T, V> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<T, V> Copy for Field<T, V> {}

impl<T, V> fmt::Debug for Field<T, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field({}: {})", self.index, self.name)
    }
}

/// Per-field writable cells of a state `T`, in declaration order.
pub struct FieldCells<T> {
    cells: Vec<Box<dyn Any>>,
    _phantom: PhantomData<fn(T) -> T>,
}
impl<T: 'static> FieldCells<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            cells: Vec::with_capacity(capacity),
            _phantom: PhantomData,
        }
    }

    /// Append the cell of `field`.
    ///
    /// # Panics
    ///
    /// Panics if fields are not pushed in index order.
    pub fn push<V: 'static>(&mut self, field: Field<T, V>, value: V) {
        assert_eq!(
            field.index,
            self.cells.len(),
            "field `{}` pushed out of order",
            field.name
        );
        self.cells.push(Box::new(State::new(value)));
    }

    /// Returns the cell of `field`.
    ///
    /// # Panics
    ///
    /// Panics if `field` does not belong to these cells.
    pub fn cell<V: 'static>(&self, field: Field<T, V>) -> &State<V> {
        match self
            .cells
            .get(field.index)
            .and_then(|cell| cell.downcast_ref::<State<V>>())
        {
            Some(cell) => cell,
            None => panic!("field `{}` does not match its cell", field.name),
        }
    }
    pub fn get<V: Clone + 'static>(&self, field: Field<T, V>, sc: &mut SignalContext) -> V {
        self.cell(field).get(sc)
    }
    pub fn set<V: 'static>(&self, field: Field<T, V>, value: V, ac: &mut ActionContext) {
        self.cell(field).set(value, ac)
    }
    pub fn len(&self) -> usize {
        self.cells.len()
    }
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

/// Record type whose fields are stored in separate reactive cells.
///
/// Implement this trait with `#[derive(StateFields)]`.
pub trait StateFields: Sized + 'static {
    const FIELD_NAMES: &'static [&'static str];
    fn into_cells(self) -> FieldCells<Self>;
    fn read_cells(cells: &FieldCells<Self>, sc: &mut SignalContext) -> Self;
    fn write_cells(self, cells: &FieldCells<Self>, ac: &mut ActionContext);
}

/// A single [`Field`] or a tuple of field sets.
pub trait FieldSet<T: 'static>: Clone + 'static {
    type Values: 'static;
    type Signals;
    fn read(&self, cells: &FieldCells<T>, sc: &mut SignalContext) -> Self::Values;
    fn signals(&self, cells: &FieldCells<T>) -> Self::Signals;
}

impl<T: 'static, V: Clone + 'static> FieldSet<T> for Field<T, V> {
    type Values = V;
    type Signals = Signal<V>;
    fn read(&self, cells: &FieldCells<T>, sc: &mut SignalContext) -> V {
        cells.get(*self, sc)
    }
    fn signals(&self, cells: &FieldCells<T>) -> Signal<V> {
        cells.cell(*self).to_signal()
    }
}

macro_rules! impl_field_set_for_tuple {
    ($($ty:ident $index:tt),*) => {
        impl<T: 'static, $($ty: FieldSet<T>),*> FieldSet<T> for ($($ty,)*) {
            type Values = ($(<$ty as FieldSet<T>>::Values,)*);
            type Signals = ($(<$ty as FieldSet<T>>::Signals,)*);
            fn read(&self, cells: &FieldCells<T>, sc: &mut SignalContext) -> Self::Values {
                ($(self.$index.read(cells, sc),)*)
            }
            fn signals(&self, cells: &FieldCells<T>) -> Self::Signals {
                ($(self.$index.signals(cells),)*)
            }
        }
    };
}

impl_field_set_for_tuple!(F0 0);
impl_field_set_for_tuple!(F0 0, F1 1);
impl_field_set_for_tuple!(F0 0, F1 1, F2 2);
impl_field_set_for_tuple!(F0 0, F1 1, F2 2, F3 3);
impl_field_set_for_tuple!(F0 0, F1 1, F2 2, F3 3, F4 4);
impl_field_set_for_tuple!(F0 0, F1 1, F2 2, F3 3, F4 4, F5 5);
impl_field_set_for_tuple!(F0 0, F1 1, F2 2, F3 3, F4 4, F5 5, F6 6);
impl_field_set_for_tuple!(F0 0, F1 1, F2 2, F3 3, F4 4, F5 5, F6 6, F7 7);
