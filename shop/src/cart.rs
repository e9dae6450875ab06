use signal_state::{ActionContext, Patch, Signal, SignalContext, SignalState, StateFields};

use crate::{error::Result, model::CartEntry};

#[derive(Clone, Debug, Default, PartialEq, StateFields)]
pub struct CartState {
    pub entries: Vec<CartEntry>,
}

/// Shopping cart shared by every page.
pub struct CartStore(SignalState<CartState>);

impl CartStore {
    pub fn new() -> Result<Self> {
        Self::with_entries(Vec::new())
    }
    pub fn with_entries(entries: Vec<CartEntry>) -> Result<Self> {
        let state = SignalState::new();
        state.initialize(CartState { entries })?;
        Ok(Self(state))
    }

    pub fn add_to_cart(&self, entry: CartEntry, ac: &mut ActionContext) -> Result<()> {
        tracing::debug!(product_id = entry.product_id, amount = entry.amount, "add to cart");
        let mut entries = self.entries(&mut ac.sc())?;
        entries.push(entry);
        self.set_entries(entries, ac)
    }
    pub fn delete_from_cart(&self, product_id: u32, ac: &mut ActionContext) -> Result<()> {
        let mut entries = self.entries(&mut ac.sc())?;
        entries.retain(|entry| entry.product_id != product_id);
        self.set_entries(entries, ac)
    }
    pub fn update_amount(&self, product_id: u32, amount: u32, ac: &mut ActionContext) -> Result<()> {
        let mut entries = self.entries(&mut ac.sc())?;
        for entry in &mut entries {
            if entry.product_id == product_id {
                entry.amount = amount;
            }
        }
        self.set_entries(entries, ac)
    }
    fn set_entries(&self, entries: Vec<CartEntry>, ac: &mut ActionContext) -> Result<()> {
        self.0
            .patch(Patch::new().set(CartState::ENTRIES, entries), ac)?;
        Ok(())
    }

    /// Current entries, read without tracking.
    pub fn entries(&self, sc: &mut SignalContext) -> Result<Vec<CartEntry>> {
        Ok(self.0.snapshot(sc)?.entries)
    }

    /// Live view of the entries, for [`Connections::with`](signal_state::Connections::with).
    pub fn pick_entries(&self) -> Result<Signal<Vec<CartEntry>>> {
        let (entries,) = self.0.pick((CartState::ENTRIES,))?;
        Ok(entries)
    }

    /// Total number of items in the cart.
    pub fn amount(&self) -> Result<Signal<u32>> {
        Ok(self.0.select_map(CartState::ENTRIES, |entries| {
            entries.iter().map(|entry| entry.amount).sum::<u32>()
        })?)
    }
}
