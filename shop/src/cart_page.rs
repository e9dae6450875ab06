use std::rc::Rc;

use signal_state::{
    ActionContext, Connections, Producers, Signal, SignalContext, SignalState, StateFields,
};

use crate::{
    cart::CartStore,
    context::ShopContext,
    error::{Result, ShopError},
    model::{CartEntry, Product},
};

#[derive(Clone, Debug, PartialEq, StateFields)]
pub struct CartPageState {
    pub entries: Vec<CartEntry>,
    pub products: Vec<Product>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CartLine {
    pub product_id: u32,
    pub amount: u32,
    pub name: String,
    pub price: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartViewModel {
    pub lines: Vec<CartLine>,
    pub amount: u32,
    pub total_price: f64,
}

/// Contents of the shopping cart with product details.
pub struct CartPage {
    state: SignalState<CartPageState>,
    cart: Rc<CartStore>,
    view_model: Signal<Result<CartViewModel>>,
}

impl CartPage {
    pub fn new(cx: &ShopContext, sc: &mut SignalContext) -> Result<Self> {
        let state = SignalState::new();
        state.initialize(CartPageState {
            entries: cx.cart.entries(sc)?,
            products: Vec::new(),
        })?;
        state.connect_streams(Producers::new().with(CartPageState::PRODUCTS, {
            let catalog = cx.catalog.clone();
            move || catalog.products()
        }))?;
        state.connect(Connections::new().with(CartPageState::ENTRIES, cx.cart.pick_entries()?))?;
        let view_model = state.state()?.map(build_view_model);
        Ok(Self {
            state,
            cart: cx.cart.clone(),
            view_model,
        })
    }

    /// The view model, or [`ShopError::ProductNotFound`] if an entry refers to an unknown product.
    pub fn view_model(&self) -> Signal<Result<CartViewModel>> {
        self.view_model.clone()
    }

    pub fn update_amount(&self, product_id: u32, amount: u32, ac: &mut ActionContext) -> Result<()> {
        self.cart.update_amount(product_id, amount, ac)
    }
    pub fn delete(&self, product_id: u32, ac: &mut ActionContext) -> Result<()> {
        self.cart.delete_from_cart(product_id, ac)
    }
    pub fn reload(&self, ac: &mut ActionContext) -> Result<()> {
        self.state.trigger(CartPageState::PRODUCTS, ac)?;
        Ok(())
    }
}

fn build_view_model(state: &CartPageState) -> Result<CartViewModel> {
    if state.products.is_empty() {
        return Ok(CartViewModel::default());
    }
    let lines = state
        .entries
        .iter()
        .map(|entry| {
            let product = state
                .products
                .iter()
                .find(|p| p.id == entry.product_id)
                .ok_or(ShopError::ProductNotFound {
                    product_id: entry.product_id,
                })?;
            Ok(CartLine {
                product_id: entry.product_id,
                amount: entry.amount,
                name: product.name.clone(),
                price: product.price,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(CartViewModel {
        total_price: lines
            .iter()
            .map(|line| f64::from(line.amount) * line.price)
            .sum(),
        amount: lines.iter().map(|line| line.amount).sum(),
        lines,
    })
}
