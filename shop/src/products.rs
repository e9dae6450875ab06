use std::rc::Rc;

use futures::Stream;
use signal_state::{
    ActionContext, Connections, Patch, Producers, Signal, SignalState, StateFields,
};

use crate::{
    cart::CartStore,
    context::ShopContext,
    error::Result,
    model::{CartEntry, Category, Product},
    pager::{Pager, PagerOptions, PagerViewModel},
};

#[derive(Clone, Debug, PartialEq, StateFields)]
pub struct ProductsPageState {
    pub page_index: usize,
    pub query: String,
    pub items_per_page: usize,
    pub categories: Vec<Category>,
    pub products: Vec<Product>,
    pub filtered_products: Vec<Product>,
    pub paged_products: Vec<Product>,
    pub time: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProductsViewModel {
    pub categories: Vec<Category>,
    pub query: String,
    pub products: Vec<Product>,
    pub items_per_page: usize,
    pub page_index: usize,
    pub total: usize,
    pub pager: PagerViewModel,
    pub time: u64,
}

/// Product overview with search and paging.
pub struct ProductsPage {
    state: SignalState<ProductsPageState>,
    pager: Pager,
    cart: Rc<CartStore>,
    view_model: Signal<ProductsViewModel>,
}

impl ProductsPage {
    pub fn new(cx: &ShopContext, options: PagerOptions) -> Result<Self> {
        let state = SignalState::new();
        state.initialize(ProductsPageState {
            page_index: 0,
            query: String::new(),
            items_per_page: options.items_per_page,
            categories: Vec::new(),
            products: Vec::new(),
            filtered_products: Vec::new(),
            paged_products: Vec::new(),
            time: 0,
        })?;

        let catalog = &cx.catalog;
        state.connect_streams(
            Producers::new()
                .with(ProductsPageState::PRODUCTS, {
                    let catalog = catalog.clone();
                    move || catalog.products()
                })
                .with(ProductsPageState::CATEGORIES, {
                    let catalog = catalog.clone();
                    move || catalog.categories()
                }),
        )?;

        let filtered_products = state.select_many_map(
            (ProductsPageState::PRODUCTS, ProductsPageState::QUERY),
            |(products, query)| filter_products(products, &query),
        )?;
        let paged_products = state.select_many_map(
            (
                ProductsPageState::FILTERED_PRODUCTS,
                ProductsPageState::PAGE_INDEX,
                ProductsPageState::ITEMS_PER_PAGE,
            ),
            |(products, page_index, items_per_page)| page_of(products, page_index, items_per_page),
        )?;
        state.connect(
            Connections::new()
                .with(ProductsPageState::FILTERED_PRODUCTS, filtered_products)
                .with(ProductsPageState::PAGED_PRODUCTS, paged_products),
        )?;

        let pager = Pager::new(options)?;
        pager.connect(
            state.select(ProductsPageState::ITEMS_PER_PAGE)?,
            state.select_map(ProductsPageState::FILTERED_PRODUCTS, Vec::len)?,
            state.select(ProductsPageState::PAGE_INDEX)?,
        )?;

        let view_model = {
            let state = state.state()?;
            let pager = pager.view_model();
            Signal::new(move |sc| {
                let s = state.get(sc);
                ProductsViewModel {
                    total: s.filtered_products.len(),
                    categories: s.categories,
                    query: s.query,
                    products: s.paged_products,
                    items_per_page: s.items_per_page,
                    page_index: s.page_index,
                    pager: pager.get(sc),
                    time: s.time,
                }
            })
        };

        Ok(Self {
            state,
            pager,
            cart: cx.cart.clone(),
            view_model,
        })
    }

    pub fn view_model(&self) -> Signal<ProductsViewModel> {
        self.view_model.clone()
    }

    /// Filter products by name and go back to the first page.
    pub fn set_query(&self, query: impl Into<String>, ac: &mut ActionContext) -> Result<()> {
        self.state.patch(
            Patch::new()
                .set(ProductsPageState::PAGE_INDEX, 0)
                .set(ProductsPageState::QUERY, query.into()),
            ac,
        )?;
        Ok(())
    }
    pub fn set_page_index(&self, page_index: usize, ac: &mut ActionContext) -> Result<()> {
        self.state
            .patch(Patch::new().set(ProductsPageState::PAGE_INDEX, page_index), ac)?;
        Ok(())
    }
    pub fn set_items_per_page(&self, items_per_page: usize, ac: &mut ActionContext) -> Result<()> {
        self.state.patch(
            Patch::new()
                .set(ProductsPageState::PAGE_INDEX, 0)
                .set(ProductsPageState::ITEMS_PER_PAGE, items_per_page),
            ac,
        )?;
        Ok(())
    }

    pub fn first_page(&self, ac: &mut ActionContext) -> Result<()> {
        self.set_page_index(self.pager.start(), ac)
    }
    pub fn previous_page(&self, ac: &mut ActionContext) -> Result<()> {
        let page_index = self.pager.previous(&mut ac.sc())?;
        self.set_page_index(page_index, ac)
    }
    pub fn next_page(&self, ac: &mut ActionContext) -> Result<()> {
        let page_index = self.pager.next(&mut ac.sc())?;
        self.set_page_index(page_index, ac)
    }
    pub fn last_page(&self, ac: &mut ActionContext) -> Result<()> {
        let page_index = self.pager.end(&mut ac.sc())?;
        self.set_page_index(page_index, ac)
    }
    pub fn toggle_items_per_page(&self, ac: &mut ActionContext) -> Result<()> {
        self.pager.toggle_items_per_page(ac)
    }

    /// Show the time yielded by `clock`, in milliseconds since the Unix epoch.
    ///
    /// The clock is usually an endless stream that ticks once per second.
    pub fn connect_clock<S>(&self, clock: impl FnMut() -> S + 'static) -> Result<()>
    where
        S: Stream<Item = u64> + 'static,
    {
        self.state
            .connect_streams(Producers::new().with(ProductsPageState::TIME, clock))?;
        Ok(())
    }

    /// Fetch products again.
    pub fn reload(&self, ac: &mut ActionContext) -> Result<()> {
        self.state.trigger(ProductsPageState::PRODUCTS, ac)?;
        Ok(())
    }

    pub fn add_to_cart(&self, product: &Product, ac: &mut ActionContext) -> Result<()> {
        self.cart.add_to_cart(
            CartEntry {
                product_id: product.id,
                amount: 1,
            },
            ac,
        )
    }
}

fn filter_products(products: Vec<Product>, query: &str) -> Vec<Product> {
    let query = query.to_lowercase();
    products
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&query))
        .collect()
}

fn page_of(products: Vec<Product>, page_index: usize, items_per_page: usize) -> Vec<Product> {
    products
        .into_iter()
        .skip(page_index.saturating_mul(items_per_page))
        .take(items_per_page)
        .collect()
}
