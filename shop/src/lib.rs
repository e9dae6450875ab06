//! Product catalog and shopping cart pages built on [`signal_state`].
//!
//! Every page owns a [`SignalState`](signal_state::SignalState). Services are passed explicitly through [`ShopContext`].

mod cart;
mod cart_page;
mod catalog;
mod context;
mod error;
mod model;
mod pager;
mod products;

pub use cart::{CartState, CartStore};
pub use cart_page::{CartLine, CartPage, CartPageState, CartViewModel};
pub use catalog::{Catalog, InMemoryCatalog};
pub use context::ShopContext;
pub use error::ShopError;
pub use model::{CartEntry, Category, Product};
pub use pager::{Pager, PagerOptions, PagerState, PagerViewModel};
pub use products::{ProductsPage, ProductsPageState, ProductsViewModel};
