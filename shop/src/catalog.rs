use std::cell::RefCell;

use futures::{
    future::ready,
    stream::{self, LocalBoxStream},
    StreamExt,
};
use serde::Deserialize;

use crate::{
    error::Result,
    model::{Category, Product},
};

/// Source of products and categories.
///
/// Each call starts a new request. The returned stream yields the response and ends.
pub trait Catalog {
    fn products(&self) -> LocalBoxStream<'static, Vec<Product>>;
    fn categories(&self) -> LocalBoxStream<'static, Vec<Category>>;
}

#[derive(Default, Deserialize)]
struct CatalogData {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    categories: Vec<Category>,
}

/// [`Catalog`] that answers every request from memory.
#[derive(Default)]
pub struct InMemoryCatalog(RefCell<CatalogData>);

impl InMemoryCatalog {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self(RefCell::new(CatalogData {
            products,
            categories,
        }))
    }

    /// Load a catalog of the form `{ "products": [...], "categories": [...] }`.
    pub fn from_json(json: &str) -> Result<Self> {
        let data: CatalogData = serde_json::from_str(json)?;
        tracing::debug!(
            products = data.products.len(),
            categories = data.categories.len(),
            "catalog loaded"
        );
        Ok(Self(RefCell::new(data)))
    }

    /// Add or replace a product. Visible to the next request.
    pub fn put_product(&self, product: Product) {
        let products = &mut self.0.borrow_mut().products;
        match products.iter_mut().find(|p| p.id == product.id) {
            Some(p) => *p = product,
            None => products.push(product),
        }
    }
    pub fn remove_product(&self, id: u32) {
        self.0.borrow_mut().products.retain(|p| p.id != id);
    }
}

impl Catalog for InMemoryCatalog {
    fn products(&self) -> LocalBoxStream<'static, Vec<Product>> {
        stream::once(ready(self.0.borrow().products.clone())).boxed_local()
    }
    fn categories(&self) -> LocalBoxStream<'static, Vec<Category>> {
        stream::once(ready(self.0.borrow().categories.clone())).boxed_local()
    }
}
