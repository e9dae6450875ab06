use std::rc::Rc;

use crate::{cart::CartStore, catalog::Catalog};

/// Services shared by the pages of the shop.
#[derive(Clone)]
pub struct ShopContext {
    pub catalog: Rc<dyn Catalog>,
    pub cart: Rc<CartStore>,
}

impl ShopContext {
    pub fn new(catalog: Rc<dyn Catalog>, cart: Rc<CartStore>) -> Self {
        Self { catalog, cart }
    }
}
