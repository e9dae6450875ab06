use std::rc::Rc;

use shop::{
    CartEntry, CartLine, CartPage, CartStore, CartViewModel, InMemoryCatalog, PagerOptions,
    Product, ProductsPage, ShopContext, ShopError,
};
use signal_state::core::Runtime;

fn product(id: u32, name: &str, price: f64) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: String::new(),
        price,
        advice: String::new(),
        category_id: 1,
        quantity: Some(10),
    }
}

fn context(entries: Vec<CartEntry>) -> ShopContext {
    let catalog = InMemoryCatalog::new(
        vec![
            product(1, "Apple", 0.5),
            product(2, "Banana", 1.25),
            product(3, "Cherry", 4.0),
        ],
        Vec::new(),
    );
    ShopContext::new(
        Rc::new(catalog),
        Rc::new(CartStore::with_entries(entries).unwrap()),
    )
}

fn entry(product_id: u32, amount: u32) -> CartEntry {
    CartEntry { product_id, amount }
}

fn line(product_id: u32, amount: u32, name: &str, price: f64) -> CartLine {
    CartLine {
        product_id,
        amount,
        name: name.to_string(),
        price,
    }
}

#[test]
fn empty_until_products_are_loaded() {
    let mut rt = Runtime::new();
    let cx = context(vec![entry(1, 2)]);
    let page = CartPage::new(&cx, &mut rt.sc()).unwrap();
    assert_eq!(
        page.view_model().get(&mut rt.sc()),
        Ok(CartViewModel::default())
    );
}

#[test]
fn lines_and_totals() {
    let mut rt = Runtime::new();
    let cx = context(vec![entry(1, 2), entry(3, 1)]);
    let page = CartPage::new(&cx, &mut rt.sc()).unwrap();
    rt.update();
    assert_eq!(
        page.view_model().get(&mut rt.sc()),
        Ok(CartViewModel {
            lines: vec![line(1, 2, "Apple", 0.5), line(3, 1, "Cherry", 4.0)],
            amount: 3,
            total_price: 5.0,
        })
    );
}

#[test]
fn update_amount_and_delete() {
    let mut rt = Runtime::new();
    let cx = context(vec![entry(1, 2), entry(2, 1)]);
    let page = CartPage::new(&cx, &mut rt.sc()).unwrap();
    rt.update();

    page.update_amount(2, 4, rt.ac()).unwrap();
    rt.update();
    let vm = page.view_model().get(&mut rt.sc()).unwrap();
    assert_eq!(vm.amount, 6);
    assert_eq!(vm.total_price, 6.0);

    page.delete(1, rt.ac()).unwrap();
    rt.update();
    let vm = page.view_model().get(&mut rt.sc()).unwrap();
    assert_eq!(vm.lines, vec![line(2, 4, "Banana", 1.25)]);
    assert_eq!(cx.cart.entries(&mut rt.sc()).unwrap(), vec![entry(2, 4)]);
}

#[test]
fn follows_products_page() {
    let mut rt = Runtime::new();
    let cx = context(Vec::new());
    let products = ProductsPage::new(&cx, PagerOptions::default()).unwrap();
    let cart = CartPage::new(&cx, &mut rt.sc()).unwrap();
    rt.update();

    let vm = products.view_model().get(&mut rt.sc());
    products.add_to_cart(&vm.products[1], rt.ac()).unwrap();
    rt.update();
    let vm = cart.view_model().get(&mut rt.sc()).unwrap();
    assert_eq!(vm.lines, vec![line(2, 1, "Banana", 1.25)]);
    assert_eq!(vm.amount, 1);
}

#[test]
fn unknown_product() {
    let mut rt = Runtime::new();
    let cx = context(vec![entry(1, 1), entry(42, 1)]);
    let page = CartPage::new(&cx, &mut rt.sc()).unwrap();
    rt.update();
    let e = page.view_model().get(&mut rt.sc()).unwrap_err();
    assert_eq!(e, ShopError::ProductNotFound { product_id: 42 });
    assert_eq!(e.to_string(), "product 42 not found");
}

#[test]
fn reload_picks_up_removed_product() {
    let mut rt = Runtime::new();
    let catalog = Rc::new(InMemoryCatalog::new(
        vec![product(1, "Apple", 0.5)],
        Vec::new(),
    ));
    let cx = ShopContext::new(
        catalog.clone(),
        Rc::new(CartStore::with_entries(vec![entry(1, 1)]).unwrap()),
    );
    let page = CartPage::new(&cx, &mut rt.sc()).unwrap();
    rt.update();
    assert!(page.view_model().get(&mut rt.sc()).is_ok());

    catalog.put_product(product(2, "Banana", 1.25));
    catalog.remove_product(1);
    page.reload(rt.ac()).unwrap();
    rt.update();
    assert_eq!(
        page.view_model().get(&mut rt.sc()),
        Err(ShopError::ProductNotFound { product_id: 1 })
    );
}
