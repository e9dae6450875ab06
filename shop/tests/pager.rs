use shop::{Pager, PagerOptions, PagerViewModel};
use signal_state::{core::Runtime, State};

struct Fixture {
    rt: Runtime,
    pager: Pager,
    items_per_page: State<usize>,
    total: State<usize>,
    page_index: State<usize>,
}

fn fixture(items_per_page: usize, total: usize, page_index: usize) -> Fixture {
    let mut rt = Runtime::new();
    let pager = Pager::new(PagerOptions::default()).unwrap();
    let items_per_page = State::new(items_per_page);
    let total = State::new(total);
    let page_index = State::new(page_index);
    pager
        .connect(
            items_per_page.to_signal(),
            total.to_signal(),
            page_index.to_signal(),
        )
        .unwrap();
    rt.update();
    Fixture {
        rt,
        pager,
        items_per_page,
        total,
        page_index,
    }
}

fn vm(f: &mut Fixture) -> PagerViewModel {
    f.pager.view_model().get(&mut f.rt.sc())
}

#[test]
fn default_options() {
    let options = PagerOptions::default();
    assert_eq!(options.items_per_page, 5);
    assert_eq!(options.items_per_page_options, vec![5, 10, 20]);
}

#[test]
fn empty_list() {
    let mut f = fixture(5, 0, 0);
    assert_eq!(
        vm(&mut f),
        PagerViewModel {
            item_from: 0,
            item_to: 0,
            total: 0,
            previous_disabled: true,
            next_disabled: true,
            show_items_per_page: false,
            items_per_page_options: vec![5, 10, 20],
        }
    );
    assert_eq!(f.pager.next(&mut f.rt.sc()).unwrap(), 0);
    assert_eq!(f.pager.end(&mut f.rt.sc()).unwrap(), 0);
}

#[test]
fn middle_page() {
    let mut f = fixture(5, 12, 1);
    let vm = vm(&mut f);
    assert_eq!((vm.item_from, vm.item_to, vm.total), (6, 10, 12));
    assert!(!vm.previous_disabled);
    assert!(!vm.next_disabled);
    assert_eq!(f.pager.start(), 0);
    assert_eq!(f.pager.previous(&mut f.rt.sc()).unwrap(), 0);
    assert_eq!(f.pager.next(&mut f.rt.sc()).unwrap(), 2);
    assert_eq!(f.pager.end(&mut f.rt.sc()).unwrap(), 2);
}

#[test]
fn last_page() {
    let mut f = fixture(5, 12, 2);
    let vm = vm(&mut f);
    assert_eq!((vm.item_from, vm.item_to), (11, 12));
    assert!(vm.next_disabled);
    assert_eq!(f.pager.next(&mut f.rt.sc()).unwrap(), 2);
}

#[test]
fn follows_sources() {
    let mut f = fixture(5, 12, 0);
    f.items_per_page.set(10, f.rt.ac());
    f.page_index.set(1, f.rt.ac());
    f.total.set(25, f.rt.ac());
    f.rt.update();
    let vm = vm(&mut f);
    assert_eq!((vm.item_from, vm.item_to, vm.total), (11, 20, 25));
    assert!(!vm.next_disabled);
}

#[test]
fn toggle_items_per_page() {
    let mut f = fixture(5, 12, 0);
    f.pager.toggle_items_per_page(f.rt.ac()).unwrap();
    assert!(vm(&mut f).show_items_per_page);
    f.pager.toggle_items_per_page(f.rt.ac()).unwrap();
    assert!(!vm(&mut f).show_items_per_page);
}

#[test]
fn page_index_far_beyond_last_page() {
    let mut f = fixture(5, 12, usize::MAX / 2 + 1);
    let vm = vm(&mut f);
    assert_eq!((vm.item_from, vm.item_to), (usize::MAX, 12));
    assert!(vm.next_disabled);
    assert_eq!(f.pager.next(&mut f.rt.sc()).unwrap(), 2);
    assert_eq!(f.pager.previous(&mut f.rt.sc()).unwrap(), usize::MAX / 2);
}
