use signal_state::{core::Runtime, Patch, SignalState, StateFields};

#[derive(Clone, StateFields)]
struct Empty {}

#[derive(Clone, StateFields)]
pub struct Page {
    pub index: usize,
    pub query: String,
    pub tags: Vec<String>,
}

fn main() {
    let mut rt = Runtime::new();
    let page = SignalState::new();
    page.initialize(Page {
        index: 0,
        query: String::new(),
        tags: Vec::new(),
    })
    .unwrap();
    let (index, query) = page.pick((Page::INDEX, Page::QUERY)).unwrap();
    page.patch(Patch::new().set(Page::INDEX, 2), rt.ac()).unwrap();
    assert_eq!(index.get(&mut rt.sc()), 2);
    assert_eq!(query.get(&mut rt.sc()), "");

    let empty = SignalState::new();
    empty.initialize(Empty {}).unwrap();
    assert!(Empty::FIELD_NAMES.is_empty());
}
