use signal_state::{
    ActionContext, Connections, Patch, Signal, SignalContext, SignalState, StateFields,
};

use crate::error::Result;

/// Page size settings of a paged list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerOptions {
    pub items_per_page: usize,
    pub items_per_page_options: Vec<usize>,
}
impl Default for PagerOptions {
    fn default() -> Self {
        Self {
            items_per_page: 5,
            items_per_page_options: vec![5, 10, 20],
        }
    }
}

#[derive(Clone, Debug, PartialEq, StateFields)]
pub struct PagerState {
    pub items_per_page: usize,
    pub total: usize,
    pub page_index: usize,
    pub show_items_per_page: bool,
    pub items_per_page_options: Vec<usize>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagerViewModel {
    pub item_from: usize,
    pub item_to: usize,
    pub total: usize,
    pub previous_disabled: bool,
    pub next_disabled: bool,
    pub show_items_per_page: bool,
    pub items_per_page_options: Vec<usize>,
}

impl PagerState {
    fn page_count(&self) -> usize {
        if self.items_per_page == 0 {
            0
        } else {
            self.total.div_ceil(self.items_per_page)
        }
    }
    fn view_model(&self) -> PagerViewModel {
        let page_count = self.page_count();
        let has_next = self.page_index.saturating_add(1) < page_count;
        PagerViewModel {
            item_from: if self.total == 0 {
                0
            } else {
                self.page_index
                    .saturating_mul(self.items_per_page)
                    .saturating_add(1)
            },
            item_to: if has_next {
                self.page_index.saturating_add(1).saturating_mul(self.items_per_page)
            } else {
                self.total
            },
            total: self.total,
            previous_disabled: self.page_index == 0,
            next_disabled: !has_next,
            show_items_per_page: self.show_items_per_page,
            items_per_page_options: self.items_per_page_options.clone(),
        }
    }
}

/// Navigation of a paged list.
///
/// The pager does not own the page index. Navigation methods return the requested index,
/// and the owner of the list applies it.
pub struct Pager {
    state: SignalState<PagerState>,
    view_model: Signal<PagerViewModel>,
}

impl Pager {
    pub fn new(options: PagerOptions) -> Result<Self> {
        let state = SignalState::new();
        state.initialize(PagerState {
            items_per_page: options.items_per_page,
            total: 0,
            page_index: 0,
            show_items_per_page: false,
            items_per_page_options: options.items_per_page_options,
        })?;
        let view_model = state.state()?.map(PagerState::view_model);
        Ok(Self { state, view_model })
    }

    /// Follow the page size, item count and page index of a list.
    pub fn connect(
        &self,
        items_per_page: Signal<usize>,
        total: Signal<usize>,
        page_index: Signal<usize>,
    ) -> Result<()> {
        self.state.connect(
            Connections::new()
                .with(PagerState::ITEMS_PER_PAGE, items_per_page)
                .with(PagerState::TOTAL, total)
                .with(PagerState::PAGE_INDEX, page_index),
        )?;
        Ok(())
    }

    pub fn view_model(&self) -> Signal<PagerViewModel> {
        self.view_model.clone()
    }

    pub fn toggle_items_per_page(&self, ac: &mut ActionContext) -> Result<()> {
        let show = self.state.snapshot(&mut ac.sc())?.show_items_per_page;
        self.state.patch(
            Patch::new().set(PagerState::SHOW_ITEMS_PER_PAGE, !show),
            ac,
        )?;
        Ok(())
    }

    pub fn start(&self) -> usize {
        0
    }
    pub fn previous(&self, sc: &mut SignalContext) -> Result<usize> {
        Ok(self.state.snapshot(sc)?.page_index.saturating_sub(1))
    }
    pub fn next(&self, sc: &mut SignalContext) -> Result<usize> {
        let state = self.state.snapshot(sc)?;
        Ok(state
            .page_index
            .saturating_add(1)
            .min(state.page_count().saturating_sub(1)))
    }
    pub fn end(&self, sc: &mut SignalContext) -> Result<usize> {
        Ok(self.state.snapshot(sc)?.page_count().saturating_sub(1))
    }
}
