//! Tab state for a window's notebook of channel pages.
//!
//! Only the bookkeeping lives here: which pages exist, which one is selected,
//! and how urgently each unselected tab wants attention.

use crate::message::Message;

/// Attention level of a tab, ordered from least to most urgent.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TabHighlight {
    #[default]
    None,
    NewMessage,
    Highlighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageId(u64);

#[derive(Debug, Clone)]
pub struct NotebookPage {
    id: PageId,
    pub title: String,
    /// Channel shown on this page.
    pub channel: String,
    highlight: TabHighlight,
}

impl NotebookPage {
    pub fn id(&self) -> PageId {
        self.id
    }

    pub fn highlight(&self) -> TabHighlight {
        self.highlight
    }

    /// Raise the tab's attention level. Never lowers it.
    pub fn escalate(&mut self, level: TabHighlight) {
        self.highlight = self.highlight.max(level);
    }
}

#[derive(Debug, Default)]
pub struct Notebook {
    pages: Vec<NotebookPage>,
    selected: Option<PageId>,
    next_id: u64,
}

impl Notebook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pages(&self) -> &[NotebookPage] {
        &self.pages
    }

    pub fn page(&self, id: PageId) -> Option<&NotebookPage> {
        self.pages.iter().find(|p| p.id == id)
    }

    /// Add a page at the end. The first page is always selected.
    pub fn add_page(
        &mut self,
        title: impl Into<String>,
        channel: impl Into<String>,
        select: bool,
    ) -> PageId {
        let id = PageId(self.next_id);
        self.next_id += 1;
        self.pages.push(NotebookPage {
            id,
            title: title.into(),
            channel: channel.into(),
            highlight: TabHighlight::None,
        });
        if select || self.selected.is_none() {
            self.select(id);
        }
        id
    }

    /// Remove a page. If it was selected, the page that slides into its slot
    /// (or the new last page) becomes selected.
    pub fn remove_page(&mut self, id: PageId) -> bool {
        let Some(index) = self.pages.iter().position(|p| p.id == id) else {
            return false;
        };
        log::info!("Closing page '{}' (index {})", self.pages[index].title, index);
        self.pages.remove(index);

        if self.selected == Some(id) {
            self.selected = None;
            let next = index.min(self.pages.len().saturating_sub(1));
            if let Some(page) = self.pages.get(next) {
                let next_id = page.id;
                self.select(next_id);
            }
        }
        true
    }

    /// Select a page and clear its attention state.
    pub fn select(&mut self, id: PageId) -> bool {
        let Some(page) = self.pages.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        page.highlight = TabHighlight::None;
        self.selected = Some(id);
        true
    }

    pub fn selected_page(&self) -> Option<&NotebookPage> {
        self.selected.and_then(|id| self.page(id))
    }

    /// Update the tabs showing `message`'s channel. The selected tab is left
    /// alone since the user is already looking at it.
    pub fn route_message(&mut self, message: &Message) {
        let level = if message.is_highlighted() {
            TabHighlight::Highlighted
        } else {
            TabHighlight::NewMessage
        };
        let selected = self.selected;
        for page in self
            .pages
            .iter_mut()
            .filter(|p| p.channel == message.channel && Some(p.id) != selected)
        {
            page.escalate(level);
        }
    }
}
