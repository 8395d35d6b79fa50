use crate::config::ImagePlacement;
use crate::error::BoardError;
use crate::page::{ImageTicket, Page};
use crate::{PageId, SourceId};

/// State of the page navigation bar.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageNav {
    /// 1-based.
    pub current: usize,
    pub total: usize,
    pub can_prev: bool,
    pub can_next: bool,
    pub can_delete: bool,
}

/// Ordered pages with exactly one active. Never empty.
#[derive(Clone, Debug)]
pub struct Document {
    pages: Vec<Page>,
    active: usize,
    next_page_id: u32,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            pages: vec![Page::new(PageId(1))],
            active: 0,
            next_page_id: 2,
        }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_page(&self) -> &Page {
        &self.pages[self.active]
    }

    pub fn active_page_mut(&mut self) -> &mut Page {
        &mut self.pages[self.active]
    }

    pub fn page(&self, id: PageId) -> Option<&Page> {
        self.pages.iter().find(|page| page.id() == id)
    }

    fn page_mut(&mut self, id: PageId) -> Option<&mut Page> {
        self.pages.iter_mut().find(|page| page.id() == id)
    }

    fn index_of(&self, id: PageId) -> Option<usize> {
        self.pages.iter().position(|page| page.id() == id)
    }

    /// Makes `id` the active page. Whatever the leaving page has in
    /// progress stays on it. Returns false for an unknown id.
    pub fn switch_to(&mut self, id: PageId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        if index != self.active {
            log::debug!("switching from page {} to page {id}", self.active_page().id());
        }
        self.active = index;
        true
    }

    pub fn create_page(&mut self) -> PageId {
        let id = PageId(self.next_page_id);
        self.next_page_id += 1;
        self.pages.push(Page::new(id));
        self.switch_to(id);
        id
    }

    /// Deletes the active page and activates its neighbour: the next page,
    /// or the previous one when deleting the last. The sole page stays.
    pub fn delete_page(&mut self) -> Option<PageId> {
        if self.pages.len() <= 1 {
            return None;
        }
        let doomed = self.active;
        let target = if doomed == self.pages.len() - 1 {
            self.pages[doomed - 1].id()
        } else {
            self.pages[doomed + 1].id()
        };
        self.switch_to(target);
        let removed = self.pages.remove(doomed);
        if doomed < self.active {
            self.active -= 1;
        }
        log::debug!("deleted page {}", removed.id());
        Some(removed.id())
    }

    /// Whether any image on any page still draws from `source`.
    pub fn source_in_use(&self, source: SourceId) -> bool {
        self.pages
            .iter()
            .any(|page| page.images().iter().any(|image| image.source == source))
    }

    pub fn previous_page(&mut self) -> bool {
        if self.active == 0 {
            return false;
        }
        let id = self.pages[self.active - 1].id();
        self.switch_to(id)
    }

    pub fn next_page(&mut self) -> bool {
        let Some(page) = self.pages.get(self.active + 1) else {
            return false;
        };
        let id = page.id();
        self.switch_to(id)
    }

    pub fn navigation(&self) -> PageNav {
        let total = self.pages.len();
        PageNav {
            current: self.active + 1,
            total,
            can_prev: self.active > 0,
            can_next: self.active + 1 < total,
            can_delete: total > 1,
        }
    }

    /// Reserves an image on the active page. The image lands on that page
    /// when delivered, whichever page is active by then.
    pub fn request_image(&mut self) -> ImageTicket {
        let page = self.active_page_mut();
        ImageTicket {
            page: page.id(),
            image: page.request_image(),
        }
    }

    pub fn deliver_image(
        &mut self,
        ticket: ImageTicket,
        source: SourceId,
        placement: &ImagePlacement,
    ) -> Result<(), BoardError> {
        let page = self
            .page_mut(ticket.page)
            .ok_or(BoardError::PageNotFound(ticket.page))?;
        page.deliver_image(ticket.image, source, placement)
    }

    pub fn abandon_image(&mut self, ticket: ImageTicket) -> bool {
        self.page_mut(ticket.page)
            .map(|page| page.abandon_image(ticket.image))
            .unwrap_or(false)
    }
}
