//! The ordered set of page images produced by one conversion run.
//!
//! Entries keep the `page_number` they were stamped with at creation; deleting
//! an entry never renumbers the survivors. Display position and page number
//! are therefore different things once anything has been deleted.

use crate::config::{OutputFormat, QualityLevel};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use std::sync::Arc;

/// One encoded page raster.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct PageImage {
    /// 1-based page number in the source document.
    pub page_number: usize,
    pub format: OutputFormat,
    pub quality: QualityLevel,
    pub width: u32,
    pub height: u32,
    #[serde(skip)]
    data: Arc<[u8]>,
}

impl PageImage {
    pub fn new(
        page_number: usize,
        format: OutputFormat,
        quality: QualityLevel,
        (width, height): (u32, u32),
        data: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            page_number,
            format,
            quality,
            width,
            height,
            data: data.into(),
        }
    }

    /// Encoded bytes in [`Self::format`].
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    /// `data:<mime>;base64,...` URL for embedding in a preview.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), STANDARD.encode(&self.data))
    }
}

impl std::fmt::Debug for PageImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageImage")
            .field("page_number", &self.page_number)
            .field("format", &self.format)
            .field("quality", &self.quality)
            .field("size", &(self.width, self.height))
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Page images in display order plus the "current" pointer.
///
/// Invariant after every mutation: `current < len()` when non-empty,
/// `current == 0` when empty.
#[derive(Debug, Clone, Default)]
pub struct PageCollection {
    pages: Vec<PageImage>,
    current: usize,
}

impl PageCollection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every entry and point at the first one.
    pub fn replace_all(&mut self, images: Vec<PageImage>) {
        self.pages = images;
        self.current = 0;
    }

    /// Remove the current entry and return it. No-op on an empty collection.
    pub fn delete_current(&mut self) -> Option<PageImage> {
        if self.pages.is_empty() {
            return None;
        }
        let removed = self.pages.remove(self.current);
        self.current = self.current.min(self.pages.len().saturating_sub(1));
        Some(removed)
    }

    /// Move the pointer, clamping out-of-range indices to the last entry.
    pub fn set_current(&mut self, index: usize) {
        self.current = index.min(self.pages.len().saturating_sub(1));
    }

    /// Advance one entry, wrapping to the first.
    pub fn next(&mut self) {
        if !self.pages.is_empty() {
            self.current = (self.current + 1) % self.pages.len();
        }
    }

    /// Step back one entry, wrapping to the last.
    pub fn previous(&mut self) {
        if !self.pages.is_empty() {
            self.current = self
                .current
                .checked_sub(1)
                .unwrap_or(self.pages.len() - 1);
        }
    }

    pub fn clear(&mut self) {
        self.pages.clear();
        self.current = 0;
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&PageImage> {
        self.pages.get(self.current)
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn pages(&self) -> &[PageImage] {
        &self.pages
    }

    /// The single format shared by every entry, or `None` if empty or mixed.
    pub fn format(&self) -> Option<OutputFormat> {
        let first = self.pages.first()?.format;
        self.pages.iter().all(|p| p.format == first).then_some(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(n: usize) -> Vec<PageImage> {
        (1..=n)
            .map(|i| {
                PageImage::new(
                    i,
                    OutputFormat::Png,
                    QualityLevel::Q100,
                    (1, 1),
                    vec![i as u8],
                )
            })
            .collect()
    }

    fn numbers(c: &PageCollection) -> Vec<usize> {
        c.pages().iter().map(|p| p.page_number).collect()
    }

    fn assert_invariant(c: &PageCollection) {
        if c.is_empty() {
            assert_eq!(c.current_index(), 0);
        } else {
            assert!(c.current_index() < c.len());
        }
    }

    #[test]
    fn replace_all_resets_pointer() {
        let mut c = PageCollection::new();
        c.replace_all(pages(4));
        c.set_current(3);
        c.replace_all(pages(2));
        assert_eq!(c.current_index(), 0);
        assert_eq!(numbers(&c), vec![1, 2]);
    }

    #[test]
    fn delete_on_empty_is_noop() {
        let mut c = PageCollection::new();
        assert!(c.delete_current().is_none());
        assert_eq!(c.len(), 0);
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn delete_keeps_page_numbers() {
        let mut c = PageCollection::new();
        c.replace_all(pages(5));
        c.delete_current();
        c.delete_current();
        assert_eq!(numbers(&c), vec![3, 4, 5]);
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn delete_last_entry_clamps_pointer() {
        let mut c = PageCollection::new();
        c.replace_all(pages(3));
        c.set_current(2);
        let removed = c.delete_current().unwrap();
        assert_eq!(removed.page_number, 3);
        assert_eq!(c.current_index(), 1);
        assert_eq!(c.current().unwrap().page_number, 2);
    }

    #[test]
    fn set_current_clamps() {
        let mut c = PageCollection::new();
        c.set_current(7);
        assert_eq!(c.current_index(), 0);
        c.replace_all(pages(3));
        c.set_current(99);
        assert_eq!(c.current_index(), 2);
    }

    #[test]
    fn navigation_wraps() {
        let mut c = PageCollection::new();
        c.replace_all(pages(3));
        c.previous();
        assert_eq!(c.current_index(), 2);
        c.next();
        assert_eq!(c.current_index(), 0);
    }

    #[test]
    fn invariant_holds_across_mixed_mutations() {
        let mut c = PageCollection::new();
        c.replace_all(pages(6));
        let ops: [(bool, usize); 12] = [
            (false, 5),
            (true, 0),
            (false, 9),
            (true, 0),
            (true, 0),
            (false, 1),
            (true, 0),
            (false, 0),
            (true, 0),
            (true, 0),
            (true, 0),
            (false, 3),
        ];
        for (delete, idx) in ops {
            if delete {
                c.delete_current();
            } else {
                c.set_current(idx);
            }
            assert_invariant(&c);
        }
        assert!(c.is_empty());
    }

    #[test]
    fn data_url_prefix() {
        let page = PageImage::new(1, OutputFormat::Jpg, QualityLevel::Q50, (1, 1), vec![1, 2, 3]);
        assert_eq!(page.to_data_url(), "data:image/jpeg;base64,AQID");
    }

    #[test]
    fn format_reports_homogeneous_collections_only() {
        let mut c = PageCollection::new();
        assert_eq!(c.format(), None);
        let mut mixed = pages(2);
        mixed.push(PageImage::new(3, OutputFormat::Webp, QualityLevel::Q100, (1, 1), vec![0]));
        c.replace_all(mixed);
        assert_eq!(c.format(), None);
        c.set_current(2);
        c.delete_current();
        assert_eq!(c.format(), Some(OutputFormat::Png));
    }
}
