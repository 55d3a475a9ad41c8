//! Paginated list responses and requests
//!
//! Mirrors the console API's resource page envelope: 1-based page numbers,
//! a total page count and a total result count.

use crate::payload::FilterPayload;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One page of raw entity records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Raw records in API order
    pub data: Vec<Value>,
    /// This page's number (1-based)
    pub page: u32,
    /// Total number of pages
    pub pages: u32,
    /// Total number of matching records across all pages
    pub results: u32,
}

impl Page {
    /// Create a page
    pub fn new(data: Vec<Value>, page: u32, pages: u32, results: u32) -> Self {
        Page {
            data,
            page,
            pages,
            results,
        }
    }

    /// A complete result set delivered as a single page
    pub fn single(data: Vec<Value>) -> Self {
        let results = data.len() as u32;
        Page::new(data, 1, 1, results)
    }

    /// Whether a later page exists
    pub fn has_next_page(&self) -> bool {
        self.page < self.pages
    }

    /// Number of records on this page
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether this page carries no records
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Request for one page of an entity collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Lowered filter for the entity
    pub filter: FilterPayload,
    /// Requested page number (1-based)
    pub page: u32,
    /// Records per page
    pub page_size: u32,
}

impl PageRequest {
    /// Request the first page
    pub fn first(filter: FilterPayload, page_size: u32) -> Self {
        PageRequest {
            filter,
            page: 1,
            page_size,
        }
    }

    /// Request the page after `page`
    pub fn next(&self) -> Self {
        PageRequest {
            filter: self.filter.clone(),
            page: self.page + 1,
            page_size: self.page_size,
        }
    }
}
