//! Trait definitions for talking to JIRA and Confluence.

use anyhow::Result;
use async_trait::async_trait;

use super::models::{ConfluencePage, IssueSearch, PageResults};
use super::requests::IssueQuery;

/// Trait for the REST operations a fetch cycle needs (enables testing with
/// fake implementations).
#[async_trait]
pub trait AtlassianApi: Send + Sync {
  /// Run the saved-filter issue search.
  ///
  /// # Arguments
  /// * `query` - Filter id and pagination.
  async fn search_issues(&self, query: &IssueQuery) -> Result<IssueSearch>;

  /// Fetch a page by ID, with version, space, history and storage body.
  ///
  /// # Arguments
  /// * `page_id` - Unique Confluence identifier for the page to retrieve.
  async fn get_page(&self, page_id: &str) -> Result<ConfluencePage>;

  /// List pages of a space, most recently updated first.
  ///
  /// # Arguments
  /// * `space_key` - Key of the space to list.
  /// * `limit` - Maximum number of pages returned.
  async fn space_pages(&self, space_key: &str, limit: u32) -> Result<PageResults>;

  /// Get child pages for a given page ID.
  ///
  /// # Arguments
  /// * `page_id` - Identifier of the parent page whose children should be
  ///   listed.
  /// * `with_body` - Also expand each child's storage body and space.
  async fn child_pages(&self, page_id: &str, with_body: bool) -> Result<PageResults>;
}
