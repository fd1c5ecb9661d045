//! Atlassian module providing the REST API abstraction, the HTTP client,
//! request construction, and data models for JIRA and Confluence.

pub mod api;
pub mod client;
pub mod models;
pub mod requests;

pub use api::AtlassianApi;
pub use client::AtlassianClient;
pub use models::{ConfluencePage, Issue, IssueSearch, PageResults, StatusCategory};
pub use requests::{Endpoints, IssueQuery, RequestSpec, Service, basic_auth_header};
