//! JIRA and Confluence at a glance
//!
//! This library polls a JIRA saved filter and Confluence pages, converts
//! Confluence storage-format bodies into sanitized HTML, and renders the
//! result as a fragment for a desktop widget host.

pub mod atlassian;
pub mod cli;
pub mod color;
pub mod commands;
pub mod config;
pub mod dashboard;
pub mod format;
pub mod render;
pub mod storage;
