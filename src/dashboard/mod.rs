//! The dashboard's fetch cycle and the state it feeds.
//!
//! [`run_cycle`] talks to the REST APIs and returns an [`Event`];
//! [`update_state`] folds events into a [`DisplayState`]. The caller threads
//! the previous state and the selected tab from one cycle to the next.

pub mod cycle;
pub mod state;
pub mod today;

pub use cycle::{local_today, run_cycle, suggested_tab};
pub use state::{DisplayState, Event, Fetched, Tab, update_state};
pub use today::{fetch_today_page, select_today_page};
