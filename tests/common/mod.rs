#![allow(dead_code)]

pub mod fake_atlassian;
pub mod fixtures;
