pub mod logging;
pub mod storage;
pub mod totals;
pub mod web;
