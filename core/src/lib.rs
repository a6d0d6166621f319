pub mod catalog;
pub mod db;
pub mod display;
pub mod models;
pub mod shopping;
pub mod units;
