//! Train station information server.
//!
//! Answers timetable queries and accepts delay reports from many concurrent
//! TCP clients. Connection handlers parse request lines into commands and
//! queue them; a single dispatcher applies them to the schedule store in
//! arrival order and writes each reply back to its client.

pub mod command;
pub mod config;
pub mod domain;
pub mod net;
pub mod server;
pub mod store;
