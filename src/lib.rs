pub mod app;
pub mod badge;
pub mod bus;
pub mod classify;
pub mod config;
pub mod counter;
pub mod health;
pub mod http;
pub mod intake;
pub mod poller;
pub mod remote;
pub mod storage;
