// Service module exports

pub mod classify;
pub mod compose;
pub mod controller;
pub mod event_store;
pub mod layout;
pub mod month;
pub mod settings;
pub mod window;
