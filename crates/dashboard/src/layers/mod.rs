pub(crate) mod render;
pub(crate) mod service;
pub(crate) mod session;
pub(crate) mod ui;
