pub(crate) mod backend;
pub(crate) mod controller;
pub(crate) mod events;
mod http_utils;
pub(crate) mod logging;

pub(crate) use backend::{HttpBackend, RiskBackend};
pub(crate) use controller::Controller;
pub(crate) use events::SessionEvent;
pub(crate) use logging::init_tracing;
