//! Session management
//!
//! - [`TrackedMap`] - session data with a dirty flag
//! - [`SessionStore`] - narrow storage trait ([`MemorySessionStore`] provided)
//! - [`SessionMiddleware`] - interceptor exposing the session on the request
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use quill_core::app::App;
//! use quill_core::pipeline::{middleware, Handler};
//! use quill_core::session::{MemorySessionStore, SessionMiddleware};
//!
//! let mut app = App::new();
//! app.use_middleware(middleware(
//!     SessionMiddleware::new(Arc::new(MemorySessionStore::new())).with_cookie_name("app_session"),
//! ));
//! app.get("/", Handler::new(|cx| {
//!     if let Some(session) = cx.request.session_mut() {
//!         session.set("seen", true)?;
//!     }
//!     Ok("welcome")
//! })).unwrap();
//! ```

mod memory;
mod middleware;
mod store;
mod tracked;

pub use memory::MemorySessionStore;
pub use middleware::{SessionMiddleware, SESSION_COOKIE};
pub use store::{Session, SessionStore};
pub use tracked::TrackedMap;
