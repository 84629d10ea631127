//! # unlock-server
//!
//! HTTP view of the weekly unlock schedule.
//!
//! - `GET /` — HTML table for a week (`?start_date=YYYY-MM-DD`)
//! - `GET /api/week` — the same schedule as JSON
//! - `GET /health` — liveness

pub mod error;
pub mod handlers;
pub mod page;
pub mod router;
pub mod state;

pub use error::AppError;
pub use router::create_router;
pub use state::AppState;
