//! finroute HTTP server
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/bot` | Route a question and return the answer |
//! | `GET`  | `/health` | Health check (returns version) |
//! | `GET`  | `/api/company_overview` | One company by symbol, or a sorted list |
//! | `GET`  | `/api/{cash_flow,quarterly_earnings,stock_weekly_data,news_sentiment}` | Records for a symbol |
//!
//! All origins, methods, and headers are allowed.

mod bot;
mod data_api;
mod error;
mod server;
mod state;

pub use server::{app, run_server, serve};
pub use state::AppState;
