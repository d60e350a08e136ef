//! Return simulation: lagged positions, strategy returns, trading costs.

pub mod cost_model;
pub mod returns;

pub use cost_model::CostModel;
pub use returns::{cumulative_returns, lag_signals, market_returns, strategy_returns};
