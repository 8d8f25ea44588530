//! Built-in tools

pub mod filter_budget;
pub mod save_results;
pub mod search_events;
pub mod search_news;

pub use filter_budget::{filter_by_budget, FilterBudgetTool, FilterBudgetToolFactory};
pub use save_results::{SaveResultsTool, SaveResultsToolFactory};
pub use search_events::{SearchEventsTool, SearchEventsToolFactory};
pub use search_news::{Article, SearchNewsTool, SearchNewsToolFactory};
