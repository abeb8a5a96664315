//! Web search: the `SearchProvider` seam, its Tavily and Exa implementations, and the
//! `SearchToolSource` that exposes a provider as the single `search` tool.

mod exa;
mod search;
mod tavily;

pub use exa::ExaSearch;
pub use search::{
    format_results, search_tool_spec, SearchProvider, SearchResult, SearchToolSource,
    NO_RESULTS, TOOL_SEARCH,
};
pub use tavily::TavilySearch;
