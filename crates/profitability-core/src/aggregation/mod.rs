pub mod filter;
pub mod grouping;

pub use filter::{filter_options, filter_records, Choice, FilterOptions, Selection, ALL_LABEL};
pub use grouping::{
    aggregate_by_project, detail_rows, filter_and_aggregate, summarize, AggregateRow, DetailRow,
    ResultRow, Totals,
};
