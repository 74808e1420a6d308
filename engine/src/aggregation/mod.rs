// Pure aggregation over record slices: grouping, time bucketing, chart shaping.
pub mod chart_data;
pub mod grouping;
pub mod metrics;
pub mod sentiment;
pub mod timeline;

pub use chart_data::{rank_rows, to_chart_data, top_n, without_sentinel};
pub use grouping::{cross_tab, group_count, group_sum};
pub use metrics::MetricsSummary;
pub use sentiment::{Sentiment, SentimentRow, SentimentTotals};
pub use timeline::{bucket_by_time, stacked_timeline, with_averages};
