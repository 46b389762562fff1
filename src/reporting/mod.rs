mod reporter;

pub use reporter::{AggregateItem, AggregateReport, SingleReport};
