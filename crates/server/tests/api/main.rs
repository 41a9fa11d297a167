mod ranges;
mod summaries;
