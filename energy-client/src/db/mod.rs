pub mod generation_queries;
