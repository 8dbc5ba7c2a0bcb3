mod generation_record;

pub use generation_record::{GenerationRecord, PeriodTotal};
