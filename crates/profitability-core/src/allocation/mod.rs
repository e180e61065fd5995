pub mod engine;
pub mod plan;
pub mod rounding;

pub use engine::{allocate_hours, AllocationCandidate, AllocationConfig, AllocationRow};
pub use plan::{period_candidates, plan_allocation, AllocationPlan, Period};
