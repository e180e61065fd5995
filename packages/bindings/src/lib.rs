use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use profitability_core::aggregation::Selection;
use profitability_core::allocation::{AllocationCandidate, AllocationConfig, Period};
use profitability_core::records::{Dataset, RawTable};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct ReportRequest {
    table: RawTable,
    #[serde(default)]
    selection: Selection,
}

#[derive(Deserialize)]
struct FilterOptionsRequest {
    table: RawTable,
    #[serde(default)]
    year: Option<i32>,
}

#[derive(Deserialize)]
struct AllocateRequest {
    candidates: Vec<AllocationCandidate>,
    #[serde(default)]
    config: AllocationConfig,
}

#[derive(Deserialize)]
struct PlanRequest {
    table: RawTable,
    /// Defaults to the current month.
    #[serde(default)]
    period: Option<Period>,
    #[serde(default)]
    config: AllocationConfig,
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[napi]
pub fn normalize_table(table_json: String) -> NapiResult<String> {
    let table: RawTable = serde_json::from_str(&table_json).map_err(to_napi_error)?;
    let records = profitability_core::records::normalize(&table).map_err(to_napi_error)?;
    serde_json::to_string(&records).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Profitability
// ---------------------------------------------------------------------------

#[napi]
pub fn profitability_report(input_json: String) -> NapiResult<String> {
    let input: ReportRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let dataset = Dataset::from_table(&input.table).map_err(to_napi_error)?;
    let output = profitability_core::report::analyze_profitability(&dataset, &input.selection)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn filter_options(input_json: String) -> NapiResult<String> {
    let input: FilterOptionsRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let dataset = Dataset::from_table(&input.table).map_err(to_napi_error)?;
    let options = profitability_core::report::available_filters(&dataset, input.year);
    serde_json::to_string(&options).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

#[napi]
pub fn allocate_hours(input_json: String) -> NapiResult<String> {
    let input: AllocateRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let rows = profitability_core::allocation::allocate_hours(&input.candidates, &input.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

#[napi]
pub fn plan_allocation(input_json: String) -> NapiResult<String> {
    let input: PlanRequest = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let dataset = Dataset::from_table(&input.table).map_err(to_napi_error)?;
    let period = input.period.unwrap_or_else(Period::current);
    let output = profitability_core::allocation::plan_allocation(&dataset, period, &input.config)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
