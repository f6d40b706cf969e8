use wasm_bindgen::prelude::*;

use crate::report::{ReportFormat, ReportOptions};

#[wasm_bindgen]
pub fn generate_report(lab_json: &str, format: &str) -> Result<Vec<u8>, JsValue> {
    let format: ReportFormat = format
        .parse()
        .map_err(|e: crate::LabError| JsValue::from_str(&e.to_string()))?;
    crate::render_report_json(lab_json, format, &ReportOptions::today())
        .map(|report| report.bytes)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}
