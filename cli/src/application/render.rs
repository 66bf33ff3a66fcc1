use std::fmt::Write as _;

use plantro_core::domain::diagnosis::{Diagnosis, PipelineFailure, RecommendedProduct};
use serde_json::json;

pub fn diagnosis_text(diagnosis: &Diagnosis) -> Result<String, std::fmt::Error> {
    let mut out = String::new();

    if diagnosis.is_unknown_subject {
        writeln!(
            out,
            "Not a plant detected. Please upload a clear photo of a plant leaf."
        )?;
        return Ok(out);
    }

    writeln!(out, "Plant:       {}", diagnosis.plant_name)?;
    if diagnosis.is_healthy() {
        writeln!(out, "Status:      Healthy")?;
    } else {
        writeln!(out, "Issue:       {}", diagnosis.issue_name)?;
    }
    writeln!(
        out,
        "Confidence:  {:.0}%",
        diagnosis.confidence * 100.0
    )?;
    if let Some(recovery) = &diagnosis.recovery_estimate {
        writeln!(out, "Recovery:    {recovery}")?;
    }
    if let Some(reasoning) = &diagnosis.reasoning {
        writeln!(out, "\n{reasoning}")?;
    }

    if !diagnosis.symptoms.is_empty() {
        writeln!(out, "\nSymptoms")?;
        for symptom in &diagnosis.symptoms {
            writeln!(out, "  - {symptom}")?;
        }
    }

    if !diagnosis.treatment_steps.is_empty() {
        writeln!(out, "\nTreatment")?;
        for (step, text) in diagnosis.treatment_steps.iter().enumerate() {
            writeln!(out, "  {}. {text}", step + 1)?;
        }
    }

    writeln!(out, "\nRecommended products")?;
    for product in &diagnosis.recommended_products {
        write_product(&mut out, product)?;
    }

    Ok(out)
}

fn write_product(out: &mut String, product: &RecommendedProduct) -> std::fmt::Result {
    let price = product
        .price_minor_units
        .map(|price| format!("₹{price}"))
        .unwrap_or_else(|| "price unavailable".to_string());
    match &product.store {
        Some(store) => writeln!(out, "  - {} ({price}, {store})", product.name)?,
        None => writeln!(out, "  - {} ({price})", product.name)?,
    }
    writeln!(out, "    {}", product.store_link)?;
    if let Some(rationale) = &product.rationale {
        writeln!(out, "    {rationale}")?;
    }
    Ok(())
}

pub fn failure_text(failure: &PipelineFailure) -> String {
    format!("error: {failure}\nhint: {}", failure.remediation())
}

pub fn failure_json(failure: &PipelineFailure) -> serde_json::Value {
    json!({
        "error": {
            "kind": failure.kind(),
            "stage": failure.stage,
            "message": failure.error.to_string(),
            "remediation": failure.remediation(),
        }
    })
}
