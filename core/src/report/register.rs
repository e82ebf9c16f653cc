use crate::error::CoreResult;
use crate::prescription::model::Prescription;

/// Prescription register as CSV, ordered by creation time then id, LF line endings.
pub fn render_prescription_register_csv(rows: &[Prescription]) -> CoreResult<String> {
    let mut rows: Vec<&Prescription> = rows.iter().collect();
    rows.sort_by(|a, b| (&a.created_at, &a.id).cmp(&(&b.created_at, &b.id)));

    let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);
    wtr.write_record([
        "prescription_id",
        "patient_name",
        "prescriber_name",
        "stage",
        "medications",
        "created_at",
        "dispensed_at",
    ])?;
    for rx in rows {
        let meds = rx
            .medications
            .iter()
            .map(|m| format!("{} x{}", m.label(), m.quantity))
            .collect::<Vec<_>>()
            .join("; ");
        wtr.write_record([
            rx.id.as_str(),
            rx.patient.name.as_str(),
            rx.prescriber.name.as_str(),
            rx.stage.as_str(),
            meds.as_str(),
            rx.created_at.as_str(),
            rx.dispensed_at.as_deref().unwrap_or(""),
        ])?;
    }
    let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8_lossy(&bytes).replace("\r\n", "\n"))
}
