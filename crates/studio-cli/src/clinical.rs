//! Clinical extraction schema, sample notes and the batch run over them

use crate::output::Formatter;
use anyhow::{Context, Result};
use std::path::Path;
use studio_domain::traits::LlmProvider;
use studio_domain::{ExampleData, Extraction};
use studio_extractor::{ExtractionRequest, Extractor};
use studio_report::io::ensure_dir;
use studio_report::{write_visualization, AggregateResult, Aggregator};
use tracing::{info, warn};

/// Model used by the clinical script
pub const CLINICAL_MODEL: &str = "gemini-2.5-flash";

/// Passes run over each note
pub const CLINICAL_PASSES: usize = 2;

/// Combined output file name
pub const COMBINED_FILE: &str = "medical_extractions.json";

/// Environment variable holding the clinical script's API key
pub const API_KEY_VAR: &str = "LANGEXTRACT_API_KEY";

/// Classes extracted from clinical notes
pub const CLINICAL_CLASSES: &[&str] = &[
    "medication",
    "adverse_reaction",
    "diagnosis",
    "vital_sign",
    "lab_result",
    "procedure",
];

/// Prompt description for clinical extraction
pub const CLINICAL_PROMPT: &str = r#"Extract all medical entities from clinical text in order of appearance.
Extract the following entity types:
- medication: Drug names with dosage, route, and frequency as attributes
- adverse_reaction: Side effects or adverse drug reactions with severity and related medication
- diagnosis: Medical conditions or diagnoses with status (active, resolved, suspected)
- vital_sign: Vital sign measurements with value and status (normal, abnormal, critical)
- lab_result: Laboratory test results with value, reference range, and status
- procedure: Medical procedures or interventions performed
"#;

/// A clinical note to extract from
#[derive(Debug, Clone, Copy)]
pub struct ClinicalNote {
    /// Identifier used for output file names
    pub id: &'static str,
    /// Human-readable title
    pub title: &'static str,
    /// Note text
    pub text: &'static str,
}

/// Sample notes processed by the clinical script
pub const CLINICAL_NOTES: &[ClinicalNote] = &[
    ClinicalNote {
        id: "note_001",
        title: "Emergency Department Visit - Chest Pain",
        text: "A 58-year-old male presented to the emergency department with acute \
            chest pain radiating to the left arm for the past 2 hours. History of \
            hypertension and hyperlipidemia. Current medications include Lisinopril \
            10mg orally once daily and Atorvastatin 40mg orally at bedtime. Vital \
            signs: heart rate 98 bpm, blood pressure 168/95 mmHg, SpO2 96% on room \
            air, temperature 36.8°C. Troponin I level was 0.08 ng/mL, above the \
            normal threshold of 0.04 ng/mL. ECG showed ST-segment elevation in leads \
            II, III, and aVF. Patient was started on Aspirin 325mg orally stat, \
            Heparin 5000 units IV bolus, and Nitroglycerin 0.4mg sublingual PRN for \
            chest pain. Emergent cardiac catheterization was performed revealing 90% \
            stenosis of the right coronary artery. Percutaneous coronary \
            intervention with drug-eluting stent placement was successfully \
            completed.",
    },
    ClinicalNote {
        id: "note_002",
        title: "Pediatric Follow-up - Asthma Management",
        text: "An 8-year-old female presented for routine asthma follow-up. Mother \
            reports increased nighttime coughing over the past two weeks and use of \
            rescue inhaler 4 times per week. Currently on Fluticasone 44mcg inhaled \
            twice daily and Albuterol 90mcg inhaled PRN. Peak flow was 280 L/min, \
            which is 75% of her predicted value and below the green zone threshold \
            of 80%. Lungs showed mild bilateral wheezing on auscultation. SpO2 was \
            97% on room air, within normal limits. Assessment: poorly controlled \
            persistent asthma. Plan: Step up Fluticasone to 110mcg inhaled twice \
            daily, continue Albuterol PRN, and add Montelukast 5mg orally at \
            bedtime. Follow-up in 4 weeks. Patient's mother reported mild oral \
            thrush possibly related to Fluticasone use.",
    },
    ClinicalNote {
        id: "note_003",
        title: "ICU Progress Note - Sepsis",
        text: "Day 3 in ICU for severe sepsis secondary to urinary tract infection with \
            E. coli bacteremia. Patient is a 72-year-old female with history of type \
            2 diabetes and chronic kidney disease stage 3. Current antibiotics: \
            Meropenem 1g IV every 8 hours, adjusted for renal function. Vasopressor \
            support with Norepinephrine 0.15 mcg/kg/min IV continuous infusion. \
            Vital signs: temperature 38.4°C, heart rate 112 bpm, blood pressure \
            92/58 mmHg on vasopressor support, respiratory rate 22 breaths/min, SpO2 \
            94% on 4L nasal cannula. Labs: WBC 18,500/µL above reference range \
            4,500-11,000/µL, lactate 3.2 mmol/L above normal of less than 2.0 \
            mmol/L, creatinine 2.8 mg/dL above baseline of 1.5 mg/dL, procalcitonin \
            12.5 ng/mL above threshold of 0.5 ng/mL. Blood cultures from day 1 \
            growing E. coli sensitive to Meropenem. Insulin glargine 20 units \
            subcutaneous at bedtime for diabetes management. Patient developed mild \
            thrombocytopenia with platelet count of 98,000/µL below reference range \
            150,000-400,000/µL.",
    },
];

/// Few-shot examples covering every clinical class
pub fn clinical_examples() -> Vec<ExampleData> {
    vec![
        ExampleData::new(
            "Patient was prescribed Metformin 500mg orally twice daily for type 2 \
            diabetes. She reported mild nausea after the first dose. Blood pressure \
            was 142/90 mmHg. HbA1c level was 8.2%, above the normal range of \
            4.0-5.6%.",
            vec![
                Extraction::new("medication", "Metformin 500mg").with_attributes([
                    ("route", "oral"),
                    ("frequency", "twice daily"),
                    ("indication", "type 2 diabetes"),
                ]),
                Extraction::new("diagnosis", "type 2 diabetes").with_attributes([
                    ("status", "active"),
                ]),
                Extraction::new("adverse_reaction", "mild nausea").with_attributes([
                    ("severity", "mild"),
                    ("timing", "after the first dose"),
                    ("related_medication", "Metformin"),
                ]),
                Extraction::new("vital_sign", "142/90 mmHg").with_attributes([
                    ("measurement", "blood pressure"),
                    ("status", "abnormal"),
                ]),
                Extraction::new("lab_result", "8.2%").with_attributes([
                    ("test", "HbA1c"),
                    ("reference_range", "4.0-5.6%"),
                    ("status", "abnormal"),
                ]),
            ],
        ),
        ExampleData::new(
            "Post-operative day 1 following laparoscopic cholecystectomy. Patient \
            received Cefazolin 1g IV every 8 hours for infection prophylaxis and \
            Morphine 2mg IV PRN for pain management. Temperature was 37.2°C, within \
            normal limits. WBC count was 11,200/µL, slightly elevated above the \
            reference range of 4,500-11,000/µL.",
            vec![
                Extraction::new("procedure", "laparoscopic cholecystectomy").with_attributes([
                    ("timing", "post-operative day 1"),
                ]),
                Extraction::new("medication", "Cefazolin 1g").with_attributes([
                    ("route", "IV"),
                    ("frequency", "every 8 hours"),
                    ("indication", "infection prophylaxis"),
                ]),
                Extraction::new("medication", "Morphine 2mg").with_attributes([
                    ("route", "IV"),
                    ("frequency", "PRN"),
                    ("indication", "pain management"),
                ]),
                Extraction::new("vital_sign", "37.2°C").with_attributes([
                    ("measurement", "temperature"),
                    ("status", "normal"),
                ]),
                Extraction::new("lab_result", "11,200/µL").with_attributes([
                    ("test", "WBC count"),
                    ("reference_range", "4,500-11,000/µL"),
                    ("status", "abnormal"),
                ]),
            ],
        ),
    ]
}

/// Clinical classes as owned strings
pub fn clinical_classes() -> Vec<String> {
    CLINICAL_CLASSES.iter().map(|c| c.to_string()).collect()
}

/// Accept a configured API key, rejecting a missing or blank one.
pub fn require_api_key(value: Option<String>) -> Result<String> {
    value
        .filter(|key| !key.trim().is_empty())
        .with_context(|| format!("{} is not set; export it or add it to a .env file", API_KEY_VAR))
}

/// Extract every clinical note and write the run's files into `output_dir`.
///
/// Each note gets `<id>_extractions.jsonl` and, unless rendering fails,
/// `<id>_visualization.html`; the combined summary goes to [`COMBINED_FILE`].
/// The first failed note aborts the run.
pub async fn run_clinical<L>(
    extractor: &Extractor<L>,
    output_dir: &Path,
    formatter: &Formatter,
) -> Result<AggregateResult>
where
    L: LlmProvider,
{
    ensure_dir(output_dir).context("Failed to create output directory")?;

    let mut aggregator = Aggregator::new();
    for note in CLINICAL_NOTES {
        println!();
        println!("{}", formatter.info(&format!("{}: {}", note.id, note.title)));

        let request = ExtractionRequest::new(note.id, note.text, CLINICAL_PROMPT, clinical_examples())
            .with_classes(clinical_classes());
        let result = extractor
            .extract(request)
            .await
            .with_context(|| format!("Extraction failed for {}", note.id))?;

        for extraction in &result.document.extractions {
            println!("{}", formatter.entity_line(extraction));
        }

        let html_path = output_dir.join(format!("{}_visualization.html", note.id));
        if let Err(e) = write_visualization(&html_path, &result.document) {
            warn!(note = note.id, error = %e, "Skipping visualization");
        }

        let summary = aggregator.add(result.document, note.title, CLINICAL_MODEL)?;
        info!(note = note.id, entities = summary.total_entities, "Note processed");
    }

    let result = aggregator.finish();
    result
        .write(output_dir, COMBINED_FILE)
        .context("Failed to write extraction results")?;
    Ok(result)
}
