//! Example running every engine operation over a small batch
//!
//! This example shows how to:
//! - Initialize structured logging
//! - Release records as k-anonymous groups
//! - Add Laplace noise to a numeric column
//! - Mask single values and evaluate retention policies
//!
//! Run with:
//! ```bash
//! cargo run --example anonymize_batch
//! ```

use chrono::{Duration, Utc};
use cloak::anonymization::models::{DataType, MaskingPolicy, MaskingTechnique};
use cloak::anonymization::{AnonymizationEngine, AnonymizationTally, RetentionAction};
use cloak::config::{CloakConfig, LoggingConfig};
use cloak::domain::{NumericSeries, PersonalRecord, ScalarValue};
use cloak::logging::init_logging;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let logging = LoggingConfig {
        local_enabled: true,
        local_path: "/tmp/cloak_example".to_string(),
        local_rotation: "never".to_string(),
    };
    let _guard = init_logging("debug", &logging)?;

    let engine = AnonymizationEngine::from_config(&CloakConfig::default())?;
    let mut tally = AnonymizationTally::new();

    let rows = [
        ("p-1", 25, "10001", "F", 41_000.0, "asthma"),
        ("p-2", 27, "10002", "F", 52_000.0, "diabetes"),
        ("p-3", 29, "10003", "F", 48_500.0, "asthma"),
        ("p-4", 63, "94110", "M", 98_000.0, "hypertension"),
        ("p-5", 17, "94112", "M", 0.0, "none"),
    ];
    let mut records = Vec::with_capacity(rows.len());
    for (id, age, zip, gender, salary, condition) in rows {
        records.push(
            PersonalRecord::builder()
                .id(id)?
                .age(age)
                .zip_code(zip)
                .gender(gender)
                .salary(salary)
                .condition(condition)
                .build()?,
        );
    }

    let released =
        engine.anonymize_with_k_anonymity(&records, engine.config().default_k, &mut tally);
    for record in &released {
        println!(
            "{} {:>6} {} {} {:>9} k={} l={}",
            record.id_hash,
            record.age_range,
            record.zip_prefix,
            record.gender,
            record.salary_range,
            record.anonymity_level,
            record.diversity_level
        );
    }

    let salaries = NumericSeries::new(records.iter().map(|r| r.salary).collect());
    let noisy = engine.apply_differential_privacy(&salaries, 0.5, &mut tally)?;
    println!("\nNoisy salaries: {:?}", noisy.values);

    let token = engine.mask_by_data_type(
        &ScalarValue::from("555-0100"),
        &MaskingPolicy::new(DataType::PersonalIdentifier, MaskingTechnique::Tokenization),
    );
    println!("Token {} resolves to {:?}", token, engine.resolve_token(&token.to_string())?);

    let diagnosis = ScalarValue::from("asthma");
    engine.record_creation_time(&diagnosis, Utc::now() - Duration::days(10))?;
    match engine.apply_configured_retention(&diagnosis, DataType::SensitiveAttribute, None) {
        RetentionAction::Keep(value) => println!("Kept {value}"),
        RetentionAction::Anonymize { level, value } => println!("Anonymized at {level}: {value}"),
        RetentionAction::Delete => println!("Diagnosis past retention, deleted"),
    }

    println!("\n{}", engine.anonymization_stats(&tally).format_console());
    Ok(())
}
