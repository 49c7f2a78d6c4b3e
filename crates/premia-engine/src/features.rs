//! Feature engineering: turns an input record into the model's column layout.

use premia_core::{InputRecord, PredictionError, AGE, BMI, CATEGORICAL_COLUMNS};
use tracing::debug;

use crate::encoder::OneHotEncoder;
use crate::frame::{Cell, FeatureRow};

pub const SMOKER_YES: &str = "smoker_yes";
pub const SMOKER_AGE_INTERACTION: &str = "smoker_age_interaction";
pub const BMI_AGE_INTERACTION: &str = "bmi_age_interaction";

/// Columns removed before scoring: the raw categoricals plus the redundant
/// indicators the model was trained without.
pub const DROPPED_COLUMNS: [&str; 9] = [
    "sex",
    "smoker",
    "region",
    "sex_female",
    "region_southwest",
    "region_southeast",
    "region_northeast",
    "region_northwest",
    "smoker_no",
];

/// Runs the encode / concat / interact / drop stages on one record.
pub fn engineer(encoder: &OneHotEncoder, record: &InputRecord) -> Result<FeatureRow, PredictionError> {
    let mut row = FeatureRow::from_record(record);

    let categorical = CATEGORICAL_COLUMNS
        .iter()
        .map(|col| row.text(col))
        .collect::<Result<Vec<_>, _>>()?;
    let encoded = encoder.transform(&categorical)?;
    let indicators = FeatureRow::from_numbers(encoder.feature_names_out(), encoded)?;
    debug!(columns = ?indicators.column_names(), "Encoded categorical columns");

    row.concat(indicators)?;

    let age = row.number(AGE)?;
    let bmi = row.number(BMI)?;
    let smoker_yes = row.number(SMOKER_YES)?;
    row.push(SMOKER_AGE_INTERACTION, Cell::Number(smoker_yes * age))?;
    row.push(BMI_AGE_INTERACTION, Cell::Number(bmi * age))?;

    row.drop_columns(&DROPPED_COLUMNS)?;
    debug!(columns = ?row.column_names(), "Engineered feature row");

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::fitted;

    fn record(age: f64, bmi: f64, smoker: &str, region: &str) -> InputRecord {
        InputRecord {
            age,
            sex: "male".into(),
            bmi,
            children: 1,
            smoker: smoker.into(),
            region: region.into(),
        }
    }

    #[test]
    fn test_engineered_column_set() {
        let row = engineer(&fitted(), &record(40.0, 31.0, "no", "northeast")).unwrap();
        assert_eq!(
            row.column_names(),
            vec![
                "age",
                "bmi",
                "children",
                "sex_male",
                "smoker_yes",
                "smoker_age_interaction",
                "bmi_age_interaction",
            ]
        );
    }

    #[test]
    fn test_interaction_features() {
        let row = engineer(&fitted(), &record(30.0, 25.0, "yes", "southwest")).unwrap();
        assert_eq!(row.number(SMOKER_AGE_INTERACTION).unwrap(), 30.0);
        assert_eq!(row.number(BMI_AGE_INTERACTION).unwrap(), 750.0);
        assert_eq!(row.number("sex_male").unwrap(), 1.0);
    }

    #[test]
    fn test_non_smoker_interaction_is_zero() {
        let row = engineer(&fitted(), &record(30.0, 25.0, "no", "southwest")).unwrap();
        assert_eq!(row.number(SMOKER_AGE_INTERACTION).unwrap(), 0.0);
        assert_eq!(row.number(SMOKER_YES).unwrap(), 0.0);
    }

    #[test]
    fn test_unknown_region() {
        let err = engineer(&fitted(), &record(30.0, 25.0, "no", "mars")).unwrap_err();
        assert!(matches!(err, PredictionError::UnknownCategory { ref feature, .. } if feature == "region"));
    }

    #[test]
    fn test_encoder_without_dropped_category_is_schema_mismatch() {
        let mut encoder = fitted();
        encoder.categories[2].retain(|c| c != "northwest");
        let err = engineer(&encoder, &record(30.0, 25.0, "no", "southwest")).unwrap_err();
        assert!(matches!(err, PredictionError::SchemaMismatch(_)));
    }
}
