//! Single-row, named-column table used to stage features.

use premia_core::{InputRecord, PredictionError, INPUT_COLUMNS};

/// One cell of the row.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Number(f64),
    Text(String),
}

/// An ordered set of named cells representing exactly one record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRow {
    columns: Vec<(String, Cell)>,
}

impl FeatureRow {
    /// Materialises a record in [`INPUT_COLUMNS`] order.
    pub fn from_record(record: &InputRecord) -> Self {
        let cells = [
            Cell::Number(record.age),
            Cell::Text(record.sex.clone()),
            Cell::Number(record.bmi),
            Cell::Number(f64::from(record.children)),
            Cell::Text(record.smoker.clone()),
            Cell::Text(record.region.clone()),
        ];

        Self {
            columns: INPUT_COLUMNS
                .iter()
                .map(|name| name.to_string())
                .zip(cells)
                .collect(),
        }
    }

    /// Builds a numeric row from parallel name/value lists.
    pub fn from_numbers(names: Vec<String>, values: Vec<f64>) -> Result<Self, PredictionError> {
        if names.len() != values.len() {
            return Err(PredictionError::SchemaMismatch(format!(
                "{} column names for {} values",
                names.len(),
                values.len()
            )));
        }

        let mut row = Self::default();
        for (name, value) in names.into_iter().zip(values) {
            row.push(name, Cell::Number(value))?;
        }
        Ok(row)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Cell> {
        self.columns.iter().find(|(n, _)| n == name).map(|(_, cell)| cell)
    }

    pub fn number(&self, name: &str) -> Result<f64, PredictionError> {
        match self.get(name) {
            Some(Cell::Number(n)) => Ok(*n),
            Some(Cell::Text(_)) => Err(PredictionError::SchemaMismatch(format!("column {name} is not numeric"))),
            None => Err(PredictionError::SchemaMismatch(format!("column {name} not found"))),
        }
    }

    pub fn text(&self, name: &str) -> Result<&str, PredictionError> {
        match self.get(name) {
            Some(Cell::Text(s)) => Ok(s.as_str()),
            Some(Cell::Number(_)) => Err(PredictionError::SchemaMismatch(format!("column {name} is not text"))),
            None => Err(PredictionError::SchemaMismatch(format!("column {name} not found"))),
        }
    }

    /// Appends a column; names are unique within a row.
    pub fn push(&mut self, name: impl Into<String>, cell: Cell) -> Result<(), PredictionError> {
        let name = name.into();
        if self.get(&name).is_some() {
            return Err(PredictionError::SchemaMismatch(format!("duplicate column {name}")));
        }
        self.columns.push((name, cell));
        Ok(())
    }

    /// Appends every column of `other` after the existing ones, by position.
    pub fn concat(&mut self, other: FeatureRow) -> Result<(), PredictionError> {
        for (name, cell) in other.columns {
            self.push(name, cell)?;
        }
        Ok(())
    }

    /// Removes the named columns. Every name must be present.
    pub fn drop_columns<S: AsRef<str>>(&mut self, names: &[S]) -> Result<(), PredictionError> {
        if let Some(missing) = names.iter().map(|n| n.as_ref()).find(|n| self.get(n).is_none()) {
            return Err(PredictionError::SchemaMismatch(format!("cannot drop missing column {missing}")));
        }
        self.columns
            .retain(|(name, _)| !names.iter().any(|n| n.as_ref() == name));
        Ok(())
    }

    /// Returns the numeric values if the row's columns are exactly `expected`, in order.
    pub fn into_vector(self, expected: &[String]) -> Result<Vec<f64>, PredictionError> {
        let names = self.column_names();
        if names != expected {
            return Err(PredictionError::SchemaMismatch(format!(
                "model expects {expected:?}, pipeline produced {names:?}"
            )));
        }

        self.columns
            .into_iter()
            .map(|(name, cell)| match cell {
                Cell::Number(n) => Ok(n),
                Cell::Text(_) => Err(PredictionError::SchemaMismatch(format!("column {name} is not numeric"))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> InputRecord {
        InputRecord {
            age: 30.0,
            sex: "male".into(),
            bmi: 25.0,
            children: 2,
            smoker: "yes".into(),
            region: "northwest".into(),
        }
    }

    #[test]
    fn test_from_record_column_order() {
        let row = FeatureRow::from_record(&record());
        assert_eq!(row.column_names(), vec!["age", "sex", "bmi", "children", "smoker", "region"]);
        assert_eq!(row.number("children").unwrap(), 2.0);
        assert_eq!(row.text("region").unwrap(), "northwest");
    }

    #[test]
    fn test_concat_appends_positionally() {
        let mut row = FeatureRow::from_record(&record());
        let extra = FeatureRow::from_numbers(vec!["a".into(), "b".into()], vec![1.0, 0.0]).unwrap();
        row.concat(extra).unwrap();
        assert_eq!(row.len(), 8);
        assert_eq!(&row.column_names()[6..], &["a", "b"]);
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let mut row = FeatureRow::from_record(&record());
        assert!(row.push("age", Cell::Number(1.0)).is_err());
    }

    #[test]
    fn test_drop_requires_existing_columns() {
        let mut row = FeatureRow::from_record(&record());
        assert!(row.drop_columns(&["sex", "nope"]).is_err());
        assert_eq!(row.len(), 6);

        row.drop_columns(&["sex", "smoker", "region"]).unwrap();
        assert_eq!(row.column_names(), vec!["age", "bmi", "children"]);
    }

    #[test]
    fn test_into_vector_checks_order() {
        let row = FeatureRow::from_numbers(vec!["x".into(), "y".into()], vec![1.0, 2.0]).unwrap();
        assert!(row.clone().into_vector(&["y".into(), "x".into()]).is_err());
        assert_eq!(row.into_vector(&["x".into(), "y".into()]).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_text_column_not_numeric() {
        let row = FeatureRow::from_record(&record());
        assert!(row.number("sex").is_err());
        assert!(row.text("age").is_err());
    }
}
