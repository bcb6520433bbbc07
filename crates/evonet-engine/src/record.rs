use serde::{Deserialize, Serialize};

use crate::{Matrix, MutationParams, MutationParamsError, NeuralNetwork, Topology, TopologyError};

/// Plain, serializable form of a [`NeuralNetwork`].
///
/// Field names follow the persisted JSON layout (`inputSize`, `weightsIH`,
/// `biasH`, ...). Bias vectors are stored as one-element rows.
///
/// A record is untrusted input: converting it into a network with
/// [`NeuralNetwork::deserialize`] checks every dimension and value first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkRecord {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    #[serde(rename = "weightsIH")]
    pub weights_ih: Vec<Vec<f64>>,
    #[serde(rename = "weightsHO")]
    pub weights_ho: Vec<Vec<f64>>,
    pub bias_h: Vec<Vec<f64>>,
    pub bias_o: Vec<Vec<f64>>,
    pub mutation_rate: f64,
    pub mutation_strength: f64,
}

#[derive(Debug, Clone, PartialEq, derive_more::Display, derive_more::Error)]
pub enum RecordError {
    #[display("invalid topology: {_0}")]
    Topology(TopologyError),
    #[display("invalid mutation parameters: {_0}")]
    Mutation(MutationParamsError),
    #[display("`{field}` has {actual} rows, expected {expected}")]
    RowCount {
        field: &'static str,
        expected: usize,
        actual: usize,
    },
    #[display("`{field}` row {row} has {actual} columns, expected {expected}")]
    ColumnCount {
        field: &'static str,
        row: usize,
        expected: usize,
        actual: usize,
    },
    #[display("`{field}` has a non-finite value at [{row}][{col}]")]
    NonFinite {
        field: &'static str,
        row: usize,
        col: usize,
    },
}

fn checked_matrix(
    field: &'static str,
    rows: &[Vec<f64>],
    expected_rows: usize,
    expected_cols: usize,
) -> Result<Matrix, RecordError> {
    if rows.len() != expected_rows {
        return Err(RecordError::RowCount {
            field,
            expected: expected_rows,
            actual: rows.len(),
        });
    }
    for (row, values) in rows.iter().enumerate() {
        if values.len() != expected_cols {
            return Err(RecordError::ColumnCount {
                field,
                row,
                expected: expected_cols,
                actual: values.len(),
            });
        }
        if let Some(col) = values.iter().position(|v| !v.is_finite()) {
            return Err(RecordError::NonFinite { field, row, col });
        }
    }
    Ok(Matrix::from_fn(expected_rows, expected_cols, |r, c| {
        rows[r][c]
    }))
}

impl TryFrom<NetworkRecord> for NeuralNetwork {
    type Error = RecordError;

    fn try_from(record: NetworkRecord) -> Result<Self, Self::Error> {
        let topology = Topology::new(record.input_size, record.hidden_size, record.output_size)
            .map_err(RecordError::Topology)?;
        let mutation = MutationParams::new(record.mutation_rate, record.mutation_strength)
            .map_err(RecordError::Mutation)?;
        let (i, h, o) = (
            topology.input_size(),
            topology.hidden_size(),
            topology.output_size(),
        );
        Ok(Self {
            topology,
            mutation,
            weights_ih: checked_matrix("weightsIH", &record.weights_ih, h, i)?,
            weights_ho: checked_matrix("weightsHO", &record.weights_ho, o, h)?,
            bias_h: checked_matrix("biasH", &record.bias_h, h, 1)?,
            bias_o: checked_matrix("biasO", &record.bias_o, o, 1)?,
        })
    }
}

impl From<&NeuralNetwork> for NetworkRecord {
    fn from(network: &NeuralNetwork) -> Self {
        Self {
            input_size: network.topology.input_size(),
            hidden_size: network.topology.hidden_size(),
            output_size: network.topology.output_size(),
            weights_ih: network.weights_ih.to_rows(),
            weights_ho: network.weights_ho.to_rows(),
            bias_h: network.bias_h.to_rows(),
            bias_o: network.bias_o.to_rows(),
            mutation_rate: network.mutation.rate(),
            mutation_strength: network.mutation.strength(),
        }
    }
}

impl From<NeuralNetwork> for NetworkRecord {
    fn from(network: NeuralNetwork) -> Self {
        Self::from(&network)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng as _;
    use rand_pcg::Pcg64;

    use super::*;

    fn sample_network() -> NeuralNetwork {
        let mut rng = Pcg64::seed_from_u64(11);
        NeuralNetwork::new_random(
            Topology::new(3, 4, 2).unwrap(),
            MutationParams::new(0.25, 0.5).unwrap(),
            &mut rng,
        )
    }

    #[test]
    fn test_record_layout() {
        let record = sample_network().serialize();
        assert_eq!(record.weights_ih.len(), 4);
        assert!(record.weights_ih.iter().all(|row| row.len() == 3));
        assert_eq!(record.weights_ho.len(), 2);
        assert!(record.weights_ho.iter().all(|row| row.len() == 4));
        assert_eq!(record.bias_h.len(), 4);
        assert!(record.bias_h.iter().all(|row| row.len() == 1));
        assert_eq!(record.bias_o.len(), 2);

        let json = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "inputSize",
            "hiddenSize",
            "outputSize",
            "weightsIH",
            "weightsHO",
            "biasH",
            "biasO",
            "mutationRate",
            "mutationStrength",
        ] {
            assert!(keys.contains(&key), "missing key {key}");
        }
        assert_eq!(keys.len(), 9);
    }

    #[test]
    fn test_roundtrip_is_exact() {
        let net = sample_network();
        let restored = NeuralNetwork::deserialize(net.serialize()).unwrap();
        assert_eq!(restored, net);

        let json = serde_json::to_string(&net.serialize()).unwrap();
        let record: NetworkRecord = serde_json::from_str(&json).unwrap();
        let from_json = NeuralNetwork::deserialize(record).unwrap();
        for (a, b) in from_json.parameters().zip(net.parameters()) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
        let input = [0.1, -0.7, 0.33];
        assert_eq!(from_json.predict(&input), net.predict(&input));
    }

    #[test]
    fn test_rejects_zero_size() {
        let mut record = sample_network().serialize();
        record.hidden_size = 0;
        assert!(matches!(
            NeuralNetwork::deserialize(record),
            Err(RecordError::Topology(_))
        ));
    }

    #[test]
    fn test_rejects_wrong_row_count() {
        let mut record = sample_network().serialize();
        record.weights_ho.pop();
        assert_eq!(
            NeuralNetwork::deserialize(record),
            Err(RecordError::RowCount {
                field: "weightsHO",
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn test_rejects_wrong_column_count() {
        let mut record = sample_network().serialize();
        record.weights_ih[2].push(0.0);
        assert_eq!(
            NeuralNetwork::deserialize(record),
            Err(RecordError::ColumnCount {
                field: "weightsIH",
                row: 2,
                expected: 3,
                actual: 4
            })
        );

        let mut record = sample_network().serialize();
        record.bias_o[1] = vec![];
        assert!(matches!(
            NeuralNetwork::deserialize(record),
            Err(RecordError::ColumnCount { field: "biasO", .. })
        ));
    }

    #[test]
    fn test_rejects_size_field_disagreeing_with_arrays() {
        let mut record = sample_network().serialize();
        record.input_size = 5;
        assert!(matches!(
            NeuralNetwork::deserialize(record),
            Err(RecordError::ColumnCount {
                field: "weightsIH",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut record = sample_network().serialize();
        record.bias_h[3][0] = f64::NAN;
        assert_eq!(
            NeuralNetwork::deserialize(record),
            Err(RecordError::NonFinite {
                field: "biasH",
                row: 3,
                col: 0
            })
        );
    }

    #[test]
    fn test_rejects_invalid_mutation_params() {
        let mut record = sample_network().serialize();
        record.mutation_rate = 2.0;
        assert!(matches!(
            NeuralNetwork::deserialize(record),
            Err(RecordError::Mutation(_))
        ));
    }

    #[test]
    fn test_missing_field_fails_to_parse() {
        let mut json = serde_json::to_value(sample_network().serialize()).unwrap();
        json.as_object_mut().unwrap().remove("biasO");
        assert!(serde_json::from_value::<NetworkRecord>(json.clone()).is_err());
        assert!(serde_json::from_value::<NeuralNetwork>(json).is_err());
    }

    #[test]
    fn test_network_serde_validates() {
        let mut record = sample_network().serialize();
        record.weights_ih.clear();
        let json = serde_json::to_string(&record).unwrap();
        let err = serde_json::from_str::<NeuralNetwork>(&json).unwrap_err();
        assert!(err.to_string().contains("weightsIH"));
    }
}
