//! Parquet output of reduced pair records.
//!
//! # Schema: `tnpskim_pairs_v1`
//!
//! | Column               | Arrow Type | Description                         |
//! |----------------------|------------|-------------------------------------|
//! | `event`              | `UInt64`   | Source-event identity               |
//! | `tag_pt` ... `tag_mass`     | `Float64` | Tag kinematics               |
//! | `tag_charge`         | `Int32`    | Tag charge                          |
//! | `probe_pt` ... `probe_mass` | `Float64` | Probe kinematics             |
//! | `probe_charge`       | `Int32`    | Probe charge                        |
//! | `pair_pt` ... `pair_mass`   | `Float64` | Composed pair kinematics     |
//! | `mcTrue`             | `Boolean`  | Monte-Carlo truth label             |
//! | `passing_<wp>`       | `Boolean`  | One per configured working point    |
//! | `weight`             | `Float64`  | Present when a weight is configured |

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, BooleanArray, Float64Array, Int32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use tnp_core::{Error, Kinematics, PairRecord, Result};

/// Schema version string embedded in Parquet key-value metadata.
pub const PAIRS_SCHEMA_V1: &str = "tnpskim_pairs_v1";

/// Parquet metadata key for the schema version.
pub const META_KEY_SCHEMA_VERSION: &str = "tnpskim.schema_version";

fn kinematic_fields(prefix: &str) -> [Field; 4] {
    [
        Field::new(format!("{prefix}_pt"), DataType::Float64, false),
        Field::new(format!("{prefix}_eta"), DataType::Float64, false),
        Field::new(format!("{prefix}_phi"), DataType::Float64, false),
        Field::new(format!("{prefix}_mass"), DataType::Float64, false),
    ]
}

fn kinematic_arrays(
    records: &[PairRecord],
    get: impl Fn(&PairRecord) -> Kinematics,
) -> [Arc<dyn Array>; 4] {
    [
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| get(r).pt))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| get(r).eta))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| get(r).phi))),
        Arc::new(Float64Array::from_iter_values(records.iter().map(|r| get(r).mass))),
    ]
}

/// Build an Arrow [`RecordBatch`] from pair records.
///
/// Working-point columns follow the first record's configuration order;
/// all records must carry the same working points.
pub fn records_to_batch(records: &[PairRecord]) -> Result<RecordBatch> {
    let wp_names: Vec<String> = records
        .first()
        .map(|r| r.working_points.iter().map(|(n, _)| n.clone()).collect())
        .unwrap_or_default();
    let has_weight = records.first().is_some_and(|r| r.weight.is_some());

    for (i, rec) in records.iter().enumerate() {
        let names: Vec<&String> = rec.working_points.iter().map(|(n, _)| n).collect();
        if names.len() != wp_names.len() || names.iter().zip(&wp_names).any(|(a, b)| *a != b) {
            return Err(Error::Validation(format!(
                "record {i} disagrees on working points (expected {wp_names:?})"
            )));
        }
        if rec.weight.is_some() != has_weight {
            return Err(Error::Validation(format!(
                "record {i} disagrees on weight presence"
            )));
        }
    }

    let mut fields = vec![Field::new("event", DataType::UInt64, false)];
    fields.extend(kinematic_fields("tag"));
    fields.push(Field::new("tag_charge", DataType::Int32, false));
    fields.extend(kinematic_fields("probe"));
    fields.push(Field::new("probe_charge", DataType::Int32, false));
    fields.extend(kinematic_fields("pair"));
    fields.push(Field::new("mcTrue", DataType::Boolean, false));
    for name in &wp_names {
        fields.push(Field::new(format!("passing_{name}"), DataType::Boolean, false));
    }
    if has_weight {
        fields.push(Field::new("weight", DataType::Float64, false));
    }

    let metadata =
        HashMap::from([(META_KEY_SCHEMA_VERSION.to_string(), PAIRS_SCHEMA_V1.to_string())]);
    let schema = Arc::new(Schema::new(fields).with_metadata(metadata));

    let mut arrays: Vec<Arc<dyn Array>> =
        vec![Arc::new(UInt64Array::from_iter_values(records.iter().map(|r| r.event)))];
    arrays.extend(kinematic_arrays(records, |r| r.tag));
    arrays.push(Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.tag_charge))));
    arrays.extend(kinematic_arrays(records, |r| r.probe));
    arrays.push(Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.probe_charge))));
    arrays.extend(kinematic_arrays(records, |r| r.pair));
    arrays.push(Arc::new(BooleanArray::from_iter(
        records.iter().map(|r| Some(r.mc_truth)),
    )));
    for w in 0..wp_names.len() {
        arrays.push(Arc::new(BooleanArray::from_iter(
            records.iter().map(|r| Some(r.working_points[w].1)),
        )));
    }
    if has_weight {
        arrays.push(Arc::new(Float64Array::from_iter_values(
            records.iter().map(|r| r.weight.unwrap_or(1.0)),
        )));
    }

    RecordBatch::try_new(schema, arrays)
        .map_err(|e| Error::Validation(format!("failed to build RecordBatch: {e}")))
}

/// Write pair records to a Parquet file.
pub fn write_parquet(records: &[PairRecord], path: &Path) -> Result<()> {
    let batch = records_to_batch(records)?;
    let file = std::fs::File::create(path)
        .map_err(|e| Error::Validation(format!("failed to create {}: {e}", path.display())))?;

    let props = parquet::file::properties::WriterProperties::builder()
        .set_compression(parquet::basic::Compression::SNAPPY)
        .build();
    let mut writer = parquet::arrow::ArrowWriter::try_new(file, batch.schema(), Some(props))
        .map_err(|e| Error::Validation(format!("failed to create Parquet writer: {e}")))?;
    writer.write(&batch).map_err(|e| Error::Validation(format!("failed to write Parquet: {e}")))?;
    writer
        .close()
        .map_err(|e| Error::Validation(format!("failed to close Parquet writer: {e}")))?;
    Ok(())
}
