//! Dataset bundle persistence.
//!
//! A bundle is a ZIP file with stored (uncompressed) entries: a
//! `manifest.json` describing every dataset, and one Parquet file per
//! dataset at `<dataset name>.parquet`. Parquet pages carry the configured
//! compression. Two-dimensional arrays are flattened row-major behind
//! `sample` and `block` index columns.

use super::{AttributeValue, Attributes, Container, Field, FieldData, FieldType, RecordArray};
use crate::config::{CompressionAlgorithm, ConverterConfig};
use crate::constants::{
    BLOCK_INDEX_COLUMN, BUNDLE_FORMAT_VERSION, BUNDLE_MANIFEST_NAME, SAMPLE_INDEX_COLUMN,
};
use crate::error::{ConversionError, Result};

use polars::prelude::{
    DataFrame, IntoColumn, NamedFrom, ParquetReader, ParquetWriter, SerReader, Series,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

#[derive(Debug, Serialize, Deserialize)]
struct BundleManifest {
    format_version: u32,
    compression: CompressionAlgorithm,
    datasets: Vec<DatasetManifest>,
}

#[derive(Debug, Serialize, Deserialize)]
struct DatasetManifest {
    name: String,
    member: String,
    shape: Vec<usize>,
    fields: Vec<FieldManifest>,
    attributes: Vec<AttributeManifest>,
}

#[derive(Debug, Serialize, Deserialize)]
struct FieldManifest {
    name: String,
    dtype: FieldType,
}

#[derive(Debug, Serialize, Deserialize)]
struct AttributeManifest {
    key: String,
    value: AttributeValue,
}

fn member_name(dataset: &str) -> String {
    format!("{}.parquet", dataset)
}

/// Write a container to `path`, replacing it only once the bundle is complete
pub fn save(container: &Container, path: &Path, config: &ConverterConfig) -> Result<u64> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut staging = NamedTempFile::new_in(directory)?;
    write_bundle(container, staging.as_file_mut(), config.compression)?;
    staging.as_file_mut().flush()?;

    let file = staging.persist(path).map_err(|e| ConversionError::Io(e.error))?;
    let bytes = file.metadata()?.len();

    debug!(
        "Wrote bundle {} with {} datasets ({} bytes)",
        path.display(),
        container.len(),
        bytes
    );
    Ok(bytes)
}

/// Serialize a container as a bundle into any seekable writer
pub fn write_bundle<W: Write + Seek>(
    container: &Container,
    writer: W,
    compression: CompressionAlgorithm,
) -> Result<()> {
    let mut zip = ZipWriter::new(writer);
    let stored = || SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    let mut manifest = BundleManifest {
        format_version: BUNDLE_FORMAT_VERSION,
        compression,
        datasets: Vec::with_capacity(container.len()),
    };

    for dataset in container.datasets() {
        let member = member_name(&dataset.name);
        let mut frame = to_dataframe(&dataset.data)?;

        let mut buffer = Vec::new();
        ParquetWriter::new(&mut buffer)
            .with_compression(compression.to_polars_compression())
            .finish(&mut frame)?;

        zip.start_file(member.as_str(), stored())?;
        zip.write_all(&buffer)?;

        manifest.datasets.push(DatasetManifest {
            name: dataset.name.clone(),
            member,
            shape: dataset.data.shape().to_vec(),
            fields: dataset
                .data
                .fields()
                .iter()
                .map(|f| FieldManifest {
                    name: f.name.clone(),
                    dtype: f.data.field_type(),
                })
                .collect(),
            attributes: dataset
                .attributes
                .iter()
                .map(|(key, value)| AttributeManifest {
                    key: key.to_string(),
                    value: value.clone(),
                })
                .collect(),
        });
    }

    zip.start_file(BUNDLE_MANIFEST_NAME, stored())?;
    serde_json::to_writer_pretty(&mut zip, &manifest)?;
    zip.finish()?;
    Ok(())
}

/// Load a bundle written by [`save`]
pub fn open(path: &Path) -> Result<Container> {
    let file = File::open(path)?;
    read_bundle(BufReader::new(file))
}

/// Deserialize a bundle from any seekable reader
pub fn read_bundle<R: Read + Seek>(reader: R) -> Result<Container> {
    let mut archive = ZipArchive::new(reader)?;

    let manifest: BundleManifest = {
        let entry = archive.by_name(BUNDLE_MANIFEST_NAME)?;
        serde_json::from_reader(entry)?
    };

    if manifest.format_version != BUNDLE_FORMAT_VERSION {
        return Err(ConversionError::invalid_format(
            BUNDLE_MANIFEST_NAME,
            format!(
                "unsupported bundle version {} (expected {})",
                manifest.format_version, BUNDLE_FORMAT_VERSION
            ),
        ));
    }

    let mut container = Container::new();
    for entry in manifest.datasets {
        let mut bytes = Vec::new();
        archive.by_name(&entry.member)?.read_to_end(&mut bytes)?;
        let frame = ParquetReader::new(Cursor::new(bytes)).finish()?;

        let fields = entry
            .fields
            .iter()
            .map(|f| read_field(&frame, &f.name, f.dtype))
            .collect::<Result<Vec<_>>>()?;

        let data = RecordArray::from_fields(entry.shape, fields)?;
        let dataset = container.create_dataset(&entry.name, data)?;
        dataset.attributes = entry
            .attributes
            .into_iter()
            .fold(Attributes::default(), |mut attrs, a| {
                attrs.set(a.key, a.value);
                attrs
            });
    }

    Ok(container)
}

fn to_dataframe(data: &RecordArray) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(data.fields().len() + 2);

    if let &[samples, blocks] = data.shape() {
        let sample_index: Vec<u32> = (0..samples)
            .flat_map(|s| std::iter::repeat_n(s as u32, blocks))
            .collect();
        let block_index: Vec<u32> = (0..samples)
            .flat_map(|_| 0..blocks as u32)
            .collect();
        columns.push(Series::new(SAMPLE_INDEX_COLUMN.into(), sample_index).into_column());
        columns.push(Series::new(BLOCK_INDEX_COLUMN.into(), block_index).into_column());
    } else if data.shape().len() > 2 {
        return Err(ConversionError::invalid_format(
            "bundle",
            format!("cannot flatten array of shape {:?}", data.shape()),
        ));
    }

    for field in data.fields() {
        let series = match &field.data {
            FieldData::Float32(values) => Series::new(field.name.as_str().into(), values),
            FieldData::Int8(values) => Series::new(field.name.as_str().into(), values),
        };
        columns.push(series.into_column());
    }

    Ok(DataFrame::new(columns)?)
}

fn read_field(frame: &DataFrame, name: &str, dtype: FieldType) -> Result<Field> {
    let series = frame.column(name)?.as_materialized_series();
    let data = match dtype {
        FieldType::Float32 => FieldData::Float32(
            series
                .f32()?
                .into_iter()
                .map(|v| v.unwrap_or(f32::NAN))
                .collect(),
        ),
        FieldType::Int8 => {
            FieldData::Int8(series.i8()?.into_iter().map(|v| v.unwrap_or(0)).collect())
        }
    };
    Ok(Field {
        name: name.to_string(),
        data,
    })
}
