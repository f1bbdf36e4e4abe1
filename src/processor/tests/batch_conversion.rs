//! Batch conversion and input discovery

use super::{idvd_sweep, text_log, zip_archive};
use crate::config::ConverterConfig;
use crate::container::bundle;
use crate::error::ConversionError;
use crate::processor::BatchConverter;
use crate::processor::discovery::{discover_directory, discover_inputs};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::Ordering;
use tempfile::TempDir;

fn write_inputs(dir: &Path) -> Vec<PathBuf> {
    let text = dir.join("radiometer.txt");
    fs::write(&text, text_log(10)).unwrap();

    let archive = dir.join("hemt.zip");
    fs::write(
        &archive,
        zip_archive(&[("Id_vs_Vd_H0.xls", idvd_sweep().to_bytes())]),
    )
    .unwrap();

    let passthrough = dir.join("already.h5");
    fs::write(&passthrough, b"\x89HDF\r\n\x1a\n").unwrap();

    vec![text, archive, passthrough]
}

#[test]
fn test_batch_converts_every_kind() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let inputs = write_inputs(input_dir.path());

    let converter =
        BatchConverter::new(output_dir.path().to_path_buf(), ConverterConfig::default());
    let stats = converter.run(&inputs).unwrap();

    assert_eq!(stats.files_converted, 3);
    assert_eq!(stats.files_failed, 0);
    assert_eq!(stats.files_skipped, 0);
    assert_eq!(stats.datasets_written, 2);

    assert!(output_dir.path().join("radiometer.dsz").exists());
    assert!(output_dir.path().join("hemt.dsz").exists());
    assert_eq!(
        fs::read(output_dir.path().join("already.h5")).unwrap(),
        b"\x89HDF\r\n\x1a\n"
    );
}

#[test]
fn test_existing_outputs_are_skipped_unless_overwriting() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let inputs = write_inputs(input_dir.path());
    fs::write(output_dir.path().join("radiometer.dsz"), b"keep me").unwrap();

    let converter =
        BatchConverter::new(output_dir.path().to_path_buf(), ConverterConfig::default());
    let stats = converter.run(&inputs).unwrap();

    assert_eq!(stats.files_skipped, 1);
    assert_eq!(stats.files_converted, 2);
    assert_eq!(
        fs::read(output_dir.path().join("radiometer.dsz")).unwrap(),
        b"keep me"
    );

    let converter = BatchConverter::new(
        output_dir.path().to_path_buf(),
        ConverterConfig::default().with_overwrite(),
    );
    let stats = converter.run(&inputs).unwrap();

    assert_eq!(stats.files_skipped, 0);
    assert_eq!(stats.files_converted, 3);
    assert_ne!(
        fs::read(output_dir.path().join("radiometer.dsz")).unwrap(),
        b"keep me"
    );
}

#[test]
fn test_failures_are_counted_and_do_not_stop_the_batch() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let mut inputs = write_inputs(input_dir.path());

    let broken = input_dir.path().join("broken.txt");
    fs::write(&broken, "header\n1 2 3\n").unwrap();
    let unsupported = input_dir.path().join("table.csv");
    fs::write(&unsupported, "a,b\n").unwrap();
    inputs.insert(0, broken);
    inputs.push(unsupported);

    let converter = BatchConverter::new(
        output_dir.path().to_path_buf(),
        ConverterConfig::default().with_output_extension(".bundle"),
    );
    let stats = converter.run(&inputs).unwrap();

    assert_eq!(stats.files_failed, 2);
    assert_eq!(stats.files_converted, 3);
    assert!(output_dir.path().join("hemt.bundle").exists());
    assert!(!output_dir.path().join("broken.bundle").exists());
}

#[test]
fn test_cancelled_batch_converts_nothing() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let inputs = write_inputs(input_dir.path());

    let converter =
        BatchConverter::new(output_dir.path().to_path_buf(), ConverterConfig::default());
    converter.cancellation_flag().store(true, Ordering::Relaxed);
    let stats = converter.run(&inputs).unwrap();

    assert_eq!(stats.files_converted, 0);
    assert!(stats.outputs.is_empty());
}

#[test]
fn test_invalid_configuration_is_rejected_up_front() {
    let output_dir = TempDir::new().unwrap();
    let converter = BatchConverter::new(
        output_dir.path().to_path_buf(),
        ConverterConfig::default().with_output_extension(""),
    );

    let err = converter.run(&[]).unwrap_err();
    assert!(matches!(err, ConversionError::Configuration { .. }));
}

#[test]
fn test_directory_discovery_filters_and_sorts() {
    let input_dir = TempDir::new().unwrap();
    write_inputs(input_dir.path());
    let nested = input_dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    fs::write(nested.join("late.TXT"), text_log(1)).unwrap();
    fs::write(input_dir.path().join("notes.md"), "ignored").unwrap();

    let found = discover_directory(input_dir.path()).unwrap();
    let names: Vec<_> = found
        .iter()
        .map(|p| p.strip_prefix(input_dir.path()).unwrap().to_path_buf())
        .collect();

    assert_eq!(
        names,
        vec![
            PathBuf::from("already.h5"),
            PathBuf::from("hemt.zip"),
            PathBuf::from("nested/late.TXT"),
            PathBuf::from("radiometer.txt"),
        ]
    );
}

#[test]
fn test_input_discovery_accepts_files_directories_and_globs() {
    let input_dir = TempDir::new().unwrap();
    let inputs = write_inputs(input_dir.path());
    let pattern = format!("{}/*.zip", input_dir.path().display());

    let found = discover_inputs(&[
        inputs[0].to_string_lossy().to_string(),
        pattern,
        input_dir.path().to_string_lossy().to_string(),
    ])
    .unwrap();

    assert_eq!(found.len(), 3);
    assert_eq!(found[0], inputs[0]);
    assert_eq!(found[1], inputs[1]);
}

#[test]
fn test_missing_input_is_reported() {
    let input_dir = TempDir::new().unwrap();
    let missing = input_dir.path().join("nothing-*.zip");

    let err = discover_inputs(&[missing.to_string_lossy()]).unwrap_err();
    assert!(matches!(err, ConversionError::InputNotFound { .. }));
}

#[test]
fn test_inputs_sharing_an_output_name_do_not_overwrite_each_other() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let day1 = input_dir.path().join("day1");
    let day2 = input_dir.path().join("day2");
    fs::create_dir(&day1).unwrap();
    fs::create_dir(&day2).unwrap();
    fs::write(day1.join("run.txt"), text_log(3)).unwrap();
    fs::write(day2.join("run.txt"), text_log(7)).unwrap();
    let inputs = vec![day1.join("run.txt"), day2.join("run.txt")];

    for config in [ConverterConfig::default(), ConverterConfig::default().with_overwrite()] {
        let stats = BatchConverter::new(output_dir.path().to_path_buf(), config)
            .run(&inputs)
            .unwrap();

        assert_eq!(stats.files_converted, 1);
        assert_eq!(stats.files_failed, 1);
        assert_eq!(stats.files_skipped, 0);
        assert_eq!(stats.outputs, vec![output_dir.path().join("run.dsz")]);

        let container = bundle::open(&output_dir.path().join("run.dsz")).unwrap();
        assert_eq!(container.get("time_series").unwrap().data.shape(), &[3]);

        fs::remove_file(output_dir.path().join("run.dsz")).unwrap();
    }
}

#[test]
fn test_text_and_archive_with_one_stem_collide() {
    let input_dir = TempDir::new().unwrap();
    let output_dir = TempDir::new().unwrap();
    let text = input_dir.path().join("run.txt");
    let archive = input_dir.path().join("run.zip");
    fs::write(&text, text_log(3)).unwrap();
    fs::write(
        &archive,
        zip_archive(&[("Id_vs_Vd_H0.xls", idvd_sweep().to_bytes())]),
    )
    .unwrap();

    let converter = BatchConverter::new(
        output_dir.path().to_path_buf(),
        ConverterConfig::default().with_overwrite(),
    );
    let stats = converter.run(&[text, archive]).unwrap();

    assert_eq!(stats.files_converted, 1);
    assert_eq!(stats.files_failed, 1);
    let container = bundle::open(&output_dir.path().join("run.dsz")).unwrap();
    assert_eq!(
        container.dataset_names().collect::<Vec<_>>(),
        vec!["time_series"]
    );
}

#[test]
fn test_output_collision_names_both_inputs() {
    let err = ConversionError::OutputCollision {
        output: PathBuf::from("out/run.dsz"),
        first: PathBuf::from("day1/run.txt"),
        second: PathBuf::from("day2/run.txt"),
    };

    assert_eq!(
        err.to_string(),
        "Output out/run.dsz was already written from day1/run.txt, not converting day2/run.txt"
    );
}
