// End-to-end tests for the timing-cli binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

const CAPTURE: &str = "\
# daisy chain bench capture
Event,Time,Toggled,Device_ID,Position,Message_ID
GPIO_Init,1000,True,Device_1,1,
GPIO_Init,1500,False,Device_1,1,
ADC_Read,4000,True,Device_2,2,
ADC_Read,6000,False,Device_2,2,
Sync_Pulse,10000,True,Device_1,1,SYNC_0
Sync_Pulse,10050,True,Device_2,2,SYNC_0
Sync_Pulse,9980,True,Device_3,3,SYNC_0
Message_Send,20000,True,Device_1,1,MSG_0
Message_Receive,25000,True,Device_3,3,MSG_0
";

fn write_capture(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_no_input_prints_quick_start() {
    let mut cmd = Command::cargo_bin("timing-cli").unwrap();
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("No input specified"));
}

#[test]
fn test_txt_report() {
    let dir = TempDir::new().unwrap();
    let capture = write_capture(&dir, "bench.csv", CAPTURE);

    let mut cmd = Command::cargo_bin("timing-cli").unwrap();
    cmd.arg("--input").arg(&capture);

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("EXECUTION TIMING"))
        .stdout(predicate::str::contains("SYNCHRONICITY"))
        .stdout(predicate::str::contains("SYNC_0"))
        .stdout(predicate::str::contains("Device_3@3"));
}

#[test]
fn test_json_report_to_file() {
    let dir = TempDir::new().unwrap();
    let capture = write_capture(&dir, "bench.csv", CAPTURE);
    let report = dir.path().join("report.json");

    let mut cmd = Command::cargo_bin("timing-cli").unwrap();
    cmd.arg("-i")
        .arg(&capture)
        .arg("--format")
        .arg("json")
        .arg("--output")
        .arg(&report);
    cmd.assert().success();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&report).unwrap()).unwrap();
    assert_eq!(value["sync_pulses"][0]["max_diff"], 70);
    assert_eq!(value["sync_pulses"][0]["min_diff"], 20);
    assert_eq!(value["propagation"][0]["hops"][0]["hop_count"], 2);
    assert_eq!(value["timing"]["devices"]["Device_2"]["ADC_Read"]["mean"], 2000.0);
}

#[test]
fn test_invalid_capture_fails() {
    let dir = TempDir::new().unwrap();
    let capture = write_capture(&dir, "broken.csv", "Event,Time\nGPIO_Init,1000\n");

    let mut cmd = Command::cargo_bin("timing-cli").unwrap();
    cmd.arg("--input").arg(&capture);

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Missing required columns: Toggled"));
}

#[test]
fn test_config_file_with_output_dir() {
    let dir = TempDir::new().unwrap();
    let first = write_capture(&dir, "first.csv", CAPTURE);
    let second = write_capture(&dir, "second.csv", CAPTURE);
    let reports = dir.path().join("reports");
    let config = dir.path().join("config.toml");
    fs::write(
        &config,
        format!(
            "[input]\nfiles = [{:?}, {:?}]\n\n[output]\nformat = \"json\"\noutput_dir = {:?}\n",
            first, second, reports
        ),
    )
    .unwrap();

    let mut cmd = Command::cargo_bin("timing-cli").unwrap();
    cmd.arg("--config").arg(&config);
    cmd.assert().success();

    assert!(reports.join("first.json").exists());
    assert!(reports.join("second.json").exists());
}

#[test]
fn test_custom_sync_prefix() {
    let dir = TempDir::new().unwrap();
    let capture = write_capture(&dir, "bench.csv", &CAPTURE.replace("SYNC_0", "PULSE_0"));

    let mut cmd = Command::cargo_bin("timing-cli").unwrap();
    cmd.arg("--input")
        .arg(&capture)
        .arg("--sync-prefix")
        .arg("PULSE");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("PULSE_0"));
}

#[test]
fn test_write_sample_then_analyze() {
    let dir = TempDir::new().unwrap();
    let sample = dir.path().join("sample.csv");

    let mut cmd = Command::cargo_bin("timing-cli").unwrap();
    cmd.arg("--write-sample").arg(&sample).arg("--sample-devices").arg("3");
    cmd.assert().success();

    let content = fs::read_to_string(&sample).unwrap();
    assert!(content.starts_with("Event,Time,Toggled,Device_ID,Position,Message_ID"));

    let mut cmd = Command::cargo_bin("timing-cli").unwrap();
    cmd.arg("--input").arg(&sample);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Device_3"))
        .stdout(predicate::str::contains("MSG_0"));
}

#[test]
fn test_sample_mode() {
    let mut cmd = Command::cargo_bin("timing-cli").unwrap();
    cmd.arg("--sample").arg("--format").arg("json");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"sample\""));
}
