use crate::errors::{util::ensure_file_exists, BenchError, BenchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::read_to_string;
use std::path::PathBuf;

pub const DEFAULT_TOOL: &str = "fio";
pub const DEFAULT_DEVICES: [&str; 3] = ["nvme0n1", "nvme1n1", "nvme8n1"];

/// A workload to run against every device: a label for humans and the
/// keyword passed to `--rw`.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct BenchMode {
    pub label: String,
    pub workload: String,
}

impl BenchMode {
    pub fn new(label: impl Into<String>, workload: impl Into<String>) -> Self {
        BenchMode {
            label: label.into(),
            workload: workload.into(),
        }
    }
}

/// One (device, mode) element of the run matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchCase {
    pub device: String,
    pub mode: BenchMode,
}

impl BenchCase {
    pub fn new(device: impl Into<String>, mode: BenchMode) -> Self {
        BenchCase {
            device: device.into(),
            mode,
        }
    }

    /// `<device>_<workload>`, used for the fio job name and the case directory
    pub fn name(&self) -> String {
        format!("{}_{}", self.device, self.mode.workload)
    }

    pub fn device_path(&self) -> String {
        format!("/dev/{}", self.device)
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BenchRunConfig {
    #[serde(default = "default_tool")]
    pub tool: String,
    #[serde(default = "default_devices")]
    pub devices: Vec<String>,
    #[serde(default = "default_modes")]
    pub modes: Vec<BenchMode>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_case_result_filename")]
    pub case_result_filename: String,
    #[serde(default = "default_run_summary_filename")]
    pub run_summary_filename: String,
    #[serde(default)]
    pub post_process_cmd: Option<PathBuf>,
}

fn default_tool() -> String {
    DEFAULT_TOOL.to_string()
}

fn default_devices() -> Vec<String> {
    DEFAULT_DEVICES.iter().map(|d| d.to_string()).collect()
}

fn default_modes() -> Vec<BenchMode> {
    vec![BenchMode::new("random write", "randwrite")]
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("diskbench-results")
}

fn default_case_result_filename() -> String {
    "case_result.json".to_string()
}

fn default_run_summary_filename() -> String {
    "run_summary.json".to_string()
}

impl Default for BenchRunConfig {
    fn default() -> Self {
        BenchRunConfig {
            tool: default_tool(),
            devices: default_devices(),
            modes: default_modes(),
            output_dir: default_output_dir(),
            case_result_filename: default_case_result_filename(),
            run_summary_filename: default_run_summary_filename(),
            post_process_cmd: None,
        }
    }
}

impl BenchRunConfig {
    pub fn from_string(cfg: String) -> BenchResult<Self> {
        let config: BenchRunConfig = serde_json::from_str(&cfg)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from(cfg: PathBuf) -> BenchResult<Self> {
        ensure_file_exists(&cfg)?;
        let config = Self::from_string(read_to_string(&cfg)?)?;
        tracing::debug!("Loaded config from {}", cfg.display());
        Ok(config)
    }

    pub fn to_string(&self) -> BenchResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> BenchResult<()> {
        if self.tool.trim().is_empty() {
            return Err(BenchError::ConfigError("tool must not be empty".to_string()));
        }
        if self.devices.is_empty() {
            return Err(BenchError::ConfigError("No devices specified".to_string()));
        }
        if self.modes.is_empty() {
            return Err(BenchError::ConfigError("No modes specified".to_string()));
        }
        // substituted verbatim into the fio arguments
        if let Some(device) = self
            .devices
            .iter()
            .find(|d| d.trim().is_empty() || d.trim() != d.as_str())
        {
            return Err(BenchError::ConfigError(format!(
                "Invalid device identifier: {:?}",
                device
            )));
        }
        if let Some(mode) = self.modes.iter().find(|m| {
            m.label.trim().is_empty()
                || m.workload.trim().is_empty()
                || m.workload.trim() != m.workload.as_str()
        }) {
            return Err(BenchError::ConfigError(format!(
                "Mode needs both a label and a workload: {:?}",
                mode
            )));
        }

        // each case owns the `<device>_<workload>` directory
        let mut seen = HashSet::new();
        if let Some(device) = self.devices.iter().find(|d| !seen.insert(*d)) {
            return Err(BenchError::ConfigError(format!(
                "Duplicate device: {}",
                device
            )));
        }
        let mut seen = HashSet::new();
        if let Some(workload) = self
            .modes
            .iter()
            .map(|m| &m.workload)
            .find(|w| !seen.insert(*w))
        {
            return Err(BenchError::ConfigError(format!(
                "Duplicate workload: {}",
                workload
            )));
        }
        Ok(())
    }

    /// Narrow the matrix to the named devices and workloads. Empty filters keep everything.
    pub fn restrict(&mut self, devices: &[String], workloads: &[String]) -> BenchResult<()> {
        if let Some(unknown) = devices.iter().find(|d| !self.devices.contains(d)) {
            return Err(BenchError::ConfigError(format!(
                "Unknown device: {}",
                unknown
            )));
        }
        if let Some(unknown) = workloads
            .iter()
            .find(|w| !self.modes.iter().any(|m| &m.workload == *w))
        {
            return Err(BenchError::ConfigError(format!(
                "Unknown workload: {}",
                unknown
            )));
        }

        if !devices.is_empty() {
            self.devices.retain(|d| devices.contains(d));
        }
        if !workloads.is_empty() {
            self.modes.retain(|m| workloads.contains(&m.workload));
        }
        Ok(())
    }

    /// Device-major Cartesian product of devices and modes
    pub fn cases(&self) -> Vec<BenchCase> {
        self.devices
            .iter()
            .flat_map(|device| {
                self.modes
                    .iter()
                    .map(move |mode| BenchCase::new(device.clone(), mode.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_default_matrix() {
        let config = BenchRunConfig::default();
        assert_eq!(config.tool, "fio");
        assert_eq!(config.devices, vec!["nvme0n1", "nvme1n1", "nvme8n1"]);
        assert_eq!(config.modes, vec![BenchMode::new("random write", "randwrite")]);

        let names: Vec<String> = config.cases().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["nvme0n1_randwrite", "nvme1n1_randwrite", "nvme8n1_randwrite"]
        );
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config =
            BenchRunConfig::from_string(r#"{"devices": ["sda"], "tool": "/usr/bin/fio"}"#.into())
                .unwrap();
        assert_eq!(config.devices, vec!["sda"]);
        assert_eq!(config.tool, "/usr/bin/fio");
        assert_eq!(config.modes.len(), 1);
        assert_eq!(config.run_summary_filename, "run_summary.json");
        assert!(config.post_process_cmd.is_none());
    }

    #[test]
    fn test_cases_are_device_major() {
        let config = BenchRunConfig {
            devices: vec!["a".into(), "b".into()],
            modes: vec![
                BenchMode::new("random write", "randwrite"),
                BenchMode::new("random read", "randread"),
            ],
            ..Default::default()
        };
        let names: Vec<String> = config.cases().iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec!["a_randwrite", "a_randread", "b_randwrite", "b_randread"]
        );
    }

    #[test]
    fn test_validate_rejects_empty_lists() {
        let err = BenchRunConfig::from_string(r#"{"devices": []}"#.into()).unwrap_err();
        assert!(matches!(err, BenchError::ConfigError(_)));

        let err = BenchRunConfig::from_string(r#"{"modes": []}"#.into()).unwrap_err();
        assert!(matches!(err, BenchError::ConfigError(_)));

        let err = BenchRunConfig::from_string(
            r#"{"modes": [{"label": "random write", "workload": ""}]}"#.into(),
        )
        .unwrap_err();
        assert!(matches!(err, BenchError::ConfigError(_)));
    }

    #[test_case(r#"{"devices": ["nvme0n1 "]}"# ; "trailing space")]
    #[test_case(r#"{"devices": [" nvme0n1"]}"# ; "leading space")]
    #[test_case(r#"{"modes": [{"label": "random write", "workload": "randwrite\n"}]}"# ; "workload newline")]
    fn test_validate_rejects_padded_identifiers(cfg: &str) {
        let err = BenchRunConfig::from_string(cfg.to_string()).unwrap_err();
        assert!(matches!(err, BenchError::ConfigError(_)));
    }

    #[test]
    fn test_validate_rejects_duplicate_cases() {
        let err = BenchRunConfig::from_string(r#"{"devices": ["nvme0n1", "nvme0n1"]}"#.into())
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate device: nvme0n1"));

        let err = BenchRunConfig::from_string(
            r#"{"modes": [
                {"label": "random write", "workload": "randwrite"},
                {"label": "随机写", "workload": "randwrite"}
            ]}"#
            .into(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate workload: randwrite"));
    }

    #[test]
    fn test_restrict() {
        let mut config = BenchRunConfig::default();
        config
            .restrict(&["nvme1n1".to_string()], &["randwrite".to_string()])
            .unwrap();
        assert_eq!(config.devices, vec!["nvme1n1"]);
        assert_eq!(config.cases().len(), 1);

        let mut config = BenchRunConfig::default();
        let err = config.restrict(&["sdz".to_string()], &[]).unwrap_err();
        assert!(err.to_string().contains("sdz"));

        let err = config.restrict(&[], &["trim".to_string()]).unwrap_err();
        assert!(err.to_string().contains("trim"));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bench.json");
        std::fs::write(&path, BenchRunConfig::default().to_string().unwrap()).unwrap();

        let config = BenchRunConfig::from(path).unwrap();
        assert_eq!(config.devices.len(), 3);

        let missing = BenchRunConfig::from(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(missing, BenchError::FileNotFound(_)));
    }
}
