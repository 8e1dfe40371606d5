use crate::bench_config::BenchCase;
use crate::errors::BenchResult;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const STDOUT_ATTACHMENT: &str = "fio_stdout.txt";
pub const STDERR_ATTACHMENT: &str = "fio_stderr.txt";

/// Directory holding the attachments of a single case: `<output_dir>/<device>_<workload>`
pub struct CaseWorkDir {
    pub path: PathBuf,
}

impl CaseWorkDir {
    pub fn create(output_dir: &Path, case: &BenchCase) -> BenchResult<CaseWorkDir> {
        let path = output_dir.join(case.name());
        fs::create_dir_all(&path)?;
        Ok(CaseWorkDir { path })
    }

    pub fn attach(&self, name: &str, contents: &str) -> BenchResult<PathBuf> {
        let file = self.path.join(name);
        fs::write(&file, contents)?;
        Ok(file)
    }

    /// Remove an attachment left behind by an earlier run, if any
    pub fn detach(&self, name: &str) -> BenchResult<()> {
        match fs::remove_file(self.path.join(name)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }

    pub fn attach_json<T: Serialize>(&self, name: &str, value: &T) -> BenchResult<PathBuf> {
        self.attach(name, &serde_json::to_string_pretty(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bench_config::BenchMode;

    #[test]
    fn test_attachments_land_in_case_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let case = BenchCase::new("nvme8n1", BenchMode::new("random write", "randwrite"));

        let dir = CaseWorkDir::create(tmp.path(), &case).unwrap();
        assert_eq!(dir.path, tmp.path().join("nvme8n1_randwrite"));

        let file = dir.attach(STDOUT_ATTACHMENT, "IOPS=1").unwrap();
        assert_eq!(fs::read_to_string(file).unwrap(), "IOPS=1");

        let json = dir.attach_json("x.json", &vec![1, 2]).unwrap();
        let parsed: Vec<i32> = serde_json::from_str(&fs::read_to_string(json).unwrap()).unwrap();
        assert_eq!(parsed, vec![1, 2]);
    }

    #[test]
    fn test_detach_removes_file_and_tolerates_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let case = BenchCase::new("nvme0n1", BenchMode::new("random write", "randwrite"));
        let dir = CaseWorkDir::create(tmp.path(), &case).unwrap();

        let file = dir.attach(STDERR_ATTACHMENT, "I/O error").unwrap();
        dir.detach(STDERR_ATTACHMENT).unwrap();
        assert!(!file.exists());
        dir.detach(STDERR_ATTACHMENT).unwrap();
    }
}
