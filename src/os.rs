//! File-backed OS configuration for Raspberry Pi style systems.
//!
//! The bus is enabled through `dtparam=i2c_arm=on` in the boot config and modules are loaded
//! at boot when listed one per line in the modules file.

use crate::adapter::OsAdapter;
use log::debug;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Default boot configuration file.
pub const DEFAULT_BOOT_CONFIG: &str = "/boot/config.txt";

/// Default modules file.
pub const DEFAULT_MODULES_FILE: &str = "/etc/modules";

const I2C_PARAM: &str = "i2c_arm";
const I2C_ENABLE_LINE: &str = "dtparam=i2c_arm=on";

/// Boot config + modules file pair.
#[derive(Debug, Clone)]
pub struct BootFiles {
    boot_config: PathBuf,
    modules_file: PathBuf,
}

impl BootFiles {
    /// Use the given files. Missing files read as "nothing enabled".
    pub fn new(boot_config: impl Into<PathBuf>, modules_file: impl Into<PathBuf>) -> Self {
        Self {
            boot_config: boot_config.into(),
            modules_file: modules_file.into(),
        }
    }
}

impl Default for BootFiles {
    fn default() -> Self {
        Self::new(DEFAULT_BOOT_CONFIG, DEFAULT_MODULES_FILE)
    }
}

fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    match fs::read_to_string(path) {
        Ok(raw) => Ok(raw.lines().map(str::to_string).collect()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e),
    }
}

fn write_lines(path: &Path, lines: &[String]) -> io::Result<()> {
    let mut raw = lines.join("\n");
    raw.push('\n');
    fs::write(path, raw)
}

/// Value of `i2c_arm` in a `dtparam=` line, if the line sets it.
fn i2c_param(line: &str) -> Option<bool> {
    let params = line.trim().strip_prefix("dtparam=")?;
    params.split(',').rev().find_map(|param| {
        let (key, value) = param.split_once('=').unwrap_or((param, "on"));
        (key.trim() == I2C_PARAM).then(|| matches!(value.trim(), "on" | "1" | "true" | "yes"))
    })
}

/// Turn `i2c_arm` on in a `dtparam=` line, keeping its other parameters and comment.
fn switch_i2c_on(line: &str) -> String {
    let (content, comment) = match line.find('#') {
        Some(i) => line.split_at(i),
        None => (line, ""),
    };
    let params = content.trim().strip_prefix("dtparam=").unwrap_or_default();
    let params: Vec<String> = params
        .split(',')
        .map(|param| {
            let key = param.split_once('=').map_or(param, |(key, _)| key);
            if key.trim() == I2C_PARAM {
                format!("{}=on", I2C_PARAM)
            } else {
                param.to_string()
            }
        })
        .collect();
    let mut out = format!("dtparam={}", params.join(","));
    if !comment.is_empty() {
        out.push(' ');
        out.push_str(comment);
    }
    out
}

fn strip_comment(line: &str) -> &str {
    line.split('#').next().unwrap_or("").trim()
}

impl OsAdapter for BootFiles {
    fn is_i2c_enabled(&self) -> io::Result<bool> {
        let lines = read_lines(&self.boot_config)?;
        // the last setting wins, as with the firmware
        Ok(lines
            .iter()
            .rev()
            .find_map(|line| i2c_param(strip_comment(line)))
            .unwrap_or(false))
    }

    fn enable_i2c(&mut self) -> io::Result<()> {
        if self.is_i2c_enabled()? {
            return Ok(());
        }
        let mut lines = read_lines(&self.boot_config)?;
        // switch the last setting, the one the firmware honours
        let effective = lines
            .iter()
            .rposition(|line| i2c_param(strip_comment(line)).is_some());
        let commented = lines.iter().rposition(|line| {
            let uncommented = line.trim().trim_start_matches('#').trim();
            uncommented
                .strip_prefix("dtparam=")
                .is_some_and(|params| !params.contains(',') && i2c_param(uncommented).is_some())
        });
        if let Some(i) = effective {
            lines[i] = switch_i2c_on(&lines[i]);
        } else if let Some(i) = commented {
            lines[i] = I2C_ENABLE_LINE.to_string();
        } else {
            lines.push(I2C_ENABLE_LINE.to_string());
        }
        debug!("enabling i2c in {}", self.boot_config.display());
        write_lines(&self.boot_config, &lines)
    }

    fn is_module_enabled(&self, module: &str) -> io::Result<bool> {
        let lines = read_lines(&self.modules_file)?;
        Ok(lines.iter().any(|line| strip_comment(line) == module))
    }

    fn enable_module(&mut self, module: &str) -> io::Result<()> {
        if self.is_module_enabled(module)? {
            return Ok(());
        }
        let mut lines = read_lines(&self.modules_file)?;
        let commented = lines
            .iter()
            .position(|line| line.trim().trim_start_matches('#').trim() == module);
        match commented {
            Some(i) => lines[i] = module.to_string(),
            None => lines.push(module.to_string()),
        }
        debug!("enabling module {} in {}", module, self.modules_file.display());
        write_lines(&self.modules_file, &lines)
    }
}
