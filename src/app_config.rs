use crate::error::Result;
use crate::ldpc::{CodeParameters, Rate};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Settings of a generation run, read from the `[generator]` table of a
/// TOML file.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Where matrix files and rendered tables are written.
    pub output_dir: PathBuf,
    pub codes: Vec<CodeParameters>,
    /// Generate codes concurrently.
    pub parallel: bool,
    /// Check `H * G^T == 0` before puncturing.
    pub verify: bool,
    /// Hex constants per output line, 0 for a single line.
    pub words_per_line: usize,
}

impl GeneratorConfig {
    pub fn from_toml(s: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Root {
            generator: Option<Section>,
        }

        #[derive(Deserialize)]
        struct Section {
            output_dir: Option<PathBuf>,
            codes: Option<Vec<CodeSection>>,
            parallel: Option<bool>,
            verify: Option<bool>,
            words_per_line: Option<usize>,
        }

        #[derive(Deserialize)]
        struct CodeSection {
            k: usize,
            rate: Rate,
        }

        let raw: Root = toml::from_str(s)?;
        let defaults = Self::default();
        let Some(sec) = raw.generator else {
            return Ok(defaults);
        };
        let codes = match sec.codes {
            Some(list) => list
                .into_iter()
                .map(|c| CodeParameters::new(c.k, c.rate))
                .collect::<Result<Vec<_>>>()?,
            None => defaults.codes,
        };
        Ok(Self {
            output_dir: sec.output_dir.unwrap_or(defaults.output_dir),
            codes,
            parallel: sec.parallel.unwrap_or(defaults.parallel),
            verify: sec.verify.unwrap_or(defaults.verify),
            words_per_line: sec.words_per_line.unwrap_or(defaults.words_per_line),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.codes.is_empty() {
            return Err("no codes selected".into());
        }
        if self.output_dir.as_os_str().is_empty() {
            return Err("output_dir must not be empty".into());
        }
        for (i, c) in self.codes.iter().enumerate() {
            if self.codes[..i].contains(c) {
                return Err(format!("code k={} rate {} listed twice", c.k(), c.rate()));
            }
        }
        Ok(())
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./ldpc"),
            codes: CodeParameters::all(),
            parallel: false,
            verify: true,
            words_per_line: 6,
        }
    }
}
