use crate::template::safe_substitute;
use anyhow::{Context as AnyhowContext, Result};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Directory (inside the output dir) receiving the settings files
pub(crate) const SETTINGS_DIR_NAME: &str = "settings";
/// Rendered acquisition script
pub(crate) const SCRIPT_FILE_NAME: &str = "runArbitrEM.txt";

/// Values handed to the acquisition script, either as small settings files or
/// embedded into the rendered script.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SessionSettings {
    /// Session base path on the microscope computer
    pub session_base_path: String,
    /// Beam-image shift offset, `"X Y"`
    pub custom_shift_offset: String,
    /// Defocus range and step, e.g. `"-1 -2.6 0.2"`
    pub defocus_range: String,
    pub early_return: String,
    pub script_template: PathBuf,
    pub view_map_defocus: String,
    pub view_map_exp_time: String,
    pub view_map_diameter_um: f64,
}

impl SessionSettings {
    /// Settings files as `(file name, content)`
    pub(crate) fn settings_files(&self) -> [(&'static str, &str); 3] {
        [
            ("customShift.txt", self.custom_shift_offset.as_str()),
            ("defocusRange.txt", self.defocus_range.as_str()),
            ("earlyReturn.txt", self.early_return.as_str()),
        ]
    }

    /// Placeholder values for the script template
    pub(crate) fn template_values(&self) -> BTreeMap<&'static str, String> {
        BTreeMap::from([
            ("viewMapDiameter", format!("{:?}", self.view_map_diameter_um)),
            ("sessionBasePath", self.session_base_path.clone()),
            ("viewMapDefocus", self.view_map_defocus.clone()),
            ("viewMapExpTime", self.view_map_exp_time.clone()),
        ])
    }
}

/// Write the settings files under `<output_dir>/settings`.
///
/// Failures are logged and skipped; returns the files actually written.
pub(crate) fn write_settings_files(output_dir: &Path, settings: &SessionSettings) -> Vec<PathBuf> {
    let dir = output_dir.join(SETTINGS_DIR_NAME);
    if let Err(err) = fs::create_dir_all(&dir) {
        log::warn!("Failed to create {}: {err}", dir.display());
        return Vec::new();
    }

    let mut written = Vec::new();
    for (name, content) in settings.settings_files() {
        let path = dir.join(name);
        log::debug!("Creating {}, containing [{content}]", path.display());
        match fs::write(&path, content) {
            Ok(()) => written.push(path),
            Err(err) => log::warn!("Failed to write {}: {err}", path.display()),
        }
    }
    written
}

/// Render the script template into `<output_dir>/runArbitrEM.txt`
pub(crate) fn write_script(output_dir: &Path, settings: &SessionSettings) -> Result<PathBuf> {
    let template = fs::read_to_string(&settings.script_template).with_context(|| {
        format!(
            "Failed to read script template {}",
            settings.script_template.display()
        )
    })?;

    let output = output_dir.join(SCRIPT_FILE_NAME);
    log::info!(
        "Creating {} script with {} specified as the SerialEM session base-path",
        output.display(),
        settings.session_base_path
    );
    let rendered = safe_substitute(&template, &settings.template_values());
    fs::write(&output, rendered)
        .with_context(|| format!("Failed to write {}", output.display()))?;
    Ok(output)
}
