mod chart;
mod data;
mod errors;
mod etl;
mod leaflet;

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;
use structured_logger::json::new_writer;
use structured_logger::Builder;

use crate::errors::Result;
use crate::etl::interactive_map::InteractiveMapEtl;
use crate::etl::static_map::StaticMapEtl;
use crate::etl::Etl;

pub const CONFIG_FILE_NAME: &str = "nyc_map.json";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UserConfig {
    pub output_dir: String,
    pub dpi: f32,
    pub font_path: Option<String>,
    pub log_level: String,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            output_dir: ".".to_string(),
            dpi: 300.0,
            font_path: None,
            log_level: "info".to_string(),
        }
    }
}

/// Reads `path` when it exists; a missing file means the defaults.
fn load_user_config(path: &Path) -> Result<UserConfig> {
    if !path.try_exists()? {
        return Ok(UserConfig::default());
    }
    let file = File::open(path)?;
    let config: UserConfig = serde_json::from_reader(file)?;
    if !(config.dpi.is_finite() && config.dpi > 0.0) {
        return Err(format!("Invalid dpi {} in {}", config.dpi, path.display()).into());
    }
    Ok(config)
}

fn setup_logging(level: &str) {
    Builder::with_level(level)
        .with_target_writer("*", new_writer(io::stderr()))
        .init();
}

/// Writes all three outputs into the configured directory and returns their paths.
fn run(user_config: &UserConfig) -> Result<Vec<PathBuf>> {
    let output_dir = Path::new(&user_config.output_dir);
    let mut written = Vec::new();

    println!("正在生成纽约市地图...");

    let mut interactive = InteractiveMapEtl::new();
    written.extend(interactive.process(output_dir)?);
    println!("交互式地图已保存为 {}", etl::interactive_map::OUTPUT_FILE_NAME);

    let mut static_map = StaticMapEtl::new(user_config)?;
    written.extend(static_map.process(output_dir)?);

    println!("\n地图生成完成！");
    println!("文件列表：");
    println!("- {} (可在浏览器中打开的交互式地图)", etl::interactive_map::OUTPUT_FILE_NAME);
    println!("- {} (静态地图图片)", etl::static_map::PNG_FILE_NAME);
    println!("- {} (静态地图PDF)", etl::static_map::PDF_FILE_NAME);

    Ok(written)
}

fn main() -> Result<()> {
    let user_config = load_user_config(Path::new(CONFIG_FILE_NAME))?;
    setup_logging(&user_config.log_level);
    info!(output_dir = user_config.output_dir.as_str(), dpi = user_config.dpi; "Generating New York City maps");

    run(&user_config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn missing_config_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_user_config(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config, UserConfig::default());
    }

    #[test]
    fn partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, r#"{"dpi": 150}"#).unwrap();
        let config = load_user_config(&path).unwrap();
        assert_eq!(config.dpi, 150.0);
        assert_eq!(config.output_dir, ".");
        assert_eq!(config.font_path, None);
    }

    #[test]
    fn malformed_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        assert!(load_user_config(&path).is_err());
        fs::write(&path, r#"{"dpi": -1}"#).unwrap();
        assert!(load_user_config(&path).is_err());
    }

    #[test]
    fn empty_directory_gains_exactly_three_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = UserConfig {
            output_dir: dir.path().to_string_lossy().to_string(),
            dpi: 30.0,
            ..UserConfig::default()
        };
        let written = run(&config).unwrap();
        assert_eq!(written.len(), 3);

        let mut names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["nyc_interactive_map.html", "nyc_static_map.pdf", "nyc_static_map.png"]);
        for path in &written {
            assert!(fs::metadata(path).unwrap().len() > 0);
        }
    }
}
