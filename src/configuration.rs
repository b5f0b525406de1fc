use crate::api_client::MembershipRule;
use crate::render::{OutputPaths, RenderOptions};
use config::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

/// Everything read from `config.yaml` and `RADIOLIST_*` environment variables.
///
/// Every section has defaults, so a missing or partial file is valid.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub stations: Vec<StationSettings>,
    pub aggregate: AggregateSettings,
    pub render: RenderOptions,
    pub output: OutputSettings,
    pub cleanup: MembershipRule,
    pub spotify: SpotifySettings,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StationSettings {
    pub name: String,
    /// Regular expressions matched against playlist names of this station.
    pub ignores: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AggregateSettings {
    pub drop_empty_playlists: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub html_path: String,
    /// Empty disables the dump.
    pub dump_path: String,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            html_path: "docs/index.html".to_string(),
            dump_path: "docs/playlists.json".to_string(),
        }
    }
}

impl OutputSettings {
    pub fn paths(&self) -> OutputPaths {
        OutputPaths {
            html: PathBuf::from(&self.html_path),
            dump: (!self.dump_path.is_empty()).then(|| PathBuf::from(&self.dump_path)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
    pub redirect_uri: String,
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub authorization_timeout_secs: u64,
}

impl Default for SpotifySettings {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            refresh_token: String::new(),
            redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
            api_base_url: "https://api.spotify.com/v1".to_string(),
            accounts_base_url: "https://accounts.spotify.com".to_string(),
            authorization_timeout_secs: 60,
        }
    }
}

/// Loads settings from `cfg_file` (if it exists), then applies environment overrides
/// such as `RADIOLIST_SPOTIFY__REFRESH_TOKEN`.
pub fn get_configuration(cfg_file: &Path) -> Result<Settings, ConfigError> {
    let settings = config::Config::builder()
        .add_source(
            config::File::from(cfg_file)
                .format(config::FileFormat::Yaml)
                .required(false),
        )
        .add_source(
            config::Environment::with_prefix("RADIOLIST")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?;

    settings.try_deserialize::<Settings>()
}

pub struct ConfigFolder {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl ConfigFolder {
    /// The default folder, `~/.radiolist`.
    pub fn new() -> io::Result<Self> {
        let home_dir = env::var("HOME")
            .map_err(|_| io::Error::new(io::ErrorKind::NotFound, "HOME is not set"))?;
        Ok(Self::in_home(Path::new(&home_dir)))
    }

    pub fn in_home(home_dir: &Path) -> Self {
        let config_dir = home_dir.join(".radiolist");
        Self {
            config_file: config_dir.join("config.yaml"),
            config_dir,
        }
    }

    /// A folder built around an explicit config file path.
    pub fn with_file(config_file: &Path) -> Self {
        Self {
            config_dir: config_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            config_file: config_file.to_path_buf(),
        }
    }
}

pub fn create_config(cfg_folder: ConfigFolder) -> Result<(), Box<dyn std::error::Error>> {
    println!("\x1b[1m\x1b[32mCreating configuration...\x1b[0m");

    if cfg_folder.config_file.exists() && !confirm_overwrite()? {
        println!("\x1b[33mOperation cancelled.\x1b[0m");
        return Ok(());
    }

    write_template(&cfg_folder)?;

    println!("\x1b[32mConfiguration file created at:");
    println!("  -> {}", cfg_folder.config_file.display());
    println!("\x1b[0mPlease edit the configuration file with your specific settings.");

    Ok(())
}

fn write_template(cfg_folder: &ConfigFolder) -> io::Result<()> {
    if !cfg_folder.config_dir.as_os_str().is_empty() {
        fs::create_dir_all(&cfg_folder.config_dir)?;
    }
    fs::write(&cfg_folder.config_file, include_str!("config_template.yaml"))
}

fn confirm_overwrite() -> Result<bool, io::Error> {
    println!("\x1b[31mThe configuration file already exists.");
    println!("Do you want to overwrite it? Your settings will be lost. (y/N)\x1b[0m");

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{CaptionFormat, Theme};
    use tempfile::tempdir;

    #[test]
    fn test_template_round_trips_through_loader() {
        let temp_dir = tempdir().unwrap();
        let folder = ConfigFolder::in_home(temp_dir.path());

        write_template(&folder).unwrap();
        let settings = get_configuration(&folder.config_file).unwrap();

        assert!(folder.config_file.ends_with(".radiolist/config.yaml"));
        assert_eq!(settings.stations[0].name, "KALX");
        assert_eq!(settings.render.preview_limit, 12);
        assert_eq!(settings.cleanup, MembershipRule::default());
        assert_eq!(settings.output.paths().html, PathBuf::from("docs/index.html"));
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp_dir = tempdir().unwrap();

        let settings = get_configuration(&temp_dir.path().join("absent.yaml")).unwrap();

        assert!(settings.stations.is_empty());
        assert!(!settings.aggregate.drop_empty_playlists);
        assert_eq!(settings.render, RenderOptions::default());
        assert_eq!(settings.spotify.authorization_timeout_secs, 60);
    }

    #[test]
    fn test_partial_file_overrides_only_what_it_names() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(
            &path,
            "render:\n  theme: dark\n  caption: tracks_only\noutput:\n  dump_path: \"\"\nstations:\n  - name: WFMU\n    ignores: [\"^Rebroadcast\"]\n",
        )
        .unwrap();

        let settings = get_configuration(&path).unwrap();

        assert_eq!(settings.render.theme, Theme::Dark);
        assert_eq!(settings.render.caption, CaptionFormat::TracksOnly);
        assert_eq!(settings.render.grid_columns, 4);
        assert_eq!(settings.output.paths().dump, None);
        assert_eq!(settings.stations[0].ignores, vec!["^Rebroadcast"]);
    }
}
