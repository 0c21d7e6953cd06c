use crate::domain::ports::MatchSettings;
use crate::utils::error::{GtpError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_GAMES: usize = 10;
pub const DEFAULT_SIZE: usize = 3;
pub const DEFAULT_KOMI: f32 = 0.0;
pub const DEFAULT_RESULTS_DIR: &str = "./";
pub const DEFAULT_SGF_PREFIX: &str = "game";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(rename = "match", default)]
    pub game: GameSection,
    #[serde(default)]
    pub black: ProgramConfig,
    #[serde(default)]
    pub white: ProgramConfig,
    #[serde(default)]
    pub results: ResultsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameSection {
    pub games: Option<usize>,
    pub size: Option<usize>,
    pub komi: Option<f32>,
    pub alternate: Option<bool>,
    pub max_moves: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub continue_on_error: Option<bool>,
    pub force: Option<bool>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProgramConfig {
    pub command: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultsConfig {
    pub directory: Option<String>,
    pub sgf_prefix: Option<String>,
}

impl MatchConfig {
    /// 只指定兩個程式，其餘使用比賽腳本的預設值
    pub fn new(black_command: &str, white_command: &str) -> Self {
        Self {
            game: GameSection::default(),
            black: ProgramConfig {
                command: Some(black_command.to_string()),
            },
            white: ProgramConfig {
                command: Some(white_command.to_string()),
            },
            results: ResultsConfig::default(),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(GtpError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| GtpError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${GO_ENGINE})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}")?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::command_line("black.command", self.black.command.as_deref())?;
        validation::command_line("white.command", self.white.command.as_deref())?;

        validation::at_least_one("match.games", self.games() as u64)?;
        validation::board_size("match.size", self.board_size())?;
        validation::komi("match.komi", self.komi())?;
        validation::at_least_one("match.max_moves", self.max_moves() as u64)?;
        if let Some(timeout) = self.game.timeout_secs {
            validation::at_least_one("match.timeout_secs", timeout)?;
        }

        validation::file_path("results.directory", Path::new(self.results_dir()))?;
        validation::file_prefix("results.sgf_prefix", self.sgf_prefix())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.game.timeout_secs.map(Duration::from_secs)
    }

    /// 結果表檔名：`<sgf_prefix>.dat`
    pub fn dat_file(&self) -> String {
        format!("{}.dat", self.sgf_prefix())
    }
}

impl MatchSettings for MatchConfig {
    fn black_command(&self) -> &str {
        self.black.command.as_deref().unwrap_or("")
    }

    fn white_command(&self) -> &str {
        self.white.command.as_deref().unwrap_or("")
    }

    fn games(&self) -> usize {
        self.game.games.unwrap_or(DEFAULT_GAMES)
    }

    fn board_size(&self) -> usize {
        self.game.size.unwrap_or(DEFAULT_SIZE)
    }

    fn komi(&self) -> f32 {
        self.game.komi.unwrap_or(DEFAULT_KOMI)
    }

    fn alternate(&self) -> bool {
        self.game.alternate.unwrap_or(false)
    }

    fn max_moves(&self) -> usize {
        let size = self.board_size();
        self.game.max_moves.unwrap_or(size * size * 3)
    }

    fn results_dir(&self) -> &str {
        self.results.directory.as_deref().unwrap_or(DEFAULT_RESULTS_DIR)
    }

    fn sgf_prefix(&self) -> &str {
        self.results.sgf_prefix.as_deref().unwrap_or(DEFAULT_SGF_PREFIX)
    }

    fn continue_on_error(&self) -> bool {
        self.game.continue_on_error.unwrap_or(false)
    }

    fn force(&self) -> bool {
        self.game.force.unwrap_or(false)
    }
}

impl Validate for MatchConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_script_defaults() {
        let config = MatchConfig::new("go-gtp --name Go1", "go-gtp --name Go2");
        assert_eq!(config.games(), 10);
        assert_eq!(config.board_size(), 3);
        assert_eq!(config.komi(), 0.0);
        assert_eq!(config.results_dir(), "./");
        assert_eq!(config.dat_file(), "game.dat");
        assert_eq!(config.max_moves(), 27);
        assert!(!config.alternate());
        assert!(!config.continue_on_error());
        assert!(config.timeout().is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[match]
games = 4
size = 5
komi = 6.5
alternate = true
timeout_secs = 30

[black]
command = "go-gtp --name Go1 --policy random"

[white]
command = "go-gtp --name Go2"

[results]
directory = "./results_test_go2"
sgf_prefix = "go1-vs-go2"
"#;

        let config = MatchConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.games(), 4);
        assert_eq!(config.board_size(), 5);
        assert_eq!(config.komi(), 6.5);
        assert!(config.alternate());
        assert_eq!(config.max_moves(), 75);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.dat_file(), "go1-vs-go2.dat");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GO_GTP_TEST_ENGINE", "/opt/engines/go2");

        let toml_content = r#"
[black]
command = "${GO_GTP_TEST_ENGINE} --name Go1"

[white]
command = "${GO_GTP_TEST_ENGINE}"
"#;

        let config = MatchConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.black_command(), "/opt/engines/go2 --name Go1");

        std::env::remove_var("GO_GTP_TEST_ENGINE");
    }

    #[test]
    fn test_config_validation() {
        let missing_white = MatchConfig::from_toml_str("[black]\ncommand = \"go-gtp\"\n").unwrap();
        assert!(matches!(
            missing_white.validate(),
            Err(GtpError::MissingConfigError { .. })
        ));

        let mut bad_size = MatchConfig::new("a", "b");
        bad_size.game.size = Some(40);
        assert!(bad_size.validate().is_err());

        let mut bad_prefix = MatchConfig::new("a", "b");
        bad_prefix.results.sgf_prefix = Some("dir/game".to_string());
        assert!(bad_prefix.validate().is_err());

        assert!(MatchConfig::from_toml_str("[match\ngames = 1").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();

        let toml_content = r#"
[match]
games = 2

[black]
command = "go-gtp"

[white]
command = "go-gtp"
"#;

        temp_file.write_all(toml_content.as_bytes()).unwrap();

        let config = MatchConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.games(), 2);
    }
}
