use anyhow::{Context, Result, bail};
use spendlens_core::PipelineConfig;
use std::fs;
use std::path::{Path, PathBuf};

pub fn spendlens_home() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME is not set")?;
    Ok(PathBuf::from(home).join(".spendlens"))
}

pub fn default_config_path() -> Result<PathBuf> {
    Ok(spendlens_home()?.join("config.toml"))
}

/// `--config` when given, otherwise `~/.spendlens/config.toml`
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(p) => Ok(p.to_path_buf()),
        None => default_config_path(),
    }
}

pub fn parse_config(s: &str) -> Result<PipelineConfig> {
    let cfg: PipelineConfig = toml::from_str(s).context("parse config.toml")?;
    cfg.validate().context("invalid config")?;
    Ok(cfg)
}

/// Load the effective config. A missing default file means defaults; a
/// missing explicit file is an error.
pub fn load_config(explicit: Option<&Path>) -> Result<PipelineConfig> {
    let p = resolve_path(explicit)?;
    if !p.exists() {
        if explicit.is_some() {
            bail!("config not found: {}", p.display());
        }
        return Ok(PipelineConfig::default());
    }
    let s = fs::read_to_string(&p).with_context(|| format!("read {}", p.display()))?;
    parse_config(&s).with_context(|| format!("load {}", p.display()))
}

pub fn save_config(path: &Path, cfg: &PipelineConfig) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    }
    let s = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, s).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn init_config(explicit: Option<&Path>, force: bool) -> Result<()> {
    let p = resolve_path(explicit)?;
    if p.exists() && !force {
        println!("Config already exists: {} (use --force to overwrite)", p.display());
        return Ok(());
    }
    save_config(&p, &PipelineConfig::default())?;
    println!("Wrote {}", p.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spendlens_core::Direction;

    #[test]
    fn test_defaults_survive_toml() {
        let s = toml::to_string_pretty(&PipelineConfig::default()).unwrap();
        assert_eq!(parse_config(&s).unwrap(), PipelineConfig::default());
    }

    #[test]
    fn test_partial_file_overrides() {
        let text = "ambiguous_direction = \"credit\"\ntop_merchants_limit = 3\n";
        let cfg = parse_config(text).unwrap();
        assert_eq!(cfg.ambiguous_direction, Direction::Credit);
        assert_eq!(cfg.top_merchants_limit, 3);
        assert_eq!(cfg.date_formats, PipelineConfig::default().date_formats);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(parse_config("year_window = [2030, 2020]\n").is_err());
        assert!(parse_config("top_merchants_limit = 0\n").is_err());
        assert!(parse_config("ambiguous_direction = \"sideways\"\n").is_err());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let p = std::env::temp_dir().join("spendlens-no-such-config.toml");
        assert!(load_config(Some(&p)).is_err());
    }

    #[test]
    fn test_save_then_load() {
        let p = std::env::temp_dir()
            .join(format!("spendlens-config-{}", std::process::id()))
            .join("config.toml");
        let mut cfg = PipelineConfig::default();
        cfg.debug = true;
        save_config(&p, &cfg).unwrap();
        assert_eq!(load_config(Some(&p)).unwrap(), cfg);
        let _ = fs::remove_dir_all(p.parent().unwrap());
    }
}
