use anyhow::{Context, Result};
use dailies_etl::{config, Config};

/// Show the current effective configuration.
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("Current Configuration");
    println!("=====================\n");

    println!("Config file: {}", config::config_file_path().display());

    let exists = config::config_file_path().exists();
    println!("File exists: {}\n", if exists { "yes" } else { "no (using defaults)" });

    println!("Settings:");
    for key in KEYS {
        println!("  {}: {}", key, value_of(&config, key)?);
    }

    println!("\nPriority: CLI args > ENV vars (DAILIES_*) > Config file > Defaults");

    Ok(())
}

const KEYS: [&str; 10] = [
    "data_dir",
    "chunk_size",
    "recreate_schema",
    "sink",
    "clickhouse_host",
    "clickhouse_port",
    "clickhouse_database",
    "clickhouse_user",
    "clickhouse_password",
    "sqlite_path",
];

fn value_of(config: &Config, key: &str) -> Result<String> {
    let value = match key {
        "data_dir" => config.data_dir.display().to_string(),
        "chunk_size" => config.chunk_size.to_string(),
        "recreate_schema" => config.recreate_schema.to_string(),
        "sink" => config.sink.to_string(),
        "clickhouse_host" => config.clickhouse_host.clone(),
        "clickhouse_port" => config.clickhouse_port.to_string(),
        "clickhouse_database" => config.clickhouse_database.clone(),
        "clickhouse_user" => config
            .clickhouse_user
            .clone()
            .unwrap_or_else(|| String::from("<not set>")),
        "clickhouse_password" => match config.clickhouse_password {
            Some(_) => String::from("<set>"),
            None => String::from("<not set>"),
        },
        "sqlite_path" => config.sqlite_path.display().to_string(),
        _ => anyhow::bail!("Unknown config key: {}\n\nValid keys: {}", key, KEYS.join(", ")),
    };
    Ok(value)
}

/// Get a specific config value.
pub fn get_config(key: Option<&str>) -> Result<()> {
    if let Some(key) = key {
        let config = Config::load()?;
        println!("{}", value_of(&config, key)?);
    } else {
        // No key provided, show entire config file contents
        let config_path = config::config_file_path();

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)
                .context("Failed to read config file")?;
            print!("{}", contents);
        } else {
            println!("Config file does not exist: {}", config_path.display());
            println!("\nRun 'dailies config init' to create it.");
        }
    }

    Ok(())
}

/// Show the config file path.
pub fn show_path() {
    println!("{}", config::config_file_path().display());
}

/// Show example configuration.
pub fn show_example() {
    print!("{}", config::example_config());
}

/// Initialize config file with defaults.
pub fn init_config() -> Result<()> {
    let created = config::ensure_config_file()?;
    let config_path = config::config_file_path();

    if created {
        println!("✓ Created config file: {}", config_path.display());
        println!("\nEdit this file to configure dailies.");
    } else {
        println!("Config file already exists: {}", config_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_key_has_a_value() {
        let config = Config::default();
        for key in KEYS {
            assert!(value_of(&config, key).is_ok(), "{key}");
        }
        assert_eq!(value_of(&config, "clickhouse_port").unwrap(), "8123");
    }

    #[test]
    fn test_password_is_masked() {
        let config = Config {
            clickhouse_password: Some("hunter2".into()),
            ..Config::default()
        };
        assert_eq!(value_of(&config, "clickhouse_password").unwrap(), "<set>");
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = value_of(&Config::default(), "api_key").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
    }
}
