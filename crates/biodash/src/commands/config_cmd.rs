//! Configuration command handlers.

use biodash_config as cfg;

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::error::CliError;

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Path => {
            println!("{}", cfg::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            let config = cfg::load_config_or_default();
            show(&config, global);
            Ok(())
        }

        ConfigCommand::SetKey { profile } => {
            let key = dialoguer::Password::new()
                .with_prompt(format!("API key for profile '{profile}'"))
                .interact()
                .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
            cfg::store_api_key(&profile, &key)?;
            if !global.quiet {
                eprintln!("API key stored in system keyring");
            }
            Ok(())
        }
    }
}

/// Print the effective configuration with credentials redacted.
fn show(config: &cfg::Config, global: &GlobalOpts) {
    if global.quiet {
        return;
    }
    println!(
        "default_profile: {}",
        config.default_profile.as_deref().unwrap_or("(none)")
    );
    println!(
        "defaults: output={} page_size={} timeout={}s",
        config.defaults.output, config.defaults.page_size, config.defaults.timeout
    );

    let mut names: Vec<&String> = config.profiles.keys().collect();
    names.sort();
    for name in names {
        let profile = &config.profiles[name];
        println!("\n[profiles.{name}]");
        println!("  url = {}", profile.url);
        println!("  access = {}", profile.access);
        if let Some(parent) = profile.parent_id {
            println!("  parent_id = {parent}");
        }
        if profile.api_key.is_some() {
            println!("  api_key = <redacted>");
        }
        if let Some(ref env) = profile.api_key_env {
            println!("  api_key_env = {env}");
        }
    }
}
