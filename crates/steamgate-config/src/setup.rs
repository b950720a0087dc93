//! Interactive first-run configuration flow.
//!
//! Collects the pieces of the record that are missing, persisting after every
//! answer so an interrupted run resumes where it stopped.

use crate::errors::ConfigError;
use crate::prompt::Prompter;
use crate::store::ConfigStore;
use crate::types::{Config, EndpointConfig};

/// Load the configuration record, running first-run setup for anything that
/// is missing. Declining to create a missing record aborts with
/// [`ConfigError::SetupDeclined`].
pub fn ensure_config(
    store: &dyn ConfigStore,
    prompter: &dyn Prompter,
) -> Result<Config, ConfigError> {
    let mut config = match store.load()? {
        Some(config) => config,
        None => {
            let answer = prompter.request_line(
                &format!("Config {} does not exist. Create? (Y/n)", store.describe()),
                None,
            )?;
            if !(answer.is_empty() || answer.eq_ignore_ascii_case("y")) {
                return Err(ConfigError::SetupDeclined);
            }
            let config = Config::default();
            store.save(&config)?;
            config
        }
    };

    if config.steam_username.is_none() {
        let username = prompter.request_line(
            "Enter Steam username:",
            Some("A Steam username is required for the bridge to sign in."),
        )?;
        config.steam_username = Some(username);
        store.save(&config)?;
    }

    if config.steam_password.is_none() {
        let password = prompter.request_line(
            "Enter Steam password:",
            Some("A Steam password is required for the bridge to sign in."),
        )?;
        config.steam_password = Some(password);
        store.save(&config)?;
    }

    if config.server.is_none() {
        let mut server = EndpointConfig::default_server();
        server.port = ask_port(prompter, "Port for the RPC server to listen on", server.port)?;
        config.server = Some(server);
        store.save(&config)?;
    }

    if config.client.is_none() {
        let mut client = EndpointConfig::default_client();
        client.host = prompter.request_line(
            "Host of the remote JSON-RPC endpoint to call:",
            Some("A host is required so backend events can be forwarded."),
        )?;
        client.port = ask_port(prompter, "Port of the remote JSON-RPC endpoint", client.port)?;
        let path = prompter.request_line(
            &format!("Path of the remote JSON-RPC endpoint: ({})", client.path),
            None,
        )?;
        if !path.is_empty() {
            client.path = path;
        }
        config.client = Some(client);
        store.save(&config)?;
    }

    Ok(config)
}

/// Ask for a TCP port, re-asking until the answer parses; blank keeps the
/// default.
fn ask_port(prompter: &dyn Prompter, label: &str, default: u16) -> Result<u16, ConfigError> {
    loop {
        let answer = prompter.request_line(&format!("{label}: ({default})"), None)?;
        if answer.is_empty() {
            return Ok(default);
        }
        match answer.parse::<u16>() {
            Ok(port) if port != 0 => return Ok(port),
            _ => tracing::warn!(answer = %answer, "not a usable port, asking again"),
        }
    }
}
