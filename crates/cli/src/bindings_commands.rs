use {anyhow::Result, clap::Subcommand};

use {
    tutorbot_config::TutorbotConfig,
    tutorbot_sessions::{BindingStore, JsonFileBindingStore},
};

#[derive(Subcommand)]
pub enum BindingsAction {
    /// List every bound identity.
    List,
    /// Remove the binding for one identity (same as the user logging out).
    Remove { identity: String },
}

pub async fn handle_bindings(action: BindingsAction, config: &TutorbotConfig) -> Result<()> {
    let store = JsonFileBindingStore::new(&config.bindings.path);
    match action {
        BindingsAction::List => {
            let all = store.list().await?;
            if all.is_empty() {
                println!("No bindings in {}.", store.path().display());
            }
            for (identity, record) in all {
                println!("  {identity}  {}  {}", record.id, record.name);
            }
        },
        BindingsAction::Remove { identity } => {
            if store.remove(&identity).await? {
                println!("Removed binding for {identity}.");
            } else {
                println!("{identity} was not bound.");
            }
        },
    }
    Ok(())
}
