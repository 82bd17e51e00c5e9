use clap::Subcommand;
use ghsync_auth::{CredentialStore, KeyringStore};
use ghsync_core::models::service::Service;

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store a token for github or gitlab in the OS keychain
    Set {
        service: Service,
        /// API token (will prompt if not provided)
        #[arg(long)]
        token: Option<String>,
    },
    /// Remove a stored token
    Remove { service: Service },
}

pub fn run(action: AuthAction) -> anyhow::Result<()> {
    let store = KeyringStore::new();
    match action {
        AuthAction::Set { service, token } => {
            let token = match token {
                Some(t) => t,
                None => {
                    eprint!("Enter API token for {service}: ");
                    let mut input = String::new();
                    std::io::stdin().read_line(&mut input)?;
                    input.trim().to_string()
                }
            };
            if token.is_empty() {
                anyhow::bail!("Token cannot be empty");
            }

            store.store(service, &token)?;
            println!("Token stored in OS keychain as '{}'", service.credential_key());
            Ok(())
        }
        AuthAction::Remove { service } => {
            store.delete(service)?;
            println!("Removed '{}' from OS keychain", service.credential_key());
            Ok(())
        }
    }
}
