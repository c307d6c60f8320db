//! mintshop - talk to the mintshop API from the command line
//!
//! Each subcommand runs its action(s) against a fresh state and prints the
//! part of the state they touched as JSON.
//!
//! ```text
//! mintshop --base-url http://localhost:4000 --api-prefix "" shops
//! RUST_LOG=mintshop_store=debug mintshop search 粥
//! ```

use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use mintshop_client::{getters, Action, ClientConfig, Dispatcher};
use mintshop_store::HttpTransport;
use serde::Serialize;
use serde_json::json;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mintshop")]
#[command(about = "Fetch mintshop data through the state synchronization layer")]
struct Args {
    /// JSON config file (every field optional)
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the service base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Override the service endpoint prefix
    #[arg(long)]
    api_prefix: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the address of the configured coordinates
    Address,
    /// List food categories
    Categories,
    /// List shops near the configured coordinates
    Shops,
    /// Search shops by keyword
    Search { keyword: String },
    /// Log in with name, password and captcha
    LoginPwd {
        name: String,
        pwd: String,
        captcha: String,
    },
    /// Request an SMS login code
    SendCode { phone: String },
    /// Log in with phone and SMS code
    LoginSms { phone: String, code: String },
    /// Fetch the current session's user
    UserInfo,
    /// End the current session
    Logout,
    /// Fetch shop info, ratings and goods
    Shop,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ClientConfig::load(path)?,
        None => ClientConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }
    if let Some(api_prefix) = args.api_prefix {
        config.api_prefix = api_prefix;
    }

    info!(base_url = %config.base_url, ordering = ?config.ordering, "starting");

    let transport = HttpTransport::new(config.base_url.clone());
    let mut dispatcher = Dispatcher::new(&config, transport);

    match args.command {
        Command::Address => {
            dispatcher.run(Action::GetAddress).await?;
            print_json(&dispatcher.state().address)?;
        }
        Command::Categories => {
            dispatcher.run(Action::GetCategories).await?;
            print_json(&dispatcher.state().categories)?;
        }
        Command::Shops => {
            dispatcher.run(Action::GetShops).await?;
            print_json(&dispatcher.state().shops)?;
        }
        Command::Search { keyword } => {
            dispatcher.run(Action::SearchShops { keyword }).await?;
            print_json(&dispatcher.state().search_shops)?;
        }
        Command::LoginPwd { name, pwd, captcha } => {
            dispatcher
                .run(Action::LoginPwd { name, pwd, captcha })
                .await?;
            print_json(&dispatcher.state().user_info)?;
        }
        Command::SendCode { phone } => {
            let outcome = dispatcher.run(Action::SendCode { phone }).await?;
            info!(?outcome, "code requested");
        }
        Command::LoginSms { phone, code } => {
            dispatcher.run(Action::LoginSms { phone, code }).await?;
            print_json(&dispatcher.state().user_info)?;
        }
        Command::UserInfo => {
            dispatcher.run(Action::GetUserInfo).await?;
            print_json(&dispatcher.state().user_info)?;
        }
        Command::Logout => {
            dispatcher.run(Action::Logout).await?;
            print_json(&dispatcher.state().user_info)?;
        }
        Command::Shop => {
            let handles = [
                dispatcher.dispatch(Action::GetShopInfo),
                dispatcher.dispatch(Action::GetShopRatings),
                dispatcher.dispatch(Action::GetShopGoods),
            ];
            dispatcher.settle_all().await;
            for handle in handles {
                handle.result().await?;
            }

            let state = dispatcher.state();
            print_json(&json!({
                "info": state.info,
                "ratings": state.ratings.len(),
                "positive_ratings": getters::positive_size(state),
                "goods": state.goods.iter().map(|c| (&c.name, c.foods.len())).collect::<Vec<_>>(),
            }))?;
        }
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
