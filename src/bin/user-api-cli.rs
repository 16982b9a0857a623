use clap::{Parser, Subcommand};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "user-api-cli")]
#[command(about = "Management CLI for the V2Ray user API", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://127.0.0.1:10087")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a user to the managed inbound
    AddUser {
        email: String,
        uuid: String,
    },
    /// Remove a user from the managed inbound
    RemoveUser { email: String },
    /// Show one user's traffic counters
    QueryUserTraffic { email: String },
    /// Show every user's traffic counters
    QueryTraffic,
    /// Read and zero one user's traffic counters
    ResetUserTraffic { email: String },
    /// Read and zero every user's traffic counters
    ResetTraffic,
}

impl Commands {
    fn request(&self) -> (&'static str, Vec<(&'static str, &str)>) {
        match self {
            Commands::AddUser { email, uuid } => {
                ("add-user", vec![("email", email.as_str()), ("uuid", uuid.as_str())])
            }
            Commands::RemoveUser { email } => ("remove-user", vec![("email", email.as_str())]),
            Commands::QueryUserTraffic { email } => {
                ("query-user-traffic", vec![("email", email.as_str())])
            }
            Commands::QueryTraffic => ("query-traffic", vec![]),
            Commands::ResetUserTraffic { email } => {
                ("reset-user-traffic", vec![("email", email.as_str())])
            }
            Commands::ResetTraffic => ("reset-traffic", vec![]),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let (path, query) = cli.command.request();
    let res = client
        .get(format!("{}/{}", cli.url.trim_end_matches('/'), path))
        .query(&query)
        .send()
        .await?;

    print_response(res).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: user API returned status {}", status);
        std::process::exit(1);
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("OK");
        return Ok(());
    }

    let json: Value = serde_json::from_str(&text)?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
