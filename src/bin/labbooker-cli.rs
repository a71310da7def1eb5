use clap::{Parser, Subcommand};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "labbooker-cli")]
#[command(about = "Staff CLI for the LabBooker server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:5000", env = "LABBOOKER_URL")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the booking policy
    Config,
    /// Update booking policy fields, e.g. `set-config booking.maxBookingsPerWeek=4`
    SetConfig {
        /// `section.field=value` pairs
        #[arg(required = true)]
        fields: Vec<String>,
        /// Only apply if the stored version still matches
        #[arg(long)]
        version: Option<u64>,
    },
    /// List support issues, newest first
    Issues,
    /// Change an issue's status
    SetStatus { id: String, status: String },
    /// Show a user's missed bookings and block
    Standing { user_id: String },
    /// List bookings, optionally for one user
    Bookings {
        #[arg(long)]
        user: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = match cli.command {
        Commands::Config => client.get(format!("{}/config", cli.url)).send().await?,
        Commands::SetConfig { fields, version } => {
            let body = patch_body(&fields, version)?;
            client.put(format!("{}/config", cli.url)).json(&body).send().await?
        }
        Commands::Issues => client.get(format!("{}/issues/all", cli.url)).send().await?,
        Commands::SetStatus { id, status } => {
            client
                .patch(format!("{}/issues/update-status/{}", cli.url, id))
                .json(&json!({ "status": status }))
                .send()
                .await?
        }
        Commands::Standing { user_id } => {
            client
                .get(format!("{}/users/{}/standing", cli.url, user_id))
                .send()
                .await?
        }
        Commands::Bookings { user } => {
            let mut req = client.get(format!("{}/bookings", cli.url));
            if let Some(user) = user {
                req = req.query(&[("userId", user)]);
            }
            req.send().await?
        }
    };

    print_response(res).await
}

/// Turn `booking.openDaysBefore=7` pairs into a nested JSON patch.
fn patch_body(fields: &[String], version: Option<u64>) -> Result<Value, Box<dyn std::error::Error>> {
    let mut body = json!({});
    for field in fields {
        let (path, raw) = field
            .split_once('=')
            .ok_or_else(|| format!("expected section.field=value, got '{}'", field))?;
        let (section, name) = path
            .split_once('.')
            .ok_or_else(|| format!("expected section.field, got '{}'", path))?;
        let value: i64 = raw.parse().map_err(|_| format!("'{}' is not an integer", raw))?;
        body[section][name] = json!(value);
    }
    if let Some(version) = version {
        body["version"] = json!(version);
    }
    Ok(body)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
