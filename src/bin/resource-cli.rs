use clap::{Parser, Subcommand};
use resource_client::{ClientError, ResourceClient};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "resource-cli")]
#[command(about = "Command-line client for a RESTful resource", long_about = None)]
struct Cli {
    /// Collection URL of the resource.
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show one item
    Get { id: String },
    /// Show the whole collection
    List,
    /// Replace one item with a JSON document
    Put { id: String, json: String },
    /// Replace the whole collection with a JSON array
    Replace { json: String },
    /// Create an item from a JSON document
    Post { json: String },
    /// Remove one item
    Delete { id: String },
    /// Remove every item
    DeleteAll,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client: ResourceClient<Value> = ResourceClient::new(&cli.url);

    match cli.command {
        Commands::Get { id } => match client.get(&id).await? {
            Some(value) => print_json(&value)?,
            None => {
                eprintln!("Not found: {}", id);
                std::process::exit(1);
            }
        },
        Commands::List => print_json(&Value::Array(client.list().await?))?,
        Commands::Put { id, json } => {
            client.put(&id, &serde_json::from_str(&json)?).await.map_err(report)?;
            println!("OK");
        }
        Commands::Replace { json } => {
            let values: Vec<Value> = serde_json::from_str(&json)?;
            client.replace_all(&values).await.map_err(report)?;
            println!("OK");
        }
        Commands::Post { json } => {
            let id = client.post(&serde_json::from_str(&json)?).await.map_err(report)?;
            println!("{}", id);
        }
        Commands::Delete { id } => {
            client.delete(&id).await.map_err(report)?;
            println!("OK");
        }
        Commands::DeleteAll => {
            client.delete_all().await.map_err(report)?;
            println!("OK");
        }
    }

    Ok(())
}

fn report(err: ClientError) -> ClientError {
    if let Some(status) = err.status() {
        eprintln!("Error: {}", status);
    }
    err
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
