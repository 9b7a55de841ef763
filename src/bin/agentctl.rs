use clap::{Parser, Subcommand};
use data_agent_service::api::ApiClient;
use data_agent_service::deploy::{self, DeployOptions, DirSandbox, Step};
use data_agent_service::error::AppResult;
use data_agent_service::utils::Table;
use data_agent_service::{AgentRequest, Config, PromptBuilder};
use std::path::{Path, PathBuf};

/// Rows sent as `sample_rows`, matching what the upload UI sends.
const SAMPLE_ROW_COUNT: usize = 10;

#[derive(Parser, Debug)]
#[command(name = "agentctl", about = "CLI for the data agent service", version)]
struct Cli {
    /// Override AGENT_URL
    #[arg(global = true, long)]
    url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a running service
    Health,
    /// Print the schema description and sample rows inferred from a CSV
    Schema {
        /// CSV file to describe
        csv: PathBuf,
    },
    /// Build the prompt for a CSV locally, without calling the model
    Prompt {
        /// CSV file to describe
        csv: PathBuf,
        /// Template path (defaults to FREESTYLE_YAML)
        #[arg(long, value_name = "PATH")]
        template: Option<PathBuf>,
    },
    /// Send a CSV to the service and print its suggestions
    Ask {
        /// CSV file to describe
        csv: PathBuf,
        /// Print the raw JSON reply
        #[arg(long)]
        json: bool,
    },
    /// Upload the service into a sandbox directory and start it
    Deploy {
        /// Local source tree to upload
        #[arg(long, default_value = ".")]
        source: PathBuf,
        /// Sandbox root directory
        #[arg(long, value_name = "DIR")]
        target: PathBuf,
        /// Which step to run; each can be rerun on its own
        #[arg(long, value_enum, default_value = "all")]
        step: Step,
        #[arg(long, default_value = deploy::DEFAULT_INSTALL_CMD)]
        install_cmd: String,
        #[arg(long, default_value = deploy::DEFAULT_START_CMD)]
        start_cmd: String,
        /// PORT handed to the started service
        #[arg(long, default_value_t = 3000)]
        port: u16,
    },
}

async fn read_table(csv: &Path) -> Result<Table, Box<dyn std::error::Error>> {
    let text = tokio::fs::read_to_string(csv).await?;
    Ok(Table::parse(&text)?)
}

fn to_request(table: &Table) -> AppResult<AgentRequest> {
    Ok(AgentRequest {
        schema_description: table.describe(),
        sample_rows: table.head_csv(SAMPLE_ROW_COUNT)?,
    })
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    Config::dotenv_load();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut conf = Config::new()?;
    if let Some(url) = cli.url {
        conf.agent_url = url;
    }

    match cli.command {
        Commands::Health => {
            let client = ApiClient::new(conf.agent_url.clone());
            let v = client.health().await.map_err(|e| {
                eprintln!("Error: {}", e);
                e
            })?;
            println!("{}", serde_json::to_string_pretty(&v)?);
        }
        Commands::Schema { csv } => {
            let table = read_table(&csv).await?;
            let req = to_request(&table)?;
            println!("{}\n", req.schema_description);
            print!("{}", req.sample_rows);
        }
        Commands::Prompt { csv, template } => {
            let table = read_table(&csv).await?;
            let req = to_request(&table)?;
            let builder = PromptBuilder::new(template.unwrap_or(conf.template_path));
            let prompt = builder.build_prompt(&req.schema_description, &req.sample_rows).await?;
            println!("{}", prompt);
        }
        Commands::Ask { csv, json } => {
            let table = read_table(&csv).await?;
            let client = ApiClient::new(conf.agent_url.clone());
            let out = match client.agent(&to_request(&table)?).await {
                Ok(v) => v,
                Err(e) => {
                    eprintln!("Agent call failed: {}", e);
                    std::process::exit(1);
                }
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&out)?);
                return Ok(());
            }
            println!("Summary:\n{}\n", out.get("summary").and_then(|v| v.as_str()).unwrap_or(""));
            println!("Suggested visualizations:");
            match out.get("suggested_visuals") {
                Some(serde_json::Value::Array(items)) => {
                    for item in items {
                        match item.as_str() {
                            Some(s) => println!("- {}", s),
                            None => println!("- {}", item),
                        }
                    }
                }
                Some(other) => println!("{}", other),
                None => {}
            }
            let specs = out.get("chart_specs").and_then(|v| v.as_array()).map(|a| a.len()).unwrap_or(0);
            println!("\n{} chart spec(s); use --json to see them", specs);
        }
        Commands::Deploy { source, target, step, install_cmd, start_cmd, port } => {
            let sandbox = DirSandbox::new(target);
            let options = DeployOptions { source, install_cmd, start_cmd, port };
            deploy::run(&sandbox, &options, step).await?;
            println!("Sandbox: {}", sandbox.root().display());
            if matches!(step, Step::Start | Step::All) {
                println!("Health:  http://localhost:{}/", port);
                println!("POST     http://localhost:{}/agent", port);
            }
        }
    }
    Ok(())
}
