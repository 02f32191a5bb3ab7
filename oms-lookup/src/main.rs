use clap::Parser;
use oms_lookup::{render_order, LookupClient, LookupView, OrderLookup, Submission};
use std::io::Write;
use std::process::ExitCode;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

/// Look up an order on the order service by its UID
#[derive(Parser, Debug)]
#[command(name = "oms-lookup", version)]
struct Cli {
    /// Base URL of the order service
    #[arg(long, env = "OMS_LOOKUP_URL", default_value = "http://localhost:8081")]
    base_url: String,

    /// Print the order as JSON instead of panels
    #[arg(long)]
    json: bool,

    /// Order UID; without it an interactive prompt is started
    uid: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let client = match LookupClient::new(&cli.base_url) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let lookup = OrderLookup::new(client);

    match cli.uid {
        Some(uid) => {
            let mut view = LookupView::default();
            let submission = lookup.submit(&uid).await;
            let ok = matches!(submission, Submission::Found(_));
            show(&mut view, submission, cli.json);
            if ok {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        None => interactive(&lookup, cli.json).await,
    }
}

async fn interactive(lookup: &OrderLookup, json: bool) -> ExitCode {
    let mut view = LookupView::default();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("order uid> ");
        let _ = std::io::stdout().flush();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => return ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Failed to read input: {}", e);
                return ExitCode::FAILURE;
            }
        };

        let submission = lookup.submit(&line).await;
        show(&mut view, submission, json);
    }
}

fn show(view: &mut LookupView, submission: Submission, json: bool) {
    match submission {
        Submission::EmptyInput => {
            eprintln!("Please enter an order UID");
            return;
        }
        // Cannot happen with one prompt at a time; nothing new to print
        Submission::InFlight => return,
        _ => view.apply(submission),
    }

    if let Some(error) = &view.error {
        println!("{}", error);
    }
    if let Some(order) = &view.order {
        if json {
            match serde_json::to_string_pretty(order) {
                Ok(text) => println!("{}", text),
                Err(e) => eprintln!("Failed to encode order: {}", e),
            }
        } else {
            print!("{}", render_order(order));
        }
    }
}
